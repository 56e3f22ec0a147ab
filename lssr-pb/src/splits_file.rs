//! Loaded splits file: document, records and current plan
//!
//! A [`SplitsFile`] owns the document for one open → plan → save → close
//! lifecycle. Closing (explicitly or on drop) releases the document and
//! invalidates the records and plan; closing twice does nothing.

use std::path::{Path, PathBuf};

use lssr_common::{DocumentTree, PersistDocument, XmlDocument};
use tracing::{info, warn};

use crate::error::{RestoreError, Result};
use crate::listing;
use crate::loader;
use crate::plan::{self, Plan, PlanStatus};
use crate::store::{Attempt, Diagnostic, RecordStore};
use crate::writer;

/// An open splits document
pub struct SplitsFile<D: DocumentTree = XmlDocument> {
    name: String,
    version: String,
    document: Option<D>,
    store: RecordStore<D::Node>,
    plan: Option<Plan>,
}

impl SplitsFile<XmlDocument> {
    /// Open and validate a splits file from disk.
    ///
    /// On any failure the document is released before returning.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(RestoreError::FileNotFound(path.to_path_buf()));
        }

        let document = XmlDocument::open(path).map_err(|e| RestoreError::NotADocument {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_document(document, name)
    }
}

impl<D: DocumentTree> SplitsFile<D> {
    /// Validate an already parsed document.
    pub fn from_document(document: D, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        info!("Analyzing '{}' for compatibility", name);

        // On error `document` is dropped here, releasing it
        let store = match loader::load(&document) {
            Ok(store) => store,
            Err(e) => {
                if e.is_no_restorable_runs() {
                    info!("No restorable runs in '{}'", name);
                } else {
                    warn!("'{}' is not compatible: {}", name, e);
                }
                return Err(e);
            }
        };

        let version = document
            .attribute(document.root(), "version")
            .unwrap_or_default()
            .to_string();
        for diagnostic in store.diagnostics() {
            warn!("{}: {}", name, diagnostic);
        }
        info!("Opened '{}', version {} splits file", name, version);

        Ok(Self {
            name,
            version,
            document: Some(document),
            store,
            plan: None,
        })
    }

    /// File name used in messages
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The document's `version` attribute (empty when absent)
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn is_loaded(&self) -> bool {
        self.document.is_some()
    }

    /// Borrow the document while it is open
    pub fn document(&self) -> Option<&D> {
        self.document.as_ref()
    }

    /// Restorable attempts; empty once closed
    pub fn attempts(&self) -> &[Attempt] {
        self.store.attempts()
    }

    /// Formatted listing of the restorable attempts
    pub fn list_attempts(&self) -> String {
        listing::attempts_table(self.store.attempts())
    }

    /// True if `attempt_id` names a restorable attempt of an open file
    pub fn is_restorable(&self, attempt_id: &str) -> bool {
        self.is_loaded() && self.store.find_attempt(attempt_id).is_some()
    }

    /// Build a new plan for `attempt_id`, replacing any previous one.
    ///
    /// A failed reconstruction clears the previous plan.
    pub fn reconstruct(&mut self, attempt_id: &str) -> Result<PlanStatus> {
        if !self.is_loaded() {
            return Err(RestoreError::DocumentClosed);
        }
        self.plan = None;
        let plan = plan::reconstruct(&self.store, attempt_id)?;
        for diagnostic in &plan.diagnostics {
            warn!("{}: {}", self.name, diagnostic);
        }
        let status = plan.status;
        self.plan = Some(plan);
        Ok(status)
    }

    /// Current plan, if one was built
    pub fn plan(&self) -> Option<&Plan> {
        self.plan.as_ref()
    }

    /// Formatted listing of the current plan
    pub fn show_plan(&self) -> String {
        listing::plan_table(self.plan.as_ref())
    }

    /// Load-time diagnostics followed by those of the current plan
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut all = self.store.diagnostics().to_vec();
        if let Some(plan) = &self.plan {
            all.extend(plan.diagnostics.iter().cloned());
        }
        all
    }

    /// Write the current plan into the in-memory document
    pub fn apply(&mut self) -> Result<()> {
        let document = self.document.as_mut().ok_or(RestoreError::DocumentClosed)?;
        let plan = self.plan.as_ref().ok_or(RestoreError::NoPlan)?;
        writer::apply_plan(document, &self.store, plan)?;
        info!("Applied plan for run {} to '{}'", plan.attempt_id, self.name);
        Ok(())
    }

    /// Release the document, records and plan. Safe to call repeatedly.
    pub fn close(&mut self) {
        if self.document.take().is_some() {
            self.store = RecordStore::default();
            self.plan = None;
            info!("Closed file '{}'", self.name);
        }
    }
}

impl<D: DocumentTree + PersistDocument> SplitsFile<D> {
    /// Apply the current plan and write the document to `output`.
    ///
    /// The output is rejected up front when it does not exist and its
    /// directory is not writable. Save failures leave the loaded document
    /// usable, so the caller may retry with another path.
    pub fn apply_and_save(&mut self, output: impl AsRef<Path>) -> Result<()> {
        let output = output.as_ref();
        // An existing file is accepted without a permission check
        if !output.exists() && !directory_writable(output) {
            return Err(RestoreError::OutputInaccessible(output.to_path_buf()));
        }

        self.apply()?;

        let document = self.document.as_ref().ok_or(RestoreError::DocumentClosed)?;
        document
            .save(output)
            .map_err(|e| RestoreError::SaveFailed {
                path: output.to_path_buf(),
                reason: e.to_string(),
            })?;
        info!("Saved restored splits to {}", output.display());
        Ok(())
    }
}

impl<D: DocumentTree> Drop for SplitsFile<D> {
    fn drop(&mut self) {
        self.close();
    }
}

fn directory_writable(output: &Path) -> bool {
    let directory = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::metadata(&directory)
        .map(|meta| meta.is_dir() && !meta.permissions().readonly())
        .unwrap_or(false)
}
