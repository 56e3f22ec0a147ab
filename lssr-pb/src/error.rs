//! Error types for lssr-pb
//!
//! Every failure the restore workflow can report is a distinct variant with
//! a distinct process exit code, so the command-line front end can tell the
//! user exactly which check failed.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for restore operations
pub type Result<T> = std::result::Result<T, RestoreError>;

/// Restore workflow error
#[derive(Error, Debug)]
pub enum RestoreError {
    /// Input path does not name a regular file
    #[error("Splits file '{0}' not found")]
    FileNotFound(PathBuf),

    /// Input could not be read or parsed as XML
    #[error("Could not open '{path}' as an XML document: {reason}")]
    NotADocument { path: PathBuf, reason: String },

    /// Attempt history holds no finished run
    #[error("There are no restorable runs in this file")]
    NoRestorableRuns,

    /// Zero or several <AttemptHistory> elements
    #[error("Expected exactly one <AttemptHistory> element, found {0}")]
    AttemptHistoryCount(usize),

    /// No <Segments> element
    #[error("No <Segments> element found")]
    SegmentsMissing,

    /// <Segments> holds no <Segment>
    #[error("No <Segment> elements found")]
    NoSegments,

    /// A segment without exactly one <SplitTimes>
    #[error("Segment {segment} has {found} <SplitTimes> elements, expected exactly one")]
    SplitTimesCount { segment: usize, found: usize },

    /// Attempt id is not among the restorable runs
    #[error("Run '{0}' is not a restorable attempt")]
    InvalidAttempt(String),

    /// Too many splits missing for the totals to pin them down
    #[error("Run '{attempt}' is not restorable: {missing} splits are missing and the run totals do not reconcile")]
    IrreconcilableRun { attempt: String, missing: usize },

    /// Output path does not exist and its directory is not writable
    #[error("Output path '{0}' is invalid or inaccessible")]
    OutputInaccessible(PathBuf),

    /// Operation attempted after close
    #[error("Splits file is closed")]
    DocumentClosed,

    /// Nothing to apply, or the plan does not match the loaded segments
    #[error("No restoration plan to apply")]
    NoPlan,

    /// Writing the output failed; the loaded document is unchanged on disk
    #[error("Failed to save '{path}': {reason}")]
    SaveFailed { path: PathBuf, reason: String },

    /// Reading the user's answer or writing to the terminal failed
    #[error("Terminal I/O error: {0}")]
    Console(#[from] std::io::Error),
}

impl RestoreError {
    /// Process exit code; each variant maps to its own value
    pub fn exit_code(&self) -> u8 {
        match self {
            RestoreError::FileNotFound(_) => 2,
            RestoreError::NotADocument { .. } => 3,
            RestoreError::NoRestorableRuns => 4,
            RestoreError::AttemptHistoryCount(_) => 5,
            RestoreError::SegmentsMissing => 6,
            RestoreError::NoSegments => 7,
            RestoreError::SplitTimesCount { .. } => 8,
            RestoreError::InvalidAttempt(_) => 9,
            RestoreError::IrreconcilableRun { .. } => 10,
            RestoreError::OutputInaccessible(_) => 11,
            RestoreError::DocumentClosed => 12,
            RestoreError::NoPlan => 13,
            RestoreError::SaveFailed { .. } => 14,
            RestoreError::Console(_) => 15,
        }
    }

    /// The file is well formed but simply has nothing to restore from yet
    pub fn is_no_restorable_runs(&self) -> bool {
        matches!(self, RestoreError::NoRestorableRuns)
    }

    /// The document failed one of the structural load checks
    pub fn is_incompatible_document(&self) -> bool {
        matches!(
            self,
            RestoreError::AttemptHistoryCount(_)
                | RestoreError::SegmentsMissing
                | RestoreError::NoSegments
                | RestoreError::SplitTimesCount { .. }
        )
    }
}
