//! # lssr-pb
//!
//! Restores the Personal Best splits of a LiveSplit `.lss` file from any
//! finished run recorded in its attempt history.
//!
//! The workflow is split into small stages:
//! - [`loader`] validates the document and collects attempts and segment times
//! - [`plan`] reconstructs cumulative splits for one attempt
//! - [`writer`] writes a plan into the document's Personal Best entries
//! - [`splits_file`] ties the stages to one open document
//! - [`cli`] drives the interactive session

pub mod cli;
pub mod error;
pub mod listing;
pub mod loader;
pub mod plan;
pub mod splits_file;
pub mod store;
pub mod writer;

pub use error::{RestoreError, Result};
pub use plan::{Plan, PlanEntry, PlanStatus};
pub use splits_file::SplitsFile;
pub use store::{Attempt, Diagnostic, DiagnosticKind, Times};
