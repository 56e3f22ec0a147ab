//! # LSSR Common Library
//!
//! Shared code for the LiveSplit splits restoration tools:
//! - Timecode parsing and formatting
//! - Document tree capability and its quick-xml implementation
//! - Configuration loading
//! - Common error types

pub mod config;
pub mod document;
pub mod error;
pub mod timecode;
pub mod xml;

pub use document::{DocumentTree, PersistDocument};
pub use error::{Error, Result};
pub use xml::{NodeId, XmlDocument};
