//! Common error types for LSSR

use thiserror::Error;

/// Common result type for LSSR operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the LSSR crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input could not be read as an XML document
    #[error("XML parse error: {0}")]
    Parse(String),

    /// Document tree could not be written back out
    #[error("XML serialize error: {0}")]
    Serialize(String),
}
