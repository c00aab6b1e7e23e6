//! Error types for CodeStudio Core
//!
//! Store lookups report absence through `Option`/`bool`; the variants here
//! cover what can actually fail: file sinks and strict response parsing.

use thiserror::Error;

/// Result type alias for workspace operations
pub type Result<T> = std::result::Result<T, WorkspaceError>;

/// Main error type for workspace operations
#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// A remote file sink answered with an unexpected status
    #[error("Workspace request failed ({status}): {message}")]
    Remote { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Why a model response could not be read as structured output
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("response is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("response JSON is not an object")]
    NotAnObject,
}
