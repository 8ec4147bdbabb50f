//! Error types for input parsing and shape classification

use std::path::PathBuf;

use thiserror::Error;

/// Errors that make a document description unusable
#[derive(Error, Debug)]
pub enum ModelError {
    /// The input file could not be opened or read
    #[error("Cannot read input file {}: {source}", path.display())]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input is not valid JSON
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A required top-level field is absent or empty
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// A top-level field is present but unusable
    #[error("Invalid field '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// Errors raised when a section value matches no known shape
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShapeError {
    /// The value's JSON type cannot describe a section body
    #[error("unrecognized section body: {0}")]
    Unrecognized(String),

    /// A shape was selected but one of its keys has the wrong form
    #[error("invalid '{key}': expected {expected}")]
    InvalidField {
        key: &'static str,
        expected: &'static str,
    },
}

/// Result type for model operations
pub type Result<T> = std::result::Result<T, ModelError>;
