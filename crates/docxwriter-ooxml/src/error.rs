//! Error types for document building

use std::path::PathBuf;

use docxwriter_model::ModelError;
use thiserror::Error;

/// Errors that can occur while building or saving a document
#[derive(Error, Debug)]
pub enum OoxmlError {
    /// The document description is unusable (missing title, bad file name, ...)
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Error writing or reading the ZIP archive
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Error reading or writing files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing XML content
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Style name not present in the registry
    #[error("Style not found: {0}")]
    StyleNotFound(String),

    /// Table rows disagree on their column count
    #[error("Malformed table in section '{section}': row {row} has {found} cells, expected {expected}")]
    MalformedTable {
        section: String,
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Image file missing, unreadable or not a known image format
    #[error("Cannot load image {}: {reason}", path.display())]
    ImageLoad { path: PathBuf, reason: String },

    /// The finished document could not be written to its destination
    #[error("Cannot save document to {}: {source}", path.display())]
    DocumentSave {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Required part missing from a package being read
    #[error("Invalid document structure: {0}")]
    InvalidStructure(String),
}

/// Result type for OOXML operations
pub type Result<T> = std::result::Result<T, OoxmlError>;
