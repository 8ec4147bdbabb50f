//! docxwriter-model - JSON document description
//!
//! This crate parses the JSON input of docxwriter into a [`DocumentSpec`]
//! and classifies each section value into a closed set of [`SectionBody`]
//! shapes.
//!
//! ```
//! use docxwriter_model::{DocumentSpec, SectionBody};
//!
//! let spec = DocumentSpec::from_json_str(
//!     r#"{"title": "Report", "file_name": "report.docx",
//!         "content": {"Intro": "Hello", "Data": {"table": [["a", "b"]]}}}"#,
//! )?;
//!
//! assert_eq!(spec.content.len(), 2);
//! assert!(matches!(spec.content[1].classify(), Ok(SectionBody::Table(_))));
//! # Ok::<(), docxwriter_model::ModelError>(())
//! ```

pub mod document;
pub mod error;
pub mod section;

pub use document::{DocumentSpec, DOCX_EXTENSION};
pub use error::{ModelError, Result, ShapeError};
pub use section::{
    ImageSpec, ListSpec, ListType, Section, SectionBody, StyledTextSpec, TableSpec,
    RESERVED_KEYS,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
