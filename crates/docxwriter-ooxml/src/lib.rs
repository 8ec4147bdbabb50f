//! # docxwriter-ooxml
//!
//! DOCX generation for docxwriter.
//!
//! This crate provides:
//! - the style registry, a fixed stylesheet resolved by name
//! - the content dispatcher, which maps document sections onto writer operations
//! - the DOCX writer and OOXML packaging (parts, relationships, numbering, media)
//! - an outline reader for inspecting generated documents
//!
//! ## Example: Rendering a Document
//!
//! ```
//! use docxwriter_model::DocumentSpec;
//! use docxwriter_ooxml::{BuildOptions, CollectingSink, ContentDispatcher, StyleRegistry};
//!
//! let spec = DocumentSpec::from_json_str(
//!     r#"{"title": "Report", "file_name": "report.docx",
//!         "content": {"Summary": "All good.", "Figures": {"table": [["Q1", "Q2"], ["3", "4"]]}}}"#,
//! )?;
//!
//! let registry = StyleRegistry::standard();
//! let options = BuildOptions::default();
//! let mut sink = CollectingSink::new();
//! let rendered = ContentDispatcher::new(&registry, &options, &mut sink).render(&spec)?;
//!
//! let outline = rendered.outline()?;
//! assert_eq!(outline.tables().count(), 1);
//! assert!(rendered.warnings.is_empty());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod archive;
pub mod dispatcher;
pub mod error;
pub mod image;
pub mod numbering;
pub mod outline;
pub mod package;
pub mod relationships;
pub mod styles;
pub mod warnings;
pub mod writer;
pub mod xml;

pub use archive::OoxmlArchive;
pub use dispatcher::{
    BuildOptions, ContentDispatcher, RenderedDocument, TablePolicy, WrittenDocument,
    DEFAULT_OUTPUT_DIR, DEFAULT_WATERMARK,
};
pub use error::{OoxmlError, Result};
pub use image::{ImageFormat, LoadedImage};
pub use outline::{Block, DocumentOutline};
pub use relationships::Relationships;
pub use styles::{Alignment, ParagraphFormat, RunFormat, Style, StyleKind, StyleRegistry};
pub use warnings::{CollectingSink, TracingSink, Warning, WarningKind, WarningSink};
pub use writer::{DocxWriter, WatermarkPlacement};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
