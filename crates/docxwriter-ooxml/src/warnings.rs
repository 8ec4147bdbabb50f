//! Recoverable problems found while building a document
//!
//! Anything that does not stop the document from being written is reported
//! as a [`Warning`] through a [`WarningSink`] passed in by the caller.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Category of a recoverable problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Style name missing from the registry, or of the wrong kind
    UnknownStyle,
    /// Table row with a different width than the first row
    MalformedTable,
    /// `header_rows` larger than the table
    HeaderRowsClamped,
    /// Table with no rows or no columns
    EmptyTable,
    /// Image missing, unreadable or of an unknown format
    ImageLoad,
    /// Image width or height not a positive finite number
    InvalidImageSize,
    /// Section value matching none of the known shapes
    UnrecognizedShape,
    /// Section nested deeper than the available heading styles
    HeadingClamped,
    /// Text holding characters that XML cannot represent; they are dropped
    InvalidCharacters,
}

impl WarningKind {
    pub fn as_str(self) -> &'static str {
        match self {
            WarningKind::UnknownStyle => "unknown_style",
            WarningKind::MalformedTable => "malformed_table",
            WarningKind::HeaderRowsClamped => "header_rows_clamped",
            WarningKind::EmptyTable => "empty_table",
            WarningKind::ImageLoad => "image_load",
            WarningKind::InvalidImageSize => "invalid_image_size",
            WarningKind::UnrecognizedShape => "unrecognized_shape",
            WarningKind::HeadingClamped => "heading_clamped",
            WarningKind::InvalidCharacters => "invalid_characters",
        }
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recoverable problem tied to a section
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Warning {
    pub timestamp: DateTime<Utc>,
    /// Name of the section being rendered, if any
    pub section: Option<String>,
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    pub fn new(section: Option<&str>, kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            section: section.map(str::to_string),
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.section {
            Some(section) => write!(f, "[{}] {}: {}", self.kind, section, self.message),
            None => write!(f, "[{}] {}", self.kind, self.message),
        }
    }
}

/// Receiver for warnings
pub trait WarningSink {
    fn warn(&mut self, warning: &Warning);
}

/// Sink that logs each warning through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl WarningSink for TracingSink {
    fn warn(&mut self, warning: &Warning) {
        tracing::warn!(
            section = warning.section.as_deref().unwrap_or(""),
            kind = %warning.kind,
            "{}",
            warning.message
        );
    }
}

/// Sink that keeps every warning in memory
#[derive(Debug, Default, Clone)]
pub struct CollectingSink {
    pub warnings: Vec<Warning>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Warnings of one kind
    pub fn of_kind(&self, kind: WarningKind) -> impl Iterator<Item = &Warning> {
        self.warnings.iter().filter(move |w| w.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }
}

impl WarningSink for CollectingSink {
    fn warn(&mut self, warning: &Warning) {
        self.warnings.push(warning.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_sink() {
        let mut sink = CollectingSink::new();
        sink.warn(&Warning::new(Some("Intro"), WarningKind::UnknownStyle, "no style 'Fancy'"));
        sink.warn(&Warning::new(None, WarningKind::EmptyTable, "empty"));

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.of_kind(WarningKind::UnknownStyle).count(), 1);
        assert_eq!(sink.warnings[0].section.as_deref(), Some("Intro"));
    }

    #[test]
    fn test_display() {
        let warning = Warning::new(Some("Data"), WarningKind::HeaderRowsClamped, "3 > 2");
        assert_eq!(warning.to_string(), "[header_rows_clamped] Data: 3 > 2");

        let warning = Warning::new(None, WarningKind::ImageLoad, "missing");
        assert_eq!(warning.to_string(), "[image_load] missing");
    }

    #[test]
    fn test_tracing_sink_accepts_warnings() {
        let mut sink = TracingSink;
        sink.warn(&Warning::new(Some("x"), WarningKind::HeadingClamped, "level 4"));
    }
}
