//! Document root and top-level validation
//!
//! A [`DocumentSpec`] is parsed once from the JSON input and stays immutable
//! for the rest of the conversion.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Component, Path};

use serde::Deserialize;
use serde_json::Value;

use crate::error::{ModelError, Result};
use crate::section::Section;

/// File extension every output name must carry
pub const DOCX_EXTENSION: &str = ".docx";

/// A parsed document description
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSpec {
    /// Document title
    pub title: String,
    /// Output file name (bare name ending in `.docx`)
    pub file_name: String,
    /// Sections in input order
    pub content: Vec<Section>,
}

/// Top-level keys as they appear in the input, before validation
#[derive(Debug, Deserialize)]
struct RawDocument {
    title: Option<Value>,
    file_name: Option<Value>,
    content: Option<Value>,
}

impl DocumentSpec {
    /// Create a document with no sections
    pub fn new(title: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            file_name: file_name.into(),
            content: Vec::new(),
        }
    }

    /// Append a section
    pub fn push(&mut self, section: Section) {
        self.content.push(section);
    }

    /// Parse from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: RawDocument = serde_json::from_str(json)?;
        Self::from_raw(raw)
    }

    /// Parse from any reader producing UTF-8 JSON
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let raw: RawDocument = serde_json::from_reader(reader)?;
        Self::from_raw(raw)
    }

    /// Read and parse a JSON file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ModelError::ReadInput {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file))
    }

    fn from_raw(raw: RawDocument) -> Result<Self> {
        let title = required_string(raw.title, "title")?;
        let file_name = required_string(raw.file_name, "file_name")?;

        let content = match raw.content {
            None => return Err(ModelError::MissingField("content")),
            Some(value) => flatten_content(value)?,
        };

        let spec = Self {
            title,
            file_name,
            content,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Check the fields needed before any output work can start
    ///
    /// The title and file name must be non-empty, and the file name must be
    /// a bare `.docx` name that cannot escape the output directory.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(ModelError::MissingField("title"));
        }
        if self.file_name.trim().is_empty() {
            return Err(ModelError::MissingField("file_name"));
        }

        let invalid = |reason: &str| ModelError::InvalidField {
            field: "file_name",
            reason: reason.to_string(),
        };

        if !self.file_name.to_ascii_lowercase().ends_with(DOCX_EXTENSION) {
            return Err(invalid("must end in .docx"));
        }
        let mut components = Path::new(&self.file_name).components();
        let bare = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if !bare || self.file_name.contains(['/', '\\']) {
            return Err(invalid("must be a plain file name without directories"));
        }
        if self.file_name.len() == DOCX_EXTENSION.len() {
            return Err(invalid("has an extension but no name"));
        }

        Ok(())
    }

    /// Number of top-level sections
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Whether there are no sections
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

fn required_string(value: Option<Value>, field: &'static str) -> Result<String> {
    match value {
        None | Some(Value::Null) => Err(ModelError::MissingField(field)),
        Some(Value::String(s)) if s.trim().is_empty() => Err(ModelError::MissingField(field)),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(ModelError::InvalidField {
            field,
            reason: "must be a string".to_string(),
        }),
    }
}

/// `content` is either one mapping or an array of mappings
fn flatten_content(value: Value) -> Result<Vec<Section>> {
    let not_a_mapping = || ModelError::InvalidField {
        field: "content",
        reason: "must be an object or an array of objects".to_string(),
    };

    match value {
        Value::Object(map) => Ok(map
            .into_iter()
            .map(|(name, value)| Section::new(name, value))
            .collect()),
        Value::Array(parts) => {
            let mut sections = Vec::new();
            for part in parts {
                match part {
                    Value::Object(map) => sections.extend(
                        map.into_iter()
                            .map(|(name, value)| Section::new(name, value)),
                    ),
                    _ => return Err(not_a_mapping()),
                }
            }
            Ok(sections)
        }
        _ => Err(not_a_mapping()),
    }
}
