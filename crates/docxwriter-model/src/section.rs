//! Section bodies and their classification
//!
//! Every entry of the `content` mapping is a [`Section`]. Its JSON value is
//! classified into exactly one [`SectionBody`] variant by a fixed precedence:
//!
//! 1. `table` key
//! 2. `list` key
//! 3. `image` key
//! 4. `style` and `text` keys
//! 5. `page_break` key
//! 6. plain string
//! 7. object without reserved keys (nested subsections)
//!
//! A value that matches none of these is a [`ShapeError`], never a silent
//! no-op.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ShapeError;

/// Keys that select or parameterize a section shape
pub const RESERVED_KEYS: &[&str] = &[
    "table",
    "list",
    "image",
    "style",
    "text",
    "page_break",
    "header_rows",
    "list_type",
    "level",
    "width",
    "height",
];

/// Header rows used when a table does not say
pub const DEFAULT_HEADER_ROWS: usize = 1;

/// Image width in inches used when none is given
pub const DEFAULT_IMAGE_WIDTH: f64 = 6.0;

/// Image height in inches used when none is given
pub const DEFAULT_IMAGE_HEIGHT: f64 = 4.0;

/// Deepest list indent level Word numbering supports (0-based)
pub const MAX_LIST_LEVEL: u8 = 8;

/// One named entry of the content mapping
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// Section name, rendered as the heading
    pub name: String,
    /// Raw JSON value of the section body
    pub value: Value,
}

impl Section {
    /// Create a section from a name and raw value
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Classify this section's value into a body shape
    pub fn classify(&self) -> Result<SectionBody, ShapeError> {
        classify(&self.value)
    }
}

/// The closed set of section body shapes
#[derive(Debug, Clone, PartialEq)]
pub enum SectionBody {
    /// Paragraph text, paragraphs separated by a blank line
    PlainText(String),
    /// A table of text cells
    Table(TableSpec),
    /// A bullet or numbered list
    List(ListSpec),
    /// An image loaded from the filesystem
    Image(ImageSpec),
    /// A hard page break (no heading is emitted)
    PageBreak(bool),
    /// A single run rendered in a named style
    StyledText(StyledTextSpec),
    /// Subsections rendered one heading level deeper
    Nested(Vec<Section>),
}

impl SectionBody {
    /// Short name of the shape, for logs
    pub fn kind(&self) -> &'static str {
        match self {
            SectionBody::PlainText(_) => "text",
            SectionBody::Table(_) => "table",
            SectionBody::List(_) => "list",
            SectionBody::Image(_) => "image",
            SectionBody::PageBreak(_) => "page_break",
            SectionBody::StyledText(_) => "styled_text",
            SectionBody::Nested(_) => "nested",
        }
    }
}

/// Table rows plus rendering hints
#[derive(Debug, Clone, PartialEq)]
pub struct TableSpec {
    /// Rows of cell text, in order
    pub rows: Vec<Vec<String>>,
    /// Named table style, `None` for the default
    pub style: Option<String>,
    /// Number of leading rows rendered as headers
    pub header_rows: usize,
}

/// List kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListType {
    /// Bulleted list
    #[default]
    Bullet,
    /// Numbered list
    #[serde(alias = "numbered")]
    Number,
}

impl ListType {
    /// Name as written in the JSON input
    pub fn as_str(self) -> &'static str {
        match self {
            ListType::Bullet => "bullet",
            ListType::Number => "number",
        }
    }
}

/// List items plus kind and indent level
#[derive(Debug, Clone, PartialEq)]
pub struct ListSpec {
    /// Item text, one paragraph each
    pub items: Vec<String>,
    /// Bullet or numbered
    pub list_type: ListType,
    /// Indent depth (0-based)
    pub level: u8,
}

/// Image reference and size in inches
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSpec {
    /// Path to the image file
    pub path: PathBuf,
    /// Width in inches
    pub width: f64,
    /// Height in inches
    pub height: f64,
}

/// Text rendered in one named style
#[derive(Debug, Clone, PartialEq)]
pub struct StyledTextSpec {
    /// Style name, looked up in the style registry
    pub style: String,
    /// Run text
    pub text: String,
}

/// Classify a raw section value into a body shape
pub fn classify(value: &Value) -> Result<SectionBody, ShapeError> {
    match value {
        Value::String(text) => Ok(SectionBody::PlainText(text.clone())),
        Value::Object(map) => classify_object(map),
        Value::Null => Err(ShapeError::Unrecognized("null".to_string())),
        Value::Bool(_) => Err(ShapeError::Unrecognized("boolean".to_string())),
        Value::Number(_) => Err(ShapeError::Unrecognized("number".to_string())),
        Value::Array(_) => Err(ShapeError::Unrecognized("array".to_string())),
    }
}

fn classify_object(map: &Map<String, Value>) -> Result<SectionBody, ShapeError> {
    if let Some(rows) = map.get("table") {
        return parse_table(rows, map).map(SectionBody::Table);
    }
    if let Some(items) = map.get("list") {
        return parse_list(items, map).map(SectionBody::List);
    }
    if let Some(path) = map.get("image") {
        return parse_image(path, map).map(SectionBody::Image);
    }
    if let (Some(style), Some(text)) = (map.get("style"), map.get("text")) {
        return parse_styled_text(style, text).map(SectionBody::StyledText);
    }
    if let Some(flag) = map.get("page_break") {
        return flag
            .as_bool()
            .map(SectionBody::PageBreak)
            .ok_or(ShapeError::InvalidField {
                key: "page_break",
                expected: "a boolean",
            });
    }

    if map.is_empty() {
        return Err(ShapeError::Unrecognized("empty object".to_string()));
    }
    if map.keys().any(|k| RESERVED_KEYS.contains(&k.as_str())) {
        let keys: Vec<&str> = map.keys().map(|k| k.as_str()).collect();
        return Err(ShapeError::Unrecognized(format!(
            "object with keys [{}]",
            keys.join(", ")
        )));
    }

    Ok(SectionBody::Nested(
        map.iter()
            .map(|(name, value)| Section::new(name.clone(), value.clone()))
            .collect(),
    ))
}

fn parse_table(rows: &Value, map: &Map<String, Value>) -> Result<TableSpec, ShapeError> {
    const EXPECTED: &str = "an array of rows, each an array of text cells";

    let rows = rows.as_array().ok_or(ShapeError::InvalidField {
        key: "table",
        expected: EXPECTED,
    })?;
    let rows = rows
        .iter()
        .map(|row| {
            row.as_array()
                .and_then(|cells| cells.iter().map(cell_text).collect::<Option<Vec<_>>>())
                .ok_or(ShapeError::InvalidField {
                    key: "table",
                    expected: EXPECTED,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let style = optional_string(map, "style")?;
    let header_rows = match map.get("header_rows") {
        None => DEFAULT_HEADER_ROWS,
        Some(v) => v
            .as_u64()
            .map(|n| n as usize)
            .ok_or(ShapeError::InvalidField {
                key: "header_rows",
                expected: "a non-negative integer",
            })?,
    };

    Ok(TableSpec {
        rows,
        style,
        header_rows,
    })
}

fn parse_list(items: &Value, map: &Map<String, Value>) -> Result<ListSpec, ShapeError> {
    let items = items
        .as_array()
        .and_then(|items| items.iter().map(cell_text).collect::<Option<Vec<_>>>())
        .ok_or(ShapeError::InvalidField {
            key: "list",
            expected: "an array of text items",
        })?;

    let list_type = match map.get("list_type") {
        None => ListType::default(),
        Some(v) => {
            ListType::deserialize(v).map_err(|_| ShapeError::InvalidField {
                key: "list_type",
                expected: "\"bullet\" or \"number\"",
            })?
        }
    };

    let level = match map.get("level") {
        None => 0,
        Some(v) => v
            .as_u64()
            .filter(|n| *n <= u64::from(MAX_LIST_LEVEL))
            .map(|n| n as u8)
            .ok_or(ShapeError::InvalidField {
                key: "level",
                expected: "an integer between 0 and 8",
            })?,
    };

    Ok(ListSpec {
        items,
        list_type,
        level,
    })
}

fn parse_image(path: &Value, map: &Map<String, Value>) -> Result<ImageSpec, ShapeError> {
    let path = path
        .as_str()
        .filter(|p| !p.trim().is_empty())
        .ok_or(ShapeError::InvalidField {
            key: "image",
            expected: "a non-empty file path",
        })?;

    let width = optional_number(map, "width")?.unwrap_or(DEFAULT_IMAGE_WIDTH);
    let height = optional_number(map, "height")?.unwrap_or(DEFAULT_IMAGE_HEIGHT);

    Ok(ImageSpec {
        path: PathBuf::from(path),
        width,
        height,
    })
}

fn parse_styled_text(style: &Value, text: &Value) -> Result<StyledTextSpec, ShapeError> {
    let style = style.as_str().ok_or(ShapeError::InvalidField {
        key: "style",
        expected: "a style name",
    })?;
    let text = text.as_str().ok_or(ShapeError::InvalidField {
        key: "text",
        expected: "a string",
    })?;

    Ok(StyledTextSpec {
        style: style.to_string(),
        text: text.to_string(),
    })
}

/// Scalar JSON values are accepted as cell and item text
fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn optional_string(
    map: &Map<String, Value>,
    key: &'static str,
) -> Result<Option<String>, ShapeError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ShapeError::InvalidField {
            key,
            expected: "a string",
        }),
    }
}

fn optional_number(map: &Map<String, Value>, key: &'static str) -> Result<Option<f64>, ShapeError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v.as_f64().map(Some).ok_or(ShapeError::InvalidField {
            key,
            expected: "a number of inches",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_string_is_text() {
        let body = classify(&json!("para one\n\npara two")).unwrap();
        assert_eq!(body, SectionBody::PlainText("para one\n\npara two".to_string()));
    }

    #[test]
    fn test_table_with_defaults() {
        let body = classify(&json!({"table": [["a", "b"], ["1", 2]]})).unwrap();
        match body {
            SectionBody::Table(table) => {
                assert_eq!(table.rows, vec![vec!["a", "b"], vec!["1", "2"]]);
                assert_eq!(table.style, None);
                assert_eq!(table.header_rows, DEFAULT_HEADER_ROWS);
            }
            other => panic!("expected table, got {:?}", other),
        }
    }

    #[test]
    fn test_table_wins_over_list() {
        let body = classify(&json!({"table": [["a"]], "list": ["b"]})).unwrap();
        assert!(matches!(body, SectionBody::Table(_)));
    }

    #[test]
    fn test_list_wins_over_image() {
        let body = classify(&json!({"image": "x.png", "list": ["b"]})).unwrap();
        assert!(matches!(body, SectionBody::List(_)));
    }

    #[test]
    fn test_image_wins_over_styled_text() {
        let body = classify(&json!({"image": "x.png", "style": "Quote", "text": "t"})).unwrap();
        assert!(matches!(body, SectionBody::Image(_)));
    }

    #[test]
    fn test_styled_text_wins_over_page_break() {
        let body = classify(&json!({"style": "Quote", "text": "t", "page_break": true})).unwrap();
        assert!(matches!(body, SectionBody::StyledText(_)));
    }

    #[test]
    fn test_table_style_key_does_not_make_styled_text() {
        let body = classify(&json!({"table": [["a"]], "style": "Table Grid", "text": "x"})).unwrap();
        match body {
            SectionBody::Table(table) => assert_eq!(table.style.as_deref(), Some("Table Grid")),
            other => panic!("expected table, got {:?}", other),
        }
    }

    #[test]
    fn test_list_type_and_level() {
        let body = classify(&json!({"list": ["a", "b"], "list_type": "number", "level": 2})).unwrap();
        assert_eq!(
            body,
            SectionBody::List(ListSpec {
                items: vec!["a".to_string(), "b".to_string()],
                list_type: ListType::Number,
                level: 2,
            })
        );

        let body = classify(&json!({"list": ["a"], "list_type": "numbered"})).unwrap();
        assert!(matches!(
            body,
            SectionBody::List(ListSpec {
                list_type: ListType::Number,
                ..
            })
        ));
    }

    #[test]
    fn test_list_rejects_unknown_type_and_deep_level() {
        let err = classify(&json!({"list": ["a"], "list_type": "roman"})).unwrap_err();
        assert!(matches!(err, ShapeError::InvalidField { key: "list_type", .. }));

        let err = classify(&json!({"list": ["a"], "level": 9})).unwrap_err();
        assert!(matches!(err, ShapeError::InvalidField { key: "level", .. }));

        let err = classify(&json!({"list": ["a"], "level": -1})).unwrap_err();
        assert!(matches!(err, ShapeError::InvalidField { key: "level", .. }));
    }

    #[test]
    fn test_image_defaults() {
        let body = classify(&json!({"image": "figures/plot.png"})).unwrap();
        assert_eq!(
            body,
            SectionBody::Image(ImageSpec {
                path: PathBuf::from("figures/plot.png"),
                width: DEFAULT_IMAGE_WIDTH,
                height: DEFAULT_IMAGE_HEIGHT,
            })
        );
    }

    #[test]
    fn test_image_explicit_size() {
        let body = classify(&json!({"image": "nonexistent.jpg", "width": 1.0, "height": 1.5})).unwrap();
        match body {
            SectionBody::Image(image) => {
                assert_eq!(image.width, 1.0);
                assert_eq!(image.height, 1.5);
            }
            other => panic!("expected image, got {:?}", other),
        }
    }

    #[test]
    fn test_page_break() {
        assert_eq!(
            classify(&json!({"page_break": true})).unwrap(),
            SectionBody::PageBreak(true)
        );
        assert_eq!(
            classify(&json!({"page_break": false})).unwrap(),
            SectionBody::PageBreak(false)
        );
        assert!(classify(&json!({"page_break": "yes"})).is_err());
    }

    #[test]
    fn test_styled_text() {
        let body = classify(&json!({"style": "Nonexistent", "text": "hi"})).unwrap();
        assert_eq!(
            body,
            SectionBody::StyledText(StyledTextSpec {
                style: "Nonexistent".to_string(),
                text: "hi".to_string(),
            })
        );
    }

    #[test]
    fn test_nested_sections_keep_order() {
        let body = classify(&json!({"Zeta": "z", "Alpha": {"list": ["a"]}})).unwrap();
        match body {
            SectionBody::Nested(sections) => {
                let names: Vec<&str> = sections.iter().map(|s| s.name.as_str()).collect();
                assert_eq!(names, vec!["Zeta", "Alpha"]);
            }
            other => panic!("expected nested, got {:?}", other),
        }
    }

    #[test]
    fn test_unrecognized_shapes() {
        for value in [
            json!(42),
            json!(true),
            json!(null),
            json!(["a", "b"]),
            json!({}),
            json!({"style": "Quote"}),
            json!({"text": "orphan"}),
        ] {
            let err = classify(&value).unwrap_err();
            assert!(
                matches!(err, ShapeError::Unrecognized(_)),
                "{} should be unrecognized",
                value
            );
        }
    }

    #[test]
    fn test_malformed_table_cells() {
        let err = classify(&json!({"table": [["a", {"nested": 1}]]})).unwrap_err();
        assert!(matches!(err, ShapeError::InvalidField { key: "table", .. }));

        let err = classify(&json!({"table": "not rows"})).unwrap_err();
        assert!(matches!(err, ShapeError::InvalidField { key: "table", .. }));
    }

    #[test]
    fn test_section_kind_names() {
        let section = Section::new("Data", json!({"table": [["a"]]}));
        assert_eq!(section.classify().unwrap().kind(), "table");
    }
}
