//! The style registry (word/styles.xml)
//!
//! A fixed, read-only table of named styles. The dispatcher resolves style
//! names through [`StyleRegistry::resolve`] and copies a style's attributes
//! onto runs and paragraphs with [`Style::apply_run`] and
//! [`Style::apply_paragraph`]. The same table is rendered into the package as
//! `word/styles.xml`.
//!
//! # Example
//!
//! ```
//! use docxwriter_ooxml::styles::{RunFormat, StyleRegistry};
//!
//! let registry = StyleRegistry::standard();
//! let quote = registry.resolve("Quote").unwrap();
//!
//! let mut run = RunFormat::default();
//! quote.apply_run(&mut run);
//! assert!(run.italic);
//! ```

use std::collections::HashMap;

use crate::error::{OoxmlError, Result};
use crate::xml::{escape_xml, pt_to_half_points, pt_to_twips, DECLARATION, NS_W};

/// Default paragraph style
pub const NORMAL: &str = "Normal";
/// Style of the document title paragraph
pub const TITLE: &str = "Title";
/// Style carrying the watermark text
pub const HIDDEN: &str = "Hidden";
/// Fallback table style
pub const TABLE_GRID: &str = "Table Grid";
/// Paragraph style for bullet list items
pub const LIST_BULLET: &str = "List Bullet";
/// Paragraph style for numbered list items
pub const LIST_NUMBER: &str = "List Number";
/// Deepest heading level with a style in the table
pub const MAX_HEADING_LEVEL: u8 = 3;

const SERIF: &str = "Times New Roman";
const MONO: &str = "Courier New";

/// Name of the heading style for a level (1-based)
pub fn heading_style(level: u8) -> String {
    format!("Heading {}", level)
}

/// What a style can be attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleKind {
    /// Paragraph style (`w:pStyle`)
    Paragraph,
    /// Character style (`w:rStyle`)
    Character,
    /// Table style (`w:tblStyle`)
    Table,
}

impl StyleKind {
    fn as_ooxml(self) -> &'static str {
        match self {
            StyleKind::Paragraph => "paragraph",
            StyleKind::Character => "character",
            StyleKind::Table => "table",
        }
    }
}

/// Paragraph justification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    fn as_ooxml(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "both",
        }
    }
}

/// A named style definition
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    /// Display name, the registry key
    pub name: String,
    /// Identifier used in document references (name without spaces)
    pub style_id: String,
    pub kind: StyleKind,
    pub font: String,
    pub size_pt: f32,
    /// RGB hex color, e.g. "FF0000"
    pub color: Option<String>,
    pub bold: bool,
    pub italic: bool,
    pub alignment: Option<Alignment>,
    /// Line spacing as a multiple of single spacing
    pub line_spacing: Option<f32>,
    pub space_before_pt: Option<f32>,
    pub space_after_pt: Option<f32>,
    pub left_indent_pt: Option<f32>,
    pub right_indent_pt: Option<f32>,
    /// First-line indent; negative values are a hanging indent
    pub first_line_indent_pt: Option<f32>,
    /// Outline level for headings (0 = Heading 1)
    pub outline_level: Option<u8>,
}

impl Style {
    fn new(name: &str, kind: StyleKind, font: &str, size_pt: f32) -> Self {
        Self {
            name: name.to_string(),
            style_id: name.replace(' ', ""),
            kind,
            font: font.to_string(),
            size_pt,
            color: None,
            bold: false,
            italic: false,
            alignment: None,
            line_spacing: None,
            space_before_pt: None,
            space_after_pt: None,
            left_indent_pt: None,
            right_indent_pt: None,
            first_line_indent_pt: None,
            outline_level: None,
        }
    }

    /// Create a paragraph style
    pub fn paragraph(name: &str, font: &str, size_pt: f32) -> Self {
        Self::new(name, StyleKind::Paragraph, font, size_pt)
    }

    /// Create a character style
    pub fn character(name: &str, font: &str, size_pt: f32) -> Self {
        Self::new(name, StyleKind::Character, font, size_pt)
    }

    /// Create a table style
    pub fn table(name: &str, font: &str, size_pt: f32) -> Self {
        Self::new(name, StyleKind::Table, font, size_pt)
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn color(mut self, rgb: &str) -> Self {
        self.color = Some(rgb.to_string());
        self
    }

    pub fn align(mut self, alignment: Alignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    pub fn line_spacing(mut self, multiple: f32) -> Self {
        self.line_spacing = Some(multiple);
        self
    }

    pub fn spacing(mut self, before_pt: f32, after_pt: f32) -> Self {
        self.space_before_pt = Some(before_pt);
        self.space_after_pt = Some(after_pt);
        self
    }

    pub fn space_after(mut self, after_pt: f32) -> Self {
        self.space_after_pt = Some(after_pt);
        self
    }

    pub fn indent(mut self, left_pt: f32, right_pt: f32) -> Self {
        self.left_indent_pt = Some(left_pt);
        self.right_indent_pt = Some(right_pt);
        self
    }

    /// Left indent with a hanging first line
    pub fn hanging(mut self, left_pt: f32, hanging_pt: f32) -> Self {
        self.left_indent_pt = Some(left_pt);
        self.first_line_indent_pt = Some(-hanging_pt);
        self
    }

    pub fn first_line(mut self, indent_pt: f32) -> Self {
        self.first_line_indent_pt = Some(indent_pt);
        self
    }

    pub fn outline(mut self, level: u8) -> Self {
        self.outline_level = Some(level);
        self
    }

    /// Copy this style's character attributes onto a run.
    ///
    /// Attributes are assigned, never toggled, so applying twice is the same
    /// as applying once.
    pub fn apply_run(&self, run: &mut RunFormat) {
        if self.kind == StyleKind::Character {
            run.style_id = Some(self.style_id.clone());
        }
        run.font = Some(self.font.clone());
        run.size_pt = Some(self.size_pt);
        run.color = self.color.clone();
        run.bold = self.bold;
        run.italic = self.italic;
    }

    /// Copy this style's paragraph attributes onto a paragraph.
    ///
    /// Character and table styles only contribute what a paragraph can carry:
    /// they leave the paragraph style reference alone.
    pub fn apply_paragraph(&self, paragraph: &mut ParagraphFormat) {
        if self.kind == StyleKind::Paragraph {
            paragraph.style_id = Some(self.style_id.clone());
        }
        paragraph.alignment = self.alignment;
        paragraph.line_spacing = self.line_spacing;
        paragraph.space_before_pt = self.space_before_pt;
        paragraph.space_after_pt = self.space_after_pt;
        paragraph.left_indent_pt = self.left_indent_pt;
        paragraph.right_indent_pt = self.right_indent_pt;
        paragraph.first_line_indent_pt = self.first_line_indent_pt;
        paragraph.outline_level = self.outline_level;
    }

    fn to_xml(&self, out: &mut String) {
        out.push_str(&format!(
            r#"<w:style w:type="{}" w:styleId="{}""#,
            self.kind.as_ooxml(),
            escape_xml(&self.style_id)
        ));
        if self.name == NORMAL || self.name == TABLE_GRID {
            out.push_str(r#" w:default="1""#);
        }
        out.push('>');
        out.push_str(&format!(r#"<w:name w:val="{}"/>"#, escape_xml(&self.name)));

        if self.kind == StyleKind::Paragraph && self.name != NORMAL {
            out.push_str(r#"<w:basedOn w:val="Normal"/>"#);
            if self.outline_level.is_some() || self.name == TITLE {
                out.push_str(r#"<w:next w:val="Normal"/>"#);
            }
        }
        out.push_str("<w:qFormat/>");

        if self.kind != StyleKind::Character {
            let mut paragraph = ParagraphFormat::default();
            self.apply_paragraph(&mut paragraph);
            // the style itself is the reference, never itself referenced
            paragraph.style_id = None;
            out.push_str(&paragraph.to_xml());
        }

        let mut run = RunFormat::default();
        self.apply_run(&mut run);
        run.style_id = None;
        out.push_str(&run.to_xml());

        if self.kind == StyleKind::Table {
            out.push_str("<w:tblPr><w:tblBorders>");
            for edge in ["top", "left", "bottom", "right", "insideH", "insideV"] {
                out.push_str(&format!(
                    r#"<w:{} w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#,
                    edge
                ));
            }
            out.push_str("</w:tblBorders>");
            out.push_str(
                r#"<w:tblCellMar><w:left w:w="108" w:type="dxa"/><w:right w:w="108" w:type="dxa"/></w:tblCellMar>"#,
            );
            out.push_str("</w:tblPr>");
        }

        out.push_str("</w:style>");
    }
}

/// Character formatting of a single run (`w:rPr`)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunFormat {
    /// Character style reference
    pub style_id: Option<String>,
    pub font: Option<String>,
    pub size_pt: Option<f32>,
    pub color: Option<String>,
    pub bold: bool,
    pub italic: bool,
}

impl RunFormat {
    /// Render as `<w:rPr>`, or nothing when no attribute is set
    pub fn to_xml(&self) -> String {
        let mut inner = String::new();
        if let Some(id) = &self.style_id {
            inner.push_str(&format!(r#"<w:rStyle w:val="{}"/>"#, escape_xml(id)));
        }
        if let Some(font) = &self.font {
            let font = escape_xml(font);
            inner.push_str(&format!(
                r#"<w:rFonts w:ascii="{0}" w:hAnsi="{0}" w:cs="{0}"/>"#,
                font
            ));
        }
        if self.bold {
            inner.push_str("<w:b/>");
        }
        if self.italic {
            inner.push_str("<w:i/>");
        }
        if let Some(color) = &self.color {
            inner.push_str(&format!(r#"<w:color w:val="{}"/>"#, escape_xml(color)));
        }
        if let Some(size) = self.size_pt {
            let half_points = pt_to_half_points(size);
            inner.push_str(&format!(
                r#"<w:sz w:val="{0}"/><w:szCs w:val="{0}"/>"#,
                half_points
            ));
        }

        if inner.is_empty() {
            String::new()
        } else {
            format!("<w:rPr>{}</w:rPr>", inner)
        }
    }
}

/// Paragraph properties (`w:pPr`)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParagraphFormat {
    /// Paragraph style reference
    pub style_id: Option<String>,
    /// List membership: (numbering instance, indent level)
    pub numbering: Option<(u32, u8)>,
    pub alignment: Option<Alignment>,
    pub line_spacing: Option<f32>,
    pub space_before_pt: Option<f32>,
    pub space_after_pt: Option<f32>,
    pub left_indent_pt: Option<f32>,
    pub right_indent_pt: Option<f32>,
    pub first_line_indent_pt: Option<f32>,
    pub outline_level: Option<u8>,
}

impl ParagraphFormat {
    /// Paragraph that only references a style
    pub fn styled(style_id: impl Into<String>) -> Self {
        Self {
            style_id: Some(style_id.into()),
            ..Self::default()
        }
    }

    /// Render as `<w:pPr>`, or nothing when no property is set
    pub fn to_xml(&self) -> String {
        let mut inner = String::new();
        if let Some(id) = &self.style_id {
            inner.push_str(&format!(r#"<w:pStyle w:val="{}"/>"#, escape_xml(id)));
        }
        if let Some((num_id, level)) = self.numbering {
            inner.push_str(&format!(
                r#"<w:numPr><w:ilvl w:val="{}"/><w:numId w:val="{}"/></w:numPr>"#,
                level, num_id
            ));
        }

        if self.space_before_pt.is_some()
            || self.space_after_pt.is_some()
            || self.line_spacing.is_some()
        {
            inner.push_str("<w:spacing");
            if let Some(before) = self.space_before_pt {
                inner.push_str(&format!(r#" w:before="{}""#, pt_to_twips(before)));
            }
            if let Some(after) = self.space_after_pt {
                inner.push_str(&format!(r#" w:after="{}""#, pt_to_twips(after)));
            }
            if let Some(multiple) = self.line_spacing {
                let line = (multiple * 240.0).round() as i32;
                inner.push_str(&format!(r#" w:line="{}" w:lineRule="auto""#, line));
            }
            inner.push_str("/>");
        }

        if self.left_indent_pt.is_some()
            || self.right_indent_pt.is_some()
            || self.first_line_indent_pt.is_some()
        {
            inner.push_str("<w:ind");
            if let Some(left) = self.left_indent_pt {
                inner.push_str(&format!(r#" w:left="{}""#, pt_to_twips(left)));
            }
            if let Some(right) = self.right_indent_pt {
                inner.push_str(&format!(r#" w:right="{}""#, pt_to_twips(right)));
            }
            match self.first_line_indent_pt {
                Some(first) if first < 0.0 => {
                    inner.push_str(&format!(r#" w:hanging="{}""#, pt_to_twips(-first)));
                }
                Some(first) => {
                    inner.push_str(&format!(r#" w:firstLine="{}""#, pt_to_twips(first)));
                }
                None => {}
            }
            inner.push_str("/>");
        }

        if let Some(alignment) = self.alignment {
            inner.push_str(&format!(r#"<w:jc w:val="{}"/>"#, alignment.as_ooxml()));
        }
        if let Some(level) = self.outline_level {
            inner.push_str(&format!(r#"<w:outlineLvl w:val="{}"/>"#, level));
        }

        if inner.is_empty() {
            String::new()
        } else {
            format!("<w:pPr>{}</w:pPr>", inner)
        }
    }
}

/// Read-only table of named styles
#[derive(Debug, Clone)]
pub struct StyleRegistry {
    styles: Vec<Style>,
    by_name: HashMap<String, usize>,
}

impl StyleRegistry {
    /// The stylesheet every generated document uses
    pub fn standard() -> Self {
        let styles = vec![
            Style::paragraph(NORMAL, SERIF, 12.0)
                .line_spacing(2.0)
                .space_after(0.0)
                .first_line(36.0),
            Style::paragraph(TITLE, SERIF, 18.0)
                .bold()
                .align(Alignment::Center)
                .space_after(24.0),
            Style::paragraph("Subtitle", SERIF, 14.0)
                .italic()
                .align(Alignment::Center)
                .space_after(24.0),
            Style::paragraph("Heading 1", SERIF, 16.0)
                .bold()
                .spacing(18.0, 12.0)
                .outline(0),
            Style::paragraph("Heading 2", SERIF, 14.0)
                .bold()
                .spacing(18.0, 12.0)
                .outline(1),
            Style::paragraph("Heading 3", SERIF, 12.0)
                .bold()
                .spacing(18.0, 12.0)
                .outline(2),
            Style::paragraph("Abstract", SERIF, 12.0)
                .line_spacing(2.0)
                .spacing(0.0, 24.0)
                .first_line(0.0),
            Style::paragraph("Quote", SERIF, 12.0)
                .italic()
                .indent(36.0, 36.0)
                .spacing(12.0, 12.0),
            Style::paragraph("Code", MONO, 12.0)
                .indent(36.0, 36.0)
                .spacing(12.0, 12.0),
            Style::paragraph("Warning", SERIF, 12.0)
                .color("FFC000")
                .indent(36.0, 36.0)
                .spacing(12.0, 12.0),
            Style::paragraph("Error", SERIF, 12.0)
                .color("FF0000")
                .indent(36.0, 36.0)
                .spacing(12.0, 12.0),
            Style::paragraph("Success", SERIF, 12.0)
                .color("00B050")
                .indent(36.0, 36.0)
                .spacing(12.0, 12.0),
            Style::paragraph(LIST_BULLET, SERIF, 12.0).hanging(36.0, 18.0),
            Style::paragraph(LIST_NUMBER, SERIF, 12.0).hanging(36.0, 18.0),
            Style::table(TABLE_GRID, SERIF, 12.0).align(Alignment::Left),
            Style::paragraph("Caption", SERIF, 10.0)
                .italic()
                .align(Alignment::Center)
                .spacing(6.0, 6.0),
            Style::paragraph("Footnote", SERIF, 8.0).hanging(36.0, 18.0),
            Style::paragraph("Header", SERIF, 10.0).align(Alignment::Right),
            Style::paragraph("Footer", SERIF, 10.0).align(Alignment::Center),
            Style::paragraph(HIDDEN, SERIF, 1.0)
                .color("FFFFFF")
                .align(Alignment::Center),
        ];

        let by_name = styles
            .iter()
            .enumerate()
            .map(|(i, s)| (s.name.clone(), i))
            .collect();
        Self { styles, by_name }
    }

    /// Build a registry from a custom table. Names must be unique.
    pub fn with_styles(styles: impl IntoIterator<Item = Style>) -> Result<Self> {
        let styles: Vec<Style> = styles.into_iter().collect();
        let mut by_name = HashMap::with_capacity(styles.len());
        for (i, style) in styles.iter().enumerate() {
            if by_name.insert(style.name.clone(), i).is_some() {
                return Err(OoxmlError::InvalidStructure(format!(
                    "duplicate style name: {}",
                    style.name
                )));
            }
        }
        Ok(Self { styles, by_name })
    }

    /// Look up a style by its exact (case-sensitive) name
    pub fn resolve(&self, name: &str) -> Result<&Style> {
        self.get(name)
            .ok_or_else(|| OoxmlError::StyleNotFound(name.to_string()))
    }

    pub fn get(&self, name: &str) -> Option<&Style> {
        self.by_name.get(name).map(|&i| &self.styles[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Style names in table order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.styles.iter().map(|s| s.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Style> {
        self.styles.iter()
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Render the table as the `word/styles.xml` part
    pub fn to_styles_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str(DECLARATION);
        xml.push('\n');
        xml.push_str(&format!(r#"<w:styles xmlns:w="{}">"#, NS_W));

        let default_run = self
            .get(NORMAL)
            .map(|normal| {
                let mut run = RunFormat::default();
                normal.apply_run(&mut run);
                run.to_xml()
            })
            .unwrap_or_default();
        xml.push_str("<w:docDefaults><w:rPrDefault>");
        xml.push_str(&default_run);
        xml.push_str("</w:rPrDefault><w:pPrDefault/></w:docDefaults>");

        for style in &self.styles {
            style.to_xml(&mut xml);
        }

        xml.push_str("</w:styles>");
        xml
    }
}

impl Default for StyleRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
