//! Content dispatch: from a [`DocumentSpec`] to a finished document
//!
//! The dispatcher walks the sections in order, emits a heading for each one
//! and hands the classified body to the matching writer operation.
//! Recoverable problems are reported to the [`WarningSink`] and collected in
//! the result; only input validation, [`TablePolicy::Abort`] and save
//! failures stop a build.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use docxwriter_model::{
    DocumentSpec, ImageSpec, ListSpec, ListType, Section, SectionBody, StyledTextSpec,
    TableSpec,
};
use serde::Deserialize;
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{OoxmlError, Result};
use crate::image::{inches_to_emu, load_image};
use crate::outline::DocumentOutline;
use crate::styles::{
    ParagraphFormat, RunFormat, StyleKind, StyleRegistry, LIST_BULLET, LIST_NUMBER,
    MAX_HEADING_LEVEL, NORMAL, TABLE_GRID,
};
use crate::warnings::{Warning, WarningKind, WarningSink};
use crate::writer::{DocxWriter, WatermarkPlacement};
use crate::xml::invalid_xml_chars;

/// Watermark text used unless the caller supplies one or disables it
pub const DEFAULT_WATERMARK: &str = "Generated with docxwriter";

/// Output directory used when none is configured
pub const DEFAULT_OUTPUT_DIR: &str = "data";

/// What to do with table rows whose width differs from the first row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TablePolicy {
    /// Pad short rows with empty cells and truncate long ones
    #[default]
    Pad,
    /// Leave such rows out
    SkipRows,
    /// Fail the whole build
    Abort,
}

/// Options for one build
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    /// Directory the document is saved into
    pub output_dir: PathBuf,
    /// Watermark text; `None` disables the watermark
    pub watermark: Option<String>,
    pub watermark_placement: WatermarkPlacement,
    pub table_policy: TablePolicy,
    /// Heading level of top-level sections
    pub heading_level: u8,
    /// Fallback directory for relative image paths that do not exist
    /// relative to the working directory
    pub asset_root: Option<PathBuf>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            watermark: Some(DEFAULT_WATERMARK.to_string()),
            watermark_placement: WatermarkPlacement::default(),
            table_policy: TablePolicy::default(),
            heading_level: 1,
            asset_root: None,
        }
    }
}

/// A document rendered in memory
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    /// File name the document is saved under
    pub file_name: String,
    /// DOCX package bytes
    pub bytes: Vec<u8>,
    pub warnings: Vec<Warning>,
}

impl RenderedDocument {
    /// Read the generated body back
    pub fn outline(&self) -> Result<DocumentOutline> {
        DocumentOutline::from_docx(&self.bytes)
    }

    /// Atomically write the document to `<dir>/<file_name>`.
    ///
    /// The bytes go to a temporary file in `dir` first, which is then renamed
    /// over the destination. On failure the temporary file is removed.
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        let save_error = |source| OoxmlError::DocumentSave {
            path: dir.join(&self.file_name),
            source,
        };

        fs::create_dir_all(dir).map_err(save_error)?;
        let mut temp = NamedTempFile::new_in(dir).map_err(save_error)?;
        temp.write_all(&self.bytes).map_err(save_error)?;
        temp.as_file().sync_all().map_err(save_error)?;

        let path = dir.join(&self.file_name);
        temp.persist(&path).map_err(|e| save_error(e.error))?;

        info!(
            path = %path.display(),
            bytes = self.bytes.len(),
            warnings = self.warnings.len(),
            "document saved"
        );
        Ok(path)
    }
}

/// A document saved to disk
#[derive(Debug, Clone)]
pub struct WrittenDocument {
    pub path: PathBuf,
    pub warnings: Vec<Warning>,
}

/// Per-call rendering state
struct RenderState<'r> {
    writer: DocxWriter<'r>,
    warnings: Vec<Warning>,
}

/// Maps document sections onto writer operations
pub struct ContentDispatcher<'a> {
    registry: &'a StyleRegistry,
    options: &'a BuildOptions,
    sink: &'a mut dyn WarningSink,
}

impl<'a> ContentDispatcher<'a> {
    pub fn new(
        registry: &'a StyleRegistry,
        options: &'a BuildOptions,
        sink: &'a mut dyn WarningSink,
    ) -> Self {
        Self {
            registry,
            options,
            sink,
        }
    }

    /// Render a document to DOCX bytes in memory
    pub fn render(&mut self, spec: &DocumentSpec) -> Result<RenderedDocument> {
        spec.validate()?;

        debug!(title = %spec.title, sections = spec.len(), "rendering document");
        let mut state = RenderState {
            writer: DocxWriter::new(self.registry),
            warnings: Vec::new(),
        };

        self.check_chars(&mut state, None, "title", invalid_xml_chars(&spec.title));
        state.writer.add_title(spec.title.trim());
        self.render_sections(&mut state, &spec.content, 0)?;

        let options = self.options;
        if let Some(text) = options.watermark.as_deref() {
            if !text.is_empty() {
                self.check_chars(&mut state, None, "watermark", invalid_xml_chars(text));
                state.writer.add_watermark(text, options.watermark_placement);
            }
        }

        let bytes = state.writer.finish()?;
        Ok(RenderedDocument {
            file_name: spec.file_name.clone(),
            bytes,
            warnings: state.warnings,
        })
    }

    /// Render a document and save it into the configured output directory
    pub fn build(&mut self, spec: &DocumentSpec) -> Result<WrittenDocument> {
        let rendered = self.render(spec)?;
        let path = rendered.save(&self.options.output_dir)?;
        Ok(WrittenDocument {
            path,
            warnings: rendered.warnings,
        })
    }

    fn warn(
        &mut self,
        state: &mut RenderState<'_>,
        section: &str,
        kind: WarningKind,
        message: String,
    ) {
        self.warn_at(state, Some(section), kind, message);
    }

    fn warn_at(
        &mut self,
        state: &mut RenderState<'_>,
        section: Option<&str>,
        kind: WarningKind,
        message: String,
    ) {
        let warning = Warning::new(section, kind, message);
        self.sink.warn(&warning);
        state.warnings.push(warning);
    }

    /// Report characters the writer drops because XML cannot hold them
    fn check_chars(
        &mut self,
        state: &mut RenderState<'_>,
        section: Option<&str>,
        what: &str,
        count: usize,
    ) {
        if count > 0 {
            self.warn_at(
                state,
                section,
                WarningKind::InvalidCharacters,
                format!("{} characters not allowed in XML removed from {}", count, what),
            );
        }
    }

    fn render_sections(
        &mut self,
        state: &mut RenderState<'_>,
        sections: &[Section],
        depth: usize,
    ) -> Result<()> {
        for section in sections {
            let body = match section.classify() {
                Ok(SectionBody::PageBreak(true)) => {
                    debug!(section = %section.name, "page break");
                    state.writer.add_page_break();
                    continue;
                }
                Ok(SectionBody::PageBreak(false)) => {
                    debug!(section = %section.name, "page_break is false, nothing emitted");
                    continue;
                }
                other => other,
            };

            let mut dropped = invalid_xml_chars(&section.name);
            if !matches!(body, Ok(SectionBody::Nested(_))) {
                dropped += invalid_chars_in(&section.value);
            }
            self.check_chars(state, Some(&section.name), "section", dropped);

            self.render_heading(state, &section.name, depth);

            match body {
                Ok(body) => {
                    debug!(section = %section.name, kind = body.kind(), depth, "rendering section");
                    self.render_body(state, &section.name, body, depth)?;
                }
                Err(e) => {
                    self.warn(state, &section.name, WarningKind::UnrecognizedShape, e.to_string());
                }
            }
        }
        Ok(())
    }

    fn render_heading(&mut self, state: &mut RenderState<'_>, name: &str, depth: usize) {
        let wanted = usize::from(self.options.heading_level) + depth;
        let level = wanted.clamp(1, usize::from(MAX_HEADING_LEVEL));
        if level != wanted {
            self.warn(
                state,
                name,
                WarningKind::HeadingClamped,
                format!("heading level {} is not available, using {}", wanted, level),
            );
        }
        // level is within 1..=MAX_HEADING_LEVEL here
        state.writer.add_heading(name.trim(), level as u8);
    }

    fn render_body(
        &mut self,
        state: &mut RenderState<'_>,
        section: &str,
        body: SectionBody,
        depth: usize,
    ) -> Result<()> {
        match body {
            SectionBody::PlainText(text) => render_text(state, &text),
            SectionBody::Table(table) => self.render_table(state, section, table)?,
            SectionBody::List(list) => render_list(state, list),
            SectionBody::Image(image) => self.render_image(state, section, image),
            SectionBody::StyledText(styled) => self.render_styled(state, section, styled),
            SectionBody::Nested(children) => {
                self.render_sections(state, &children, depth + 1)?;
            }
            // handled before the heading is emitted
            SectionBody::PageBreak(_) => {}
        }
        Ok(())
    }

    fn render_table(
        &mut self,
        state: &mut RenderState<'_>,
        section: &str,
        table: TableSpec,
    ) -> Result<()> {
        let TableSpec {
            rows,
            style,
            header_rows,
        } = table;

        let columns = rows.first().map(Vec::len).unwrap_or(0);
        if columns == 0 {
            let message = if rows.iter().any(|row| !row.is_empty()) {
                "first row is empty, so the table has no columns; nothing rendered"
            } else {
                "table has no cells, nothing rendered"
            };
            self.warn(state, section, WarningKind::EmptyTable, message.to_string());
            return Ok(());
        }

        let mut normalized = Vec::with_capacity(rows.len());
        for (index, mut row) in rows.into_iter().enumerate() {
            if row.len() != columns {
                let found = row.len();
                match self.options.table_policy {
                    TablePolicy::Abort => {
                        return Err(OoxmlError::MalformedTable {
                            section: section.to_string(),
                            row: index,
                            expected: columns,
                            found,
                        });
                    }
                    TablePolicy::SkipRows => {
                        self.warn(
                            state,
                            section,
                            WarningKind::MalformedTable,
                            format!(
                                "row {} has {} cells, expected {}; row skipped",
                                index, found, columns
                            ),
                        );
                        continue;
                    }
                    TablePolicy::Pad => {
                        self.warn(
                            state,
                            section,
                            WarningKind::MalformedTable,
                            format!(
                                "row {} has {} cells, expected {}; row resized",
                                index, found, columns
                            ),
                        );
                        row.resize(columns, String::new());
                    }
                }
            }
            normalized.push(row);
        }

        let header_rows = if header_rows > normalized.len() {
            self.warn(
                state,
                section,
                WarningKind::HeaderRowsClamped,
                format!(
                    "header_rows is {} but the table has {} rows",
                    header_rows,
                    normalized.len()
                ),
            );
            normalized.len()
        } else {
            header_rows
        };

        let style_name = self.table_style(state, section, style.as_deref());
        state.writer.add_table(&normalized, &style_name, header_rows);
        Ok(())
    }

    fn table_style(
        &mut self,
        state: &mut RenderState<'_>,
        section: &str,
        requested: Option<&str>,
    ) -> String {
        let Some(name) = requested else {
            return TABLE_GRID.to_string();
        };
        match self.registry.resolve(name) {
            Ok(style) if style.kind == StyleKind::Table => name.to_string(),
            Ok(_) => {
                self.warn(
                    state,
                    section,
                    WarningKind::UnknownStyle,
                    format!("'{}' is not a table style, using {}", name, TABLE_GRID),
                );
                TABLE_GRID.to_string()
            }
            Err(e) => {
                self.warn(
                    state,
                    section,
                    WarningKind::UnknownStyle,
                    format!("{}, using {}", e, TABLE_GRID),
                );
                TABLE_GRID.to_string()
            }
        }
    }

    fn render_image(&mut self, state: &mut RenderState<'_>, section: &str, image: ImageSpec) {
        let ImageSpec {
            path,
            width,
            height,
        } = image;

        let (cx, cy) = match (inches_to_emu(width), inches_to_emu(height)) {
            (Some(cx), Some(cy)) => (cx, cy),
            _ => {
                self.warn(
                    state,
                    section,
                    WarningKind::InvalidImageSize,
                    format!(
                        "image size {} x {} in must be positive and finite, image skipped",
                        width, height
                    ),
                );
                return;
            }
        };

        let resolved = self.resolve_asset(&path);
        match load_image(&resolved) {
            Ok(loaded) => {
                let name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("image");
                state.writer.add_image(loaded, name, cx, cy);
            }
            Err(e) => {
                self.warn(state, section, WarningKind::ImageLoad, e.to_string());
            }
        }
    }

    /// Relative paths are taken from the working directory first, then from
    /// the asset root.
    fn resolve_asset(&self, path: &Path) -> PathBuf {
        if path.is_absolute() || path.exists() {
            return path.to_path_buf();
        }
        match &self.options.asset_root {
            Some(root) => {
                let candidate = root.join(path);
                if candidate.exists() {
                    debug!(path = %candidate.display(), "image found under asset root");
                    candidate
                } else {
                    path.to_path_buf()
                }
            }
            None => path.to_path_buf(),
        }
    }

    fn render_styled(
        &mut self,
        state: &mut RenderState<'_>,
        section: &str,
        styled: StyledTextSpec,
    ) {
        let mut paragraph = ParagraphFormat::default();
        let mut run = RunFormat::default();

        match self.registry.resolve(&styled.style) {
            Ok(style) if style.kind == StyleKind::Paragraph => {
                style.apply_paragraph(&mut paragraph);
                style.apply_run(&mut run);
            }
            Ok(style) if style.kind == StyleKind::Character => {
                paragraph = ParagraphFormat::styled(NORMAL);
                style.apply_run(&mut run);
            }
            Ok(_) => {
                self.warn(
                    state,
                    section,
                    WarningKind::UnknownStyle,
                    format!("'{}' is a table style, using {}", styled.style, NORMAL),
                );
                paragraph = ParagraphFormat::styled(NORMAL);
            }
            Err(e) => {
                self.warn(
                    state,
                    section,
                    WarningKind::UnknownStyle,
                    format!("{}, using {}", e, NORMAL),
                );
                paragraph = ParagraphFormat::styled(NORMAL);
            }
        }

        state
            .writer
            .add_formatted_paragraph(&styled.text, &paragraph, &run);
    }
}

/// Plain text: blank-line separated paragraphs; a paragraph opening with
/// "- " or "* " is a bullet list with one item per line.
fn render_text(state: &mut RenderState<'_>, text: &str) {
    for part in text.split("\n\n") {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        if part.starts_with("- ") || part.starts_with("* ") {
            let num_id = state.writer.start_list(ListType::Bullet, 0);
            for item in part.lines().map(bullet_item).filter(|s| !s.is_empty()) {
                state.writer.add_list_item(item, LIST_BULLET, num_id, 0);
            }
        } else {
            state.writer.add_paragraph(part, NORMAL);
        }
    }
}

/// Characters XML cannot hold in any string of a section value
fn invalid_chars_in(value: &Value) -> usize {
    match value {
        Value::String(s) => invalid_xml_chars(s),
        Value::Array(items) => items.iter().map(invalid_chars_in).sum(),
        Value::Object(map) => map
            .iter()
            .map(|(key, v)| invalid_xml_chars(key) + invalid_chars_in(v))
            .sum(),
        _ => 0,
    }
}

fn bullet_item(line: &str) -> &str {
    line.trim_matches(|c: char| c == '-' || c == '*' || c.is_whitespace())
}

fn render_list(state: &mut RenderState<'_>, list: ListSpec) {
    let ListSpec {
        items,
        list_type,
        level,
    } = list;
    if items.is_empty() {
        debug!("empty list, nothing rendered");
        return;
    }

    let style = match list_type {
        ListType::Bullet => LIST_BULLET,
        ListType::Number => LIST_NUMBER,
    };
    let num_id = state.writer.start_list(list_type, level);
    for item in &items {
        state.writer.add_list_item(item, style, num_id, level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::Block;
    use crate::warnings::CollectingSink;
    use serde_json::json;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13];

    fn spec(content: serde_json::Value) -> DocumentSpec {
        DocumentSpec::from_json_str(
            &json!({"title": "Doc", "file_name": "doc.docx", "content": content}).to_string(),
        )
        .unwrap()
    }

    fn no_watermark() -> BuildOptions {
        BuildOptions {
            watermark: None,
            ..BuildOptions::default()
        }
    }

    fn render(content: serde_json::Value, options: &BuildOptions) -> (Vec<Block>, CollectingSink) {
        let registry = StyleRegistry::standard();
        let mut sink = CollectingSink::new();
        let rendered = ContentDispatcher::new(&registry, options, &mut sink)
            .render(&spec(content))
            .unwrap();
        assert_eq!(rendered.warnings, sink.warnings);
        (rendered.outline().unwrap().blocks, sink)
    }

    fn paragraphs(blocks: &[Block]) -> Vec<(Option<String>, String)> {
        blocks
            .iter()
            .filter_map(|b| match b {
                Block::Paragraph { style, text, .. } => Some((style.clone(), text.clone())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_default_options() {
        let options = BuildOptions::default();
        assert_eq!(options.output_dir, PathBuf::from("data"));
        assert_eq!(options.watermark.as_deref(), Some(DEFAULT_WATERMARK));
        assert_eq!(options.table_policy, TablePolicy::Pad);
        assert_eq!(options.heading_level, 1);
    }

    #[test]
    fn test_title_then_sections() {
        let (blocks, sink) = render(json!({"Intro": "Hello"}), &no_watermark());
        assert_eq!(
            paragraphs(&blocks),
            vec![
                (Some("Title".to_string()), "Doc".to_string()),
                (Some("Heading1".to_string()), "Intro".to_string()),
                (Some("Normal".to_string()), "Hello".to_string()),
            ]
        );
        assert!(sink.is_empty());
    }

    #[test]
    fn test_page_break_has_no_heading() {
        let (blocks, _) = render(
            json!({"A": "x", "Break": {"page_break": true}, "Skip": {"page_break": false}}),
            &no_watermark(),
        );
        let breaks = blocks
            .iter()
            .filter(|b| matches!(b, Block::Paragraph { page_break: true, .. }))
            .count();
        assert_eq!(breaks, 1);
        assert!(!paragraphs(&blocks).iter().any(|(_, t)| t == "Break" || t == "Skip"));
    }

    #[test]
    fn test_nested_sections_deepen_headings() {
        let options = BuildOptions {
            heading_level: 2,
            ..no_watermark()
        };
        let (blocks, sink) = render(
            json!({"Outer": {"Inner": {"Deepest": "text"}}}),
            &options,
        );
        let headings: Vec<_> = paragraphs(&blocks)
            .into_iter()
            .filter(|(s, _)| s.as_deref().is_some_and(|s| s.starts_with("Heading")))
            .collect();
        assert_eq!(
            headings,
            vec![
                (Some("Heading2".to_string()), "Outer".to_string()),
                (Some("Heading3".to_string()), "Inner".to_string()),
                (Some("Heading3".to_string()), "Deepest".to_string()),
            ]
        );
        assert_eq!(sink.of_kind(WarningKind::HeadingClamped).count(), 1);
    }

    #[test]
    fn test_unrecognized_shape_keeps_heading() {
        let (blocks, sink) = render(json!({"Odd": 42, "Also": {"style": "Quote"}}), &no_watermark());
        let texts: Vec<String> = paragraphs(&blocks).into_iter().map(|(_, t)| t).collect();
        assert_eq!(texts, vec!["Doc", "Odd", "Also"]);
        assert_eq!(sink.of_kind(WarningKind::UnrecognizedShape).count(), 2);
    }

    #[test]
    fn test_bullet_paragraph_in_text() {
        let (blocks, _) = render(
            json!({"Notes": "Intro line\n\n- one\n- two\n* three"}),
            &no_watermark(),
        );
        let paras = paragraphs(&blocks);
        let bullets: Vec<&str> = paras
            .iter()
            .filter(|(s, _)| s.as_deref() == Some("ListBullet"))
            .map(|(_, t)| t.as_str())
            .collect();
        assert_eq!(bullets, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_table_policies() {
        let content = json!({"T": {"table": [["a", "b"], ["c"], ["d", "e", "f"]]}});

        let (blocks, sink) = render(content.clone(), &no_watermark());
        assert!(blocks.iter().any(|b| matches!(b, Block::Table { rows: 3, columns: 2, .. })));
        assert_eq!(sink.of_kind(WarningKind::MalformedTable).count(), 2);

        let skip = BuildOptions {
            table_policy: TablePolicy::SkipRows,
            ..no_watermark()
        };
        let (blocks, _) = render(content.clone(), &skip);
        assert!(blocks.iter().any(|b| matches!(b, Block::Table { rows: 1, columns: 2, .. })));

        let abort = BuildOptions {
            table_policy: TablePolicy::Abort,
            ..no_watermark()
        };
        let registry = StyleRegistry::standard();
        let mut sink = CollectingSink::new();
        let err = ContentDispatcher::new(&registry, &abort, &mut sink)
            .render(&spec(content))
            .unwrap_err();
        assert!(matches!(
            err,
            OoxmlError::MalformedTable { row: 1, expected: 2, found: 1, .. }
        ));
    }

    #[test]
    fn test_header_rows_clamped_and_style_fallback() {
        let (blocks, sink) = render(
            json!({"T": {"table": [["a"], ["b"]], "header_rows": 5, "style": "Quote"}}),
            &no_watermark(),
        );
        assert!(blocks.iter().any(|b| matches!(
            b,
            Block::Table { header_rows: 2, style: Some(s), .. } if s == "TableGrid"
        )));
        assert_eq!(sink.of_kind(WarningKind::HeaderRowsClamped).count(), 1);
        assert_eq!(sink.of_kind(WarningKind::UnknownStyle).count(), 1);
    }

    #[test]
    fn test_empty_table_warns() {
        let (blocks, sink) = render(json!({"T": {"table": []}}), &no_watermark());
        assert!(!blocks.iter().any(|b| matches!(b, Block::Table { .. })));
        assert_eq!(sink.of_kind(WarningKind::EmptyTable).count(), 1);
    }

    #[test]
    fn test_empty_first_row_is_named() {
        let (blocks, sink) = render(json!({"T": {"table": [[], ["a", "b"]]}}), &no_watermark());
        assert!(!blocks.iter().any(|b| matches!(b, Block::Table { .. })));
        let warnings: Vec<_> = sink.of_kind(WarningKind::EmptyTable).collect();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("first row is empty"));
    }

    #[test]
    fn test_invalid_image_size() {
        let (_, sink) = render(
            json!({"Pic": {"image": "x.png", "width": -1.0}}),
            &no_watermark(),
        );
        assert_eq!(sink.of_kind(WarningKind::InvalidImageSize).count(), 1);
        assert_eq!(sink.of_kind(WarningKind::ImageLoad).count(), 0);
    }

    #[test]
    fn test_styled_text() {
        let (blocks, sink) = render(
            json!({
                "Q": {"style": "Quote", "text": "wise words"},
                "U": {"style": "Fancy", "text": "plain"}
            }),
            &no_watermark(),
        );
        let paras = paragraphs(&blocks);
        assert!(paras.contains(&(Some("Quote".to_string()), "wise words".to_string())));
        assert!(paras.contains(&(Some("Normal".to_string()), "plain".to_string())));
        let unknown: Vec<_> = sink.of_kind(WarningKind::UnknownStyle).collect();
        assert_eq!(unknown.len(), 1);
        assert_eq!(
            unknown[0].message,
            OoxmlError::StyleNotFound("Fancy".to_string()).to_string() + ", using Normal"
        );
    }

    #[test]
    fn test_control_characters_are_dropped_with_warning() {
        let options = BuildOptions {
            watermark: Some("mark\u{7}".to_string()),
            ..BuildOptions::default()
        };
        let (blocks, sink) = render(
            json!({
                "Bell\u{1}": "ring\u{1}ring",
                "Rows": {"table": [["a\u{0}", "b"]]},
                "Clean": "nothing odd\there"
            }),
            &options,
        );
        let paras = paragraphs(&blocks);
        assert!(paras.contains(&(Some("Heading1".to_string()), "Bell".to_string())));
        assert!(paras.contains(&(Some("Normal".to_string()), "ringring".to_string())));
        assert_eq!(paras.last(), Some(&(Some("Hidden".to_string()), "mark".to_string())));

        let flagged: Vec<Option<&str>> = sink
            .of_kind(WarningKind::InvalidCharacters)
            .map(|w| w.section.as_deref())
            .collect();
        assert_eq!(flagged, vec![Some("Bell\u{1}"), Some("Rows"), None]);
    }

    #[test]
    fn test_relative_image_prefers_working_directory() {
        // cargo runs tests from the package root
        let root = Path::new(env!("CARGO_MANIFEST_DIR"));
        let cwd_dir = tempfile::Builder::new()
            .prefix("assets-")
            .tempdir_in(root)
            .unwrap();
        std::fs::write(cwd_dir.path().join("fig.png"), PNG).unwrap();
        let relative = cwd_dir.path().strip_prefix(root).unwrap().join("fig.png");

        // an asset root that does not hold the file must not shadow it
        let other = tempfile::tempdir().unwrap();
        let options = BuildOptions {
            asset_root: Some(other.path().to_path_buf()),
            ..no_watermark()
        };
        let (blocks, sink) = render(
            json!({"Fig": {"image": relative.to_string_lossy()}}),
            &options,
        );
        assert!(sink.is_empty(), "{:?}", sink.warnings);
        assert!(blocks
            .iter()
            .any(|b| matches!(b, Block::Paragraph { has_drawing: true, .. })));
    }

    #[test]
    fn test_relative_image_falls_back_to_asset_root() {
        let assets = tempfile::tempdir().unwrap();
        std::fs::write(assets.path().join("only-here.png"), PNG).unwrap();
        let options = BuildOptions {
            asset_root: Some(assets.path().to_path_buf()),
            ..no_watermark()
        };
        let (blocks, sink) = render(json!({"Fig": {"image": "only-here.png"}}), &options);
        assert!(sink.is_empty(), "{:?}", sink.warnings);
        assert!(blocks
            .iter()
            .any(|b| matches!(b, Block::Paragraph { has_drawing: true, .. })));
    }

    #[test]
    fn test_watermark_is_last_paragraph() {
        let options = BuildOptions {
            watermark: Some("made here".to_string()),
            ..BuildOptions::default()
        };
        let (blocks, _) = render(json!({"A": "x"}), &options);
        assert_eq!(
            paragraphs(&blocks).last(),
            Some(&(Some("Hidden".to_string()), "made here".to_string()))
        );
    }

    #[test]
    fn test_invalid_file_name_is_fatal() {
        let registry = StyleRegistry::standard();
        let options = no_watermark();
        let mut sink = CollectingSink::new();
        let mut doc = spec(json!({}));
        doc.file_name = "../escape.docx".to_string();

        let err = ContentDispatcher::new(&registry, &options, &mut sink)
            .render(&doc)
            .unwrap_err();
        assert!(matches!(err, OoxmlError::Model(_)));
    }
}
