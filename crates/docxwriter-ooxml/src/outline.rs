//! Outline reader for generated documents
//!
//! Reads `word/document.xml` back into a flat list of top-level blocks:
//! paragraphs with their style and text, and tables with their dimensions.
//! Used to inspect what a build produced.

use std::io::Cursor;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;

use crate::archive::OoxmlArchive;
use crate::error::{OoxmlError, Result};

/// A top-level body block
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Paragraph {
        /// Paragraph style ID
        style: Option<String>,
        /// Text with line breaks as `\n` and tabs as `\t`
        text: String,
        has_drawing: bool,
        page_break: bool,
    },
    Table {
        /// Table style ID
        style: Option<String>,
        rows: usize,
        /// Cells in the first row
        columns: usize,
        /// Rows marked as repeating header rows
        header_rows: usize,
    },
}

/// The sequence of top-level blocks in a document body
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DocumentOutline {
    pub blocks: Vec<Block>,
}

#[derive(Debug, Default)]
struct ParagraphBuilder {
    style: Option<String>,
    text: String,
    has_drawing: bool,
    page_break: bool,
}

impl ParagraphBuilder {
    fn build(self) -> Block {
        Block::Paragraph {
            style: self.style,
            text: self.text,
            has_drawing: self.has_drawing,
            page_break: self.page_break,
        }
    }
}

#[derive(Debug, Default)]
struct TableBuilder {
    style: Option<String>,
    rows: usize,
    columns: usize,
    header_rows: usize,
    cells_in_row: usize,
}

impl TableBuilder {
    fn build(self) -> Block {
        Block::Table {
            style: self.style,
            rows: self.rows,
            columns: self.columns,
            header_rows: self.header_rows,
        }
    }
}

impl DocumentOutline {
    /// Read the outline of a DOCX package
    pub fn from_docx(bytes: &[u8]) -> Result<Self> {
        let archive = OoxmlArchive::from_reader(Cursor::new(bytes))?;
        Self::parse(archive.document_xml()?)
    }

    /// Parse `word/document.xml` content
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        let mut buf = Vec::new();

        let mut blocks = Vec::new();
        let mut paragraph: Option<ParagraphBuilder> = None;
        let mut table: Option<TableBuilder> = None;
        // nesting depth of w:tbl, tables inside cells are counted as content
        let mut table_depth = 0usize;
        let mut in_text = false;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                    b"tbl" => {
                        table_depth += 1;
                        if table_depth == 1 {
                            table = Some(TableBuilder::default());
                        }
                    }
                    b"tr" if table_depth == 1 => {
                        if let Some(t) = table.as_mut() {
                            t.rows += 1;
                            t.cells_in_row = 0;
                        }
                    }
                    b"tc" if table_depth == 1 => {
                        if let Some(t) = table.as_mut() {
                            t.cells_in_row += 1;
                        }
                    }
                    b"p" if table_depth == 0 => paragraph = Some(ParagraphBuilder::default()),
                    b"t" => in_text = true,
                    b"drawing" => {
                        if let Some(p) = paragraph.as_mut() {
                            p.has_drawing = true;
                        }
                    }
                    _ => {}
                },
                Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                    b"p" if table_depth == 0 => blocks.push(ParagraphBuilder::default().build()),
                    b"pStyle" => {
                        if let Some(p) = paragraph.as_mut() {
                            p.style = val_attr(e);
                        }
                    }
                    b"tblStyle" if table_depth == 1 => {
                        if let Some(t) = table.as_mut() {
                            t.style = val_attr(e);
                        }
                    }
                    b"tblHeader" if table_depth == 1 => {
                        if let Some(t) = table.as_mut() {
                            t.header_rows += 1;
                        }
                    }
                    b"br" => {
                        if let Some(p) = paragraph.as_mut() {
                            if attr(e, b"type").as_deref() == Some("page") {
                                p.page_break = true;
                            } else {
                                p.text.push('\n');
                            }
                        }
                    }
                    b"tab" => {
                        if let Some(p) = paragraph.as_mut() {
                            p.text.push('\t');
                        }
                    }
                    _ => {}
                },
                Ok(Event::Text(ref e)) if in_text => {
                    if let Some(p) = paragraph.as_mut() {
                        p.text.push_str(&e.unescape()?);
                    }
                }
                Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                    b"t" => in_text = false,
                    b"tr" if table_depth == 1 => {
                        if let Some(t) = table.as_mut() {
                            if t.rows == 1 {
                                t.columns = t.cells_in_row;
                            }
                        }
                    }
                    b"tbl" => {
                        if table_depth == 1 {
                            if let Some(t) = table.take() {
                                blocks.push(t.build());
                            }
                        }
                        table_depth = table_depth.saturating_sub(1);
                    }
                    b"p" if table_depth == 0 => {
                        if let Some(p) = paragraph.take() {
                            blocks.push(p.build());
                        }
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(OoxmlError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(Self { blocks })
    }

    /// Top-level paragraphs as (style, text) pairs
    pub fn paragraphs(&self) -> impl Iterator<Item = (Option<&str>, &str)> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Paragraph { style, text, .. } => Some((style.as_deref(), text.as_str())),
            Block::Table { .. } => None,
        })
    }

    /// Top-level tables
    pub fn tables(&self) -> impl Iterator<Item = &Block> {
        self.blocks
            .iter()
            .filter(|b| matches!(b, Block::Table { .. }))
    }

    /// Text of paragraphs in a given style
    pub fn texts_with_style<'s>(&'s self, style_id: &'s str) -> impl Iterator<Item = &'s str> {
        self.paragraphs()
            .filter(move |(style, _)| *style == Some(style_id))
            .map(|(_, text)| text)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

fn attr(e: &BytesStart, name: &[u8]) -> Option<String> {
    e.attributes()
        .filter_map(|a| a.ok())
        .find(|a| a.key.local_name().as_ref() == name)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

fn val_attr(e: &BytesStart) -> Option<String> {
    attr(e, b"val")
}
