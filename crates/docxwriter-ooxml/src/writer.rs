//! DOCX writer
//!
//! [`DocxWriter`] is the handle of one document being built. Body content is
//! appended as WordprocessingML to an output buffer; media, numbering and an
//! optional footer are collected on the side. [`DocxWriter::finish`] closes
//! the body with the section properties and packages every part.
//!
//! # Example
//!
//! ```
//! use docxwriter_ooxml::styles::{StyleRegistry, NORMAL};
//! use docxwriter_ooxml::writer::DocxWriter;
//!
//! let registry = StyleRegistry::standard();
//! let mut writer = DocxWriter::new(&registry);
//! writer.add_title("Report");
//! writer.add_heading("Introduction", 1);
//! writer.add_paragraph("Hello, world", NORMAL);
//! let bytes = writer.finish()?;
//! assert!(!bytes.is_empty());
//! # Ok::<(), docxwriter_ooxml::OoxmlError>(())
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use docxwriter_model::ListType;
use serde::Deserialize;

use crate::archive::OoxmlArchive;
use crate::error::Result;
use crate::image::{inline_drawing_xml, LoadedImage};
use crate::numbering::Numbering;
use crate::package::{
    app_properties_xml, core_properties_xml, package_relationships, ContentTypes, CT_FOOTER,
};
use crate::relationships::Relationships;
use crate::styles::{
    heading_style, Alignment, ParagraphFormat, RunFormat, StyleRegistry, HIDDEN,
    MAX_HEADING_LEVEL, TITLE,
};
use crate::xml::{escape_xml, DECLARATION, NS_A, NS_PIC, NS_R, NS_W, NS_WP};

/// US Letter width in twips
pub const PAGE_WIDTH: u32 = 12240;
/// US Letter height in twips
pub const PAGE_HEIGHT: u32 = 15840;
/// One-inch page margin in twips
pub const PAGE_MARGIN: u32 = 1440;
/// Width available between the margins, in twips
pub const TEXT_WIDTH: u32 = PAGE_WIDTH - 2 * PAGE_MARGIN;

/// Left indent added per list level, in points
const LIST_INDENT_STEP_PT: f32 = 36.0;
/// Hanging indent of list items, in points
const LIST_HANGING_PT: f32 = 18.0;
/// Font size of table header cells, in points
const HEADER_CELL_SIZE_PT: f32 = 12.0;

const FOOTER_PART: &str = "footer1.xml";

/// Where the watermark text is placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatermarkPlacement {
    /// Last paragraph of the body
    #[default]
    Body,
    /// The default page footer
    Footer,
}

/// An embedded media part
#[derive(Debug, Clone)]
struct MediaFile {
    /// Path inside the package, e.g. "word/media/image1.png"
    path: String,
    bytes: Vec<u8>,
}

/// Handle of a document under construction
pub struct DocxWriter<'a> {
    registry: &'a StyleRegistry,
    /// Body XML output buffer
    output: String,
    /// Document relationships (word/_rels/document.xml.rels)
    relationships: Relationships,
    content_types: ContentTypes,
    numbering: Numbering,
    media_files: Vec<MediaFile>,
    /// Content hash → relationship ID of embedded media
    media_by_digest: HashMap<[u8; 32], String>,
    /// Next drawing ID for docPr
    next_drawing_id: u32,
    /// Footer paragraphs, if a footer is used
    footer: Option<String>,
    title: Option<String>,
    created: DateTime<Utc>,
}

impl<'a> DocxWriter<'a> {
    /// Start an empty document that uses the given stylesheet
    pub fn new(registry: &'a StyleRegistry) -> Self {
        let mut relationships = Relationships::new();
        relationships.add("styles.xml", Relationships::TYPE_STYLES);
        relationships.add("numbering.xml", Relationships::TYPE_NUMBERING);

        Self {
            registry,
            output: String::new(),
            relationships,
            content_types: ContentTypes::new(),
            numbering: Numbering::new(),
            media_files: Vec::new(),
            media_by_digest: HashMap::new(),
            next_drawing_id: 1,
            footer: None,
            title: None,
            created: Utc::now(),
        }
    }

    /// Override the creation time written to the document properties
    pub fn with_created(mut self, created: DateTime<Utc>) -> Self {
        self.created = created;
        self
    }

    /// The stylesheet this document is written with
    pub fn registry(&self) -> &'a StyleRegistry {
        self.registry
    }

    /// Body XML written so far
    pub fn body_xml(&self) -> &str {
        &self.output
    }

    /// Add the document title paragraph and record it as the document's title property
    pub fn add_title(&mut self, title: &str) {
        self.title = Some(title.to_string());
        let paragraph = ParagraphFormat {
            alignment: Some(Alignment::Center),
            ..ParagraphFormat::styled(style_id(TITLE))
        };
        self.push_paragraph(&paragraph, title, &RunFormat::default());
    }

    /// Add a heading. Levels outside the available heading styles are clamped.
    pub fn add_heading(&mut self, text: &str, level: u8) {
        let level = level.clamp(1, MAX_HEADING_LEVEL);
        let paragraph = ParagraphFormat::styled(style_id(&heading_style(level)));
        self.push_paragraph(&paragraph, text, &RunFormat::default());
    }

    /// Add a paragraph in the named style.
    ///
    /// Line feeds become line breaks and tabs become tab characters.
    pub fn add_paragraph(&mut self, text: &str, style_name: &str) {
        let paragraph = ParagraphFormat::styled(style_id(style_name));
        self.push_paragraph(&paragraph, text, &RunFormat::default());
    }

    /// Add a paragraph with explicit paragraph and run formatting
    pub fn add_formatted_paragraph(
        &mut self,
        text: &str,
        paragraph: &ParagraphFormat,
        run: &RunFormat,
    ) {
        self.push_paragraph(paragraph, text, run);
    }

    /// Numbering instance for a new list
    pub fn start_list(&mut self, list_type: ListType, level: u8) -> u32 {
        self.numbering.instance_for(list_type, level)
    }

    /// Add one list item paragraph.
    ///
    /// The item is indented 36pt per level (counting from 1) with an 18pt
    /// hanging indent.
    pub fn add_list_item(&mut self, text: &str, style_name: &str, num_id: u32, level: u8) {
        let paragraph = ParagraphFormat {
            numbering: Some((num_id, level)),
            left_indent_pt: Some(LIST_INDENT_STEP_PT * (f32::from(level) + 1.0)),
            first_line_indent_pt: Some(-LIST_HANGING_PT),
            ..ParagraphFormat::styled(style_id(style_name))
        };
        self.push_paragraph(&paragraph, text, &RunFormat::default());
    }

    /// Add a table. Every row must already have the same number of cells.
    ///
    /// The first `header_rows` rows repeat on each page and are set in bold.
    pub fn add_table(&mut self, rows: &[Vec<String>], style_name: &str, header_rows: usize) {
        let columns = rows.first().map(|r| r.len()).unwrap_or(0);
        if columns == 0 {
            return;
        }

        self.output.push_str("<w:tbl>\n");
        self.output.push_str("<w:tblPr>");
        self.output.push_str(&format!(
            r#"<w:tblStyle w:val="{}"/>"#,
            escape_xml(&style_id(style_name))
        ));
        self.output.push_str(r#"<w:tblW w:w="5000" w:type="pct"/>"#);
        self.output.push_str(r#"<w:tblLook w:val="04A0" w:firstRow="1" w:firstColumn="0" w:noVBand="1"/>"#);
        self.output.push_str("</w:tblPr>\n");

        let column_width = TEXT_WIDTH / columns as u32;
        self.output.push_str("<w:tblGrid>");
        for _ in 0..columns {
            self.output
                .push_str(&format!(r#"<w:gridCol w:w="{}"/>"#, column_width));
        }
        self.output.push_str("</w:tblGrid>\n");

        let header_run = RunFormat {
            bold: true,
            size_pt: Some(HEADER_CELL_SIZE_PT),
            ..RunFormat::default()
        };
        let body_run = RunFormat::default();
        // cell paragraphs keep the table's look instead of Normal's first-line indent
        let cell_paragraph = ParagraphFormat {
            first_line_indent_pt: Some(0.0),
            line_spacing: Some(1.0),
            ..ParagraphFormat::default()
        };

        for (i, row) in rows.iter().enumerate() {
            let is_header = i < header_rows;
            self.output.push_str("<w:tr>");
            if is_header {
                self.output.push_str("<w:trPr><w:tblHeader/></w:trPr>");
            }
            for cell in row {
                self.output.push_str(&format!(
                    r#"<w:tc><w:tcPr><w:tcW w:w="{}" w:type="dxa"/></w:tcPr>"#,
                    column_width
                ));
                let run = if is_header { &header_run } else { &body_run };
                self.push_paragraph(&cell_paragraph, cell, run);
                self.output.push_str("</w:tc>");
            }
            self.output.push_str("</w:tr>\n");
        }

        self.output.push_str("</w:tbl>\n");
    }

    /// Embed an image and place it in its own centered paragraph.
    ///
    /// Identical image bytes are stored once and shared between placements.
    pub fn add_image(&mut self, image: LoadedImage, name: &str, cx: i64, cy: i64) {
        let rel_id = match self.media_by_digest.get(&image.digest) {
            Some(rel_id) => rel_id.clone(),
            None => {
                let extension = image.format.extension();
                let target = format!("media/image{}.{}", self.media_files.len() + 1, extension);
                let rel_id = self.relationships.add_image(&target);
                if !self.content_types.has_default(extension) {
                    self.content_types
                        .add_default(extension, image.format.content_type());
                }
                self.media_files.push(MediaFile {
                    path: format!("word/{}", target),
                    bytes: image.bytes,
                });
                self.media_by_digest.insert(image.digest, rel_id.clone());
                rel_id
            }
        };

        let id = self.next_drawing_id;
        self.next_drawing_id += 1;

        self.output.push_str("<w:p>");
        self.output.push_str(&centered_unindented().to_xml());
        self.output.push_str("<w:r>");
        self.output
            .push_str(&inline_drawing_xml(&rel_id, id, name, cx, cy));
        self.output.push_str("</w:r></w:p>\n");
    }

    /// Number of distinct media parts embedded so far
    pub fn media_count(&self) -> usize {
        self.media_files.len()
    }

    /// Add a hard page break
    pub fn add_page_break(&mut self) {
        self.output
            .push_str("<w:p><w:r><w:br w:type=\"page\"/></w:r></w:p>\n");
    }

    /// Add the watermark text in the hidden style
    pub fn add_watermark(&mut self, text: &str, placement: WatermarkPlacement) {
        let mut run = RunFormat::default();
        let mut paragraph = ParagraphFormat::default();
        if let Some(hidden) = self.registry.get(HIDDEN) {
            hidden.apply_paragraph(&mut paragraph);
            hidden.apply_run(&mut run);
        }
        paragraph.style_id = Some(style_id(HIDDEN));
        paragraph.alignment = Some(Alignment::Center);

        let xml = paragraph_xml(&paragraph, text, &run);
        match placement {
            WatermarkPlacement::Body => {
                self.output.push_str(&xml);
                self.output.push('\n');
            }
            WatermarkPlacement::Footer => {
                self.footer.get_or_insert_with(String::new).push_str(&xml);
            }
        }
    }

    fn push_paragraph(&mut self, paragraph: &ParagraphFormat, text: &str, run: &RunFormat) {
        self.output.push_str(&paragraph_xml(paragraph, text, run));
        self.output.push('\n');
    }

    /// Close the body and package all parts into DOCX bytes
    pub fn finish(mut self) -> Result<Vec<u8>> {
        let mut archive = OoxmlArchive::new();

        let footer_rel = match self.footer.take() {
            Some(paragraphs) => {
                let rel_id = self
                    .relationships
                    .add(FOOTER_PART, Relationships::TYPE_FOOTER);
                self.content_types
                    .add_override(&format!("/word/{}", FOOTER_PART), CT_FOOTER);
                archive.set_string(format!("word/{}", FOOTER_PART), footer_xml(&paragraphs));
                Some(rel_id)
            }
            None => None,
        };

        let mut document = String::new();
        document.push_str(DECLARATION);
        document.push('\n');
        document.push_str(&format!(
            r#"<w:document xmlns:w="{}" xmlns:r="{}" xmlns:wp="{}" xmlns:a="{}" xmlns:pic="{}">"#,
            NS_W, NS_R, NS_WP, NS_A, NS_PIC
        ));
        document.push_str("<w:body>\n");
        document.push_str(&self.output);
        document.push_str(&section_properties_xml(footer_rel.as_deref()));
        document.push_str("</w:body></w:document>");

        archive.set_string("[Content_Types].xml", self.content_types.to_xml());
        archive.set_string("_rels/.rels", package_relationships().to_xml());
        archive.set_string(
            "docProps/core.xml",
            core_properties_xml(self.title.as_deref().unwrap_or(""), self.created),
        );
        archive.set_string("docProps/app.xml", app_properties_xml());
        archive.set_string("word/document.xml", document);
        archive.set_string("word/styles.xml", self.registry.to_styles_xml());
        archive.set_string("word/numbering.xml", self.numbering.to_xml());
        archive.set_string("word/_rels/document.xml.rels", self.relationships.to_xml());
        for media in self.media_files {
            archive.set(media.path, media.bytes);
        }

        archive.to_bytes()
    }
}

/// Style ID for a style name (names map to IDs by dropping spaces)
fn style_id(name: &str) -> String {
    name.replace(' ', "")
}

fn centered_unindented() -> ParagraphFormat {
    ParagraphFormat {
        alignment: Some(Alignment::Center),
        first_line_indent_pt: Some(0.0),
        ..ParagraphFormat::default()
    }
}

fn paragraph_xml(paragraph: &ParagraphFormat, text: &str, run: &RunFormat) -> String {
    let mut xml = String::from("<w:p>");
    xml.push_str(&paragraph.to_xml());
    if !text.is_empty() {
        xml.push_str(&run_xml(text, run));
    }
    xml.push_str("</w:p>");
    xml
}

/// A run of text, with `\n` as line breaks and `\t` as tabs
fn run_xml(text: &str, run: &RunFormat) -> String {
    let mut xml = String::from("<w:r>");
    xml.push_str(&run.to_xml());
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            xml.push_str("<w:br/>");
        }
        let line = line.strip_suffix('\r').unwrap_or(line);
        for (j, chunk) in line.split('\t').enumerate() {
            if j > 0 {
                xml.push_str("<w:tab/>");
            }
            if !chunk.is_empty() {
                xml.push_str(&format!(
                    r#"<w:t xml:space="preserve">{}</w:t>"#,
                    escape_xml(chunk)
                ));
            }
        }
    }
    xml.push_str("</w:r>");
    xml
}

fn section_properties_xml(footer_rel: Option<&str>) -> String {
    let mut xml = String::from("<w:sectPr>");
    if let Some(rel_id) = footer_rel {
        xml.push_str(&format!(
            r#"<w:footerReference w:type="default" r:id="{}"/>"#,
            escape_xml(rel_id)
        ));
    }
    xml.push_str(&format!(
        r#"<w:pgSz w:w="{}" w:h="{}"/>"#,
        PAGE_WIDTH, PAGE_HEIGHT
    ));
    xml.push_str(&format!(
        r#"<w:pgMar w:top="{0}" w:right="{0}" w:bottom="{0}" w:left="{0}" w:header="720" w:footer="720" w:gutter="0"/>"#,
        PAGE_MARGIN
    ));
    xml.push_str("</w:sectPr>");
    xml
}

fn footer_xml(paragraphs: &str) -> String {
    format!(
        r#"{}
<w:ftr xmlns:w="{}" xmlns:r="{}">{}</w:ftr>"#,
        DECLARATION, NS_W, NS_R, paragraphs
    )
}
