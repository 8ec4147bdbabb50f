//! Package-level parts: content types and document properties
//!
//! Every generated package carries `[Content_Types].xml`, `_rels/.rels`,
//! `docProps/core.xml` and `docProps/app.xml` alongside the WordprocessingML
//! parts written by [`crate::writer`].

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::relationships::Relationships;
use crate::xml::{escape_xml, DECLARATION};

const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

/// Content type of the main document part
pub const CT_DOCUMENT: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
/// Content type of the styles part
pub const CT_STYLES: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml";
/// Content type of the numbering part
pub const CT_NUMBERING: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml";
/// Content type of a footer part
pub const CT_FOOTER: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml";
/// Content type of the core properties part
pub const CT_CORE: &str = "application/vnd.openxmlformats-package.core-properties+xml";
/// Content type of the extended properties part
pub const CT_APP: &str = "application/vnd.openxmlformats-officedocument.extended-properties+xml";

/// The `[Content_Types].xml` part
#[derive(Debug, Clone)]
pub struct ContentTypes {
    /// Extension → content type
    defaults: BTreeMap<String, String>,
    /// Part name → content type
    overrides: BTreeMap<String, String>,
}

impl Default for ContentTypes {
    fn default() -> Self {
        let mut types = Self {
            defaults: BTreeMap::new(),
            overrides: BTreeMap::new(),
        };
        types.add_default("rels", "application/vnd.openxmlformats-package.relationships+xml");
        types.add_default("xml", "application/xml");
        types.add_override("/word/document.xml", CT_DOCUMENT);
        types.add_override("/word/styles.xml", CT_STYLES);
        types.add_override("/word/numbering.xml", CT_NUMBERING);
        types.add_override("/docProps/core.xml", CT_CORE);
        types.add_override("/docProps/app.xml", CT_APP);
        types
    }
}

impl ContentTypes {
    /// Content types for the parts every document has
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a content type for a file extension
    pub fn add_default(&mut self, extension: &str, content_type: &str) {
        self.defaults
            .insert(extension.to_ascii_lowercase(), content_type.to_string());
    }

    /// Register a content type for one part
    pub fn add_override(&mut self, part_name: &str, content_type: &str) {
        self.overrides
            .insert(part_name.to_string(), content_type.to_string());
    }

    pub fn has_default(&self, extension: &str) -> bool {
        self.defaults.contains_key(&extension.to_ascii_lowercase())
    }

    pub fn to_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str(DECLARATION);
        xml.push('\n');
        xml.push_str(&format!(r#"<Types xmlns="{}">"#, CONTENT_TYPES_NS));
        for (extension, content_type) in &self.defaults {
            xml.push_str(&format!(
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                escape_xml(extension),
                escape_xml(content_type)
            ));
        }
        for (part, content_type) in &self.overrides {
            xml.push_str(&format!(
                r#"<Override PartName="{}" ContentType="{}"/>"#,
                escape_xml(part),
                escape_xml(content_type)
            ));
        }
        xml.push_str("</Types>");
        xml
    }
}

/// The package root relationships (`_rels/.rels`)
pub fn package_relationships() -> Relationships {
    let mut rels = Relationships::new();
    rels.add("word/document.xml", Relationships::TYPE_OFFICE_DOCUMENT);
    rels.add("docProps/core.xml", Relationships::TYPE_CORE_PROPERTIES);
    rels.add("docProps/app.xml", Relationships::TYPE_EXTENDED_PROPERTIES);
    rels
}

/// `docProps/core.xml` with the document title and creation time
pub fn core_properties_xml(title: &str, created: DateTime<Utc>) -> String {
    let timestamp = created.to_rfc3339_opts(SecondsFormat::Secs, true);
    let mut xml = String::new();
    xml.push_str(DECLARATION);
    xml.push('\n');
    xml.push_str(concat!(
        r#"<cp:coreProperties"#,
        r#" xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties""#,
        r#" xmlns:dc="http://purl.org/dc/elements/1.1/""#,
        r#" xmlns:dcterms="http://purl.org/dc/terms/""#,
        r#" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#
    ));
    xml.push_str(&format!("<dc:title>{}</dc:title>", escape_xml(title)));
    xml.push_str("<dc:creator>docxwriter</dc:creator>");
    xml.push_str(&format!(
        r#"<dcterms:created xsi:type="dcterms:W3CDTF">{}</dcterms:created>"#,
        timestamp
    ));
    xml.push_str(&format!(
        r#"<dcterms:modified xsi:type="dcterms:W3CDTF">{}</dcterms:modified>"#,
        timestamp
    ));
    xml.push_str("</cp:coreProperties>");
    xml
}

/// `docProps/app.xml` naming the generating application
pub fn app_properties_xml() -> String {
    let mut xml = String::new();
    xml.push_str(DECLARATION);
    xml.push('\n');
    xml.push_str(
        r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties">"#,
    );
    xml.push_str(&format!(
        "<Application>docxwriter {}</Application>",
        env!("CARGO_PKG_VERSION")
    ));
    xml.push_str("</Properties>");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_content_types_defaults() {
        let xml = ContentTypes::new().to_xml();
        assert!(xml.contains(r#"<Default Extension="rels""#));
        assert!(xml.contains(r#"<Override PartName="/word/document.xml""#));
        assert!(xml.contains(r#"<Override PartName="/word/numbering.xml""#));
        assert!(!xml.contains("footer"));
    }

    #[test]
    fn test_content_types_media_and_footer() {
        let mut types = ContentTypes::new();
        types.add_default("PNG", "image/png");
        types.add_default("png", "image/png");
        types.add_override("/word/footer1.xml", CT_FOOTER);

        assert!(types.has_default("png"));
        let xml = types.to_xml();
        assert_eq!(xml.matches(r#"Extension="png""#).count(), 1);
        assert!(xml.contains(r#"<Override PartName="/word/footer1.xml""#));
    }

    #[test]
    fn test_package_relationships() {
        let rels = package_relationships();
        assert_eq!(rels.get("rId1"), Some("word/document.xml"));
        assert_eq!(rels.len(), 3);
    }

    #[test]
    fn test_core_properties() {
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let xml = core_properties_xml("Q1 <Report>", created);
        assert!(xml.contains("<dc:title>Q1 &lt;Report&gt;</dc:title>"));
        assert!(xml.contains(">2024-03-01T12:30:00Z</dcterms:created>"));
    }

    #[test]
    fn test_app_properties() {
        assert!(app_properties_xml().contains("<Application>docxwriter "));
    }
}
