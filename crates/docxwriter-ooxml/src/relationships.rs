//! Relationship parts for OOXML packages
//!
//! OOXML uses relationship files (`_rels/*.rels`) to map IDs to targets.
//! The package root points at the main document and the property parts;
//! `word/_rels/document.xml.rels` points at styles, numbering, footers and
//! embedded media.
//!
//! # Example
//!
//! ```
//! use docxwriter_ooxml::relationships::Relationships;
//!
//! let mut rels = Relationships::new();
//! let id = rels.add("media/image1.png", Relationships::TYPE_IMAGE);
//! assert_eq!(id, "rId1");
//! assert!(rels.to_xml().contains(r#"Target="media/image1.png""#));
//! ```

use crate::xml::{escape_xml, DECLARATION};

/// OOXML namespace for relationships
pub const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Common relationship type URIs
impl Relationships {
    /// Main document relationship type (package root)
    pub const TYPE_OFFICE_DOCUMENT: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    /// Core properties relationship type (package root)
    pub const TYPE_CORE_PROPERTIES: &'static str =
        "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
    /// Extended properties relationship type (package root)
    pub const TYPE_EXTENDED_PROPERTIES: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
    /// Image relationship type
    pub const TYPE_IMAGE: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
    /// Styles relationship type
    pub const TYPE_STYLES: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
    /// Numbering relationship type
    pub const TYPE_NUMBERING: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering";
    /// Footer relationship type
    pub const TYPE_FOOTER: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer";
}

/// A single relationship entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId3")
    pub id: String,
    /// The relationship type URI
    pub rel_type: String,
    /// The target path, relative to the owning part
    pub target: String,
}

/// Relationships of one part, kept in insertion order
#[derive(Debug, Clone)]
pub struct Relationships {
    entries: Vec<Relationship>,
    /// Counter for generating unique IDs (starts at 1)
    next_id_counter: u32,
}

impl Default for Relationships {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id_counter: 1,
        }
    }
}

impl Relationships {
    /// Create an empty relationships list
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new relationship and return the generated ID
    pub fn add(&mut self, target: impl Into<String>, rel_type: impl Into<String>) -> String {
        let id = format!("rId{}", self.next_id_counter);
        self.next_id_counter += 1;

        self.entries.push(Relationship {
            id: id.clone(),
            rel_type: rel_type.into(),
            target: target.into(),
        });

        id
    }

    /// Add an image relationship, reusing the ID if the target is already linked
    pub fn add_image(&mut self, target: &str) -> String {
        if let Some(existing) = self
            .entries
            .iter()
            .find(|r| r.rel_type == Self::TYPE_IMAGE && r.target == target)
        {
            return existing.id.clone();
        }
        self.add(target, Self::TYPE_IMAGE)
    }

    /// Get the target for a relationship ID
    pub fn get(&self, id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.target.as_str())
    }

    /// Get the number of relationships
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no relationships
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over relationships in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.entries.iter()
    }

    /// Serialize relationships to OOXML format
    pub fn to_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str(DECLARATION);
        xml.push('\n');
        xml.push_str(&format!(r#"<Relationships xmlns="{}">"#, RELATIONSHIPS_NS));
        xml.push('\n');

        for rel in &self.entries {
            xml.push_str("  <Relationship");
            xml.push_str(&format!(r#" Id="{}""#, escape_xml(&rel.id)));
            xml.push_str(&format!(r#" Type="{}""#, escape_xml(&rel.rel_type)));
            xml.push_str(&format!(r#" Target="{}""#, escape_xml(&rel.target)));
            xml.push_str("/>\n");
        }

        xml.push_str("</Relationships>");
        xml
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_relationship() {
        let mut rels = Relationships::new();

        let id1 = rels.add("styles.xml", Relationships::TYPE_STYLES);
        assert_eq!(id1, "rId1");
        assert_eq!(rels.get("rId1"), Some("styles.xml"));

        let id2 = rels.add("numbering.xml", Relationships::TYPE_NUMBERING);
        assert_eq!(id2, "rId2");
        assert_eq!(rels.len(), 2);
    }

    #[test]
    fn test_add_image_reuses_target() {
        let mut rels = Relationships::new();
        let a = rels.add_image("media/image1.png");
        let b = rels.add_image("media/image2.png");
        let c = rels.add_image("media/image1.png");

        assert_eq!(a, c);
        assert_ne!(a, b);
        assert_eq!(rels.len(), 2);
    }

    #[test]
    fn test_to_xml() {
        let mut rels = Relationships::new();
        rels.add("styles.xml", Relationships::TYPE_STYLES);
        rels.add("media/image1.png", Relationships::TYPE_IMAGE);

        let xml = rels.to_xml();

        assert!(xml.starts_with(DECLARATION));
        assert!(xml.contains(&format!(r#"xmlns="{}""#, RELATIONSHIPS_NS)));
        assert!(xml.contains(r#"Id="rId1""#));
        assert!(xml.contains(r#"Target="styles.xml""#));
        assert!(xml.contains(r#"Id="rId2""#));
        assert!(xml.contains(r#"Target="media/image1.png""#));
        assert!(xml.ends_with("</Relationships>"));
    }

    #[test]
    fn test_xml_escaping_in_serialization() {
        let mut rels = Relationships::new();
        rels.add("file with <special> & \"chars\".xml", Relationships::TYPE_STYLES);

        let xml = rels.to_xml();
        assert!(xml.contains("&lt;special&gt;"));
        assert!(xml.contains("&amp;"));
        assert!(xml.contains("&quot;chars&quot;"));
    }

    #[test]
    fn test_iteration_order() {
        let mut rels = Relationships::new();
        rels.add("first.xml", "type1");
        rels.add("second.xml", "type2");
        rels.add("third.xml", "type3");

        let targets: Vec<&str> = rels.iter().map(|rel| rel.target.as_str()).collect();
        assert_eq!(targets, vec!["first.xml", "second.xml", "third.xml"]);
    }
}
