//! List numbering definitions (word/numbering.xml)
//!
//! Two abstract definitions are written: one for bullets and one for decimal
//! numbering. Bullet lists share a single numbering instance. Each numbered
//! list gets a fresh instance with a start override so it counts from 1.

use docxwriter_model::ListType;

use crate::xml::{DECLARATION, NS_W};

const BULLET_ABSTRACT: u32 = 0;
const DECIMAL_ABSTRACT: u32 = 1;
const LEVELS: u8 = 9;

#[derive(Debug, Clone)]
struct NumInstance {
    num_id: u32,
    list_type: ListType,
    restart_level: Option<u8>,
}

/// Numbering instances used by one document
#[derive(Debug, Clone, Default)]
pub struct Numbering {
    instances: Vec<NumInstance>,
    bullet_id: Option<u32>,
}

impl Numbering {
    pub fn new() -> Self {
        Self::default()
    }

    /// Numbering instance for a new list of the given type
    pub fn instance_for(&mut self, list_type: ListType, level: u8) -> u32 {
        match list_type {
            ListType::Bullet => self.bullet(),
            ListType::Number => self.start_numbered(level),
        }
    }

    /// The shared bullet instance, created on first use
    pub fn bullet(&mut self) -> u32 {
        if let Some(id) = self.bullet_id {
            return id;
        }
        let id = self.push(ListType::Bullet, None);
        self.bullet_id = Some(id);
        id
    }

    /// A new numbered instance that restarts at 1 on `level`
    pub fn start_numbered(&mut self, level: u8) -> u32 {
        self.push(ListType::Number, Some(level.min(LEVELS - 1)))
    }

    fn push(&mut self, list_type: ListType, restart_level: Option<u8>) -> u32 {
        // numId 0 means "no numbering" in WordprocessingML
        let num_id = self.instances.len() as u32 + 1;
        self.instances.push(NumInstance {
            num_id,
            list_type,
            restart_level,
        });
        num_id
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Render the `word/numbering.xml` part
    pub fn to_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str(DECLARATION);
        xml.push('\n');
        xml.push_str(&format!(r#"<w:numbering xmlns:w="{}">"#, NS_W));

        write_abstract(&mut xml, BULLET_ABSTRACT, ListType::Bullet);
        write_abstract(&mut xml, DECIMAL_ABSTRACT, ListType::Number);

        for instance in &self.instances {
            let abstract_id = match instance.list_type {
                ListType::Bullet => BULLET_ABSTRACT,
                ListType::Number => DECIMAL_ABSTRACT,
            };
            xml.push_str(&format!(r#"<w:num w:numId="{}">"#, instance.num_id));
            xml.push_str(&format!(r#"<w:abstractNumId w:val="{}"/>"#, abstract_id));
            if let Some(level) = instance.restart_level {
                xml.push_str(&format!(
                    r#"<w:lvlOverride w:ilvl="{}"><w:startOverride w:val="1"/></w:lvlOverride>"#,
                    level
                ));
            }
            xml.push_str("</w:num>");
        }

        xml.push_str("</w:numbering>");
        xml
    }
}

fn write_abstract(xml: &mut String, abstract_id: u32, list_type: ListType) {
    xml.push_str(&format!(
        r#"<w:abstractNum w:abstractNumId="{}"><w:multiLevelType w:val="hybridMultilevel"/>"#,
        abstract_id
    ));
    for level in 0..LEVELS {
        let (format, text) = match list_type {
            ListType::Bullet => ("bullet", "\u{2022}".to_string()),
            ListType::Number => ("decimal", format!("%{}.", level + 1)),
        };
        let left = 720 * (u32::from(level) + 1);
        xml.push_str(&format!(
            concat!(
                r#"<w:lvl w:ilvl="{}"><w:start w:val="1"/><w:numFmt w:val="{}"/>"#,
                r#"<w:lvlText w:val="{}"/><w:lvlJc w:val="left"/>"#,
                r#"<w:pPr><w:ind w:left="{}" w:hanging="360"/></w:pPr></w:lvl>"#
            ),
            level, format, text, left
        ));
    }
    xml.push_str("</w:abstractNum>");
}
