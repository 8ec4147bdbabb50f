//! Small helpers shared by the XML part writers

/// WordprocessingML main namespace
pub const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
/// Office document relationships namespace
pub const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
/// DrawingML WordprocessingML drawing namespace
pub const NS_WP: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
/// DrawingML main namespace
pub const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
/// DrawingML picture namespace
pub const NS_PIC: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";

/// XML declaration written at the top of every part
pub const DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Whether `c` is allowed in an XML 1.0 document
pub fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}'
    )
}

/// Number of characters in `text` that XML 1.0 cannot represent
pub fn invalid_xml_chars(text: &str) -> usize {
    text.chars().filter(|&c| !is_xml_char(c)).count()
}

/// Escape special XML characters.
///
/// Characters XML 1.0 cannot represent (most C0 controls, U+FFFE, U+FFFF)
/// are dropped.
pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c if is_xml_char(c) => escaped.push(c),
            _ => {}
        }
    }
    escaped
}

/// Points to twentieths of a point (twips), the unit of spacing and indents
pub fn pt_to_twips(pt: f32) -> i32 {
    (pt * 20.0).round() as i32
}

/// Points to half-points, the unit of `w:sz`
pub fn pt_to_half_points(pt: f32) -> u32 {
    (pt * 2.0).round().max(1.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("Hello & World"), "Hello &amp; World");
        assert_eq!(escape_xml("<tag>"), "&lt;tag&gt;");
        assert_eq!(escape_xml("\"quoted\""), "&quot;quoted&quot;");
        assert_eq!(escape_xml("it's"), "it&apos;s");
    }

    #[test]
    fn test_escape_drops_control_characters() {
        assert_eq!(escape_xml("bell\u{1}here\u{1B}"), "bellhere");
        assert_eq!(escape_xml("keep\ttab\r\n"), "keep\ttab\r\n");
        assert_eq!(escape_xml("odd\u{FFFE}\u{FFFF}"), "odd");
        assert_eq!(escape_xml("emoji \u{1F600}"), "emoji \u{1F600}");
        assert_eq!(invalid_xml_chars("a\u{0}b\u{8}c\u{B}"), 3);
        assert_eq!(invalid_xml_chars("plain & simple"), 0);
    }

    #[test]
    fn test_unit_conversions() {
        assert_eq!(pt_to_twips(36.0), 720);
        assert_eq!(pt_to_twips(-18.0), -360);
        assert_eq!(pt_to_half_points(12.0), 24);
        assert_eq!(pt_to_half_points(1.0), 2);
        assert_eq!(pt_to_half_points(0.1), 1);
    }
}
