//! Image loading and inline drawings
//!
//! Images are embedded as-is. The format is sniffed from the file's magic
//! bytes (pixels are never decoded) and each picture is placed inline:
//!
//! ```xml
//! <w:drawing>
//!   <wp:inline>
//!     <wp:extent cx="..." cy="..."/>           <!-- Dimensions in EMUs -->
//!     <wp:docPr id="..." name="..."/>
//!     <a:graphic>
//!       <a:graphicData uri="...picture">
//!         <pic:pic>
//!           <pic:blipFill>
//!             <a:blip r:embed="rIdNN"/>        <!-- Relationship ID -->
//!           </pic:blipFill>
//!         </pic:pic>
//!       </a:graphicData>
//!     </a:graphic>
//!   </wp:inline>
//! </w:drawing>
//! ```
//!
//! OOXML measures drawings in EMUs (English Metric Units): 914400 per inch.

use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{OoxmlError, Result};
use crate::xml::{escape_xml, NS_A, NS_PIC, NS_R, NS_WP};

/// EMUs per inch (914400)
pub const EMU_PER_INCH: i64 = 914400;

/// Image container formats recognised by their magic bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
}

impl ImageFormat {
    /// Detect the format from the leading bytes of a file
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(ImageFormat::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageFormat::Jpeg)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(ImageFormat::Gif)
        } else if bytes.starts_with(b"BM") {
            Some(ImageFormat::Bmp)
        } else if bytes.starts_with(b"II*\0") || bytes.starts_with(b"MM\0*") {
            Some(ImageFormat::Tiff)
        } else {
            None
        }
    }

    /// File extension used for the media part
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Gif => "gif",
            ImageFormat::Bmp => "bmp",
            ImageFormat::Tiff => "tiff",
        }
    }

    /// MIME type registered in `[Content_Types].xml`
    pub fn content_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::Tiff => "image/tiff",
        }
    }
}

/// Image bytes read from disk, ready to embed
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
    /// SHA-256 of the bytes, used to embed identical files once
    pub digest: [u8; 32],
}

impl LoadedImage {
    /// Wrap bytes that are already in memory
    pub fn from_bytes(bytes: Vec<u8>) -> std::result::Result<Self, String> {
        if bytes.is_empty() {
            return Err("file is empty".to_string());
        }
        let format = ImageFormat::sniff(&bytes)
            .ok_or_else(|| "unrecognised image format".to_string())?;
        let digest = Sha256::digest(&bytes).into();
        Ok(Self {
            bytes,
            format,
            digest,
        })
    }
}

/// Read and sniff an image file
pub fn load_image(path: &Path) -> Result<LoadedImage> {
    let bytes = std::fs::read(path).map_err(|e| OoxmlError::ImageLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    LoadedImage::from_bytes(bytes).map_err(|reason| OoxmlError::ImageLoad {
        path: path.to_path_buf(),
        reason,
    })
}

/// Convert a size in inches to EMUs. Non-finite or non-positive sizes are rejected.
pub fn inches_to_emu(inches: f64) -> Option<i64> {
    if !inches.is_finite() || inches <= 0.0 {
        return None;
    }
    let emu = (inches * EMU_PER_INCH as f64).round();
    if emu < 1.0 || emu > i64::MAX as f64 {
        return None;
    }
    Some(emu as i64)
}

/// Inline `<w:drawing>` run content for an embedded picture
pub fn inline_drawing_xml(rel_id: &str, id: u32, name: &str, cx: i64, cy: i64) -> String {
    let name = escape_xml(name);
    let mut xml = String::new();
    xml.push_str("<w:drawing>");
    xml.push_str(&format!(
        r#"<wp:inline distT="0" distB="0" distL="0" distR="0" xmlns:wp="{}">"#,
        NS_WP
    ));
    xml.push_str(&format!(r#"<wp:extent cx="{}" cy="{}"/>"#, cx, cy));
    xml.push_str(r#"<wp:effectExtent l="0" t="0" r="0" b="0"/>"#);
    xml.push_str(&format!(r#"<wp:docPr id="{}" name="{}"/>"#, id, name));
    xml.push_str(&format!(
        r#"<wp:cNvGraphicFramePr><a:graphicFrameLocks xmlns:a="{}" noChangeAspect="1"/></wp:cNvGraphicFramePr>"#,
        NS_A
    ));
    xml.push_str(&format!(r#"<a:graphic xmlns:a="{}">"#, NS_A));
    xml.push_str(&format!(r#"<a:graphicData uri="{}">"#, NS_PIC));
    xml.push_str(&format!(r#"<pic:pic xmlns:pic="{}">"#, NS_PIC));
    xml.push_str(&format!(
        r#"<pic:nvPicPr><pic:cNvPr id="{}" name="{}"/><pic:cNvPicPr/></pic:nvPicPr>"#,
        id, name
    ));
    xml.push_str(&format!(
        r#"<pic:blipFill><a:blip r:embed="{}" xmlns:r="{}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>"#,
        escape_xml(rel_id),
        NS_R
    ));
    xml.push_str(&format!(
        r#"<pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{}" cy="{}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr>"#,
        cx, cy
    ));
    xml.push_str("</pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing>");
    xml
}
