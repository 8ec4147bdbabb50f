//! Configuration settings
//!
//! Settings are read from a TOML file and merged with command-line flags,
//! which take precedence.
//!
//! ```toml
//! [output]
//! dir = "data"
//!
//! [watermark]
//! enabled = true
//! text = "Draft"
//! placement = "footer"
//!
//! [tables]
//! policy = "skip-rows"
//!
//! [headings]
//! base_level = 1
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use docxwriter_ooxml::{
    BuildOptions, TablePolicy, WatermarkPlacement, DEFAULT_OUTPUT_DIR, DEFAULT_WATERMARK,
};
use serde::Deserialize;

/// Settings file picked up from the working directory when present
pub const DEFAULT_CONFIG_FILE: &str = "docxwriter.toml";

/// Top-level settings structure
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub output: OutputSettings,
    pub watermark: WatermarkSettings,
    pub tables: TableSettings,
    pub headings: HeadingSettings,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct OutputSettings {
    /// Output directory
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct WatermarkSettings {
    pub enabled: bool,
    /// Custom watermark text
    pub text: Option<String>,
    pub placement: WatermarkPlacement,
}

impl Default for WatermarkSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            text: None,
            placement: WatermarkPlacement::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct TableSettings {
    pub policy: TablePolicy,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct HeadingSettings {
    /// Heading level of top-level sections
    pub base_level: u8,
}

impl Default for HeadingSettings {
    fn default() -> Self {
        Self { base_level: 1 }
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub output_dir: Option<PathBuf>,
    pub watermark: Option<String>,
    pub no_watermark: bool,
    /// Fallback directory for relative image paths
    pub asset_root: Option<PathBuf>,
}

impl Settings {
    /// Parse settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Read settings from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&text)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Load the explicit config file, or the default one if it exists
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::load(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Merge with command-line values into build options
    pub fn to_build_options(&self, overrides: &Overrides) -> BuildOptions {
        let output_dir = overrides
            .output_dir
            .clone()
            .or_else(|| self.output.dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

        let watermark = if overrides.no_watermark {
            None
        } else if let Some(text) = &overrides.watermark {
            Some(text.clone())
        } else if self.watermark.enabled {
            Some(
                self.watermark
                    .text
                    .clone()
                    .unwrap_or_else(|| DEFAULT_WATERMARK.to_string()),
            )
        } else {
            None
        };

        BuildOptions {
            output_dir,
            watermark,
            watermark_placement: self.watermark.placement,
            table_policy: self.tables.policy,
            heading_level: self.headings.base_level,
            asset_root: overrides.asset_root.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_build_defaults() {
        let options = Settings::default().to_build_options(&Overrides::default());
        assert_eq!(options, BuildOptions::default());
    }

    #[test]
    fn test_parse_full_file() {
        let settings = Settings::from_toml_str(
            r#"
            [output]
            dir = "out"

            [watermark]
            enabled = true
            text = "Draft"
            placement = "footer"

            [tables]
            policy = "skip-rows"

            [headings]
            base_level = 2
            "#,
        )
        .unwrap();

        let options = settings.to_build_options(&Overrides::default());
        assert_eq!(options.output_dir, PathBuf::from("out"));
        assert_eq!(options.watermark.as_deref(), Some("Draft"));
        assert_eq!(options.watermark_placement, WatermarkPlacement::Footer);
        assert_eq!(options.table_policy, TablePolicy::SkipRows);
        assert_eq!(options.heading_level, 2);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings = Settings::from_toml_str("[tables]\npolicy = \"abort\"\n").unwrap();
        assert_eq!(settings.tables.policy, TablePolicy::Abort);
        assert!(settings.watermark.enabled);
        assert_eq!(settings.headings.base_level, 1);
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        assert!(Settings::from_toml_str("[tables]\npolicy = \"stretch\"\n").is_err());
    }

    #[test]
    fn test_flags_override_file() {
        let settings = Settings::from_toml_str(
            "[output]\ndir = \"from-file\"\n[watermark]\ntext = \"file mark\"\n",
        )
        .unwrap();
        let overrides = Overrides {
            output_dir: Some(PathBuf::from("from-flag")),
            watermark: Some("flag mark".to_string()),
            ..Overrides::default()
        };
        let options = settings.to_build_options(&overrides);
        assert_eq!(options.output_dir, PathBuf::from("from-flag"));
        assert_eq!(options.watermark.as_deref(), Some("flag mark"));
    }

    #[test]
    fn test_watermark_can_be_disabled() {
        let disabled = Settings::from_toml_str("[watermark]\nenabled = false\n").unwrap();
        assert_eq!(disabled.to_build_options(&Overrides::default()).watermark, None);

        let overrides = Overrides {
            watermark: Some("ignored".to_string()),
            no_watermark: true,
            ..Overrides::default()
        };
        assert_eq!(Settings::default().to_build_options(&overrides).watermark, None);
    }

    #[test]
    fn test_load_missing_file_has_context() {
        let err = Settings::load(Path::new("/definitely/missing/docxwriter.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
