//! docxwriter CLI - Command-line interface library
//!
//! This library provides the CLI functionality for docxwriter: it reads a
//! JSON document description, merges command-line flags with the optional
//! TOML settings file and writes the resulting `.docx`.
//!
//! # Binary Usage
//!
//! ```bash
//! # Read data.json, write into data/
//! docxwriter
//!
//! # Custom input and output, no watermark
//! docxwriter --input report.json --output-dir out --no-watermark
//!
//! # Print the outline of the written document
//! docxwriter -i report.json --summary
//! ```

pub mod app;
pub mod config;

// Re-export main entry point and types
pub use app::{generate_command, run_cli, Cli};
pub use config::{Overrides, Settings, DEFAULT_CONFIG_FILE};
