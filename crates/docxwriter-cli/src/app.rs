//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use docxwriter_model::DocumentSpec;
use docxwriter_ooxml::{
    ContentDispatcher, DocumentOutline, StyleRegistry, TracingSink, WrittenDocument,
};

use crate::config::{Overrides, Settings};

#[derive(Parser, Debug)]
#[command(name = "docxwriter")]
#[command(author, version, about = "Create Word documents from JSON data", long_about = None)]
pub struct Cli {
    /// Input JSON file
    #[arg(short, long, default_value = "data.json")]
    pub input: PathBuf,

    /// Output directory [default: data]
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Custom watermark text
    #[arg(short, long)]
    pub watermark: Option<String>,

    /// Disable the watermark
    #[arg(long)]
    pub no_watermark: bool,

    /// Settings file [default: docxwriter.toml if present]
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print an outline of the written document as JSON
    #[arg(long)]
    pub summary: bool,
}

/// Run the CLI (main entry point)
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let written = generate_command(&cli)?;
    if cli.summary {
        print_summary(&written.path)?;
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();
    // a second initialisation (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Generate a document from parsed command-line arguments
pub fn generate_command(cli: &Cli) -> Result<WrittenDocument> {
    let settings = Settings::discover(cli.config.as_deref())?;
    let overrides = Overrides {
        output_dir: cli.output_dir.clone(),
        watermark: cli.watermark.clone(),
        no_watermark: cli.no_watermark,
        asset_root: cli.input.parent().map(Path::to_path_buf),
    };
    let options = settings.to_build_options(&overrides);

    info!(input = %cli.input.display(), "reading document description");
    let spec = DocumentSpec::from_path(&cli.input)
        .with_context(|| format!("Failed to load input file: {}", cli.input.display()))?;

    let registry = StyleRegistry::standard();
    let mut sink = TracingSink;
    let written = ContentDispatcher::new(&registry, &options, &mut sink)
        .build(&spec)
        .with_context(|| format!("Failed to create document '{}'", spec.file_name))?;

    info!(
        path = %written.path.display(),
        warnings = written.warnings.len(),
        "document created"
    );
    Ok(written)
}

fn print_summary(path: &Path) -> Result<()> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read written document: {}", path.display()))?;
    let outline = DocumentOutline::from_docx(&bytes)
        .with_context(|| format!("Failed to read outline of {}", path.display()))?;
    println!("{}", serde_json::to_string_pretty(&outline)?);
    Ok(())
}
