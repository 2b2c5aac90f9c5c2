//! Command line interface definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::CliOverrides;

/// Process exit codes
pub mod exit_codes {
    /// Cover passed
    pub const SUCCESS: i32 = 0;
    /// Unexpected error
    pub const GENERAL_ERROR: i32 = 1;
    /// Missing file, bad filename or unsupported extension
    pub const INVALID_INPUT: i32 = 2;
    /// Decode, rasterize or analysis failure
    pub const PROCESSING_FAILED: i32 = 3;
    /// Analysis finished with critical issues
    pub const REVIEW_NEEDED: i32 = 4;
}

/// Book cover layout checker
#[derive(Debug, Parser)]
#[command(name = "cover-validator", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check a cover (PNG or PDF) and print the report as JSON
    Check(CheckArgs),

    /// Show tool availability and config locations
    Info,

    /// Run the HTTP validation service
    #[cfg(feature = "web")]
    Serve(ServeArgs),
}

/// Arguments for the `check` command
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Cover file (.png or .pdf)
    pub input: PathBuf,

    /// Config file (defaults to ./cover-validator.toml, then the user config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Rasterization DPI for PDFs and the resolution baseline
    #[arg(long)]
    pub dpi: Option<u32>,

    /// Tesseract language, e.g. "eng"
    #[arg(long)]
    pub lang: Option<String>,

    /// Tesseract page segmentation mode
    #[arg(long)]
    pub psm: Option<u32>,

    /// Path to the tesseract binary
    #[arg(long)]
    pub tesseract: Option<PathBuf>,

    /// Path to the pdftoppm binary
    #[arg(long)]
    pub pdftoppm: Option<PathBuf>,

    /// Discard text boxes at or below this OCR confidence
    #[arg(long, value_parser = clap::value_parser!(i32).range(0..=100))]
    pub min_confidence: Option<i32>,

    /// Pretty-print the JSON report
    #[arg(long)]
    pub pretty: bool,

    /// Write region, scan and overlay images to this directory
    #[arg(long, value_name = "DIR")]
    pub save_debug: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl CheckArgs {
    /// Command line values that override the config file
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            dpi: self.dpi,
            min_confidence: self.min_confidence,
            language: self.lang.clone(),
            psm: self.psm,
            tesseract_path: self.tesseract.clone(),
            pdftoppm_path: self.pdftoppm.clone(),
        }
    }
}

/// Arguments for the `serve` command
#[cfg(feature = "web")]
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value_t = crate::web::DEFAULT_PORT)]
    pub port: u16,

    /// Address to bind to
    #[arg(short, long, default_value = crate::web::DEFAULT_BIND)]
    pub bind: String,

    /// Maximum upload size in MB
    #[arg(long, default_value_t = 50)]
    pub upload_limit: usize,

    /// Config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
