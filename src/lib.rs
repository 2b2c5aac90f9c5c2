//! cover-validator - Book cover layout checker
//!
//! Finds text that collides with the award badge band or sits inside the
//! trim-safe margins of a front cover, and flags covers below print
//! resolution.
//!
//! # Modules
//!
//! - [`cover`]: region extraction, binarization, text detection and scoring
//! - [`input`]: PNG decoding and PDF first-page rasterization
//! - [`config`]: TOML configuration and command line merging
//! - [`cli`]: command line definitions and exit codes
//! - `web`: HTTP validation service (requires the `web` feature)
//!
//! # Example
//!
//! ```rust,no_run
//! use cover_validator::{AnalysisOptions, CoverAnalyzer, CoverLoader, TesseractDetector};
//! use std::path::Path;
//!
//! let options = AnalysisOptions::default();
//! let cover = CoverLoader::new(options.dpi).load(Path::new("cover.pdf")).unwrap();
//! let analyzer = CoverAnalyzer::new(options, TesseractDetector::default());
//!
//! let report = analyzer.analyze(&cover.image).unwrap();
//! println!("{}", serde_json::to_string_pretty(&report).unwrap());
//! ```

pub mod cli;
pub mod config;
pub mod cover;
pub mod input;

#[cfg(feature = "web")]
pub mod web;

// CLI
pub use cli::{exit_codes, CheckArgs, Cli, Commands};
#[cfg(feature = "web")]
pub use cli::ServeArgs;

// Config
pub use config::{CliOverrides, Config, ConfigError, OcrConfig, ResolvedConfig};

// Cover analysis
pub use cover::{
    AnalysisError, AnalysisOptions, AnalysisOptionsBuilder, AnalysisOutcome, AnalysisReport,
    BinarizationStrategy, CoverAnalyzer, CoverRegion, DebugRenderer, GlobalThreshold, Issue,
    IssueAggregator, IssueType, RegionExtractor, ReportStatus, ScanResult, Severity,
    TesseractDetector, TesseractOptions, TextBox, TextDetector, ZoneChecker,
};

// Input
pub use input::{
    allowed_file, sanitize_filename, CoverLoader, InputError, InputKind, LoadedCover,
    PdftoppmRasterizer, Rasterizer,
};

// Web
#[cfg(feature = "web")]
pub use web::{AppState, ServerConfig, WebServer};
