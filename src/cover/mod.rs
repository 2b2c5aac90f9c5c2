//! Cover Layout Analysis module
//!
//! Checks a submitted cover for text in the award badge band, text inside
//! the safe margins, and low print resolution.
//!
//! # Features
//!
//! - Front cover extraction from a two-page spread (right half)
//! - Dual-scan binarization for light-on-dark and dark-on-light text
//! - Pluggable text detection engine (Tesseract by default)
//! - Structural issue deduplication and a three-level score
//! - Optional debug renderings of every scan
//!
//! # Example
//!
//! ```rust,no_run
//! use cover_validator::{AnalysisOptions, CoverAnalyzer, TesseractDetector};
//!
//! let image = image::open("cover.png").unwrap();
//! let analyzer = CoverAnalyzer::new(AnalysisOptions::default(), TesseractDetector::default());
//!
//! let report = analyzer.analyze(&image).unwrap();
//! println!("{}: {}", report.status, report.confidence_score);
//! ```

// Submodules
mod aggregate;
mod analyzer;
mod checker;
mod region;
mod types;

pub mod binarize;
pub mod debug;
pub mod detector;

// Re-export public API
pub use aggregate::IssueAggregator;
pub use analyzer::{AnalysisOutcome, CoverAnalyzer, ScanResult};
pub use binarize::{luminance, BinarizationStrategy, GlobalThreshold};
pub use checker::ZoneChecker;
pub use debug::DebugRenderer;
pub use detector::{parse_tsv, TesseractDetector, TesseractOptions, TextDetector};
pub use region::{CoverRegion, RegionExtractor};
pub use types::{
    AnalysisError, AnalysisOptions, AnalysisOptionsBuilder, AnalysisReport, Issue, IssueType,
    ReportStatus, Result, Severity, TextBox, DEFAULT_BADGE_WORDS, WORD_LEVEL,
};
