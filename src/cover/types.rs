//! Cover analysis core types
//!
//! Contains the data structures shared by the region extractor, the
//! binarization strategies, the zone checker and the aggregator.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

// ============================================================
// Constants
// ============================================================

/// Bottom band of the cover reserved for the award badge (percent of height)
pub const DEFAULT_AWARD_ZONE_PERCENT: f64 = 4.5;

/// Safe margin on the left and right edges (percent of width)
pub const DEFAULT_SAFE_MARGIN_PERCENT: f64 = 2.4;

/// Boxes at or below this OCR confidence are discarded
pub const DEFAULT_MIN_CONFIDENCE: i32 = 30;

/// Boxes whose trimmed text is at most this many characters are discarded
pub const DEFAULT_MAX_DISCARD_TEXT_LEN: usize = 2;

/// Threshold for the light-text-on-dark-background variant
pub const DEFAULT_LIGHT_TEXT_THRESHOLD: u8 = 160;

/// Threshold for the dark-text-on-light-background variant
pub const DEFAULT_DARK_TEXT_THRESHOLD: u8 = 120;

/// Covers narrower than this get a low resolution warning
pub const DEFAULT_LOW_RESOLUTION_WIDTH: u32 = 1000;

/// Print resolution the covers are expected at
pub const DEFAULT_DPI: u32 = 300;

/// Trim width of the front cover in inches
pub const DEFAULT_COVER_WIDTH_INCHES: f64 = 5.0;

/// Trim height of the front cover in inches
pub const DEFAULT_COVER_HEIGHT_INCHES: f64 = 8.0;

/// Words printed on the award badge itself
pub const DEFAULT_BADGE_WORDS: [&str; 8] = [
    "winner",
    "of",
    "the",
    "21st",
    "century",
    "emily",
    "dickinson",
    "award",
];

/// Score when at least one critical issue is present
pub const SCORE_CRITICAL: u8 = 10;

/// Score when only minor issues are present
pub const SCORE_MINOR_ONLY: u8 = 80;

/// Score for a clean cover
pub const SCORE_CLEAN: u8 = 100;

/// Maximum percentage clamp value
const MAX_PERCENT: f64 = 100.0;

// ============================================================
// Error Types
// ============================================================

/// Cover analysis error types
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Text detection engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("Text detection failed: {0}")]
    DetectionFailed(String),

    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

// ============================================================
// Core Data Structures
// ============================================================

/// One text element reported by the detection engine
///
/// Coordinates are relative to the image the engine was given, which for
/// the analyzer is always the cropped front cover region.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextBox {
    /// Engine level marker (page, block, paragraph, line, word)
    pub level: u8,
    /// Recognized text, exactly as the engine returned it
    pub text: String,
    /// Confidence 0-100, or -1 for structural rows without text
    pub confidence: i32,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl TextBox {
    /// Create a word-level text box
    pub fn new(text: impl Into<String>, confidence: i32, x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            level: WORD_LEVEL,
            text: text.into(),
            confidence,
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (exclusive)
    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive)
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// Trimmed, lowercased text used for filtering and word matching
    pub fn normalized_text(&self) -> String {
        self.text.trim().to_lowercase()
    }
}

/// Tesseract's level for individual words
pub const WORD_LEVEL: u8 = 5;

/// Kind of layout problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueType {
    #[serde(rename = "Text Overlap")]
    TextOverlap,
    #[serde(rename = "Margin Violation")]
    MarginViolation,
    #[serde(rename = "Low Resolution")]
    LowResolution,
}

impl IssueType {
    pub fn name(&self) -> &'static str {
        match self {
            IssueType::TextOverlap => "Text Overlap",
            IssueType::MarginViolation => "Margin Violation",
            IssueType::LowResolution => "Low Resolution",
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Issue severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Blocks a pass
    Critical,
    /// Reported but non-blocking
    Minor,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Critical => f.write_str("CRITICAL"),
            Severity::Minor => f.write_str("MINOR"),
        }
    }
}

/// A single layout problem
///
/// Equality is structural; two issues with the same type, details and
/// severity are the same issue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Issue {
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub details: String,
    pub severity: Severity,
}

impl Issue {
    /// Text reaching into the award badge band
    pub fn text_overlap(text: &str) -> Self {
        Self {
            issue_type: IssueType::TextOverlap,
            details: format!(
                "The text '{}' is overlapping with the award badge area.",
                text
            ),
            severity: Severity::Critical,
        }
    }

    /// Text inside the left or right safe margin
    pub fn margin_violation(text: &str) -> Self {
        Self {
            issue_type: IssueType::MarginViolation,
            details: format!("The text '{}' is too close to the edge.", text),
            severity: Severity::Minor,
        }
    }

    /// Front cover narrower than the warning width
    pub fn low_resolution(actual_width: u32, recommended_width: u32) -> Self {
        Self {
            issue_type: IssueType::LowResolution,
            details: format!(
                "Front cover width is {}px. A width of at least {}px is recommended.",
                actual_width, recommended_width
            ),
            severity: Severity::Minor,
        }
    }

    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Critical
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.issue_type, self.details)
    }
}

/// Overall verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportStatus {
    #[serde(rename = "PASS")]
    Pass,
    #[serde(rename = "REVIEW NEEDED")]
    ReviewNeeded,
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportStatus::Pass => f.write_str("PASS"),
            ReportStatus::ReviewNeeded => f.write_str("REVIEW NEEDED"),
        }
    }
}

/// Final result of one analysis call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub status: ReportStatus,
    pub confidence_score: u8,
    pub issues: Vec<Issue>,
}

impl AnalysisReport {
    /// Build a report from an already deduplicated issue set
    ///
    /// Status and score depend only on whether a critical issue is present
    /// and whether the set is empty.
    pub fn from_issues(issues: Vec<Issue>) -> Self {
        let has_critical = issues.iter().any(Issue::is_critical);

        let status = if has_critical {
            ReportStatus::ReviewNeeded
        } else {
            ReportStatus::Pass
        };

        let confidence_score = if has_critical {
            SCORE_CRITICAL
        } else if !issues.is_empty() {
            SCORE_MINOR_ONLY
        } else {
            SCORE_CLEAN
        };

        Self {
            status,
            confidence_score,
            issues,
        }
    }

    pub fn passed(&self) -> bool {
        self.status == ReportStatus::Pass
    }

    pub fn has_critical(&self) -> bool {
        self.issues.iter().any(Issue::is_critical)
    }
}

// ============================================================
// Options
// ============================================================

/// Every tunable constant of the analysis, passed as one immutable value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// Award badge band height (percent of region height)
    pub award_zone_percent: f64,
    /// Safe margin on each side (percent of region width)
    pub safe_margin_percent: f64,
    /// Boxes with confidence at or below this value are discarded
    pub min_confidence: i32,
    /// Boxes with trimmed text at or below this length are discarded
    pub max_discard_text_len: usize,
    /// Words that may appear in the badge band without raising an issue
    pub badge_words: BTreeSet<String>,
    /// Threshold for the light-on-dark variant
    pub light_text_threshold: u8,
    /// Threshold for the dark-on-light variant
    pub dark_text_threshold: u8,
    /// Region widths below this raise a low resolution warning
    pub low_resolution_width: u32,
    /// Expected print resolution
    pub dpi: u32,
    /// Expected front cover trim width in inches
    pub cover_width_inches: f64,
    /// Expected front cover trim height in inches
    pub cover_height_inches: f64,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            award_zone_percent: DEFAULT_AWARD_ZONE_PERCENT,
            safe_margin_percent: DEFAULT_SAFE_MARGIN_PERCENT,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            max_discard_text_len: DEFAULT_MAX_DISCARD_TEXT_LEN,
            badge_words: DEFAULT_BADGE_WORDS.iter().map(|w| w.to_string()).collect(),
            light_text_threshold: DEFAULT_LIGHT_TEXT_THRESHOLD,
            dark_text_threshold: DEFAULT_DARK_TEXT_THRESHOLD,
            low_resolution_width: DEFAULT_LOW_RESOLUTION_WIDTH,
            dpi: DEFAULT_DPI,
            cover_width_inches: DEFAULT_COVER_WIDTH_INCHES,
            cover_height_inches: DEFAULT_COVER_HEIGHT_INCHES,
        }
    }
}

impl AnalysisOptions {
    /// Create a new options builder
    pub fn builder() -> AnalysisOptionsBuilder {
        AnalysisOptionsBuilder::default()
    }

    /// Y coordinate where the award zone starts for a region of `height`
    pub fn award_zone_top(&self, height: u32) -> f64 {
        height as f64 * (1.0 - self.award_zone_percent / 100.0)
    }

    /// Safe margin in pixels for a region of `width`
    pub fn safe_margin(&self, width: u32) -> f64 {
        width as f64 * self.safe_margin_percent / 100.0
    }

    /// Recommended front cover width in pixels (trim width at the expected DPI)
    pub fn recommended_width(&self) -> u32 {
        (self.cover_width_inches * self.dpi as f64).round() as u32
    }

    /// Expected front cover height in pixels
    pub fn expected_height(&self) -> u32 {
        (self.cover_height_inches * self.dpi as f64).round() as u32
    }

    /// Whether `word` (already lowercased) is printed on the badge
    pub fn is_badge_word(&self, word: &str) -> bool {
        self.badge_words.contains(word)
    }
}

/// Builder for AnalysisOptions
#[derive(Debug, Default)]
pub struct AnalysisOptionsBuilder {
    options: AnalysisOptions,
}

impl AnalysisOptionsBuilder {
    /// Set award zone height (0-100 percent)
    #[must_use]
    pub fn award_zone_percent(mut self, percent: f64) -> Self {
        self.options.award_zone_percent = percent.clamp(0.0, MAX_PERCENT);
        self
    }

    /// Set safe margin width (0-100 percent)
    #[must_use]
    pub fn safe_margin_percent(mut self, percent: f64) -> Self {
        self.options.safe_margin_percent = percent.clamp(0.0, MAX_PERCENT);
        self
    }

    /// Set minimum OCR confidence (0-100)
    #[must_use]
    pub fn min_confidence(mut self, confidence: i32) -> Self {
        self.options.min_confidence = confidence.clamp(0, 100);
        self
    }

    #[must_use]
    pub fn max_discard_text_len(mut self, len: usize) -> Self {
        self.options.max_discard_text_len = len;
        self
    }

    /// Replace the badge word set; words are stored lowercased
    #[must_use]
    pub fn badge_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.options.badge_words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        self
    }

    #[must_use]
    pub fn light_text_threshold(mut self, threshold: u8) -> Self {
        self.options.light_text_threshold = threshold;
        self
    }

    #[must_use]
    pub fn dark_text_threshold(mut self, threshold: u8) -> Self {
        self.options.dark_text_threshold = threshold;
        self
    }

    #[must_use]
    pub fn low_resolution_width(mut self, width: u32) -> Self {
        self.options.low_resolution_width = width;
        self
    }

    #[must_use]
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.options.dpi = dpi.max(1);
        self
    }

    /// Set expected cover trim size in inches
    #[must_use]
    pub fn cover_size_inches(mut self, width: f64, height: f64) -> Self {
        self.options.cover_width_inches = width;
        self.options.cover_height_inches = height;
        self
    }

    /// Build the options
    #[must_use]
    pub fn build(self) -> AnalysisOptions {
        self.options
    }
}
