//! Cover analysis entry point
//!
//! Region extraction, one scan per binarization strategy, aggregation.

use image::{DynamicImage, GenericImageView, GrayImage};
use rayon::prelude::*;
use tracing::{debug, info};

use super::aggregate::IssueAggregator;
use super::binarize::{default_strategies, luminance, BinarizationStrategy};
use super::checker::ZoneChecker;
use super::detector::TextDetector;
use super::region::RegionExtractor;
use super::types::{AnalysisOptions, AnalysisReport, Issue, Result, TextBox};

/// Output of one binarize/detect/check pass
#[derive(Debug, Clone)]
pub struct ScanResult {
    /// Strategy that produced the binary image
    pub strategy: String,
    pub binary: GrayImage,
    pub boxes: Vec<TextBox>,
    pub issues: Vec<Issue>,
}

/// Everything produced by one analysis, for callers that need more than the verdict
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub region: DynamicImage,
    pub scans: Vec<ScanResult>,
    pub report: AnalysisReport,
}

/// Runs the dual-scan analysis with an injected text detector
pub struct CoverAnalyzer<D: TextDetector> {
    options: AnalysisOptions,
    detector: D,
    strategies: Vec<Box<dyn BinarizationStrategy>>,
}

impl<D: TextDetector> CoverAnalyzer<D> {
    /// Analyzer with the light-text and dark-text strategies
    pub fn new(options: AnalysisOptions, detector: D) -> Self {
        let strategies = default_strategies(&options);
        Self {
            options,
            detector,
            strategies,
        }
    }

    /// Replace the binarization strategies
    #[must_use]
    pub fn with_strategies(mut self, strategies: Vec<Box<dyn BinarizationStrategy>>) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Analyze a full page raster and return the verdict
    pub fn analyze(&self, image: &DynamicImage) -> Result<AnalysisReport> {
        self.analyze_detailed(image).map(|outcome| outcome.report)
    }

    /// Analyze and keep the intermediate images and detections
    pub fn analyze_detailed(&self, image: &DynamicImage) -> Result<AnalysisOutcome> {
        let region = RegionExtractor::extract(image)?;
        let (width, height) = region.dimensions();
        debug!(width, height, "extracted front cover region");

        let gray = luminance(&region);

        // Strategies only read the region, so they can run side by side.
        // Collect keeps strategy order.
        let scans = self
            .strategies
            .par_iter()
            .map(|strategy| self.scan(strategy.as_ref(), &gray, width, height))
            .collect::<Result<Vec<_>>>()?;

        let issue_lists: Vec<&[Issue]> = scans.iter().map(|s| s.issues.as_slice()).collect();
        let report = IssueAggregator::new(&self.options).aggregate(&issue_lists, width);

        info!(
            status = %report.status,
            score = report.confidence_score,
            issues = report.issues.len(),
            "cover analysis complete"
        );

        Ok(AnalysisOutcome {
            region,
            scans,
            report,
        })
    }

    fn scan(
        &self,
        strategy: &dyn BinarizationStrategy,
        gray: &GrayImage,
        width: u32,
        height: u32,
    ) -> Result<ScanResult> {
        let binary = strategy.binarize(gray);
        let boxes = self.detector.detect(&binary)?;
        let issues = ZoneChecker::new(&self.options).check(&boxes, width, height);

        debug!(
            strategy = strategy.name(),
            boxes = boxes.len(),
            issues = issues.len(),
            "scan finished"
        );

        Ok(ScanResult {
            strategy: strategy.name().to_string(),
            binary,
            boxes,
            issues,
        })
    }
}
