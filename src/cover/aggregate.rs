//! Issue aggregation
//!
//! Merges the per-scan issue lists into the final report.

use std::collections::HashSet;

use super::types::{AnalysisOptions, AnalysisReport, Issue};

/// Merges scan results, adds the resolution check, and scores the cover
pub struct IssueAggregator<'a> {
    options: &'a AnalysisOptions,
}

impl<'a> IssueAggregator<'a> {
    pub fn new(options: &'a AnalysisOptions) -> Self {
        Self { options }
    }

    /// Build the report for a region of `region_width` pixels
    ///
    /// Lists are concatenated in order; a repeated issue keeps the position
    /// of its first occurrence.
    pub fn aggregate<L>(&self, issue_lists: &[L], region_width: u32) -> AnalysisReport
    where
        L: AsRef<[Issue]>,
    {
        let mut issues = Self::deduplicate(issue_lists.iter().flat_map(|l| l.as_ref().iter()));

        if region_width < self.options.low_resolution_width {
            let low_res = Issue::low_resolution(region_width, self.options.recommended_width());
            if !issues.contains(&low_res) {
                issues.push(low_res);
            }
        }

        AnalysisReport::from_issues(issues)
    }

    /// Structural deduplication preserving first-seen order
    pub fn deduplicate<'i, I>(issues: I) -> Vec<Issue>
    where
        I: IntoIterator<Item = &'i Issue>,
    {
        let mut seen = HashSet::new();
        issues
            .into_iter()
            .filter(|issue| seen.insert(*issue))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cover::types::{IssueType, ReportStatus, Severity};

    fn aggregate(lists: &[Vec<Issue>], width: u32) -> AnalysisReport {
        let options = AnalysisOptions::default();
        IssueAggregator::new(&options).aggregate(lists, width)
    }

    // TC-AGG-001: Empty input is a clean pass
    #[test]
    fn test_clean_cover() {
        let report = aggregate(&[vec![], vec![]], 1500);
        assert_eq!(report.status, ReportStatus::Pass);
        assert_eq!(report.confidence_score, 100);
        assert!(report.issues.is_empty());
    }

    // TC-AGG-002: Same issue from both scans collapses
    #[test]
    fn test_duplicates_across_scans() {
        let issue = Issue::margin_violation("Author");
        let report = aggregate(&[vec![issue.clone()], vec![issue.clone()]], 1500);

        assert_eq!(report.issues, vec![issue]);
        assert_eq!(report.status, ReportStatus::Pass);
        assert_eq!(report.confidence_score, 80);
    }

    #[test]
    fn test_first_occurrence_order() {
        let a = Issue::margin_violation("A text");
        let b = Issue::text_overlap("B text");
        let c = Issue::margin_violation("C text");
        let report = aggregate(&[vec![a.clone(), b.clone()], vec![c.clone(), a.clone()]], 1500);

        assert_eq!(report.issues, vec![a, b, c]);
    }

    #[test]
    fn test_different_text_not_merged() {
        let report = aggregate(
            &[
                vec![Issue::margin_violation("Author")],
                vec![Issue::margin_violation("Auth0r")],
            ],
            1500,
        );
        assert_eq!(report.issues.len(), 2);
    }

    // TC-AGG-003: Idempotent deduplication
    #[test]
    fn test_deduplicate_idempotent() {
        let lists = vec![
            vec![Issue::text_overlap("X1y"), Issue::margin_violation("X1y")],
            vec![Issue::text_overlap("X1y"), Issue::margin_violation("Zed")],
        ];
        let once = aggregate(&lists, 800);
        let twice = aggregate(&[once.issues.clone(), once.issues.clone()], 800);

        assert_eq!(once, twice);
        assert_eq!(
            once.issues
                .iter()
                .filter(|i| i.issue_type == IssueType::LowResolution)
                .count(),
            1
        );
    }

    // TC-AGG-004: Low resolution below 1000 px
    #[test]
    fn test_low_resolution() {
        let report = aggregate(&[vec![], vec![]], 900);

        assert_eq!(report.issues.len(), 1);
        let issue = &report.issues[0];
        assert_eq!(issue.issue_type, IssueType::LowResolution);
        assert_eq!(issue.severity, Severity::Minor);
        assert_eq!(
            issue.details,
            "Front cover width is 900px. A width of at least 1500px is recommended."
        );
        assert_eq!(report.status, ReportStatus::Pass);
        assert_eq!(report.confidence_score, 80);
    }

    #[test]
    fn test_resolution_boundary() {
        assert!(aggregate(&[vec![], vec![]], 1000).issues.is_empty());
        assert_eq!(aggregate(&[vec![], vec![]], 999).issues.len(), 1);
    }

    // TC-AGG-005: Any critical issue overrides
    #[test]
    fn test_critical_overrides_minor() {
        let minor_only = aggregate(&[vec![Issue::margin_violation("Author")], vec![]], 900);
        assert_eq!(minor_only.confidence_score, 80);

        let with_critical = aggregate(
            &[
                vec![Issue::margin_violation("Author")],
                vec![Issue::text_overlap("Bestseller")],
            ],
            900,
        );
        assert_eq!(with_critical.status, ReportStatus::ReviewNeeded);
        assert_eq!(with_critical.confidence_score, 10);
        assert!(with_critical.has_critical());
    }

    #[test]
    fn test_recommended_width_follows_dpi() {
        let options = AnalysisOptions::builder().dpi(600).low_resolution_width(2000).build();
        let report = IssueAggregator::new(&options).aggregate(&[Vec::<Issue>::new()], 1200);
        assert!(report.issues[0].details.contains("3000px"));
    }

    #[test]
    fn test_single_list() {
        let report = aggregate(&[vec![Issue::text_overlap("Solo")]], 1500);
        assert_eq!(report.issues.len(), 1);
        assert!(!report.passed());
    }
}
