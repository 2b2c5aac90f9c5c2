//! Award zone and safe margin checks
//!
//! Turns detected text boxes into layout issues. The overlap and margin
//! checks are independent: one box can raise both.

use super::types::{AnalysisOptions, Issue, TextBox};

/// Classifies text boxes against the award zone and safe margins
pub struct ZoneChecker<'a> {
    options: &'a AnalysisOptions,
}

impl<'a> ZoneChecker<'a> {
    pub fn new(options: &'a AnalysisOptions) -> Self {
        Self { options }
    }

    /// Issues for every box in a region of `width` x `height`
    pub fn check(&self, boxes: &[TextBox], width: u32, height: u32) -> Vec<Issue> {
        let award_zone_top = self.options.award_zone_top(height);
        let margin = self.options.safe_margin(width);
        let right_limit = width as f64 - margin;

        let mut issues = Vec::new();
        for text_box in boxes {
            let normalized = text_box.normalized_text();
            if !self.is_candidate(text_box, &normalized) {
                continue;
            }

            if text_box.bottom() as f64 > award_zone_top && !self.is_badge_text(&normalized) {
                issues.push(Issue::text_overlap(&text_box.text));
            }

            if (text_box.x as f64) < margin || text_box.right() as f64 > right_limit {
                issues.push(Issue::margin_violation(&text_box.text));
            }
        }
        issues
    }

    /// Confidence and length filter
    pub(crate) fn is_candidate(&self, text_box: &TextBox, normalized: &str) -> bool {
        text_box.confidence > self.options.min_confidence
            && normalized.chars().count() > self.options.max_discard_text_len
    }

    /// True when the text consists only of words printed on the badge
    ///
    /// Matching is whole-word; punctuation is not stripped.
    fn is_badge_text(&self, normalized: &str) -> bool {
        let mut words = normalized.split_whitespace().peekable();
        if words.peek().is_none() {
            return true;
        }
        words.all(|word| self.options.is_badge_word(word))
    }
}
