//! Debug image output
//!
//! Writes the cropped region, every binarized scan, and an overlay with the
//! award zone, the safe margins and every box that passed the filters.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::analyzer::AnalysisOutcome;
use super::checker::ZoneChecker;
use super::types::{AnalysisOptions, Result};

/// Award zone boundary color
const ZONE_COLOR: Rgb<u8> = Rgb([220, 40, 40]);

/// Safe margin line color
const MARGIN_COLOR: Rgb<u8> = Rgb([40, 120, 220]);

/// Palette for boxes, one color per scan
const SCAN_COLORS: [Rgb<u8>; 4] = [
    Rgb([40, 180, 60]),
    Rgb([230, 150, 20]),
    Rgb([160, 60, 200]),
    Rgb([20, 170, 170]),
];

/// Saves debug renderings of an analysis
pub struct DebugRenderer;

impl DebugRenderer {
    /// Write all debug images into `dir`, returning the written paths
    pub fn save(
        outcome: &AnalysisOutcome,
        options: &AnalysisOptions,
        dir: &Path,
    ) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::new();

        let region_path = dir.join("region.png");
        outcome.region.save(&region_path)?;
        written.push(region_path);

        for scan in &outcome.scans {
            let path = dir.join(format!("scan_{}.png", scan.strategy));
            scan.binary.save(&path)?;
            written.push(path);
        }

        let overlay_path = dir.join("overlay.png");
        Self::render_overlay(outcome, options).save(&overlay_path)?;
        written.push(overlay_path);

        debug!(count = written.len(), dir = %dir.display(), "saved debug images");
        Ok(written)
    }

    /// Region with zone, margins and candidate boxes drawn on top
    pub fn render_overlay(outcome: &AnalysisOutcome, options: &AnalysisOptions) -> RgbImage {
        let mut canvas = outcome.region.to_rgb8();
        let (width, height) = canvas.dimensions();
        let max_x = width.saturating_sub(1) as f32;
        let max_y = height.saturating_sub(1) as f32;

        let zone_y = (options.award_zone_top(height) as f32).min(max_y);
        draw_line_segment_mut(&mut canvas, (0.0, zone_y), (max_x, zone_y), ZONE_COLOR);

        let margin = options.safe_margin(width) as f32;
        let left = margin.min(max_x);
        let right = (width as f32 - margin).clamp(0.0, max_x);
        draw_line_segment_mut(&mut canvas, (left, 0.0), (left, max_y), MARGIN_COLOR);
        draw_line_segment_mut(&mut canvas, (right, 0.0), (right, max_y), MARGIN_COLOR);

        let checker = ZoneChecker::new(options);
        for (i, scan) in outcome.scans.iter().enumerate() {
            let color = SCAN_COLORS[i % SCAN_COLORS.len()];
            for text_box in scan
                .boxes
                .iter()
                .filter(|b| checker.is_candidate(b, &b.normalized_text()))
            {
                let rect = Rect::at(text_box.x as i32, text_box.y as i32)
                    .of_size(text_box.width.max(1), text_box.height.max(1));
                draw_hollow_rect_mut(&mut canvas, rect, color);
            }
        }

        canvas
    }
}
