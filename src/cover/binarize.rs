//! Binarization strategies
//!
//! A cover can carry light text on a dark illustration or dark text on a
//! pale background. One global threshold cannot separate both, so the
//! analyzer scans the region once per strategy.
//!
//! Every strategy must hand the detector dark text on a light field.

use image::{imageops, DynamicImage, GrayImage, Luma};

use super::types::AnalysisOptions;

/// Name of the light-on-dark variant
pub const LIGHT_TEXT_VARIANT: &str = "light-text";

/// Name of the dark-on-light variant
pub const DARK_TEXT_VARIANT: &str = "dark-text";

/// Produces one binary rendering of a grayscale region
pub trait BinarizationStrategy: Send + Sync {
    /// Short name used in logs and debug output
    fn name(&self) -> &str;

    /// Render `gray` as a two-level image
    fn binarize(&self, gray: &GrayImage) -> GrayImage;
}

/// Global fixed threshold followed by tonal inversion
///
/// Pixels strictly brighter than `threshold` become white, the rest black,
/// then black and white are swapped.
#[derive(Debug, Clone)]
pub struct GlobalThreshold {
    name: String,
    threshold: u8,
}

impl GlobalThreshold {
    pub fn new(name: impl Into<String>, threshold: u8) -> Self {
        Self {
            name: name.into(),
            threshold,
        }
    }

    /// Variant for light text on a dark background
    pub fn light_text(threshold: u8) -> Self {
        Self::new(LIGHT_TEXT_VARIANT, threshold)
    }

    /// Variant for dark text on a light background
    pub fn dark_text(threshold: u8) -> Self {
        Self::new(DARK_TEXT_VARIANT, threshold)
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }
}

impl BinarizationStrategy for GlobalThreshold {
    fn name(&self) -> &str {
        &self.name
    }

    fn binarize(&self, gray: &GrayImage) -> GrayImage {
        let threshold = self.threshold;
        let mut binary = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
            if gray.get_pixel(x, y)[0] > threshold {
                Luma([255])
            } else {
                Luma([0])
            }
        });
        imageops::invert(&mut binary);
        binary
    }
}

/// Grayscale with ITU-R 601 weights (299/587/114), rounded
///
/// `DynamicImage::to_luma8` uses Rec. 709 weights, which moves saturated
/// greens and reds across the scan thresholds.
pub fn luminance(image: &DynamicImage) -> GrayImage {
    let rgb = image.to_rgb8();
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        let weighted = r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471 + 0x8000;
        Luma([(weighted >> 16) as u8])
    })
}

/// The dual-scan pair, light-text variant first
pub fn default_strategies(options: &AnalysisOptions) -> Vec<Box<dyn BinarizationStrategy>> {
    vec![
        Box::new(GlobalThreshold::light_text(options.light_text_threshold)),
        Box::new(GlobalThreshold::dark_text(options.dark_text_threshold)),
    ]
}
