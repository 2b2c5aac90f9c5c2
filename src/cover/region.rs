//! Front cover region extraction
//!
//! Submissions are full-wrap spreads; the front cover is assumed to be the
//! right half. No spread/single-cover detection is attempted.

use image::{DynamicImage, GenericImageView};

use super::types::{AnalysisError, Result};

/// Pixel rectangle of the extracted region inside the source image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Crops the front cover out of a submitted page raster
pub struct RegionExtractor;

impl RegionExtractor {
    /// Region for a source of `width` x `height`: columns `[W/2, W)`, all rows
    pub fn front_cover_rect(width: u32, height: u32) -> Result<CoverRegion> {
        if width == 0 || height == 0 {
            return Err(AnalysisError::InvalidImage(format!(
                "Image has zero dimensions ({}x{})",
                width, height
            )));
        }

        let x = width / 2;
        Ok(CoverRegion {
            x,
            y: 0,
            width: width - x,
            height,
        })
    }

    /// Crop the front cover out of `image`
    pub fn extract(image: &DynamicImage) -> Result<DynamicImage> {
        let (width, height) = image.dimensions();
        let rect = Self::front_cover_rect(width, height)?;
        Ok(image.crop_imm(rect.x, rect.y, rect.width, rect.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    // TC-REG-001: Right half, full height
    #[test]
    fn test_front_cover_rect_even_width() {
        let rect = RegionExtractor::front_cover_rect(3000, 2400).unwrap();
        assert_eq!(
            rect,
            CoverRegion {
                x: 1500,
                y: 0,
                width: 1500,
                height: 2400
            }
        );
    }

    // TC-REG-002: Floor division keeps the extra column on the right
    #[test]
    fn test_front_cover_rect_odd_width() {
        let rect = RegionExtractor::front_cover_rect(1001, 10).unwrap();
        assert_eq!(rect.x, 500);
        assert_eq!(rect.width, 501);
    }

    #[test]
    fn test_single_pixel_width() {
        let rect = RegionExtractor::front_cover_rect(1, 1).unwrap();
        assert_eq!(rect.x, 0);
        assert_eq!(rect.width, 1);
    }

    // TC-REG-003: Empty images are rejected
    #[test]
    fn test_zero_dimensions() {
        assert!(matches!(
            RegionExtractor::front_cover_rect(0, 100),
            Err(AnalysisError::InvalidImage(_))
        ));
        assert!(matches!(
            RegionExtractor::front_cover_rect(100, 0),
            Err(AnalysisError::InvalidImage(_))
        ));
    }

    #[test]
    fn test_extract_keeps_right_half_pixels() {
        let img = RgbImage::from_fn(4, 2, |x, _| {
            if x < 2 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        });
        let region = RegionExtractor::extract(&DynamicImage::ImageRgb8(img)).unwrap();

        assert_eq!(region.dimensions(), (2, 2));
        let rgb = region.to_rgb8();
        assert!(rgb.pixels().all(|p| *p == Rgb([255, 255, 255])));
    }
}
