//! Cover Input module
//!
//! Turns a submitted file into a raster image for analysis.
//!
//! # Features
//!
//! - Filename sanitizing and extension allow-list (`png`, `pdf`)
//! - Raster decoding, normalized to RGB
//! - PDF first-page rasterization at the configured DPI
//! - SHA-256 digest of the submitted bytes for logging
//!
//! # Example
//!
//! ```rust,no_run
//! use cover_validator::CoverLoader;
//! use std::path::Path;
//!
//! let loader = CoverLoader::new(300);
//! let cover = loader.load(Path::new("cover.pdf")).unwrap();
//! println!("{} ({})", cover.filename, cover.sha256);
//! ```

mod rasterize;
mod types;

pub use rasterize::{PdftoppmRasterizer, Rasterizer};
pub use types::{InputError, InputKind, Result, ALLOWED_EXTENSIONS};

use image::DynamicImage;
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::debug;

/// A decoded submission
#[derive(Debug, Clone)]
pub struct LoadedCover {
    pub image: DynamicImage,
    /// Sanitized filename of the submission
    pub filename: String,
    pub kind: InputKind,
    /// Hex SHA-256 of the submitted file
    pub sha256: String,
}

/// Reduce an uploaded filename to a safe single path component
///
/// Keeps ASCII letters, digits, `.`, `_` and `-`; whitespace becomes `_`;
/// leading dots and underscores are stripped. Returns `None` when nothing is left.
pub fn sanitize_filename(name: &str) -> Option<String> {
    // Only the last path component counts
    let base = name.rsplit(&['/', '\\'][..]).next().unwrap_or(name);

    let cleaned: String = base
        .trim()
        .chars()
        .filter_map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                Some(c)
            } else if c.is_whitespace() {
                Some('_')
            } else {
                None
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches(&['.', '_'][..]).to_string();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Classify a filename by its extension
pub fn input_kind(filename: &str) -> Result<InputKind> {
    let ext = match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext.to_ascii_lowercase(),
        _ => return Err(InputError::UnsupportedExtension(filename.to_string())),
    };

    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(InputError::UnsupportedExtension(ext));
    }

    Ok(if ext == "pdf" {
        InputKind::Pdf
    } else {
        InputKind::Image
    })
}

/// Whether `filename` has an accepted extension
pub fn allowed_file(filename: &str) -> bool {
    input_kind(filename).is_ok()
}

/// Loads PNG and PDF submissions
pub struct CoverLoader {
    rasterizer: Box<dyn Rasterizer>,
    dpi: u32,
}

impl CoverLoader {
    /// Loader using `pdftoppm` for PDFs
    pub fn new(dpi: u32) -> Self {
        Self::with_rasterizer(Box::new(PdftoppmRasterizer::default()), dpi)
    }

    pub fn with_rasterizer(rasterizer: Box<dyn Rasterizer>, dpi: u32) -> Self {
        Self { rasterizer, dpi }
    }

    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    /// Load the file at `path`, using its own name for validation
    pub fn load(&self, path: &Path) -> Result<LoadedCover> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        self.load_named(path, name)
    }

    /// Load the file at `path` that was submitted as `original_name`
    ///
    /// Uploads are stored under temporary names, so the extension check
    /// uses the submitted name.
    pub fn load_named(&self, path: &Path, original_name: &str) -> Result<LoadedCover> {
        let filename = sanitize_filename(original_name)
            .ok_or_else(|| InputError::InvalidFilename(original_name.to_string()))?;
        let kind = input_kind(&filename)?;

        if !path.exists() {
            return Err(InputError::FileNotFound(path.to_path_buf()));
        }

        let bytes = std::fs::read(path)?;
        let sha256 = format!("{:x}", Sha256::digest(&bytes));
        debug!(filename = %filename, sha256 = %sha256, ?kind, "loading cover");

        let image = match kind {
            InputKind::Pdf => self.rasterizer.rasterize_first_page(path, self.dpi)?,
            InputKind::Image => {
                let decoded = image::load_from_memory(&bytes)
                    .map_err(|e| InputError::DecodeFailed(e.to_string()))?;
                match decoded {
                    rgb @ DynamicImage::ImageRgb8(_) => rgb,
                    other => DynamicImage::ImageRgb8(other.to_rgb8()),
                }
            }
        };

        Ok(LoadedCover {
            image,
            filename,
            kind,
            sha256,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, GrayImage, Luma};
    use std::path::PathBuf;

    /// Returns a fixed page, or fails
    struct StubRasterizer {
        page: Option<DynamicImage>,
    }

    impl Rasterizer for StubRasterizer {
        fn rasterize_first_page(&self, pdf_path: &Path, _dpi: u32) -> Result<DynamicImage> {
            self.page
                .clone()
                .ok_or_else(|| InputError::NoPageRendered(pdf_path.to_path_buf()))
        }
    }

    // TC-INP-001: Filename sanitizing
    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("cover.png").as_deref(), Some("cover.png"));
        assert_eq!(
            sanitize_filename("My Cover (final).PDF").as_deref(),
            Some("My_Cover_final.PDF")
        );
        assert_eq!(
            sanitize_filename("../../etc/passwd").as_deref(),
            Some("passwd")
        );
        assert_eq!(sanitize_filename("C:\\x\\y.png").as_deref(), Some("y.png"));
        assert_eq!(sanitize_filename(".hidden.png").as_deref(), Some("hidden.png"));
        assert_eq!(sanitize_filename(""), None);
        assert_eq!(sanitize_filename("../"), None);
        assert_eq!(sanitize_filename("表紙"), None);
    }

    // TC-INP-002: Extension allow-list
    #[test]
    fn test_input_kind() {
        assert_eq!(input_kind("a.png").unwrap(), InputKind::Image);
        assert_eq!(input_kind("a.PNG").unwrap(), InputKind::Image);
        assert_eq!(input_kind("a.pdf").unwrap(), InputKind::Pdf);
        assert!(matches!(
            input_kind("a.jpg"),
            Err(InputError::UnsupportedExtension(_))
        ));
        assert!(input_kind("png").is_err());
        assert!(input_kind(".png").is_err());
        assert!(allowed_file("cover.pdf"));
        assert!(!allowed_file("cover.tiff"));
    }

    #[test]
    fn test_bad_input_classification() {
        assert!(InputError::FileNotFound(PathBuf::from("x")).is_bad_input());
        assert!(InputError::InvalidFilename(String::new()).is_bad_input());
        assert!(InputError::UnsupportedExtension("gif".into()).is_bad_input());
        assert!(!InputError::DecodeFailed("x".into()).is_bad_input());
        assert!(!InputError::RenderFailed("x".into()).is_bad_input());
    }

    // TC-INP-003: PNG decoded and converted to RGB
    #[test]
    fn test_load_png_converts_to_rgb() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("cover.png");
        GrayImage::from_pixel(40, 20, Luma([200])).save(&path).unwrap();

        let loader = CoverLoader::new(300);
        let cover = loader.load(&path).unwrap();

        assert_eq!(cover.filename, "cover.png");
        assert_eq!(cover.kind, InputKind::Image);
        assert_eq!(cover.image.dimensions(), (40, 20));
        assert!(matches!(cover.image, DynamicImage::ImageRgb8(_)));
        assert_eq!(cover.sha256.len(), 64);
    }

    #[test]
    fn test_load_missing_file() {
        let loader = CoverLoader::new(300);
        let result = loader.load(Path::new("/nonexistent/cover.png"));
        assert!(matches!(result, Err(InputError::FileNotFound(_))));
    }

    #[test]
    fn test_load_undecodable_png() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("cover.png");
        std::fs::write(&path, b"definitely not png").unwrap();

        let result = CoverLoader::new(300).load(&path);
        assert!(matches!(result, Err(InputError::DecodeFailed(_))));
    }

    // TC-INP-004: Uploads validated by their submitted name
    #[test]
    fn test_load_named_uses_original_name() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("upload.tmp");
        std::fs::write(&path, b"%PDF-1.4").unwrap();

        let loader = CoverLoader::with_rasterizer(
            Box::new(StubRasterizer {
                page: Some(DynamicImage::new_rgb8(30, 10)),
            }),
            300,
        );
        let cover = loader.load_named(&path, "spread.pdf").unwrap();
        assert_eq!(cover.kind, InputKind::Pdf);
        assert_eq!(cover.image.dimensions(), (30, 10));

        let rejected = loader.load_named(&path, "spread.docx");
        assert!(matches!(rejected, Err(InputError::UnsupportedExtension(_))));
    }

    #[test]
    fn test_pdf_without_pages() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("empty.pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap();

        let loader =
            CoverLoader::with_rasterizer(Box::new(StubRasterizer { page: None }), 300);
        let result = loader.load(&path);
        assert!(matches!(result, Err(InputError::NoPageRendered(_))));
    }
}
