//! PDF first-page rasterization
//!
//! [`PdftoppmRasterizer`] shells out to Poppler's `pdftoppm`. Documents that
//! `lopdf` can parse and that have no pages are rejected up front; anything
//! else is left to pdftoppm's exit status.

use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};

use super::types::{InputError, Result};

/// Renders the first page of a document
pub trait Rasterizer: Send + Sync {
    fn rasterize_first_page(&self, pdf_path: &Path, dpi: u32) -> Result<DynamicImage>;
}

/// Rasterizer backed by the `pdftoppm` command line tool
#[derive(Debug, Clone, Default)]
pub struct PdftoppmRasterizer {
    /// Explicit path to pdftoppm; looked up on PATH when unset
    command: Option<PathBuf>,
}

impl PdftoppmRasterizer {
    pub fn new(command: Option<PathBuf>) -> Self {
        Self { command }
    }

    /// Resolve the binary to run
    pub fn resolve_command(&self) -> Result<PathBuf> {
        match &self.command {
            Some(path) if path.exists() => Ok(path.clone()),
            Some(path) => Err(InputError::ToolNotFound(path.display().to_string())),
            None => which::which("pdftoppm")
                .map_err(|_| InputError::ToolNotFound("pdftoppm".to_string())),
        }
    }

    pub fn is_available(&self) -> bool {
        self.resolve_command().is_ok()
    }

    /// Number of pages, or an error for unreadable documents
    pub fn page_count(pdf_path: &Path) -> Result<usize> {
        let doc = lopdf::Document::load(pdf_path)
            .map_err(|e| InputError::RenderFailed(format!("{}: {}", pdf_path.display(), e)))?;
        Ok(doc.get_pages().len())
    }
}

impl Rasterizer for PdftoppmRasterizer {
    fn rasterize_first_page(&self, pdf_path: &Path, dpi: u32) -> Result<DynamicImage> {
        if !pdf_path.exists() {
            return Err(InputError::FileNotFound(pdf_path.to_path_buf()));
        }

        match Self::page_count(pdf_path) {
            Ok(0) => return Err(InputError::NoPageRendered(pdf_path.to_path_buf())),
            Ok(pages) => debug!(pages, "pdf page count"),
            Err(e) => warn!(error = %e, "lopdf could not parse the document; trying pdftoppm"),
        }

        let command = self.resolve_command()?;
        let out_dir = tempfile::tempdir()?;
        let prefix = out_dir.path().join("page");

        debug!(pdf = %pdf_path.display(), dpi, "rasterizing first page");
        let output = Command::new(&command)
            .arg("-r")
            .arg(dpi.to_string())
            .args(["-f", "1", "-l", "1", "-singlefile", "-png"])
            .arg(pdf_path)
            .arg(&prefix)
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(InputError::RenderFailed(stderr.trim().to_string()));
        }

        let page_path = prefix.with_extension("png");
        if !page_path.exists() {
            return Err(InputError::NoPageRendered(pdf_path.to_path_buf()));
        }

        let page = image::open(&page_path).map_err(|e| InputError::RenderFailed(e.to_string()))?;
        Ok(match page {
            rgb @ DynamicImage::ImageRgb8(_) => rgb,
            other => DynamicImage::ImageRgb8(other.to_rgb8()),
        })
    }
}
