//! Common types for the input module

use std::path::PathBuf;
use thiserror::Error;

/// File extensions accepted for cover submissions
pub const ALLOWED_EXTENSIONS: [&str; 2] = ["png", "pdf"];

/// Input loading error types
#[derive(Debug, Error)]
pub enum InputError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Invalid filename: {0:?}")]
    InvalidFilename(String),

    #[error("Unsupported file extension: {0}")]
    UnsupportedExtension(String),

    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),

    #[error("Failed to render PDF: {0}")]
    RenderFailed(String),

    #[error("PDF produced no page image: {0}")]
    NoPageRendered(PathBuf),

    #[error("Required tool not found: {0}")]
    ToolNotFound(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl InputError {
    /// Whether the caller sent something unusable, as opposed to a
    /// processing failure on a well-formed request
    pub fn is_bad_input(&self) -> bool {
        matches!(
            self,
            InputError::FileNotFound(_)
                | InputError::InvalidFilename(_)
                | InputError::UnsupportedExtension(_)
        )
    }

    /// Whether the failure came from PDF rasterization
    pub fn is_render_failure(&self) -> bool {
        matches!(
            self,
            InputError::RenderFailed(_) | InputError::NoPageRendered(_) | InputError::ToolNotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, InputError>;

/// Kind of submitted document, decided by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Raster image decoded directly
    Image,
    /// PDF whose first page is rasterized
    Pdf,
}
