//! Configuration file support
//!
//! Settings are read from TOML and merged with command line overrides;
//! command line values win.
//!
//! Search order when no explicit path is given:
//!
//! 1. `./cover-validator.toml`
//! 2. `<config dir>/cover-validator/config.toml`
//!
//! ```toml
//! [analysis]
//! award_zone_percent = 4.5
//! safe_margin_percent = 2.4
//! badge_words = ["winner", "of", "the", "award"]
//!
//! [ocr]
//! language = "eng"
//! psm = 3
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::cover::{AnalysisOptions, TesseractOptions};

/// Local config file name
pub const LOCAL_CONFIG_FILE: &str = "cover-validator.toml";

/// Directory name under the user config dir
pub const CONFIG_DIR_NAME: &str = "cover-validator";

/// Config error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// OCR and rasterizer tool settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    pub language: Option<String>,
    pub psm: Option<u32>,
    pub tesseract_path: Option<PathBuf>,
    pub pdftoppm_path: Option<PathBuf>,
}

/// Contents of a config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analysis: AnalysisOptions,
    pub ocr: OcrConfig,
}

/// Values given on the command line
///
/// `None` leaves the config file value in place.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub dpi: Option<u32>,
    pub min_confidence: Option<i32>,
    pub language: Option<String>,
    pub psm: Option<u32>,
    pub tesseract_path: Option<PathBuf>,
    pub pdftoppm_path: Option<PathBuf>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Final settings after merging file and command line
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub analysis: AnalysisOptions,
    pub tesseract: TesseractOptions,
    pub pdftoppm_path: Option<PathBuf>,
}

impl Config {
    /// Candidate config file locations, most specific first
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join(CONFIG_DIR_NAME).join("config.toml"));
        }
        paths
    }

    /// Load the first config file found, or defaults when there is none
    pub fn load() -> Result<Self> {
        match Self::search_paths().into_iter().find(|p| p.is_file()) {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Merge with command line values (command line takes precedence)
    pub fn merge_with_cli(&self, cli: &CliOverrides) -> ResolvedConfig {
        let mut builder = AnalysisOptions::builder()
            .award_zone_percent(self.analysis.award_zone_percent)
            .safe_margin_percent(self.analysis.safe_margin_percent)
            .min_confidence(cli.min_confidence.unwrap_or(self.analysis.min_confidence))
            .max_discard_text_len(self.analysis.max_discard_text_len)
            .badge_words(&self.analysis.badge_words)
            .light_text_threshold(self.analysis.light_text_threshold)
            .dark_text_threshold(self.analysis.dark_text_threshold)
            .low_resolution_width(self.analysis.low_resolution_width)
            .dpi(self.analysis.dpi)
            .cover_size_inches(
                self.analysis.cover_width_inches,
                self.analysis.cover_height_inches,
            );
        if let Some(dpi) = cli.dpi {
            builder = builder.dpi(dpi);
        }

        let tesseract = TesseractOptions {
            command: cli
                .tesseract_path
                .clone()
                .or_else(|| self.ocr.tesseract_path.clone()),
            language: cli.language.clone().or_else(|| self.ocr.language.clone()),
            psm: cli.psm.or(self.ocr.psm),
        };

        ResolvedConfig {
            analysis: builder.build(),
            tesseract,
            pdftoppm_path: cli
                .pdftoppm_path
                .clone()
                .or_else(|| self.ocr.pdftoppm_path.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.analysis, AnalysisOptions::default());
        assert!(config.ocr.language.is_none());
    }

    // TC-CFG-001: Partial TOML keeps defaults for missing keys
    #[test]
    fn test_partial_toml() {
        let config = Config::from_toml(
            r#"
            [analysis]
            safe_margin_percent = 3.0
            badge_words = ["Gold", "medal"]

            [ocr]
            language = "eng"
            "#,
        )
        .unwrap();

        assert_eq!(config.analysis.safe_margin_percent, 3.0);
        assert_eq!(config.analysis.award_zone_percent, 4.5);
        assert_eq!(config.analysis.min_confidence, 30);
        assert_eq!(config.ocr.language.as_deref(), Some("eng"));
        assert!(config.ocr.psm.is_none());
    }

    #[test]
    fn test_empty_toml() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_toml() {
        let result = Config::from_toml("[analysis\nbroken");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_missing_path() {
        let result = Config::load_from_path(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[analysis]\ndpi = 600\n").unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.analysis.dpi, 600);
    }

    // TC-CFG-002: Command line wins over the file
    #[test]
    fn test_merge_with_cli() {
        let config = Config::from_toml(
            r#"
            [analysis]
            dpi = 600
            min_confidence = 40
            badge_words = ["Gold", "MEDAL"]

            [ocr]
            language = "fra"
            psm = 6
            "#,
        )
        .unwrap();

        let overrides = CliOverrides {
            dpi: Some(150),
            language: Some("eng".to_string()),
            ..Default::default()
        };
        let resolved = config.merge_with_cli(&overrides);

        assert_eq!(resolved.analysis.dpi, 150);
        assert_eq!(resolved.analysis.min_confidence, 40);
        assert!(resolved.analysis.is_badge_word("gold"));
        assert!(resolved.analysis.is_badge_word("medal"));
        assert_eq!(resolved.tesseract.language.as_deref(), Some("eng"));
        assert_eq!(resolved.tesseract.psm, Some(6));
        assert!(resolved.tesseract.command.is_none());
    }

    #[test]
    fn test_merge_without_overrides_keeps_defaults() {
        let resolved = Config::default().merge_with_cli(&CliOverrides::new());
        assert_eq!(resolved.analysis, AnalysisOptions::default());
        assert!(resolved.pdftoppm_path.is_none());
    }

    #[test]
    fn test_toml_roundtrip_of_defaults() {
        let text = Config::default().to_toml().unwrap();
        assert!(text.contains("award_zone_percent"));
        assert_eq!(Config::from_toml(&text).unwrap(), Config::default());
    }

    #[test]
    fn test_search_paths() {
        let paths = Config::search_paths();
        assert_eq!(paths[0], PathBuf::from(LOCAL_CONFIG_FILE));
    }
}
