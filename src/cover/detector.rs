//! Text detection adapter
//!
//! Wraps the OCR engine behind [`TextDetector`]. Adapters return every
//! element the engine reports, including low confidence and very short
//! strings; inclusion policy lives in the zone checker.

use image::GrayImage;
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

use super::types::{AnalysisError, Result, TextBox};

/// Number of columns in a Tesseract TSV row (text is the last one)
const TSV_COLUMNS: usize = 12;

/// Given an image, returns the text elements found in it
pub trait TextDetector: Send + Sync {
    /// Engine name for logs and health output
    fn name(&self) -> &str;

    fn detect(&self, image: &GrayImage) -> Result<Vec<TextBox>>;
}

impl<T: TextDetector + ?Sized> TextDetector for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn detect(&self, image: &GrayImage) -> Result<Vec<TextBox>> {
        (**self).detect(image)
    }
}

/// Tesseract invocation settings
#[derive(Debug, Clone, Default)]
pub struct TesseractOptions {
    /// Explicit path to the tesseract binary; looked up on PATH when unset
    pub command: Option<PathBuf>,
    /// Language pack(s), e.g. "eng" or "eng+fra"
    pub language: Option<String>,
    /// Page segmentation mode
    pub psm: Option<u32>,
}

/// Detector backed by the `tesseract` command line tool
#[derive(Debug, Clone, Default)]
pub struct TesseractDetector {
    options: TesseractOptions,
}

impl TesseractDetector {
    pub fn new(options: TesseractOptions) -> Self {
        Self { options }
    }

    /// Resolve the binary to run
    pub fn resolve_command(&self) -> Result<PathBuf> {
        match &self.options.command {
            Some(path) if path.exists() => Ok(path.clone()),
            Some(path) => Err(AnalysisError::EngineUnavailable(format!(
                "tesseract not found at {}",
                path.display()
            ))),
            None => which::which("tesseract").map_err(|_| {
                AnalysisError::EngineUnavailable("tesseract not found in PATH".to_string())
            }),
        }
    }

    /// Whether the engine can be run at all
    pub fn is_available(&self) -> bool {
        self.resolve_command().is_ok()
    }

    fn run_tsv(&self, image: &GrayImage) -> Result<String> {
        let command = self.resolve_command()?;

        // Removed when dropped, on every return path
        let input = tempfile::Builder::new()
            .prefix("cover-ocr-")
            .suffix(".png")
            .tempfile()?;
        image.save_with_format(input.path(), image::ImageFormat::Png)?;

        let mut cmd = Command::new(&command);
        cmd.arg(input.path()).arg("stdout");
        if let Some(lang) = &self.options.language {
            cmd.arg("-l").arg(lang);
        }
        if let Some(psm) = self.options.psm {
            cmd.arg("--psm").arg(psm.to_string());
        }
        cmd.arg("tsv");

        debug!(command = %command.display(), "running tesseract");
        let output = cmd.output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AnalysisError::DetectionFailed(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl TextDetector for TesseractDetector {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn detect(&self, image: &GrayImage) -> Result<Vec<TextBox>> {
        let tsv = self.run_tsv(image)?;
        let boxes = parse_tsv(&tsv);
        debug!(count = boxes.len(), "tesseract returned elements");
        Ok(boxes)
    }
}

/// Parse Tesseract TSV output into text boxes
///
/// Columns: level, page, block, par, line, word, left, top, width, height,
/// conf, text. The header row and malformed rows are skipped. Confidence may
/// be fractional in newer Tesseract releases; it is truncated toward zero.
pub fn parse_tsv(tsv: &str) -> Vec<TextBox> {
    tsv.lines()
        .filter(|line| !line.starts_with("level"))
        .filter_map(parse_tsv_row)
        .collect()
}

fn parse_tsv_row(row: &str) -> Option<TextBox> {
    let cols: Vec<&str> = row.split('\t').collect();
    if cols.len() < TSV_COLUMNS - 1 {
        return None;
    }

    let level = cols[0].trim().parse::<u8>().ok()?;
    let x = cols[6].trim().parse::<u32>().ok()?;
    let y = cols[7].trim().parse::<u32>().ok()?;
    let width = cols[8].trim().parse::<u32>().ok()?;
    let height = cols[9].trim().parse::<u32>().ok()?;
    let confidence = cols[10].trim().parse::<f32>().ok()? as i32;
    // Text may itself contain tabs only in pathological output; keep the rest
    let text = if cols.len() >= TSV_COLUMNS {
        cols[TSV_COLUMNS - 1..].join("\t")
    } else {
        String::new()
    };

    Some(TextBox {
        level,
        text,
        confidence,
        x,
        y,
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_TSV: &str = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext
1\t1\t0\t0\t0\t0\t0\t0\t1500\t2400\t-1\t
2\t1\t1\t0\t0\t0\t100\t2330\t600\t40\t-1\t
5\t1\t1\t1\t1\t1\t100\t2330\t90\t40\t96.5\tWinner
5\t1\t1\t1\t1\t2\t200\t2330\t30\t40\t12\tof
5\t1\t1\t1\t1\t3\t250\t2330\t60\t40\t95\tBestseller";

    // TC-OCR-001: TSV rows become boxes, header skipped
    #[test]
    fn test_parse_tsv_rows() {
        let boxes = parse_tsv(SAMPLE_TSV);
        assert_eq!(boxes.len(), 5);

        let winner = &boxes[2];
        assert_eq!(winner.level, 5);
        assert_eq!(winner.text, "Winner");
        assert_eq!(winner.confidence, 96);
        assert_eq!((winner.x, winner.y, winner.width, winner.height), (100, 2330, 90, 40));
    }

    // TC-OCR-002: Low confidence and structural rows are kept
    #[test]
    fn test_parse_tsv_keeps_everything() {
        let boxes = parse_tsv(SAMPLE_TSV);
        assert_eq!(boxes[0].confidence, -1);
        assert!(boxes[0].text.is_empty());
        assert_eq!(boxes[3].confidence, 12);
        assert_eq!(boxes[3].text, "of");
    }

    #[test]
    fn test_parse_tsv_missing_text_column() {
        let boxes = parse_tsv("4\t1\t1\t1\t1\t0\t10\t20\t30\t40\t-1");
        assert_eq!(boxes.len(), 1);
        assert!(boxes[0].text.is_empty());
    }

    #[test]
    fn test_parse_tsv_skips_malformed() {
        let boxes = parse_tsv("garbage\n5\t1\t1\nx\t1\t1\t1\t1\t1\t1\t1\t1\t1\t1\tword\n");
        assert!(boxes.is_empty());
    }

    #[test]
    fn test_parse_tsv_empty() {
        assert!(parse_tsv("").is_empty());
    }

    #[test]
    fn test_missing_explicit_command() {
        let detector = TesseractDetector::new(TesseractOptions {
            command: Some(PathBuf::from("/nonexistent/tesseract")),
            ..Default::default()
        });
        assert!(!detector.is_available());
        let result = detector.detect(&GrayImage::new(4, 4));
        assert!(matches!(result, Err(AnalysisError::EngineUnavailable(_))));
    }
}
