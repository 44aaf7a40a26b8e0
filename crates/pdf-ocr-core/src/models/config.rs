//! Configuration structures for the OCR pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::PdfOcrError;

/// Highest page segmentation mode Tesseract accepts.
pub const MAX_PSM: u8 = 13;

/// Main configuration for the pdf-ocr pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfOcrConfig {
    /// OCR engine configuration.
    pub ocr: OcrConfig,

    /// PDF rendering configuration.
    pub render: RenderConfig,

    /// Line-removal preprocessing configuration.
    pub preprocess: PreprocessConfig,
}

/// OCR engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Tesseract language code (e.g. "jpn", "eng", "jpn+eng").
    pub language: String,

    /// Page segmentation mode (0 - 13).
    pub psm: u8,

    /// Tesseract executable name or path.
    pub tesseract_cmd: PathBuf,

    /// Extra arguments appended to every engine call.
    pub extra_args: Vec<String>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: "jpn".to_string(),
            psm: 6,
            tesseract_cmd: PathBuf::from("tesseract"),
            extra_args: Vec::new(),
        }
    }
}

/// PDF rendering configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// DPI for rendering PDF pages to images.
    pub dpi: u32,

    /// Directory holding the PDFium shared library.
    pub pdfium_library_dir: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            dpi: 300,
            pdfium_library_dir: None,
        }
    }
}

/// Line-removal preprocessing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Run binarization and line removal before OCR.
    pub enabled: bool,

    /// Minimum run length (pixels) of a horizontal line.
    pub horizontal_kernel: u32,

    /// Minimum run length (pixels) of a vertical line.
    pub vertical_kernel: u32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            horizontal_kernel: 50,
            vertical_kernel: 50,
        }
    }
}

impl PdfOcrConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), PdfOcrError> {
        if self.render.dpi == 0 {
            return Err(PdfOcrError::Config("render.dpi must be at least 1".to_string()));
        }
        if self.ocr.psm > MAX_PSM {
            return Err(PdfOcrError::Config(format!(
                "ocr.psm must be between 0 and {}, got {}",
                MAX_PSM, self.ocr.psm
            )));
        }
        if self.ocr.language.trim().is_empty() {
            return Err(PdfOcrError::Config("ocr.language must not be empty".to_string()));
        }
        if self.preprocess.horizontal_kernel == 0 || self.preprocess.vertical_kernel == 0 {
            return Err(PdfOcrError::Config(
                "preprocess kernel lengths must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = PdfOcrConfig::default();
        assert_eq!(config.ocr.language, "jpn");
        assert_eq!(config.ocr.psm, 6);
        assert_eq!(config.render.dpi, 300);
        assert!(config.preprocess.enabled);
        assert_eq!(config.preprocess.horizontal_kernel, 50);
        assert_eq!(config.preprocess.vertical_kernel, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: PdfOcrConfig =
            serde_json::from_str(r#"{"ocr": {"language": "eng"}, "render": {"dpi": 150}}"#).unwrap();
        assert_eq!(config.ocr.language, "eng");
        assert_eq!(config.ocr.psm, 6);
        assert_eq!(config.render.dpi, 150);
        assert_eq!(config.preprocess, PreprocessConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = PdfOcrConfig::default();
        config.ocr.psm = 3;
        config.preprocess.enabled = false;
        std::fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

        let loaded = PdfOcrConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_json_is_invalid_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = PdfOcrConfig::from_file(&path).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let mut config = PdfOcrConfig::default();
        config.ocr.psm = 14;
        assert!(config.validate().is_err());

        let mut config = PdfOcrConfig::default();
        config.render.dpi = 0;
        assert!(config.validate().is_err());

        let mut config = PdfOcrConfig::default();
        config.ocr.language = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = PdfOcrConfig::default();
        config.preprocess.vertical_kernel = 0;
        assert!(config.validate().is_err());
    }
}
