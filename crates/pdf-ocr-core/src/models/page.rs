//! Per-page OCR results as they appear in the JSON output.

use serde::{Deserialize, Serialize};

/// Axis-aligned box in pixel units of the rendered page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

/// A single recognized word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordRecord {
    /// Recognized text, never empty.
    pub text: String,

    /// Word bounding box.
    pub bbox: BoundingBox,

    /// Engine confidence (0 - 100), rounded to two decimals.
    pub confidence: f64,
}

/// OCR output for one PDF page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    /// Page number (1-indexed).
    pub page_number: u32,

    /// Full page text as produced by the engine's plain-text mode.
    pub page_overall_text: String,

    /// Word-level records in engine order.
    pub words: Vec<WordRecord>,
}

impl PageResult {
    /// Number of recognized words on the page.
    pub fn word_count(&self) -> usize {
        self.words.len()
    }
}

/// Round a confidence score to two decimals.
pub fn round_confidence(conf: f64) -> f64 {
    (conf * 100.0).round() / 100.0
}

/// Serialize page results as a JSON array.
///
/// Non-ASCII text is written as-is; pretty output uses two-space indentation.
pub fn to_json(pages: &[PageResult], pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(pages)
    } else {
        serde_json::to_string(pages)
    }
}
