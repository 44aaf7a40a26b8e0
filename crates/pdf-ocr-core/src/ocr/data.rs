//! Structured (TSV) engine output and word-level filtering.

use serde::Deserialize;
use tracing::{trace, warn};

use crate::error::OcrError;
use crate::models::page::{round_confidence, BoundingBox, WordRecord};

/// Granularity levels reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Page = 1,
    Block = 2,
    Paragraph = 3,
    Line = 4,
    Word = 5,
}

/// One row of the engine's TSV output.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DataRow {
    pub level: u32,
    pub page_num: u32,
    pub block_num: u32,
    pub par_num: u32,
    pub line_num: u32,
    pub word_num: u32,
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
    /// -1 for rows without a recognition score.
    pub conf: f64,
    #[serde(default)]
    pub text: Option<String>,
}

impl DataRow {
    /// Whether this row is a word with a score and visible text.
    pub fn is_scored_word(&self) -> bool {
        self.level == Level::Word as u32
            && self.conf >= 0.0
            && self.text.as_deref().is_some_and(|t| !t.trim().is_empty())
    }

    pub fn bbox(&self) -> BoundingBox {
        BoundingBox {
            left: self.left,
            top: self.top,
            width: self.width,
            height: self.height,
        }
    }
}

/// Parse the engine's TSV output.
///
/// Rows that do not match the column layout are skipped with a warning; a
/// missing header is an error.
pub fn parse_tsv(tsv: &str) -> Result<Vec<DataRow>, OcrError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .flexible(true)
        .has_headers(true)
        .from_reader(tsv.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| OcrError::Output(format!("cannot read TSV header: {}", e)))?;
    for required in ["level", "left", "top", "width", "height", "conf"] {
        if !headers.iter().any(|h| h == required) {
            return Err(OcrError::Output(format!(
                "TSV header is missing the `{}` column",
                required
            )));
        }
    }

    let mut rows = Vec::new();
    for (line, record) in reader.deserialize::<DataRow>().enumerate() {
        match record {
            Ok(row) => rows.push(row),
            Err(e) => warn!("Skipping malformed TSV row {}: {}", line + 2, e),
        }
    }

    trace!("Parsed {} TSV rows", rows.len());
    Ok(rows)
}

/// Keep scored word rows and convert them to output records.
pub fn words_from_rows(rows: &[DataRow]) -> Vec<WordRecord> {
    rows.iter()
        .filter(|row| row.is_scored_word())
        .map(|row| WordRecord {
            text: row.text.clone().unwrap_or_default(),
            bbox: row.bbox(),
            confidence: round_confidence(row.conf),
        })
        .collect()
}
