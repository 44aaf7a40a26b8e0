//! OCR pipeline: preprocessing and the external recognition engine.

mod data;
mod preprocessing;
mod tesseract;

pub use data::{parse_tsv, words_from_rows, DataRow, Level};
pub use preprocessing::{
    binarize_inverted, erase_external_contours, open_horizontal, open_vertical, to_gray, LineRemover,
};
pub use tesseract::TesseractEngine;

use image::DynamicImage;

use crate::error::OcrError;
use crate::models::config::OcrConfig;

/// Per-call engine parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrParams {
    /// Language code passed as `-l`.
    pub language: String,
    /// Page segmentation mode passed as `--psm`.
    pub psm: u8,
    /// Extra arguments appended to each call.
    pub extra_args: Vec<String>,
}

impl From<&OcrConfig> for OcrParams {
    fn from(config: &OcrConfig) -> Self {
        Self {
            language: config.language.clone(),
            psm: config.psm,
            extra_args: config.extra_args.clone(),
        }
    }
}

/// An OCR engine offering plain-text and structured recognition.
pub trait OcrBackend {
    /// Recognize the whole image as plain text.
    fn image_to_string(&self, image: &DynamicImage, params: &OcrParams) -> Result<String, OcrError>;

    /// Recognize the image into rows at every granularity level.
    fn image_to_data(
        &self,
        image: &DynamicImage,
        params: &OcrParams,
    ) -> Result<Vec<DataRow>, OcrError>;
}
