//! Core library for PDF OCR.
//!
//! This crate provides:
//! - PDF page rendering through PDFium
//! - Binarization and table/form line removal before OCR
//! - Tesseract invocation for page text and word-level boxes
//! - Per-page result models serialized as JSON

pub mod error;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod pipeline;

pub use error::{OcrError, PdfError, PdfOcrError, Result, Stage};
pub use models::config::PdfOcrConfig;
pub use models::page::{to_json, BoundingBox, PageResult, WordRecord};
pub use ocr::{LineRemover, OcrBackend, OcrParams, TesseractEngine};
pub use pdf::{PageSource, PdfiumDocument, PdfiumRenderer};
pub use pipeline::{OcrPipeline, OcrPipelineBuilder};
