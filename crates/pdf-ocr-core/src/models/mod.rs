//! Data models: configuration and per-page results.

pub mod config;
pub mod page;

pub use config::{OcrConfig, PdfOcrConfig, PreprocessConfig, RenderConfig};
pub use page::{BoundingBox, PageResult, WordRecord};
