//! Error types for the pdf-ocr-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the pdf-ocr library.
#[derive(Error, Debug)]
pub enum PdfOcrError {
    /// PDF loading or rendering error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR engine error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// A pipeline stage failed on a specific page.
    #[error("{stage} failed on page {page}: {source}")]
    Page {
        page: u32,
        stage: Stage,
        #[source]
        source: Box<PdfOcrError>,
    },
}

/// Pipeline stage a page-level failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Rendering,
    Ocr,
    OcrData,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Rendering => "rendering",
            Stage::Ocr => "OCR",
            Stage::OcrData => "OCR data extraction",
        };
        f.write_str(name)
    }
}

impl PdfOcrError {
    /// Wrap an error with the page and stage it happened in.
    pub fn at_page(page: u32, stage: Stage, source: impl Into<PdfOcrError>) -> Self {
        PdfOcrError::Page {
            page,
            stage,
            source: Box::new(source.into()),
        }
    }

    /// Innermost error, looking through page wrappers.
    pub fn root(&self) -> &PdfOcrError {
        match self {
            PdfOcrError::Page { source, .. } => source.root(),
            other => other,
        }
    }

    /// Whether the OCR executable is missing.
    pub fn is_engine_missing(&self) -> bool {
        matches!(self.root(), PdfOcrError::Ocr(e) if e.is_engine_missing())
    }
}

/// Errors related to PDF loading and rendering.
#[derive(Error, Debug)]
pub enum PdfError {
    /// The PDFium shared library could not be bound.
    #[error("PDFium library could not be loaded: {0}")]
    LibraryBind(String),

    /// Failed to open/parse the PDF file.
    #[error("failed to open PDF: {0}")]
    Open(String),

    /// Rendering a page to a bitmap failed.
    #[error("failed to render page {page}: {reason}")]
    Render { page: usize, reason: String },

    /// Invalid page index requested.
    #[error("invalid page index: {0}")]
    InvalidPage(usize),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The OCR executable could not be found.
    #[error("Tesseract is not installed or not in your PATH (tried `{}`)", .0.display())]
    EngineNotFound(PathBuf),

    /// The OCR executable ran but reported a failure.
    #[error("tesseract exited with {status}: {stderr}")]
    EngineFailed { status: String, stderr: String },

    /// The engine did not produce the expected output.
    #[error("unreadable engine output: {0}")]
    Output(String),

    /// The image could not be handed to the engine.
    #[error("cannot prepare engine input: {0}")]
    Input(String),

    /// Temporary file handling around the engine call failed.
    #[error("I/O error around OCR call: {0}")]
    Io(#[from] std::io::Error),
}

impl OcrError {
    /// Whether this error means the engine binary itself is missing.
    pub fn is_engine_missing(&self) -> bool {
        matches!(self, OcrError::EngineNotFound(_))
    }
}

/// Result type for the pdf-ocr library.
pub type Result<T> = std::result::Result<T, PdfOcrError>;
