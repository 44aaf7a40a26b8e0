//! Page-by-page OCR pipeline: render, preprocess, recognize, collect.

use std::time::Instant;

use image::DynamicImage;
use tracing::{debug, info};

use crate::error::{PdfOcrError, Result, Stage};
use crate::models::config::PdfOcrConfig;
use crate::models::page::PageResult;
use crate::ocr::{words_from_rows, LineRemover, OcrBackend, OcrParams, TesseractEngine};
use crate::pdf::PageSource;

/// Runs every page of a document through preprocessing and OCR.
pub struct OcrPipeline<B: OcrBackend> {
    backend: B,
    preprocessor: Option<LineRemover>,
    params: OcrParams,
    dpi: u32,
}

/// Builder for OcrPipeline.
pub struct OcrPipelineBuilder<B: OcrBackend> {
    backend: Option<B>,
    config: PdfOcrConfig,
}

impl<B: OcrBackend> OcrPipelineBuilder<B> {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            backend: None,
            config: PdfOcrConfig::default(),
        }
    }

    /// Set the OCR backend.
    pub fn with_backend(mut self, backend: B) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Set configuration.
    pub fn with_config(mut self, config: PdfOcrConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the pipeline, validating the configuration.
    pub fn build(self) -> Result<OcrPipeline<B>> {
        self.config.validate()?;
        let backend = self
            .backend
            .ok_or_else(|| PdfOcrError::Config("no OCR backend configured".to_string()))?;

        let preprocessor = self
            .config
            .preprocess
            .enabled
            .then(|| LineRemover::from_config(&self.config.preprocess));

        Ok(OcrPipeline {
            backend,
            preprocessor,
            params: OcrParams::from(&self.config.ocr),
            dpi: self.config.render.dpi,
        })
    }
}

impl<B: OcrBackend> Default for OcrPipelineBuilder<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrPipeline<TesseractEngine> {
    /// Pipeline calling the Tesseract executable named in the configuration.
    pub fn from_config(config: PdfOcrConfig) -> Result<Self> {
        let engine = TesseractEngine::new(config.ocr.tesseract_cmd.clone());
        OcrPipeline::builder()
            .with_backend(engine)
            .with_config(config)
            .build()
    }
}

impl<B: OcrBackend> OcrPipeline<B> {
    /// Create a new builder.
    pub fn builder() -> OcrPipelineBuilder<B> {
        OcrPipelineBuilder::new()
    }

    /// The OCR backend in use.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Rendering resolution.
    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    /// Whether line removal runs before OCR.
    pub fn preprocesses(&self) -> bool {
        self.preprocessor.is_some()
    }

    /// Preprocess a rendered page and run both OCR passes on it.
    pub fn process_page(&self, image: &DynamicImage, page_number: u32) -> Result<PageResult> {
        let prepared = match &self.preprocessor {
            Some(remover) => DynamicImage::ImageLuma8(remover.process(image)),
            None => image.clone(),
        };

        let page_text = self
            .backend
            .image_to_string(&prepared, &self.params)
            .map_err(|e| PdfOcrError::at_page(page_number, Stage::Ocr, e))?;

        let rows = self
            .backend
            .image_to_data(&prepared, &self.params)
            .map_err(|e| PdfOcrError::at_page(page_number, Stage::OcrData, e))?;

        let words = words_from_rows(&rows);
        debug!(
            "Page {}: {} chars, {} of {} rows kept as words",
            page_number,
            page_text.len(),
            words.len(),
            rows.len()
        );

        Ok(PageResult {
            page_number,
            page_overall_text: page_text,
            words,
        })
    }

    /// Process every page of `source` in order.
    ///
    /// `on_page` is called after each page with the finished result and the
    /// total page count. The first failing page aborts the run.
    pub fn run<S: PageSource>(
        &self,
        source: &S,
        mut on_page: impl FnMut(&PageResult, usize),
    ) -> Result<Vec<PageResult>> {
        let start = Instant::now();
        let page_count = source.page_count();
        let mut results = Vec::with_capacity(page_count);

        for index in 0..page_count {
            let page_number = index as u32 + 1;

            let image = source
                .render_page(index, self.dpi)
                .map_err(|e| PdfOcrError::at_page(page_number, Stage::Rendering, e))?;
            debug!(
                "Rendered page {}/{}: {}x{}",
                page_number,
                page_count,
                image.width(),
                image.height()
            );

            let result = self.process_page(&image, page_number)?;
            on_page(&result, page_count);
            results.push(result);
        }

        info!(
            "OCR complete: {} pages in {}ms",
            results.len(),
            start.elapsed().as_millis()
        );

        Ok(results)
    }
}
