//! PDF page rasterization using PDFium.

use std::path::Path;

use image::DynamicImage;
use pdfium_render::prelude::*;
use tracing::{debug, trace};

use super::{render_target, PageSource, Result};
use crate::error::PdfError;

/// Owns the PDFium bindings; documents borrow from it.
pub struct PdfiumRenderer {
    pdfium: Pdfium,
}

/// An open PDF document ready for rendering.
pub struct PdfiumDocument<'a> {
    document: PdfDocument<'a>,
}

impl PdfiumRenderer {
    /// Bind to PDFium.
    ///
    /// With `library_dir` set, only that directory is tried. Otherwise the
    /// current directory is tried first, then the system library.
    pub fn new(library_dir: Option<&Path>) -> Result<Self> {
        let bindings = match library_dir {
            Some(dir) => {
                let dir = dir.to_string_lossy();
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&*dir))
            }
            None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                .or_else(|_| Pdfium::bind_to_system_library()),
        }
        .map_err(|e| PdfError::LibraryBind(e.to_string()))?;

        debug!("Bound PDFium library");
        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }

    /// Open a PDF file.
    pub fn open(&self, path: &Path) -> Result<PdfiumDocument<'_>> {
        let document = self
            .pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| PdfError::Open(format!("{}: {}", path.display(), e)))?;

        debug!(
            "Opened {} with {} pages",
            path.display(),
            document.pages().len()
        );

        Ok(PdfiumDocument { document })
    }
}

impl PageSource for PdfiumDocument<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn render_page(&self, index: usize, dpi: u32) -> Result<DynamicImage> {
        let page_index = u16::try_from(index).map_err(|_| PdfError::InvalidPage(index))?;
        let page = self
            .document
            .pages()
            .get(page_index)
            .map_err(|_| PdfError::InvalidPage(index))?;

        let (width, height) =
            render_target(page.width().value, page.height().value, dpi, index + 1)?;
        trace!("Rendering page {} at {} DPI -> {}x{}", index + 1, dpi, width, height);

        let bitmap = page
            .render_with_config(
                &PdfRenderConfig::new()
                    .set_target_width(width)
                    .set_target_height(height)
                    .render_form_data(true)
                    .render_annotations(true),
            )
            .map_err(|e| PdfError::Render {
                page: index + 1,
                reason: e.to_string(),
            })?;

        Ok(DynamicImage::ImageRgb8(bitmap.as_image().to_rgb8()))
    }
}
