//! PDF page rendering.

mod renderer;

pub use renderer::{PdfiumDocument, PdfiumRenderer};

use crate::error::PdfError;
use image::DynamicImage;

/// PDF points per inch; rendering zoom is `dpi / POINTS_PER_INCH`.
pub const POINTS_PER_INCH: f64 = 72.0;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// A document whose pages can be rasterized.
pub trait PageSource {
    /// Get the number of pages in the document.
    fn page_count(&self) -> usize;

    /// Render a page (0-indexed) as an RGB image at the specified DPI.
    fn render_page(&self, index: usize, dpi: u32) -> Result<DynamicImage>;
}

/// Pixel size of a page of `width_pt` x `height_pt` points rendered at `dpi`.
///
/// Partial pixels round up; an overshoot below 0.001 px is ignored.
pub fn scaled_size(width_pt: f32, height_pt: f32, dpi: u32) -> (u32, u32) {
    let to_pixels = |pt: f32| {
        let exact = f64::from(pt) * f64::from(dpi) / POINTS_PER_INCH;
        (exact - 0.001).ceil().max(1.0) as u32
    };
    (to_pixels(width_pt), to_pixels(height_pt))
}

/// Bitmap size for PDFium, rejecting sizes outside its `i32` range.
pub fn render_target(width_pt: f32, height_pt: f32, dpi: u32, page: usize) -> Result<(i32, i32)> {
    let (width, height) = scaled_size(width_pt, height_pt, dpi);
    match (i32::try_from(width), i32::try_from(height)) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(PdfError::Render {
            page,
            reason: format!("{}x{} pixels at {} DPI is too large", width, height, dpi),
        }),
    }
}
