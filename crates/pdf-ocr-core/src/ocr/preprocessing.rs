//! Image preprocessing for OCR: binarization and table/form line removal.

use image::{DynamicImage, GrayImage, Luma};
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};
use tracing::debug;

use crate::models::config::PreprocessConfig;

const FOREGROUND: u8 = 255;
const BACKGROUND: u8 = 0;

/// Removes long horizontal and vertical rules before OCR.
///
/// The page is binarized with Otsu's method (inverted, so ink is white),
/// runs at least `horizontal_kernel` / `vertical_kernel` pixels long are
/// detected with a morphological opening, their outer contours are painted
/// back to background, and the result is inverted to black-on-white.
#[derive(Debug, Clone)]
pub struct LineRemover {
    horizontal_kernel: u32,
    vertical_kernel: u32,
}

impl LineRemover {
    /// Create a line remover with 50-pixel kernels.
    pub fn new() -> Self {
        Self {
            horizontal_kernel: 50,
            vertical_kernel: 50,
        }
    }

    /// Set the minimum horizontal and vertical run lengths.
    pub fn with_kernels(mut self, horizontal: u32, vertical: u32) -> Self {
        self.horizontal_kernel = horizontal.max(1);
        self.vertical_kernel = vertical.max(1);
        self
    }

    /// Build from the preprocessing section of the configuration.
    pub fn from_config(config: &PreprocessConfig) -> Self {
        Self::new().with_kernels(config.horizontal_kernel, config.vertical_kernel)
    }

    /// Run the full preprocessing chain on a rendered page.
    pub fn process(&self, image: &DynamicImage) -> GrayImage {
        let gray = to_gray(image);
        let mut binary = binarize_inverted(&gray);

        let horizontal = open_horizontal(&binary, self.horizontal_kernel);
        let erased_h = erase_external_contours(&mut binary, &horizontal);

        let vertical = open_vertical(&binary, self.vertical_kernel);
        let erased_v = erase_external_contours(&mut binary, &vertical);

        debug!(
            "Line removal: {} horizontal, {} vertical contours erased",
            erased_h, erased_v
        );

        image::imageops::invert(&mut binary);
        binary
    }
}

impl Default for LineRemover {
    fn default() -> Self {
        Self::new()
    }
}

/// Grayscale with BT.601 weights (0.299, 0.587, 0.114).
///
/// Uses 14-bit fixed point with rounding, matching OpenCV's `BGR2GRAY`.
pub fn to_gray(image: &DynamicImage) -> GrayImage {
    let rgb = image.to_rgb8();
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        let weighted = u32::from(r) * 4899 + u32::from(g) * 9617 + u32::from(b) * 1868;
        let luma = (weighted + (1 << 13)) >> 14;
        Luma([luma as u8])
    })
}

/// Otsu threshold with inversion: dark ink becomes 255, paper becomes 0.
pub fn binarize_inverted(gray: &GrayImage) -> GrayImage {
    let level = otsu_level(gray);
    debug!("Otsu level: {}", level);
    threshold(gray, level, ThresholdType::BinaryInverted)
}

/// Opening with a `length` x 1 rectangle.
///
/// On a binary image this keeps exactly the pixels lying in a horizontal
/// foreground run of at least `length` pixels.
pub fn open_horizontal(binary: &GrayImage, length: u32) -> GrayImage {
    let (width, height) = binary.dimensions();
    keep_long_runs(binary, length, height, width, |line, pos| (pos, line))
}

/// Opening with a 1 x `length` rectangle (vertical runs).
pub fn open_vertical(binary: &GrayImage, length: u32) -> GrayImage {
    let (width, height) = binary.dimensions();
    keep_long_runs(binary, length, width, height, |line, pos| (line, pos))
}

fn keep_long_runs(
    binary: &GrayImage,
    length: u32,
    lines: u32,
    line_len: u32,
    to_xy: impl Fn(u32, u32) -> (u32, u32),
) -> GrayImage {
    let (width, height) = binary.dimensions();
    let mut result = GrayImage::new(width, height);
    let length = length.max(1);

    for line in 0..lines {
        let mut run_start = None;

        // One step past the end closes a run touching the border
        for pos in 0..=line_len {
            let on = pos < line_len && {
                let (x, y) = to_xy(line, pos);
                binary.get_pixel(x, y)[0] != BACKGROUND
            };

            match (on, run_start) {
                (true, None) => run_start = Some(pos),
                (false, Some(start)) => {
                    if pos - start >= length {
                        for p in start..pos {
                            let (x, y) = to_xy(line, p);
                            result.put_pixel(x, y, Luma([FOREGROUND]));
                        }
                    }
                    run_start = None;
                }
                _ => {}
            }
        }
    }

    result
}

/// Paint the outermost contours found in `detected` onto `binary` as
/// background, one pixel thick. Returns the number of contours erased.
pub fn erase_external_contours(binary: &mut GrayImage, detected: &GrayImage) -> usize {
    let contours: Vec<Contour<u32>> = find_contours(detected);
    let mut erased = 0;

    for contour in contours
        .iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
    {
        for point in &contour.points {
            if point.x < binary.width() && point.y < binary.height() {
                binary.put_pixel(point.x, point.y, Luma([BACKGROUND]));
            }
        }
        erased += 1;
    }

    erased
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn white_page(width: u32, height: u32) -> RgbImage {
        RgbImage::from_pixel(width, height, image::Rgb([255, 255, 255]))
    }

    fn fill(img: &mut RgbImage, x0: u32, y0: u32, w: u32, h: u32) {
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                img.put_pixel(x, y, image::Rgb([0, 0, 0]));
            }
        }
    }

    fn row(values: &[u8]) -> GrayImage {
        GrayImage::from_raw(values.len() as u32, 1, values.to_vec()).unwrap()
    }

    #[test]
    fn test_gray_uses_bt601_weights() {
        let mut page = RgbImage::new(5, 1);
        page.put_pixel(0, 0, image::Rgb([0, 255, 0]));
        page.put_pixel(1, 0, image::Rgb([255, 0, 0]));
        page.put_pixel(2, 0, image::Rgb([0, 0, 255]));
        page.put_pixel(3, 0, image::Rgb([255, 255, 255]));
        page.put_pixel(4, 0, image::Rgb([0, 0, 0]));

        let gray = to_gray(&DynamicImage::ImageRgb8(page));
        let values: Vec<u8> = gray.pixels().map(|p| p[0]).collect();
        assert_eq!(values, vec![150, 76, 29, 255, 0]);
    }

    #[test]
    fn test_gray_keeps_luma_input() {
        let gray = GrayImage::from_pixel(3, 2, Luma([123]));
        let converted = to_gray(&DynamicImage::ImageLuma8(gray.clone()));
        assert_eq!(converted, gray);
    }

    #[test]
    fn test_binarize_inverts_ink() {
        let mut page = white_page(20, 20);
        fill(&mut page, 5, 5, 4, 4);
        let binary = binarize_inverted(&to_gray(&DynamicImage::ImageRgb8(page)));

        assert_eq!(binary.get_pixel(6, 6)[0], 255);
        assert_eq!(binary.get_pixel(0, 0)[0], 0);
    }

    #[test]
    fn test_open_horizontal_keeps_only_long_runs() {
        let mut values = vec![0u8; 120];
        // 49-pixel run
        for v in &mut values[0..49] {
            *v = 255;
        }
        // 50-pixel run touching the right border
        for v in &mut values[70..120] {
            *v = 255;
        }

        let opened = open_horizontal(&row(&values), 50);
        assert!((0..49).all(|x| opened.get_pixel(x, 0)[0] == 0));
        assert!((70..120).all(|x| opened.get_pixel(x, 0)[0] == 255));
    }

    #[test]
    fn test_open_vertical_ignores_horizontal_runs() {
        let mut binary = GrayImage::new(80, 80);
        for x in 0..80 {
            binary.put_pixel(x, 10, Luma([255]));
        }
        for y in 0..60 {
            binary.put_pixel(40, y, Luma([255]));
        }

        let opened = open_vertical(&binary, 50);
        assert_eq!(opened.get_pixel(5, 10)[0], 0);
        assert_eq!(opened.get_pixel(40, 30)[0], 255);
        assert_eq!(opened.get_pixel(40, 70)[0], 0);
    }

    #[test]
    fn test_removes_table_rules_and_keeps_glyphs() {
        let mut page = white_page(200, 120);
        // Glyph-sized block
        fill(&mut page, 20, 20, 12, 16);
        // 1px horizontal rule
        fill(&mut page, 10, 60, 180, 1);
        // 2px vertical rule
        fill(&mut page, 150, 5, 2, 110);

        let cleaned = LineRemover::new().process(&DynamicImage::ImageRgb8(page));

        assert_eq!(cleaned.dimensions(), (200, 120));
        // Glyph survives as black ink
        assert_eq!(cleaned.get_pixel(25, 28)[0], 0);
        // Rules are gone
        assert_eq!(cleaned.get_pixel(50, 60)[0], 255);
        assert_eq!(cleaned.get_pixel(150, 100)[0], 255);
        assert_eq!(cleaned.get_pixel(151, 30)[0], 255);
        // Background stays white
        assert_eq!(cleaned.get_pixel(100, 100)[0], 255);
    }

    #[test]
    fn test_output_is_binary() {
        let mut page = white_page(64, 64);
        fill(&mut page, 8, 8, 10, 10);
        let cleaned = LineRemover::new().process(&DynamicImage::ImageRgb8(page));
        assert!(cleaned.pixels().all(|p| p[0] == 0 || p[0] == 255));
    }

    #[test]
    fn test_with_kernels_clamps_zero() {
        let remover = LineRemover::new().with_kernels(0, 0);
        assert_eq!(remover.horizontal_kernel, 1);
        assert_eq!(remover.vertical_kernel, 1);
    }

    #[test]
    fn test_from_config() {
        let config = PreprocessConfig {
            enabled: true,
            horizontal_kernel: 80,
            vertical_kernel: 30,
        };
        let remover = LineRemover::from_config(&config);
        assert_eq!(remover.horizontal_kernel, 80);
        assert_eq!(remover.vertical_kernel, 30);
    }
}
