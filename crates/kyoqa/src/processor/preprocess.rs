//! Page image cleanup ahead of OCR: grayscale, binarize, denoise.

use std::io::Cursor;

use image::{GrayImage, ImageFormat, Luma};
use imageproc::contrast::otsu_level;
use imageproc::filter::median_filter;

use crate::config::{OcrConfig, ThresholdMode};
use crate::error::ProcessError;

/// Constant subtracted from the local mean in adaptive mode.
const ADAPTIVE_OFFSET: i16 = 2;

/// Gaussian sigma matching an 11 pixel neighbourhood.
const ADAPTIVE_SIGMA: f32 = 2.0;

pub fn preprocess_page(png: &[u8], config: &OcrConfig) -> Result<Vec<u8>, ProcessError> {
    let image = image::load_from_memory(png)
        .map_err(|e| ProcessError::ImageProcessing(format!("Failed to load image: {}", e)))?;

    let gray = image.to_luma8();
    let binary = match config.threshold {
        ThresholdMode::Otsu => binarize_otsu(&gray),
        ThresholdMode::Adaptive => binarize_adaptive(&gray),
    };

    let radius = config.median_kernel / 2;
    let denoised = if radius > 0 {
        median_filter(&binary, radius, radius)
    } else {
        binary
    };

    let mut out = Vec::new();
    denoised
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .map_err(|e| ProcessError::ImageProcessing(format!("Failed to encode image: {}", e)))?;
    Ok(out)
}

fn binarize_otsu(gray: &GrayImage) -> GrayImage {
    let level = otsu_level(gray);
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        if gray.get_pixel(x, y)[0] > level {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// A pixel is white when brighter than its Gaussian-weighted neighbourhood
/// minus [`ADAPTIVE_OFFSET`].
fn binarize_adaptive(gray: &GrayImage) -> GrayImage {
    let local = image::imageops::blur(gray, ADAPTIVE_SIGMA);
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let value = gray.get_pixel(x, y)[0] as i16;
        let mean = local.get_pixel(x, y)[0] as i16;
        if value > mean - ADAPTIVE_OFFSET {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}
