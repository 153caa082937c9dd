//! Bar-height extraction
//!
//! The bars of a Spotify Code are light on a dark background. Each pixel
//! column of the cropped bar region is scanned top to bottom and its longest
//! run of lit pixels is measured. Neighbouring lit columns belong to the same
//! bar, so the tallest run across them is taken as the bar's height, emitted
//! when the first dark column after the bar is reached.
//!
//! Heights are returned in code units: a run of `scale_divisor` pixels at the
//! reference width is one unit. Real codes use units 1 through 8.

use std::ops::Range;

use image::RgbImage;

use crate::config::{CropRect, ScanSettings};
use crate::error::{KeychainError, Result};

/// Whether any channel of a pixel exceeds the threshold
#[inline]
fn is_lit(pixel: &image::Rgb<u8>, threshold: u8) -> bool {
    pixel.0.iter().any(|&channel| channel > threshold)
}

/// Longest contiguous run of lit pixels in column `x` within `rows`
pub fn lit_run_length(image: &RgbImage, x: u32, rows: Range<u32>, threshold: u8) -> u32 {
    let mut longest = 0;
    let mut current = 0;
    for y in rows {
        if is_lit(image.get_pixel(x, y), threshold) {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

/// Crop rectangle for an image of the given width, checked against its bounds
fn scaled_crop(settings: &ScanSettings, width: u32, height: u32) -> Result<(CropRect, f64)> {
    if settings.reference_width == 0 || settings.scale_divisor <= 0.0 {
        return Err(KeychainError::Config(format!(
            "scan settings need a positive reference width and divisor (got {} and {})",
            settings.reference_width, settings.scale_divisor
        )));
    }

    let scale = f64::from(width) / f64::from(settings.reference_width);
    let crop = settings.crop.scaled(scale);

    let fits = crop.width > 0
        && crop.height > 0
        && crop.x.checked_add(crop.width).is_some_and(|right| right <= width)
        && crop.y.checked_add(crop.height).is_some_and(|bottom| bottom <= height);

    if !fits {
        return Err(KeychainError::CropOutOfBounds {
            x: crop.x,
            y: crop.y,
            width: crop.width,
            height: crop.height,
        });
    }

    Ok((crop, scale))
}

/// Extract one height per bar, left to right
pub fn extract_bar_heights(image: &RgbImage, settings: &ScanSettings) -> Result<Vec<f64>> {
    let (width, height) = image.dimensions();
    let (crop, scale) = scaled_crop(settings, width, height)?;
    let divisor = settings.scale_divisor * scale;
    let rows = crop.y..crop.y + crop.height;

    let mut heights = Vec::new();
    let mut tallest: Option<u32> = None;

    for x in crop.x..crop.x + crop.width {
        let run = lit_run_length(image, x, rows.clone(), settings.threshold);
        if run > 0 {
            tallest = Some(tallest.map_or(run, |t| t.max(run)));
        } else if let Some(t) = tallest.take() {
            heights.push(f64::from(t) / divisor);
        }
    }

    // A bar still lit at the right crop edge never reaches a dark column
    // and is not emitted.

    if heights.is_empty() {
        return Err(KeychainError::NoBarsFound);
    }

    tracing::debug!("Extracted {} bars: {:?}", heights.len(), heights);
    Ok(heights)
}
