//! Grayscale pixel operations used when preparing face crops.
//!
//! Contrast and sharpness follow the usual "enhance" definition: the output is
//! a linear blend between a degenerate image and the original, where factor
//! 1.0 returns the original unchanged.

use image::{GrayImage, Luma};

/// Spread intensities over the full 0..=255 range using the cumulative
/// histogram. A single-valued image is returned unchanged.
pub fn equalize_histogram(gray: &GrayImage) -> GrayImage {
    let mut histogram = [0u64; 256];
    for pixel in gray.pixels() {
        histogram[pixel.0[0] as usize] += 1;
    }

    let total: u64 = histogram.iter().sum();
    let Some(first) = histogram.iter().position(|&count| count > 0) else {
        return gray.clone();
    };
    let cdf_min = histogram[first];
    if cdf_min == total {
        return gray.clone();
    }

    let scale = 255.0 / (total - cdf_min) as f64;
    let mut lut = [0u8; 256];
    let mut cumulative = 0u64;
    for (value, count) in histogram.iter().enumerate() {
        cumulative += count;
        lut[value] = (cumulative.saturating_sub(cdf_min) as f64 * scale)
            .round()
            .clamp(0.0, 255.0) as u8;
    }

    let mut out = gray.clone();
    for pixel in out.pixels_mut() {
        pixel.0[0] = lut[pixel.0[0] as usize];
    }
    out
}

/// Blend against a flat image of the mean luminance.
pub fn adjust_contrast(gray: &GrayImage, factor: f32) -> GrayImage {
    let count = (gray.width() as u64 * gray.height() as u64).max(1);
    let sum: u64 = gray.pixels().map(|p| p.0[0] as u64).sum();
    let mean = (sum as f64 / count as f64 + 0.5).floor() as f32;

    let mut out = gray.clone();
    for pixel in out.pixels_mut() {
        pixel.0[0] = blend(mean, pixel.0[0] as f32, factor);
    }
    out
}

/// Blend against a 3x3 smoothed copy. Border pixels have no full
/// neighbourhood and are left as they are.
pub fn adjust_sharpness(gray: &GrayImage, factor: f32) -> GrayImage {
    let (width, height) = gray.dimensions();
    let mut out = gray.clone();
    if width < 3 || height < 3 {
        return out;
    }

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let smoothed = smooth_at(gray, x, y);
            let original = gray.get_pixel(x, y).0[0] as f32;
            out.put_pixel(x, y, Luma([blend(smoothed, original, factor)]));
        }
    }
    out
}

/// Weighted 3x3 average: centre weight 5, neighbours 1, divided by 13.
fn smooth_at(gray: &GrayImage, x: u32, y: u32) -> f32 {
    let mut acc = 0u32;
    for dy in 0..3 {
        for dx in 0..3 {
            let v = gray.get_pixel(x + dx - 1, y + dy - 1).0[0] as u32;
            acc += if dx == 1 && dy == 1 { v * 5 } else { v };
        }
    }
    (acc as f32 / 13.0).round()
}

fn blend(degenerate: f32, original: f32, factor: f32) -> u8 {
    (degenerate + factor * (original - degenerate))
        .round()
        .clamp(0.0, 255.0) as u8
}
