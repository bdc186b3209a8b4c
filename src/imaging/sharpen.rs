//! Four-neighbor local-contrast sharpening.
//!
//! For every interior pixel and each color channel:
//!
//! ```text
//! blur = (up + down + left + right) / 4
//! out  = clamp(orig + (orig - blur) * amount, 0, 255)
//! ```
//!
//! All reads come from the input image, all writes go to a separate output
//! buffer, so a pixel never sees a neighbor that was already sharpened in this
//! pass. Alpha and the outer one-pixel ring are copied through unchanged.

use super::params::Sharpening;
use image::RgbaImage;

const CHANNELS: usize = 4;

/// Sharpen `source` into a new image of the same dimensions.
pub fn sharpen(source: &RgbaImage, sharpening: Sharpening) -> RgbaImage {
    let (width, height) = source.dimensions();
    let mut output = source.clone();

    if width >= 3 && height >= 3 {
        sharpen_interior(
            source.as_raw(),
            &mut output,
            width as usize,
            height as usize,
            sharpening.amount,
        );
    }

    output
}

fn sharpen_interior(src: &[u8], dst: &mut [u8], width: usize, height: usize, amount: f32) {
    let stride = width * CHANNELS;
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let idx = y * stride + x * CHANNELS;
            for c in 0..3 {
                let center = src[idx + c] as f32;
                let blur = (src[idx - stride + c] as f32
                    + src[idx + stride + c] as f32
                    + src[idx - CHANNELS + c] as f32
                    + src[idx + CHANNELS + c] as f32)
                    / 4.0;
                let value = center + (center - blur) * amount;
                dst[idx + c] = value.clamp(0.0, 255.0).round_ties_even() as u8;
            }
        }
    }
}
