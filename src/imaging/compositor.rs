//! Center-crop a source raster to a square and scale it to the icon size.

use super::calculations::calculate_square_crop;
use super::params::{IconSize, Resample};
use image::{DynamicImage, RgbaImage, imageops};

/// Crop the centered square of `source` and resample it to `size × size`.
///
/// When the crop already has the target edge length it is returned without
/// resampling, so pixels come through untouched.
pub fn square_crop(source: &DynamicImage, size: IconSize, resample: Resample) -> RgbaImage {
    let crop = calculate_square_crop(source.width(), source.height());
    let square = source.crop_imm(crop.x, crop.y, crop.side, crop.side).to_rgba8();

    let n = size.pixels();
    if crop.side == n {
        return square;
    }
    imageops::resize(&square, n, n, resample.filter_type())
}
