//! Parameter types for icon operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! and the [`backend`](super::backend) that does the pixel work. Keeping them
//! separate lets tests swap in a recording mock without touching pipeline
//! logic.
//!
//! ## Types
//!
//! - [`IconSize`]: Output edge length in pixels. Zero is rejected on construction.
//! - [`Sharpening`]: Local-contrast strength in `(0, 1]`, default 0.3.
//! - [`MaskGeometry`]: Corner radius ratio and curvature multiplier.
//! - [`Resample`]: Filter used when scaling the square crop.
//! - [`IconParams`]: Everything a single post-process invocation needs.

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamError {
    #[error("icon size must be a positive number of pixels, got {0}")]
    DegenerateSize(u32),
    #[error("sharpening amount must be within (0, 1], got {0}")]
    SharpeningOutOfRange(f32),
}

/// Edge length of a square icon, in pixels.
///
/// Guaranteed non-zero, so the mask radius derived from it is always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct IconSize(u32);

impl IconSize {
    /// Home-screen icon on a 3x display.
    pub const SMALL: IconSize = IconSize(180);
    pub const MEDIUM: IconSize = IconSize(512);
    /// App Store marketing size.
    pub const LARGE: IconSize = IconSize(1024);

    pub const PRESETS: [IconSize; 3] = [Self::SMALL, Self::MEDIUM, Self::LARGE];

    pub fn new(pixels: u32) -> Result<Self, ParamError> {
        if pixels == 0 {
            return Err(ParamError::DegenerateSize(pixels));
        }
        Ok(Self(pixels))
    }

    pub fn pixels(self) -> u32 {
        self.0
    }
}

impl Default for IconSize {
    fn default() -> Self {
        Self::MEDIUM
    }
}

impl TryFrom<u32> for IconSize {
    type Error = ParamError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<IconSize> for u32 {
    fn from(size: IconSize) -> Self {
        size.0
    }
}

impl std::fmt::Display for IconSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}px", self.0)
    }
}

/// Strength of the 4-neighbor sharpening pass.
///
/// `amount` scales the difference between a pixel and the mean of its axis
/// neighbors: `out = orig + (orig - blur) * amount`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sharpening {
    pub amount: f32,
}

impl Sharpening {
    pub fn new(amount: f32) -> Result<Self, ParamError> {
        if !(amount > 0.0 && amount <= 1.0) {
            return Err(ParamError::SharpeningOutOfRange(amount));
        }
        Ok(Self { amount })
    }

    /// The strength applied to generated icons unless configured otherwise.
    pub fn icon() -> Self {
        Self { amount: 0.3 }
    }
}

/// Shape parameters for the continuous-corner mask.
///
/// The defaults approximate the platform icon outline: a corner radius of
/// 22.37% of the edge, with bezier control offsets stretched by 1.28 so the
/// corner eases into the straight edge instead of meeting it as a circular arc.
/// The multiplier is an empirical tuning value, not a closed-form superellipse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskGeometry {
    pub radius_ratio: f64,
    pub curvature: f64,
}

impl MaskGeometry {
    pub const IOS_RADIUS_RATIO: f64 = 0.2237;
    pub const IOS_CURVATURE: f64 = 1.28;

    pub fn ios() -> Self {
        Self {
            radius_ratio: Self::IOS_RADIUS_RATIO,
            curvature: Self::IOS_CURVATURE,
        }
    }
}

impl Default for MaskGeometry {
    fn default() -> Self {
        Self::ios()
    }
}

/// Resampling filter for the crop-and-scale step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resample {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    #[default]
    Lanczos3,
}

impl Resample {
    pub fn filter_type(self) -> FilterType {
        match self {
            Resample::Nearest => FilterType::Nearest,
            Resample::Triangle => FilterType::Triangle,
            Resample::CatmullRom => FilterType::CatmullRom,
            Resample::Gaussian => FilterType::Gaussian,
            Resample::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Full specification for one post-process invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct IconParams {
    pub size: IconSize,
    /// `None` skips the sharpening pass entirely.
    pub sharpening: Option<Sharpening>,
    pub geometry: MaskGeometry,
    /// Sub-samples per axis when rendering the corner mask (1 = hard edge).
    pub mask_samples: u32,
    pub resample: Resample,
}

impl IconParams {
    pub fn new(size: IconSize) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }
}

impl Default for IconParams {
    fn default() -> Self {
        Self {
            size: IconSize::default(),
            sharpening: Some(Sharpening::icon()),
            geometry: MaskGeometry::ios(),
            mask_samples: 4,
            resample: Resample::default(),
        }
    }
}
