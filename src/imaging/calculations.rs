//! Pure calculation functions for icon geometry.
//!
//! All functions here are pure and testable without any I/O or images.

/// Region of the source image that becomes the square icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SquareCrop {
    pub x: u32,
    pub y: u32,
    pub side: u32,
}

/// Calculate the centered square crop for a source of the given dimensions.
///
/// The side is the shorter edge; the origin offsets are truncated toward zero,
/// so odd leftovers favour the top/left.
///
/// # Examples
/// ```
/// # use iconforge::imaging::calculate_square_crop;
/// let crop = calculate_square_crop(100, 50);
/// assert_eq!((crop.x, crop.y, crop.side), (25, 0, 50));
/// ```
pub fn calculate_square_crop(width: u32, height: u32) -> SquareCrop {
    let side = width.min(height);
    SquareCrop {
        x: (width - side) / 2,
        y: (height - side) / 2,
        side,
    }
}

/// Corner radius in pixels for an icon of `size` pixels.
pub fn calculate_corner_radius(size: u32, radius_ratio: f64) -> f64 {
    size as f64 * radius_ratio
}

/// Distance of each bezier control point from its corner's tangent point.
///
/// The `0.4` factor places the controls partway along the radius; the
/// curvature multiplier then stretches them so the corner reads as a
/// continuous curve rather than a quarter circle.
pub fn calculate_control_offset(radius: f64, curvature: f64) -> f64 {
    radius * curvature * 0.4
}

/// Number of line segments used to flatten one corner curve.
///
/// Grows with the square root of the radius: 8 segments for tiny icons,
/// about 43 for a 1024px icon. Plenty for sub-pixel accuracy.
pub fn calculate_flatten_steps(radius: f64) -> usize {
    ((radius.max(0.0).sqrt() * 2.8).ceil() as usize).clamp(8, 128)
}
