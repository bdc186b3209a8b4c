//! Corner masking: rasterize a [`CornerMask`] and apply it with
//! destination-in compositing.
//!
//! The outline is flattened to a polygon and scan-converted with the even-odd
//! rule. Each pixel is sampled on a `samples × samples` grid; its template
//! alpha is the fraction of samples inside the polygon. With one sample the
//! template is a hard mask sampled at pixel centers.

use super::geometry::{CornerMask, Point};
use image::RgbaImage;

/// Per-pixel coverage of a rendered [`CornerMask`], row-major, `size × size` bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct AlphaTemplate {
    size: u32,
    alpha: Vec<u8>,
}

impl AlphaTemplate {
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Coverage at `(x, y)`: 0 = outside, 255 = fully inside.
    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.alpha[y as usize * self.size as usize + x as usize]
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.alpha
    }
}

/// Render the mask outline into an alpha template.
///
/// `samples` is clamped to `1..=16`.
pub fn render_template(mask: &CornerMask, samples: u32) -> AlphaTemplate {
    let size = mask.size();
    let samples = samples.clamp(1, 16);
    let n = size as usize;
    let polygon = mask.flatten();
    let total = samples * samples;

    let mut counts = vec![0u32; n * n];
    let mut crossings: Vec<f64> = Vec::new();

    for row in 0..n {
        for sy in 0..samples {
            let y = row as f64 + (sy as f64 + 0.5) / samples as f64;
            scanline_crossings(&polygon, y, &mut crossings);

            for span in crossings.chunks_exact(2) {
                add_span(&mut counts[row * n..(row + 1) * n], span[0], span[1], samples);
            }
        }
    }

    let alpha = counts
        .into_iter()
        .map(|c| ((c * 255 + total / 2) / total) as u8)
        .collect();

    AlphaTemplate { size, alpha }
}

/// Sorted x positions where the horizontal line at `y` crosses the polygon.
///
/// Uses the half-open rule (`y0 <= y < y1`) so vertices shared by two edges
/// are counted once.
fn scanline_crossings(polygon: &[Point], y: f64, out: &mut Vec<f64>) {
    out.clear();
    for edge in polygon.windows(2) {
        let (a, b) = (edge[0], edge[1]);
        let (lo, hi) = if a.y <= b.y { (a, b) } else { (b, a) };
        if lo.y == hi.y || y < lo.y || y >= hi.y {
            continue;
        }
        let t = (y - lo.y) / (hi.y - lo.y);
        out.push(lo.x + t * (hi.x - lo.x));
    }
    out.sort_by(f64::total_cmp);
}

/// Count the sub-sample columns of one sample row that fall inside `[x0, x1)`.
fn add_span(row: &mut [u32], x0: f64, x1: f64, samples: u32) {
    let width = row.len();
    let s = samples as f64;
    // Sub-sample column j sits at (j + 0.5) / s in pixel units.
    let first = ((x0 * s) - 0.5).ceil().max(0.0) as usize;
    let end = (((x1 * s) - 0.5).ceil().max(0.0) as usize).min(width * samples as usize);
    for j in first..end {
        row[j / samples as usize] += 1;
    }
}

/// Apply `template` to `image` with destination-in semantics.
///
/// `alpha = src.alpha * mask.alpha / 255`; color channels are left as they are,
/// so a flat source stays flat for the later sharpening pass.
pub fn apply_template(image: &mut RgbaImage, template: &AlphaTemplate) {
    debug_assert_eq!(image.dimensions(), (template.size, template.size));
    for (pixel, &coverage) in image.pixels_mut().zip(template.alpha.iter()) {
        let a = pixel[3] as u32 * coverage as u32;
        pixel[3] = ((a + 127) / 255) as u8;
    }
}

/// Render the mask for the image's own size and apply it in place.
pub fn apply_corner_mask(image: &mut RgbaImage, mask: &CornerMask, samples: u32) {
    let template = render_template(mask, samples);
    apply_template(image, &template);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::params::{IconSize, MaskGeometry};
    use image::Rgba;

    fn template(n: u32, samples: u32) -> AlphaTemplate {
        render_template(&CornerMask::ios(IconSize::new(n).unwrap()), samples)
    }

    #[test]
    fn corners_are_transparent() {
        for n in [16, 64, 180, 512, 1024] {
            for samples in [1, 4] {
                let t = template(n, samples);
                let last = n - 1;
                for (x, y) in [(0, 0), (last, 0), (0, last), (last, last)] {
                    assert_eq!(t.get(x, y), 0, "n={n} samples={samples} at ({x},{y})");
                }
            }
        }
    }

    #[test]
    fn center_is_opaque() {
        for n in [4, 5, 16, 180, 512] {
            let t = template(n, 4);
            assert_eq!(t.get(n / 2, n / 2), 255, "n={n}");
        }
    }

    #[test]
    fn edge_midpoints_are_opaque() {
        // The straight edges run flush with the canvas border.
        let n = 180;
        let t = template(n, 4);
        assert_eq!(t.get(n / 2, 0), 255);
        assert_eq!(t.get(0, n / 2), 255);
        assert_eq!(t.get(n - 1, n / 2), 255);
        assert_eq!(t.get(n / 2, n - 1), 255);
    }

    #[test]
    fn single_sample_template_is_binary() {
        let t = template(64, 1);
        assert!(t.as_raw().iter().all(|&a| a == 0 || a == 255));
    }

    #[test]
    fn sample_count_is_clamped() {
        assert_eq!(template(64, 0), template(64, 1));
        assert_eq!(template(64, 17), template(64, 16));
        assert_eq!(template(64, u32::MAX), template(64, 16));
    }

    #[test]
    fn get_reads_row_major() {
        let n = 180;
        let t = template(n, 4);
        let raw = t.as_raw();
        assert_eq!(raw.len(), (n * n) as usize);
        for (x, y) in [(0, 0), (5, 1), (1, 5), (n - 1, n / 2), (n - 1, n - 1)] {
            assert_eq!(t.get(x, y), raw[(y * n + x) as usize], "({x},{y})");
        }
    }

    #[test]
    fn antialiased_template_has_partial_edge() {
        let t = template(180, 4);
        assert!(t.as_raw().iter().any(|&a| a > 0 && a < 255));
    }

    #[test]
    fn template_is_mirror_symmetric() {
        let n = 97;
        let t = template(n, 4);
        for y in 0..n {
            for x in 0..n {
                assert_eq!(t.get(x, y), t.get(n - 1 - x, y), "({x},{y})");
                assert_eq!(t.get(x, y), t.get(x, n - 1 - y), "({x},{y})");
            }
        }
    }

    #[test]
    fn corner_region_matches_radius() {
        // At 512px the radius is ~114.5. Points on the diagonal well before
        // the curve are transparent; points past it are opaque.
        let t = template(512, 4);
        assert_eq!(t.get(10, 10), 0);
        assert_eq!(t.get(30, 30), 0);
        assert_eq!(t.get(45, 45), 255);
        assert_eq!(t.get(114, 114), 255);
        // Along the top edge, the straight part starts at x = r.
        assert_eq!(t.get(120, 0), 255);
        assert_eq!(t.get(20, 0), 0);
    }

    #[test]
    fn larger_radius_ratio_clears_more() {
        let size = IconSize::new(128).unwrap();
        let round = MaskGeometry {
            radius_ratio: 0.5,
            curvature: 1.28,
        };
        let ios = render_template(&CornerMask::ios(size), 4);
        let circle = render_template(&CornerMask::new(size, round), 4);
        let sum = |t: &AlphaTemplate| t.as_raw().iter().map(|&a| a as u64).sum::<u64>();
        assert!(sum(&circle) < sum(&ios));
    }

    #[test]
    fn apply_template_multiplies_alpha_and_keeps_color() {
        let n = 32;
        let mut img = RgbaImage::from_pixel(n, n, Rgba([10, 20, 30, 128]));
        let t = template(n, 4);
        apply_template(&mut img, &t);

        assert_eq!(*img.get_pixel(0, 0), Rgba([10, 20, 30, 0]));
        assert_eq!(*img.get_pixel(n / 2, n / 2), Rgba([10, 20, 30, 128]));
        for (x, y, p) in img.enumerate_pixels() {
            let expected = (128 * t.get(x, y) as u32 + 127) / 255;
            assert_eq!(p[3] as u32, expected);
            assert_eq!(&p.0[..3], &[10, 20, 30]);
        }
    }

    #[test]
    fn apply_corner_mask_on_opaque_image() {
        let n = 64;
        let mut img = RgbaImage::from_pixel(n, n, Rgba([255, 0, 0, 255]));
        apply_corner_mask(&mut img, &CornerMask::ios(IconSize::new(n).unwrap()), 4);
        assert_eq!(img.get_pixel(0, 0)[3], 0);
        assert_eq!(img.get_pixel(n - 1, n - 1)[3], 0);
        assert_eq!(img.get_pixel(n / 2, n / 2)[3], 255);
    }

    #[test]
    fn crossings_of_a_square() {
        let square = [
            Point::new(1.0, 1.0),
            Point::new(3.0, 1.0),
            Point::new(3.0, 3.0),
            Point::new(1.0, 3.0),
            Point::new(1.0, 1.0),
        ];
        let mut out = Vec::new();
        scanline_crossings(&square, 2.0, &mut out);
        assert_eq!(out, vec![1.0, 3.0]);
        scanline_crossings(&square, 3.5, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn span_counts_sample_centers() {
        let mut row = vec![0u32; 4];
        // Samples at 0.5, 1.5, 2.5, 3.5; span [1.0, 3.0) covers 1.5 and 2.5.
        add_span(&mut row, 1.0, 3.0, 1);
        assert_eq!(row, vec![0, 1, 1, 0]);
    }
}
