//! Continuous-corner outline for a square icon.
//!
//! The outline is four straight edges joined by four cubic bezier corners.
//! Each corner runs from the point where its two edges stop being straight
//! (`radius` away from the canvas corner) with control points pulled toward the
//! corner by [`calculate_control_offset`]. See [`MaskGeometry`] for why the
//! offsets are stretched.
//!
//! ```text
//!   (r,0) ───────────── (N-r,0)
//!    ╱                       ╲
//! (0,r)                     (N,r)
//!   │                         │
//! (0,N-r)                   (N,N-r)
//!    ╲                       ╱
//!   (r,N) ───────────── (N-r,N)
//! ```

use super::calculations::{
    calculate_control_offset, calculate_corner_radius, calculate_flatten_steps,
};
use super::params::{IconSize, MaskGeometry};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One drawing command of the closed outline, continuing from the previous end point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    Line(Point),
    Cubic { ctrl1: Point, ctrl2: Point, to: Point },
}

impl PathSegment {
    pub fn end(&self) -> Point {
        match self {
            PathSegment::Line(to) | PathSegment::Cubic { to, .. } => *to,
        }
    }
}

/// Closed outline of the rounded icon shape over an `N×N` canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct CornerMask {
    size: u32,
    radius: f64,
    start: Point,
    segments: Vec<PathSegment>,
}

impl CornerMask {
    /// Build the outline for `size` with the given corner geometry.
    pub fn new(size: IconSize, geometry: MaskGeometry) -> Self {
        let n = size.pixels() as f64;
        let r = calculate_corner_radius(size.pixels(), geometry.radius_ratio);
        let k = calculate_control_offset(r, geometry.curvature);

        let segments = vec![
            // top edge, top-right corner
            PathSegment::Line(Point::new(n - r, 0.0)),
            PathSegment::Cubic {
                ctrl1: Point::new(n - r + k, 0.0),
                ctrl2: Point::new(n, r - k),
                to: Point::new(n, r),
            },
            // right edge, bottom-right corner
            PathSegment::Line(Point::new(n, n - r)),
            PathSegment::Cubic {
                ctrl1: Point::new(n, n - r + k),
                ctrl2: Point::new(n - r + k, n),
                to: Point::new(n - r, n),
            },
            // bottom edge, bottom-left corner
            PathSegment::Line(Point::new(r, n)),
            PathSegment::Cubic {
                ctrl1: Point::new(r - k, n),
                ctrl2: Point::new(0.0, n - r + k),
                to: Point::new(0.0, n - r),
            },
            // left edge, top-left corner
            PathSegment::Line(Point::new(0.0, r)),
            PathSegment::Cubic {
                ctrl1: Point::new(0.0, r - k),
                ctrl2: Point::new(r - k, 0.0),
                to: Point::new(r, 0.0),
            },
        ];

        Self {
            size: size.pixels(),
            radius: r,
            start: Point::new(r, 0.0),
            segments,
        }
    }

    /// Outline with the default platform geometry.
    pub fn ios(size: IconSize) -> Self {
        Self::new(size, MaskGeometry::ios())
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Approximate the outline as a closed polygon.
    ///
    /// The first vertex is the start point; the last vertex equals it again.
    pub fn flatten(&self) -> Vec<Point> {
        let steps = calculate_flatten_steps(self.radius);
        let mut points = Vec::with_capacity(1 + self.segments.len() * steps);
        points.push(self.start);

        let mut current = self.start;
        for segment in &self.segments {
            match *segment {
                PathSegment::Line(to) => points.push(to),
                PathSegment::Cubic { ctrl1, ctrl2, to } => {
                    for i in 1..=steps {
                        let t = i as f64 / steps as f64;
                        points.push(cubic_point(current, ctrl1, ctrl2, to, t));
                    }
                }
            }
            current = segment.end();
        }
        points
    }
}

/// Evaluate a cubic bezier at `t` (Bernstein form).
fn cubic_point(p0: Point, p1: Point, p2: Point, p3: Point, t: f64) -> Point {
    let mt = 1.0 - t;
    let a = mt * mt * mt;
    let b = 3.0 * mt * mt * t;
    let c = 3.0 * mt * t * t;
    let d = t * t * t;
    Point {
        x: a * p0.x + b * p1.x + c * p2.x + d * p3.x,
        y: a * p0.y + b * p1.y + c * p2.y + d * p3.y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask(n: u32) -> CornerMask {
        CornerMask::ios(IconSize::new(n).unwrap())
    }

    #[test]
    fn radius_scales_with_size() {
        assert!((mask(512).radius() - 114.5344).abs() < 1e-6);
        assert!((mask(100).radius() - 22.37).abs() < 1e-9);
    }

    #[test]
    fn outline_is_closed() {
        let m = mask(180);
        let last = m.segments().last().unwrap().end();
        assert_eq!(last, m.start());
    }

    #[test]
    fn outline_alternates_edges_and_corners() {
        let m = mask(512);
        assert_eq!(m.segments().len(), 8);
        for (i, seg) in m.segments().iter().enumerate() {
            let is_line = matches!(seg, PathSegment::Line(_));
            assert_eq!(is_line, i % 2 == 0, "segment {i}");
        }
    }

    #[test]
    fn straight_edges_lie_on_canvas_border() {
        let m = mask(512);
        let n = 512.0;
        let r = m.radius();
        assert_eq!(m.segments()[0].end(), Point::new(n - r, 0.0));
        assert_eq!(m.segments()[2].end(), Point::new(n, n - r));
        assert_eq!(m.segments()[4].end(), Point::new(r, n));
        assert_eq!(m.segments()[6].end(), Point::new(0.0, r));
    }

    #[test]
    fn control_points_use_curvature_multiplier() {
        let m = mask(100);
        let r = 22.37;
        let k = r * 1.28 * 0.4;
        match m.segments()[1] {
            PathSegment::Cubic { ctrl1, ctrl2, to } => {
                assert!((ctrl1.x - (100.0 - r + k)).abs() < 1e-9);
                assert_eq!(ctrl1.y, 0.0);
                assert_eq!(ctrl2.x, 100.0);
                assert!((ctrl2.y - (r - k)).abs() < 1e-9);
                assert_eq!(to, Point::new(100.0, r));
            }
            other => panic!("expected cubic, got {other:?}"),
        }
    }

    #[test]
    fn outline_is_symmetric() {
        let n = 256.0;
        let points = mask(256).flatten();
        // Every vertex mirrored across the vertical center line is within
        // the shape's bounding range; spot-check the corner midpoints.
        let tl = points
            .iter()
            .filter(|p| p.x < n / 2.0 && p.y < n / 2.0)
            .map(|p| p.x + p.y)
            .fold(f64::MAX, f64::min);
        let br = points
            .iter()
            .filter(|p| p.x > n / 2.0 && p.y > n / 2.0)
            .map(|p| (n - p.x) + (n - p.y))
            .fold(f64::MAX, f64::min);
        assert!((tl - br).abs() < 1e-6);
    }

    #[test]
    fn flatten_stays_inside_canvas() {
        for n in [3, 16, 180, 1024] {
            let nf = n as f64;
            for p in mask(n).flatten() {
                assert!(p.x >= -1e-9 && p.x <= nf + 1e-9, "x={} n={n}", p.x);
                assert!(p.y >= -1e-9 && p.y <= nf + 1e-9, "y={} n={n}", p.y);
            }
        }
    }

    #[test]
    fn flatten_starts_and_ends_at_start_point() {
        let m = mask(180);
        let points = m.flatten();
        assert_eq!(points.first(), Some(&m.start()));
        let last = points.last().unwrap();
        assert!((last.x - m.start().x).abs() < 1e-9);
        assert!((last.y - m.start().y).abs() < 1e-9);
    }

    #[test]
    fn corner_curve_cuts_well_inside_the_canvas_corner() {
        // Midpoint of the top-left corner curve sits at about 0.308 * r on
        // both axes, leaving the canvas corner clearly outside.
        let m = mask(512);
        let r = m.radius();
        let closest = m
            .flatten()
            .into_iter()
            .filter(|p| p.x < r && p.y < r)
            .map(|p| p.x + p.y)
            .fold(f64::MAX, f64::min);
        assert!(closest > 0.6 * r, "closest={closest} r={r}");
        assert!(closest < 0.63 * r, "closest={closest} r={r}");
    }
}
