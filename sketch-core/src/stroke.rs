//! Stroke geometry: sample points in, smoothed path data out.

use std::fmt::{self, Write};

use serde::{Deserialize, Serialize};

/// A pointer sample in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X position in pixels from the left edge.
    pub x: f64,
    /// Y position in pixels from the top edge.
    pub y: f64,
}

impl Point {
    /// Create a point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Portable path geometry in SVG path-data syntax (the `d` attribute).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathData(String);

impl PathData {
    /// Wrap existing path data.
    #[must_use]
    pub fn new(data: impl Into<String>) -> Self {
        Self(data.into())
    }

    /// The raw path-data string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the path has no commands.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PathData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for PathData {
    fn from(data: String) -> Self {
        Self(data)
    }
}

impl From<&str> for PathData {
    fn from(data: &str) -> Self {
        Self(data.to_string())
    }
}

/// Coordinates are rounded to this many decimals in emitted path data.
const PATH_DIGITS: i32 = 3;

#[derive(Default)]
struct PathWriter {
    out: String,
}

impl PathWriter {
    fn command(&mut self, op: char, coords: &[f64]) {
        self.out.push(op);
        for (idx, value) in coords.iter().enumerate() {
            if idx > 0 {
                self.out.push(',');
            }
            let _ = write!(self.out, "{}", round_coord(*value));
        }
    }

    fn move_to(&mut self, p: Point) {
        self.command('M', &[p.x, p.y]);
    }

    fn line_to(&mut self, p: Point) {
        self.command('L', &[p.x, p.y]);
    }

    /// One uniform cubic B-spline span, converted to a Bezier segment.
    fn basis_segment(&mut self, a: Point, b: Point, c: Point) {
        self.command(
            'C',
            &[
                (2.0 * a.x + b.x) / 3.0,
                (2.0 * a.y + b.y) / 3.0,
                (a.x + 2.0 * b.x) / 3.0,
                (a.y + 2.0 * b.y) / 3.0,
                (a.x + 4.0 * b.x + c.x) / 6.0,
                (a.y + 4.0 * b.y + c.y) / 6.0,
            ],
        );
    }
}

fn round_coord(value: f64) -> f64 {
    let k = 10f64.powi(PATH_DIGITS);
    let rounded = (value * k).round() / k;
    // Avoid emitting "-0".
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Smooth a point sequence into path data with a cubic basis spline.
///
/// The path starts at the first point and ends at the last one; interior
/// points act as control points, so consecutive samples never meet at a sharp
/// corner. Two points give a straight segment (a dot when they coincide).
#[must_use]
pub fn basis_path(points: &[Point]) -> PathData {
    let mut path = PathWriter::default();
    match points {
        [] => {}
        [only] => {
            path.move_to(*only);
            path.out.push('Z');
        }
        [first, last] => {
            path.move_to(*first);
            path.line_to(*last);
        }
        [first, second, ..] => {
            path.move_to(*first);
            path.line_to(Point::new(
                (5.0 * first.x + second.x) / 6.0,
                (5.0 * first.y + second.y) / 6.0,
            ));
            for window in points.windows(3) {
                path.basis_segment(window[0], window[1], window[2]);
            }
            let n = points.len();
            path.basis_segment(points[n - 2], points[n - 1], points[n - 1]);
            path.line_to(points[n - 1]);
        }
    }
    PathData(path.out)
}

/// Accumulates the samples of one in-progress gesture.
///
/// One builder exists per gesture; [`finish`](Self::finish) consumes it.
#[derive(Debug, Clone)]
pub struct StrokeBuilder {
    points: Vec<Point>,
    path: PathData,
}

impl StrokeBuilder {
    /// Start a stroke at `start`.
    ///
    /// The start point is recorded twice so a tap without motion still
    /// produces a visible dot.
    #[must_use]
    pub fn begin(start: Point) -> Self {
        let points = vec![start, start];
        let path = basis_path(&points);
        Self { points, path }
    }

    /// Add a sample and recompute the smoothed path.
    ///
    /// Non-finite samples are dropped.
    pub fn extend(&mut self, point: Point) -> &PathData {
        if point.is_finite() {
            self.points.push(point);
            self.path = basis_path(&self.points);
        } else {
            tracing::trace!("Dropping non-finite sample {:?}", point);
        }
        &self.path
    }

    /// Current path data.
    #[must_use]
    pub fn path_data(&self) -> &PathData {
        &self.path
    }

    /// Samples collected so far.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Final geometry of the gesture.
    #[must_use]
    pub fn finish(self) -> PathData {
        basis_path(&self.points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tap_renders_dot() {
        let builder = StrokeBuilder::begin(Point::new(4.0, 7.0));
        assert_eq!(builder.points().len(), 2);
        assert_eq!(builder.finish().as_str(), "M4,7L4,7");
    }

    #[test]
    fn test_two_points_straight_segment() {
        let path = basis_path(&[Point::new(0.0, 0.0), Point::new(10.0, 10.0)]);
        assert_eq!(path.as_str(), "M0,0L10,10");
    }

    #[test]
    fn test_three_points_basis() {
        let path = basis_path(&[
            Point::new(0.0, 0.0),
            Point::new(6.0, 6.0),
            Point::new(12.0, 0.0),
        ]);
        assert_eq!(path.as_str(), "M0,0L1,1C2,2,4,4,6,4C8,4,10,2,11,1L12,0");
    }

    #[test]
    fn test_extend_updates_path_incrementally() {
        let mut builder = StrokeBuilder::begin(Point::new(0.0, 0.0));
        let before = builder.path_data().clone();
        let after = builder.extend(Point::new(30.0, 0.0)).clone();
        assert_ne!(before, after);
        assert!(after.as_str().starts_with("M0,0"));
        assert!(after.as_str().ends_with("L30,0"));
        assert_eq!(builder.finish(), after);
    }

    #[test]
    fn test_non_finite_samples_dropped() {
        let mut builder = StrokeBuilder::begin(Point::new(1.0, 1.0));
        builder.extend(Point::new(f64::NAN, 2.0));
        builder.extend(Point::new(3.0, f64::INFINITY));
        assert_eq!(builder.points().len(), 2);
    }

    #[test]
    fn test_coordinates_rounded() {
        let path = basis_path(&[Point::new(0.123_456, -0.000_1), Point::new(1.0 / 3.0, 2.0)]);
        assert_eq!(path.as_str(), "M0.123,0L0.333,2");
    }

    #[test]
    fn test_single_and_empty() {
        assert!(basis_path(&[]).is_empty());
        assert_eq!(basis_path(&[Point::new(1.0, 2.0)]).as_str(), "M1,2Z");
    }
}
