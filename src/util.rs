//! Geometry primitives shared by the viewport, gesture and stroke code.
//!
//! This module provides:
//! - [`Point`]: a 2D point used for both device and canvas coordinates
//! - [`Size`]: width/height pairs for the viewport and the logical canvas
//! - [`Bounds`]: axis-aligned bounding boxes with the drawing validity predicate

use serde::{Deserialize, Serialize};

// ============================================================================
// Points and sizes
// ============================================================================

/// A point in either device space (client pixels) or canvas space.
///
/// Which space a point lives in is decided by the API that produced it; the
/// type itself carries no tag.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(self, other: Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Point halfway between `self` and `other`.
    pub fn midpoint(self, other: Point) -> Point {
        Point {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }
}

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

// ============================================================================
// Bounding boxes
// ============================================================================

/// Axis-aligned bounding box in canvas space.
///
/// Used for both the current stroke and the accumulated drawing. A box built
/// from a single point is degenerate (zero width and height) and fails
/// [`Bounds::is_valid`] until it grows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Degenerate box located at a single point.
    pub fn at(point: Point) -> Self {
        Self {
            min_x: point.x,
            min_y: point.y,
            max_x: point.x,
            max_y: point.y,
        }
    }

    /// Smallest box containing both points.
    pub fn spanning(a: Point, b: Point) -> Self {
        let mut bounds = Self::at(a);
        bounds.include(b);
        bounds
    }

    /// Expands this box so it contains `point`.
    pub fn include(&mut self, point: Point) {
        self.min_x = self.min_x.min(point.x);
        self.min_y = self.min_y.min(point.y);
        self.max_x = self.max_x.max(point.x);
        self.max_y = self.max_y.max(point.y);
    }

    /// Expands this box so it contains `other`.
    pub fn merge(&mut self, other: &Bounds) {
        self.min_x = self.min_x.min(other.min_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_x = self.max_x.max(other.max_x);
        self.max_y = self.max_y.max(other.max_y);
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Horizontal centre of the box.
    pub fn center_x(&self) -> f64 {
        (self.min_x + self.max_x) / 2.0
    }

    /// Returns true if the box describes an actual drawing.
    ///
    /// Both axes must be ordered and strictly wider than `min_extent`. Boxes
    /// failing this check are treated as "nothing drawn" by every consumer.
    pub fn is_valid(&self, min_extent: f64) -> bool {
        self.min_x < self.max_x
            && self.min_y < self.max_y
            && self.width() > min_extent
            && self.height() > min_extent
    }
}

/// Merges `point` into an optional box, creating the box when absent.
pub fn include_point(bounds: &mut Option<Bounds>, point: Point) {
    match bounds {
        Some(existing) => existing.include(point),
        None => *bounds = Some(Bounds::at(point)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_and_midpoint() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_eq!(a.distance_to(b), 5.0);
        assert_eq!(a.midpoint(b), Point::new(1.5, 2.0));
    }

    #[test]
    fn bounds_grow_to_include_points() {
        let mut bounds = Bounds::at(Point::new(10.0, 10.0));
        bounds.include(Point::new(4.0, 30.0));
        bounds.include(Point::new(12.0, -2.0));
        assert_eq!(
            bounds,
            Bounds {
                min_x: 4.0,
                min_y: -2.0,
                max_x: 12.0,
                max_y: 30.0
            }
        );
    }

    #[test]
    fn merge_covers_both_boxes() {
        let mut a = Bounds::spanning(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        let b = Bounds::spanning(Point::new(5.0, -5.0), Point::new(20.0, 5.0));
        a.merge(&b);
        assert_eq!((a.min_x, a.min_y, a.max_x, a.max_y), (0.0, -5.0, 20.0, 10.0));
    }

    #[test]
    fn validity_requires_extent_on_both_axes() {
        let line = Bounds::spanning(Point::new(100.0, 100.0), Point::new(110.0, 100.0));
        assert!(!line.is_valid(5.0));

        let small = Bounds::spanning(Point::new(0.0, 0.0), Point::new(5.0, 5.0));
        assert!(!small.is_valid(5.0));

        let drawing = Bounds::spanning(Point::new(0.0, 0.0), Point::new(6.0, 6.0));
        assert!(drawing.is_valid(5.0));

        let inverted = Bounds {
            min_x: 10.0,
            min_y: 10.0,
            max_x: 0.0,
            max_y: 0.0,
        };
        assert!(!inverted.is_valid(0.0));
    }

    #[test]
    fn include_point_creates_missing_box() {
        let mut bounds = None;
        include_point(&mut bounds, Point::new(2.0, 3.0));
        assert_eq!(bounds, Some(Bounds::at(Point::new(2.0, 3.0))));
        include_point(&mut bounds, Point::new(-1.0, 8.0));
        assert_eq!(bounds.map(|b| b.width()), Some(3.0));
    }
}
