//! Canvas-to-device transform and the offset clamp.

use crate::util::{Point, Size};
use serde::{Deserialize, Serialize};

/// Scale and offset mapping canvas space onto the viewport.
///
/// `offset` is measured in scaled canvas pixels: the device pixel at the
/// viewport origin shows canvas point `offset / scale`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub offset: Point,
    pub scale: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            offset: Point::ORIGIN,
            scale: 1.0,
        }
    }
}

impl Transform {
    pub fn new(offset: Point, scale: f64) -> Self {
        Self { offset, scale }
    }

    /// Maps a device point to canvas space.
    ///
    /// # Arguments
    /// * `client` - Device-space point (client pixels)
    /// * `origin` - Device-space position of the viewport's top-left corner
    pub fn to_canvas(&self, client: Point, origin: Point) -> Point {
        Point {
            x: (client.x - origin.x + self.offset.x) / self.scale,
            y: (client.y - origin.y + self.offset.y) / self.scale,
        }
    }

    /// Maps a canvas point back to device space. Inverse of [`Transform::to_canvas`].
    pub fn to_device(&self, canvas: Point, origin: Point) -> Point {
        Point {
            x: canvas.x * self.scale - self.offset.x + origin.x,
            y: canvas.y * self.scale - self.offset.y + origin.y,
        }
    }
}

/// Largest offset on each axis that still keeps the canvas covering the viewport.
pub fn max_offset(scale: f64, viewport: Size, canvas: Size) -> Point {
    Point {
        x: (canvas.width * scale - viewport.width).max(0.0),
        y: (canvas.height * scale - viewport.height).max(0.0),
    }
}

/// Clamps each axis of `proposed` to `[0, max(0, canvas * scale - viewport)]`.
///
/// When the scaled canvas is smaller than the viewport on an axis the offset
/// on that axis is pinned to 0.
pub fn clamp_offset(proposed: Point, scale: f64, viewport: Size, canvas: Size) -> Point {
    let max = max_offset(scale, viewport, canvas);
    Point {
        x: clamp_axis(proposed.x, max.x),
        y: clamp_axis(proposed.y, max.y),
    }
}

fn clamp_axis(value: f64, max: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, max)
}
