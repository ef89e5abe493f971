//! Platform-neutral input event types.
//!
//! Hosts translate their native touch, pointer and wheel events into these
//! before handing them to [`InputState`](super::InputState).

use crate::util::Point;
use serde::{Deserialize, Serialize};

/// One active contact as reported by the platform.
///
/// Coordinates are device (client) pixels. `id` is stable for the lifetime of
/// the contact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    pub id: i64,
    #[serde(rename = "x")]
    pub client_x: f64,
    #[serde(rename = "y")]
    pub client_y: f64,
}

impl TouchPoint {
    pub fn new(id: i64, client_x: f64, client_y: f64) -> Self {
        Self {
            id,
            client_x,
            client_y,
        }
    }

    /// Device-space position of the contact.
    pub fn client(&self) -> Point {
        Point::new(self.client_x, self.client_y)
    }
}

/// Kind of device behind a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    Mouse,
    Pen,
    /// Touch contacts also delivered as pointer events; these are ignored in
    /// favour of the touch stream
    Touch,
}

/// Scroll wheel notch with its device-space anchor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelInput {
    /// Negative values scroll up (zoom in), positive values scroll down (zoom out)
    pub delta_y: f64,
    pub client: Point,
}
