//! Viewport transform model and controller.
//!
//! The logical canvas has a fixed size and is observed through a viewport
//! that can be panned and zoomed. [`Transform`] holds the scale and offset;
//! [`ViewportController`] is the single owner that mutates it, keeping the
//! scale within its limits and the offset clamped so the canvas always covers
//! the viewport.

pub mod controller;
pub mod transform;

pub use controller::{ViewportController, ViewportGeometry, ViewportSettings, ZoomDirection};
pub use transform::{Transform, clamp_offset, max_offset};
