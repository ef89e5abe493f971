//! Stroke bookkeeping and the notifications handed to collaborators.
//!
//! This module defines the drawing-side types of the canvas:
//! - [`StrokeController`]: pending anchor, suspicious-jump filter, stroke and drawing bounds
//! - [`Segment`]: one accepted stroke extension, in its wire format
//! - [`Annotation`]: timestamp label placed under an accepted drawing
//! - [`CanvasEvent`]: everything the renderer, sync and persistence layers consume
//!
//! Painting segments onto pixels is left to the host.

pub mod annotation;
pub mod events;
pub mod stroke;

// Re-export commonly used types at module level
pub use annotation::{Annotation, place_annotation};
pub use events::CanvasEvent;
pub use stroke::{Segment, StrokeController, StrokeOutcome, StrokeSettings};
