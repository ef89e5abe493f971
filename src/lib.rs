//! Library exports for the touchboard input engine.
//!
//! Exposes the viewport transform, the touch/pointer input state machine,
//! stroke bookkeeping and configuration so hosts (and the replay binary) can
//! drive a shared drawing surface from platform input events.

pub mod config;
pub mod diagnostics;
pub mod draw;
pub mod input;
pub mod runtime;
pub mod util;
pub mod viewport;

pub use config::Config;
pub use draw::CanvasEvent;
pub use input::{InputState, Tool};
pub use viewport::{Transform, ViewportGeometry};
