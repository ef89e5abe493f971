//! Input handling and gesture state machine.
//!
//! This module turns raw touch, pointer and wheel events into canvas actions.
//! It owns the touch session bookkeeping, classifies two-finger gestures as pan
//! or pinch, debounces the start of single-finger strokes, and drives the
//! stroke and viewport controllers.

pub mod events;
pub mod gesture;
pub mod session;
pub mod tool;

// Re-export commonly used types at module level
pub use events::{PointerKind, TouchPoint, WheelInput};
pub use gesture::{GestureClassifier, GestureIntent, GestureSettings};
pub use session::{CommitTicket, DrawingState, InputState, SessionSettings, TimerCommand};
pub use tool::Tool;
