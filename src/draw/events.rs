//! Notifications produced by the input engine for its collaborators.

use super::annotation::Annotation;
use super::stroke::Segment;
use crate::util::Bounds;
use crate::viewport::Transform;
use serde::Serialize;

/// Something the renderer, sync or persistence layers need to act on.
///
/// Drained from [`InputState::take_events`](crate::input::InputState::take_events)
/// after every input.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum CanvasEvent {
    /// Locally drawn segment: paint it and broadcast it
    Segment(Segment),
    /// Segment received from another participant: paint only
    RemoteSegment(Segment),
    /// A pen stroke ended
    StrokeFinalized { bounds: Bounds },
    /// The drawing was accepted
    DrawingFinalized { bounds: Bounds },
    /// Label to render beneath an accepted drawing
    Annotation(Annotation),
    TransformChanged { transform: Transform },
}

impl CanvasEvent {
    /// Short name used in logs and replay summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            CanvasEvent::Segment(_) => "segment",
            CanvasEvent::RemoteSegment(_) => "remote-segment",
            CanvasEvent::StrokeFinalized { .. } => "stroke-finalized",
            CanvasEvent::DrawingFinalized { .. } => "drawing-finalized",
            CanvasEvent::Annotation(_) => "annotation",
            CanvasEvent::TransformChanged { .. } => "transform-changed",
        }
    }
}
