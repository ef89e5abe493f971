use crate::diagnostics::ResetReason;
use crate::input::events::{PointerKind, WheelInput};
use crate::util::Point;
use crate::viewport::ZoomDirection;
use log::debug;
use std::time::Instant;

use super::{DrawingState, InputState};

/// Mouse or stylus button held down over the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PointerDrag {
    pub last_client: Point,
    pub drawing: bool,
}

impl InputState {
    /// Processes a mouse or stylus press.
    ///
    /// # Behavior
    /// - Touch-originated pointer events are ignored (the touch handlers own them)
    /// - With a drawing tool the stroke starts immediately; there is no commit delay
    /// - With the pan tool the drag moves the viewport
    pub fn pointer_down(&mut self, kind: PointerKind, client: Point, now: Instant) {
        if kind == PointerKind::Touch || !self.session.touches.is_empty() {
            return;
        }
        self.diagnostics.record_event("pointer-down", 0, now);

        let drawing = self.tool.is_drawing();
        if drawing {
            let point = self.to_canvas(client);
            self.strokes.begin_stroke(point, self.tool);
            self.state = DrawingState::Drawing;
        } else {
            self.state = DrawingState::Panning;
        }
        self.pointer = Some(PointerDrag {
            last_client: client,
            drawing,
        });
    }

    /// Processes mouse or stylus motion. Motion without a pressed button is ignored.
    pub fn pointer_move(&mut self, kind: PointerKind, client: Point, now: Instant) {
        if kind == PointerKind::Touch {
            return;
        }
        let Some(drag) = self.pointer.as_mut() else {
            return;
        };
        let dx = client.x - drag.last_client.x;
        let dy = client.y - drag.last_client.y;
        drag.last_client = client;
        let drawing = drag.drawing;

        if drawing {
            let point = self.to_canvas(client);
            if let Some(segment) = self.strokes.connect(point, self.tool) {
                self.emit_segment(segment, now);
            }
        } else {
            self.pan_by(dx, dy);
        }
    }

    /// Processes a button release: ends the stroke or the drag.
    pub fn pointer_up(&mut self, kind: PointerKind, now: Instant) {
        self.release_pointer(kind, now, "pointer-up");
    }

    /// Processes the pointer leaving the canvas; handled like a release.
    pub fn pointer_leave(&mut self, kind: PointerKind, now: Instant) {
        self.release_pointer(kind, now, "pointer-leave");
    }

    /// Processes a wheel notch: negative `delta_y` zooms in, positive zooms out,
    /// anchored at the wheel position.
    pub fn wheel(&mut self, input: WheelInput, now: Instant) {
        self.diagnostics
            .record_event("wheel", self.session.touches.len(), now);
        match ZoomDirection::from_wheel(input.delta_y) {
            Some(direction) => self.zoom_step(direction, input.client),
            None => debug!("Ignoring wheel event without vertical delta"),
        }
    }

    fn release_pointer(&mut self, kind: PointerKind, now: Instant, event: &'static str) {
        if kind == PointerKind::Touch {
            return;
        }
        let Some(drag) = self.pointer.take() else {
            return;
        };
        self.diagnostics.record_event(event, 0, now);
        if drag.drawing {
            self.finish_stroke();
            self.diagnostics.record_reset(ResetReason::PointerUp);
        }
        self.state = DrawingState::Idle;
    }
}
