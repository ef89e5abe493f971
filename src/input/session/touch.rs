use crate::diagnostics::ResetReason;
use crate::draw::StrokeOutcome;
use crate::input::events::TouchPoint;
use crate::input::gesture::{GestureIntent, GestureMotion, TwoFingerSample};
use crate::input::tool::Tool;
use log::debug;
use std::time::Instant;

use super::{DrawingState, InputState};

impl InputState {
    /// Processes a touch start.
    ///
    /// # Arguments
    /// * `touches` - Every contact currently on the surface, including the new one
    /// * `now` - Event time
    ///
    /// # Behavior
    /// - Every start opens a new session id and clears the stroke anchor
    /// - One finger with a drawing tool anchors at the touch and arms the commit timer
    /// - One finger with the pan tool records the pan reference
    /// - Two or more fingers cancel any commit and start a calibrating gesture
    pub fn touch_start(&mut self, touches: &[TouchPoint], now: Instant) {
        self.session.touches = touches.to_vec();
        self.diagnostics.record_event("touch-start", touches.len(), now);
        if touches.is_empty() {
            return;
        }

        self.session.session_id += 1;
        self.session.first_move_pending = true;
        self.cancel_commit();
        if self.strokes.is_active() {
            self.finish_stroke();
        }
        self.reset_pending(ResetReason::NewSession);

        match touches {
            [touch] if self.tool.is_drawing() => {
                let anchor = self.to_canvas(touch.client());
                self.strokes.seed(anchor);
                self.state = DrawingState::AwaitingCommit;
                self.arm_commit();
                debug!(
                    "Touch session {} anchored at ({:.1}, {:.1}), commit armed",
                    self.session.session_id, anchor.x, anchor.y
                );
            }
            [touch] => {
                self.session.last_center = Some(touch.client());
                self.session.came_from_multi_touch = false;
                self.classifier.reset();
                self.classifier.set_intent(GestureIntent::Pan);
                self.state = DrawingState::Panning;
            }
            _ => self.begin_multi_touch(touches, now),
        }
    }

    /// Processes a touch move with every contact still on the surface.
    pub fn touch_move(&mut self, touches: &[TouchPoint], now: Instant) {
        self.session.touches = touches.to_vec();
        self.diagnostics.record_event("touch-move", touches.len(), now);

        let first_move = std::mem::take(&mut self.session.first_move_pending);
        match touches {
            [] => {}
            [touch] if first_move && self.tool.is_drawing() => {
                // Seed only: never draw from a point older than this touch
                let point = self.to_canvas(touch.client());
                self.strokes.seed(point);
                debug!("First move after touch start seeds anchor only");
            }
            [touch] => self.single_touch_move(touch, now),
            _ => self.multi_touch_move(touches, now),
        }
    }

    /// Processes a touch end.
    ///
    /// # Arguments
    /// * `remaining` - Contacts still on the surface after the lift
    pub fn touch_end(&mut self, remaining: &[TouchPoint], now: Instant) {
        self.touches_lifted(remaining, now, "touch-end");
    }

    /// Processes a touch cancel; handled like an end with the remaining contacts.
    pub fn touch_cancel(&mut self, remaining: &[TouchPoint], now: Instant) {
        self.touches_lifted(remaining, now, "touch-cancel");
    }

    fn touches_lifted(&mut self, remaining: &[TouchPoint], now: Instant, kind: &'static str) {
        let previous = self.session.touches.len();
        self.session.touches = remaining.to_vec();
        self.diagnostics.record_event(kind, remaining.len(), now);

        match remaining {
            [] => self.end_session(),
            [survivor] if previous >= 2 => self.multi_to_single(survivor),
            [_, _, ..] if previous > remaining.len() => {
                // A finger left a 3+ finger gesture: start over from the new pair
                self.begin_multi_touch(remaining, now);
            }
            _ => {}
        }
    }

    fn begin_multi_touch(&mut self, touches: &[TouchPoint], now: Instant) {
        self.cancel_commit();
        if self.strokes.is_active() {
            self.finish_stroke();
        }
        self.reset_pending(ResetReason::MultiTouch);
        self.session.came_from_multi_touch = true;
        self.state = DrawingState::MultiTouch;
        if let Some(sample) = TwoFingerSample::from_touches(touches) {
            self.session.last_center = Some(sample.center);
            self.classifier.begin(sample, now);
            debug!(
                "Multi-touch gesture with {} contacts, distance {:.1}",
                touches.len(),
                sample.distance
            );
        }
    }

    fn single_touch_move(&mut self, touch: &TouchPoint, now: Instant) {
        let client = touch.client();

        if self.tool == Tool::Pan {
            self.state = DrawingState::Panning;
            let Some(last) = self.session.last_center.replace(client) else {
                self.classifier.set_intent(GestureIntent::Pan);
                return;
            };
            let dx = client.x - last.x;
            let dy = client.y - last.y;
            let threshold = self.settings.single_touch_pan_threshold;
            if dx.abs() > threshold || dy.abs() > threshold {
                self.pan_by(dx, dy);
            }
            return;
        }

        if self.commit_armed() {
            // Still inside the commit delay
            return;
        }

        let point = self.to_canvas(client);
        if !self.strokes.is_active() {
            self.strokes.begin_stroke(point, self.tool);
            self.state = DrawingState::Drawing;
            debug!("Stroke started without commit delay at ({:.1}, {:.1})", point.x, point.y);
            return;
        }

        match self.strokes.extend_stroke(point, self.tool) {
            StrokeOutcome::Drawn(segment) => {
                self.state = DrawingState::Drawing;
                self.emit_segment(segment, now);
            }
            StrokeOutcome::Suspicious { from, to, .. } => {
                self.diagnostics.record_stroke(from, to, true, now);
            }
            StrokeOutcome::Seeded => {
                debug!("Restored missing anchor at ({:.1}, {:.1})", point.x, point.y);
            }
        }
    }

    fn multi_touch_move(&mut self, touches: &[TouchPoint], now: Instant) {
        self.cancel_commit();
        if self.strokes.is_active() {
            self.finish_stroke();
        }
        self.session.came_from_multi_touch = true;
        self.state = DrawingState::MultiTouch;

        let Some(sample) = TwoFingerSample::from_touches(touches) else {
            return;
        };
        self.session.last_center = Some(sample.center);
        let step = self.classifier.step(sample, now);

        let reason = match step.motion {
            GestureMotion::Calibrating => return,
            GestureMotion::Pan { dx, dy } => {
                self.pan_by(dx, dy);
                ResetReason::PanGesture
            }
            GestureMotion::Pinch { factor, center, pan } => {
                self.zoom_by(factor, center);
                if let Some((dx, dy)) = pan {
                    self.pan_by(dx, dy);
                }
                ResetReason::ZoomGesture
            }
        };
        self.reset_pending(reason);
    }

    fn multi_to_single(&mut self, survivor: &TouchPoint) {
        self.session.came_from_multi_touch = true;
        self.classifier.reset();
        self.reset_pending(ResetReason::FromMultiTouch);

        if self.tool.is_drawing() {
            let anchor = self.to_canvas(survivor.client());
            self.strokes.seed(anchor);
            self.state = DrawingState::AwaitingCommit;
            self.arm_commit();
            debug!(
                "Back to one finger, commit re-armed at ({:.1}, {:.1})",
                anchor.x, anchor.y
            );
        } else {
            self.session.last_center = Some(survivor.client());
            self.classifier.set_intent(GestureIntent::Pan);
            self.state = DrawingState::Panning;
        }
    }

    fn end_session(&mut self) {
        self.cancel_commit();
        if self.strokes.is_active() {
            self.finish_stroke();
        }
        self.reset_pending(ResetReason::AllFingersUp);
        self.classifier.reset();
        self.session.last_center = None;
        self.session.first_move_pending = false;
        self.state = DrawingState::Idle;
    }
}
