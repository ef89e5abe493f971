//! Input state machine and touch session bookkeeping.

use crate::config::Config;
use crate::diagnostics::{Diagnostics, DiagnosticsSnapshot, ResetReason};
use crate::draw::{
    Annotation, CanvasEvent, Segment, StrokeController, StrokeSettings, place_annotation,
};
use crate::input::events::TouchPoint;
use crate::input::gesture::{GestureClassifier, GestureIntent, GestureSettings};
use crate::input::tool::Tool;
use crate::util::{Bounds, Point};
use crate::viewport::{
    Transform, ViewportController, ViewportGeometry, ViewportSettings, ZoomDirection,
};
use chrono::{DateTime, Local};
use log::{debug, info};
use serde::Serialize;
use std::time::{Duration, Instant};

use super::pointer::PointerDrag;

/// What the engine is currently doing with its input.
///
/// Transitions happen in the touch, pointer and timer handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DrawingState {
    /// No contact on the surface
    #[default]
    Idle,
    /// One finger down with a drawing tool; waiting for the commit timer
    AwaitingCommit,
    /// A stroke is being drawn
    Drawing,
    /// One finger (or the mouse) drags the viewport
    Panning,
    /// Two or more fingers: pan or pinch
    MultiTouch,
}

/// Identifies one armed commit timer.
///
/// A fired timer is only honoured if its ticket is still the armed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CommitTicket {
    pub session_id: u64,
    pub generation: u64,
}

/// Instruction for the host's timer, drained with
/// [`InputState::take_timer_command`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCommand {
    /// Replace any outstanding timer with one firing after `delay`
    Arm { ticket: CommitTicket, delay: Duration },
    /// Remove the outstanding timer
    Cancel,
}

/// Per-contact bookkeeping for the current touch session.
#[derive(Debug, Clone, Default)]
pub struct TouchSession {
    /// Incremented on every touch start
    pub session_id: u64,
    pub touches: Vec<TouchPoint>,
    /// Device-space reference for single-finger panning
    pub last_center: Option<Point>,
    /// Set when the last gesture used two or more fingers
    pub came_from_multi_touch: bool,
    /// The next single-finger move only seeds the stroke anchor
    pub first_move_pending: bool,
}

/// Runtime settings for [`InputState`], derived from [`Config`].
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub viewport: ViewportSettings,
    pub gesture: GestureSettings,
    pub stroke: StrokeSettings,
    pub single_touch_pan_threshold: f64,
    pub draw_delay: Duration,
    pub default_tool: Tool,
    pub annotation_margin: f64,
    pub annotation_format: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for SessionSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            viewport: ViewportSettings::from(&cfg.viewport),
            gesture: GestureSettings::from(&cfg.gesture),
            stroke: StrokeSettings {
                suspicious_distance: cfg.drawing.suspicious_distance,
                min_valid_extent: cfg.drawing.min_valid_extent,
            },
            single_touch_pan_threshold: cfg.gesture.single_touch_pan_threshold_px,
            draw_delay: Duration::from_millis(cfg.drawing.draw_delay_ms),
            default_tool: cfg.drawing.default_tool,
            annotation_margin: cfg.drawing.annotation_margin,
            annotation_format: cfg.drawing.annotation_format.clone(),
        }
    }
}

/// Main input state for one canvas view.
///
/// Owns the touch session, the gesture classifier, the stroke controller and
/// the viewport controller. Handlers run to completion; anything the host has
/// to act on afterwards is queued and drained with [`take_events`] and
/// [`take_timer_command`].
///
/// [`take_events`]: InputState::take_events
/// [`take_timer_command`]: InputState::take_timer_command
pub struct InputState {
    pub(super) settings: SessionSettings,
    pub(super) tool: Tool,
    /// Current mode of the state machine
    pub state: DrawingState,
    pub(super) session: TouchSession,
    pub(super) classifier: GestureClassifier,
    pub(super) viewport: ViewportController,
    pub(super) strokes: StrokeController,
    pub(super) diagnostics: Diagnostics,
    pub(super) pointer: Option<PointerDrag>,
    armed: Option<CommitTicket>,
    next_generation: u64,
    pending_timer: Option<TimerCommand>,
    events: Vec<CanvasEvent>,
}

impl InputState {
    /// Creates an input state with the canvas centred in `geometry`.
    pub fn new(
        settings: SessionSettings,
        geometry: ViewportGeometry,
        diagnostics: Diagnostics,
    ) -> Self {
        Self {
            tool: settings.default_tool,
            state: DrawingState::Idle,
            session: TouchSession::default(),
            classifier: GestureClassifier::new(settings.gesture),
            viewport: ViewportController::new(settings.viewport, geometry),
            strokes: StrokeController::new(settings.stroke),
            diagnostics,
            pointer: None,
            armed: None,
            next_generation: 0,
            pending_timer: None,
            events: Vec::new(),
            settings,
        }
    }

    pub fn from_config(config: &Config, geometry: ViewportGeometry) -> Self {
        Self::new(
            SessionSettings::from(config),
            geometry,
            Diagnostics::new(&config.diagnostics),
        )
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Read-only snapshot of the current transform.
    pub fn transform(&self) -> Transform {
        self.viewport.transform()
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn session(&self) -> &TouchSession {
        &self.session
    }

    pub fn gesture_intent(&self) -> GestureIntent {
        self.classifier.intent()
    }

    /// Canvas-space anchor waiting to be connected by the next segment.
    pub fn pending_draw(&self) -> Option<Point> {
        self.strokes.pending()
    }

    pub fn stroke_bounds(&self) -> Option<Bounds> {
        self.strokes.stroke_bounds()
    }

    pub fn drawing_bounds(&self) -> Option<Bounds> {
        self.strokes.drawing_bounds()
    }

    /// Ticket of the armed commit timer, if any.
    pub fn armed_commit(&self) -> Option<CommitTicket> {
        self.armed
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn diagnostics_snapshot(&self) -> DiagnosticsSnapshot {
        self.diagnostics.snapshot()
    }

    /// Drains the notifications queued since the last call.
    pub fn take_events(&mut self) -> Vec<CanvasEvent> {
        std::mem::take(&mut self.events)
    }

    /// Takes the timer instruction produced since the last call.
    ///
    /// Only the latest instruction matters: an `Arm` replaces whatever timer
    /// the host still has outstanding.
    pub fn take_timer_command(&mut self) -> Option<TimerCommand> {
        self.pending_timer.take()
    }

    /// Handles the commit timer firing.
    ///
    /// Stale tickets are ignored. Otherwise the live session must still have
    /// exactly one finger down, a pending anchor and a drawing tool; only then
    /// does the stroke begin at the anchor. Returns true if a stroke began.
    pub fn fire_commit(&mut self, ticket: CommitTicket, now: Instant) -> bool {
        if self.armed != Some(ticket) || ticket.session_id != self.session.session_id {
            debug!(
                "Ignoring stale commit timer (session {}, generation {})",
                ticket.session_id, ticket.generation
            );
            return false;
        }
        self.armed = None;

        let anchor = match self.strokes.pending() {
            Some(anchor) if self.session.touches.len() == 1 && self.tool.is_drawing() => anchor,
            _ => {
                debug!(
                    "Commit timer fired without a single drawing touch ({} touches)",
                    self.session.touches.len()
                );
                return false;
            }
        };

        if self.session.came_from_multi_touch {
            // Survivor of a gesture: the anchor counts toward the drawing even without motion
            self.strokes.begin_stroke(anchor, self.tool);
        } else {
            self.strokes.open_stroke(anchor, self.tool);
        }
        self.session.came_from_multi_touch = false;
        self.session.first_move_pending = false;
        self.classifier.reset();
        self.state = DrawingState::Drawing;
        self.diagnostics.record_event("commit", 1, now);
        debug!(
            "Stroke committed at ({:.1}, {:.1}) in session {}",
            anchor.x, anchor.y, ticket.session_id
        );
        true
    }

    /// Switches the active tool.
    ///
    /// Any armed commit is cancelled and the current stroke is dropped.
    /// Switching into the pen from another tool starts a fresh drawing.
    /// With one finger still down, a drawing tool anchors at that finger and
    /// re-arms the commit timer; the pan tool pans from it.
    pub fn set_tool(&mut self, tool: Tool, now: Instant) {
        if tool == self.tool {
            return;
        }
        let previous = self.tool;
        self.cancel_commit();
        self.strokes.reset_stroke();
        if tool == Tool::Pen {
            self.strokes.reset_drawing();
        }
        self.pointer = None;
        self.tool = tool;
        self.state = match *self.session.touches.as_slice() {
            [] => DrawingState::Idle,
            [touch] if tool.is_drawing() => {
                let anchor = self.to_canvas(touch.client());
                self.strokes.seed(anchor);
                self.arm_commit();
                DrawingState::AwaitingCommit
            }
            [touch] => {
                self.session.last_center = Some(touch.client());
                self.classifier.set_intent(GestureIntent::Pan);
                DrawingState::Panning
            }
            _ => DrawingState::MultiTouch,
        };
        self.diagnostics.record_reset(ResetReason::ToolChange);
        self.diagnostics
            .record_event("tool-change", self.session.touches.len(), now);
        info!("Tool changed: {} -> {}", previous, tool);
    }

    /// Accepts the current drawing and switches back to panning.
    ///
    /// When the drawing bounds are valid, queues `DrawingFinalized` and the
    /// timestamp [`Annotation`] placed beneath them, and returns the annotation.
    pub fn accept_drawing(&mut self, timestamp: &DateTime<Local>, now: Instant) -> Option<Annotation> {
        let annotation = match self.strokes.finalize_drawing() {
            Some(bounds) => {
                self.events.push(CanvasEvent::DrawingFinalized { bounds });
                let annotation = place_annotation(
                    &bounds,
                    self.settings.annotation_margin,
                    self.settings.stroke.min_valid_extent,
                    timestamp,
                    &self.settings.annotation_format,
                );
                if let Some(annotation) = &annotation {
                    info!(
                        "Drawing accepted, label '{}' at ({:.1}, {:.1})",
                        annotation.text, annotation.position.x, annotation.position.y
                    );
                    self.events.push(CanvasEvent::Annotation(annotation.clone()));
                }
                annotation
            }
            None => {
                info!("Nothing drawn, accept only switches to pan");
                None
            }
        };
        self.set_tool(Tool::Pan, now);
        annotation
    }

    /// Forgets the current drawing without accepting it.
    pub fn clear_drawing(&mut self) {
        self.strokes.reset_drawing();
        self.strokes.reset_stroke();
        if self.state == DrawingState::Drawing {
            self.state = DrawingState::Idle;
        }
    }

    /// Paints a segment received from another participant.
    ///
    /// Remote segments never touch the local anchor or bounds.
    pub fn apply_remote_segment(&mut self, segment: Segment) {
        self.events.push(CanvasEvent::RemoteSegment(segment));
    }

    /// Notes that the whole canvas was replaced by a remote snapshot.
    pub fn apply_remote_snapshot(&mut self) {
        self.strokes.reset_drawing();
        self.diagnostics.record_reset(ResetReason::RemoteSnapshot);
        info!("Canvas replaced by remote snapshot, drawing bounds reset");
    }

    /// Applies new viewport geometry.
    pub fn resize(&mut self, geometry: ViewportGeometry) {
        let changed = self.viewport.resize(geometry);
        self.notify_transform(changed);
    }

    /// Zoom button: one step about the viewport centre.
    pub fn zoom_button(&mut self, direction: ZoomDirection) {
        let changed = self.viewport.zoom_about_center(direction);
        self.notify_transform(changed);
    }

    // ------------------------------------------------------------------
    // Helpers shared by the touch and pointer handlers
    // ------------------------------------------------------------------

    pub(super) fn to_canvas(&self, client: Point) -> Point {
        self.viewport.to_canvas(client)
    }

    pub(super) fn pan_by(&mut self, dx: f64, dy: f64) {
        let changed = self.viewport.pan(dx, dy);
        self.notify_transform(changed);
    }

    pub(super) fn zoom_by(&mut self, factor: f64, center: Point) {
        let changed = self.viewport.zoom_at_point(factor, center);
        self.notify_transform(changed);
    }

    pub(super) fn zoom_step(&mut self, direction: ZoomDirection, anchor: Point) {
        let changed = self.viewport.zoom_step(direction, anchor);
        self.notify_transform(changed);
    }

    fn notify_transform(&mut self, changed: bool) {
        if changed {
            self.events.push(CanvasEvent::TransformChanged {
                transform: self.viewport.transform(),
            });
        }
    }

    pub(super) fn emit_segment(&mut self, segment: Segment, now: Instant) {
        self.diagnostics
            .record_stroke(segment.from_point(), segment.to_point(), false, now);
        self.events.push(CanvasEvent::Segment(segment));
    }

    /// Ends the active stroke, queueing `StrokeFinalized` for the pen.
    pub(super) fn finish_stroke(&mut self) {
        if let Some(bounds) = self.strokes.end_stroke(self.tool) {
            debug!(
                "Stroke finalized: ({:.1}, {:.1}) - ({:.1}, {:.1})",
                bounds.min_x, bounds.min_y, bounds.max_x, bounds.max_y
            );
            self.events.push(CanvasEvent::StrokeFinalized { bounds });
        }
    }

    pub(super) fn reset_pending(&mut self, reason: ResetReason) {
        self.strokes.clear_pending();
        self.diagnostics.record_reset(reason);
    }

    /// Arms a fresh commit timer, replacing any outstanding one.
    pub(super) fn arm_commit(&mut self) {
        self.next_generation += 1;
        let ticket = CommitTicket {
            session_id: self.session.session_id,
            generation: self.next_generation,
        };
        self.armed = Some(ticket);
        self.pending_timer = Some(TimerCommand::Arm {
            ticket,
            delay: self.settings.draw_delay,
        });
    }

    pub(super) fn cancel_commit(&mut self) {
        if self.armed.take().is_some() {
            self.pending_timer = Some(TimerCommand::Cancel);
        }
    }

    pub(super) fn commit_armed(&self) -> bool {
        self.armed.is_some()
    }
}
