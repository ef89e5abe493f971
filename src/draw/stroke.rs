//! Stroke segments and bounding-box tracking.

use crate::input::Tool;
use crate::util::{Bounds, Point, include_point};
use log::debug;
use serde::{Deserialize, Serialize};

/// One straight piece of a stroke in canvas space.
///
/// Serialises flat (`fromX`, `fromY`, `toX`, `toY`, `tool`) so it can be
/// broadcast to other participants and applied on their side unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub from_x: f64,
    pub from_y: f64,
    pub to_x: f64,
    pub to_y: f64,
    pub tool: Tool,
}

impl Segment {
    pub fn new(from: Point, to: Point, tool: Tool) -> Self {
        Self {
            from_x: from.x,
            from_y: from.y,
            to_x: to.x,
            to_y: to.y,
            tool,
        }
    }

    pub fn from_point(&self) -> Point {
        Point::new(self.from_x, self.from_y)
    }

    pub fn to_point(&self) -> Point {
        Point::new(self.to_x, self.to_y)
    }

    pub fn length(&self) -> f64 {
        self.from_point().distance_to(self.to_point())
    }
}

/// Runtime stroke filtering settings.
#[derive(Debug, Clone, Copy)]
pub struct StrokeSettings {
    /// Extensions longer than this are dropped as sensor jumps
    pub suspicious_distance: f64,
    /// Minimum width and height of a valid drawing
    pub min_valid_extent: f64,
}

impl Default for StrokeSettings {
    fn default() -> Self {
        Self {
            suspicious_distance: 100.0,
            min_valid_extent: 5.0,
        }
    }
}

/// What happened to a sampled point passed to [`StrokeController::extend_stroke`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrokeOutcome {
    /// A segment was accepted
    Drawn(Segment),
    /// The jump was too long; the anchor moved without drawing
    Suspicious { from: Point, to: Point, distance: f64 },
    /// No anchor existed, the point became the anchor
    Seeded,
}

/// Tracks the pending anchor and the stroke/drawing bounding boxes.
///
/// The pending anchor is the last accepted point not yet connected by a
/// segment. Stroke bounds cover the current stroke only; drawing bounds
/// accumulate over every pen stroke until the drawing is finalised or reset.
#[derive(Debug, Clone, Default)]
pub struct StrokeController {
    settings: StrokeSettings,
    pending: Option<Point>,
    stroke_bounds: Option<Bounds>,
    drawing_bounds: Option<Bounds>,
    active: bool,
}

impl StrokeController {
    pub fn new(settings: StrokeSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> &StrokeSettings {
        &self.settings
    }

    pub fn pending(&self) -> Option<Point> {
        self.pending
    }

    pub fn stroke_bounds(&self) -> Option<Bounds> {
        self.stroke_bounds
    }

    pub fn drawing_bounds(&self) -> Option<Bounds> {
        self.drawing_bounds
    }

    /// Returns true between [`begin_stroke`](Self::begin_stroke) and [`end_stroke`](Self::end_stroke).
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns true if the accumulated drawing passes the validity check.
    pub fn has_valid_drawing(&self) -> bool {
        self.drawing_bounds
            .is_some_and(|bounds| bounds.is_valid(self.settings.min_valid_extent))
    }

    /// Places the anchor without starting a stroke.
    pub fn seed(&mut self, point: Point) {
        self.pending = Some(point);
    }

    pub fn clear_pending(&mut self) {
        self.pending = None;
    }

    /// Starts a stroke at `point`.
    ///
    /// For the pen the stroke bounds become a degenerate box at `point`,
    /// merged into the drawing bounds.
    pub fn begin_stroke(&mut self, point: Point, tool: Tool) {
        self.open_stroke(point, tool);
        if tool.tracks_bounds() {
            include_point(&mut self.drawing_bounds, point);
        }
    }

    /// Starts a stroke at `point` without touching the drawing bounds.
    ///
    /// The anchor only joins the drawing once a segment is drawn from it.
    pub fn open_stroke(&mut self, point: Point, tool: Tool) {
        self.pending = Some(point);
        self.active = true;
        if tool.tracks_bounds() {
            self.stroke_bounds = Some(Bounds::at(point));
        }
    }

    /// Connects the pending anchor to `to`.
    ///
    /// Jumps longer than the suspicious distance are not drawn; the anchor is
    /// moved to `to` so the next sample continues from there.
    pub fn extend_stroke(&mut self, to: Point, tool: Tool) -> StrokeOutcome {
        let Some(from) = self.pending else {
            self.pending = Some(to);
            return StrokeOutcome::Seeded;
        };

        let distance = from.distance_to(to);
        if distance > self.settings.suspicious_distance {
            debug!(
                "Dropping suspicious segment ({:.1}, {:.1}) -> ({:.1}, {:.1}), distance {:.1}",
                from.x, from.y, to.x, to.y, distance
            );
            self.pending = Some(to);
            return StrokeOutcome::Suspicious { from, to, distance };
        }

        StrokeOutcome::Drawn(self.draw_to(from, to, tool))
    }

    /// Connects the pending anchor to `to` without the jump filter.
    ///
    /// Used for mouse and stylus pointers, which do not report spurious jumps.
    /// Returns `None` (and seeds the anchor) when there was no anchor.
    pub fn connect(&mut self, to: Point, tool: Tool) -> Option<Segment> {
        match self.pending {
            Some(from) => Some(self.draw_to(from, to, tool)),
            None => {
                self.pending = Some(to);
                None
            }
        }
    }

    fn draw_to(&mut self, from: Point, to: Point, tool: Tool) -> Segment {
        if tool.tracks_bounds() {
            for bounds in [&mut self.stroke_bounds, &mut self.drawing_bounds] {
                include_point(bounds, from);
                include_point(bounds, to);
            }
        }
        self.pending = Some(to);
        Segment::new(from, to, tool)
    }

    /// Ends the current stroke.
    ///
    /// Returns the finished stroke bounds for the pen; always clears the anchor.
    pub fn end_stroke(&mut self, tool: Tool) -> Option<Bounds> {
        self.active = false;
        self.pending = None;
        let bounds = self.stroke_bounds.take();
        if tool.tracks_bounds() { bounds } else { None }
    }

    /// Takes the drawing bounds, returning them only if they describe a drawing.
    pub fn finalize_drawing(&mut self) -> Option<Bounds> {
        let bounds = self.drawing_bounds.take()?;
        if bounds.is_valid(self.settings.min_valid_extent) {
            Some(bounds)
        } else {
            debug!("Discarding degenerate drawing bounds {:?}", bounds);
            None
        }
    }

    /// Drops the current stroke without finalising it.
    pub fn reset_stroke(&mut self) {
        self.active = false;
        self.pending = None;
        self.stroke_bounds = None;
    }

    pub fn reset_drawing(&mut self) {
        self.drawing_bounds = None;
    }
}
