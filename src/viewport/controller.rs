//! Pan and zoom under the clamp constraints.

use super::transform::{Transform, clamp_offset};
use crate::config::ViewportConfig;
use crate::util::{Point, Size};
use log::debug;
use serde::{Deserialize, Serialize};

/// On-screen placement of the viewport element, in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportGeometry {
    pub origin: Point,
    pub size: Size,
}

impl ViewportGeometry {
    pub fn new(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    /// Device-space centre of the viewport.
    pub fn center(&self) -> Point {
        Point {
            x: self.origin.x + self.size.width / 2.0,
            y: self.origin.y + self.size.height / 2.0,
        }
    }
}

/// Runtime viewport limits derived from [`ViewportConfig`].
#[derive(Debug, Clone, Copy)]
pub struct ViewportSettings {
    pub canvas: Size,
    pub min_scale: f64,
    pub max_scale: f64,
    pub initial_scale: f64,
    pub zoom_in_factor: f64,
    pub zoom_out_factor: f64,
    pub zoom_epsilon: f64,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self::from(&ViewportConfig::default())
    }
}

impl From<&ViewportConfig> for ViewportSettings {
    fn from(cfg: &ViewportConfig) -> Self {
        Self {
            canvas: Size::new(cfg.canvas_width, cfg.canvas_height),
            min_scale: cfg.min_scale,
            max_scale: cfg.max_scale,
            initial_scale: cfg.initial_scale,
            zoom_in_factor: cfg.zoom_in_factor,
            zoom_out_factor: cfg.zoom_out_factor,
            zoom_epsilon: cfg.zoom_epsilon,
        }
    }
}

/// Direction of a discrete zoom step (wheel notch or zoom button).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoomDirection {
    In,
    Out,
}

impl ZoomDirection {
    /// Direction for a wheel delta; `None` when the delta is zero.
    pub fn from_wheel(delta_y: f64) -> Option<Self> {
        if delta_y < 0.0 {
            Some(ZoomDirection::In)
        } else if delta_y > 0.0 {
            Some(ZoomDirection::Out)
        } else {
            None
        }
    }
}

/// Owns the [`Transform`] and is the only code allowed to change it.
///
/// Every mutation returns `true` when the transform actually changed so the
/// caller can notify observers.
#[derive(Debug, Clone)]
pub struct ViewportController {
    settings: ViewportSettings,
    geometry: ViewportGeometry,
    transform: Transform,
}

impl ViewportController {
    /// Creates a controller with the canvas centred in the viewport.
    pub fn new(settings: ViewportSettings, geometry: ViewportGeometry) -> Self {
        let scale = settings
            .initial_scale
            .clamp(settings.min_scale, settings.max_scale);
        let centred = Point {
            x: (settings.canvas.width * scale - geometry.size.width) / 2.0,
            y: (settings.canvas.height * scale - geometry.size.height) / 2.0,
        };
        let offset = clamp_offset(centred, scale, geometry.size, settings.canvas);
        Self {
            settings,
            geometry,
            transform: Transform::new(offset, scale),
        }
    }

    /// Read-only snapshot of the current transform.
    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn geometry(&self) -> ViewportGeometry {
        self.geometry
    }

    pub fn settings(&self) -> &ViewportSettings {
        &self.settings
    }

    /// Maps a device point to canvas space with the current transform.
    pub fn to_canvas(&self, client: Point) -> Point {
        self.transform.to_canvas(client, self.geometry.origin)
    }

    /// Maps a canvas point to device space with the current transform.
    pub fn to_device(&self, canvas: Point) -> Point {
        self.transform.to_device(canvas, self.geometry.origin)
    }

    /// Moves the view by a device-space delta.
    ///
    /// The delta is subtracted from the offset as-is; it is not divided by the
    /// scale, so a finger drag moves the view the same number of pixels at any
    /// zoom level.
    pub fn pan(&mut self, dx: f64, dy: f64) -> bool {
        let proposed = Point {
            x: self.transform.offset.x - dx,
            y: self.transform.offset.y - dy,
        };
        let offset = self.clamp(proposed, self.transform.scale);
        self.apply(Transform::new(offset, self.transform.scale))
    }

    /// Zooms by `factor` keeping the canvas point under `center` fixed.
    ///
    /// Scale and offset are both computed from the pre-zoom snapshot and
    /// written together. Changes smaller than the zoom epsilon (including any
    /// zoom that is fully absorbed by the scale limits) leave the transform
    /// untouched.
    ///
    /// # Arguments
    /// * `factor` - Scale multiplier (> 1 zooms in)
    /// * `center` - Device-space anchor point
    pub fn zoom_at_point(&mut self, factor: f64, center: Point) -> bool {
        if !factor.is_finite() || factor <= 0.0 {
            debug!("Ignoring zoom with invalid factor {factor}");
            return false;
        }

        let before = self.transform;
        let new_scale = (before.scale * factor).clamp(self.settings.min_scale, self.settings.max_scale);
        if (new_scale - before.scale).abs() < self.settings.zoom_epsilon {
            return false;
        }

        let anchor = before.to_canvas(center, self.geometry.origin);
        let relative = Point {
            x: center.x - self.geometry.origin.x,
            y: center.y - self.geometry.origin.y,
        };
        let proposed = Point {
            x: anchor.x * new_scale - relative.x,
            y: anchor.y * new_scale - relative.y,
        };
        let offset = self.clamp(proposed, new_scale);
        self.apply(Transform::new(offset, new_scale))
    }

    /// One discrete zoom step anchored at `anchor`.
    pub fn zoom_step(&mut self, direction: ZoomDirection, anchor: Point) -> bool {
        let factor = match direction {
            ZoomDirection::In => self.settings.zoom_in_factor,
            ZoomDirection::Out => self.settings.zoom_out_factor,
        };
        self.zoom_at_point(factor, anchor)
    }

    /// One discrete zoom step anchored at the viewport centre (zoom buttons).
    pub fn zoom_about_center(&mut self, direction: ZoomDirection) -> bool {
        self.zoom_step(direction, self.geometry.center())
    }

    /// Stores new viewport geometry and re-clamps the offset.
    pub fn resize(&mut self, geometry: ViewportGeometry) -> bool {
        self.geometry = geometry;
        let offset = self.clamp(self.transform.offset, self.transform.scale);
        self.apply(Transform::new(offset, self.transform.scale))
    }

    fn clamp(&self, proposed: Point, scale: f64) -> Point {
        clamp_offset(proposed, scale, self.geometry.size, self.settings.canvas)
    }

    fn apply(&mut self, next: Transform) -> bool {
        if next == self.transform {
            return false;
        }
        self.transform = next;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::transform::max_offset;

    fn geometry(width: f64, height: f64) -> ViewportGeometry {
        ViewportGeometry::new(Point::ORIGIN, Size::new(width, height))
    }

    fn controller() -> ViewportController {
        ViewportController::new(ViewportSettings::default(), geometry(1000.0, 800.0))
    }

    fn assert_close(a: Point, b: Point) {
        assert!(
            (a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6,
            "{a:?} != {b:?}"
        );
    }

    #[test]
    fn new_centres_the_canvas() {
        let view = controller();
        assert_eq!(view.transform().scale, 1.0);
        assert_eq!(view.transform().offset, Point::new(1000.0, 600.0));
    }

    #[test]
    fn pan_subtracts_delta_without_scaling() {
        let mut view = controller();
        view.zoom_at_point(2.0, Point::new(500.0, 400.0));
        let before = view.transform().offset;
        assert!(view.pan(30.0, -20.0));
        let after = view.transform().offset;
        assert_close(after, Point::new(before.x - 30.0, before.y + 20.0));
    }

    #[test]
    fn pan_is_clamped_at_canvas_edges() {
        let mut view = controller();
        view.pan(5000.0, 5000.0);
        assert_eq!(view.transform().offset, Point::ORIGIN);
        assert!(!view.pan(10.0, 10.0));

        view.pan(-10_000.0, -10_000.0);
        assert_eq!(view.transform().offset, Point::new(2000.0, 1200.0));
    }

    #[test]
    fn zoom_keeps_anchor_fixed() {
        let mut view = controller();
        let anchor = Point::new(420.0, 310.0);
        let canvas_before = view.to_canvas(anchor);

        assert!(view.zoom_at_point(1.5, anchor));
        assert_eq!(view.transform().scale, 1.5);
        assert_close(view.to_device(canvas_before), anchor);
        assert_close(view.to_canvas(anchor), canvas_before);
    }

    #[test]
    fn zoom_keeps_anchor_fixed_with_viewport_origin() {
        let mut view = ViewportController::new(
            ViewportSettings::default(),
            ViewportGeometry::new(Point::new(40.0, 90.0), Size::new(1000.0, 800.0)),
        );
        let anchor = Point::new(600.0, 500.0);
        let canvas_before = view.to_canvas(anchor);
        view.zoom_at_point(0.8, anchor);
        assert_close(view.to_canvas(anchor), canvas_before);
    }

    #[test]
    fn unit_zoom_is_a_no_op() {
        let mut view = controller();
        let before = view.transform();
        assert!(!view.zoom_at_point(1.0, Point::new(123.0, 456.0)));
        assert_eq!(view.transform(), before);
    }

    #[test]
    fn zoom_is_clamped_to_scale_limits() {
        let mut view = controller();
        view.zoom_at_point(100.0, Point::new(500.0, 400.0));
        assert_eq!(view.transform().scale, 3.0);
        let at_max = view.transform();
        assert!(!view.zoom_at_point(1.2, Point::new(10.0, 10.0)));
        assert_eq!(view.transform(), at_max);

        view.zoom_at_point(0.01, Point::new(500.0, 400.0));
        assert_eq!(view.transform().scale, 0.6);
    }

    #[test]
    fn zoom_result_respects_offset_clamp() {
        let mut view = controller();
        view.pan(5000.0, 5000.0);
        view.zoom_at_point(0.7, Point::new(0.0, 0.0));
        let transform = view.transform();
        let max = max_offset(transform.scale, view.geometry().size, view.settings().canvas);
        assert!(transform.offset.x >= 0.0 && transform.offset.x <= max.x);
        assert!(transform.offset.y >= 0.0 && transform.offset.y <= max.y);
    }

    #[test]
    fn wheel_direction_follows_delta_sign() {
        assert_eq!(ZoomDirection::from_wheel(-3.0), Some(ZoomDirection::In));
        assert_eq!(ZoomDirection::from_wheel(3.0), Some(ZoomDirection::Out));
        assert_eq!(ZoomDirection::from_wheel(0.0), None);
    }

    #[test]
    fn zoom_buttons_anchor_at_viewport_centre() {
        let mut view = controller();
        let centre = view.geometry().center();
        let canvas_centre = view.to_canvas(centre);
        assert!(view.zoom_about_center(ZoomDirection::In));
        assert!((view.transform().scale - 1.1).abs() < 1e-12);
        assert_close(view.to_canvas(centre), canvas_centre);
    }

    #[test]
    fn resize_reclamps_offset() {
        let mut view = controller();
        view.pan(-10_000.0, -10_000.0);
        assert!(view.resize(geometry(2500.0, 1900.0)));
        assert_eq!(view.transform().offset, Point::new(500.0, 100.0));
        assert!(!view.resize(geometry(2500.0, 1900.0)));
    }
}
