//! Configuration type definitions.

use crate::input::Tool;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Viewport and canvas geometry settings.
///
/// The logical canvas has a fixed size; the viewport looks at it through a
/// scale and an offset that are always clamped so the canvas covers the
/// whole viewport.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ViewportConfig {
    /// Logical canvas width in canvas pixels
    #[serde(default = "default_canvas_width")]
    pub canvas_width: f64,

    /// Logical canvas height in canvas pixels
    #[serde(default = "default_canvas_height")]
    pub canvas_height: f64,

    /// Smallest allowed zoom scale (valid range: 0.05 - 10.0)
    #[serde(default = "default_min_scale")]
    pub min_scale: f64,

    /// Largest allowed zoom scale (must be >= min_scale)
    #[serde(default = "default_max_scale")]
    pub max_scale: f64,

    /// Scale used when the view is first created
    #[serde(default = "default_initial_scale")]
    pub initial_scale: f64,

    /// Scale multiplier for one wheel notch / zoom-in button press (valid range: 1.01 - 2.0)
    #[serde(default = "default_zoom_in_factor")]
    pub zoom_in_factor: f64,

    /// Scale multiplier for one wheel notch / zoom-out button press (valid range: 0.5 - 0.99)
    #[serde(default = "default_zoom_out_factor")]
    pub zoom_out_factor: f64,

    /// Scale changes smaller than this are ignored
    #[serde(default = "default_zoom_epsilon")]
    pub zoom_epsilon: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            canvas_width: default_canvas_width(),
            canvas_height: default_canvas_height(),
            min_scale: default_min_scale(),
            max_scale: default_max_scale(),
            initial_scale: default_initial_scale(),
            zoom_in_factor: default_zoom_in_factor(),
            zoom_out_factor: default_zoom_out_factor(),
            zoom_epsilon: default_zoom_epsilon(),
        }
    }
}

/// Multi-touch gesture classification tuning.
///
/// These values were tuned against real touch hardware; most users will not
/// need to change them.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GestureConfig {
    /// Relative change in finger distance that counts as a pinch (0.04 = 4%)
    #[serde(default = "default_pinch_ratio_deadzone")]
    pub pinch_ratio_deadzone: f64,

    /// Two-finger centre movement (per axis, device pixels) that counts as a pan
    #[serde(default = "default_pan_threshold")]
    pub pan_threshold_px: f64,

    /// Single-finger movement (per axis, device pixels) below which pan-tool drags are ignored
    #[serde(default = "default_single_touch_pan_threshold")]
    pub single_touch_pan_threshold_px: f64,

    /// Time after a gesture starts during which intent is still settling
    #[serde(default = "default_grace_period_ms")]
    pub grace_period_ms: u64,

    /// Multiplier applied to pan movement while pinch-zooming (0.0 - 1.0)
    #[serde(default = "default_pinch_pan_damping")]
    pub pinch_pan_damping: f64,

    /// Consecutive pinch frames required before pan is applied during a pinch
    #[serde(default = "default_pinch_pan_min_frames")]
    pub pinch_pan_min_frames: u32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            pinch_ratio_deadzone: default_pinch_ratio_deadzone(),
            pan_threshold_px: default_pan_threshold(),
            single_touch_pan_threshold_px: default_single_touch_pan_threshold(),
            grace_period_ms: default_grace_period_ms(),
            pinch_pan_damping: default_pinch_pan_damping(),
            pinch_pan_min_frames: default_pinch_pan_min_frames(),
        }
    }
}

/// Stroke and drawing settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DrawingConfig {
    /// Tool active when the view opens (pan, pen, eraser)
    #[serde(default = "default_tool")]
    pub default_tool: Tool,

    /// Delay before a single touch commits to drawing, so a second finger can still turn it into a gesture
    #[serde(default = "default_draw_delay_ms")]
    pub draw_delay_ms: u64,

    /// Touch segments longer than this (canvas pixels) are treated as sensor jumps and dropped
    #[serde(default = "default_suspicious_distance")]
    pub suspicious_distance: f64,

    /// Bounding boxes must be wider and taller than this to count as a drawing
    #[serde(default = "default_min_valid_extent")]
    pub min_valid_extent: f64,

    /// Gap between the bottom of an accepted drawing and its timestamp label
    #[serde(default = "default_annotation_margin")]
    pub annotation_margin: f64,

    /// chrono format string for the timestamp label
    #[serde(default = "default_annotation_format")]
    pub annotation_format: String,
}

impl Default for DrawingConfig {
    fn default() -> Self {
        Self {
            default_tool: default_tool(),
            draw_delay_ms: default_draw_delay_ms(),
            suspicious_distance: default_suspicious_distance(),
            min_valid_extent: default_min_valid_extent(),
            annotation_margin: default_annotation_margin(),
            annotation_format: default_annotation_format(),
        }
    }
}

/// Input diagnostics history.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DiagnosticsConfig {
    /// Record input and stroke history for debugging
    #[serde(default = "default_diagnostics_enabled")]
    pub enabled: bool,

    /// Number of recent input events kept
    #[serde(default = "default_event_history")]
    pub event_history: usize,

    /// Number of recent strokes (drawn or rejected) kept
    #[serde(default = "default_stroke_history")]
    pub stroke_history: usize,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            enabled: default_diagnostics_enabled(),
            event_history: default_event_history(),
            stroke_history: default_stroke_history(),
        }
    }
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_canvas_width() -> f64 {
    3000.0
}

fn default_canvas_height() -> f64 {
    2000.0
}

fn default_min_scale() -> f64 {
    0.6
}

fn default_max_scale() -> f64 {
    3.0
}

fn default_initial_scale() -> f64 {
    1.0
}

fn default_zoom_in_factor() -> f64 {
    1.1
}

fn default_zoom_out_factor() -> f64 {
    0.9
}

fn default_zoom_epsilon() -> f64 {
    0.001
}

fn default_pinch_ratio_deadzone() -> f64 {
    0.04
}

fn default_pan_threshold() -> f64 {
    5.0
}

fn default_single_touch_pan_threshold() -> f64 {
    1.0
}

fn default_grace_period_ms() -> u64 {
    150
}

fn default_pinch_pan_damping() -> f64 {
    0.5
}

fn default_pinch_pan_min_frames() -> u32 {
    2
}

fn default_tool() -> Tool {
    Tool::Pan
}

fn default_draw_delay_ms() -> u64 {
    60
}

fn default_suspicious_distance() -> f64 {
    100.0
}

fn default_min_valid_extent() -> f64 {
    5.0
}

fn default_annotation_margin() -> f64 {
    40.0
}

fn default_annotation_format() -> String {
    "%Y-%m-%d %H:%M".to_string()
}

fn default_diagnostics_enabled() -> bool {
    true
}

fn default_event_history() -> usize {
    10
}

fn default_stroke_history() -> usize {
    20
}
