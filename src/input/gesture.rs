//! Two-finger gesture classification.
//!
//! Each multi-touch frame is compared with the previous one: a change in
//! finger distance beyond the deadzone reads as a pinch, centre movement
//! beyond the pan threshold reads as a pan. Once an intent is chosen it only
//! flips on a clear opposite signal, so a single noisy frame cannot toggle
//! between zooming and panning.

use crate::config::GestureConfig;
use crate::util::Point;
use log::debug;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use super::events::TouchPoint;

/// Classifier belief about the current multi-touch gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GestureIntent {
    #[default]
    Unknown,
    Pan,
    Pinch,
}

/// Runtime classifier tuning derived from [`GestureConfig`].
#[derive(Debug, Clone, Copy)]
pub struct GestureSettings {
    pub pinch_ratio_deadzone: f64,
    pub pan_threshold: f64,
    pub grace_period: Duration,
    pub pinch_pan_damping: f64,
    pub pinch_pan_min_frames: u32,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self::from(&GestureConfig::default())
    }
}

impl From<&GestureConfig> for GestureSettings {
    fn from(cfg: &GestureConfig) -> Self {
        Self {
            pinch_ratio_deadzone: cfg.pinch_ratio_deadzone,
            pan_threshold: cfg.pan_threshold_px,
            grace_period: Duration::from_millis(cfg.grace_period_ms),
            pinch_pan_damping: cfg.pinch_pan_damping,
            pinch_pan_min_frames: cfg.pinch_pan_min_frames,
        }
    }
}

/// Centre and separation of the first two contacts, in device pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoFingerSample {
    pub center: Point,
    pub distance: f64,
}

impl TwoFingerSample {
    pub fn new(center: Point, distance: f64) -> Self {
        Self { center, distance }
    }

    /// Sample for the first two touches, or `None` with fewer than two.
    pub fn from_touches(touches: &[TouchPoint]) -> Option<Self> {
        match touches {
            [first, second, ..] => {
                let a = first.client();
                let b = second.client();
                Some(Self::new(a.midpoint(b), a.distance_to(b)))
            }
            _ => None,
        }
    }
}

/// Viewport change requested by one classified frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureMotion {
    /// Frame only stored as the reference for the next one
    Calibrating,
    /// Pan by the centre movement
    Pan { dx: f64, dy: f64 },
    /// Zoom by `factor` about `center`, with an optional damped pan
    Pinch {
        factor: f64,
        center: Point,
        pan: Option<(f64, f64)>,
    },
}

/// Result of feeding one frame to the classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureStep {
    pub intent: GestureIntent,
    pub motion: GestureMotion,
    /// Time since the gesture started
    pub elapsed: Duration,
    pub in_grace_period: bool,
}

/// Pan/pinch classifier with hysteresis.
#[derive(Debug, Clone)]
pub struct GestureClassifier {
    settings: GestureSettings,
    intent: GestureIntent,
    last: Option<TwoFingerSample>,
    gesture_start: Option<Instant>,
    calibrating: bool,
    consecutive_pinch_frames: u32,
}

impl GestureClassifier {
    pub fn new(settings: GestureSettings) -> Self {
        Self {
            settings,
            intent: GestureIntent::Unknown,
            last: None,
            gesture_start: None,
            calibrating: false,
            consecutive_pinch_frames: 0,
        }
    }

    pub fn intent(&self) -> GestureIntent {
        self.intent
    }

    pub fn consecutive_pinch_frames(&self) -> u32 {
        self.consecutive_pinch_frames
    }

    /// Returns true while the gesture is younger than the grace period.
    pub fn in_grace_period(&self, now: Instant) -> bool {
        self.gesture_start
            .is_some_and(|start| now.saturating_duration_since(start) < self.settings.grace_period)
    }

    /// Starts a new multi-touch gesture.
    ///
    /// Intent goes back to unknown and the next frame is calibration only.
    pub fn begin(&mut self, sample: TwoFingerSample, now: Instant) {
        self.intent = GestureIntent::Unknown;
        self.last = Some(sample);
        self.gesture_start = Some(now);
        self.calibrating = true;
        self.consecutive_pinch_frames = 0;
    }

    /// Forces the intent, used when a single pan-tool finger starts a gesture.
    pub fn set_intent(&mut self, intent: GestureIntent) {
        self.intent = intent;
    }

    /// Forgets everything about the current gesture.
    pub fn reset(&mut self) {
        self.intent = GestureIntent::Unknown;
        self.last = None;
        self.gesture_start = None;
        self.calibrating = false;
        self.consecutive_pinch_frames = 0;
    }

    /// Classifies one multi-touch frame.
    pub fn step(&mut self, sample: TwoFingerSample, now: Instant) -> GestureStep {
        let start = *self.gesture_start.get_or_insert(now);
        let elapsed = now.saturating_duration_since(start);
        let in_grace_period = elapsed < self.settings.grace_period;
        let frame = |intent, motion| GestureStep {
            intent,
            motion,
            elapsed,
            in_grace_period,
        };

        let previous = match self.last {
            Some(previous) if previous.distance > 0.0 => previous,
            _ => {
                self.last = Some(sample);
                return frame(self.intent, GestureMotion::Calibrating);
            }
        };

        if self.calibrating {
            self.calibrating = false;
            self.last = Some(sample);
            debug!(
                "Gesture calibrated at ({:.1}, {:.1}), distance {:.1}",
                sample.center.x, sample.center.y, sample.distance
            );
            return frame(self.intent, GestureMotion::Calibrating);
        }

        let dx = sample.center.x - previous.center.x;
        let dy = sample.center.y - previous.center.y;
        let ratio = sample.distance / previous.distance;
        let is_pinching = (ratio - 1.0).abs() > self.settings.pinch_ratio_deadzone;
        let has_pan = dx.abs() > self.settings.pan_threshold || dy.abs() > self.settings.pan_threshold;

        let before = self.intent;
        match self.intent {
            GestureIntent::Unknown if is_pinching => self.enter_pinch(),
            GestureIntent::Unknown if has_pan => self.enter_pan(),
            GestureIntent::Pan if is_pinching => self.enter_pinch(),
            GestureIntent::Pinch if has_pan && !is_pinching => self.enter_pan(),
            _ => {}
        }
        if self.intent == GestureIntent::Pinch && is_pinching {
            self.consecutive_pinch_frames += 1;
        }
        if before != self.intent {
            debug!(
                "Gesture intent {:?} -> {:?} (ratio {:.3}, delta {:.1},{:.1}, {}ms)",
                before,
                self.intent,
                ratio,
                dx,
                dy,
                elapsed.as_millis()
            );
        }

        self.last = Some(sample);
        let motion = if self.intent == GestureIntent::Pinch {
            let pan = (has_pan && self.consecutive_pinch_frames > self.settings.pinch_pan_min_frames)
                .then(|| {
                    (
                        dx * self.settings.pinch_pan_damping,
                        dy * self.settings.pinch_pan_damping,
                    )
                });
            GestureMotion::Pinch {
                factor: ratio,
                center: sample.center,
                pan,
            }
        } else {
            GestureMotion::Pan { dx, dy }
        };
        frame(self.intent, motion)
    }

    fn enter_pinch(&mut self) {
        self.intent = GestureIntent::Pinch;
        self.consecutive_pinch_frames = 1;
    }

    fn enter_pan(&mut self) {
        self.intent = GestureIntent::Pan;
        self.consecutive_pinch_frames = 0;
    }
}
