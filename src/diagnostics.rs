//! Bounded input history for debugging touch handling.
//!
//! Keeps the most recent input events, drawn and rejected stroke segments,
//! and the reason the pending stroke anchor was last cleared. Hosts can dump a
//! [`DiagnosticsSnapshot`] when a user reports stray lines or jumpy gestures.

use crate::config::DiagnosticsConfig;
use crate::util::Point;
use serde::Serialize;
use std::collections::VecDeque;
use std::time::Instant;

/// Why the pending stroke anchor was last cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResetReason {
    #[default]
    Init,
    NewSession,
    MultiTouch,
    PanGesture,
    ZoomGesture,
    FromMultiTouch,
    AllFingersUp,
    PointerUp,
    ToolChange,
    RemoteSnapshot,
}

/// One recorded input event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputRecord {
    pub kind: &'static str,
    pub touch_count: usize,
    /// Milliseconds since the first recorded input
    pub at_ms: u64,
}

/// One stroke extension, drawn or dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrokeRecord {
    pub from: Point,
    pub to: Point,
    pub distance: f64,
    pub suspicious: bool,
    pub at_ms: u64,
}

/// Serialisable copy of the current history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticsSnapshot {
    pub events: Vec<InputRecord>,
    pub strokes: Vec<StrokeRecord>,
    pub last_reset: ResetReason,
    pub drawn_segments: u64,
    pub suspicious_segments: u64,
}

#[derive(Debug, Clone)]
pub struct Diagnostics {
    enabled: bool,
    event_limit: usize,
    stroke_limit: usize,
    epoch: Option<Instant>,
    events: VecDeque<InputRecord>,
    strokes: VecDeque<StrokeRecord>,
    last_reset: ResetReason,
    drawn_segments: u64,
    suspicious_segments: u64,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(&DiagnosticsConfig::default())
    }
}

impl Diagnostics {
    pub fn new(config: &DiagnosticsConfig) -> Self {
        Self {
            enabled: config.enabled,
            event_limit: config.event_history.max(1),
            stroke_limit: config.stroke_history.max(1),
            epoch: None,
            events: VecDeque::new(),
            strokes: VecDeque::new(),
            last_reset: ResetReason::Init,
            drawn_segments: 0,
            suspicious_segments: 0,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn last_reset(&self) -> ResetReason {
        self.last_reset
    }

    pub fn drawn_segments(&self) -> u64 {
        self.drawn_segments
    }

    pub fn suspicious_segments(&self) -> u64 {
        self.suspicious_segments
    }

    pub fn record_event(&mut self, kind: &'static str, touch_count: usize, now: Instant) {
        if !self.enabled {
            return;
        }
        let at_ms = self.elapsed_ms(now);
        push_bounded(
            &mut self.events,
            self.event_limit,
            InputRecord {
                kind,
                touch_count,
                at_ms,
            },
        );
    }

    pub fn record_stroke(&mut self, from: Point, to: Point, suspicious: bool, now: Instant) {
        if suspicious {
            self.suspicious_segments += 1;
        } else {
            self.drawn_segments += 1;
        }
        if !self.enabled {
            return;
        }
        let at_ms = self.elapsed_ms(now);
        push_bounded(
            &mut self.strokes,
            self.stroke_limit,
            StrokeRecord {
                from,
                to,
                distance: from.distance_to(to),
                suspicious,
                at_ms,
            },
        );
    }

    pub fn record_reset(&mut self, reason: ResetReason) {
        self.last_reset = reason;
    }

    pub fn snapshot(&self) -> DiagnosticsSnapshot {
        DiagnosticsSnapshot {
            events: self.events.iter().cloned().collect(),
            strokes: self.strokes.iter().cloned().collect(),
            last_reset: self.last_reset,
            drawn_segments: self.drawn_segments,
            suspicious_segments: self.suspicious_segments,
        }
    }

    fn elapsed_ms(&mut self, now: Instant) -> u64 {
        let epoch = *self.epoch.get_or_insert(now);
        u64::try_from(now.saturating_duration_since(epoch).as_millis()).unwrap_or(u64::MAX)
    }
}

fn push_bounded<T>(queue: &mut VecDeque<T>, limit: usize, item: T) {
    while queue.len() >= limit {
        queue.pop_front();
    }
    queue.push_back(item);
}
