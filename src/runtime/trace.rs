//! Recorded input traces.
//!
//! A trace is a JSON file describing the viewport and a time-ordered list of
//! input events. Traces are replayed by [`super::replay`] to reproduce touch
//! handling bugs without a touch screen.

use crate::draw::Segment;
use crate::input::{PointerKind, TouchPoint, Tool};
use crate::util::{Point, Size};
use crate::viewport::{ViewportGeometry, ZoomDirection};
use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const CURRENT_VERSION: u32 = 1;

/// Problems with the contents of a trace file.
#[derive(Debug, Error, PartialEq)]
pub enum TraceError {
    #[error("Unsupported trace version {found} (expected {CURRENT_VERSION})")]
    UnsupportedVersion { found: u32 },

    #[error("Invalid viewport size {width}x{height}")]
    InvalidViewport { width: f64, height: f64 },

    #[error("Event {index} at {at_ms}ms is earlier than the previous event at {previous_ms}ms")]
    OutOfOrder {
        index: usize,
        at_ms: u64,
        previous_ms: u64,
    },

    #[error("Event {index} is a touch start without touches")]
    EmptyTouchStart { index: usize },

    #[error("Event {index} has a non-finite coordinate")]
    NonFiniteCoordinate { index: usize },
}

/// Input replayed from a trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum TraceInput {
    TouchStart { touches: Vec<TouchPoint> },
    TouchMove { touches: Vec<TouchPoint> },
    TouchEnd { touches: Vec<TouchPoint> },
    TouchCancel { touches: Vec<TouchPoint> },
    PointerDown { kind: PointerKind, x: f64, y: f64 },
    PointerMove { kind: PointerKind, x: f64, y: f64 },
    PointerUp { kind: PointerKind },
    PointerLeave { kind: PointerKind },
    Wheel { delta_y: f64, x: f64, y: f64 },
    ZoomButton { direction: ZoomDirection },
    Tool { tool: Tool },
    Accept,
    Clear,
    Resize { viewport: ViewportGeometry },
    RemoteSegment { segment: Segment },
    RemoteSnapshot,
}

impl TraceInput {
    fn coordinates(&self) -> Vec<f64> {
        match self {
            TraceInput::TouchStart { touches }
            | TraceInput::TouchMove { touches }
            | TraceInput::TouchEnd { touches }
            | TraceInput::TouchCancel { touches } => touches
                .iter()
                .flat_map(|t| [t.client_x, t.client_y])
                .collect(),
            TraceInput::PointerDown { x, y, .. } | TraceInput::PointerMove { x, y, .. } => {
                vec![*x, *y]
            }
            TraceInput::Wheel { delta_y, x, y } => vec![*delta_y, *x, *y],
            TraceInput::Resize { viewport } => vec![
                viewport.origin.x,
                viewport.origin.y,
                viewport.size.width,
                viewport.size.height,
            ],
            TraceInput::RemoteSegment { segment } => {
                vec![segment.from_x, segment.from_y, segment.to_x, segment.to_y]
            }
            _ => Vec::new(),
        }
    }
}

/// One timestamped input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    /// Milliseconds since the start of the trace
    pub at_ms: u64,
    #[serde(flatten)]
    pub input: TraceInput,
}

/// Complete trace file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    #[serde(default = "default_version")]
    pub version: u32,
    pub viewport: ViewportGeometry,
    /// Tool active at the start; the configured default when absent
    #[serde(default)]
    pub tool: Option<Tool>,
    #[serde(default)]
    pub events: Vec<TraceEvent>,
}

fn default_version() -> u32 {
    CURRENT_VERSION
}

impl Trace {
    /// Creates an empty trace for a viewport at the origin.
    pub fn new(size: Size) -> Self {
        Self {
            version: CURRENT_VERSION,
            viewport: ViewportGeometry::new(Point::ORIGIN, size),
            tool: None,
            events: Vec::new(),
        }
    }

    /// Parses a trace from JSON and validates it.
    pub fn from_json(source: &str) -> Result<Self> {
        let trace: Trace = serde_json::from_str(source).context("failed to parse trace json")?;
        trace.validate()?;
        Ok(trace)
    }

    /// Checks version, geometry, ordering and coordinates.
    pub fn validate(&self) -> Result<(), TraceError> {
        if self.version != CURRENT_VERSION {
            return Err(TraceError::UnsupportedVersion {
                found: self.version,
            });
        }
        check_size(self.viewport.size)?;

        let mut previous_ms = 0;
        for (index, event) in self.events.iter().enumerate() {
            if event.at_ms < previous_ms {
                return Err(TraceError::OutOfOrder {
                    index,
                    at_ms: event.at_ms,
                    previous_ms,
                });
            }
            previous_ms = event.at_ms;

            if let TraceInput::TouchStart { touches } = &event.input {
                if touches.is_empty() {
                    return Err(TraceError::EmptyTouchStart { index });
                }
            }
            if event.input.coordinates().iter().any(|v| !v.is_finite()) {
                return Err(TraceError::NonFiniteCoordinate { index });
            }
            if let TraceInput::Resize { viewport } = &event.input {
                check_size(viewport.size)?;
            }
        }
        Ok(())
    }

    /// Time of the last event.
    pub fn duration_ms(&self) -> u64 {
        self.events.last().map_or(0, |event| event.at_ms)
    }
}

fn check_size(size: Size) -> Result<(), TraceError> {
    if size.width > 0.0 && size.height > 0.0 && size.width.is_finite() && size.height.is_finite() {
        Ok(())
    } else {
        Err(TraceError::InvalidViewport {
            width: size.width,
            height: size.height,
        })
    }
}

/// Reads and validates a trace file.
pub fn load_trace(path: &Path) -> Result<Trace> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read trace {}", path.display()))?;
    let trace = Trace::from_json(&source)
        .with_context(|| format!("invalid trace {}", path.display()))?;
    debug!(
        "Loaded trace {} with {} events over {}ms",
        path.display(),
        trace.events.len(),
        trace.duration_ms()
    );
    Ok(trace)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "viewport": { "origin": { "x": 0, "y": 0 }, "size": { "width": 3000, "height": 2000 } },
        "tool": "pen",
        "events": [
            { "at_ms": 0, "type": "touch-start", "touches": [{ "id": 1, "x": 100, "y": 100 }] },
            { "at_ms": 80, "type": "touch-move", "touches": [{ "id": 1, "x": 110, "y": 100 }] },
            { "at_ms": 90, "type": "touch-end", "touches": [] },
            { "at_ms": 95, "type": "wheel", "delta_y": -1, "x": 10, "y": 10 },
            { "at_ms": 100, "type": "accept" }
        ]
    }"#;

    #[test]
    fn parses_tagged_events() {
        let trace = Trace::from_json(SAMPLE).unwrap();
        assert_eq!(trace.version, CURRENT_VERSION);
        assert_eq!(trace.tool, Some(Tool::Pen));
        assert_eq!(trace.events.len(), 5);
        assert_eq!(
            trace.events[1].input,
            TraceInput::TouchMove {
                touches: vec![TouchPoint::new(1, 110.0, 100.0)]
            }
        );
        assert_eq!(trace.events[4].input, TraceInput::Accept);
        assert_eq!(trace.duration_ms(), 100);
    }

    #[test]
    fn rejects_out_of_order_events() {
        let mut trace = Trace::from_json(SAMPLE).unwrap();
        trace.events[2].at_ms = 10;
        assert_eq!(
            trace.validate(),
            Err(TraceError::OutOfOrder {
                index: 2,
                at_ms: 10,
                previous_ms: 80
            })
        );
    }

    #[test]
    fn rejects_bad_viewport_and_version() {
        let mut trace = Trace::new(Size::new(0.0, 600.0));
        assert!(matches!(
            trace.validate(),
            Err(TraceError::InvalidViewport { .. })
        ));

        trace.viewport.size = Size::new(800.0, 600.0);
        trace.version = 7;
        assert_eq!(
            trace.validate(),
            Err(TraceError::UnsupportedVersion { found: 7 })
        );
    }

    #[test]
    fn rejects_empty_touch_start() {
        let mut trace = Trace::new(Size::new(800.0, 600.0));
        trace.events.push(TraceEvent {
            at_ms: 0,
            input: TraceInput::TouchStart { touches: vec![] },
        });
        assert_eq!(
            trace.validate(),
            Err(TraceError::EmptyTouchStart { index: 0 })
        );
    }

    #[test]
    fn load_trace_reports_path_on_error() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        let err = load_trace(&path).unwrap_err();
        assert!(format!("{err:#}").contains("broken.json"));
    }
}
