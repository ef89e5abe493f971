//! Trace replay on a calloop event loop.
//!
//! The loop owns the real commit timer: after every input the driver drains
//! [`InputState::take_timer_command`] and mirrors it onto a calloop
//! [`Timer`] source, removing the previous registration before inserting a new
//! one. Trace events are applied at their recorded offsets, so commit timers
//! fire (or get cancelled) exactly as they would on a device.

mod trace;

pub use trace::{CURRENT_VERSION, Trace, TraceError, TraceEvent, TraceInput, load_trace};

use crate::config::Config;
use crate::diagnostics::DiagnosticsSnapshot;
use crate::draw::CanvasEvent;
use crate::input::{DrawingState, InputState, TimerCommand, Tool, WheelInput};
use crate::util::{Bounds, Point};
use crate::viewport::Transform;
use anyhow::{Context, Result};
use calloop::timer::{TimeoutAction, Timer};
use calloop::{EventLoop, LoopHandle, RegistrationToken};
use chrono::Local;
use log::{debug, info};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Canvas event tagged with the trace time it was produced at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayedEvent {
    pub at_ms: u64,
    #[serde(flatten)]
    pub event: CanvasEvent,
}

/// Outcome of a replay.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub events: Vec<ReplayedEvent>,
    /// Number of events per [`CanvasEvent::kind`]
    pub counts: BTreeMap<&'static str, usize>,
    /// Commit timers that started a stroke
    pub commits: usize,
    /// Commit timers that fired but were no longer current
    pub stale_commits: usize,
    pub final_state: DrawingState,
    pub final_tool: Tool,
    pub transform: Transform,
    pub drawing_bounds: Option<Bounds>,
    pub diagnostics: DiagnosticsSnapshot,
}

impl ReplayReport {
    pub fn count(&self, kind: &str) -> usize {
        self.counts.get(kind).copied().unwrap_or(0)
    }

    /// Segments drawn locally, in order.
    pub fn segments(&self) -> impl Iterator<Item = &crate::draw::Segment> {
        self.events.iter().filter_map(|replayed| match &replayed.event {
            CanvasEvent::Segment(segment) => Some(segment),
            _ => None,
        })
    }

    /// One-line human readable summary.
    pub fn summary(&self) -> String {
        let counts = self
            .counts
            .iter()
            .map(|(kind, count)| format!("{kind}={count}"))
            .collect::<Vec<_>>()
            .join(" ");
        format!(
            "{} events ({}), {} commits, tool {}, state {:?}, scale {:.3}, offset ({:.1}, {:.1})",
            self.events.len(),
            if counts.is_empty() { "none" } else { &counts },
            self.commits,
            self.final_tool,
            self.final_state,
            self.transform.scale,
            self.transform.offset.x,
            self.transform.offset.y,
        )
    }
}

/// State shared with the event loop callbacks.
struct ReplayData {
    input: InputState,
    commit_timer: Option<RegistrationToken>,
    started: Instant,
    events: Vec<ReplayedEvent>,
    commits: usize,
    stale_commits: usize,
}

impl ReplayData {
    fn trace_ms(&self, at: Instant) -> u64 {
        u64::try_from(at.saturating_duration_since(self.started).as_millis()).unwrap_or(u64::MAX)
    }

    fn collect_events(&mut self, at_ms: u64) {
        for event in self.input.take_events() {
            debug!("{} at {}ms", event.kind(), at_ms);
            self.events.push(ReplayedEvent { at_ms, event });
        }
    }
}

/// Replays `trace` through a fresh [`InputState`] built from `config`.
///
/// Runs in real time: the call takes roughly as long as the trace.
pub fn replay(trace: &Trace, config: &Config) -> Result<ReplayReport> {
    trace.validate()?;

    let mut event_loop: EventLoop<'static, ReplayData> =
        EventLoop::try_new().context("failed to create event loop")?;
    let handle = event_loop.handle();

    let started = Instant::now();
    let mut input = InputState::from_config(config, trace.viewport);
    if let Some(tool) = trace.tool {
        input.set_tool(tool, started);
    }
    // The initial tool is setup, not input
    input.take_timer_command();

    let mut data = ReplayData {
        input,
        commit_timer: None,
        started,
        events: Vec::new(),
        commits: 0,
        stale_commits: 0,
    };
    data.collect_events(0);

    info!(
        "Replaying {} events over {}ms",
        trace.events.len(),
        trace.duration_ms()
    );

    for event in &trace.events {
        let at = started + Duration::from_millis(event.at_ms);
        run_until(&mut event_loop, at, &mut data)?;

        apply_input(&mut data.input, &event.input, at);
        data.collect_events(event.at_ms);
        sync_commit_timer(&handle, &mut data, at)?;
    }

    // Let a commit armed by the last event resolve
    let draw_delay = data.input.settings().draw_delay;
    if data.commit_timer.is_some() {
        let deadline = Instant::now() + draw_delay + Duration::from_millis(20);
        while data.commit_timer.is_some() && Instant::now() < deadline {
            run_until(&mut event_loop, deadline, &mut data)?;
        }
    }
    if let Some(token) = data.commit_timer.take() {
        handle.remove(token);
    }

    let mut counts = BTreeMap::new();
    for replayed in &data.events {
        *counts.entry(replayed.event.kind()).or_insert(0) += 1;
    }

    let input = &data.input;
    Ok(ReplayReport {
        counts,
        commits: data.commits,
        stale_commits: data.stale_commits,
        final_state: input.state,
        final_tool: input.tool(),
        transform: input.transform(),
        drawing_bounds: input.drawing_bounds(),
        diagnostics: input.diagnostics_snapshot(),
        events: data.events,
    })
}

/// Dispatches loop sources until `deadline` passes.
///
/// Timers due at or before `deadline` always fire before this returns, so a
/// commit and a trace event at the same instant resolve commit first.
fn run_until(
    event_loop: &mut EventLoop<'static, ReplayData>,
    deadline: Instant,
    data: &mut ReplayData,
) -> Result<()> {
    loop {
        let now = Instant::now();
        let timeout = deadline.saturating_duration_since(now);
        event_loop
            .dispatch(Some(timeout), data)
            .context("event loop dispatch failed")?;
        if now >= deadline {
            return Ok(());
        }
    }
}

/// Mirrors the engine's latest timer instruction onto the event loop.
///
/// Timers are scheduled from the trace time `at`, not the wall clock.
fn sync_commit_timer(
    handle: &LoopHandle<'static, ReplayData>,
    data: &mut ReplayData,
    at: Instant,
) -> Result<()> {
    let Some(command) = data.input.take_timer_command() else {
        return Ok(());
    };

    if let Some(token) = data.commit_timer.take() {
        handle.remove(token);
    }

    match command {
        TimerCommand::Cancel => debug!("Commit timer cancelled"),
        TimerCommand::Arm { ticket, delay } => {
            let token = handle
                .insert_source(
                    Timer::from_deadline(at + delay),
                    move |deadline, _, data: &mut ReplayData| {
                        data.commit_timer = None;
                        if data.input.fire_commit(ticket, deadline) {
                            data.commits += 1;
                        } else {
                            data.stale_commits += 1;
                        }
                        let at_ms = data.trace_ms(deadline);
                        data.collect_events(at_ms);
                        TimeoutAction::Drop
                    },
                )
                .map_err(|e| e.error)
                .context("failed to register commit timer")?;
            debug!(
                "Commit timer armed for session {} in {}ms",
                ticket.session_id,
                delay.as_millis()
            );
            data.commit_timer = Some(token);
        }
    }
    Ok(())
}

fn apply_input(input: &mut InputState, event: &TraceInput, now: Instant) {
    match event {
        TraceInput::TouchStart { touches } => input.touch_start(touches, now),
        TraceInput::TouchMove { touches } => input.touch_move(touches, now),
        TraceInput::TouchEnd { touches } => input.touch_end(touches, now),
        TraceInput::TouchCancel { touches } => input.touch_cancel(touches, now),
        TraceInput::PointerDown { kind, x, y } => input.pointer_down(*kind, Point::new(*x, *y), now),
        TraceInput::PointerMove { kind, x, y } => input.pointer_move(*kind, Point::new(*x, *y), now),
        TraceInput::PointerUp { kind } => input.pointer_up(*kind, now),
        TraceInput::PointerLeave { kind } => input.pointer_leave(*kind, now),
        TraceInput::Wheel { delta_y, x, y } => input.wheel(
            WheelInput {
                delta_y: *delta_y,
                client: Point::new(*x, *y),
            },
            now,
        ),
        TraceInput::ZoomButton { direction } => input.zoom_button(*direction),
        TraceInput::Tool { tool } => input.set_tool(*tool, now),
        TraceInput::Accept => {
            input.accept_drawing(&Local::now(), now);
        }
        TraceInput::Clear => input.clear_drawing(),
        TraceInput::Resize { viewport } => input.resize(*viewport),
        TraceInput::RemoteSegment { segment } => input.apply_remote_segment(*segment),
        TraceInput::RemoteSnapshot => input.apply_remote_snapshot(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::TouchPoint;
    use crate::util::Size;

    fn pen_trace(events: Vec<(u64, TraceInput)>) -> Trace {
        let mut trace = Trace::new(Size::new(3000.0, 2000.0));
        trace.tool = Some(Tool::Pen);
        trace.events = events
            .into_iter()
            .map(|(at_ms, input)| TraceEvent { at_ms, input })
            .collect();
        trace
    }

    fn touches(points: &[(i64, f64, f64)]) -> Vec<TouchPoint> {
        points
            .iter()
            .map(|&(id, x, y)| TouchPoint::new(id, x, y))
            .collect()
    }

    #[test]
    fn commit_timer_fires_and_stroke_draws() {
        let trace = pen_trace(vec![
            (0, TraceInput::TouchStart { touches: touches(&[(1, 100.0, 100.0)]) }),
            (150, TraceInput::TouchMove { touches: touches(&[(1, 110.0, 100.0)]) }),
            (200, TraceInput::TouchEnd { touches: vec![] }),
        ]);

        let report = replay(&trace, &Config::default()).unwrap();

        assert_eq!(report.commits, 1);
        assert_eq!(report.count("segment"), 1);
        assert_eq!(report.count("stroke-finalized"), 1);
        let segment = report.segments().next().unwrap();
        assert_eq!((segment.from_x, segment.from_y), (100.0, 100.0));
        assert_eq!((segment.to_x, segment.to_y), (110.0, 100.0));
        assert_eq!(report.final_state, DrawingState::Idle);
        let bounds = report.drawing_bounds.unwrap();
        assert_eq!((bounds.min_x, bounds.max_x), (100.0, 110.0));
    }

    #[test]
    fn handlers_see_trace_time() {
        let trace = pen_trace(vec![
            (0, TraceInput::TouchStart { touches: touches(&[(1, 100.0, 100.0)]) }),
            (150, TraceInput::TouchMove { touches: touches(&[(1, 110.0, 100.0)]) }),
            (200, TraceInput::TouchEnd { touches: vec![] }),
        ]);

        let first = replay(&trace, &Config::default()).unwrap();
        let second = replay(&trace, &Config::default()).unwrap();

        let timeline: Vec<(&str, u64)> = first
            .diagnostics
            .events
            .iter()
            .map(|record| (record.kind, record.at_ms))
            .collect();
        assert_eq!(
            timeline,
            vec![
                ("tool-change", 0),
                ("touch-start", 0),
                ("commit", 60),
                ("touch-move", 150),
                ("touch-end", 200),
            ]
        );
        assert_eq!(first.diagnostics, second.diagnostics);
        assert_eq!(first.events, second.events);
    }

    #[test]
    fn quick_tap_cancels_commit_timer() {
        let trace = pen_trace(vec![
            (0, TraceInput::TouchStart { touches: touches(&[(1, 100.0, 100.0)]) }),
            (10, TraceInput::TouchEnd { touches: vec![] }),
        ]);

        let report = replay(&trace, &Config::default()).unwrap();

        assert_eq!(report.commits, 0);
        assert_eq!(report.count("segment"), 0);
        assert_eq!(report.drawing_bounds, None);
    }

    #[test]
    fn second_finger_inside_delay_prevents_drawing() {
        let trace = pen_trace(vec![
            (0, TraceInput::TouchStart { touches: touches(&[(1, 100.0, 100.0)]) }),
            (
                10,
                TraceInput::TouchStart {
                    touches: touches(&[(1, 100.0, 100.0), (2, 300.0, 100.0)]),
                },
            ),
            (
                150,
                TraceInput::TouchMove {
                    touches: touches(&[(1, 120.0, 100.0), (2, 320.0, 100.0)]),
                },
            ),
            (200, TraceInput::TouchEnd { touches: vec![] }),
        ]);

        let report = replay(&trace, &Config::default()).unwrap();

        assert_eq!(report.commits, 0);
        assert_eq!(report.count("segment"), 0);
    }

    #[test]
    fn trailing_commit_resolves_before_report() {
        let trace = pen_trace(vec![(
            0,
            TraceInput::TouchStart { touches: touches(&[(1, 100.0, 100.0)]) },
        )]);

        let report = replay(&trace, &Config::default()).unwrap();

        assert_eq!(report.commits, 1);
        assert_eq!(report.final_state, DrawingState::Drawing);
    }

    #[test]
    fn zoom_and_accept_are_reported() {
        let trace = pen_trace(vec![
            (0, TraceInput::ZoomButton { direction: crate::viewport::ZoomDirection::In }),
            (5, TraceInput::Accept),
        ]);

        let report = replay(&trace, &Config::default()).unwrap();

        assert_eq!(report.count("transform-changed"), 1);
        assert!(report.transform.scale > 1.0);
        assert_eq!(report.final_tool, Tool::Pan);
        assert!(report.summary().contains("transform-changed=1"));
    }

    #[test]
    fn invalid_trace_is_rejected() {
        let mut trace = pen_trace(vec![]);
        trace.version = 2;
        let err = replay(&trace, &Config::default()).unwrap_err();
        assert!(err.to_string().contains("Unsupported trace version"));
    }
}
