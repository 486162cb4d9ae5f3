//! The `Panel` trait and the frame loop that drives it.
//!
//! A [`FrameLoop`] owns exactly one panel. Each [`tick`](FrameLoop::tick)
//! drains queued input, advances the panel one step and asks it to render a
//! [`Frame`]. Time comes from the caller (or a [`Clock`]) so loops can be
//! driven deterministically in tests and from the CLI.

use std::collections::VecDeque;
use std::time::Instant;

use crate::draw::{Frame, Surface};
use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Timing for the tick being processed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    /// Zero-based count of ticks that reached `update`.
    pub index: u64,
    /// Timestamp of this tick in milliseconds.
    pub now_ms: f64,
    /// Milliseconds since the previous tick (0 on the first).
    pub dt_ms: f64,
}

/// Discrete control-surface actions a host can send to a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelAction {
    /// Discard state and regenerate from the panel's seed.
    Reset,
    /// Flip between playing and paused simulation.
    TogglePlay,
    /// Start the panel's algorithm (e.g. a path search).
    Run,
    /// Draw a fresh random layout without resetting parameters.
    Regenerate,
}

/// Input delivered to a panel between frames, in surface-relative CSS pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    PointerMove { x: f64, y: f64 },
    PointerDown { x: f64, y: f64 },
    PointerUp,
    Wheel { x: f64, y: f64, delta_y: f64 },
    Resize { surface: Surface },
    Action { action: PanelAction },
}

/// A visualization driven by a [`FrameLoop`].
///
/// This trait is **object-safe**: `Box<dyn Panel>` works for runtime panel
/// selection.
pub trait Panel {
    /// Registry name, e.g. `"quadtree"`.
    fn name(&self) -> &'static str;

    /// Current drawing surface.
    fn surface(&self) -> Surface;

    /// Advance the simulation by one tick.
    fn update(&mut self, info: &FrameInfo) -> Result<(), EngineError>;

    /// Emit draw commands for the current state.
    fn render(&self, frame: &mut Frame);

    /// React to pointer input or an action. `now_ms` is the loop time at
    /// which the event is dispatched.
    fn handle_input(&mut self, _event: &InputEvent, _now_ms: f64) -> Result<(), EngineError> {
        Ok(())
    }

    /// Adopt a new surface size, rebuilding any size-dependent state.
    fn resize(&mut self, surface: Surface) -> Result<(), EngineError>;

    /// Release timers and pending work. Called once when the loop is cancelled.
    fn teardown(&mut self) {}

    /// Current parameter values as a JSON object.
    fn params(&self) -> Value;

    /// Schema describing all parameters, their types, ranges, and defaults.
    fn param_schema(&self) -> Value;

    /// Merge a (possibly partial) JSON object into the current parameters,
    /// clamping values to their documented ranges.
    fn apply_params(&mut self, params: &Value) -> Result<(), EngineError>;
}

impl<P: Panel + ?Sized> Panel for Box<P> {
    fn name(&self) -> &'static str {
        (**self).name()
    }
    fn surface(&self) -> Surface {
        (**self).surface()
    }
    fn update(&mut self, info: &FrameInfo) -> Result<(), EngineError> {
        (**self).update(info)
    }
    fn render(&self, frame: &mut Frame) {
        (**self).render(frame)
    }
    fn handle_input(&mut self, event: &InputEvent, now_ms: f64) -> Result<(), EngineError> {
        (**self).handle_input(event, now_ms)
    }
    fn resize(&mut self, surface: Surface) -> Result<(), EngineError> {
        (**self).resize(surface)
    }
    fn teardown(&mut self) {
        (**self).teardown()
    }
    fn params(&self) -> Value {
        (**self).params()
    }
    fn param_schema(&self) -> Value {
        (**self).param_schema()
    }
    fn apply_params(&mut self, params: &Value) -> Result<(), EngineError> {
        (**self).apply_params(params)
    }
}

// ---------------------------------------------------------------------------
// Clocks
// ---------------------------------------------------------------------------

/// Millisecond time source.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Clock advanced by hand; used by tests and the headless CLI.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ms: f64,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self { now_ms: start_ms }
    }

    pub fn advance(&mut self, ms: f64) {
        self.now_ms += ms;
    }

    pub fn set(&mut self, now_ms: f64) {
        self.now_ms = now_ms;
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now_ms
    }
}

/// Wall-clock time elapsed since construction.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

// ---------------------------------------------------------------------------
// FPS
// ---------------------------------------------------------------------------

/// Frames-per-second estimate refreshed once per elapsed second.
#[derive(Debug, Clone, Default)]
pub struct FpsCounter {
    window_start: Option<f64>,
    frames: u32,
    fps: u32,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one frame at `now_ms`; returns the new estimate when a full
    /// second has elapsed since the window opened.
    pub fn record(&mut self, now_ms: f64) -> Option<u32> {
        let start = *self.window_start.get_or_insert(now_ms);
        self.frames += 1;
        let elapsed = now_ms - start;
        if elapsed >= 1000.0 {
            self.fps = (self.frames as f64 * 1000.0 / elapsed).round() as u32;
            self.frames = 0;
            self.window_start = Some(now_ms);
            Some(self.fps)
        } else {
            None
        }
    }

    /// Most recent estimate (0 until the first second completes).
    pub fn fps(&self) -> u32 {
        self.fps
    }
}

// ---------------------------------------------------------------------------
// FrameLoop
// ---------------------------------------------------------------------------

/// Lifecycle of a [`FrameLoop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Constructed; ticks do nothing until [`FrameLoop::start`].
    Idle,
    /// Ticks update then render.
    Running,
    /// Ticks render the frozen state without updating.
    Paused,
    /// Panel torn down; every further call is a no-op.
    Cancelled,
}

/// Exclusive owner of one panel, scheduling update-then-render per tick.
pub struct FrameLoop<P: Panel> {
    panel: Option<P>,
    state: LoopState,
    pending: VecDeque<InputEvent>,
    frame_index: u64,
    last_tick_ms: Option<f64>,
    fps: FpsCounter,
}

impl<P: Panel> FrameLoop<P> {
    pub fn new(panel: P) -> Self {
        Self {
            panel: Some(panel),
            state: LoopState::Idle,
            pending: VecDeque::new(),
            frame_index: 0,
            last_tick_ms: None,
            fps: FpsCounter::new(),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// The owned panel, or `None` once cancelled.
    pub fn panel(&self) -> Option<&P> {
        self.panel.as_ref()
    }

    /// Ticks that have reached `update` so far.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn fps(&self) -> u32 {
        self.fps.fps()
    }

    /// Number of queued, undispatched events.
    pub fn pending_events(&self) -> usize {
        self.pending.len()
    }

    pub fn start(&mut self) {
        if self.state == LoopState::Idle {
            log::debug!("frame loop: start ({})", self.panel_name());
            self.state = LoopState::Running;
        }
    }

    pub fn pause(&mut self) {
        if self.state == LoopState::Running {
            log::debug!("frame loop: pause ({})", self.panel_name());
            self.state = LoopState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state == LoopState::Paused {
            log::debug!("frame loop: resume ({})", self.panel_name());
            self.state = LoopState::Running;
        }
    }

    /// Tears the panel down and drops it. Queued events are discarded.
    pub fn cancel(&mut self) {
        if self.state == LoopState::Cancelled {
            return;
        }
        log::debug!("frame loop: cancel ({})", self.panel_name());
        self.state = LoopState::Cancelled;
        self.pending.clear();
        if let Some(mut panel) = self.panel.take() {
            panel.teardown();
        }
    }

    /// Queues an event for the next tick. Returns `false` once cancelled.
    pub fn dispatch(&mut self, event: InputEvent) -> bool {
        if self.state == LoopState::Cancelled {
            return false;
        }
        self.pending.push_back(event);
        true
    }

    /// Runs one scheduling step at `now_ms`.
    ///
    /// Returns the rendered frame, or `None` while idle or after cancel.
    /// Rejected input is logged and dropped; update failures propagate.
    pub fn tick(&mut self, now_ms: f64) -> Result<Option<Frame>, EngineError> {
        if !matches!(self.state, LoopState::Running | LoopState::Paused) {
            return Ok(None);
        }
        let Some(panel) = self.panel.as_mut() else {
            return Ok(None);
        };

        while let Some(event) = self.pending.pop_front() {
            let result = match &event {
                InputEvent::Resize { surface } => panel.resize(*surface),
                other => panel.handle_input(other, now_ms),
            };
            if let Err(e) = result {
                log::warn!("{}: rejected input {:?}: {e}", panel.name(), event);
            }
        }

        if self.state == LoopState::Running {
            let dt_ms = self.last_tick_ms.map_or(0.0, |last| now_ms - last);
            let info = FrameInfo {
                index: self.frame_index,
                now_ms,
                dt_ms,
            };
            log::trace!("{}: update #{} dt={dt_ms:.2}ms", panel.name(), info.index);
            panel.update(&info)?;
            self.frame_index += 1;
        }
        self.last_tick_ms = Some(now_ms);

        let mut frame = Frame::new(panel.surface());
        panel.render(&mut frame);
        self.fps.record(now_ms);
        Ok(Some(frame))
    }

    /// [`tick`](Self::tick) at the clock's current time.
    pub fn tick_with(&mut self, clock: &dyn Clock) -> Result<Option<Frame>, EngineError> {
        self.tick(clock.now_ms())
    }

    fn panel_name(&self) -> &'static str {
        self.panel.as_ref().map_or("<cancelled>", |p| p.name())
    }
}

impl<P: Panel> Drop for FrameLoop<P> {
    fn drop(&mut self) {
        if let Some(mut panel) = self.panel.take() {
            panel.teardown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    type CallLog = Rc<RefCell<Vec<String>>>;

    /// Panel that records every trait call it receives.
    struct MockPanel {
        surface: Surface,
        calls: CallLog,
        updates: u32,
        fail_update: bool,
    }

    impl MockPanel {
        fn new(calls: CallLog) -> Self {
            Self {
                surface: Surface::css(100.0, 50.0).unwrap(),
                calls,
                updates: 0,
                fail_update: false,
            }
        }

        fn log(&self, s: impl Into<String>) {
            self.calls.borrow_mut().push(s.into());
        }
    }

    impl Panel for MockPanel {
        fn name(&self) -> &'static str {
            "mock"
        }
        fn surface(&self) -> Surface {
            self.surface
        }
        fn update(&mut self, info: &FrameInfo) -> Result<(), EngineError> {
            self.log(format!("update {}", info.index));
            if self.fail_update {
                return Err(EngineError::invalid_input("boom"));
            }
            self.updates += 1;
            Ok(())
        }
        fn render(&self, frame: &mut Frame) {
            self.log("render");
            frame.clear();
        }
        fn handle_input(&mut self, event: &InputEvent, _now_ms: f64) -> Result<(), EngineError> {
            self.log(format!("input {event:?}"));
            match event {
                InputEvent::PointerDown { x, .. } if *x < 0.0 => {
                    Err(EngineError::invalid_input("negative x"))
                }
                _ => Ok(()),
            }
        }
        fn resize(&mut self, surface: Surface) -> Result<(), EngineError> {
            self.log("resize");
            self.surface = surface;
            Ok(())
        }
        fn teardown(&mut self) {
            self.log("teardown");
        }
        fn params(&self) -> Value {
            json!({"updates": self.updates})
        }
        fn param_schema(&self) -> Value {
            json!({"updates": {"type": "integer", "default": 0}})
        }
        fn apply_params(&mut self, _params: &Value) -> Result<(), EngineError> {
            Ok(())
        }
    }

    fn mock_loop() -> (FrameLoop<MockPanel>, CallLog) {
        let calls: CallLog = Rc::default();
        (FrameLoop::new(MockPanel::new(calls.clone())), calls)
    }

    // ---- Panel trait ----

    #[test]
    fn panel_trait_is_object_safe() {
        let calls: CallLog = Rc::default();
        let panel: Box<dyn Panel> = Box::new(MockPanel::new(calls));
        assert_eq!(panel.name(), "mock");
        let mut lp = FrameLoop::new(panel);
        lp.start();
        assert!(lp.tick(0.0).unwrap().is_some());
    }

    #[test]
    fn input_event_json_shape() {
        let e = InputEvent::Action {
            action: PanelAction::TogglePlay,
        };
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(v, json!({"type": "action", "action": "toggle_play"}));
        let back: InputEvent =
            serde_json::from_value(json!({"type": "pointer_down", "x": 3.0, "y": 4.0})).unwrap();
        assert_eq!(back, InputEvent::PointerDown { x: 3.0, y: 4.0 });
    }

    // ---- FrameLoop lifecycle ----

    #[test]
    fn idle_loop_does_not_tick() {
        let (mut lp, calls) = mock_loop();
        assert_eq!(lp.state(), LoopState::Idle);
        assert!(lp.tick(0.0).unwrap().is_none());
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn running_tick_updates_then_renders() {
        let (mut lp, calls) = mock_loop();
        lp.start();
        let frame = lp.tick(16.0).unwrap().unwrap();
        assert_eq!(frame.len(), 1);
        assert_eq!(*calls.borrow(), vec!["update 0", "render"]);
        assert_eq!(lp.frame_index(), 1);
    }

    #[test]
    fn events_are_dispatched_before_update() {
        let (mut lp, calls) = mock_loop();
        lp.start();
        lp.dispatch(InputEvent::PointerMove { x: 1.0, y: 2.0 });
        lp.dispatch(InputEvent::Resize {
            surface: Surface::css(10.0, 10.0).unwrap(),
        });
        assert_eq!(lp.pending_events(), 2);
        let frame = lp.tick(0.0).unwrap().unwrap();
        let log = calls.borrow();
        assert!(log[0].starts_with("input PointerMove"));
        assert_eq!(log[1], "resize");
        assert_eq!(log[2], "update 0");
        assert_eq!(frame.surface().width, 10.0);
        assert_eq!(lp.pending_events(), 0);
    }

    #[test]
    fn paused_loop_renders_without_updating() {
        let (mut lp, calls) = mock_loop();
        lp.start();
        lp.tick(0.0).unwrap();
        lp.pause();
        assert_eq!(lp.state(), LoopState::Paused);
        lp.tick(16.0).unwrap();
        lp.tick(32.0).unwrap();
        assert_eq!(lp.panel().unwrap().updates, 1);
        assert_eq!(calls.borrow().iter().filter(|c| *c == "render").count(), 3);
        lp.resume();
        lp.tick(48.0).unwrap();
        assert_eq!(lp.panel().unwrap().updates, 2);
    }

    #[test]
    fn dt_measures_time_between_ticks() {
        struct DtPanel(Vec<f64>);
        impl Panel for DtPanel {
            fn name(&self) -> &'static str {
                "dt"
            }
            fn surface(&self) -> Surface {
                Surface::css(1.0, 1.0).unwrap()
            }
            fn update(&mut self, info: &FrameInfo) -> Result<(), EngineError> {
                self.0.push(info.dt_ms);
                Ok(())
            }
            fn render(&self, _frame: &mut Frame) {}
            fn resize(&mut self, _surface: Surface) -> Result<(), EngineError> {
                Ok(())
            }
            fn params(&self) -> Value {
                json!({})
            }
            fn param_schema(&self) -> Value {
                json!({})
            }
            fn apply_params(&mut self, _params: &Value) -> Result<(), EngineError> {
                Ok(())
            }
        }
        let mut lp = FrameLoop::new(DtPanel(Vec::new()));
        let mut clock = ManualClock::new(100.0);
        lp.start();
        lp.tick_with(&clock).unwrap();
        clock.advance(16.0);
        lp.tick_with(&clock).unwrap();
        clock.advance(20.0);
        lp.tick_with(&clock).unwrap();
        assert_eq!(lp.panel().unwrap().0, vec![0.0, 16.0, 20.0]);
    }

    #[test]
    fn cancel_tears_down_once_and_never_touches_panel_again() {
        let (mut lp, calls) = mock_loop();
        lp.start();
        lp.tick(0.0).unwrap();
        lp.dispatch(InputEvent::PointerUp);
        lp.cancel();
        lp.cancel();
        let before = calls.borrow().len();
        assert_eq!(calls.borrow().last().unwrap(), "teardown");
        assert!(lp.tick(16.0).unwrap().is_none());
        assert!(!lp.dispatch(InputEvent::PointerUp));
        lp.start();
        lp.resume();
        assert!(lp.tick(32.0).unwrap().is_none());
        assert_eq!(calls.borrow().len(), before);
        assert!(lp.panel().is_none());
        drop(lp);
        assert_eq!(calls.borrow().iter().filter(|c| *c == "teardown").count(), 1);
    }

    #[test]
    fn drop_tears_down_live_panel() {
        let (lp, calls) = mock_loop();
        drop(lp);
        assert_eq!(*calls.borrow(), vec!["teardown"]);
    }

    #[test]
    fn rejected_input_is_dropped_not_fatal() {
        let (mut lp, calls) = mock_loop();
        lp.start();
        lp.dispatch(InputEvent::PointerDown { x: -1.0, y: 0.0 });
        assert!(lp.tick(0.0).unwrap().is_some());
        assert!(calls.borrow().contains(&"update 0".to_string()));
    }

    #[test]
    fn update_error_propagates() {
        let calls: CallLog = Rc::default();
        let mut failing = MockPanel::new(calls);
        failing.fail_update = true;
        let mut lp = FrameLoop::new(failing);
        lp.start();
        assert!(lp.tick(0.0).is_err());
        assert_eq!(lp.frame_index(), 0);
    }

    // ---- FpsCounter ----

    #[test]
    fn fps_counter_reports_once_per_second() {
        let mut fps = FpsCounter::new();
        let mut reported = None;
        for i in 0..=60 {
            if let Some(v) = fps.record(i as f64 * 1000.0 / 60.0) {
                reported = Some(v);
            }
        }
        assert_eq!(reported, Some(61));
        assert_eq!(fps.fps(), 61);
    }

    #[test]
    fn fps_counter_starts_at_zero() {
        let mut fps = FpsCounter::new();
        assert_eq!(fps.record(0.0), None);
        assert_eq!(fps.fps(), 0);
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
    }
}
