//! Input timing panel: raw, throttled and debounced pointer dots side by side.

use gallery_core::draw::{Frame, Surface};
use gallery_core::error::EngineError;
use gallery_core::frame::{FrameInfo, InputEvent, Panel, PanelAction};
use gallery_core::params::{number_schema, param_bool, param_f64_in};
use gallery_core::Rgba;
use glam::DVec2;
use serde_json::{json, Value};

use crate::{EventKind, EventTimeline, DEFAULT_DEBOUNCE_MS, DEFAULT_THROTTLE_MS};

const MIN_DEBOUNCE_MS: f64 = 100.0;
const MAX_DEBOUNCE_MS: f64 = 1000.0;
const MIN_THROTTLE_MS: f64 = 50.0;
const MAX_THROTTLE_MS: f64 = 500.0;
const GRID_SPACING: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventsParams {
    pub debounce_ms: f64,
    pub throttle_ms: f64,
    pub show_trails: bool,
}

impl Default for EventsParams {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            throttle_ms: DEFAULT_THROTTLE_MS,
            show_trails: true,
        }
    }
}

impl EventsParams {
    pub fn from_json(params: &Value) -> Self {
        Self::default().merged(params)
    }

    pub fn merged(&self, params: &Value) -> Self {
        Self {
            debounce_ms: param_f64_in(
                params,
                "debounce_ms",
                self.debounce_ms,
                MIN_DEBOUNCE_MS,
                MAX_DEBOUNCE_MS,
            ),
            throttle_ms: param_f64_in(
                params,
                "throttle_ms",
                self.throttle_ms,
                MIN_THROTTLE_MS,
                MAX_THROTTLE_MS,
            ),
            show_trails: param_bool(params, "show_trails", self.show_trails),
        }
    }
}

fn style(kind: EventKind) -> (Rgba, f64) {
    match kind {
        EventKind::Raw => (Rgba::rgb8(96, 165, 250), 4.0),
        EventKind::Throttled => (Rgba::rgb8(52, 211, 153), 8.0),
        EventKind::Debounced => (Rgba::rgb8(248, 113, 113), 12.0),
    }
}

pub struct EventsPanel {
    surface: Surface,
    params: EventsParams,
    timeline: EventTimeline,
    now_ms: f64,
}

impl EventsPanel {
    pub fn new(surface: Surface, params: EventsParams) -> Self {
        Self {
            surface,
            params,
            timeline: EventTimeline::new(params.debounce_ms, params.throttle_ms),
            now_ms: 0.0,
        }
    }

    pub fn from_json(surface: Surface, params: &Value) -> Self {
        Self::new(surface, EventsParams::from_json(params))
    }

    pub fn timeline(&self) -> &EventTimeline {
        &self.timeline
    }
}

impl Panel for EventsPanel {
    fn name(&self) -> &'static str {
        "events"
    }

    fn surface(&self) -> Surface {
        self.surface
    }

    fn update(&mut self, info: &FrameInfo) -> Result<(), EngineError> {
        self.now_ms = info.now_ms;
        self.timeline.poll(info.now_ms);
        Ok(())
    }

    fn render(&self, frame: &mut Frame) {
        if self.params.show_trails {
            frame.fade(Rgba::rgb8(17, 24, 39).with_alpha(0.3));
        } else {
            frame.clear();
        }

        let (w, h) = (self.surface.width, self.surface.height);
        let grid = Rgba::WHITE.with_alpha(0x10 as f64 / 255.0);
        let mut x = 0.0;
        while x < w {
            frame.line((x, 0.0), (x, h), grid, 1.0);
            x += GRID_SPACING;
        }
        let mut y = 0.0;
        while y < h {
            frame.line((0.0, y), (w, y), grid, 1.0);
            y += GRID_SPACING;
        }

        for dot in self.timeline.dots() {
            let (color, size) = style(dot.kind);
            frame.fill_circle(dot.pos.x, dot.pos.y, size, color.with_alpha(dot.alpha(self.now_ms)));
        }

        for (i, kind) in EventKind::ALL.into_iter().enumerate() {
            let y = 30.0 + i as f64 * 30.0;
            let (color, size) = style(kind);
            frame.fill_circle(26.0, y - 4.0, size, color);
            frame.text(40.0, y, kind.label(), Rgba::WHITE, 14.0);
        }
    }

    fn handle_input(&mut self, event: &InputEvent, now_ms: f64) -> Result<(), EngineError> {
        match *event {
            InputEvent::PointerMove { x, y } => {
                self.now_ms = now_ms;
                self.timeline.record(DVec2::new(x, y), now_ms);
            }
            InputEvent::Action {
                action: PanelAction::Reset,
            } => self.timeline.clear(),
            InputEvent::Action {
                action: PanelAction::TogglePlay,
            } => self.params.show_trails = !self.params.show_trails,
            _ => {}
        }
        Ok(())
    }

    fn resize(&mut self, surface: Surface) -> Result<(), EngineError> {
        self.surface = surface;
        Ok(())
    }

    fn teardown(&mut self) {
        self.timeline.cancel();
        log::debug!("events: teardown cancelled pending debounce");
    }

    fn params(&self) -> Value {
        json!({
            "debounce_ms": self.params.debounce_ms,
            "throttle_ms": self.params.throttle_ms,
            "show_trails": self.params.show_trails,
        })
    }

    fn param_schema(&self) -> Value {
        json!({
            "debounce_ms": number_schema(
                DEFAULT_DEBOUNCE_MS,
                MIN_DEBOUNCE_MS,
                MAX_DEBOUNCE_MS,
                "Quiet period before the debounced dot appears"
            ),
            "throttle_ms": number_schema(
                DEFAULT_THROTTLE_MS,
                MIN_THROTTLE_MS,
                MAX_THROTTLE_MS,
                "Minimum spacing between throttled dots"
            ),
            "show_trails": {
                "type": "boolean",
                "default": true,
                "description": "Fade the previous frame instead of clearing it"
            },
        })
    }

    fn apply_params(&mut self, params: &Value) -> Result<(), EngineError> {
        self.params = self.params.merged(params);
        self.timeline.set_debounce_ms(self.params.debounce_ms);
        self.timeline.set_throttle_ms(self.params.throttle_ms);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gallery_core::frame::FrameLoop;
    use gallery_core::DrawCommand;

    fn panel() -> EventsPanel {
        EventsPanel::new(Surface::css(300.0, 200.0).unwrap(), EventsParams::default())
    }

    #[test]
    fn pointer_moves_through_the_loop_produce_all_three_kinds() {
        let mut lp = FrameLoop::new(panel());
        lp.start();
        let mut t = 0.0;
        for i in 0..20 {
            lp.dispatch(InputEvent::PointerMove { x: i as f64 * 5.0, y: 50.0 });
            lp.tick(t).unwrap();
            t += 16.0;
        }
        for _ in 0..40 {
            lp.tick(t).unwrap();
            t += 16.0;
        }
        let tl = lp.panel().unwrap().timeline();
        assert_eq!(tl.count(EventKind::Raw), 20);
        assert!(tl.count(EventKind::Throttled) >= 3);
        assert_eq!(tl.count(EventKind::Debounced), 1);
    }

    #[test]
    fn teardown_cancels_pending_debounce() {
        let mut p = panel();
        p.handle_input(&InputEvent::PointerMove { x: 1.0, y: 1.0 }, 0.0)
            .unwrap();
        assert!(p.timeline().debounce_pending());
        p.teardown();
        assert!(!p.timeline().debounce_pending());
    }

    #[test]
    fn delays_are_clamped() {
        let mut p = panel();
        p.apply_params(&json!({"debounce_ms": 5.0, "throttle_ms": 9000.0}))
            .unwrap();
        assert_eq!(p.params()["debounce_ms"], MIN_DEBOUNCE_MS);
        assert_eq!(p.params()["throttle_ms"], MAX_THROTTLE_MS);
    }

    #[test]
    fn trails_toggle_switches_fade_and_clear() {
        let mut p = panel();
        let mut frame = Frame::new(p.surface());
        p.render(&mut frame);
        assert!(matches!(frame.commands()[0], DrawCommand::Fade { .. }));
        p.apply_params(&json!({"show_trails": false})).unwrap();
        let mut frame = Frame::new(p.surface());
        p.render(&mut frame);
        assert_eq!(frame.commands()[0], DrawCommand::Clear);
    }

    #[test]
    fn reset_clears_dots() {
        let mut p = panel();
        p.handle_input(&InputEvent::PointerMove { x: 1.0, y: 1.0 }, 0.0)
            .unwrap();
        p.handle_input(&InputEvent::Action { action: PanelAction::Reset }, 0.0)
            .unwrap();
        assert!(p.timeline().dots().is_empty());
        assert!(!p.timeline().debounce_pending());
    }
}
