//! Lerp and spring follower panels. Both chase the pointer.

use gallery_core::draw::{Frame, Surface};
use gallery_core::error::EngineError;
use gallery_core::frame::{FrameInfo, InputEvent, Panel, PanelAction};
use gallery_core::params::{number_schema, param_f64_in, param_string};
use gallery_core::Rgba;
use glam::DVec2;
use serde_json::{json, Value};

use crate::{DampingMode, LerpFollower, SpringFollower, DEFAULT_DAMPING, DEFAULT_LERP_FACTOR, DEFAULT_STIFFNESS, HISTORY_LEN};

const MIN_LERP_FACTOR: f64 = 0.01;
const MAX_LERP_FACTOR: f64 = 0.5;
const MIN_STIFFNESS: f64 = 0.05;
const MAX_STIFFNESS: f64 = 2.0;
const MIN_DAMPING: f64 = 0.0;
const MAX_DAMPING: f64 = 2.0;

fn blue() -> Rgba {
    Rgba::rgb8(0x60, 0xa5, 0xfa)
}

// ---- Lerp ----

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LerpParams {
    pub factor: f64,
}

impl Default for LerpParams {
    fn default() -> Self {
        Self {
            factor: DEFAULT_LERP_FACTOR,
        }
    }
}

impl LerpParams {
    pub fn from_json(params: &Value) -> Self {
        Self::default().merged(params)
    }

    pub fn merged(&self, params: &Value) -> Self {
        Self {
            factor: param_f64_in(params, "factor", self.factor, MIN_LERP_FACTOR, MAX_LERP_FACTOR),
        }
    }
}

/// A ball that eases toward the pointer.
pub struct LerpPanel {
    surface: Surface,
    params: LerpParams,
    follower: LerpFollower,
}

impl LerpPanel {
    pub fn new(surface: Surface, params: LerpParams) -> Self {
        let (cx, cy) = surface.center();
        Self {
            surface,
            params,
            follower: LerpFollower::new(DVec2::new(cx, cy), params.factor),
        }
    }

    pub fn from_json(surface: Surface, params: &Value) -> Self {
        Self::new(surface, LerpParams::from_json(params))
    }

    pub fn follower(&self) -> &LerpFollower {
        &self.follower
    }

    fn recenter(&mut self) {
        let (cx, cy) = self.surface.center();
        log::debug!("lerp: recentering at ({cx}, {cy})");
        self.follower = LerpFollower::new(DVec2::new(cx, cy), self.params.factor);
    }
}

impl Panel for LerpPanel {
    fn name(&self) -> &'static str {
        "lerp"
    }

    fn surface(&self) -> Surface {
        self.surface
    }

    fn update(&mut self, _info: &FrameInfo) -> Result<(), EngineError> {
        self.follower.step();
        Ok(())
    }

    fn render(&self, frame: &mut Frame) {
        let f = &self.follower;
        frame.clear();
        frame.line(
            (f.position.x, f.position.y),
            (f.target.x, f.target.y),
            blue().with_alpha(0x30 as f64 / 255.0),
            2.0,
        );
        frame.fill_circle(f.target.x, f.target.y, 4.0, Rgba::rgb8(0x34, 0xd3, 0x99));
        frame.fill_circle(f.position.x, f.position.y, 8.0, blue());
    }

    fn handle_input(&mut self, event: &InputEvent, _now_ms: f64) -> Result<(), EngineError> {
        match *event {
            InputEvent::PointerMove { x, y } => self.follower.target = DVec2::new(x, y),
            InputEvent::Action {
                action: PanelAction::Reset,
            } => self.recenter(),
            _ => {}
        }
        Ok(())
    }

    fn resize(&mut self, surface: Surface) -> Result<(), EngineError> {
        self.surface = surface;
        log::debug!("lerp: resized to {}x{}", surface.width, surface.height);
        self.recenter();
        Ok(())
    }

    fn params(&self) -> Value {
        json!({ "factor": self.params.factor })
    }

    fn param_schema(&self) -> Value {
        json!({
            "factor": number_schema(
                DEFAULT_LERP_FACTOR,
                MIN_LERP_FACTOR,
                MAX_LERP_FACTOR,
                "Fraction of the remaining gap closed per tick"
            ),
        })
    }

    fn apply_params(&mut self, params: &Value) -> Result<(), EngineError> {
        self.params = self.params.merged(params);
        self.follower.factor = self.params.factor;
        Ok(())
    }
}

// ---- Spring ----

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringParams {
    pub stiffness: f64,
    pub damping: f64,
    pub mode: DampingMode,
}

impl Default for SpringParams {
    fn default() -> Self {
        Self {
            stiffness: DEFAULT_STIFFNESS,
            damping: DEFAULT_DAMPING,
            mode: DampingMode::default(),
        }
    }
}

impl SpringParams {
    pub fn from_json(params: &Value) -> Result<Self, EngineError> {
        Self::default().merged(params)
    }

    pub fn merged(&self, params: &Value) -> Result<Self, EngineError> {
        let mode = match params.get("mode") {
            Some(_) => DampingMode::from_name(&param_string(params, "mode", self.mode.name()))?,
            None => self.mode,
        };
        Ok(Self {
            stiffness: param_f64_in(params, "stiffness", self.stiffness, MIN_STIFFNESS, MAX_STIFFNESS),
            damping: param_f64_in(params, "damping", self.damping, MIN_DAMPING, MAX_DAMPING),
            mode,
        })
    }
}

/// A ball on the right edge that springs to the pointer's height, drawing
/// its recent heights as a trail across the surface.
pub struct SpringPanel {
    surface: Surface,
    params: SpringParams,
    spring: SpringFollower,
}

impl SpringPanel {
    pub fn new(surface: Surface, params: SpringParams) -> Self {
        let mut spring = SpringFollower::new(surface.height / 2.0);
        spring.stiffness = params.stiffness;
        spring.damping = params.damping;
        spring.mode = params.mode;
        Self {
            surface,
            params,
            spring,
        }
    }

    pub fn from_json(surface: Surface, params: &Value) -> Result<Self, EngineError> {
        Ok(Self::new(surface, SpringParams::from_json(params)?))
    }

    pub fn spring(&self) -> &SpringFollower {
        &self.spring
    }
}

impl Panel for SpringPanel {
    fn name(&self) -> &'static str {
        "spring"
    }

    fn surface(&self) -> Surface {
        self.surface
    }

    fn update(&mut self, _info: &FrameInfo) -> Result<(), EngineError> {
        self.spring.step();
        Ok(())
    }

    fn render(&self, frame: &mut Frame) {
        frame.clear();
        let width = self.surface.width;
        let trail: Vec<[f64; 2]> = self
            .spring
            .history()
            .enumerate()
            .map(|(i, y)| [i as f64 / HISTORY_LEN as f64 * width, y])
            .collect();
        frame.polyline(trail, blue().with_alpha(0x50 as f64 / 255.0), 2.0);
        frame.fill_circle(width - 10.0, self.spring.position, 8.0, blue());
    }

    fn handle_input(&mut self, event: &InputEvent, _now_ms: f64) -> Result<(), EngineError> {
        match *event {
            InputEvent::PointerMove { y, .. } => self.spring.target = y,
            InputEvent::Action {
                action: PanelAction::Reset,
            } => {
                log::debug!("spring: reset to {}", self.surface.height / 2.0);
                self.spring.reset(self.surface.height / 2.0);
            }
            _ => {}
        }
        Ok(())
    }

    fn resize(&mut self, surface: Surface) -> Result<(), EngineError> {
        self.surface = surface;
        log::debug!("spring: resized to {}x{}", surface.width, surface.height);
        Ok(())
    }

    fn params(&self) -> Value {
        json!({
            "stiffness": self.params.stiffness,
            "damping": self.params.damping,
            "mode": self.params.mode.name(),
        })
    }

    fn param_schema(&self) -> Value {
        json!({
            "stiffness": number_schema(DEFAULT_STIFFNESS, MIN_STIFFNESS, MAX_STIFFNESS, "Spring constant"),
            "damping": number_schema(
                DEFAULT_DAMPING,
                MIN_DAMPING,
                MAX_DAMPING,
                "Velocity damping, used in explicit mode"
            ),
            "mode": {
                "type": "string",
                "default": DampingMode::default().name(),
                "enum": ["explicit", "derived"],
                "description": "Use the damping parameter or derive 2*sqrt(stiffness)"
            },
        })
    }

    fn apply_params(&mut self, params: &Value) -> Result<(), EngineError> {
        self.params = self.params.merged(params)?;
        self.spring.stiffness = self.params.stiffness;
        self.spring.damping = self.params.damping;
        self.spring.mode = self.params.mode;
        Ok(())
    }
}
