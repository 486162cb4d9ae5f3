//! Freehand stroke panel.
//!
//! Pressing starts a new stroke, dragging extends it, releasing ends it. The
//! stroke is drawn as a Catmull-Rom curve once it has four points and as a
//! plain polyline before that.

use gallery_core::draw::{Frame, Surface};
use gallery_core::error::EngineError;
use gallery_core::frame::{FrameInfo, InputEvent, Panel, PanelAction};
use gallery_core::params::param_usize_in;
use gallery_core::Rgba;
use glam::DVec2;
use serde_json::{json, Value};

use crate::{smooth_stroke, DEFAULT_SUBDIVISIONS};

const MIN_SUBDIVISIONS: usize = 1;
const MAX_SUBDIVISIONS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureParams {
    pub subdivisions: usize,
}

impl Default for GestureParams {
    fn default() -> Self {
        Self {
            subdivisions: DEFAULT_SUBDIVISIONS,
        }
    }
}

impl GestureParams {
    pub fn from_json(params: &Value) -> Self {
        Self::default().merged(params)
    }

    pub fn merged(&self, params: &Value) -> Self {
        Self {
            subdivisions: param_usize_in(
                params,
                "subdivisions",
                self.subdivisions,
                MIN_SUBDIVISIONS,
                MAX_SUBDIVISIONS,
            ),
        }
    }
}

pub struct GesturePanel {
    surface: Surface,
    params: GestureParams,
    stroke: Vec<DVec2>,
    drawing: bool,
}

impl GesturePanel {
    pub fn new(surface: Surface, params: GestureParams) -> Self {
        Self {
            surface,
            params,
            stroke: Vec::new(),
            drawing: false,
        }
    }

    pub fn from_json(surface: Surface, params: &Value) -> Self {
        Self::new(surface, GestureParams::from_json(params))
    }

    /// Raw points of the current stroke.
    pub fn stroke(&self) -> &[DVec2] {
        &self.stroke
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    /// The curve that will be drawn for the current stroke.
    pub fn curve(&self) -> Vec<DVec2> {
        smooth_stroke(&self.stroke, self.params.subdivisions)
    }
}

impl Panel for GesturePanel {
    fn name(&self) -> &'static str {
        "gesture"
    }

    fn surface(&self) -> Surface {
        self.surface
    }

    fn update(&mut self, _info: &FrameInfo) -> Result<(), EngineError> {
        Ok(())
    }

    fn render(&self, frame: &mut Frame) {
        frame.clear();
        let blue = Rgba::rgb8(0x60, 0xa5, 0xfa);
        let curve = self.curve().iter().map(|p| [p.x, p.y]).collect();
        frame.polyline(curve, blue, 2.0);
        if self.stroke.len() >= 4 {
            let green = Rgba::rgb8(0x34, 0xd3, 0x99);
            for p in &self.stroke {
                frame.fill_circle(p.x, p.y, 3.0, green);
            }
        }
    }

    fn handle_input(&mut self, event: &InputEvent, _now_ms: f64) -> Result<(), EngineError> {
        match *event {
            InputEvent::PointerDown { x, y } => {
                self.drawing = true;
                self.stroke.clear();
                self.stroke.push(DVec2::new(x, y));
            }
            InputEvent::PointerMove { x, y } if self.drawing => self.stroke.push(DVec2::new(x, y)),
            InputEvent::PointerUp => self.drawing = false,
            InputEvent::Action {
                action: PanelAction::Reset,
            } => {
                self.stroke.clear();
                self.drawing = false;
            }
            _ => {}
        }
        Ok(())
    }

    fn resize(&mut self, surface: Surface) -> Result<(), EngineError> {
        self.surface = surface;
        Ok(())
    }

    fn params(&self) -> Value {
        json!({ "subdivisions": self.params.subdivisions })
    }

    fn param_schema(&self) -> Value {
        json!({
            "subdivisions": {
                "type": "integer",
                "default": DEFAULT_SUBDIVISIONS,
                "min": MIN_SUBDIVISIONS,
                "max": MAX_SUBDIVISIONS,
                "description": "Curve samples per stroke segment"
            },
        })
    }

    fn apply_params(&mut self, params: &Value) -> Result<(), EngineError> {
        self.params = self.params.merged(params);
        Ok(())
    }
}
