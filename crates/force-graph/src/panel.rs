//! Force-directed graph panel with play/pause and regenerate.

use gallery_core::draw::{Frame, Surface};
use gallery_core::error::EngineError;
use gallery_core::frame::{FrameInfo, InputEvent, Panel, PanelAction};
use gallery_core::palette::Palette;
use gallery_core::params::{number_schema, param_f64_in};
use gallery_core::prng::Xorshift64;
use gallery_core::Rgba;
use serde_json::{json, Value};

use crate::{Graph, LayoutConfig, DEFAULT_DAMPING, DEFAULT_LINK_STRENGTH, DEFAULT_REPULSION};

const MIN_LINK_STRENGTH: f64 = 0.01;
const MAX_LINK_STRENGTH: f64 = 0.1;
const MIN_REPULSION: f64 = 500.0;
const MAX_REPULSION: f64 = 2000.0;
const NODE_COUNT: usize = 15;
const NODE_RADIUS: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceGraphParams {
    pub link_strength: f64,
    pub repulsion: f64,
}

impl Default for ForceGraphParams {
    fn default() -> Self {
        Self {
            link_strength: DEFAULT_LINK_STRENGTH,
            repulsion: DEFAULT_REPULSION,
        }
    }
}

impl ForceGraphParams {
    pub fn from_json(params: &Value) -> Self {
        Self::default().merged(params)
    }

    pub fn merged(&self, params: &Value) -> Self {
        Self {
            link_strength: param_f64_in(
                params,
                "link_strength",
                self.link_strength,
                MIN_LINK_STRENGTH,
                MAX_LINK_STRENGTH,
            ),
            repulsion: param_f64_in(params, "repulsion", self.repulsion, MIN_REPULSION, MAX_REPULSION),
        }
    }

    pub fn layout(&self) -> LayoutConfig {
        LayoutConfig {
            link_strength: self.link_strength,
            repulsion: self.repulsion,
            damping: DEFAULT_DAMPING,
        }
    }
}

pub struct ForceGraphPanel {
    surface: Surface,
    params: ForceGraphParams,
    rng: Xorshift64,
    palette: Palette,
    graph: Graph,
    playing: bool,
}

impl ForceGraphPanel {
    pub fn new(surface: Surface, seed: u64, params: ForceGraphParams) -> Result<Self, EngineError> {
        let mut rng = Xorshift64::new(seed);
        let palette = Palette::accent();
        let graph = Graph::random(surface.width, surface.height, NODE_COUNT, NODE_RADIUS, &palette, &mut rng)?;
        Ok(Self {
            surface,
            params,
            rng,
            palette,
            graph,
            playing: true,
        })
    }

    pub fn from_json(surface: Surface, seed: u64, params: &Value) -> Result<Self, EngineError> {
        Self::new(surface, seed, ForceGraphParams::from_json(params))
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    fn regenerate(&mut self) -> Result<(), EngineError> {
        self.graph = Graph::random(
            self.surface.width,
            self.surface.height,
            NODE_COUNT,
            NODE_RADIUS,
            &self.palette,
            &mut self.rng,
        )?;
        Ok(())
    }
}

impl Panel for ForceGraphPanel {
    fn name(&self) -> &'static str {
        "force_graph"
    }

    fn surface(&self) -> Surface {
        self.surface
    }

    fn update(&mut self, _info: &FrameInfo) -> Result<(), EngineError> {
        if self.playing {
            self.graph
                .step(&self.params.layout(), self.surface.width, self.surface.height);
        }
        Ok(())
    }

    fn render(&self, frame: &mut Frame) {
        frame.clear();
        let faint = Rgba::WHITE.with_alpha(0x20 as f64 / 255.0);
        for edge in self.graph.edges() {
            if let Some((s, t)) = self.graph.endpoints(edge) {
                frame.line((s.pos.x, s.pos.y), (t.pos.x, t.pos.y), faint, 1.0);
            }
        }
        for node in self.graph.nodes() {
            frame.fill_circle(node.pos.x, node.pos.y, node.radius, node.color);
            frame.stroke_circle(node.pos.x, node.pos.y, node.radius, faint);
        }
    }

    fn handle_input(&mut self, event: &InputEvent, _now_ms: f64) -> Result<(), EngineError> {
        match event {
            InputEvent::Action {
                action: PanelAction::TogglePlay,
            } => {
                self.playing = !self.playing;
                log::debug!("force-graph: playing = {}", self.playing);
            }
            InputEvent::Action {
                action: PanelAction::Reset | PanelAction::Regenerate,
            } => self.regenerate()?,
            _ => {}
        }
        Ok(())
    }

    fn resize(&mut self, surface: Surface) -> Result<(), EngineError> {
        self.surface = surface;
        Ok(())
    }

    fn params(&self) -> Value {
        json!({
            "link_strength": self.params.link_strength,
            "repulsion": self.params.repulsion,
        })
    }

    fn param_schema(&self) -> Value {
        json!({
            "link_strength": number_schema(
                DEFAULT_LINK_STRENGTH,
                MIN_LINK_STRENGTH,
                MAX_LINK_STRENGTH,
                "Spring constant along edges"
            ),
            "repulsion": number_schema(
                DEFAULT_REPULSION,
                MIN_REPULSION,
                MAX_REPULSION,
                "Inverse-square repulsion between every pair of nodes"
            ),
        })
    }

    fn apply_params(&mut self, params: &Value) -> Result<(), EngineError> {
        self.params = self.params.merged(params);
        Ok(())
    }
}
