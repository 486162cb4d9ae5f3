#![deny(unsafe_code)]
//! Panel registry: maps panel names to implementations and provides CPU-side
//! rasterization and snapshot writing.
//!
//! This crate sits between `gallery-core` (which defines the `Panel` trait)
//! and the individual algorithm crates. The CLI depends on it so that name
//! dispatch lives in one place.

pub mod pixel;

#[cfg(feature = "png")]
pub mod snapshot;

use gallery_collision::CollisionPanel;
use gallery_core::draw::{Frame, Surface};
use gallery_core::error::EngineError;
use gallery_core::frame::{FrameInfo, InputEvent, Panel};
use gallery_core::Seed;
use gallery_curves::{GesturePanel, LineChartPanel};
use gallery_events::EventsPanel;
use gallery_filters::FiltersPanel;
use gallery_force_graph::ForceGraphPanel;
use gallery_motion::{LerpPanel, SpringPanel};
use gallery_partition::{BspPanel, VoronoiPanel};
use gallery_pathfinding::PathfindingPanel;
use gallery_perlin::PerlinPanel;
use gallery_quadtree::QuadTreePanel;
use serde_json::Value;

/// All available panel names, in gallery order.
const PANEL_NAMES: &[&str] = &[
    "perlin",
    "quadtree",
    "pathfinding",
    "collision",
    "force_graph",
    "lerp",
    "spring",
    "gesture",
    "line_chart",
    "events",
    "voronoi",
    "bsp",
    "filters",
];

/// Enumeration of every gallery panel.
///
/// Wraps each implementation and delegates the `Panel` trait methods.
/// Use [`PanelKind::from_name`] for string-based construction.
pub enum PanelKind {
    Perlin(PerlinPanel),
    QuadTree(QuadTreePanel),
    Pathfinding(PathfindingPanel),
    Collision(CollisionPanel),
    ForceGraph(ForceGraphPanel),
    Lerp(LerpPanel),
    Spring(SpringPanel),
    Gesture(GesturePanel),
    LineChart(LineChartPanel),
    Events(EventsPanel),
    Voronoi(VoronoiPanel),
    Bsp(BspPanel),
    Filters(FiltersPanel),
}

macro_rules! each_panel {
    ($kind:expr, $p:ident => $body:expr) => {
        match $kind {
            PanelKind::Perlin($p) => $body,
            PanelKind::QuadTree($p) => $body,
            PanelKind::Pathfinding($p) => $body,
            PanelKind::Collision($p) => $body,
            PanelKind::ForceGraph($p) => $body,
            PanelKind::Lerp($p) => $body,
            PanelKind::Spring($p) => $body,
            PanelKind::Gesture($p) => $body,
            PanelKind::LineChart($p) => $body,
            PanelKind::Events($p) => $body,
            PanelKind::Voronoi($p) => $body,
            PanelKind::Bsp($p) => $body,
            PanelKind::Filters($p) => $body,
        }
    };
}

impl PanelKind {
    /// Constructs a panel by name.
    ///
    /// Panels without randomness ignore `seed`. Returns
    /// `EngineError::UnknownPanel` if the name is not recognized.
    pub fn from_name(
        name: &str,
        surface: Surface,
        seed: u64,
        params: &Value,
    ) -> Result<Self, EngineError> {
        let kind = match name {
            "perlin" => PanelKind::Perlin(PerlinPanel::from_json(surface, seed, params)?),
            "quadtree" => PanelKind::QuadTree(QuadTreePanel::from_json(surface, params)?),
            "pathfinding" => PanelKind::Pathfinding(PathfindingPanel::from_json(surface, params)?),
            "collision" => PanelKind::Collision(CollisionPanel::from_json(surface, seed, params)?),
            "force_graph" => PanelKind::ForceGraph(ForceGraphPanel::from_json(surface, seed, params)?),
            "lerp" => PanelKind::Lerp(LerpPanel::from_json(surface, params)),
            "spring" => PanelKind::Spring(SpringPanel::from_json(surface, params)?),
            "gesture" => PanelKind::Gesture(GesturePanel::from_json(surface, params)),
            "line_chart" => PanelKind::LineChart(LineChartPanel::from_json(surface, seed, params)?),
            "events" => PanelKind::Events(EventsPanel::from_json(surface, params)),
            "voronoi" => PanelKind::Voronoi(VoronoiPanel::from_json(surface, seed, params)),
            "bsp" => PanelKind::Bsp(BspPanel::from_json(surface, seed, params)?),
            "filters" => PanelKind::Filters(FiltersPanel::from_json(surface, params)?),
            _ => return Err(EngineError::UnknownPanel(name.to_string())),
        };
        log::debug!(
            "registry: built {name} at {}x{} (seed {seed})",
            surface.width,
            surface.height
        );
        Ok(kind)
    }

    /// Constructs the panel a [`Seed`] describes, on a surface with a device
    /// pixel ratio of 1.
    pub fn from_seed(seed: &Seed) -> Result<Self, EngineError> {
        seed.validate()?;
        let surface = Surface::css(seed.width as f64, seed.height as f64)?;
        Self::from_name(&seed.panel, surface, seed.seed, &seed.params)
    }

    /// Like [`from_seed`](Self::from_seed), boxed for runtime dispatch.
    pub fn boxed(seed: &Seed) -> Result<Box<dyn Panel>, EngineError> {
        Ok(Box::new(Self::from_seed(seed)?))
    }

    /// Returns a slice of all recognized panel names.
    pub fn list_panels() -> &'static [&'static str] {
        PANEL_NAMES
    }
}

impl Panel for PanelKind {
    fn name(&self) -> &'static str {
        each_panel!(self, p => p.name())
    }

    fn surface(&self) -> Surface {
        each_panel!(self, p => p.surface())
    }

    fn update(&mut self, info: &FrameInfo) -> Result<(), EngineError> {
        each_panel!(self, p => p.update(info))
    }

    fn render(&self, frame: &mut Frame) {
        each_panel!(self, p => p.render(frame))
    }

    fn handle_input(&mut self, event: &InputEvent, now_ms: f64) -> Result<(), EngineError> {
        each_panel!(self, p => p.handle_input(event, now_ms))
    }

    fn resize(&mut self, surface: Surface) -> Result<(), EngineError> {
        each_panel!(self, p => p.resize(surface))
    }

    fn teardown(&mut self) {
        each_panel!(self, p => p.teardown())
    }

    fn params(&self) -> Value {
        each_panel!(self, p => p.params())
    }

    fn param_schema(&self) -> Value {
        each_panel!(self, p => p.param_schema())
    }

    fn apply_params(&mut self, params: &Value) -> Result<(), EngineError> {
        each_panel!(self, p => p.apply_params(params))
    }
}
