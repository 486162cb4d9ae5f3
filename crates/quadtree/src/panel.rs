//! Click-to-insert quad-tree panel.
//!
//! Every pointer press adds a point; the tree covers the whole surface and is
//! rebuilt from the recorded points whenever the surface is resized or the
//! node capacity changes. Hovering shows a range query around the cursor.

use gallery_core::draw::{Frame, Surface};
use gallery_core::error::EngineError;
use gallery_core::frame::{FrameInfo, InputEvent, Panel, PanelAction};
use gallery_core::params::{number_schema, param_f64_in, param_usize_in};
use gallery_core::Rgba;
use glam::DVec2;
use serde_json::{json, Value};

use crate::{QuadTree, Rect};

const DEFAULT_CAPACITY: usize = 4;
const MIN_CAPACITY: usize = 1;
const MAX_CAPACITY: usize = 16;
/// Half-extent of the hover query square.
const DEFAULT_QUERY_RADIUS: f64 = 60.0;
const MIN_QUERY_RADIUS: f64 = 10.0;
const MAX_QUERY_RADIUS: f64 = 200.0;
const POINT_RADIUS: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadTreeParams {
    pub capacity: usize,
    pub query_radius: f64,
}

impl Default for QuadTreeParams {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            query_radius: DEFAULT_QUERY_RADIUS,
        }
    }
}

impl QuadTreeParams {
    /// Extracts parameters from a JSON object, falling back to defaults.
    pub fn from_json(params: &Value) -> Self {
        Self::default().merged(params)
    }

    pub fn merged(&self, params: &Value) -> Self {
        Self {
            capacity: param_usize_in(params, "capacity", self.capacity, MIN_CAPACITY, MAX_CAPACITY),
            query_radius: param_f64_in(
                params,
                "query_radius",
                self.query_radius,
                MIN_QUERY_RADIUS,
                MAX_QUERY_RADIUS,
            ),
        }
    }
}

pub struct QuadTreePanel {
    surface: Surface,
    params: QuadTreeParams,
    points: Vec<DVec2>,
    tree: QuadTree,
    hover: Option<DVec2>,
}

impl QuadTreePanel {
    pub fn new(surface: Surface, params: QuadTreeParams) -> Result<Self, EngineError> {
        let tree = QuadTree::new(Rect::from_size(surface.width, surface.height), params.capacity)?;
        Ok(Self {
            surface,
            params,
            points: Vec::new(),
            tree,
            hover: None,
        })
    }

    pub fn from_json(surface: Surface, params: &Value) -> Result<Self, EngineError> {
        Self::new(surface, QuadTreeParams::from_json(params))
    }

    pub fn tree(&self) -> &QuadTree {
        &self.tree
    }

    /// Points accepted so far, in insertion order.
    pub fn points(&self) -> &[DVec2] {
        &self.points
    }

    /// Range covered by the hover query, if the pointer is over the surface.
    pub fn query_range(&self) -> Option<Rect> {
        self.hover.map(|h| {
            let r = self.params.query_radius;
            Rect::new(h.x, h.y, r, r)
        })
    }

    fn add_point(&mut self, p: DVec2) {
        if !self.tree.contains(p) {
            log::warn!("quadtree: point ({}, {}) outside surface, ignored", p.x, p.y);
        } else if self.tree.insert(p) {
            self.points.push(p);
        } else {
            log::warn!("quadtree: point ({}, {}) needs a node past the depth limit, ignored", p.x, p.y);
        }
    }

    /// Discards the tree and re-inserts every recorded point.
    fn rebuild(&mut self) -> Result<(), EngineError> {
        let mut tree = QuadTree::new(
            Rect::from_size(self.surface.width, self.surface.height),
            self.params.capacity,
        )?;
        let before = self.points.len();
        self.points.retain(|p| tree.insert(*p));
        if self.points.len() != before {
            log::debug!(
                "quadtree: rebuild dropped {} points outside the new surface",
                before - self.points.len()
            );
        }
        self.tree = tree;
        Ok(())
    }
}

impl Panel for QuadTreePanel {
    fn name(&self) -> &'static str {
        "quadtree"
    }

    fn surface(&self) -> Surface {
        self.surface
    }

    fn update(&mut self, _info: &FrameInfo) -> Result<(), EngineError> {
        Ok(())
    }

    fn render(&self, frame: &mut Frame) {
        frame.clear();
        let grid = Rgba::rgb8(0x60, 0xa5, 0xfa).with_alpha(0x50 as f64 / 255.0);
        let point = Rgba::rgb8(0x34, 0xd3, 0x99);
        self.tree.visit(&mut |node: &QuadTree| {
            let b = node.boundary();
            frame.stroke_rect(b.left(), b.top(), b.width(), b.height(), grid);
            for p in node.points() {
                frame.fill_circle(p.x, p.y, POINT_RADIUS, point);
            }
        });
        if let Some(range) = self.query_range() {
            let hit = Rgba::rgb8(0xf8, 0x71, 0x71);
            frame.stroke_rect(
                range.left(),
                range.top(),
                range.width(),
                range.height(),
                Rgba::rgb8(0xfc, 0xd3, 0x4d),
            );
            for p in self.tree.query(&range) {
                frame.fill_circle(p.x, p.y, POINT_RADIUS, hit);
            }
        }
        frame.text(
            8.0,
            16.0,
            format!("Points: {}  Nodes: {}", self.points.len(), self.tree.node_count()),
            Rgba::WHITE,
            12.0,
        );
    }

    fn handle_input(&mut self, event: &InputEvent, _now_ms: f64) -> Result<(), EngineError> {
        match *event {
            InputEvent::PointerDown { x, y } => self.add_point(DVec2::new(x, y)),
            InputEvent::PointerMove { x, y } => self.hover = Some(DVec2::new(x, y)),
            InputEvent::PointerUp => {}
            InputEvent::Action {
                action: PanelAction::Reset,
            } => {
                self.points.clear();
                self.rebuild()?;
            }
            _ => {}
        }
        Ok(())
    }

    fn resize(&mut self, surface: Surface) -> Result<(), EngineError> {
        self.surface = surface;
        log::debug!("quadtree: rebuilding for {}x{}", surface.width, surface.height);
        self.rebuild()
    }

    fn params(&self) -> Value {
        json!({
            "capacity": self.params.capacity,
            "query_radius": self.params.query_radius,
        })
    }

    fn param_schema(&self) -> Value {
        json!({
            "capacity": {
                "type": "integer",
                "default": DEFAULT_CAPACITY,
                "min": MIN_CAPACITY,
                "max": MAX_CAPACITY,
                "description": "Points a node holds before it subdivides"
            },
            "query_radius": number_schema(
                DEFAULT_QUERY_RADIUS,
                MIN_QUERY_RADIUS,
                MAX_QUERY_RADIUS,
                "Half-extent of the hover range query"
            ),
        })
    }

    fn apply_params(&mut self, params: &Value) -> Result<(), EngineError> {
        let next = self.params.merged(params);
        let rebuild = next.capacity != self.params.capacity;
        self.params = next;
        if rebuild {
            self.rebuild()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gallery_core::DrawCommand;

    fn panel() -> QuadTreePanel {
        QuadTreePanel::new(Surface::css(200.0, 100.0).unwrap(), QuadTreeParams::default()).unwrap()
    }

    fn click(p: &mut QuadTreePanel, x: f64, y: f64) {
        p.handle_input(&InputEvent::PointerDown { x, y }, 0.0).unwrap();
    }

    #[test]
    fn clicks_insert_points() {
        let mut p = panel();
        for i in 0..6 {
            click(&mut p, 10.0 + i as f64 * 20.0, 50.0);
        }
        assert_eq!(p.points().len(), 6);
        assert_eq!(p.tree().len(), 6);
        assert!(p.tree().is_divided());
    }

    #[test]
    fn click_outside_surface_is_ignored() {
        let mut p = panel();
        click(&mut p, 500.0, 50.0);
        assert!(p.points().is_empty());
    }

    #[test]
    fn stacked_clicks_stop_at_depth_limit() {
        let params = QuadTreeParams {
            capacity: 1,
            ..QuadTreeParams::default()
        };
        let mut p = QuadTreePanel::new(Surface::css(200.0, 100.0).unwrap(), params).unwrap();
        for _ in 0..(crate::MAX_DEPTH + 5) {
            click(&mut p, 37.0, 61.0);
        }
        assert!(p.tree().contains(DVec2::new(37.0, 61.0)));
        assert_eq!(p.points().len(), crate::MAX_DEPTH + 1);
        assert_eq!(p.tree().len(), p.points().len());
    }

    #[test]
    fn resize_rebuilds_tree_over_new_surface() {
        let mut p = panel();
        click(&mut p, 10.0, 10.0);
        click(&mut p, 190.0, 90.0);
        p.resize(Surface::css(100.0, 100.0).unwrap()).unwrap();
        assert_eq!(p.tree().boundary(), Rect::new(50.0, 50.0, 50.0, 50.0));
        assert_eq!(p.points(), &[DVec2::new(10.0, 10.0)]);
        assert_eq!(p.tree().len(), 1);
    }

    #[test]
    fn capacity_change_rebuilds() {
        let mut p = panel();
        for i in 0..3 {
            click(&mut p, 10.0 + i as f64 * 50.0, 50.0);
        }
        assert!(!p.tree().is_divided());
        p.apply_params(&json!({"capacity": 1})).unwrap();
        assert!(p.tree().is_divided());
        assert_eq!(p.tree().len(), 3);
        p.apply_params(&json!({"capacity": 0})).unwrap();
        assert_eq!(p.params()["capacity"], 1);
    }

    #[test]
    fn reset_clears_points() {
        let mut p = panel();
        click(&mut p, 10.0, 10.0);
        p.handle_input(&InputEvent::Action { action: PanelAction::Reset }, 0.0)
            .unwrap();
        assert!(p.tree().is_empty());
        assert!(p.points().is_empty());
    }

    #[test]
    fn render_strokes_each_node_and_highlights_query() {
        let mut p = panel();
        for i in 0..5 {
            click(&mut p, 10.0 + i as f64 * 40.0, 20.0);
        }
        p.handle_input(&InputEvent::PointerMove { x: 10.0, y: 20.0 }, 0.0)
            .unwrap();
        let mut frame = Frame::new(p.surface());
        p.render(&mut frame);
        let strokes = frame
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::StrokeRect { .. }))
            .count();
        assert_eq!(strokes, p.tree().node_count() + 1);
        let circles = frame
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::FillCircle { .. }))
            .count();
        let hits = p.tree().query(&p.query_range().unwrap()).len();
        assert_eq!(circles, 5 + hits);
        assert!(hits >= 1);
    }
}
