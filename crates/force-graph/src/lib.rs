#![deny(unsafe_code)]
//! Force-directed graph layout.
//!
//! A [`Graph`] holds nodes and edges; edges refer to nodes by [`NodeId`] and
//! are resolved through an id index on every tick, so an edge whose endpoint
//! is missing is simply skipped. [`Graph::step`] applies one tick of the
//! layout: inverse-square repulsion between every pair, a linear spring
//! along each edge, damping, integration and clamping to the surface.

pub mod panel;

use std::collections::HashMap;

use gallery_core::color::Rgba;
use gallery_core::error::EngineError;
use gallery_core::palette::Palette;
use gallery_core::prng::Xorshift64;
use glam::DVec2;

pub use panel::{ForceGraphPanel, ForceGraphParams};

/// Default spring constant along edges.
pub const DEFAULT_LINK_STRENGTH: f64 = 0.05;
/// Default numerator of the inverse-square repulsion.
pub const DEFAULT_REPULSION: f64 = 1000.0;
/// Fraction of velocity kept after each tick.
pub const DEFAULT_DAMPING: f64 = 0.9;
/// Chance that a node gets one extra random edge during generation.
const EXTRA_EDGE_CHANCE: f64 = 0.3;

/// Stable identifier of a node within one graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphNode {
    pub id: NodeId,
    pub pos: DVec2,
    pub vel: DVec2,
    pub radius: f64,
    pub color: Rgba,
}

/// Undirected link between two nodes, by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GraphEdge {
    pub source: NodeId,
    pub target: NodeId,
}

/// Force constants for [`Graph::step`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    pub link_strength: f64,
    pub repulsion: f64,
    pub damping: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            link_strength: DEFAULT_LINK_STRENGTH,
            repulsion: DEFAULT_REPULSION,
            damping: DEFAULT_DAMPING,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    index: HashMap<NodeId, usize>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Random graph of `count` nodes spread over `width` x `height`.
    ///
    /// Every node after the first links to a random earlier node, which keeps
    /// the graph connected; each node then has a 30% chance of one more edge
    /// to any other node.
    pub fn random(
        width: f64,
        height: f64,
        count: usize,
        radius: f64,
        palette: &Palette,
        rng: &mut Xorshift64,
    ) -> Result<Self, EngineError> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(EngineError::InvalidDimensions);
        }
        let mut graph = Self::new();
        for i in 0..count {
            let pos = DVec2::new(rng.next_f64() * width, rng.next_f64() * height);
            graph.add_node(NodeId(i as u32), pos, radius, palette.pick(rng))?;
        }
        for i in 0..count {
            let source = NodeId(i as u32);
            if i > 0 {
                let target = NodeId(rng.next_usize(i) as u32);
                graph.add_edge(source, target);
            }
            if rng.next_bool(EXTRA_EDGE_CHANCE) {
                let target = rng.next_usize(count);
                if target != i {
                    graph.add_edge(source, NodeId(target as u32));
                }
            }
        }
        log::debug!(
            "force-graph: generated {} nodes, {} edges",
            graph.nodes.len(),
            graph.edges.len()
        );
        Ok(graph)
    }

    /// Adds a node at rest. Returns `EngineError::InvalidInput` if `id` is taken.
    pub fn add_node(&mut self, id: NodeId, pos: DVec2, radius: f64, color: Rgba) -> Result<(), EngineError> {
        if self.index.contains_key(&id) {
            return Err(EngineError::invalid_input(format!("duplicate node id {}", id.0)));
        }
        self.index.insert(id, self.nodes.len());
        self.nodes.push(GraphNode {
            id,
            pos,
            vel: DVec2::ZERO,
            radius,
            color,
        });
        Ok(())
    }

    /// Adds an edge. Endpoints are not checked; dangling edges are ignored
    /// by the layout and by rendering.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId) {
        self.edges.push(GraphEdge { source, target });
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.index.get(&id).map(|&i| &self.nodes[i])
    }

    /// Both endpoints of `edge`, if they still exist.
    pub fn endpoints(&self, edge: &GraphEdge) -> Option<(&GraphNode, &GraphNode)> {
        Some((self.node(edge.source)?, self.node(edge.target)?))
    }

    /// Advances the layout by one tick inside a `width` x `height` box.
    pub fn step(&mut self, config: &LayoutConfig, width: f64, height: f64) {
        for node in &mut self.nodes {
            node.vel = DVec2::ZERO;
        }

        let n = self.nodes.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let delta = self.nodes[j].pos - self.nodes[i].pos;
                let distance = delta.length();
                if distance == 0.0 {
                    continue;
                }
                let force = delta / distance * (config.repulsion / (distance * distance));
                self.nodes[i].vel -= force;
                self.nodes[j].vel += force;
            }
        }

        for edge in &self.edges {
            let (Some(&s), Some(&t)) = (self.index.get(&edge.source), self.index.get(&edge.target)) else {
                continue;
            };
            let delta = self.nodes[t].pos - self.nodes[s].pos;
            let distance = delta.length();
            if distance == 0.0 {
                continue;
            }
            // Unit direction times distance * k is just delta * k.
            let force = delta * config.link_strength;
            self.nodes[s].vel += force;
            self.nodes[t].vel -= force;
        }

        for node in &mut self.nodes {
            node.vel *= config.damping;
            node.pos += node.vel;
            let r = node.radius;
            node.pos.x = node.pos.x.clamp(r, (width - r).max(r));
            node.pos.y = node.pos.y.clamp(r, (height - r).max(r));
        }
        log::trace!("force-graph: stepped {n} nodes");
    }
}
