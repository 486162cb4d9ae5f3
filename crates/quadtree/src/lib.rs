#![deny(unsafe_code)]
//! Point quad-tree.
//!
//! Each node covers an axis-aligned rectangle stored as a center plus
//! half-extents and keeps up to `capacity` points of its own. The first
//! insertion past capacity splits the node into four quadrants (NE, NW, SE,
//! SW); from then on the node's own list is frozen and further points go to
//! the first quadrant that accepts them. Nodes never merge and points are
//! never removed; callers rebuild the whole tree when the covered area
//! changes.

pub mod panel;

use gallery_core::error::EngineError;
use glam::DVec2;

pub use panel::{QuadTreePanel, QuadTreeParams};

/// Subdivision stops at this depth so coincident points cannot recurse
/// without bound; inserts that would need a deeper node are refused.
pub const MAX_DEPTH: usize = 24;

/// Rectangle given by its center and half-extents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Center x.
    pub x: f64,
    /// Center y.
    pub y: f64,
    /// Half of the full width.
    pub half_width: f64,
    /// Half of the full height.
    pub half_height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, half_width: f64, half_height: f64) -> Self {
        Self {
            x,
            y,
            half_width,
            half_height,
        }
    }

    /// Rectangle spanning `[0, width] x [0, height]`.
    pub fn from_size(width: f64, height: f64) -> Self {
        Self::new(width / 2.0, height / 2.0, width / 2.0, height / 2.0)
    }

    pub fn left(&self) -> f64 {
        self.x - self.half_width
    }

    pub fn top(&self) -> f64 {
        self.y - self.half_height
    }

    pub fn width(&self) -> f64 {
        self.half_width * 2.0
    }

    pub fn height(&self) -> f64 {
        self.half_height * 2.0
    }

    /// Inclusive on all four edges.
    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= self.x - self.half_width
            && p.x <= self.x + self.half_width
            && p.y >= self.y - self.half_height
            && p.y <= self.y + self.half_height
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        !(other.x - other.half_width > self.x + self.half_width
            || other.x + other.half_width < self.x - self.half_width
            || other.y - other.half_height > self.y + self.half_height
            || other.y + other.half_height < self.y - self.half_height)
    }

    /// The four quadrants in NE, NW, SE, SW order.
    fn quadrants(&self) -> [Rect; 4] {
        let w = self.half_width / 2.0;
        let h = self.half_height / 2.0;
        [
            Rect::new(self.x + w, self.y - h, w, h),
            Rect::new(self.x - w, self.y - h, w, h),
            Rect::new(self.x + w, self.y + h, w, h),
            Rect::new(self.x - w, self.y + h, w, h),
        ]
    }
}

/// Children of a divided node.
#[derive(Debug, Clone)]
pub struct Quadrants {
    pub ne: QuadTree,
    pub nw: QuadTree,
    pub se: QuadTree,
    pub sw: QuadTree,
}

impl Quadrants {
    /// Children in insertion-preference order.
    pub fn iter(&self) -> impl Iterator<Item = &QuadTree> {
        [&self.ne, &self.nw, &self.se, &self.sw].into_iter()
    }
}

/// A quad-tree node and, recursively, its subtree.
#[derive(Debug, Clone)]
pub struct QuadTree {
    boundary: Rect,
    capacity: usize,
    depth: usize,
    points: Vec<DVec2>,
    children: Option<Box<Quadrants>>,
}

impl QuadTree {
    /// Returns `EngineError::InvalidInput` if `capacity` is zero.
    pub fn new(boundary: Rect, capacity: usize) -> Result<Self, EngineError> {
        if capacity == 0 {
            return Err(EngineError::invalid_input("quad-tree capacity must be at least 1"));
        }
        Ok(Self::node(boundary, capacity, 0))
    }

    fn node(boundary: Rect, capacity: usize, depth: usize) -> Self {
        Self {
            boundary,
            capacity,
            depth,
            points: Vec::with_capacity(capacity),
            children: None,
        }
    }

    pub fn boundary(&self) -> Rect {
        self.boundary
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Depth of this node; the root is 0.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Points stored directly in this node (not its descendants).
    pub fn points(&self) -> &[DVec2] {
        &self.points
    }

    pub fn is_divided(&self) -> bool {
        self.children.is_some()
    }

    pub fn children(&self) -> Option<&Quadrants> {
        self.children.as_deref()
    }

    pub fn contains(&self, p: DVec2) -> bool {
        self.boundary.contains(p)
    }

    /// Inserts `p`, returning `false` if it lies outside the boundary (or
    /// would need a node deeper than [`MAX_DEPTH`]).
    pub fn insert(&mut self, p: DVec2) -> bool {
        if !self.boundary.contains(p) {
            return false;
        }
        if self.points.len() < self.capacity {
            self.points.push(p);
            return true;
        }
        if self.children.is_none() {
            if self.depth >= MAX_DEPTH {
                log::debug!("quadtree: depth limit reached at ({}, {}), point refused", p.x, p.y);
                return false;
            }
            self.subdivide();
        }
        match self.children.as_deref_mut() {
            Some(q) => q.ne.insert(p) || q.nw.insert(p) || q.se.insert(p) || q.sw.insert(p),
            None => false,
        }
    }

    fn subdivide(&mut self) {
        let [ne, nw, se, sw] = self.boundary.quadrants();
        let (cap, depth) = (self.capacity, self.depth + 1);
        self.children = Some(Box::new(Quadrants {
            ne: Self::node(ne, cap, depth),
            nw: Self::node(nw, cap, depth),
            se: Self::node(se, cap, depth),
            sw: Self::node(sw, cap, depth),
        }));
    }

    /// Total points in this subtree.
    pub fn len(&self) -> usize {
        self.points.len() + self.children().map_or(0, |q| q.iter().map(QuadTree::len).sum())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of nodes in this subtree, this one included.
    pub fn node_count(&self) -> usize {
        1 + self
            .children()
            .map_or(0, |q| q.iter().map(QuadTree::node_count).sum())
    }

    /// All points inside `range`, pruning subtrees that cannot intersect it.
    pub fn query(&self, range: &Rect) -> Vec<DVec2> {
        let mut found = Vec::new();
        self.query_into(range, &mut found);
        found
    }

    fn query_into(&self, range: &Rect, found: &mut Vec<DVec2>) {
        if !self.boundary.intersects(range) {
            return;
        }
        found.extend(self.points.iter().copied().filter(|p| range.contains(*p)));
        if let Some(q) = self.children() {
            for child in q.iter() {
                child.query_into(range, found);
            }
        }
    }

    /// Visits every node depth-first, parents before children.
    pub fn visit<F: FnMut(&QuadTree)>(&self, f: &mut F) {
        f(self);
        if let Some(q) = self.children() {
            for child in q.iter() {
                child.visit(f);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(capacity: usize) -> QuadTree {
        QuadTree::new(Rect::from_size(400.0, 400.0), capacity).unwrap()
    }

    fn p(x: f64, y: f64) -> DVec2 {
        DVec2::new(x, y)
    }

    // ---- Rect tests ----

    #[test]
    fn contains_is_inclusive_on_edges() {
        let r = Rect::new(50.0, 50.0, 50.0, 50.0);
        assert!(r.contains(p(0.0, 0.0)));
        assert!(r.contains(p(100.0, 100.0)));
        assert!(!r.contains(p(100.01, 50.0)));
        assert!(!r.contains(p(f64::NAN, 50.0)));
    }

    #[test]
    fn quadrants_follow_ne_nw_se_sw_layout() {
        let [ne, nw, se, sw] = Rect::new(100.0, 100.0, 100.0, 100.0).quadrants();
        assert_eq!(ne, Rect::new(150.0, 50.0, 50.0, 50.0));
        assert_eq!(nw, Rect::new(50.0, 50.0, 50.0, 50.0));
        assert_eq!(se, Rect::new(150.0, 150.0, 50.0, 50.0));
        assert_eq!(sw, Rect::new(50.0, 150.0, 50.0, 50.0));
    }

    #[test]
    fn intersects_detects_overlap_and_separation() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&Rect::new(15.0, 0.0, 5.0, 5.0)));
        assert!(!a.intersects(&Rect::new(30.0, 0.0, 5.0, 5.0)));
    }

    // ---- Construction tests ----

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(QuadTree::new(Rect::from_size(10.0, 10.0), 0).is_err());
    }

    // ---- Insert tests ----

    #[test]
    fn insert_outside_boundary_returns_false() {
        let mut t = tree(4);
        assert!(!t.insert(p(-1.0, 10.0)));
        assert!(!t.insert(p(10.0, 401.0)));
        assert!(t.is_empty());
    }

    #[test]
    fn fifth_point_triggers_subdivision() {
        let mut t = tree(4);
        for i in 0..4 {
            assert!(t.insert(p(10.0 + i as f64, 10.0)));
        }
        assert!(!t.is_divided());
        assert!(t.insert(p(300.0, 300.0)));
        assert!(t.is_divided());
        assert_eq!(t.points().len(), 4);
        assert_eq!(t.len(), 5);
        assert_eq!(t.children().unwrap().se.points(), &[p(300.0, 300.0)]);
    }

    #[test]
    fn divided_node_list_is_frozen() {
        let mut t = tree(1);
        t.insert(p(10.0, 10.0));
        t.insert(p(390.0, 10.0));
        t.insert(p(10.0, 390.0));
        assert_eq!(t.points(), &[p(10.0, 10.0)]);
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn center_point_goes_to_first_child_ne() {
        let mut t = tree(1);
        t.insert(p(0.0, 0.0));
        t.insert(p(200.0, 200.0));
        assert_eq!(t.children().unwrap().ne.points(), &[p(200.0, 200.0)]);
    }

    #[test]
    fn coincident_points_stop_at_depth_limit() {
        let mut t = tree(1);
        let mut accepted = 0;
        for _ in 0..(MAX_DEPTH + 10) {
            if t.insert(p(123.0, 321.0)) {
                accepted += 1;
            }
        }
        assert_eq!(accepted, MAX_DEPTH + 1);
        assert_eq!(t.len(), accepted);
    }

    // ---- Query / visit tests ----

    #[test]
    fn query_returns_only_points_in_range() {
        let mut t = tree(2);
        let pts = [p(10.0, 10.0), p(20.0, 20.0), p(200.0, 200.0), p(390.0, 390.0), p(25.0, 5.0)];
        for q in pts {
            t.insert(q);
        }
        let mut found = t.query(&Rect::new(15.0, 15.0, 15.0, 15.0));
        found.sort_by(|a, b| a.x.total_cmp(&b.x));
        assert_eq!(found, vec![p(10.0, 10.0), p(20.0, 20.0), p(25.0, 5.0)]);
    }

    #[test]
    fn visit_reaches_every_node() {
        let mut t = tree(1);
        for i in 0..10 {
            t.insert(p(i as f64 * 37.0, (i * 53 % 400) as f64));
        }
        let mut visited = 0;
        t.visit(&mut |_| visited += 1);
        assert_eq!(visited, t.node_count());
    }

    // ---- Property-based tests ----

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn points() -> impl Strategy<Value = Vec<(f64, f64)>> {
            prop::collection::vec((-50.0_f64..450.0, -50.0_f64..450.0), 0..200)
        }

        fn check_invariants(node: &QuadTree) -> Result<(), TestCaseError> {
            prop_assert!(node.points().len() <= node.capacity());
            for pt in node.points() {
                prop_assert!(node.boundary().contains(*pt));
            }
            if let Some(q) = node.children() {
                prop_assert_eq!(node.points().len(), node.capacity());
                for child in q.iter() {
                    check_invariants(child)?;
                }
            }
            Ok(())
        }

        proptest! {
            #[test]
            fn count_matches_accepted_inserts(pts in points(), cap in 1_usize..8) {
                let mut t = tree(cap);
                let accepted = pts
                    .iter()
                    .filter(|(x, y)| t.insert(p(*x, *y)))
                    .count();
                let inside = pts
                    .iter()
                    .filter(|(x, y)| t.boundary().contains(p(*x, *y)))
                    .count();
                prop_assert_eq!(accepted, inside);
                prop_assert_eq!(t.len(), accepted);
            }

            #[test]
            fn every_node_respects_capacity_and_containment(pts in points(), cap in 1_usize..8) {
                let mut t = tree(cap);
                for (x, y) in &pts {
                    t.insert(p(*x, *y));
                }
                check_invariants(&t)?;
            }

            #[test]
            fn query_of_whole_boundary_returns_everything(pts in points()) {
                let mut t = tree(4);
                for (x, y) in &pts {
                    t.insert(p(*x, *y));
                }
                prop_assert_eq!(t.query(&t.boundary()).len(), t.len());
            }
        }
    }
}
