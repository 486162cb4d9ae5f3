//! A* search with a Manhattan heuristic and unit step cost.
//!
//! The open list is a plain vector scanned for the lowest `f`; ties go to the
//! entry that was opened first. Grids in the gallery are a few hundred cells,
//! where the scan is cheaper than maintaining a heap.

use gallery_core::error::EngineError;

use crate::grid::{Grid, Pos};

/// Neighbor offsets as (dx, dy): down, right, up, left.
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

/// Outcome of an A* search.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AStarResult {
    /// Start-to-goal path, inclusive; empty if the goal is unreachable.
    pub path: Vec<Pos>,
    /// `g` of the goal (steps along `path`), when reached.
    pub cost: Option<u32>,
    /// Cells in the order they were moved to the closed set.
    pub expanded: Vec<Pos>,
}

impl AStarResult {
    pub fn found(&self) -> bool {
        self.cost.is_some()
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Node {
    g: u32,
    f: u32,
    parent: Option<Pos>,
    open: bool,
    closed: bool,
}

/// Searches from `start` to `end`, treating walls as impassable.
///
/// Returns `EngineError::OutOfBounds` if either endpoint is outside the grid.
/// An unreachable goal yields an empty path, not an error.
pub fn astar(grid: &Grid, start: Pos, end: Pos) -> Result<AStarResult, EngineError> {
    grid.check(start)?;
    grid.check(end)?;

    let mut nodes = vec![Node::default(); grid.width() * grid.height()];
    let heuristic = |p: Pos| p.manhattan(end) as u32;

    let s = grid.index(start);
    nodes[s].f = heuristic(start);
    nodes[s].open = true;
    let mut open = vec![start];
    let mut result = AStarResult::default();

    while !open.is_empty() {
        let mut best = 0;
        for i in 1..open.len() {
            if nodes[grid.index(open[i])].f < nodes[grid.index(open[best])].f {
                best = i;
            }
        }
        let current = open.remove(best);
        let ci = grid.index(current);
        nodes[ci].open = false;
        nodes[ci].closed = true;
        result.expanded.push(current);

        if current == end {
            result.cost = Some(nodes[ci].g);
            result.path = reconstruct(grid, &nodes, end);
            log::debug!(
                "astar: cost {} after expanding {} cells",
                nodes[ci].g,
                result.expanded.len()
            );
            return Ok(result);
        }

        for (dx, dy) in DIRECTIONS {
            let (Some(x), Some(y)) = (
                current.x.checked_add_signed(dx),
                current.y.checked_add_signed(dy),
            ) else {
                continue;
            };
            let neighbor = Pos::new(x, y);
            if !grid.in_bounds(neighbor) || grid.is_wall(neighbor) {
                continue;
            }
            let ni = grid.index(neighbor);
            if nodes[ni].closed {
                continue;
            }
            let tentative = nodes[ci].g + 1;
            if !nodes[ni].open {
                nodes[ni].open = true;
                open.push(neighbor);
            } else if tentative >= nodes[ni].g {
                continue;
            }
            nodes[ni] = Node {
                g: tentative,
                f: tentative + heuristic(neighbor),
                parent: Some(current),
                ..nodes[ni]
            };
        }
    }

    log::debug!("astar: no path after expanding {} cells", result.expanded.len());
    Ok(result)
}

fn reconstruct(grid: &Grid, nodes: &[Node], end: Pos) -> Vec<Pos> {
    let mut path = vec![end];
    let mut current = end;
    while let Some(parent) = nodes[grid.index(current)].parent {
        path.push(parent);
        current = parent;
    }
    path.reverse();
    path
}
