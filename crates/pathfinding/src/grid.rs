//! Walkability grid shared by the BFS and A* searches.

use gallery_core::error::EngineError;
use serde::{Deserialize, Serialize};

/// Integer cell coordinate; `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to `other`.
    pub fn manhattan(self, other: Pos) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// Per-cell search state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cell {
    pub is_wall: bool,
    pub is_visited: bool,
    /// Steps from the search start; `None` until discovered.
    pub distance: Option<u32>,
}

/// Row-major grid of [`Cell`]s.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Returns `EngineError::InvalidDimensions` if either side is zero or
    /// the cell count overflows.
    pub fn new(width: usize, height: usize) -> Result<Self, EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        let len = width
            .checked_mul(height)
            .ok_or(EngineError::InvalidDimensions)?;
        Ok(Self {
            width,
            height,
            cells: vec![Cell::default(); len],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    /// Validates `pos`, returning `EngineError::OutOfBounds` otherwise.
    pub fn check(&self, pos: Pos) -> Result<(), EngineError> {
        if self.in_bounds(pos) {
            Ok(())
        } else {
            Err(EngineError::OutOfBounds {
                x: pos.x,
                y: pos.y,
                width: self.width,
                height: self.height,
            })
        }
    }

    pub(crate) fn index(&self, pos: Pos) -> usize {
        pos.y * self.width + pos.x
    }

    pub fn cell(&self, pos: Pos) -> Result<&Cell, EngineError> {
        self.check(pos)?;
        Ok(&self.cells[self.index(pos)])
    }

    pub(crate) fn cell_mut(&mut self, pos: Pos) -> &mut Cell {
        let i = self.index(pos);
        &mut self.cells[i]
    }

    pub fn is_wall(&self, pos: Pos) -> bool {
        self.in_bounds(pos) && self.cells[self.index(pos)].is_wall
    }

    pub fn set_wall(&mut self, pos: Pos, wall: bool) -> Result<(), EngineError> {
        self.check(pos)?;
        self.cell_mut(pos).is_wall = wall;
        Ok(())
    }

    /// In-bounds orthogonal neighbors in left, right, up, down order.
    pub fn neighbors(&self, pos: Pos) -> impl Iterator<Item = Pos> + '_ {
        let candidates = [
            pos.x.checked_sub(1).map(|x| Pos::new(x, pos.y)),
            Some(Pos::new(pos.x + 1, pos.y)),
            pos.y.checked_sub(1).map(|y| Pos::new(pos.x, y)),
            Some(Pos::new(pos.x, pos.y + 1)),
        ];
        candidates
            .into_iter()
            .flatten()
            .filter(move |p| self.in_bounds(*p))
    }

    /// Clears visited flags and distances, keeping walls.
    pub fn reset_search(&mut self) {
        for c in &mut self.cells {
            c.is_visited = false;
            c.distance = None;
        }
    }

    /// Clears everything, walls included.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    /// Copy of this grid resized to `width` x `height`, keeping the walls
    /// that still fit. Search state is not carried over.
    pub fn resized(&self, width: usize, height: usize) -> Result<Grid, EngineError> {
        let mut next = Grid::new(width, height)?;
        for y in 0..self.height.min(height) {
            for x in 0..self.width.min(width) {
                let p = Pos::new(x, y);
                next.cell_mut(p).is_wall = self.is_wall(p);
            }
        }
        Ok(next)
    }

    /// Positions of all wall cells in row-major order.
    pub fn walls(&self) -> impl Iterator<Item = Pos> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_wall)
            .map(|(i, _)| Pos::new(i % self.width, i / self.width))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_dimension_is_rejected() {
        assert!(Grid::new(0, 5).is_err());
        assert!(Grid::new(5, 0).is_err());
        assert!(Grid::new(usize::MAX, 2).is_err());
    }

    #[test]
    fn out_of_bounds_access_reports_coordinates() {
        let g = Grid::new(4, 3).unwrap();
        match g.cell(Pos::new(4, 0)) {
            Err(EngineError::OutOfBounds {
                x,
                y,
                width,
                height,
            }) => assert_eq!((x, y, width, height), (4, 0, 4, 3)),
            other => panic!("expected OutOfBounds, got {other:?}"),
        }
    }

    #[test]
    fn neighbors_are_left_right_up_down() {
        let g = Grid::new(3, 3).unwrap();
        let n: Vec<Pos> = g.neighbors(Pos::new(1, 1)).collect();
        assert_eq!(
            n,
            vec![Pos::new(0, 1), Pos::new(2, 1), Pos::new(1, 0), Pos::new(1, 2)]
        );
    }

    #[test]
    fn corner_neighbors_are_clipped() {
        let g = Grid::new(3, 3).unwrap();
        let n: Vec<Pos> = g.neighbors(Pos::new(0, 0)).collect();
        assert_eq!(n, vec![Pos::new(1, 0), Pos::new(0, 1)]);
        let n: Vec<Pos> = g.neighbors(Pos::new(2, 2)).collect();
        assert_eq!(n, vec![Pos::new(1, 2), Pos::new(2, 1)]);
    }

    #[test]
    fn reset_search_keeps_walls() {
        let mut g = Grid::new(3, 3).unwrap();
        g.set_wall(Pos::new(1, 1), true).unwrap();
        g.cell_mut(Pos::new(0, 0)).is_visited = true;
        g.cell_mut(Pos::new(0, 0)).distance = Some(0);
        g.reset_search();
        assert!(g.is_wall(Pos::new(1, 1)));
        assert_eq!(*g.cell(Pos::new(0, 0)).unwrap(), Cell::default());
        g.clear();
        assert!(!g.is_wall(Pos::new(1, 1)));
    }

    #[test]
    fn resized_keeps_fitting_walls() {
        let mut g = Grid::new(4, 4).unwrap();
        g.set_wall(Pos::new(1, 1), true).unwrap();
        g.set_wall(Pos::new(3, 3), true).unwrap();
        let r = g.resized(2, 5).unwrap();
        assert_eq!(r.walls().collect::<Vec<_>>(), vec![Pos::new(1, 1)]);
    }
}
