//! Breadth-first search as a resumable state machine.
//!
//! [`Bfs::begin`] seeds the queue; each [`Bfs::step`] visits exactly one new
//! cell so a panel can animate the frontier at its own pace, while
//! [`Bfs::run`] drives the same machine to completion in one call.

use std::collections::VecDeque;

use gallery_core::error::EngineError;

use crate::grid::{Grid, Pos};

/// Lifecycle of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchState {
    /// No search in progress.
    #[default]
    Idle,
    /// Frontier not yet exhausted and goal not yet visited.
    Running,
    /// Goal visited; the path is available.
    Found,
    /// Queue drained without reaching the goal.
    Exhausted,
}

impl SearchState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SearchState::Found | SearchState::Exhausted)
    }
}

/// Resumable BFS over a [`Grid`].
#[derive(Debug, Clone, Default)]
pub struct Bfs {
    state: SearchState,
    start: Option<Pos>,
    end: Option<Pos>,
    queue: VecDeque<Pos>,
    came_from: Vec<Option<Pos>>,
    discovered: Vec<bool>,
    visited: Vec<Pos>,
    path: Vec<Pos>,
}

impl Bfs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    /// Start and goal of the current search.
    pub fn endpoints(&self) -> Option<(Pos, Pos)> {
        self.start.zip(self.end)
    }

    /// Cells in the order they were visited.
    pub fn visited(&self) -> &[Pos] {
        &self.visited
    }

    /// Start-to-goal path, inclusive; empty unless [`SearchState::Found`].
    pub fn path(&self) -> &[Pos] {
        &self.path
    }

    /// Clears the grid's search state and queues `start`.
    ///
    /// Walls are kept. Both endpoints must be inside the grid.
    pub fn begin(&mut self, grid: &mut Grid, start: Pos, end: Pos) -> Result<(), EngineError> {
        grid.check(start)?;
        grid.check(end)?;
        grid.reset_search();

        let len = grid.width() * grid.height();
        self.state = SearchState::Running;
        self.start = Some(start);
        self.end = Some(end);
        self.queue.clear();
        self.queue.push_back(start);
        self.came_from = vec![None; len];
        self.discovered = vec![false; len];
        self.discovered[grid.index(start)] = true;
        self.visited.clear();
        self.path.clear();
        grid.cell_mut(start).distance = Some(0);
        log::debug!("bfs: begin ({}, {}) -> ({}, {})", start.x, start.y, end.x, end.y);
        Ok(())
    }

    /// Visits the next cell, returning it, or `None` if the search is not
    /// running. Transitions to `Found` or `Exhausted` as appropriate.
    pub fn step(&mut self, grid: &mut Grid) -> Option<Pos> {
        if self.state != SearchState::Running {
            return None;
        }
        let end = self.end?;
        while let Some(current) = self.queue.pop_front() {
            if grid.cell_mut(current).is_visited {
                continue;
            }
            grid.cell_mut(current).is_visited = true;
            self.visited.push(current);

            if current == end {
                self.path = self.reconstruct(grid, end);
                self.state = SearchState::Found;
                log::debug!(
                    "bfs: found path of {} cells after {} visits",
                    self.path.len(),
                    self.visited.len()
                );
                return Some(current);
            }

            let next_distance = grid.cell_mut(current).distance.map_or(1, |d| d + 1);
            let neighbors: Vec<Pos> = grid.neighbors(current).collect();
            for n in neighbors {
                let i = grid.index(n);
                if self.discovered[i] || grid.is_wall(n) {
                    continue;
                }
                self.discovered[i] = true;
                self.came_from[i] = Some(current);
                grid.cell_mut(n).distance = Some(next_distance);
                self.queue.push_back(n);
            }
            log::trace!("bfs: visited ({}, {})", current.x, current.y);
            return Some(current);
        }
        self.state = SearchState::Exhausted;
        log::debug!("bfs: exhausted after {} visits", self.visited.len());
        None
    }

    /// Runs a complete search synchronously.
    pub fn run(&mut self, grid: &mut Grid, start: Pos, end: Pos) -> Result<SearchState, EngineError> {
        self.begin(grid, start, end)?;
        while self.state == SearchState::Running {
            self.step(grid);
        }
        Ok(self.state)
    }

    /// Abandons any search in progress and returns to `Idle`.
    pub fn cancel(&mut self) {
        if self.state == SearchState::Running {
            log::debug!("bfs: cancelled after {} visits", self.visited.len());
        }
        *self = Self::default();
    }

    fn reconstruct(&self, grid: &Grid, end: Pos) -> Vec<Pos> {
        let mut path = vec![end];
        let mut current = end;
        while let Some(prev) = self.came_from[grid.index(current)] {
            path.push(prev);
            current = prev;
        }
        path.reverse();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(w: usize, h: usize) -> Grid {
        Grid::new(w, h).unwrap()
    }

    fn is_connected_walk(path: &[Pos]) -> bool {
        path.windows(2).all(|w| w[0].manhattan(w[1]) == 1)
    }

    // ---- Terminal state tests ----

    #[test]
    fn empty_grid_path_has_manhattan_length() {
        let mut g = grid(10, 8);
        let mut bfs = Bfs::new();
        let (s, e) = (Pos::new(1, 1), Pos::new(8, 6));
        assert_eq!(bfs.run(&mut g, s, e).unwrap(), SearchState::Found);
        assert_eq!(bfs.path().len(), s.manhattan(e) + 1);
        assert_eq!(bfs.path().first(), Some(&s));
        assert_eq!(bfs.path().last(), Some(&e));
        assert!(is_connected_walk(bfs.path()));
        assert_eq!(g.cell(e).unwrap().distance, Some(s.manhattan(e) as u32));
    }

    #[test]
    fn start_equals_end_is_single_cell_path() {
        let mut g = grid(3, 3);
        let mut bfs = Bfs::new();
        bfs.run(&mut g, Pos::new(1, 1), Pos::new(1, 1)).unwrap();
        assert_eq!(bfs.path(), &[Pos::new(1, 1)]);
    }

    #[test]
    fn enclosed_goal_is_exhausted_with_empty_path() {
        let mut g = grid(5, 5);
        for p in [Pos::new(3, 4), Pos::new(4, 3), Pos::new(3, 3)] {
            g.set_wall(p, true).unwrap();
        }
        let mut bfs = Bfs::new();
        let state = bfs.run(&mut g, Pos::new(0, 0), Pos::new(4, 4)).unwrap();
        assert_eq!(state, SearchState::Exhausted);
        assert!(bfs.path().is_empty());
        assert_eq!(bfs.visited().len(), 25 - 4);
    }

    #[test]
    fn path_routes_around_walls() {
        let mut g = grid(5, 3);
        for y in 0..2 {
            g.set_wall(Pos::new(2, y), true).unwrap();
        }
        let mut bfs = Bfs::new();
        bfs.run(&mut g, Pos::new(0, 0), Pos::new(4, 0)).unwrap();
        assert_eq!(bfs.path().len(), 9);
        assert!(bfs.path().iter().all(|p| !g.is_wall(*p)));
        assert!(is_connected_walk(bfs.path()));
    }

    #[test]
    fn out_of_bounds_endpoint_is_an_error() {
        let mut g = grid(3, 3);
        let mut bfs = Bfs::new();
        assert!(matches!(
            bfs.begin(&mut g, Pos::new(0, 0), Pos::new(3, 0)),
            Err(EngineError::OutOfBounds { .. })
        ));
        assert_eq!(bfs.state(), SearchState::Idle);
    }

    // ---- Staged stepping tests ----

    #[test]
    fn step_visits_one_cell_at_a_time_in_neighbor_order() {
        let mut g = grid(3, 3);
        let mut bfs = Bfs::new();
        bfs.begin(&mut g, Pos::new(1, 1), Pos::new(2, 2)).unwrap();
        assert_eq!(bfs.step(&mut g), Some(Pos::new(1, 1)));
        assert_eq!(bfs.step(&mut g), Some(Pos::new(0, 1)));
        assert_eq!(bfs.step(&mut g), Some(Pos::new(2, 1)));
        assert_eq!(bfs.step(&mut g), Some(Pos::new(1, 0)));
        assert_eq!(bfs.visited().len(), 4);
        assert_eq!(bfs.state(), SearchState::Running);
    }

    #[test]
    fn step_after_terminal_state_is_noop() {
        let mut g = grid(2, 1);
        let mut bfs = Bfs::new();
        bfs.run(&mut g, Pos::new(0, 0), Pos::new(1, 0)).unwrap();
        assert_eq!(bfs.step(&mut g), None);
        assert_eq!(bfs.state(), SearchState::Found);
    }

    #[test]
    fn came_from_keeps_first_discovery() {
        // (1,0) is visited before (0,1), so it claims (1,1) first.
        let mut g = grid(2, 2);
        let mut bfs = Bfs::new();
        bfs.run(&mut g, Pos::new(0, 0), Pos::new(1, 1)).unwrap();
        assert_eq!(bfs.path(), &[Pos::new(0, 0), Pos::new(1, 0), Pos::new(1, 1)]);
    }

    #[test]
    fn cancel_returns_to_idle() {
        let mut g = grid(10, 10);
        let mut bfs = Bfs::new();
        bfs.begin(&mut g, Pos::new(0, 0), Pos::new(9, 9)).unwrap();
        bfs.step(&mut g);
        bfs.cancel();
        assert_eq!(bfs.state(), SearchState::Idle);
        assert!(bfs.visited().is_empty());
        assert_eq!(bfs.step(&mut g), None);
    }

    #[test]
    fn begin_resets_previous_search_but_keeps_walls() {
        let mut g = grid(4, 4);
        g.set_wall(Pos::new(2, 2), true).unwrap();
        let mut bfs = Bfs::new();
        bfs.run(&mut g, Pos::new(0, 0), Pos::new(3, 3)).unwrap();
        bfs.begin(&mut g, Pos::new(3, 3), Pos::new(0, 0)).unwrap();
        assert!(g.is_wall(Pos::new(2, 2)));
        assert!(!g.cell(Pos::new(1, 1)).unwrap().is_visited);
        assert_eq!(g.cell(Pos::new(3, 3)).unwrap().distance, Some(0));
    }

    // ---- Property-based tests ----

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn open_grid_path_is_shortest(
                w in 1_usize..12,
                h in 1_usize..12,
                sx in 0_usize..12, sy in 0_usize..12,
                ex in 0_usize..12, ey in 0_usize..12,
            ) {
                let (s, e) = (Pos::new(sx % w, sy % h), Pos::new(ex % w, ey % h));
                let mut g = grid(w, h);
                let mut bfs = Bfs::new();
                prop_assert_eq!(bfs.run(&mut g, s, e).unwrap(), SearchState::Found);
                prop_assert_eq!(bfs.path().len(), s.manhattan(e) + 1);
                prop_assert!(is_connected_walk(bfs.path()));
            }
        }
    }
}
