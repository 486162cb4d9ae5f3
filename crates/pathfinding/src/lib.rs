#![deny(unsafe_code)]
//! Grid search: breadth-first search and A* over a 2D walkability grid.
//!
//! - [`grid`]: the [`Grid`] of wall/visited/distance cells.
//! - [`bfs`]: resumable BFS state machine (`Idle → Running → Found | Exhausted`).
//! - [`astar`]: A* with Manhattan heuristic and a linear open-list scan.
//! - [`panel`]: the interactive panel that places endpoints, paints walls
//!   and animates the search.

pub mod astar;
pub mod bfs;
pub mod grid;
pub mod panel;

pub use astar::{astar, AStarResult};
pub use bfs::{Bfs, SearchState};
pub use grid::{Cell, Grid, Pos};
pub use panel::{Algorithm, PathfindingPanel, PathfindingParams, PlacementMode};
