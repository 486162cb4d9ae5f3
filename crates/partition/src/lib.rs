#![deny(unsafe_code)]
//! Space partitioning panels.
//!
//! - [`voronoi`]: drifting sites whose cells are found by sampling a grid and
//!   assigning each sample to its nearest site.
//! - [`bsp`]: recursive binary space partition of the surface into randomly
//!   split rectangles.

pub mod bsp;
pub mod voronoi;

pub use bsp::{Bounds, BspNode, BspPanel, BspParams, SplitDirection};
pub use voronoi::{nearest_site, sample_cells, Site, VoronoiCell, VoronoiPanel, VoronoiParams};
