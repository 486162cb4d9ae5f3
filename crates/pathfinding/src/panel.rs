//! Interactive pathfinding panel.
//!
//! The first press places the start, the second the goal, and every later
//! press (or drag) paints walls. `Run` starts the selected search: BFS is
//! advanced one visited cell per `step_interval_ms`, A* completes at once.

use gallery_core::draw::{Frame, Surface};
use gallery_core::error::EngineError;
use gallery_core::frame::{FrameInfo, InputEvent, Panel, PanelAction};
use gallery_core::params::{number_schema, param_f64_in, param_string};
use gallery_core::Rgba;
use serde_json::{json, Value};

use crate::astar::{astar, AStarResult};
use crate::bfs::{Bfs, SearchState};
use crate::grid::{Grid, Pos};

/// Edge length of a grid cell in CSS pixels.
pub const CELL_SIZE: f64 = 20.0;
/// Default delay between BFS visits.
const DEFAULT_STEP_INTERVAL_MS: f64 = 50.0;
const MIN_STEP_INTERVAL_MS: f64 = 0.0;
const MAX_STEP_INTERVAL_MS: f64 = 500.0;

/// Search algorithm run by the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Algorithm {
    #[default]
    Bfs,
    AStar,
}

impl Algorithm {
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Bfs => "bfs",
            Algorithm::AStar => "astar",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, EngineError> {
        match name {
            "bfs" => Ok(Algorithm::Bfs),
            "astar" => Ok(Algorithm::AStar),
            other => Err(EngineError::invalid_input(format!(
                "unknown algorithm '{other}' (expected bfs or astar)"
            ))),
        }
    }
}

/// What the next pointer press places.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementMode {
    Start,
    End,
    Wall,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathfindingParams {
    pub algorithm: Algorithm,
    pub step_interval_ms: f64,
}

impl Default for PathfindingParams {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default(),
            step_interval_ms: DEFAULT_STEP_INTERVAL_MS,
        }
    }
}

impl PathfindingParams {
    pub fn from_json(params: &Value) -> Result<Self, EngineError> {
        Self::default().merged(params)
    }

    pub fn merged(&self, params: &Value) -> Result<Self, EngineError> {
        let algorithm = match params.get("algorithm") {
            Some(_) => Algorithm::from_name(&param_string(params, "algorithm", self.algorithm.name()))?,
            None => self.algorithm,
        };
        Ok(Self {
            algorithm,
            step_interval_ms: param_f64_in(
                params,
                "step_interval_ms",
                self.step_interval_ms,
                MIN_STEP_INTERVAL_MS,
                MAX_STEP_INTERVAL_MS,
            ),
        })
    }
}

pub struct PathfindingPanel {
    surface: Surface,
    params: PathfindingParams,
    grid: Grid,
    mode: PlacementMode,
    start: Option<Pos>,
    end: Option<Pos>,
    painting: bool,
    bfs: Bfs,
    next_step_ms: Option<f64>,
    astar: Option<AStarResult>,
}

impl PathfindingPanel {
    pub fn new(surface: Surface, params: PathfindingParams) -> Result<Self, EngineError> {
        let (cols, rows) = grid_size(surface);
        Ok(Self {
            surface,
            params,
            grid: Grid::new(cols, rows)?,
            mode: PlacementMode::Start,
            start: None,
            end: None,
            painting: false,
            bfs: Bfs::new(),
            next_step_ms: None,
            astar: None,
        })
    }

    pub fn from_json(surface: Surface, params: &Value) -> Result<Self, EngineError> {
        Self::new(surface, PathfindingParams::from_json(params)?)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn mode(&self) -> PlacementMode {
        self.mode
    }

    pub fn start(&self) -> Option<Pos> {
        self.start
    }

    pub fn end(&self) -> Option<Pos> {
        self.end
    }

    /// State of the BFS machine (`Idle` while showing an A* result).
    pub fn search_state(&self) -> SearchState {
        self.bfs.state()
    }

    /// Path of the last completed search, if any.
    pub fn path(&self) -> &[Pos] {
        match &self.astar {
            Some(r) => &r.path,
            None => self.bfs.path(),
        }
    }

    /// Cells explored by the current or last search.
    pub fn explored(&self) -> &[Pos] {
        match &self.astar {
            Some(r) => &r.expanded,
            None => self.bfs.visited(),
        }
    }

    fn cell_at(&self, x: f64, y: f64) -> Option<Pos> {
        if x < 0.0 || y < 0.0 || !x.is_finite() || !y.is_finite() {
            return None;
        }
        Some(Pos::new((x / CELL_SIZE) as usize, (y / CELL_SIZE) as usize))
    }

    /// Drops any search in progress and its results.
    fn cancel_search(&mut self) {
        self.bfs.cancel();
        self.astar = None;
        self.next_step_ms = None;
        self.grid.reset_search();
    }

    fn press(&mut self, pos: Pos) -> Result<(), EngineError> {
        self.grid.check(pos)?;
        self.cancel_search();
        match self.mode {
            PlacementMode::Start => {
                self.start = Some(pos);
                self.mode = PlacementMode::End;
            }
            PlacementMode::End => {
                self.end = Some(pos);
                self.mode = PlacementMode::Wall;
            }
            PlacementMode::Wall => {
                self.painting = true;
                self.paint(pos)?;
            }
        }
        Ok(())
    }

    fn paint(&mut self, pos: Pos) -> Result<(), EngineError> {
        if Some(pos) == self.start || Some(pos) == self.end {
            return Ok(());
        }
        self.grid.set_wall(pos, true)
    }

    fn run(&mut self) -> Result<(), EngineError> {
        if self.bfs.state() == SearchState::Running {
            return Ok(());
        }
        let (Some(start), Some(end)) = (self.start, self.end) else {
            return Err(EngineError::invalid_input(
                "place a start and an end cell before running",
            ));
        };
        self.cancel_search();
        match self.params.algorithm {
            Algorithm::Bfs => self.bfs.begin(&mut self.grid, start, end),
            Algorithm::AStar => {
                self.astar = Some(astar(&self.grid, start, end)?);
                Ok(())
            }
        }
    }

    fn reset(&mut self) {
        self.cancel_search();
        self.grid.clear();
        self.start = None;
        self.end = None;
        self.mode = PlacementMode::Start;
        self.painting = false;
    }
}

fn grid_size(surface: Surface) -> (usize, usize) {
    (
        (surface.width / CELL_SIZE).floor() as usize,
        (surface.height / CELL_SIZE).floor() as usize,
    )
}

fn cell_center(p: Pos) -> [f64; 2] {
    [
        p.x as f64 * CELL_SIZE + CELL_SIZE / 2.0,
        p.y as f64 * CELL_SIZE + CELL_SIZE / 2.0,
    ]
}

impl Panel for PathfindingPanel {
    fn name(&self) -> &'static str {
        "pathfinding"
    }

    fn surface(&self) -> Surface {
        self.surface
    }

    fn update(&mut self, info: &FrameInfo) -> Result<(), EngineError> {
        if self.bfs.state() != SearchState::Running {
            return Ok(());
        }
        let interval = self.params.step_interval_ms;
        if interval <= 0.0 {
            while self.bfs.state() == SearchState::Running {
                self.bfs.step(&mut self.grid);
            }
            return Ok(());
        }
        let mut due = *self.next_step_ms.get_or_insert(info.now_ms);
        while due <= info.now_ms && self.bfs.state() == SearchState::Running {
            self.bfs.step(&mut self.grid);
            due += interval;
        }
        self.next_step_ms = Some(due);
        Ok(())
    }

    fn render(&self, frame: &mut Frame) {
        frame.clear();
        let wall = Rgba::rgb8(0x1f, 0x29, 0x37);
        let line = Rgba::from_hex("#60a5fa20").unwrap_or(Rgba::TRANSPARENT);
        for y in 0..self.grid.height() {
            for x in 0..self.grid.width() {
                let (sx, sy) = (x as f64 * CELL_SIZE, y as f64 * CELL_SIZE);
                if self.grid.is_wall(Pos::new(x, y)) {
                    frame.fill_rect(sx, sy, CELL_SIZE, CELL_SIZE, wall);
                }
                frame.stroke_rect(sx, sy, CELL_SIZE, CELL_SIZE, line);
            }
        }

        let visited = Rgba::from_hex("#3b82f620").unwrap_or(Rgba::TRANSPARENT);
        for p in self.explored() {
            frame.fill_rect(
                p.x as f64 * CELL_SIZE,
                p.y as f64 * CELL_SIZE,
                CELL_SIZE,
                CELL_SIZE,
                visited,
            );
        }

        let path: Vec<[f64; 2]> = self.path().iter().map(|p| cell_center(*p)).collect();
        frame.polyline(path, Rgba::rgb8(0x60, 0xa5, 0xfa), 2.0);

        for (pos, color) in [
            (self.start, Rgba::rgb8(0x34, 0xd3, 0x99)),
            (self.end, Rgba::rgb8(0xf8, 0x71, 0x71)),
        ] {
            if let Some(p) = pos {
                frame.fill_rect(
                    p.x as f64 * CELL_SIZE,
                    p.y as f64 * CELL_SIZE,
                    CELL_SIZE,
                    CELL_SIZE,
                    color,
                );
            }
        }

        let hint = match self.mode {
            PlacementMode::Start => "Click to place the starting point",
            PlacementMode::End => "Click to place the ending point",
            PlacementMode::Wall => "Click and drag to draw walls",
        };
        frame.text(8.0, 16.0, hint, Rgba::WHITE.with_alpha(0.8), 12.0);
    }

    fn handle_input(&mut self, event: &InputEvent, _now_ms: f64) -> Result<(), EngineError> {
        match *event {
            InputEvent::PointerDown { x, y } => match self.cell_at(x, y) {
                Some(pos) => self.press(pos)?,
                None => log::trace!("pathfinding: press outside grid"),
            },
            InputEvent::PointerMove { x, y } => {
                if self.painting && self.mode == PlacementMode::Wall {
                    if let Some(pos) = self.cell_at(x, y).filter(|p| self.grid.in_bounds(*p)) {
                        self.cancel_search();
                        self.paint(pos)?;
                    }
                }
            }
            InputEvent::PointerUp => self.painting = false,
            InputEvent::Action { action } => match action {
                PanelAction::Run => self.run()?,
                PanelAction::Reset => self.reset(),
                PanelAction::TogglePlay | PanelAction::Regenerate => {}
            },
            _ => {}
        }
        Ok(())
    }

    fn resize(&mut self, surface: Surface) -> Result<(), EngineError> {
        let (cols, rows) = grid_size(surface);
        let grid = self.grid.resized(cols, rows)?;
        self.surface = surface;
        self.grid = grid;
        self.cancel_search();
        let fits = |p: &Pos| p.x < cols && p.y < rows;
        self.start = self.start.filter(fits);
        self.end = self.end.filter(fits);
        self.mode = match (self.start, self.end) {
            (None, _) => PlacementMode::Start,
            (Some(_), None) => PlacementMode::End,
            _ => self.mode,
        };
        log::debug!("pathfinding: grid resized to {cols}x{rows}");
        Ok(())
    }

    fn params(&self) -> Value {
        json!({
            "algorithm": self.params.algorithm.name(),
            "step_interval_ms": self.params.step_interval_ms,
        })
    }

    fn param_schema(&self) -> Value {
        json!({
            "algorithm": {
                "type": "string",
                "default": Algorithm::default().name(),
                "enum": ["bfs", "astar"],
                "description": "Search run by the Run action"
            },
            "step_interval_ms": number_schema(
                DEFAULT_STEP_INTERVAL_MS,
                MIN_STEP_INTERVAL_MS,
                MAX_STEP_INTERVAL_MS,
                "Delay between BFS visits; 0 completes in one frame"
            ),
        })
    }

    fn apply_params(&mut self, params: &Value) -> Result<(), EngineError> {
        self.params = self.params.merged(params)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel() -> PathfindingPanel {
        PathfindingPanel::new(Surface::css(200.0, 100.0).unwrap(), PathfindingParams::default())
            .unwrap()
    }

    fn press(p: &mut PathfindingPanel, col: usize, row: usize) {
        let (x, y) = (col as f64 * CELL_SIZE + 5.0, row as f64 * CELL_SIZE + 5.0);
        p.handle_input(&InputEvent::PointerDown { x, y }, 0.0).unwrap();
        p.handle_input(&InputEvent::PointerUp, 0.0).unwrap();
    }

    fn action(p: &mut PathfindingPanel, action: PanelAction) -> Result<(), EngineError> {
        p.handle_input(&InputEvent::Action { action }, 0.0)
    }

    fn tick(p: &mut PathfindingPanel, now_ms: f64) {
        p.update(&FrameInfo {
            index: 0,
            now_ms,
            dt_ms: 16.0,
        })
        .unwrap();
    }

    // ---- Placement tests ----

    #[test]
    fn grid_matches_surface_in_cells() {
        let p = panel();
        assert_eq!((p.grid().width(), p.grid().height()), (10, 5));
    }

    #[test]
    fn presses_cycle_start_end_wall() {
        let mut p = panel();
        press(&mut p, 0, 0);
        assert_eq!(p.mode(), PlacementMode::End);
        press(&mut p, 9, 4);
        assert_eq!(p.mode(), PlacementMode::Wall);
        press(&mut p, 5, 2);
        assert_eq!(p.start(), Some(Pos::new(0, 0)));
        assert_eq!(p.end(), Some(Pos::new(9, 4)));
        assert!(p.grid().is_wall(Pos::new(5, 2)));
    }

    #[test]
    fn drag_paints_walls_but_not_over_endpoints() {
        let mut p = panel();
        press(&mut p, 0, 0);
        press(&mut p, 3, 0);
        p.handle_input(&InputEvent::PointerDown { x: 25.0, y: 5.0 }, 0.0)
            .unwrap();
        for col in 0..5 {
            p.handle_input(
                &InputEvent::PointerMove {
                    x: col as f64 * CELL_SIZE + 5.0,
                    y: 5.0,
                },
                0.0,
            )
            .unwrap();
        }
        p.handle_input(&InputEvent::PointerUp, 0.0).unwrap();
        p.handle_input(&InputEvent::PointerMove { x: 5.0, y: 45.0 }, 0.0)
            .unwrap();
        let walls: Vec<Pos> = p.grid().walls().collect();
        assert_eq!(walls, vec![Pos::new(1, 0), Pos::new(2, 0), Pos::new(4, 0)]);
    }

    #[test]
    fn press_outside_grid_is_rejected() {
        let mut p = panel();
        let err = p.handle_input(&InputEvent::PointerDown { x: 500.0, y: 5.0 }, 0.0);
        assert!(matches!(err, Err(EngineError::OutOfBounds { .. })));
        assert_eq!(p.mode(), PlacementMode::Start);
    }

    // ---- Search tests ----

    #[test]
    fn run_without_endpoints_is_invalid_input() {
        let mut p = panel();
        assert!(matches!(
            action(&mut p, PanelAction::Run),
            Err(EngineError::InvalidInput(_))
        ));
    }

    #[test]
    fn bfs_is_paced_by_step_interval() {
        let mut p = panel();
        press(&mut p, 0, 0);
        press(&mut p, 9, 4);
        action(&mut p, PanelAction::Run).unwrap();
        tick(&mut p, 1000.0);
        assert_eq!(p.explored().len(), 1);
        tick(&mut p, 1049.0);
        assert_eq!(p.explored().len(), 1);
        tick(&mut p, 1100.0);
        assert_eq!(p.explored().len(), 3);
        assert_eq!(p.search_state(), SearchState::Running);
    }

    #[test]
    fn bfs_completes_and_exposes_path() {
        let mut p = panel();
        p.apply_params(&json!({"step_interval_ms": 0})).unwrap();
        press(&mut p, 0, 0);
        press(&mut p, 9, 4);
        action(&mut p, PanelAction::Run).unwrap();
        tick(&mut p, 0.0);
        assert_eq!(p.search_state(), SearchState::Found);
        assert_eq!(p.path().len(), 9 + 4 + 1);
    }

    #[test]
    fn astar_runs_immediately() {
        let mut p = panel();
        p.apply_params(&json!({"algorithm": "astar"})).unwrap();
        press(&mut p, 0, 0);
        press(&mut p, 9, 4);
        action(&mut p, PanelAction::Run).unwrap();
        assert_eq!(p.path().len(), 14);
        assert_eq!(p.search_state(), SearchState::Idle);
    }

    #[test]
    fn editing_walls_cancels_running_search() {
        let mut p = panel();
        press(&mut p, 0, 0);
        press(&mut p, 9, 4);
        action(&mut p, PanelAction::Run).unwrap();
        tick(&mut p, 0.0);
        press(&mut p, 5, 0);
        assert_eq!(p.search_state(), SearchState::Idle);
        assert!(p.explored().is_empty());
        assert!(p.grid().is_wall(Pos::new(5, 0)));
    }

    #[test]
    fn reset_clears_everything() {
        let mut p = panel();
        press(&mut p, 0, 0);
        press(&mut p, 9, 4);
        press(&mut p, 5, 2);
        action(&mut p, PanelAction::Reset).unwrap();
        assert_eq!(p.mode(), PlacementMode::Start);
        assert!(p.start().is_none() && p.end().is_none());
        assert_eq!(p.grid().walls().count(), 0);
    }

    #[test]
    fn resize_drops_endpoints_that_no_longer_fit() {
        let mut p = panel();
        press(&mut p, 1, 1);
        press(&mut p, 9, 4);
        p.resize(Surface::css(100.0, 100.0).unwrap()).unwrap();
        assert_eq!(p.start(), Some(Pos::new(1, 1)));
        assert_eq!(p.end(), None);
        assert_eq!(p.mode(), PlacementMode::End);
    }

    #[test]
    fn unknown_algorithm_is_rejected() {
        let mut p = panel();
        assert!(p.apply_params(&json!({"algorithm": "dijkstra"})).is_err());
    }

    #[test]
    fn render_draws_path_polyline_after_search() {
        let mut p = panel();
        p.apply_params(&json!({"algorithm": "astar"})).unwrap();
        press(&mut p, 0, 0);
        press(&mut p, 2, 0);
        action(&mut p, PanelAction::Run).unwrap();
        let mut frame = Frame::new(p.surface());
        p.render(&mut frame);
        assert!(frame.commands().iter().any(|c| matches!(
            c,
            gallery_core::DrawCommand::Polyline { points, .. } if points.len() == 3
        )));
    }
}
