//! Voronoi diagram by brute-force grid sampling.
//!
//! Every `step`-th pixel is assigned to its nearest site, so a frame costs
//! `samples × sites` distance checks.

use gallery_core::color::Rgba;
use gallery_core::draw::{Frame, Surface};
use gallery_core::error::EngineError;
use gallery_core::frame::{FrameInfo, InputEvent, Panel, PanelAction};
use gallery_core::palette::Palette;
use gallery_core::params::param_usize_in;
use gallery_core::prng::Xorshift64;
use glam::DVec2;
use serde_json::{json, Value};

const DEFAULT_SITES: usize = 15;
const MIN_SITES: usize = 2;
const MAX_SITES: usize = 60;
const DEFAULT_STEP: usize = 5;
const MIN_STEP: usize = 2;
const MAX_STEP: usize = 20;
const SITE_RADIUS: f64 = 4.0;

/// A drifting generator point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Site {
    pub pos: DVec2,
    pub vel: DVec2,
    pub color: Rgba,
}

impl Site {
    /// Moves by one velocity step, bouncing off the `width` x `height` box.
    pub fn drift(&mut self, width: f64, height: f64) {
        self.pos += self.vel;
        if self.pos.x <= 0.0 || self.pos.x >= width {
            self.vel.x = -self.vel.x;
        }
        if self.pos.y <= 0.0 || self.pos.y >= height {
            self.vel.y = -self.vel.y;
        }
        self.pos = self.pos.clamp(DVec2::ZERO, DVec2::new(width, height));
    }
}

/// Sample points owned by one site.
#[derive(Debug, Clone, PartialEq)]
pub struct VoronoiCell {
    /// Index into the site slice.
    pub site: usize,
    pub samples: Vec<DVec2>,
}

/// Index of the site nearest to `p`; ties go to the lower index.
pub fn nearest_site(sites: &[Site], p: DVec2) -> Option<usize> {
    let mut best = None;
    let mut best_dist = f64::INFINITY;
    for (i, s) in sites.iter().enumerate() {
        let d = s.pos.distance_squared(p);
        if d < best_dist {
            best_dist = d;
            best = Some(i);
        }
    }
    best
}

/// Samples `[0, width) x [0, height)` every `step` units and groups the
/// samples by nearest site. One cell per site, in site order; a site that
/// wins no sample gets an empty cell.
pub fn sample_cells(sites: &[Site], width: f64, height: f64, step: usize) -> Vec<VoronoiCell> {
    let mut cells: Vec<VoronoiCell> = (0..sites.len())
        .map(|site| VoronoiCell {
            site,
            samples: Vec::new(),
        })
        .collect();
    if step == 0 {
        return cells;
    }
    let step = step as f64;
    let mut x = 0.0;
    while x < width {
        let mut y = 0.0;
        while y < height {
            let p = DVec2::new(x, y);
            if let Some(i) = nearest_site(sites, p) {
                cells[i].samples.push(p);
            }
            y += step;
        }
        x += step;
    }
    cells
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoronoiParams {
    pub sites: usize,
    pub step: usize,
}

impl Default for VoronoiParams {
    fn default() -> Self {
        Self {
            sites: DEFAULT_SITES,
            step: DEFAULT_STEP,
        }
    }
}

impl VoronoiParams {
    pub fn from_json(params: &Value) -> Self {
        Self::default().merged(params)
    }

    pub fn merged(&self, params: &Value) -> Self {
        Self {
            sites: param_usize_in(params, "sites", self.sites, MIN_SITES, MAX_SITES),
            step: param_usize_in(params, "step", self.step, MIN_STEP, MAX_STEP),
        }
    }
}

pub struct VoronoiPanel {
    surface: Surface,
    params: VoronoiParams,
    rng: Xorshift64,
    palette: Palette,
    sites: Vec<Site>,
}

impl VoronoiPanel {
    pub fn new(surface: Surface, seed: u64, params: VoronoiParams) -> Self {
        let mut panel = Self {
            surface,
            params,
            rng: Xorshift64::new(seed),
            palette: Palette::accent(),
            sites: Vec::new(),
        };
        panel.scatter();
        panel
    }

    pub fn from_json(surface: Surface, seed: u64, params: &Value) -> Self {
        Self::new(surface, seed, VoronoiParams::from_json(params))
    }

    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    pub fn cells(&self) -> Vec<VoronoiCell> {
        sample_cells(&self.sites, self.surface.width, self.surface.height, self.params.step)
    }

    /// Places fresh sites uniformly with velocity components in [-1, 1).
    fn scatter(&mut self) {
        let (w, h) = (self.surface.width, self.surface.height);
        let rng = &mut self.rng;
        let palette = &self.palette;
        self.sites = (0..self.params.sites)
            .map(|_| Site {
                pos: DVec2::new(rng.next_f64() * w, rng.next_f64() * h),
                vel: DVec2::new(rng.next_centered() * 2.0, rng.next_centered() * 2.0),
                color: palette.pick(rng),
            })
            .collect();
        log::debug!("voronoi: scattered {} sites", self.sites.len());
    }
}

impl Panel for VoronoiPanel {
    fn name(&self) -> &'static str {
        "voronoi"
    }

    fn surface(&self) -> Surface {
        self.surface
    }

    fn update(&mut self, _info: &FrameInfo) -> Result<(), EngineError> {
        let (w, h) = (self.surface.width, self.surface.height);
        for s in &mut self.sites {
            s.drift(w, h);
        }
        Ok(())
    }

    fn render(&self, frame: &mut Frame) {
        frame.clear();
        let step = self.params.step as f64;
        for cell in self.cells() {
            let color = self.sites[cell.site].color.with_alpha(0x30 as f64 / 255.0);
            for p in &cell.samples {
                frame.fill_rect(p.x, p.y, step, step, color);
            }
        }
        for s in &self.sites {
            frame.fill_circle(s.pos.x, s.pos.y, SITE_RADIUS, s.color);
        }
    }

    fn handle_input(&mut self, event: &InputEvent, _now_ms: f64) -> Result<(), EngineError> {
        if let InputEvent::Action {
            action: PanelAction::Reset | PanelAction::Regenerate,
        } = event
        {
            self.scatter();
        }
        Ok(())
    }

    fn resize(&mut self, surface: Surface) -> Result<(), EngineError> {
        self.surface = surface;
        self.scatter();
        Ok(())
    }

    fn params(&self) -> Value {
        json!({
            "sites": self.params.sites,
            "step": self.params.step,
        })
    }

    fn param_schema(&self) -> Value {
        json!({
            "sites": {
                "type": "integer",
                "default": DEFAULT_SITES,
                "min": MIN_SITES,
                "max": MAX_SITES,
                "description": "Number of drifting sites"
            },
            "step": {
                "type": "integer",
                "default": DEFAULT_STEP,
                "min": MIN_STEP,
                "max": MAX_STEP,
                "description": "Sampling stride in pixels"
            },
        })
    }

    fn apply_params(&mut self, params: &Value) -> Result<(), EngineError> {
        let next = self.params.merged(params);
        let rescatter = next.sites != self.params.sites;
        self.params = next;
        if rescatter {
            self.scatter();
        }
        Ok(())
    }
}
