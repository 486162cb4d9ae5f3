//! Animated Perlin noise field panel.
//!
//! Samples the noise on a grid of [`CELL_SIZE`] pixel cells, using the tick
//! counter times `speed` as the third coordinate so the field drifts over
//! time, and maps each normalized sample through a [`ColorScheme`].

use gallery_core::draw::{Frame, Surface};
use gallery_core::error::EngineError;
use gallery_core::frame::{FpsCounter, FrameInfo, InputEvent, Panel, PanelAction};
use gallery_core::params::{number_schema, param_f64_in, param_string};
use gallery_core::prng::Xorshift64;
use gallery_core::Rgba;
use serde_json::{json, Value};

use crate::Perlin;

/// Default spatial frequency of the sampled field.
const DEFAULT_SCALE: f64 = 0.02;
const MIN_SCALE: f64 = 0.005;
const MAX_SCALE: f64 = 0.05;
/// Default advance of the z coordinate per tick.
const DEFAULT_SPEED: f64 = 0.001;
const MIN_SPEED: f64 = 0.0001;
const MAX_SPEED: f64 = 0.002;
/// Edge length of one sampled cell in CSS pixels.
pub const CELL_SIZE: usize = 4;

/// Maps a normalized noise value to a color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorScheme {
    #[default]
    BlueOcean,
    Forest,
    Lava,
    Grayscale,
    Neon,
    Rainbow,
}

impl ColorScheme {
    pub const ALL: [ColorScheme; 6] = [
        ColorScheme::BlueOcean,
        ColorScheme::Forest,
        ColorScheme::Lava,
        ColorScheme::Grayscale,
        ColorScheme::Neon,
        ColorScheme::Rainbow,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ColorScheme::BlueOcean => "blue_ocean",
            ColorScheme::Forest => "forest",
            ColorScheme::Lava => "lava",
            ColorScheme::Grayscale => "grayscale",
            ColorScheme::Neon => "neon",
            ColorScheme::Rainbow => "rainbow",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, EngineError> {
        Self::ALL
            .into_iter()
            .find(|s| s.name() == name)
            .ok_or_else(|| EngineError::invalid_input(format!("unknown color scheme '{name}'")))
    }

    /// Color for `value` in [0, 1]. `time` only affects [`ColorScheme::Rainbow`].
    pub fn color(self, value: f64, time: f64) -> Rgba {
        let c = (value * 128.0).floor();
        let rgb = |r: f64, g: f64, b: f64| Rgba::rgb(r / 255.0, g / 255.0, b / 255.0);
        match self {
            ColorScheme::BlueOcean => rgb(c, (c + 37.0).min(165.0), (c + 122.0).min(250.0)),
            ColorScheme::Forest => rgb((c + 20.0).min(100.0), (c + 100.0).min(200.0), (c + 20.0).min(100.0)),
            ColorScheme::Lava => rgb((c + 127.0).min(255.0), c.min(100.0), (c / 2.0).min(50.0)),
            ColorScheme::Grayscale => {
                let g = (value * 255.0).floor();
                rgb(g, g, g)
            }
            ColorScheme::Neon => Rgba::from_hsl(value * 360.0, 1.0, 0.6),
            ColorScheme::Rainbow => Rgba::from_hsl(value * 360.0 + time, 0.8, 0.6),
        }
    }
}

/// Tunable parameters of the noise panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerlinParams {
    pub scale: f64,
    pub speed: f64,
    pub scheme: ColorScheme,
}

impl Default for PerlinParams {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            speed: DEFAULT_SPEED,
            scheme: ColorScheme::default(),
        }
    }
}

impl PerlinParams {
    /// Extracts parameters from a JSON object, falling back to defaults.
    pub fn from_json(params: &Value) -> Result<Self, EngineError> {
        Self::default().merged(params)
    }

    /// Overlays the keys present in `params` onto `self`, clamping to range.
    pub fn merged(&self, params: &Value) -> Result<Self, EngineError> {
        let scheme = match params.get("scheme") {
            Some(_) => ColorScheme::from_name(&param_string(params, "scheme", self.scheme.name()))?,
            None => self.scheme,
        };
        Ok(Self {
            scale: param_f64_in(params, "scale", self.scale, MIN_SCALE, MAX_SCALE),
            speed: param_f64_in(params, "speed", self.speed, MIN_SPEED, MAX_SPEED),
            scheme,
        })
    }
}

/// Scrolling noise field with selectable color scheme.
pub struct PerlinPanel {
    surface: Surface,
    noise: Perlin,
    rng: Xorshift64,
    params: PerlinParams,
    time: f64,
    playing: bool,
    fps: FpsCounter,
}

impl PerlinPanel {
    pub fn new(surface: Surface, seed: u64, params: PerlinParams) -> Self {
        let mut rng = Xorshift64::new(seed);
        let noise = Perlin::new(rng.next_u64());
        Self {
            surface,
            noise,
            rng,
            params,
            time: 0.0,
            playing: true,
            fps: FpsCounter::new(),
        }
    }

    pub fn from_json(surface: Surface, seed: u64, params: &Value) -> Result<Self, EngineError> {
        Ok(Self::new(surface, seed, PerlinParams::from_json(params)?))
    }

    pub fn params_struct(&self) -> PerlinParams {
        self.params
    }

    /// Ticks elapsed since the last reset.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn noise(&self) -> &Perlin {
        &self.noise
    }

    /// Color of the cell whose top-left corner is at `(x, y)`.
    pub fn color_at(&self, x: f64, y: f64) -> Rgba {
        let z = self.time * self.params.speed;
        let value = self
            .noise
            .noise01(x * self.params.scale, y * self.params.scale, z);
        self.params.scheme.color(value, self.time)
    }

    /// Rewinds time and draws a fresh permutation table.
    pub fn reset(&mut self) {
        self.time = 0.0;
        self.noise.reseed(self.rng.next_u64());
    }
}

impl Panel for PerlinPanel {
    fn name(&self) -> &'static str {
        "perlin"
    }

    fn surface(&self) -> Surface {
        self.surface
    }

    fn update(&mut self, info: &FrameInfo) -> Result<(), EngineError> {
        self.fps.record(info.now_ms);
        if self.playing {
            self.time += 1.0;
        }
        Ok(())
    }

    fn render(&self, frame: &mut Frame) {
        frame.fade(Rgba::rgb8(17, 24, 39).with_alpha(0.1));
        let cell = CELL_SIZE as f64;
        let cols = (self.surface.width / cell).ceil() as usize;
        let rows = (self.surface.height / cell).ceil() as usize;
        for col in 0..cols {
            for row in 0..rows {
                let x = col as f64 * cell;
                let y = row as f64 * cell;
                frame.fill_rect(x, y, cell, cell, self.color_at(x, y));
            }
        }
        frame.text(
            8.0,
            16.0,
            format!("FPS: {}", self.fps.fps()),
            Rgba::WHITE,
            12.0,
        );
    }

    fn handle_input(&mut self, event: &InputEvent, _now_ms: f64) -> Result<(), EngineError> {
        match event {
            InputEvent::Action {
                action: PanelAction::Reset | PanelAction::Regenerate,
            } => self.reset(),
            InputEvent::Action {
                action: PanelAction::TogglePlay,
            } => self.playing = !self.playing,
            _ => {}
        }
        Ok(())
    }

    fn resize(&mut self, surface: Surface) -> Result<(), EngineError> {
        self.surface = surface;
        Ok(())
    }

    fn params(&self) -> Value {
        json!({
            "scale": self.params.scale,
            "speed": self.params.speed,
            "scheme": self.params.scheme.name(),
        })
    }

    fn param_schema(&self) -> Value {
        let names: Vec<&str> = ColorScheme::ALL.iter().map(|s| s.name()).collect();
        json!({
            "scale": number_schema(DEFAULT_SCALE, MIN_SCALE, MAX_SCALE, "Spatial frequency of the noise field"),
            "speed": number_schema(DEFAULT_SPEED, MIN_SPEED, MAX_SPEED, "Advance along the time axis per tick"),
            "scheme": {
                "type": "string",
                "default": ColorScheme::default().name(),
                "enum": names,
                "description": "Color mapping for normalized noise values"
            }
        })
    }

    fn apply_params(&mut self, params: &Value) -> Result<(), EngineError> {
        self.params = self.params.merged(params)?;
        Ok(())
    }
}
