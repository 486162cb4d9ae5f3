//! Zoomable line chart of a noisy sine wave with two smoothing overlays.

use gallery_core::draw::{Frame, Surface};
use gallery_core::error::EngineError;
use gallery_core::frame::{FrameInfo, InputEvent, Panel, PanelAction};
use gallery_core::params::{number_schema, param_f64_in, param_usize_in};
use gallery_core::prng::Xorshift64;
use gallery_core::Rgba;
use serde_json::{json, Value};

use crate::{SmoothedSeries, Viewport};

const DEFAULT_SAMPLES: usize = 100;
const MIN_SAMPLES: usize = 10;
const MAX_SAMPLES: usize = 1000;
const DEFAULT_EMA_ALPHA: f64 = 0.2;
const DEFAULT_DES_ALPHA: f64 = 0.2;
const DEFAULT_DES_BETA: f64 = 0.1;
const MIN_FACTOR: f64 = 0.01;
const MAX_FACTOR: f64 = 1.0;
/// Data values are mapped from [-60, 60] onto the surface height.
const VALUE_OFFSET: f64 = 60.0;
const VALUE_SPAN: f64 = 120.0;
const GRID_SPACING: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineChartParams {
    pub samples: usize,
    pub ema_alpha: f64,
    pub des_alpha: f64,
    pub des_beta: f64,
}

impl Default for LineChartParams {
    fn default() -> Self {
        Self {
            samples: DEFAULT_SAMPLES,
            ema_alpha: DEFAULT_EMA_ALPHA,
            des_alpha: DEFAULT_DES_ALPHA,
            des_beta: DEFAULT_DES_BETA,
        }
    }
}

impl LineChartParams {
    pub fn from_json(params: &Value) -> Self {
        Self::default().merged(params)
    }

    pub fn merged(&self, params: &Value) -> Self {
        Self {
            samples: param_usize_in(params, "samples", self.samples, MIN_SAMPLES, MAX_SAMPLES),
            ema_alpha: param_f64_in(params, "ema_alpha", self.ema_alpha, MIN_FACTOR, MAX_FACTOR),
            des_alpha: param_f64_in(params, "des_alpha", self.des_alpha, MIN_FACTOR, MAX_FACTOR),
            des_beta: param_f64_in(params, "des_beta", self.des_beta, MIN_FACTOR, MAX_FACTOR),
        }
    }
}

pub struct LineChartPanel {
    surface: Surface,
    params: LineChartParams,
    rng: Xorshift64,
    series: SmoothedSeries,
    viewport: Viewport,
}

impl LineChartPanel {
    pub fn new(surface: Surface, seed: u64, params: LineChartParams) -> Result<Self, EngineError> {
        let mut rng = Xorshift64::new(seed);
        let series = generate(&params, &mut rng)?;
        Ok(Self {
            surface,
            params,
            rng,
            series,
            viewport: Viewport::default(),
        })
    }

    pub fn from_json(surface: Surface, seed: u64, params: &Value) -> Result<Self, EngineError> {
        Self::new(surface, seed, LineChartParams::from_json(params))
    }

    pub fn series(&self) -> &SmoothedSeries {
        &self.series
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn draw_series(&self, frame: &mut Frame, data: &[f64], color: Rgba) {
        let visible = &data[self.viewport.visible(data.len())];
        let (w, h) = (self.surface.width, self.surface.height);
        let points = visible
            .iter()
            .enumerate()
            .map(|(i, v)| {
                [
                    i as f64 / visible.len() as f64 * w,
                    (v + VALUE_OFFSET) * (h / VALUE_SPAN),
                ]
            })
            .collect();
        frame.polyline(points, color, 2.0);
    }
}

fn generate(params: &LineChartParams, rng: &mut Xorshift64) -> Result<SmoothedSeries, EngineError> {
    SmoothedSeries::noisy_sine(params.samples, params.ema_alpha, params.des_alpha, params.des_beta, rng)
}

impl Panel for LineChartPanel {
    fn name(&self) -> &'static str {
        "line_chart"
    }

    fn surface(&self) -> Surface {
        self.surface
    }

    fn update(&mut self, _info: &FrameInfo) -> Result<(), EngineError> {
        Ok(())
    }

    fn render(&self, frame: &mut Frame) {
        frame.clear();
        let (w, h) = (self.surface.width, self.surface.height);
        let grid = Rgba::rgb8(0x2d, 0x37, 0x48).with_alpha(0x50 as f64 / 255.0);
        let spacing = GRID_SPACING * self.viewport.zoom();
        let mut x = 0.0;
        while x < w {
            frame.line((x, 0.0), (x, h), grid, 1.0);
            x += spacing;
        }
        let mut y = 0.0;
        while y < h {
            frame.line((0.0, y), (w, y), grid, 1.0);
            y += GRID_SPACING;
        }

        self.draw_series(frame, &self.series.raw, Rgba::rgb8(0x94, 0xa3, 0xb8));
        self.draw_series(frame, &self.series.ema, Rgba::rgb8(0x60, 0xa5, 0xfa));
        self.draw_series(frame, &self.series.des, Rgba::rgb8(0x34, 0xd3, 0x99));

        frame.text(
            10.0,
            20.0,
            format!("Zoom: {:.2}x", self.viewport.zoom()),
            Rgba::WHITE.with_alpha(0x50 as f64 / 255.0),
            12.0,
        );
    }

    fn handle_input(&mut self, event: &InputEvent, _now_ms: f64) -> Result<(), EngineError> {
        match *event {
            InputEvent::Wheel { x, delta_y, .. } => {
                let cursor = (x / self.surface.width).clamp(0.0, 1.0);
                if self.viewport.zoom_at(cursor, delta_y) {
                    log::trace!(
                        "line_chart: zoom {:.2} start {:.3}",
                        self.viewport.zoom(),
                        self.viewport.start()
                    );
                }
            }
            InputEvent::Action {
                action: PanelAction::Reset,
            } => self.viewport = Viewport::default(),
            InputEvent::Action {
                action: PanelAction::Regenerate,
            } => self.series = generate(&self.params, &mut self.rng)?,
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
            "samples": self.params.samples,
            "ema_alpha": self.params.ema_alpha,
            "des_alpha": self.params.des_alpha,
            "des_beta": self.params.des_beta,
        })
    }

    fn param_schema(&self) -> Value {
        json!({
            "samples": {
                "type": "integer",
                "default": DEFAULT_SAMPLES,
                "min": MIN_SAMPLES,
                "max": MAX_SAMPLES,
                "description": "Length of the generated series"
            },
            "ema_alpha": number_schema(DEFAULT_EMA_ALPHA, MIN_FACTOR, MAX_FACTOR, "EMA smoothing factor"),
            "des_alpha": number_schema(DEFAULT_DES_ALPHA, MIN_FACTOR, MAX_FACTOR, "Holt level factor"),
            "des_beta": number_schema(DEFAULT_DES_BETA, MIN_FACTOR, MAX_FACTOR, "Holt trend factor"),
        })
    }

    /// Re-smooths the current samples, or draws a new series if the sample
    /// count changed.
    fn apply_params(&mut self, params: &Value) -> Result<(), EngineError> {
        let next = self.params.merged(params);
        let regenerate = next.samples != self.params.samples;
        self.params = next;
        self.series = if regenerate {
            generate(&self.params, &mut self.rng)?
        } else {
            SmoothedSeries::from_raw(
                self.series.raw.clone(),
                next.ema_alpha,
                next.des_alpha,
                next.des_beta,
            )?
        };
        Ok(())
    }
}
