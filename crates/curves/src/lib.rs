#![deny(unsafe_code)]
//! Curve fitting and smoothing panels.
//!
//! - [`smooth_stroke`] turns a hand-drawn polyline into a Catmull-Rom curve.
//! - [`Viewport`] is the zoom/pan window of the line chart; zooming keeps the
//!   sample under the cursor in place.
//! - [`SmoothedSeries`] holds a noisy sine wave together with its EMA and
//!   double-exponential smoothings.

pub mod chart;
pub mod gesture;

use gallery_core::error::EngineError;
use gallery_core::numeric::{catmull_rom, double_exponential_smoothing, ema};
use gallery_core::prng::Xorshift64;
use glam::DVec2;

pub use chart::{LineChartPanel, LineChartParams};
pub use gesture::{GesturePanel, GestureParams};

/// Curve samples per stroke segment.
pub const DEFAULT_SUBDIVISIONS: usize = 10;
pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 5.0;
/// Zoom change per unit of wheel delta.
pub const ZOOM_SENSITIVITY: f64 = 0.001;

/// Catmull-Rom curve through a stroke.
///
/// Each window of four consecutive points `p0..p3` contributes the segment
/// `p1 → p2`, sampled at `subdivisions` evenly spaced `t` values; the final
/// segment end is appended once. The curve therefore runs from the second
/// point to the second-to-last. Strokes of fewer than four points (or zero
/// subdivisions) come back unchanged.
pub fn smooth_stroke(points: &[DVec2], subdivisions: usize) -> Vec<DVec2> {
    if points.len() < 4 || subdivisions == 0 {
        return points.to_vec();
    }
    let mut out = Vec::with_capacity((points.len() - 3) * subdivisions + 1);
    for w in points.windows(4) {
        for k in 0..subdivisions {
            let t = k as f64 / subdivisions as f64;
            out.push(DVec2::new(
                catmull_rom(w[0].x, w[1].x, w[2].x, w[3].x, t),
                catmull_rom(w[0].y, w[1].y, w[2].y, w[3].y, t),
            ));
        }
    }
    out.push(points[points.len() - 2]);
    out
}

/// Horizontal window over a series, in fractions of its length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    zoom: f64,
    start: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { zoom: 1.0, start: 0.0 }
    }
}

impl Viewport {
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Left edge as a fraction of the series length.
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Applies a wheel step at `cursor` (fraction of the surface width).
    ///
    /// Negative `delta_y` zooms in. Returns `false` when the zoom is already
    /// pinned at the limit in that direction.
    pub fn zoom_at(&mut self, cursor: f64, delta_y: f64) -> bool {
        let zoom = (self.zoom * (1.0 - delta_y * ZOOM_SENSITIVITY)).clamp(MIN_ZOOM, MAX_ZOOM);
        if zoom == self.zoom {
            return false;
        }
        let width = 1.0 / zoom;
        let offset = cursor / self.zoom;
        // Below 1x the window is wider than the data; pin it to the start.
        self.start = (self.start + offset * (1.0 / self.zoom - 1.0 / zoom))
            .min(1.0 - width)
            .max(0.0);
        self.zoom = zoom;
        true
    }

    /// Index range of the visible samples of a series of `len`.
    pub fn visible(&self, len: usize) -> std::ops::Range<usize> {
        let start = ((self.start * len as f64).floor() as usize).min(len);
        let end = ((start as f64 + len as f64 / self.zoom).floor() as usize).min(len);
        start..end
    }
}

/// A noisy series and its two smoothings.
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothedSeries {
    pub raw: Vec<f64>,
    pub ema: Vec<f64>,
    pub des: Vec<f64>,
}

impl SmoothedSeries {
    /// `raw[i] = 50*sin(0.1*i) + U[0, 20)`, smoothed with EMA(`alpha`) and
    /// Holt(`alpha_des`, `beta`).
    pub fn noisy_sine(
        len: usize,
        alpha: f64,
        alpha_des: f64,
        beta: f64,
        rng: &mut Xorshift64,
    ) -> Result<Self, EngineError> {
        let raw: Vec<f64> = (0..len)
            .map(|i| (i as f64 * 0.1).sin() * 50.0 + rng.next_f64() * 20.0)
            .collect();
        Self::from_raw(raw, alpha, alpha_des, beta)
    }

    pub fn from_raw(raw: Vec<f64>, alpha: f64, alpha_des: f64, beta: f64) -> Result<Self, EngineError> {
        let ema = ema(&raw, alpha)?;
        let des = double_exponential_smoothing(&raw, alpha_des, beta)?;
        Ok(Self { raw, ema, des })
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}
