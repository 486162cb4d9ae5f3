#![deny(unsafe_code)]
//! Image filters over RGBA8 buffers.
//!
//! [`convolve`] applies a 3×3 kernel scaled by an intensity factor, reading
//! clamped-to-edge neighbors and leaving alpha untouched. [`grayscale`] uses
//! the Rec. 601 luma weights. [`sample_image`] draws the procedural test
//! picture the filter panel starts from.

pub mod panel;

use gallery_core::color::Rgba;
use gallery_core::error::EngineError;
use image::RgbaImage;

pub use panel::{FiltersPanel, FiltersParams};

pub type Kernel = [[f64; 3]; 3];

pub const BLUR: Kernel = [
    [1.0 / 9.0, 1.0 / 9.0, 1.0 / 9.0],
    [1.0 / 9.0, 1.0 / 9.0, 1.0 / 9.0],
    [1.0 / 9.0, 1.0 / 9.0, 1.0 / 9.0],
];
pub const SHARPEN: Kernel = [[0.0, -1.0, 0.0], [-1.0, 5.0, -1.0], [0.0, -1.0, 0.0]];
pub const EDGE: Kernel = [[-1.0, -1.0, -1.0], [-1.0, 8.0, -1.0], [-1.0, -1.0, -1.0]];
pub const EMBOSS: Kernel = [[-2.0, -1.0, 0.0], [-1.0, 1.0, 1.0], [0.0, 1.0, 2.0]];

/// Rec. 601 luma weights for R, G, B.
const LUMA: [f64; 3] = [0.299, 0.587, 0.114];
/// Radius of the gradient disc in [`sample_image`].
const DISC_RADIUS: f64 = 100.0;
/// Side of the square in [`sample_image`].
const SQUARE_SIDE: f64 = 150.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    None,
    Grayscale,
    Blur,
    Sharpen,
    Edge,
    Emboss,
}

impl Filter {
    pub const ALL: [Filter; 6] = [
        Filter::None,
        Filter::Grayscale,
        Filter::Blur,
        Filter::Sharpen,
        Filter::Edge,
        Filter::Emboss,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Filter::None => "none",
            Filter::Grayscale => "grayscale",
            Filter::Blur => "blur",
            Filter::Sharpen => "sharpen",
            Filter::Edge => "edge",
            Filter::Emboss => "emboss",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, EngineError> {
        Self::ALL
            .into_iter()
            .find(|f| f.name() == name)
            .ok_or_else(|| EngineError::invalid_input(format!("unknown filter '{name}'")))
    }

    /// Convolution kernel, for the filters that have one.
    pub fn kernel(self) -> Option<&'static Kernel> {
        match self {
            Filter::Blur => Some(&BLUR),
            Filter::Sharpen => Some(&SHARPEN),
            Filter::Edge => Some(&EDGE),
            Filter::Emboss => Some(&EMBOSS),
            Filter::None | Filter::Grayscale => None,
        }
    }
}

/// Applies `filter` to `src`. `intensity` scales convolution kernels and is
/// ignored by `None` and `Grayscale`.
pub fn apply(src: &RgbaImage, filter: Filter, intensity: f64) -> RgbaImage {
    match filter {
        Filter::None => src.clone(),
        Filter::Grayscale => grayscale(src),
        _ => match filter.kernel() {
            Some(k) => convolve(src, k, intensity),
            None => src.clone(),
        },
    }
}

fn to_channel(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// 3×3 convolution of the color channels with `kernel * factor`.
pub fn convolve(src: &RgbaImage, kernel: &Kernel, factor: f64) -> RgbaImage {
    let (w, h) = src.dimensions();
    if w == 0 || h == 0 {
        return src.clone();
    }
    RgbaImage::from_fn(w, h, |x, y| {
        let mut acc = [0.0; 3];
        for (ky, row) in kernel.iter().enumerate() {
            for (kx, &k) in row.iter().enumerate() {
                let ix = (x as i64 + kx as i64 - 1).clamp(0, w as i64 - 1) as u32;
                let iy = (y as i64 + ky as i64 - 1).clamp(0, h as i64 - 1) as u32;
                let p = src.get_pixel(ix, iy).0;
                let k = k * factor;
                for c in 0..3 {
                    acc[c] += p[c] as f64 * k;
                }
            }
        }
        let alpha = src.get_pixel(x, y).0[3];
        image::Rgba([to_channel(acc[0]), to_channel(acc[1]), to_channel(acc[2]), alpha])
    })
}

/// Luma grayscale, alpha preserved.
pub fn grayscale(src: &RgbaImage) -> RgbaImage {
    let mut out = src.clone();
    for p in out.pixels_mut() {
        let [r, g, b, a] = p.0;
        let gray = to_channel(LUMA[0] * r as f64 + LUMA[1] * g as f64 + LUMA[2] * b as f64);
        p.0 = [gray, gray, gray, a];
    }
    out
}

/// Procedural test picture: a radial-gradient disc, a square and a triangle
/// on a dark background, placed relative to the image size.
pub fn sample_image(width: u32, height: u32) -> Result<RgbaImage, EngineError> {
    if width == 0 || height == 0 {
        return Err(EngineError::InvalidDimensions);
    }
    let (w, h) = (width as f64, height as f64);
    let background = hex("#1f2937")?;
    let disc_inner = hex("#60a5fa")?;
    let disc_outer = hex("#3b82f6")?;
    let square = hex("#34d399")?;
    let triangle = hex("#f87171")?;

    let disc_center = (0.3 * w, 0.4 * h);
    let square_origin = (0.5 * w, 0.2 * h);
    let tri = [(0.7 * w, 0.7 * h), (0.8 * w, 0.4 * h), (0.9 * w, 0.7 * h)];

    Ok(RgbaImage::from_fn(width, height, |x, y| {
        let (px, py) = (x as f64 + 0.5, y as f64 + 0.5);
        let mut color = background;
        let d = ((px - disc_center.0).powi(2) + (py - disc_center.1).powi(2)).sqrt();
        if d <= DISC_RADIUS {
            color = disc_inner.mix(disc_outer, d / DISC_RADIUS);
        }
        if (square_origin.0..square_origin.0 + SQUARE_SIDE).contains(&px)
            && (square_origin.1..square_origin.1 + SQUARE_SIDE).contains(&py)
        {
            color = square;
        }
        if in_triangle((px, py), tri) {
            color = triangle;
        }
        image::Rgba(color.to_rgba8())
    }))
}

fn hex(s: &str) -> Result<Rgba, EngineError> {
    Rgba::from_hex(s)
}

fn in_triangle(p: (f64, f64), t: [(f64, f64); 3]) -> bool {
    let edge = |a: (f64, f64), b: (f64, f64)| (b.0 - a.0) * (p.1 - a.1) - (b.1 - a.1) * (p.0 - a.0);
    let d1 = edge(t[0], t[1]);
    let d2 = edge(t[1], t[2]);
    let d3 = edge(t[2], t[0]);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}
