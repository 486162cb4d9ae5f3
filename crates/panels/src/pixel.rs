//! Pure-computation rasterization of [`Frame`] command lists into RGBA8.
//!
//! A [`Raster`] behaves like a canvas backing store: it persists between
//! frames so `Fade` trails accumulate, and every command is composited with
//! straight-alpha source-over. Coverage is binary (a pixel is painted when its
//! center falls inside the shape); there is no anti-aliasing and `Text` is
//! not rasterized.

use gallery_core::color::Rgba;
use gallery_core::draw::{DrawCommand, Frame};
use gallery_core::error::EngineError;

/// Minimum stroke width in physical pixels, so hairlines stay visible.
const MIN_STROKE_PX: f64 = 1.0;

/// RGBA8 pixel buffer, row-major, four bytes per pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl Raster {
    /// Transparent raster of `width x height` physical pixels.
    pub fn new(width: usize, height: usize) -> Result<Self, EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        let len = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(4))
            .ok_or(EngineError::InvalidDimensions)?;
        Ok(Self {
            width,
            height,
            data: vec![0; len],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// The pixel at `(x, y)`, or `None` outside the raster.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 4;
        Some([self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]])
    }

    /// Replays `frame` on top of the current contents. If the frame's surface
    /// has a different backing size the raster is reallocated first.
    pub fn draw(&mut self, frame: &Frame) -> Result<(), EngineError> {
        let surface = frame.surface();
        let (w, h) = (surface.pixel_width(), surface.pixel_height());
        if (w, h) != (self.width, self.height) {
            log::debug!("raster: reallocating {}x{} -> {w}x{h}", self.width, self.height);
            *self = Raster::new(w, h)?;
        }
        let scale = surface.device_pixel_ratio;
        for command in frame.commands() {
            self.apply(command, scale);
        }
        Ok(())
    }

    fn apply(&mut self, command: &DrawCommand, s: f64) {
        match command {
            DrawCommand::Clear => self.data.fill(0),
            DrawCommand::Fade { color } => {
                for y in 0..self.height {
                    for x in 0..self.width {
                        self.blend(x, y, *color);
                    }
                }
            }
            DrawCommand::FillRect {
                x,
                y,
                width,
                height,
                color,
            } => self.fill_rect(x * s, y * s, width * s, height * s, *color),
            DrawCommand::StrokeRect {
                x,
                y,
                width,
                height,
                color,
                line_width,
            } => {
                let (x0, y0, x1, y1) = (x * s, y * s, (x + width) * s, (y + height) * s);
                let lw = line_width * s;
                self.segment(x0, y0, x1, y0, lw, *color);
                self.segment(x1, y0, x1, y1, lw, *color);
                self.segment(x1, y1, x0, y1, lw, *color);
                self.segment(x0, y1, x0, y0, lw, *color);
            }
            DrawCommand::FillCircle {
                cx,
                cy,
                radius,
                color,
            } => {
                let r = radius * s;
                self.shade_disc(cx * s, cy * s, r, |d| (d <= r).then_some(*color));
            }
            DrawCommand::StrokeCircle {
                cx,
                cy,
                radius,
                color,
                line_width,
            } => {
                let r = radius * s;
                let half = (line_width * s).max(MIN_STROKE_PX) / 2.0;
                self.shade_disc(cx * s, cy * s, r + half, |d| {
                    ((d - r).abs() <= half).then_some(*color)
                });
            }
            DrawCommand::RadialGlow {
                cx,
                cy,
                radius,
                inner,
                outer,
            } => {
                let r = radius * s;
                if r > 0.0 {
                    self.shade_disc(cx * s, cy * s, r, |d| {
                        (d <= r).then(|| inner.mix(*outer, d / r))
                    });
                }
            }
            DrawCommand::Line {
                x0,
                y0,
                x1,
                y1,
                color,
                line_width,
            } => self.segment(x0 * s, y0 * s, x1 * s, y1 * s, line_width * s, *color),
            DrawCommand::Polyline {
                points,
                color,
                line_width,
                closed,
            } => {
                for pair in points.windows(2) {
                    let ([ax, ay], [bx, by]) = (pair[0], pair[1]);
                    self.segment(ax * s, ay * s, bx * s, by * s, line_width * s, *color);
                }
                if *closed && points.len() > 2 {
                    if let (Some(&[ax, ay]), Some(&[bx, by])) = (points.last(), points.first()) {
                        self.segment(ax * s, ay * s, bx * s, by * s, line_width * s, *color);
                    }
                }
            }
            DrawCommand::Text { text, .. } => {
                log::trace!("raster: skipping text {text:?}");
            }
            DrawCommand::Image {
                x,
                y,
                width,
                height,
                rgba,
            } => self.image(x * s, y * s, *width, *height, rgba, s),
        }
    }

    /// Source-over composite of `color` onto pixel `(x, y)`.
    fn blend(&mut self, x: usize, y: usize, color: Rgba) {
        let sa = color.a.clamp(0.0, 1.0);
        if sa <= 0.0 {
            return;
        }
        let i = (y * self.width + x) * 4;
        let da = self.data[i + 3] as f64 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        let channel = |src: f64, dst: u8| {
            let dst = dst as f64 / 255.0;
            let v = (src.clamp(0.0, 1.0) * sa + dst * da * (1.0 - sa)) / out_a;
            (v * 255.0).round().clamp(0.0, 255.0) as u8
        };
        self.data[i] = channel(color.r, self.data[i]);
        self.data[i + 1] = channel(color.g, self.data[i + 1]);
        self.data[i + 2] = channel(color.b, self.data[i + 2]);
        self.data[i + 3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    }

    /// Pixel index range whose centers fall in `[lo, hi)`, clipped to `len`.
    fn span(lo: f64, hi: f64, len: usize) -> std::ops::Range<usize> {
        let start = (lo - 0.5).ceil().max(0.0);
        let end = (hi - 0.5).ceil().max(0.0);
        let clip = |v: f64| (v as usize).min(len);
        clip(start)..clip(end)
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgba) {
        let (x0, x1) = if w < 0.0 { (x + w, x) } else { (x, x + w) };
        let (y0, y1) = if h < 0.0 { (y + h, y) } else { (y, y + h) };
        for py in Self::span(y0, y1, self.height) {
            for px in Self::span(x0, x1, self.width) {
                self.blend(px, py, color);
            }
        }
    }

    /// Visits pixels within `reach` of `(cx, cy)` and paints the color
    /// `shade` returns for each center distance.
    fn shade_disc(&mut self, cx: f64, cy: f64, reach: f64, shade: impl Fn(f64) -> Option<Rgba>) {
        if reach <= 0.0 {
            return;
        }
        for py in Self::span(cy - reach, cy + reach + 1.0, self.height) {
            for px in Self::span(cx - reach, cx + reach + 1.0, self.width) {
                let dx = px as f64 + 0.5 - cx;
                let dy = py as f64 + 0.5 - cy;
                if let Some(color) = shade((dx * dx + dy * dy).sqrt()) {
                    self.blend(px, py, color);
                }
            }
        }
    }

    /// Thick line segment: every pixel whose center lies within half the
    /// width of the segment.
    fn segment(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, width: f64, color: Rgba) {
        let half = width.max(MIN_STROKE_PX) / 2.0;
        let (dx, dy) = (x1 - x0, y1 - y0);
        let len2 = dx * dx + dy * dy;
        let xs = Self::span(x0.min(x1) - half, x0.max(x1) + half + 1.0, self.width);
        let ys = Self::span(y0.min(y1) - half, y0.max(y1) + half + 1.0, self.height);
        for py in ys {
            for px in xs.clone() {
                let (cx, cy) = (px as f64 + 0.5, py as f64 + 0.5);
                let t = if len2 > 0.0 {
                    (((cx - x0) * dx + (cy - y0) * dy) / len2).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let (nx, ny) = (x0 + t * dx - cx, y0 + t * dy - cy);
                if nx * nx + ny * ny <= half * half {
                    self.blend(px, py, color);
                }
            }
        }
    }

    /// Nearest-neighbor placement of an RGBA8 block scaled by `scale`.
    fn image(&mut self, x: f64, y: f64, w: usize, h: usize, rgba: &[u8], scale: f64) {
        if rgba.len() < w * h * 4 || scale <= 0.0 {
            log::warn!("raster: image buffer too short for {w}x{h}");
            return;
        }
        for py in Self::span(y, y + h as f64 * scale, self.height) {
            let sy = (((py as f64 + 0.5 - y) / scale) as usize).min(h - 1);
            for px in Self::span(x, x + w as f64 * scale, self.width) {
                let sx = (((px as f64 + 0.5 - x) / scale) as usize).min(w - 1);
                let i = (sy * w + sx) * 4;
                let c = Rgba::rgb8(rgba[i], rgba[i + 1], rgba[i + 2]).with_alpha(rgba[i + 3] as f64 / 255.0);
                self.blend(px, py, c);
            }
        }
    }
}

/// Rasterizes a single frame onto a fresh transparent buffer.
pub fn frame_to_rgba(frame: &Frame) -> Result<Vec<u8>, EngineError> {
    let surface = frame.surface();
    let mut raster = Raster::new(surface.pixel_width(), surface.pixel_height())?;
    raster.draw(frame)?;
    Ok(raster.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gallery_core::draw::Surface;

    fn frame(w: f64, h: f64) -> Frame {
        Frame::new(Surface::css(w, h).unwrap())
    }

    fn raster_of(f: &Frame) -> Raster {
        let s = f.surface();
        let mut r = Raster::new(s.pixel_width(), s.pixel_height()).unwrap();
        r.draw(f).unwrap();
        r
    }

    const RED: [u8; 4] = [255, 0, 0, 255];

    // ---- Buffer tests ----

    #[test]
    fn frame_to_rgba_correct_length() {
        let buf = frame_to_rgba(&frame(8.0, 4.0)).unwrap();
        assert_eq!(buf.len(), 8 * 4 * 4);
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn zero_sized_raster_is_rejected() {
        assert!(matches!(Raster::new(0, 5), Err(EngineError::InvalidDimensions)));
    }

    #[test]
    fn device_pixel_ratio_scales_backing_store() {
        let mut f = Frame::new(Surface::new(10.0, 5.0, 2.0).unwrap());
        f.fill_rect(0.0, 0.0, 1.0, 1.0, Rgba::rgb8(255, 0, 0));
        let r = raster_of(&f);
        assert_eq!((r.width(), r.height()), (20, 10));
        assert_eq!(r.pixel(1, 1), Some(RED));
        assert_eq!(r.pixel(2, 2), Some([0, 0, 0, 0]));
    }

    // ---- Shape tests ----

    #[test]
    fn fill_rect_covers_exact_pixels() {
        let mut f = frame(10.0, 10.0);
        f.fill_rect(2.0, 3.0, 4.0, 2.0, Rgba::rgb8(255, 0, 0));
        let r = raster_of(&f);
        let painted = (0..10)
            .flat_map(|y| (0..10).map(move |x| (x, y)))
            .filter(|&(x, y)| r.pixel(x, y) == Some(RED))
            .count();
        assert_eq!(painted, 8);
        assert_eq!(r.pixel(2, 3), Some(RED));
        assert_eq!(r.pixel(5, 4), Some(RED));
        assert_eq!(r.pixel(6, 4), Some([0, 0, 0, 0]));
    }

    #[test]
    fn fill_circle_is_round() {
        let mut f = frame(20.0, 20.0);
        f.fill_circle(10.0, 10.0, 5.0, Rgba::rgb8(255, 0, 0));
        let r = raster_of(&f);
        assert_eq!(r.pixel(10, 10), Some(RED));
        assert_eq!(r.pixel(14, 10), Some(RED));
        assert_eq!(r.pixel(14, 14), Some([0, 0, 0, 0]));
    }

    #[test]
    fn stroke_circle_leaves_center_empty() {
        let mut f = frame(20.0, 20.0);
        f.stroke_circle(10.0, 10.0, 6.0, Rgba::rgb8(255, 0, 0));
        let r = raster_of(&f);
        assert_eq!(r.pixel(10, 10), Some([0, 0, 0, 0]));
        assert_eq!(r.pixel(15, 9), Some(RED));
    }

    #[test]
    fn horizontal_line_paints_its_row() {
        let mut f = frame(10.0, 10.0);
        f.line((0.0, 5.0), (10.0, 5.0), Rgba::rgb8(255, 0, 0), 2.0);
        let r = raster_of(&f);
        for x in 0..10 {
            assert_eq!(r.pixel(x, 4), Some(RED));
            assert_eq!(r.pixel(x, 5), Some(RED));
            assert_eq!(r.pixel(x, 7), Some([0, 0, 0, 0]));
        }
    }

    #[test]
    fn glow_fades_outward() {
        let mut f = frame(20.0, 20.0);
        f.glow(10.0, 10.0, 8.0, Rgba::WHITE, Rgba::TRANSPARENT);
        let r = raster_of(&f);
        let center = r.pixel(10, 10).unwrap()[3];
        let edge = r.pixel(16, 10).unwrap()[3];
        assert!(center > edge, "{center} <= {edge}");
        assert_eq!(r.pixel(0, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn image_is_copied_at_offset() {
        let mut f = frame(6.0, 6.0);
        f.image(2.0, 1.0, 2, 1, vec![255, 0, 0, 255, 0, 0, 255, 255]);
        let r = raster_of(&f);
        assert_eq!(r.pixel(2, 1), Some(RED));
        assert_eq!(r.pixel(3, 1), Some([0, 0, 255, 255]));
        assert_eq!(r.pixel(4, 1), Some([0, 0, 0, 0]));
    }

    // ---- Compositing tests ----

    #[test]
    fn half_alpha_over_opaque_mixes() {
        let mut f = frame(1.0, 1.0);
        f.fill_rect(0.0, 0.0, 1.0, 1.0, Rgba::BLACK);
        f.fill_rect(0.0, 0.0, 1.0, 1.0, Rgba::WHITE.with_alpha(0.5));
        let r = raster_of(&f);
        assert_eq!(r.pixel(0, 0), Some([128, 128, 128, 255]));
    }

    #[test]
    fn fade_accumulates_across_frames() {
        let s = Surface::css(2.0, 2.0).unwrap();
        let mut r = Raster::new(2, 2).unwrap();
        let mut first = Frame::new(s);
        first.fill_rect(0.0, 0.0, 2.0, 2.0, Rgba::WHITE);
        r.draw(&first).unwrap();
        let mut fade = Frame::new(s);
        fade.fade(Rgba::BLACK.with_alpha(0.5));
        r.draw(&fade).unwrap();
        let once = r.pixel(0, 0).unwrap()[0];
        r.draw(&fade).unwrap();
        let twice = r.pixel(0, 0).unwrap()[0];
        assert_eq!(once, 128);
        assert!(twice < once);
    }

    #[test]
    fn clear_resets_to_transparent() {
        let mut f = frame(3.0, 3.0);
        f.fill_rect(0.0, 0.0, 3.0, 3.0, Rgba::WHITE);
        f.clear();
        assert!(raster_of(&f).as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn resized_frame_reallocates() {
        let mut r = Raster::new(4, 4).unwrap();
        r.draw(&frame(6.0, 2.0)).unwrap();
        assert_eq!((r.width(), r.height()), (6, 2));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn arbitrary_shapes_never_panic(
                x in -50.0_f64..150.0,
                y in -50.0_f64..150.0,
                size in 0.0_f64..80.0,
                lw in 0.0_f64..10.0,
                a in 0.0_f64..1.0,
            ) {
                let mut f = frame(40.0, 30.0);
                let c = Rgba::rgb8(10, 200, 30).with_alpha(a);
                f.fill_rect(x, y, size, -size, c);
                f.stroke_rect(x, y, size, size, c);
                f.fill_circle(x, y, size, c);
                f.stroke_circle(x, y, size, c);
                f.glow(x, y, size, c, Rgba::TRANSPARENT);
                f.line((x, y), (y, x), c, lw);
                f.polyline(vec![[x, y], [size, x], [y, size]], c, lw);
                let buf = frame_to_rgba(&f).unwrap();
                prop_assert_eq!(buf.len(), 40 * 30 * 4);
            }
        }
    }
}
