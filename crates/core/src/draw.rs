//! Draw primitives emitted by panels.
//!
//! A panel never touches pixels. Its `render` pushes [`DrawCommand`]s into a
//! [`Frame`] sized by the host [`Surface`]; the host (or the CPU rasterizer in
//! `gallery-panels`) replays them. Coordinates are CSS pixels; the device
//! pixel ratio is applied by whoever rasterizes.

use crate::color::Rgba;
use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// Drawing surface dimensions supplied by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    /// Width in CSS pixels.
    pub width: f64,
    /// Height in CSS pixels.
    pub height: f64,
    /// Physical pixels per CSS pixel.
    pub device_pixel_ratio: f64,
}

impl Surface {
    /// Validates that both dimensions and the pixel ratio are positive and finite.
    pub fn new(width: f64, height: f64, device_pixel_ratio: f64) -> Result<Self, EngineError> {
        let ok = |v: f64| v.is_finite() && v > 0.0;
        if !ok(width) || !ok(height) || !ok(device_pixel_ratio) {
            return Err(EngineError::InvalidDimensions);
        }
        Ok(Self {
            width,
            height,
            device_pixel_ratio,
        })
    }

    /// Surface with a device pixel ratio of 1.
    pub fn css(width: f64, height: f64) -> Result<Self, EngineError> {
        Self::new(width, height, 1.0)
    }

    /// Backing-store width in physical pixels.
    pub fn pixel_width(&self) -> usize {
        (self.width * self.device_pixel_ratio).round() as usize
    }

    /// Backing-store height in physical pixels.
    pub fn pixel_height(&self) -> usize {
        (self.height * self.device_pixel_ratio).round() as usize
    }

    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }
}

/// A single 2D drawing instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    /// Clear the whole surface to transparent.
    Clear,
    /// Paint the whole surface with a (typically translucent) color; used for
    /// motion-trail fades.
    Fade { color: Rgba },
    FillRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Rgba,
    },
    StrokeRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Rgba,
        line_width: f64,
    },
    FillCircle {
        cx: f64,
        cy: f64,
        radius: f64,
        color: Rgba,
    },
    StrokeCircle {
        cx: f64,
        cy: f64,
        radius: f64,
        color: Rgba,
        line_width: f64,
    },
    /// Radial gradient disc fading from `inner` at the center to `outer` at
    /// `radius`.
    RadialGlow {
        cx: f64,
        cy: f64,
        radius: f64,
        inner: Rgba,
        outer: Rgba,
    },
    Line {
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
        color: Rgba,
        line_width: f64,
    },
    Polyline {
        points: Vec<[f64; 2]>,
        color: Rgba,
        line_width: f64,
        closed: bool,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
        color: Rgba,
        size: f64,
    },
    /// Straight RGBA8 pixels placed at (x, y), one byte quadruple per pixel.
    Image {
        x: f64,
        y: f64,
        width: usize,
        height: usize,
        rgba: Vec<u8>,
    },
}

/// Command buffer for one rendered frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    surface: Surface,
    commands: Vec<DrawCommand>,
}

impl Frame {
    pub fn new(surface: Surface) -> Self {
        Self {
            surface,
            commands: Vec::new(),
        }
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<DrawCommand> {
        self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn clear(&mut self) {
        self.push(DrawCommand::Clear);
    }

    pub fn fade(&mut self, color: Rgba) {
        self.push(DrawCommand::Fade { color });
    }

    pub fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgba) {
        self.push(DrawCommand::FillRect {
            x,
            y,
            width,
            height,
            color,
        });
    }

    pub fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgba) {
        self.push(DrawCommand::StrokeRect {
            x,
            y,
            width,
            height,
            color,
            line_width: 1.0,
        });
    }

    pub fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Rgba) {
        self.push(DrawCommand::FillCircle {
            cx,
            cy,
            radius,
            color,
        });
    }

    pub fn stroke_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Rgba) {
        self.push(DrawCommand::StrokeCircle {
            cx,
            cy,
            radius,
            color,
            line_width: 1.0,
        });
    }

    pub fn glow(&mut self, cx: f64, cy: f64, radius: f64, inner: Rgba, outer: Rgba) {
        self.push(DrawCommand::RadialGlow {
            cx,
            cy,
            radius,
            inner,
            outer,
        });
    }

    pub fn line(&mut self, from: (f64, f64), to: (f64, f64), color: Rgba, line_width: f64) {
        self.push(DrawCommand::Line {
            x0: from.0,
            y0: from.1,
            x1: to.0,
            y1: to.1,
            color,
            line_width,
        });
    }

    /// Open polyline; skipped when fewer than two points are given.
    pub fn polyline(&mut self, points: Vec<[f64; 2]>, color: Rgba, line_width: f64) {
        if points.len() < 2 {
            return;
        }
        self.push(DrawCommand::Polyline {
            points,
            color,
            line_width,
            closed: false,
        });
    }

    pub fn text(&mut self, x: f64, y: f64, text: impl Into<String>, color: Rgba, size: f64) {
        self.push(DrawCommand::Text {
            x,
            y,
            text: text.into(),
            color,
            size,
        });
    }

    pub fn image(&mut self, x: f64, y: f64, width: usize, height: usize, rgba: Vec<u8>) {
        self.push(DrawCommand::Image {
            x,
            y,
            width,
            height,
            rgba,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface() -> Surface {
        Surface::new(400.0, 300.0, 2.0).unwrap()
    }

    #[test]
    fn surface_rejects_non_positive_or_non_finite() {
        assert!(Surface::css(0.0, 10.0).is_err());
        assert!(Surface::css(10.0, -1.0).is_err());
        assert!(Surface::new(10.0, 10.0, f64::NAN).is_err());
        assert!(Surface::css(f64::INFINITY, 10.0).is_err());
    }

    #[test]
    fn surface_pixel_dimensions_apply_ratio() {
        let s = surface();
        assert_eq!(s.pixel_width(), 800);
        assert_eq!(s.pixel_height(), 600);
        assert_eq!(s.center(), (200.0, 150.0));
    }

    #[test]
    fn frame_helpers_push_in_order() {
        let mut f = Frame::new(surface());
        f.clear();
        f.fill_rect(0.0, 0.0, 4.0, 4.0, Rgba::WHITE);
        f.fill_circle(1.0, 1.0, 2.0, Rgba::BLACK);
        assert_eq!(f.len(), 3);
        assert_eq!(f.commands()[0], DrawCommand::Clear);
        assert!(matches!(f.commands()[2], DrawCommand::FillCircle { .. }));
    }

    #[test]
    fn polyline_with_one_point_is_dropped() {
        let mut f = Frame::new(surface());
        f.polyline(vec![[0.0, 0.0]], Rgba::WHITE, 2.0);
        assert!(f.is_empty());
        f.polyline(vec![[0.0, 0.0], [1.0, 1.0]], Rgba::WHITE, 2.0);
        assert_eq!(f.len(), 1);
    }

    #[test]
    fn commands_serialize_with_op_tag() {
        let mut f = Frame::new(surface());
        f.stroke_rect(1.0, 2.0, 3.0, 4.0, Rgba::from_hex("#60a5fa50").unwrap());
        let v = serde_json::to_value(f.commands()).unwrap();
        assert_eq!(v[0]["op"], "stroke_rect");
        assert_eq!(v[0]["color"], "#60a5fa50");
    }

    #[test]
    fn frame_json_round_trip() {
        let mut f = Frame::new(surface());
        f.text(10.0, 20.0, "Zoom: 1.00x", Rgba::WHITE.with_alpha(0.5), 12.0);
        f.line((0.0, 0.0), (5.0, 5.0), Rgba::WHITE, 1.0);
        let json = serde_json::to_string(&f).unwrap();
        let back: Frame = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back.surface(), f.surface());
    }
}
