//! Binary space partitioning of the surface.
//!
//! Each internal node splits its rectangle vertically or horizontally at a
//! random ratio in [0.3, 0.7); leaves are tinted from the accent palette.

use gallery_core::color::Rgba;
use gallery_core::draw::{Frame, Surface};
use gallery_core::error::EngineError;
use gallery_core::frame::{FrameInfo, InputEvent, Panel, PanelAction};
use gallery_core::palette::Palette;
use gallery_core::params::param_usize_in;
use gallery_core::prng::Xorshift64;
use serde_json::{json, Value};

const DEFAULT_DEPTH: usize = 3;
const MIN_DEPTH: usize = 1;
const MAX_DEPTH: usize = 5;
const MIN_SPLIT_RATIO: f64 = 0.3;
const SPLIT_RATIO_SPAN: f64 = 0.4;

/// Axis-aligned rectangle given by its top-left corner and size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Splits into (left, right) or (top, bottom) at `ratio` of the extent.
    pub fn split(&self, direction: SplitDirection, ratio: f64) -> (Bounds, Bounds) {
        match direction {
            SplitDirection::Vertical => {
                let w = self.width * ratio;
                (
                    Bounds::new(self.x, self.y, w, self.height),
                    Bounds::new(self.x + w, self.y, self.width - w, self.height),
                )
            }
            SplitDirection::Horizontal => {
                let h = self.height * ratio;
                (
                    Bounds::new(self.x, self.y, self.width, h),
                    Bounds::new(self.x, self.y + h, self.width, self.height - h),
                )
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitDirection {
    /// Cut by a vertical line into left and right halves.
    Vertical,
    /// Cut by a horizontal line into top and bottom halves.
    Horizontal,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BspNode {
    Leaf {
        bounds: Bounds,
        color: Rgba,
    },
    Split {
        bounds: Bounds,
        direction: SplitDirection,
        ratio: f64,
        children: Box<(BspNode, BspNode)>,
    },
}

impl BspNode {
    /// Random partition of `bounds` with every leaf exactly `depth` splits deep.
    pub fn generate(bounds: Bounds, depth: usize, palette: &Palette, rng: &mut Xorshift64) -> BspNode {
        if depth == 0 {
            return BspNode::Leaf {
                bounds,
                color: palette.pick(rng),
            };
        }
        let direction = if rng.next_f64() > 0.5 {
            SplitDirection::Vertical
        } else {
            SplitDirection::Horizontal
        };
        let ratio = MIN_SPLIT_RATIO + rng.next_f64() * SPLIT_RATIO_SPAN;
        let (a, b) = bounds.split(direction, ratio);
        let first = BspNode::generate(a, depth - 1, palette, rng);
        let second = BspNode::generate(b, depth - 1, palette, rng);
        BspNode::Split {
            bounds,
            direction,
            ratio,
            children: Box::new((first, second)),
        }
    }

    pub fn bounds(&self) -> Bounds {
        match self {
            BspNode::Leaf { bounds, .. } | BspNode::Split { bounds, .. } => *bounds,
        }
    }

    /// Longest root-to-leaf split count.
    pub fn depth(&self) -> usize {
        match self {
            BspNode::Leaf { .. } => 0,
            BspNode::Split { children, .. } => 1 + children.0.depth().max(children.1.depth()),
        }
    }

    /// Leaf rectangles and their colors, left-to-right / top-to-bottom first.
    pub fn leaves(&self) -> Vec<(Bounds, Rgba)> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves(&self, out: &mut Vec<(Bounds, Rgba)>) {
        match self {
            BspNode::Leaf { bounds, color } => out.push((*bounds, *color)),
            BspNode::Split { children, .. } => {
                children.0.collect_leaves(out);
                children.1.collect_leaves(out);
            }
        }
    }

    fn draw(&self, frame: &mut Frame) {
        match self {
            BspNode::Leaf { bounds: b, color } => {
                frame.fill_rect(b.x, b.y, b.width, b.height, *color);
                frame.stroke_rect(b.x, b.y, b.width, b.height, Rgba::rgb8(0x60, 0xa5, 0xfa));
            }
            BspNode::Split {
                bounds: b,
                direction,
                ratio,
                children,
            } => {
                children.0.draw(frame);
                children.1.draw(frame);
                let color = Rgba::rgb8(0x60, 0xa5, 0xfa).with_alpha(0x80 as f64 / 255.0);
                match direction {
                    SplitDirection::Vertical => {
                        let x = b.x + b.width * ratio;
                        frame.line((x, b.y), (x, b.y + b.height), color, 2.0);
                    }
                    SplitDirection::Horizontal => {
                        let y = b.y + b.height * ratio;
                        frame.line((b.x, y), (b.x + b.width, y), color, 2.0);
                    }
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BspParams {
    pub depth: usize,
}

impl Default for BspParams {
    fn default() -> Self {
        Self { depth: DEFAULT_DEPTH }
    }
}

impl BspParams {
    pub fn from_json(params: &Value) -> Self {
        Self::default().merged(params)
    }

    pub fn merged(&self, params: &Value) -> Self {
        Self {
            depth: param_usize_in(params, "depth", self.depth, MIN_DEPTH, MAX_DEPTH),
        }
    }
}

pub struct BspPanel {
    surface: Surface,
    params: BspParams,
    rng: Xorshift64,
    palette: Palette,
    root: BspNode,
}

impl BspPanel {
    pub fn new(surface: Surface, seed: u64, params: BspParams) -> Result<Self, EngineError> {
        let mut rng = Xorshift64::new(seed);
        let palette = leaf_palette()?;
        let root = BspNode::generate(full(surface), params.depth, &palette, &mut rng);
        Ok(Self {
            surface,
            params,
            rng,
            palette,
            root,
        })
    }

    pub fn from_json(surface: Surface, seed: u64, params: &Value) -> Result<Self, EngineError> {
        Self::new(surface, seed, BspParams::from_json(params))
    }

    pub fn root(&self) -> &BspNode {
        &self.root
    }

    fn regenerate(&mut self) {
        self.root = BspNode::generate(full(self.surface), self.params.depth, &self.palette, &mut self.rng);
        log::debug!("bsp: regenerated at depth {}", self.params.depth);
    }
}

/// Accent colors at 0x40 alpha.
fn leaf_palette() -> Result<Palette, EngineError> {
    let alpha = 0x40 as f64 / 255.0;
    Palette::new(Palette::accent().colors().iter().map(|c| c.with_alpha(alpha)).collect())
}

fn full(surface: Surface) -> Bounds {
    Bounds::new(0.0, 0.0, surface.width, surface.height)
}

impl Panel for BspPanel {
    fn name(&self) -> &'static str {
        "bsp"
    }

    fn surface(&self) -> Surface {
        self.surface
    }

    fn update(&mut self, _info: &FrameInfo) -> Result<(), EngineError> {
        Ok(())
    }

    fn render(&self, frame: &mut Frame) {
        frame.clear();
        self.root.draw(frame);
    }

    fn handle_input(&mut self, event: &InputEvent, _now_ms: f64) -> Result<(), EngineError> {
        if let InputEvent::Action {
            action: PanelAction::Reset | PanelAction::Regenerate,
        } = event
        {
            self.regenerate();
        }
        Ok(())
    }

    fn resize(&mut self, surface: Surface) -> Result<(), EngineError> {
        self.surface = surface;
        self.regenerate();
        Ok(())
    }

    fn params(&self) -> Value {
        json!({ "depth": self.params.depth })
    }

    fn param_schema(&self) -> Value {
        json!({
            "depth": {
                "type": "integer",
                "default": DEFAULT_DEPTH,
                "min": MIN_DEPTH,
                "max": MAX_DEPTH,
                "description": "Number of recursive splits"
            },
        })
    }

    fn apply_params(&mut self, params: &Value) -> Result<(), EngineError> {
        let next = self.params.merged(params);
        let changed = next != self.params;
        self.params = next;
        if changed {
            self.regenerate();
        }
        Ok(())
    }
}
