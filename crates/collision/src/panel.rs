//! Bouncing-bodies panel.
//!
//! Fifteen bodies drawn from the accent palette bounce around the surface;
//! every impact leaves a burst of sparks that fall under gravity and fade.

use gallery_core::draw::{Frame, Surface};
use gallery_core::error::EngineError;
use gallery_core::frame::{FrameInfo, InputEvent, Panel, PanelAction};
use gallery_core::palette::Palette;
use gallery_core::params::{number_schema, param_f64_in, param_usize_in};
use gallery_core::prng::Xorshift64;
use gallery_core::Rgba;
use serde_json::{json, Value};

use crate::{CollisionConfig, World, DEFAULT_RESTITUTION};

const DEFAULT_SPEED_MULTIPLIER: f64 = 1.0;
const MIN_SPEED_MULTIPLIER: f64 = 0.5;
const MAX_SPEED_MULTIPLIER: f64 = 2.0;
const DEFAULT_BODY_COUNT: usize = 15;
const MIN_BODY_COUNT: usize = 2;
const MAX_BODY_COUNT: usize = 50;
/// 2.0 is perfectly elastic; the default overshoots slightly to keep things lively.
const MIN_RESTITUTION: f64 = 1.0;
const MAX_RESTITUTION: f64 = 3.0;
const BODY_RADIUS: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionParams {
    pub speed_multiplier: f64,
    pub body_count: usize,
    pub restitution: f64,
}

impl Default for CollisionParams {
    fn default() -> Self {
        Self {
            speed_multiplier: DEFAULT_SPEED_MULTIPLIER,
            body_count: DEFAULT_BODY_COUNT,
            restitution: DEFAULT_RESTITUTION,
        }
    }
}

impl CollisionParams {
    /// Extracts parameters from a JSON object, falling back to defaults.
    pub fn from_json(params: &Value) -> Self {
        Self::default().merged(params)
    }

    pub fn merged(&self, params: &Value) -> Self {
        Self {
            speed_multiplier: param_f64_in(
                params,
                "speed_multiplier",
                self.speed_multiplier,
                MIN_SPEED_MULTIPLIER,
                MAX_SPEED_MULTIPLIER,
            ),
            body_count: param_usize_in(params, "body_count", self.body_count, MIN_BODY_COUNT, MAX_BODY_COUNT),
            restitution: param_f64_in(params, "restitution", self.restitution, MIN_RESTITUTION, MAX_RESTITUTION),
        }
    }

    fn config(&self) -> CollisionConfig {
        CollisionConfig {
            restitution: self.restitution,
            speed_multiplier: self.speed_multiplier,
            ..CollisionConfig::default()
        }
    }
}

pub struct CollisionPanel {
    surface: Surface,
    params: CollisionParams,
    rng: Xorshift64,
    palette: Palette,
    world: World,
}

impl CollisionPanel {
    pub fn new(surface: Surface, seed: u64, params: CollisionParams) -> Result<Self, EngineError> {
        let mut rng = Xorshift64::new(seed);
        let palette = Palette::accent();
        let world = World::random(
            surface.width,
            surface.height,
            rng.next_u64(),
            params.config(),
            params.body_count,
            BODY_RADIUS,
            &palette,
        )?;
        Ok(Self {
            surface,
            params,
            rng,
            palette,
            world,
        })
    }

    pub fn from_json(surface: Surface, seed: u64, params: &Value) -> Result<Self, EngineError> {
        Self::new(surface, seed, CollisionParams::from_json(params))
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Replaces the world with a fresh random one sized to the surface.
    fn respawn(&mut self) -> Result<(), EngineError> {
        self.world = World::random(
            self.surface.width,
            self.surface.height,
            self.rng.next_u64(),
            self.params.config(),
            self.params.body_count,
            BODY_RADIUS,
            &self.palette,
        )?;
        Ok(())
    }
}

impl Panel for CollisionPanel {
    fn name(&self) -> &'static str {
        "collision"
    }

    fn surface(&self) -> Surface {
        self.surface
    }

    fn update(&mut self, _info: &FrameInfo) -> Result<(), EngineError> {
        self.world.step();
        Ok(())
    }

    fn render(&self, frame: &mut Frame) {
        frame.fade(Rgba::rgb8(17, 24, 39).with_alpha(0.2));
        for s in self.world.sparks() {
            frame.glow(s.pos.x, s.pos.y, 3.0, s.color.faded(s.life), Rgba::TRANSPARENT);
        }
        let rim = Rgba::WHITE.with_alpha(0x20 as f64 / 255.0);
        for b in self.world.bodies() {
            frame.glow(
                b.pos.x,
                b.pos.y,
                b.radius * 2.0,
                b.color.with_alpha(0x40 as f64 / 255.0),
                Rgba::TRANSPARENT,
            );
            frame.fill_circle(b.pos.x, b.pos.y, b.radius, b.color);
            frame.stroke_circle(b.pos.x, b.pos.y, b.radius, rim);
        }
    }

    fn handle_input(&mut self, event: &InputEvent, _now_ms: f64) -> Result<(), EngineError> {
        if let InputEvent::Action {
            action: PanelAction::Reset | PanelAction::Regenerate,
        } = event
        {
            self.respawn()?;
        }
        Ok(())
    }

    fn resize(&mut self, surface: Surface) -> Result<(), EngineError> {
        self.surface = surface;
        log::debug!("collision: respawning for {}x{}", surface.width, surface.height);
        self.respawn()
    }

    fn params(&self) -> Value {
        json!({
            "speed_multiplier": self.params.speed_multiplier,
            "body_count": self.params.body_count,
            "restitution": self.params.restitution,
        })
    }

    fn param_schema(&self) -> Value {
        json!({
            "speed_multiplier": number_schema(
                DEFAULT_SPEED_MULTIPLIER,
                MIN_SPEED_MULTIPLIER,
                MAX_SPEED_MULTIPLIER,
                "Scales body velocity and the speed cap"
            ),
            "body_count": {
                "type": "integer",
                "default": DEFAULT_BODY_COUNT,
                "min": MIN_BODY_COUNT,
                "max": MAX_BODY_COUNT,
                "description": "Number of bodies spawned on reset"
            },
            "restitution": number_schema(
                DEFAULT_RESTITUTION,
                MIN_RESTITUTION,
                MAX_RESTITUTION,
                "Impulse scale of a collision; 2 is perfectly elastic"
            ),
        })
    }

    fn apply_params(&mut self, params: &Value) -> Result<(), EngineError> {
        let next = self.params.merged(params);
        let respawn = next.body_count != self.params.body_count;
        self.params = next;
        if respawn {
            self.respawn()
        } else {
            self.world.set_config(self.params.config());
            Ok(())
        }
    }
}
