#![deny(unsafe_code)]
//! Elastic circle collisions inside a walled box.
//!
//! Each [`World::step`] integrates every body, reflects it off the walls,
//! applies occasional random jitter and a speed cap, then resolves every
//! overlapping pair by pushing the bodies apart and exchanging momentum
//! along the contact normal. Wall hits and collisions emit short-lived
//! [`Spark`]s whose speed scales with the impact.

pub mod panel;

use gallery_core::color::Rgba;
use gallery_core::error::EngineError;
use gallery_core::palette::Palette;
use gallery_core::prng::Xorshift64;
use glam::DVec2;

pub use panel::{CollisionPanel, CollisionParams};

/// Default impulse scale; 2.0 is a perfectly elastic exchange.
pub const DEFAULT_RESTITUTION: f64 = 2.2;
/// Default velocity multiplier applied after every bounce.
pub const DEFAULT_GAIN: f64 = 1.001;
/// Speed cap before the speed multiplier is applied.
pub const DEFAULT_MAX_SPEED: f64 = 20.0;
/// Per-body, per-tick probability of a random nudge.
pub const DEFAULT_JITTER_CHANCE: f64 = 0.01;
/// Maximum magnitude of one jitter component.
const JITTER_STRENGTH: f64 = 0.5;
/// Impact speed to spark intensity.
const SPARK_INTENSITY_SCALE: f64 = 0.2;
/// Downward acceleration of sparks per tick.
const SPARK_GRAVITY: f64 = 0.2;
/// Life lost by a spark per tick.
const SPARK_DECAY: f64 = 0.03;

/// A moving circle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub pos: DVec2,
    pub vel: DVec2,
    pub radius: f64,
    pub color: Rgba,
}

impl Body {
    pub fn new(pos: DVec2, vel: DVec2, radius: f64, color: Rgba) -> Self {
        Self {
            pos,
            vel,
            radius,
            color,
        }
    }

    pub fn overlaps(&self, other: &Body) -> bool {
        self.pos.distance(other.pos) < self.radius + other.radius
    }
}

/// A decaying particle emitted on impact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spark {
    pub pos: DVec2,
    pub vel: DVec2,
    /// Remaining life in (0, 1]; removed once it reaches 0.
    pub life: f64,
    pub color: Rgba,
}

/// Result of resolving one overlapping pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Midpoint between the separated centers.
    pub point: DVec2,
    /// Relative speed of the impact, used to size the spark burst.
    pub impact_speed: f64,
}

/// Tunable physics constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionConfig {
    pub restitution: f64,
    pub gain: f64,
    pub max_speed: f64,
    pub speed_multiplier: f64,
    pub jitter_chance: f64,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            restitution: DEFAULT_RESTITUTION,
            gain: DEFAULT_GAIN,
            max_speed: DEFAULT_MAX_SPEED,
            speed_multiplier: 1.0,
            jitter_chance: DEFAULT_JITTER_CHANCE,
        }
    }
}

/// Pushes two overlapping bodies apart and applies the collision impulse.
///
/// Returns `None` (and leaves both bodies untouched) when they do not overlap
/// or their centers coincide, since the contact normal is then undefined.
pub fn resolve_pair(b1: &mut Body, b2: &mut Body, restitution: f64, gain: f64) -> Option<Contact> {
    let delta = b2.pos - b1.pos;
    let distance = delta.length();
    if distance == 0.0 || distance >= b1.radius + b2.radius {
        return None;
    }
    let normal = delta / distance;
    let push = normal * ((b1.radius + b2.radius - distance) / 2.0);
    b1.pos -= push;
    b2.pos += push;

    let p = restitution * normal.dot(b1.vel - b2.vel) / 2.0;
    let old_v1 = b1.vel;
    b1.vel = (b1.vel - normal * p) * gain;
    b2.vel = (b2.vel + normal * p) * gain;

    Some(Contact {
        point: b1.pos + (b2.pos - b1.pos) / 2.0,
        impact_speed: (old_v1 - b2.vel).length(),
    })
}

/// Total kinetic energy `Σ ½|v|²` (unit mass).
pub fn kinetic_energy(bodies: &[Body]) -> f64 {
    bodies.iter().map(|b| 0.5 * b.vel.length_squared()).sum()
}

/// The collision simulation: bodies, live sparks, and the walled box.
#[derive(Debug, Clone)]
pub struct World {
    width: f64,
    height: f64,
    bodies: Vec<Body>,
    sparks: Vec<Spark>,
    config: CollisionConfig,
    rng: Xorshift64,
}

impl World {
    /// Empty world of the given size.
    ///
    /// Returns `EngineError::InvalidDimensions` unless both sides are
    /// positive and finite.
    pub fn new(width: f64, height: f64, seed: u64, config: CollisionConfig) -> Result<Self, EngineError> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(EngineError::InvalidDimensions);
        }
        Ok(Self {
            width,
            height,
            bodies: Vec::new(),
            sparks: Vec::new(),
            config,
            rng: Xorshift64::new(seed),
        })
    }

    /// World filled with `count` randomly placed bodies of `radius`,
    /// colored from `palette`, with velocity components in [-6, 6).
    pub fn random(
        width: f64,
        height: f64,
        seed: u64,
        config: CollisionConfig,
        count: usize,
        radius: f64,
        palette: &Palette,
    ) -> Result<Self, EngineError> {
        let mut world = Self::new(width, height, seed, config)?;
        world.populate(count, radius, palette);
        Ok(world)
    }

    /// Replaces all bodies with `count` fresh random ones and clears sparks.
    pub fn populate(&mut self, count: usize, radius: f64, palette: &Palette) {
        let rng = &mut self.rng;
        self.bodies = (0..count)
            .map(|_| {
                let pos = DVec2::new(
                    rng.next_f64() * (self.width - 2.0 * radius) + radius,
                    rng.next_f64() * (self.height - 2.0 * radius) + radius,
                );
                let vel = DVec2::new(rng.next_centered() * 12.0, rng.next_centered() * 12.0);
                Body::new(pos, vel, radius, palette.pick(rng))
            })
            .collect();
        self.sparks.clear();
        log::debug!("collision: populated {count} bodies in {}x{}", self.width, self.height);
    }

    pub fn add_body(&mut self, body: Body) {
        self.bodies.push(body);
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn sparks(&self) -> &[Spark] {
        &self.sparks
    }

    pub fn config(&self) -> CollisionConfig {
        self.config
    }

    pub fn set_config(&mut self, config: CollisionConfig) {
        self.config = config;
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn kinetic_energy(&self) -> f64 {
        kinetic_energy(&self.bodies)
    }

    /// Advances the simulation by one tick.
    pub fn step(&mut self) {
        let cfg = self.config;
        let max_speed = cfg.max_speed * cfg.speed_multiplier;
        let mut bursts: Vec<(DVec2, Rgba, Rgba, f64)> = Vec::new();

        for body in &mut self.bodies {
            body.pos += body.vel * cfg.speed_multiplier;

            if body.pos.x - body.radius <= 0.0 || body.pos.x + body.radius >= self.width {
                body.vel.x *= -cfg.gain;
                body.pos.x = body.pos.x.clamp(body.radius, (self.width - body.radius).max(body.radius));
                bursts.push((body.pos, body.color, Rgba::WHITE, body.vel.x.abs() * SPARK_INTENSITY_SCALE));
            }
            if body.pos.y - body.radius <= 0.0 || body.pos.y + body.radius >= self.height {
                body.vel.y *= -cfg.gain;
                body.pos.y = body.pos.y.clamp(body.radius, (self.height - body.radius).max(body.radius));
                bursts.push((body.pos, body.color, Rgba::WHITE, body.vel.y.abs() * SPARK_INTENSITY_SCALE));
            }

            if self.rng.next_bool(cfg.jitter_chance) {
                body.vel.x += self.rng.next_centered() * JITTER_STRENGTH;
                body.vel.y += self.rng.next_centered() * JITTER_STRENGTH;
            }

            let speed = body.vel.length();
            if speed > max_speed {
                body.vel = body.vel / speed * max_speed;
            }
        }

        let n = self.bodies.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let (left, right) = self.bodies.split_at_mut(j);
                let (b1, b2) = (&mut left[i], &mut right[0]);
                if let Some(contact) = resolve_pair(b1, b2, cfg.restitution, cfg.gain) {
                    log::trace!("collision: bodies {i} and {j} at speed {:.2}", contact.impact_speed);
                    bursts.push((
                        contact.point,
                        b1.color,
                        b2.color,
                        contact.impact_speed * SPARK_INTENSITY_SCALE,
                    ));
                }
            }
        }

        for (point, c1, c2, intensity) in bursts {
            self.emit_sparks(point, c1, c2, intensity);
        }
        self.update_sparks();
    }

    /// Emits 10 to 19 sparks evenly spread around `point` with a little
    /// angular noise, each taking one of the two colors at random.
    pub fn emit_sparks(&mut self, point: DVec2, color1: Rgba, color2: Rgba, intensity: f64) {
        let count = 10 + (self.rng.next_f64() * 10.0) as usize;
        for i in 0..count {
            let angle = std::f64::consts::TAU * i as f64 / count as f64 + self.rng.next_f64() * 0.5;
            let speed = (2.0 + self.rng.next_f64() * 3.0) * intensity;
            let color = if self.rng.next_bool(0.5) { color1 } else { color2 };
            self.sparks.push(Spark {
                pos: point,
                vel: DVec2::new(angle.cos(), angle.sin()) * speed,
                life: 1.0,
                color,
            });
        }
    }

    /// Moves sparks, applies gravity and decay, and drops dead ones.
    pub fn update_sparks(&mut self) {
        self.sparks.retain_mut(|s| {
            s.pos += s.vel;
            s.vel.y += SPARK_GRAVITY;
            s.life -= SPARK_DECAY;
            s.life > 0.0
        });
    }
}
