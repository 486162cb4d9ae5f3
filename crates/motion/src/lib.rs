#![deny(unsafe_code)]
//! Pointer followers: a linear-interpolation chaser and a damped spring.
//!
//! [`LerpFollower`] closes a fixed fraction of the remaining gap each tick.
//! [`SpringFollower`] integrates a one-dimensional spring toward its target
//! and keeps a bounded history of positions for drawing a trail. The spring
//! can use an explicit damping coefficient or derive the critical one from
//! its stiffness; the two produce visibly different motion.

pub mod panel;

use std::collections::VecDeque;

use gallery_core::error::EngineError;
use gallery_core::numeric::{critically_damped_spring, critically_damped_spring_derived, lerp};
use glam::DVec2;

pub use panel::{LerpPanel, LerpParams, SpringPanel, SpringParams};

/// Fraction of the gap closed per tick.
pub const DEFAULT_LERP_FACTOR: f64 = 0.1;
pub const DEFAULT_STIFFNESS: f64 = 0.3;
pub const DEFAULT_DAMPING: f64 = 0.7;
/// Fixed timestep assuming 60 ticks per second.
pub const DEFAULT_DT: f64 = 1.0 / 60.0;
/// Positions kept for the spring trail.
pub const HISTORY_LEN: usize = 100;

/// Chases a target point by linear interpolation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LerpFollower {
    pub position: DVec2,
    pub target: DVec2,
    pub factor: f64,
}

impl LerpFollower {
    /// Follower resting at `at` with its target on itself.
    pub fn new(at: DVec2, factor: f64) -> Self {
        Self {
            position: at,
            target: at,
            factor,
        }
    }

    pub fn step(&mut self) {
        self.position = DVec2::new(
            lerp(self.position.x, self.target.x, self.factor),
            lerp(self.position.y, self.target.y, self.factor),
        );
    }

    /// Distance still to cover.
    pub fn gap(&self) -> f64 {
        self.position.distance(self.target)
    }
}

/// How the spring's damping coefficient is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DampingMode {
    /// Use the configured damping as is.
    #[default]
    Explicit,
    /// Use `2 * sqrt(stiffness)` and ignore the configured damping.
    Derived,
}

impl DampingMode {
    pub fn name(self) -> &'static str {
        match self {
            DampingMode::Explicit => "explicit",
            DampingMode::Derived => "derived",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, EngineError> {
        match name {
            "explicit" => Ok(DampingMode::Explicit),
            "derived" => Ok(DampingMode::Derived),
            other => Err(EngineError::invalid_input(format!("unknown damping mode '{other}'"))),
        }
    }
}

/// One-dimensional spring with a bounded position history.
#[derive(Debug, Clone)]
pub struct SpringFollower {
    pub position: f64,
    pub velocity: f64,
    pub target: f64,
    pub stiffness: f64,
    pub damping: f64,
    pub mode: DampingMode,
    pub dt: f64,
    history: VecDeque<f64>,
}

impl SpringFollower {
    /// Spring at rest at `at`, using the default constants.
    pub fn new(at: f64) -> Self {
        Self {
            position: at,
            velocity: 0.0,
            target: at,
            stiffness: DEFAULT_STIFFNESS,
            damping: DEFAULT_DAMPING,
            mode: DampingMode::default(),
            dt: DEFAULT_DT,
            history: VecDeque::with_capacity(HISTORY_LEN + 1),
        }
    }

    pub fn step(&mut self) {
        let next = match self.mode {
            DampingMode::Explicit => critically_damped_spring(
                self.position,
                self.target,
                self.velocity,
                self.stiffness,
                self.damping,
                self.dt,
            ),
            DampingMode::Derived => {
                critically_damped_spring_derived(self.position, self.target, self.velocity, self.stiffness, self.dt)
            }
        };
        self.position = next.position;
        self.velocity = next.velocity;
        self.history.push_back(self.position);
        if self.history.len() > HISTORY_LEN {
            self.history.pop_front();
        }
    }

    /// Recent positions, oldest first.
    pub fn history(&self) -> impl ExactSizeIterator<Item = f64> + '_ {
        self.history.iter().copied()
    }

    /// Puts the spring at rest at `at` and forgets the trail.
    pub fn reset(&mut self, at: f64) {
        self.position = at;
        self.velocity = 0.0;
        self.target = at;
        self.history.clear();
    }
}
