//! Reproducible description of a panel run.
//!
//! A [`Seed`] captures the panel name, surface size, parameter overrides,
//! PRNG seed, and frame count. Replaying the same `Seed` through the same
//! binary (with the same scripted input) produces identical draw output.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// Everything needed to replay a panel session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Seed {
    pub panel: String,
    pub width: usize,
    pub height: usize,
    pub params: serde_json::Value,
    pub seed: u64,
    pub frames: usize,
}

impl Seed {
    /// Creates a new Seed with empty params (`{}`) and zero frames.
    pub fn new(panel: &str, width: usize, height: usize, seed: u64) -> Self {
        Self {
            panel: panel.to_string(),
            width,
            height,
            params: serde_json::Value::Object(serde_json::Map::new()),
            seed,
            frames: 0,
        }
    }

    /// Builder-style frame count.
    pub fn with_frames(mut self, frames: usize) -> Self {
        self.frames = frames;
        self
    }

    /// Builder-style parameter overrides.
    pub fn with_params(mut self, params: serde_json::Value) -> Self {
        self.params = params;
        self
    }

    /// Rejects zero dimensions and `width * height` overflow.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.width == 0 || self.height == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        self.width
            .checked_mul(self.height)
            .ok_or(EngineError::InvalidDimensions)?;
        Ok(())
    }
}
