#![deny(unsafe_code)]
//! Core types and traits for the algorithm gallery.
//!
//! Provides the `Panel` trait and `FrameLoop` scheduler, debounce/throttle
//! timers, draw primitives (`Surface`, `Frame`, `DrawCommand`), colors and
//! palettes, numeric smoothing primitives, the `Xorshift64` PRNG, `Seed`,
//! and parameter helpers.

pub mod color;
pub mod draw;
pub mod error;
pub mod frame;
pub mod numeric;
pub mod palette;
pub mod params;
pub mod prng;
pub mod seed;
pub mod timer;

pub use color::Rgba;
pub use draw::{DrawCommand, Frame, Surface};
pub use error::EngineError;
pub use frame::{
    Clock, FpsCounter, FrameInfo, FrameLoop, InputEvent, LoopState, ManualClock, Panel,
    PanelAction, SystemClock,
};
pub use palette::Palette;
pub use prng::Xorshift64;
pub use seed::Seed;
pub use timer::{Debouncer, Throttler};
