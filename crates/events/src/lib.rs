#![deny(unsafe_code)]
//! Pointer event rate limiting, visualized.
//!
//! An [`EventTimeline`] records every pointer sample as a raw dot, admits a
//! subset through a [`Throttler`] and trails a [`Debouncer`] that emits the
//! last sample once the pointer has been still long enough. Dots older than
//! [`RETENTION_MS`] are pruned.

pub mod panel;

use gallery_core::timer::{Debouncer, Throttler};
use glam::DVec2;

pub use panel::{EventsPanel, EventsParams};

pub const DEFAULT_DEBOUNCE_MS: f64 = 500.0;
pub const DEFAULT_THROTTLE_MS: f64 = 100.0;
/// How long a dot stays on screen.
pub const RETENTION_MS: f64 = 5000.0;

/// Which path produced a dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Raw,
    Throttled,
    Debounced,
}

impl EventKind {
    pub const ALL: [EventKind; 3] = [EventKind::Raw, EventKind::Throttled, EventKind::Debounced];

    pub fn label(self) -> &'static str {
        match self {
            EventKind::Raw => "Raw Events",
            EventKind::Throttled => "Throttled Events",
            EventKind::Debounced => "Debounced Events",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventDot {
    pub pos: DVec2,
    pub timestamp_ms: f64,
    pub kind: EventKind,
}

impl EventDot {
    /// Opacity at `now_ms`, fading linearly to zero over the retention period.
    pub fn alpha(&self, now_ms: f64) -> f64 {
        (1.0 - (now_ms - self.timestamp_ms) / RETENTION_MS).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone)]
pub struct EventTimeline {
    dots: Vec<EventDot>,
    throttle: Throttler,
    debounce: Debouncer<DVec2>,
}

impl Default for EventTimeline {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_MS, DEFAULT_THROTTLE_MS)
    }
}

impl EventTimeline {
    pub fn new(debounce_ms: f64, throttle_ms: f64) -> Self {
        Self {
            dots: Vec::new(),
            throttle: Throttler::new(throttle_ms),
            debounce: Debouncer::new(debounce_ms),
        }
    }

    pub fn dots(&self) -> &[EventDot] {
        &self.dots
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.dots.iter().filter(|d| d.kind == kind).count()
    }

    pub fn set_debounce_ms(&mut self, ms: f64) {
        self.debounce.set_delay_ms(ms);
    }

    pub fn set_throttle_ms(&mut self, ms: f64) {
        self.throttle.set_window_ms(ms);
    }

    pub fn debounce_pending(&self) -> bool {
        self.debounce.is_pending()
    }

    /// Feeds one pointer sample through all three paths.
    pub fn record(&mut self, pos: DVec2, now_ms: f64) {
        self.push(pos, now_ms, EventKind::Raw);
        if self.throttle.admit(now_ms) {
            self.push(pos, now_ms, EventKind::Throttled);
        }
        self.debounce.push(now_ms, pos);
    }

    /// Emits the debounced dot if it is due and prunes expired dots.
    pub fn poll(&mut self, now_ms: f64) {
        if let Some(pos) = self.debounce.poll(now_ms) {
            self.push(pos, now_ms, EventKind::Debounced);
        }
        self.prune(now_ms);
    }

    /// Drops every dot and any pending debounce.
    pub fn clear(&mut self) {
        self.dots.clear();
        self.debounce.cancel();
        self.throttle.reset();
    }

    /// Cancels the pending debounce so nothing fires after teardown.
    pub fn cancel(&mut self) {
        self.debounce.cancel();
    }

    fn push(&mut self, pos: DVec2, now_ms: f64, kind: EventKind) {
        self.dots.push(EventDot {
            pos,
            timestamp_ms: now_ms,
            kind,
        });
        self.prune(now_ms);
    }

    fn prune(&mut self, now_ms: f64) {
        let cutoff = now_ms - RETENTION_MS;
        self.dots.retain(|d| d.timestamp_ms > cutoff);
    }
}
