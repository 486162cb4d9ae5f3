//! Scoped input-rate limiters driven by the frame clock.
//!
//! Neither timer owns a callback or a background thread. The owning panel
//! feeds timestamps in and polls results out during its own update, so once
//! the panel is torn down (or the timer cancelled or dropped) nothing can fire.

/// Emits the most recent value once the input has been quiet for `delay_ms`.
///
/// Every [`push`](Debouncer::push) supersedes the pending value and restarts
/// the delay.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay_ms: f64,
    pending: Option<(f64, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay_ms: f64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub fn delay_ms(&self) -> f64 {
        self.delay_ms
    }

    /// Changes the delay; an already pending value keeps its original deadline.
    pub fn set_delay_ms(&mut self, delay_ms: f64) {
        self.delay_ms = delay_ms;
    }

    /// Schedules `value` for `now_ms + delay`, replacing any pending value.
    pub fn push(&mut self, now_ms: f64, value: T) {
        self.pending = Some((now_ms + self.delay_ms, value));
    }

    /// Returns the pending value if its deadline has passed.
    pub fn poll(&mut self, now_ms: f64) -> Option<T> {
        match self.pending {
            Some((deadline, _)) if now_ms >= deadline => self.pending.take().map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drops the pending value without emitting it.
    pub fn cancel(&mut self) {
        if self.pending.take().is_some() {
            log::trace!("debounce: pending value cancelled");
        }
    }
}

/// Admits at most one event per `window_ms`.
#[derive(Debug, Clone)]
pub struct Throttler {
    window_ms: f64,
    last_admitted: Option<f64>,
}

impl Throttler {
    pub fn new(window_ms: f64) -> Self {
        Self {
            window_ms,
            last_admitted: None,
        }
    }

    pub fn window_ms(&self) -> f64 {
        self.window_ms
    }

    pub fn set_window_ms(&mut self, window_ms: f64) {
        self.window_ms = window_ms;
    }

    /// Returns `true` (and opens a new window) if at least `window_ms` has
    /// elapsed since the last admitted event.
    pub fn admit(&mut self, now_ms: f64) -> bool {
        let open = self
            .last_admitted
            .map_or(true, |last| now_ms - last >= self.window_ms);
        if open {
            self.last_admitted = Some(now_ms);
        }
        open
    }

    /// Forgets the current window so the next event is admitted.
    pub fn reset(&mut self) {
        self.last_admitted = None;
    }
}
