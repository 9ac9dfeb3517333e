//! Trailing debounce - delays an action until a burst of triggers goes quiet.
//!
//! Every `schedule()` cancels the pending timer and restarts it with the new
//! value. `tick()` fires only once the delay has elapsed with no further
//! schedule, yielding the value of the last trigger in the burst.
//!
//! Time is passed in explicitly (`*_at` variants) so the host loop and tests
//! share one clock.

use std::time::{Duration, Instant};

/// Trailing debounce holding the latest pending value.
///
/// # Usage
/// ```ignore
/// // On every resize event:
/// debounce.schedule(new_size);
///
/// // In the refresh loop:
/// if let Some(size) = debounce.tick() {
///     surface.resize(size);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Debounce<T> {
    /// Quiet period required before firing
    delay: Duration,
    /// Pending value and its trigger time
    pending: Option<(T, Instant)>,
}

impl<T> Debounce<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn from_millis(delay_ms: u64) -> Self {
        Self::new(Duration::from_millis(delay_ms))
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `value` relative to now. Resets any pending timer.
    pub fn schedule(&mut self, value: T) {
        self.schedule_at(value, Instant::now());
    }

    /// Schedule `value` as if triggered at `now`. Resets any pending timer.
    pub fn schedule_at(&mut self, value: T, now: Instant) {
        if self.pending.is_some() {
            log::trace!("Debounce: restarting pending timer ({}ms)", self.delay.as_millis());
        }
        self.pending = Some((value, now + self.delay));
    }

    /// Cancel any pending action
    pub fn cancel(&mut self) {
        if self.pending.take().is_some() {
            log::trace!("Debounce: cancelled pending action");
        }
    }

    pub fn tick(&mut self) -> Option<T> {
        self.tick_at(Instant::now())
    }

    /// Returns the pending value if its quiet period has elapsed at `now`.
    /// Clears the pending state when fired.
    pub fn tick_at(&mut self, now: Instant) -> Option<T> {
        let due = matches!(&self.pending, Some((_, trigger_at)) if now >= *trigger_at);
        if due {
            self.pending.take().map(|(value, _)| value)
        } else {
            None
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Time when the pending action will fire (if any)
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at)
    }
}
