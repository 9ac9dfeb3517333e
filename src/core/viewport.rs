//! Viewport manager: keeps the surface size in step with the window.
//!
//! The initial size is applied at construction. Resize bursts (window drags)
//! are debounced: only the last size of a burst is applied, once the burst has
//! been quiet for the configured delay.

use log::debug;
use std::time::{Duration, Instant};

use super::debounce::Debounce;
use crate::entities::ViewportSize;

/// Default quiet period before a resize is applied
pub const DEFAULT_RESIZE_DEBOUNCE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct ViewportManager {
    size: ViewportSize,
    debounce: Debounce<ViewportSize>,
    applied: u64,
}

impl ViewportManager {
    pub fn new(initial: ViewportSize, delay: Duration) -> Self {
        debug!("Viewport initial size: {}", initial);
        Self {
            size: initial,
            debounce: Debounce::new(delay),
            applied: 0,
        }
    }

    /// Current (applied) size
    pub fn size(&self) -> ViewportSize {
        self.size
    }

    pub fn on_resize(&mut self, size: ViewportSize) {
        self.on_resize_at(size, Instant::now());
    }

    /// Window resize event at `now`: restarts the quiet timer
    pub fn on_resize_at(&mut self, size: ViewportSize, now: Instant) {
        self.debounce.schedule_at(size, now);
    }

    pub fn resize_pending(&self) -> bool {
        self.debounce.is_pending()
    }

    /// Apply the pending size if its quiet period elapsed at `now`.
    pub fn tick_at(&mut self, now: Instant) -> Option<ViewportSize> {
        let size = self.debounce.tick_at(now)?;
        self.size = size;
        self.applied += 1;
        debug!("Viewport resized to {}", size);
        Some(size)
    }

    /// Number of debounced resizes applied so far
    pub fn applied_count(&self) -> u64 {
        self.applied
    }
}
