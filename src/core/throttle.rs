//! Animation-frame throttle: at most one repaint per display refresh.
//!
//! Requests arriving while a repaint is already scheduled are dropped. The
//! repaint itself carries no data; whoever runs it reads current state at
//! execution time, so the latest request always wins.

use log::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThrottleState {
    #[default]
    Idle,
    Scheduled,
}

/// Leading-edge coalescing throttle (Idle → Scheduled → Idle).
#[derive(Debug, Clone, Default)]
pub struct FrameThrottle {
    state: ThrottleState,
    dropped: u64,
}

impl FrameThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a repaint on the next refresh.
    ///
    /// Returns true if this request scheduled it, false if it was coalesced
    /// into an already scheduled repaint.
    pub fn request(&mut self) -> bool {
        match self.state {
            ThrottleState::Idle => {
                self.state = ThrottleState::Scheduled;
                true
            }
            ThrottleState::Scheduled => {
                self.dropped += 1;
                trace!("FrameThrottle: coalesced request ({} dropped)", self.dropped);
                false
            }
        }
    }

    /// Called on display refresh. Returns true if a repaint must run now.
    pub fn take(&mut self) -> bool {
        let due = self.state == ThrottleState::Scheduled;
        self.state = ThrottleState::Idle;
        due
    }

    pub fn state(&self) -> ThrottleState {
        self.state
    }

    pub fn is_scheduled(&self) -> bool {
        self.state == ThrottleState::Scheduled
    }

    /// Total requests coalesced away since creation
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}
