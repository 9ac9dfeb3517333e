//! Scrub driver: maps normalized scroll progress to a frame index.
//!
//! Updates can arrive much faster than the display refreshes. Each update moves
//! the playback cursor immediately but only requests a repaint through the
//! [`FrameThrottle`]; the refresh then paints whatever the cursor holds at that
//! moment, so the last update before a refresh always wins.

use log::trace;

use super::throttle::FrameThrottle;

/// Convert normalized position to frame index (clamps to valid range)
pub fn progress_to_frame(progress: f64, total_frames: usize) -> usize {
    if total_frames > 1 && progress.is_finite() {
        let clamped = progress.clamp(0.0, 1.0);
        (clamped * (total_frames - 1) as f64).round() as usize
    } else {
        0
    }
}

/// Convert frame index to normalized position (0.0..1.0)
pub fn frame_to_progress(frame: usize, total_frames: usize) -> f64 {
    if total_frames > 1 {
        frame.min(total_frames - 1) as f64 / (total_frames - 1) as f64
    } else {
        0.0
    }
}

/// Playback cursor plus coalesced repaint scheduling
#[derive(Debug, Clone)]
pub struct ScrubDriver {
    total_frames: usize,
    cursor: usize,
    throttle: FrameThrottle,
}

impl ScrubDriver {
    pub fn new(total_frames: usize) -> Self {
        Self {
            total_frames,
            cursor: 0,
            throttle: FrameThrottle::new(),
        }
    }

    pub fn total_frames(&self) -> usize {
        self.total_frames
    }

    /// Current playback cursor
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Feed normalized progress (0..1). Returns the new cursor.
    pub fn update(&mut self, progress: f64) -> usize {
        let frame = progress_to_frame(progress, self.total_frames);
        trace!("Scrub: progress {:.4} -> frame {}", progress, frame);
        self.set_frame(frame)
    }

    /// Move cursor to `frame` (clamped) and request a repaint.
    pub fn set_frame(&mut self, frame: usize) -> usize {
        self.cursor = frame.min(self.total_frames.saturating_sub(1));
        self.throttle.request();
        self.cursor
    }

    /// Request a repaint without moving the cursor (e.g. after a resize)
    pub fn request_repaint(&mut self) {
        self.throttle.request();
    }

    pub fn repaint_pending(&self) -> bool {
        self.throttle.is_scheduled()
    }

    /// Display refresh: returns the frame to paint, if a repaint was requested.
    pub fn on_refresh(&mut self) -> Option<usize> {
        self.throttle.take().then_some(self.cursor)
    }
}
