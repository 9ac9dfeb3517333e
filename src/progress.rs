//! Terminal progress for frame preloading (indicatif)
//!
//! Subscribes to preload events on the bus: the bar advances on every settle,
//! the line above it shows the latest failure, and both finish on readiness.

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use crate::core::event_bus::EventBus;
use crate::core::session_events::{FrameLoadFailedEvent, LoadProgressEvent, SequenceReadyEvent};

/// Progress tracking for frame loading with separate log line
#[derive(Clone)]
pub struct LoadProgress {
    log_line: ProgressBar,
    progress_bar: ProgressBar,
}

impl LoadProgress {
    /// Create tracker with separate log and progress lines
    pub fn new(total_frames: usize) -> Self {
        let multi = MultiProgress::new();

        // Top line for log messages (non-scrolling, always visible)
        let log_line = multi.add(ProgressBar::new_spinner());
        log_line.set_style(
            ProgressStyle::default_spinner()
                .template("{msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        log_line.set_message("Loading frames...");

        let progress_bar = multi.add(ProgressBar::new(total_frames as u64));
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("[{bar:40.cyan/blue}] {pos}/{len} frames ({percent}%) | {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );

        Self {
            log_line,
            progress_bar,
        }
    }

    /// Create tracker driven by preload events on `bus`
    pub fn attach(bus: &EventBus, total_frames: usize) -> Self {
        let progress = Self::new(total_frames);

        let bar = progress.progress_bar.clone();
        bus.subscribe::<LoadProgressEvent, _>(move |e| {
            bar.set_position(e.settled as u64);
        });

        let line = progress.log_line.clone();
        bus.subscribe::<FrameLoadFailedEvent, _>(move |e| {
            line.set_message(format!("Failed frame {}: {}", e.index, e.locator.display()));
        });

        let done = progress.clone();
        bus.subscribe::<SequenceReadyEvent, _>(move |e| {
            done.finish(&format!("{} loaded, {} failed", e.loaded, e.failed));
        });

        progress
    }

    pub fn position(&self) -> u64 {
        self.progress_bar.position()
    }

    pub fn finish(&self, msg: &str) {
        self.log_line.finish_with_message("Ready");
        self.progress_bar.finish_with_message(msg.to_string());
    }

    /// Stop drawing (e.g. preload stalled)
    pub fn abandon(&self, msg: &str) {
        self.log_line.abandon_with_message(msg.to_string());
        self.progress_bar.abandon();
    }
}
