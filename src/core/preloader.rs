//! Preloader - loads every frame of the sequence concurrently and signals readiness.
//!
//! **Why**: Scrubbing must never wait on I/O, so all frames are decoded up front.
//! A single bad file must not block startup: failures count toward completion.
//!
//! **Used by**: RendererSession (owns it), worker jobs (call `settle`)
//!
//! # Completion
//!
//! Each settle bumps an atomic counter with `fetch_add`; only the settle that
//! observes the final count emits `SequenceReadyEvent`. Frames settle at most
//! once (`Frame::settle`), so the counter can never pass the total.
//!
//! Progress notifications are serialized by a mutex around the increment, so
//! observers see strictly increasing percentages even though settles arrive
//! from many worker threads.
//!
//! # Limitations
//!
//! No retry, no per-load timeout: a load that never settles keeps the sequence
//! not-ready forever. `wait_ready()` gives callers a diagnosable escape hatch
//! without forcing readiness.

use log::{debug, info, trace, warn};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use crate::core::event_bus::EventBus;
use crate::core::session_events::{FrameLoadFailedEvent, LoadProgressEvent, SequenceReadyEvent};
use crate::entities::{FrameError, FrameSource, FrameStatus, FrameStore, WorkerPool};
use image::RgbaImage;

/// Sequence-level errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceError {
    /// Configured frame count is zero: readiness could never fire
    NoFrames,
    /// Readiness did not arrive within the wait timeout
    Stalled { settled: usize, total: usize },
}

impl std::fmt::Display for SequenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SequenceError::NoFrames => write!(f, "Sequence has no frames (frame count is 0)"),
            SequenceError::Stalled { settled, total } => write!(
                f,
                "Sequence not ready: {} of {} frames settled (check frame count against files on disk)",
                settled, total
            ),
        }
    }
}

impl std::error::Error for SequenceError {}

/// Snapshot of preload counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreloadStats {
    pub settled: usize,
    pub loaded: usize,
    pub failed: usize,
    pub total: usize,
}

impl PreloadStats {
    /// settled / total, in 0.0..=1.0
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.settled as f32 / self.total as f32
        }
    }

    pub fn percent(&self) -> f32 {
        if self.settled == self.total {
            100.0
        } else {
            (self.settled as f64 * 100.0 / self.total as f64) as f32
        }
    }
}

struct PreloadState {
    store: Arc<FrameStore>,
    bus: EventBus,
    settled: AtomicUsize,
    loaded: AtomicUsize,
    failed: AtomicUsize,
    report: Mutex<()>,
    ready: Mutex<bool>,
    ready_cv: Condvar,
}

/// Frame preloader. Cheap to clone; clones share counters.
#[derive(Clone)]
pub struct Preloader {
    state: Arc<PreloadState>,
}

impl std::fmt::Debug for Preloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preloader").field("stats", &self.stats()).finish()
    }
}

impl Preloader {
    /// Create preloader for `store`. Rejects empty stores.
    pub fn new(store: Arc<FrameStore>, bus: EventBus) -> Result<Self, SequenceError> {
        if store.is_empty() {
            return Err(SequenceError::NoFrames);
        }
        Ok(Self {
            state: Arc::new(PreloadState {
                store,
                bus,
                settled: AtomicUsize::new(0),
                loaded: AtomicUsize::new(0),
                failed: AtomicUsize::new(0),
                report: Mutex::new(()),
                ready: Mutex::new(false),
                ready_cv: Condvar::new(),
            }),
        })
    }

    pub fn store(&self) -> &Arc<FrameStore> {
        &self.state.store
    }

    pub fn total(&self) -> usize {
        self.state.store.len()
    }

    /// Submit one load job per frame. Loads run concurrently, in any order.
    pub fn start(&self, pool: &dyn WorkerPool, source: Arc<dyn FrameSource>) {
        info!("Preloading {} frames", self.total());
        for frame in self.state.store.iter() {
            let index = frame.index();
            let locator = frame.locator().to_path_buf();
            let source = Arc::clone(&source);
            let preloader = self.clone();
            pool.execute(Box::new(move || {
                trace!("Loading frame {}: {}", index, locator.display());
                let outcome = source.load(&locator);
                preloader.settle(index, outcome);
            }));
        }
    }

    /// Record the load outcome of frame `index`.
    ///
    /// Returns false if the frame does not exist or was already settled.
    pub fn settle(&self, index: usize, outcome: Result<RgbaImage, FrameError>) -> bool {
        let state = &self.state;
        let Some(frame) = state.store.get(index) else {
            warn!("Settle for unknown frame index {} (total {})", index, self.total());
            return false;
        };

        let error = outcome.as_ref().err().map(|e| e.to_string());
        let Some(status) = frame.settle(outcome) else {
            debug!("Frame {} already settled, ignoring duplicate outcome", index);
            return false;
        };

        match status {
            FrameStatus::Loaded => {
                state.loaded.fetch_add(1, Ordering::AcqRel);
            }
            _ => {
                state.failed.fetch_add(1, Ordering::AcqRel);
                let error = error.unwrap_or_default();
                warn!(
                    "Failed to load frame index {} ({}): {}",
                    index,
                    frame.locator().display(),
                    error
                );
                state.bus.emit(FrameLoadFailedEvent {
                    index,
                    locator: frame.locator().to_path_buf(),
                    error,
                });
            }
        }

        let _report = state.report.lock().unwrap_or_else(|e| e.into_inner());
        let total = self.total();
        let settled = state.settled.fetch_add(1, Ordering::AcqRel) + 1;
        let stats = PreloadStats {
            settled,
            loaded: state.loaded.load(Ordering::Acquire),
            failed: state.failed.load(Ordering::Acquire),
            total,
        };
        state.bus.emit(LoadProgressEvent {
            settled,
            total,
            percent: stats.percent(),
        });

        if settled == total {
            self.fire_ready(stats);
        }
        true
    }

    fn fire_ready(&self, stats: PreloadStats) {
        if stats.failed > 0 {
            warn!(
                "Sequence ready with gaps: expected {} frames, received {} ({} failed)",
                stats.total, stats.loaded, stats.failed
            );
        } else {
            info!("Sequence ready: {} frames loaded", stats.total);
        }

        // Observers run before waiters wake, so `wait_ready` implies delivery
        self.state.bus.emit(SequenceReadyEvent {
            loaded: stats.loaded,
            failed: stats.failed,
            total: stats.total,
        });

        {
            let mut ready = self.state.ready.lock().unwrap_or_else(|e| e.into_inner());
            *ready = true;
        }
        self.state.ready_cv.notify_all();
    }

    pub fn is_ready(&self) -> bool {
        *self.state.ready.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn stats(&self) -> PreloadStats {
        PreloadStats {
            settled: self.state.settled.load(Ordering::Acquire),
            loaded: self.state.loaded.load(Ordering::Acquire),
            failed: self.state.failed.load(Ordering::Acquire),
            total: self.total(),
        }
    }

    /// Block until ready or `timeout` elapses.
    ///
    /// On timeout the sequence stays not-ready; the error carries the counts
    /// so a frame-count mismatch can be diagnosed.
    pub fn wait_ready(&self, timeout: Duration) -> Result<PreloadStats, SequenceError> {
        let ready = self.state.ready.lock().unwrap_or_else(|e| e.into_inner());
        let (ready, _) = self
            .state
            .ready_cv
            .wait_timeout_while(ready, timeout, |ready| !*ready)
            .unwrap_or_else(|e| e.into_inner());

        if *ready {
            return Ok(self.stats());
        }

        let stats = self.stats();
        let pending = self.state.store.count_status(FrameStatus::Pending);
        warn!(
            "Preload stalled after {}ms: {}/{} settled, {} still pending",
            timeout.as_millis(),
            stats.settled,
            stats.total,
            pending
        );
        Err(SequenceError::Stalled {
            settled: stats.settled,
            total: stats.total,
        })
    }
}
