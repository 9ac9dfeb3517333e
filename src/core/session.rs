//! Renderer session: one scrubbed image sequence bound to one drawing surface.
//!
//! **Architecture**: The session owns all mutable render state (frame store,
//! playback cursor, surface, timers). Loads run on worker threads and only touch
//! frames and preload counters; everything else is mutated from the host loop
//! through `on_scroll_progress`, `on_resize` and `on_refresh`.
//!
//! # Lifecycle
//!
//! 1. `new()` sizes the surface synchronously to the initial viewport
//! 2. `start_preload()` submits one load per frame
//! 3. The first `on_refresh()` after the preloader reports ready performs the
//!    first paint; before that, repaints are dropped
//! 4. Each `on_refresh()` applies a debounced resize, then the coalesced scrub
//!    request; whatever is due, a refresh paints the cursor at most once

use log::{debug, info, trace};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::compositor::Compositor;
use super::event_bus::EventBus;
use super::preloader::{PreloadStats, Preloader, SequenceError};
use super::scrub::ScrubDriver;
use super::session_events::FramePaintedEvent;
use super::viewport::ViewportManager;
use crate::config::SequenceConfig;
use crate::entities::{FrameSource, FrameStore, Surface, ViewportSize, WorkerPool};

/// What a refresh did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshOutcome {
    /// Readiness was observed during this refresh (first paint done)
    pub became_ready: bool,
    /// Debounced resize applied during this refresh
    pub resized: Option<ViewportSize>,
    /// Frame shown for a pending scrub request (shares the refresh's single paint)
    pub scrubbed: Option<usize>,
}

pub struct RendererSession {
    bus: EventBus,
    preloader: Preloader,
    compositor: Compositor,
    surface: Surface,
    scrub: ScrubDriver,
    viewport: ViewportManager,
    ready: bool,
    renders: u64,
}

impl std::fmt::Debug for RendererSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RendererSession")
            .field("ready", &self.ready)
            .field("cursor", &self.scrub.cursor())
            .field("viewport", &self.viewport.size())
            .field("renders", &self.renders)
            .field("preload", &self.preloader.stats())
            .finish()
    }
}

impl RendererSession {
    /// Session for the sequence described by `config`
    pub fn new(
        config: &SequenceConfig,
        viewport: ViewportSize,
        bus: EventBus,
    ) -> Result<Self, SequenceError> {
        let store = FrameStore::from_template(config.frame_count, &config.locator_template());
        Self::with_store(store, config, viewport, bus)
    }

    /// Session over a prebuilt frame store (custom locators)
    pub fn with_store(
        store: FrameStore,
        config: &SequenceConfig,
        viewport: ViewportSize,
        bus: EventBus,
    ) -> Result<Self, SequenceError> {
        let total = store.len();
        let preloader = Preloader::new(Arc::new(store), bus.clone())?;
        info!("Renderer session: {} frames, viewport {}", total, viewport);

        Ok(Self {
            bus,
            preloader,
            compositor: Compositor::new(config.top_offset),
            surface: Surface::new(viewport),
            scrub: ScrubDriver::new(total),
            viewport: ViewportManager::new(viewport, config.resize_debounce()),
            ready: false,
            renders: 0,
        })
    }

    pub fn start_preload(&self, pool: &dyn WorkerPool, source: Arc<dyn FrameSource>) {
        self.preloader.start(pool, source);
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn preloader(&self) -> &Preloader {
        &self.preloader
    }

    pub fn store(&self) -> &FrameStore {
        self.preloader.store()
    }

    pub fn stats(&self) -> PreloadStats {
        self.preloader.stats()
    }

    /// Readiness observed and first paint done
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn cursor(&self) -> usize {
        self.scrub.cursor()
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn viewport_size(&self) -> ViewportSize {
        self.viewport.size()
    }

    /// Render executions so far (first paint, resizes and scrub repaints)
    pub fn render_count(&self) -> u64 {
        self.renders
    }

    /// Block until all frames settled (or timeout), then run the ready transition.
    pub fn wait_ready(&mut self, timeout: Duration) -> Result<PreloadStats, SequenceError> {
        let stats = self.preloader.wait_ready(timeout)?;
        self.poll_ready();
        Ok(stats)
    }

    /// Feed normalized scroll progress of the pinned region. Returns new cursor.
    pub fn on_scroll_progress(&mut self, progress: f64) -> usize {
        self.scrub.update(progress)
    }

    /// Jump straight to a frame index (clamped)
    pub fn seek(&mut self, frame: usize) -> usize {
        self.scrub.set_frame(frame)
    }

    pub fn on_resize(&mut self, size: ViewportSize) {
        self.viewport.on_resize(size);
    }

    pub fn on_resize_at(&mut self, size: ViewportSize, now: Instant) {
        self.viewport.on_resize_at(size, now);
    }

    pub fn on_refresh(&mut self) -> RefreshOutcome {
        self.on_refresh_at(Instant::now())
    }

    /// Display refresh at `now`. Paints at most once.
    pub fn on_refresh_at(&mut self, now: Instant) -> RefreshOutcome {
        let mut outcome = RefreshOutcome::default();

        if let Some(size) = self.viewport.tick_at(now) {
            self.surface.resize(size);
            outcome.resized = Some(size);
        }

        outcome.became_ready = self.poll_ready();
        let mut painted = outcome.became_ready;

        if outcome.resized.is_some() && self.ready && !painted {
            self.render();
            painted = true;
        }

        if self.scrub.on_refresh().is_some() {
            if self.ready {
                if !painted {
                    self.render();
                }
                outcome.scrubbed = Some(self.scrub.cursor());
            } else {
                trace!("Dropping scrub repaint: sequence not ready");
            }
        }

        outcome
    }

    /// Ready transition: size surface to the current viewport and paint once.
    fn poll_ready(&mut self) -> bool {
        if self.ready || !self.preloader.is_ready() {
            return false;
        }
        self.ready = true;
        let size = self.viewport.size();
        if self.surface.size() != size {
            self.surface.resize(size);
        }
        debug!("Session ready, first paint at frame {}", self.scrub.cursor());
        self.render();
        true
    }

    /// Paint the frame under the cursor (no-op for frames that failed to load)
    fn render(&mut self) -> bool {
        self.renders += 1;
        let index = self.scrub.cursor();
        let Some(frame) = self.preloader.store().get(index) else {
            return false;
        };
        let painted = self.compositor.paint(frame, &mut self.surface);
        if painted {
            self.bus.emit(FramePaintedEvent { frame: index });
        }
        painted
    }
}
