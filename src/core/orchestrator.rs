//! Scroll orchestrator: glue between a scroll-state provider and the session.
//!
//! On every scroll update it
//! - derives the progress through the pinned hero region and feeds the scrub
//!   driver (optionally eased by a scrub lag),
//! - toggles navigation flags past fixed scroll offsets,
//! - fires text-reveal triggers when a section crosses its trigger line,
//!   replaying on both forward and backward crossings.
//!
//! The provider is an opaque collaborator (smooth-scroll engine, test double,
//! CLI script). Without one the orchestrator stays unbound and does nothing.

use log::{debug, info, trace};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::event_bus::EventBus;
use super::session::RendererSession;
use super::session_events::{NavFlagsChangedEvent, RevealAction, RevealEvent};
use crate::config::{SectionConfig, SequenceConfig};

/// Progress difference below which the eased scrub snaps to its target
const SNAP_EPSILON: f64 = 1e-4;

/// Source of scroll state
pub trait ScrollProvider: Send {
    /// Vertical scroll offset in pixels
    fn scroll_y(&self) -> f64;
    /// Viewport height in pixels
    fn viewport_height(&self) -> f64;
}

#[derive(Debug, Clone, Copy, Default)]
struct ScrollState {
    y: f64,
    viewport_height: f64,
}

/// Scroll provider whose state is set by the host. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct SharedScroll {
    state: Arc<Mutex<ScrollState>>,
}

impl SharedScroll {
    pub fn new(viewport_height: f64) -> Self {
        Self {
            state: Arc::new(Mutex::new(ScrollState {
                y: 0.0,
                viewport_height,
            })),
        }
    }

    pub fn set_scroll_y(&self, y: f64) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).y = y;
    }

    pub fn set_viewport_height(&self, height: f64) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).viewport_height = height;
    }
}

impl ScrollProvider for SharedScroll {
    fn scroll_y(&self) -> f64 {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).y
    }

    fn viewport_height(&self) -> f64 {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).viewport_height
    }
}

#[derive(Debug, Clone)]
struct RevealTrigger {
    section: SectionConfig,
    active: bool,
}

pub struct ScrollOrchestrator {
    provider: Option<Box<dyn ScrollProvider>>,
    bus: EventBus,
    pin_start: f64,
    pin_span: f64,
    go_up_threshold: f64,
    nav_threshold: f64,
    reveal_start: f64,
    scrub_lag: Duration,
    target: f64,
    displayed: f64,
    nav: NavFlagsChangedEvent,
    reveals: Vec<RevealTrigger>,
}

impl std::fmt::Debug for ScrollOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollOrchestrator")
            .field("bound", &self.is_bound())
            .field("target", &self.target)
            .field("displayed", &self.displayed)
            .field("nav", &self.nav)
            .finish()
    }
}

impl ScrollOrchestrator {
    pub fn new(config: &SequenceConfig, bus: EventBus) -> Self {
        Self {
            provider: None,
            bus,
            pin_start: config.pin_start,
            pin_span: config.pin_span,
            go_up_threshold: config.go_up_threshold,
            nav_threshold: config.nav_threshold,
            reveal_start: config.reveal_start,
            scrub_lag: config.scrub_lag(),
            target: 0.0,
            displayed: 0.0,
            nav: NavFlagsChangedEvent::default(),
            reveals: config
                .sections
                .iter()
                .map(|section| RevealTrigger {
                    section: section.clone(),
                    active: false,
                })
                .collect(),
        }
    }

    /// Bind to a scroll provider. `None` skips binding: the feature stays off.
    pub fn bind(&mut self, provider: Option<Box<dyn ScrollProvider>>) -> bool {
        match provider {
            Some(provider) => {
                info!("Scroll orchestrator bound ({} reveal sections)", self.reveals.len());
                self.provider = Some(provider);
                true
            }
            None => {
                debug!("No scroll provider, skipping scroll binding");
                false
            }
        }
    }

    pub fn is_bound(&self) -> bool {
        self.provider.is_some()
    }

    pub fn nav_flags(&self) -> NavFlagsChangedEvent {
        self.nav
    }

    /// Latest pin-region progress derived from scrolling
    pub fn target_progress(&self) -> f64 {
        self.target
    }

    /// Progress currently fed to the scrub driver
    pub fn displayed_progress(&self) -> f64 {
        self.displayed
    }

    /// Progress through the pinned region for scroll offset `y`
    pub fn pin_progress(&self, y: f64, viewport_height: f64) -> f64 {
        let length = self.pin_span * viewport_height;
        if length <= 0.0 || !y.is_finite() {
            return 0.0;
        }
        ((y - self.pin_start) / length).clamp(0.0, 1.0)
    }

    /// Scroll update from the provider
    pub fn on_scroll(&mut self, session: &mut RendererSession) {
        let Some(provider) = &self.provider else {
            return;
        };
        let y = provider.scroll_y();
        let vh = provider.viewport_height();
        trace!("Scroll update: y={:.1} vh={:.1}", y, vh);

        self.target = self.pin_progress(y, vh);
        if self.scrub_lag.is_zero() {
            self.displayed = self.target;
            session.on_scroll_progress(self.displayed);
        }

        self.update_nav(y);
        self.update_reveals(y, vh);
    }

    /// Advance eased scrub by `dt` (call once per display refresh).
    ///
    /// The displayed progress closes about 95% of the gap to the target
    /// within one scrub lag.
    pub fn advance(&mut self, dt: Duration, session: &mut RendererSession) {
        if !self.is_bound() || self.scrub_lag.is_zero() {
            return;
        }
        let gap = self.target - self.displayed;
        if gap == 0.0 {
            return;
        }
        if gap.abs() < SNAP_EPSILON {
            self.displayed = self.target;
        } else {
            let alpha = 1.0 - (-3.0 * dt.as_secs_f64() / self.scrub_lag.as_secs_f64()).exp();
            self.displayed += gap * alpha;
        }
        session.on_scroll_progress(self.displayed);
    }

    fn update_nav(&mut self, y: f64) {
        let flags = NavFlagsChangedEvent {
            go_up_visible: y > self.go_up_threshold,
            nav_scrolled: y > self.nav_threshold,
        };
        if flags != self.nav {
            debug!(
                "Nav flags: go_up_visible={} nav_scrolled={}",
                flags.go_up_visible, flags.nav_scrolled
            );
            self.nav = flags;
            self.bus.emit(flags);
        }
    }

    fn update_reveals(&mut self, y: f64, vh: f64) {
        for trigger in &mut self.reveals {
            let line = (trigger.section.top - self.reveal_start) * vh;
            let active = y >= line;
            if active == trigger.active {
                continue;
            }
            trigger.active = active;
            let action = if active {
                RevealAction::Play
            } else {
                RevealAction::Reverse
            };
            debug!("Reveal {:?}: {}", action, trigger.section.name);
            self.bus.emit(RevealEvent {
                section: trigger.section.name.clone(),
                action,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::preloader::tests::{FakeSource, ManualPool};
    use crate::entities::ViewportSize;
    use std::path::PathBuf;

    const VH: f64 = 100.0;

    fn config(lag_ms: u64) -> SequenceConfig {
        SequenceConfig {
            frame_count: 11,
            base_path: PathBuf::from("seq"),
            extension: "png".into(),
            scrub_lag_ms: lag_ms,
            sections: vec![SectionConfig::new("about", 7.0), SectionConfig::new("work", 9.0)],
            ..Default::default()
        }
    }

    fn session(config: &SequenceConfig, bus: EventBus) -> RendererSession {
        let mut session = RendererSession::new(config, ViewportSize::new(16, 9), bus).unwrap();
        let pool = ManualPool::default();
        session.start_preload(&pool, Arc::new(FakeSource::ok(16, 9)));
        pool.run_all();
        session.on_refresh();
        session
    }

    fn bound(config: &SequenceConfig, bus: &EventBus) -> (ScrollOrchestrator, SharedScroll) {
        let scroll = SharedScroll::new(VH);
        let mut orch = ScrollOrchestrator::new(config, bus.clone());
        assert!(orch.bind(Some(Box::new(scroll.clone()))));
        (orch, scroll)
    }

    #[test]
    fn test_missing_provider_skips_binding() {
        let config = config(0);
        let bus = EventBus::new();
        let mut session = session(&config, bus.clone());
        let mut orch = ScrollOrchestrator::new(&config, bus.clone());
        assert!(!orch.bind(None));
        bus.poll();

        orch.on_scroll(&mut session);
        orch.advance(Duration::from_millis(16), &mut session);
        assert_eq!(session.cursor(), 0);
        assert_eq!(bus.queue_len(), 0);
    }

    #[test]
    fn test_pin_progress_drives_scrub() {
        let config = config(0);
        let bus = EventBus::new();
        let mut session = session(&config, bus.clone());
        let (mut orch, scroll) = bound(&config, &bus);

        // Pinned region spans 6 viewport heights = 600px
        scroll.set_scroll_y(300.0);
        orch.on_scroll(&mut session);
        assert_eq!(orch.target_progress(), 0.5);
        assert_eq!(session.cursor(), 5);

        scroll.set_scroll_y(5000.0);
        orch.on_scroll(&mut session);
        assert_eq!(session.cursor(), 10);

        scroll.set_scroll_y(-40.0);
        orch.on_scroll(&mut session);
        assert_eq!(session.cursor(), 0);
    }

    #[test]
    fn test_pin_length_follows_viewport_height() {
        let config = config(0);
        let bus = EventBus::new();
        let mut session = session(&config, bus.clone());
        let (mut orch, scroll) = bound(&config, &bus);

        scroll.set_scroll_y(300.0);
        scroll.set_viewport_height(2.0 * VH);
        orch.on_scroll(&mut session);
        assert_eq!(orch.target_progress(), 0.25);
        assert_eq!(orch.pin_progress(300.0, 0.0), 0.0);
    }

    #[test]
    fn test_nav_flags_toggle_on_change_only() {
        let config = config(0);
        let bus = EventBus::new();
        let mut session = session(&config, bus.clone());
        let (mut orch, scroll) = bound(&config, &bus);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        bus.subscribe::<NavFlagsChangedEvent, _>(move |e| s.lock().unwrap().push(*e));

        for y in [0.0, 40.0, 60.0, 80.0, 150.0, 160.0, 20.0] {
            scroll.set_scroll_y(y);
            orch.on_scroll(&mut session);
        }

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                NavFlagsChangedEvent { go_up_visible: false, nav_scrolled: true },
                NavFlagsChangedEvent { go_up_visible: true, nav_scrolled: true },
                NavFlagsChangedEvent { go_up_visible: false, nav_scrolled: false },
            ]
        );
        assert_eq!(orch.nav_flags(), NavFlagsChangedEvent::default());
    }

    #[test]
    fn test_reveal_replays_both_directions() {
        let config = config(0);
        let bus = EventBus::new();
        let mut session = session(&config, bus.clone());
        let (mut orch, scroll) = bound(&config, &bus);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        bus.subscribe::<RevealEvent, _>(move |e| s.lock().unwrap().push((e.section.clone(), e.action)));

        // "about" line: (7.0 - 0.6) * 100 = 640, "work" line: 840
        for y in [600.0, 640.0, 700.0, 900.0, 830.0, 100.0, 650.0] {
            scroll.set_scroll_y(y);
            orch.on_scroll(&mut session);
        }

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                ("about".to_string(), RevealAction::Play),
                ("work".to_string(), RevealAction::Play),
                ("work".to_string(), RevealAction::Reverse),
                ("about".to_string(), RevealAction::Reverse),
                ("about".to_string(), RevealAction::Play),
            ]
        );
    }

    #[test]
    fn test_scrub_lag_eases_toward_target() {
        let config = config(500);
        let bus = EventBus::new();
        let mut session = session(&config, bus.clone());
        let (mut orch, scroll) = bound(&config, &bus);

        scroll.set_scroll_y(600.0);
        orch.on_scroll(&mut session);
        // Nothing moves until refresh ticks advance the ease
        assert_eq!(session.cursor(), 0);

        orch.advance(Duration::from_millis(16), &mut session);
        let first = orch.displayed_progress();
        assert!(first > 0.0 && first < 1.0);

        let mut last = first;
        for _ in 0..200 {
            orch.advance(Duration::from_millis(16), &mut session);
            assert!(orch.displayed_progress() >= last);
            last = orch.displayed_progress();
        }
        assert_eq!(orch.displayed_progress(), 1.0);
        assert_eq!(session.cursor(), 10);
    }
}
