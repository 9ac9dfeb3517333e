//! Renderer session and scroll orchestration events.

use std::path::PathBuf;

// === Preload ===

/// Emitted on every frame settle (success or failure)
#[derive(Clone, Debug, PartialEq)]
pub struct LoadProgressEvent {
    pub settled: usize,
    pub total: usize,
    /// 0.0..=100.0
    pub percent: f32,
}

#[derive(Clone, Debug)]
pub struct FrameLoadFailedEvent {
    pub index: usize,
    pub locator: PathBuf,
    pub error: String,
}

/// Emitted exactly once, when the last outstanding frame settles
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SequenceReadyEvent {
    pub loaded: usize,
    pub failed: usize,
    pub total: usize,
}

// === Rendering ===

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FramePaintedEvent {
    pub frame: usize,
}

// === Scroll orchestration ===

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct NavFlagsChangedEvent {
    pub go_up_visible: bool,
    pub nav_scrolled: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealAction {
    /// Section crossed its trigger line scrolling down: restart the reveal
    Play,
    /// Section crossed back above its trigger line: reverse the reveal
    Reverse,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RevealEvent {
    pub section: String,
    pub action: RevealAction,
}
