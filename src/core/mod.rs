//! Core engine modules - preload, compositing, scrub scheduling, events, workers
//!
//! These modules form the renderer, independent of any host (CLI, page shell).

pub mod compositor;
pub mod debounce;
pub mod event_bus;
pub mod orchestrator;
pub mod preloader;
pub mod scrub;
pub mod session;
pub mod session_events;
pub mod throttle;
pub mod viewport;
pub mod workers;

// Re-exports for convenience
pub use compositor::{Compositor, DrawRect, cover_fit};
pub use debounce::Debounce;
pub use event_bus::EventBus;
pub use orchestrator::{ScrollOrchestrator, ScrollProvider, SharedScroll};
pub use preloader::{PreloadStats, Preloader, SequenceError};
pub use scrub::{ScrubDriver, progress_to_frame};
pub use session::{RefreshOutcome, RendererSession};
pub use throttle::FrameThrottle;
pub use viewport::ViewportManager;
pub use workers::Workers;
