//! SCROLLSEQ - scroll-scrubbed image sequence renderer
//!
//! Re-exports all modules for use by the binary target.

// Core engine (preload, compositing, scheduling, events, workers)
pub mod core;

// App modules
pub mod cli;
pub mod config;
pub mod entities;
pub mod progress;

// Re-export commonly used types from core
pub use core::event_bus::{BoxedEvent, EventBus, downcast_event};
pub use core::{RendererSession, ScrollOrchestrator, ScrollProvider, SequenceError, Workers};

// Re-export entities
pub use entities::{Frame, FrameStatus, FrameStore, Surface, ViewportSize};
