//! Entities module - sequence data types, independent of scheduling
//!
//! Frames and their store, the drawing surface, image loading and the
//! traits `core` uses to reach infrastructure.

pub mod frame;
pub mod loader;
pub mod store;
pub mod surface;
pub mod traits;

pub use frame::{Frame, FrameError, FrameStatus};
pub use loader::Loader;
pub use store::{FrameStore, LocatorTemplate};
pub use surface::{Surface, ViewportSize};
pub use traits::{DiskSource, FrameSource, WorkerPool};
