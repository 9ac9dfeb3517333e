//! Abstract traits for dependency inversion.
//!
//! These traits define interfaces that `core` needs from infrastructure
//! (thread pool, image decoding), so preloading can be driven by the real
//! worker pool and disk loader or by deterministic stand-ins in tests.

use image::RgbaImage;
use std::path::Path;
use std::sync::Arc;

use super::frame::FrameError;
use super::loader::Loader;

/// Abstract worker pool interface.
///
/// Allows the preloader to schedule background loads without knowing
/// the concrete thread pool implementation.
pub trait WorkerPool: Send + Sync {
    /// Execute closure on a worker thread. No ordering between jobs.
    fn execute(&self, f: Box<dyn FnOnce() + Send + 'static>);
}

/// Abstract frame source: resolves a locator into decoded RGBA pixels.
pub trait FrameSource: Send + Sync {
    fn load(&self, locator: &Path) -> Result<RgbaImage, FrameError>;
}

/// Frame source reading image files from disk via [`Loader`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskSource;

impl FrameSource for DiskSource {
    fn load(&self, locator: &Path) -> Result<RgbaImage, FrameError> {
        Loader::load(locator)
    }
}

/// Blanket impls: Arc<T> implements traits if T does
impl<T: WorkerPool + ?Sized> WorkerPool for Arc<T> {
    fn execute(&self, f: Box<dyn FnOnce() + Send + 'static>) {
        (**self).execute(f)
    }
}

impl<T: FrameSource + ?Sized> FrameSource for Arc<T> {
    fn load(&self, locator: &Path) -> Result<RgbaImage, FrameError> {
        (**self).load(locator)
    }
}
