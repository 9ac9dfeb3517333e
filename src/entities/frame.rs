//! Sequence frame with one-shot load status
//!
//! **Why**: Every frame of the scrubbed sequence starts `Pending` and is settled
//! exactly once by the preloader, either to `Loaded` (decoded RGBA handle stored)
//! or to `Failed` (handle stays absent for the rest of the session).
//!
//! **Used by**: FrameStore (ownership), Preloader (settle), Compositor (paint)
//!
//! # Atomic Settling
//!
//! `settle()` checks and sets the status under a single mutex lock, so two
//! completions racing for the same frame cannot both transition it.

use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Frame loading status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Pending, // Load requested, not settled yet
    Loaded,  // Decoded handle available
    Failed,  // Load or decode failed, handle absent
}

/// Frame loading errors
#[derive(Debug)]
pub enum FrameError {
    Io(String),
    Image(String),
    UnsupportedFormat(String),
}

impl std::fmt::Display for FrameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameError::Io(e) => write!(f, "IO error: {}", e),
            FrameError::Image(e) => write!(f, "Image error: {}", e),
            FrameError::UnsupportedFormat(e) => write!(f, "Unsupported format: {}", e),
        }
    }
}

impl std::error::Error for FrameError {}

#[derive(Debug)]
struct FrameData {
    status: FrameStatus,
    handle: Option<Arc<RgbaImage>>,
}

/// Single frame of the sequence.
///
/// Cloning is cheap: clones share the same status and handle.
#[derive(Debug, Clone)]
pub struct Frame {
    index: usize,
    locator: PathBuf, // Immutable after creation
    data: Arc<Mutex<FrameData>>,
}

impl Frame {
    /// Create pending frame for `locator`
    pub fn new(index: usize, locator: PathBuf) -> Self {
        Self {
            index,
            locator,
            data: Arc::new(Mutex::new(FrameData {
                status: FrameStatus::Pending,
                handle: None,
            })),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn locator(&self) -> &Path {
        &self.locator
    }

    pub fn status(&self) -> FrameStatus {
        self.data.lock().unwrap_or_else(|e| e.into_inner()).status
    }

    /// Decoded image, present only once `Loaded`
    pub fn handle(&self) -> Option<Arc<RgbaImage>> {
        self.data
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .handle
            .clone()
    }

    /// Pixel size of the decoded image (None unless loaded)
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.handle().map(|img| img.dimensions())
    }

    /// Settle the frame with a load outcome (Pending → Loaded | Failed).
    ///
    /// # Returns
    ///
    /// - `Some(status)`: this call performed the transition
    /// - `None`: frame was already settled, outcome is dropped
    pub fn settle(&self, outcome: Result<RgbaImage, FrameError>) -> Option<FrameStatus> {
        let mut data = self.data.lock().unwrap_or_else(|e| e.into_inner());
        if data.status != FrameStatus::Pending {
            return None;
        }
        data.status = match outcome {
            Ok(img) => {
                data.handle = Some(Arc::new(img));
                FrameStatus::Loaded
            }
            Err(_) => FrameStatus::Failed,
        };
        Some(data.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_frame_is_pending() {
        let frame = Frame::new(3, PathBuf::from("Images/4.webp"));
        assert_eq!(frame.index(), 3);
        assert_eq!(frame.status(), FrameStatus::Pending);
        assert!(frame.handle().is_none());
        assert!(frame.dimensions().is_none());
    }

    #[test]
    fn test_settle_loaded_stores_handle() {
        let frame = Frame::new(0, PathBuf::from("1.png"));
        let status = frame.settle(Ok(RgbaImage::new(4, 2)));
        assert_eq!(status, Some(FrameStatus::Loaded));
        assert_eq!(frame.dimensions(), Some((4, 2)));
    }

    #[test]
    fn test_settle_failed_keeps_handle_absent() {
        let frame = Frame::new(0, PathBuf::from("1.png"));
        let status = frame.settle(Err(FrameError::Io("missing".into())));
        assert_eq!(status, Some(FrameStatus::Failed));
        assert!(frame.handle().is_none());
    }

    #[test]
    fn test_settle_happens_once() {
        let frame = Frame::new(0, PathBuf::from("1.png"));
        let clone = frame.clone();
        assert!(frame.settle(Err(FrameError::Image("bad".into()))).is_some());
        // Late success does not resurrect a failed frame
        assert!(clone.settle(Ok(RgbaImage::new(1, 1))).is_none());
        assert_eq!(frame.status(), FrameStatus::Failed);
        assert!(frame.handle().is_none());
    }
}
