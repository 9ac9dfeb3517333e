//! Frame store: the ordered timeline of sequence frames
//!
//! Indices are contiguous `0..count`, fixed for the session. Frame `i` is
//! addressed by the 1-based file name `<base>/<i+1>.<ext>`.

use std::path::{Path, PathBuf};

use super::frame::{Frame, FrameStatus};

/// Locator template for sequence files: `<base>/<index+1>.<ext>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorTemplate {
    base: PathBuf,
    ext: String,
}

impl LocatorTemplate {
    pub fn new(base: impl Into<PathBuf>, ext: &str) -> Self {
        Self {
            base: base.into(),
            ext: ext.trim_start_matches('.').to_string(),
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn ext(&self) -> &str {
        &self.ext
    }

    /// Locator for 0-based frame index (file names are 1-based)
    pub fn locate(&self, index: usize) -> PathBuf {
        self.base.join(format!("{}.{}", index + 1, self.ext))
    }
}

/// Ordered frames of one sequence
#[derive(Debug, Clone)]
pub struct FrameStore {
    frames: Vec<Frame>,
}

impl FrameStore {
    /// Build `count` pending frames using `locate(index)` for each locator
    pub fn new<F>(count: usize, locate: F) -> Self
    where
        F: Fn(usize) -> PathBuf,
    {
        let frames = (0..count).map(|i| Frame::new(i, locate(i))).collect();
        Self { frames }
    }

    pub fn from_template(count: usize, template: &LocatorTemplate) -> Self {
        Self::new(count, |i| template.locate(i))
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter()
    }

    /// Count frames with given status
    pub fn count_status(&self, status: FrameStatus) -> usize {
        self.frames.iter().filter(|f| f.status() == status).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::frame::FrameError;

    #[test]
    fn test_locator_is_one_based() {
        let tpl = LocatorTemplate::new("./Images", ".webp");
        assert_eq!(tpl.ext(), "webp");
        assert_eq!(tpl.locate(0), PathBuf::from("./Images/1.webp"));
        assert_eq!(tpl.locate(39), PathBuf::from("./Images/40.webp"));
    }

    #[test]
    fn test_store_indices_contiguous() {
        let tpl = LocatorTemplate::new("seq", "png");
        let store = FrameStore::from_template(5, &tpl);
        assert_eq!(store.len(), 5);
        for (i, frame) in store.iter().enumerate() {
            assert_eq!(frame.index(), i);
            assert_eq!(frame.locator(), tpl.locate(i));
        }
        assert!(store.get(5).is_none());
    }

    #[test]
    fn test_count_status() {
        let store = FrameStore::new(3, |i| PathBuf::from(format!("{}.png", i + 1)));
        store.get(1).unwrap().settle(Err(FrameError::Io("x".into())));
        assert_eq!(store.count_status(FrameStatus::Pending), 2);
        assert_eq!(store.count_status(FrameStatus::Failed), 1);
        assert_eq!(store.count_status(FrameStatus::Loaded), 0);
    }
}
