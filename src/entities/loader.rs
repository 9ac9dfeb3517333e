//! Image loader for sequence frames
//!
//! Decodes any format the `image` crate is built with (PNG, JPEG, WebP)
//! into 8-bit RGBA, which is what the compositor samples from.

use image::RgbaImage;
use log::debug;
use std::path::Path;

use super::frame::FrameError;

/// Extensions accepted for sequence frames
const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Image loader
pub struct Loader;

impl Loader {
    /// Check if extension (without dot) is a supported frame format
    pub fn is_supported(ext: &str) -> bool {
        let ext = ext.to_lowercase();
        SUPPORTED_EXTENSIONS.contains(&ext.as_str())
    }

    /// Load complete image file as RGBA8
    pub fn load(path: &Path) -> Result<RgbaImage, FrameError> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase();

        if !Self::is_supported(&ext) {
            return Err(FrameError::UnsupportedFormat(format!(
                "{} ({})",
                ext,
                path.display()
            )));
        }

        if !path.exists() {
            return Err(FrameError::Io(format!("File not found: {}", path.display())));
        }

        debug!("Loading frame image: {}", path.display());

        let img = image::open(path)
            .map_err(|e| FrameError::Image(format!("Image load error: {}", e)))?;

        Ok(img.to_rgba8())
    }
}
