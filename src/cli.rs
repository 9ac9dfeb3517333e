use clap::Parser;
use std::path::PathBuf;

use crate::entities::ViewportSize;

// Build version with target info
const VERSION_INFO: &str = const_format::concatcp!(
    env!("CARGO_PKG_VERSION"), "\n",
    "Target: ", std::env::consts::ARCH, "-", std::env::consts::OS
);

/// Scroll-scrubbed image sequence renderer
///
/// Preloads `<FRAMES_DIR>/1.<ext> .. <count>.<ext>`, then renders the frame shown
/// at each requested scrub position (or scroll offset) into PNG files.
#[derive(Parser, Debug)]
#[command(author, version = VERSION_INFO, about, long_about = None)]
pub struct Args {
    /// Folder with the numbered frames (overrides config base_path)
    #[arg(value_name = "FRAMES_DIR")]
    pub frames_dir: Option<PathBuf>,

    /// Number of frames in the sequence (overrides config frame_count)
    #[arg(short = 'n', long = "count", value_name = "N")]
    pub frame_count: Option<usize>,

    /// Frame file extension, e.g. webp, png (overrides config extension)
    #[arg(short = 'e', long = "ext", value_name = "EXT")]
    pub extension: Option<String>,

    /// Viewport size in device pixels
    #[arg(long = "size", value_name = "WxH", default_value = "1280x720", value_parser = parse_size)]
    pub size: ViewportSize,

    /// Scrub positions to render (0.0..1.0, repeatable)
    #[arg(short = 'p', long = "progress", value_name = "P", num_args = 1.., allow_negative_numbers = true)]
    pub progress: Vec<f64>,

    /// Scroll offsets in pixels to render through the scroll orchestrator (repeatable)
    #[arg(short = 's', long = "scroll", value_name = "Y", num_args = 1.., allow_negative_numbers = true)]
    pub scroll: Vec<f64>,

    /// Output directory for rendered PNG files
    #[arg(short = 'o', long = "out", value_name = "DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// Sequence config JSON (default: scrollseq.json in the config directory, if present)
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Give up waiting for the preload after this many milliseconds
    #[arg(short = 't', long = "timeout", value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Loader threads (0 = auto)
    #[arg(short = 'j', long = "workers", value_name = "N")]
    pub workers: Option<usize>,

    /// Top offset for frames taller than the viewport
    #[arg(long = "top-offset", value_name = "PX")]
    pub top_offset: Option<f64>,

    /// Enable debug logging to file (default: scrollseq.log)
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE")]
    pub log_file: Option<Option<PathBuf>>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Custom configuration directory (overrides default platform paths)
    #[arg(short = 'c', long = "config-dir", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
}

fn parse_size(s: &str) -> Result<ViewportSize, String> {
    match ViewportSize::parse(s) {
        Some(size) if !size.is_empty() => Ok(size),
        _ => Err(format!("expected WIDTHxHEIGHT with non-zero sides, got '{}'", s)),
    }
}
