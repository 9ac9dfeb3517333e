//! Configuration: sequence/session constants and config file locations.
//!
//! `SequenceConfig` holds every startup constant of the renderer (frame count,
//! locator template, framing offset, timer intervals, scroll thresholds).
//! It is read from JSON; missing fields take their defaults.
//!
//! Config file lookup priority:
//! 1. CLI `--config-dir` argument
//! 2. `SCROLLSEQ_CONFIG_DIR` environment variable
//! 3. Local folder IF `scrollseq.json` or `scrollseq.log` exists there
//! 4. Platform-specific directory from dirs-next (default)

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::entities::{Loader, LocatorTemplate};

/// Default config file name
pub const CONFIG_FILE: &str = "scrollseq.json";

/// Default log file name
pub const LOG_FILE: &str = "scrollseq.log";

/// App folder name under platform config/data dirs
const APP_DIR: &str = "scrollseq";

/// Environment override for the config directory
const CONFIG_DIR_ENV: &str = "SCROLLSEQ_CONFIG_DIR";

/// Page section with a text reveal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionConfig {
    pub name: String,
    /// Document offset of the section top, in viewport heights
    pub top: f64,
}

impl SectionConfig {
    pub fn new(name: &str, top: f64) -> Self {
        Self {
            name: name.to_string(),
            top,
        }
    }
}

/// Startup constants of a renderer session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceConfig {
    /// Number of frames; must match the files on disk
    pub frame_count: usize,
    /// Folder holding `1.<ext>`, `2.<ext>`, ...
    pub base_path: PathBuf,
    pub extension: String,
    /// Top offset for frames taller than the viewport (device pixels)
    pub top_offset: f64,
    pub resize_debounce_ms: u64,
    /// Time the displayed scrub position takes to catch up with scrolling (0 = immediate)
    pub scrub_lag_ms: u64,
    /// Scroll offset where the pinned hero region starts (pixels)
    pub pin_start: f64,
    /// Length of the pinned hero region, in viewport heights
    pub pin_span: f64,
    /// Scroll offset above which the go-up button shows
    pub go_up_threshold: f64,
    /// Scroll offset above which the nav bar switches to scrolled style
    pub nav_threshold: f64,
    /// Reveal trigger line, as a fraction of viewport height from the top
    pub reveal_start: f64,
    pub sections: Vec<SectionConfig>,
    /// Loader threads (0 = auto)
    pub workers: usize,
    /// Optional wait limit for readiness; None waits forever
    pub ready_timeout_ms: Option<u64>,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        // Hero pins for 6 viewport heights after its own; each pinned section
        // takes two (its height plus pin spacer).
        let sections = [
            "page-about",
            "page1",
            "page2",
            "page-experience",
            "page-education",
            "page-projects",
            "page3",
        ]
        .iter()
        .enumerate()
        .map(|(i, name)| SectionConfig::new(name, 7.0 + 2.0 * i as f64))
        .collect();

        Self {
            frame_count: 40,
            base_path: PathBuf::from("./Images"),
            extension: "webp".to_string(),
            top_offset: 50.0,
            resize_debounce_ms: 100,
            scrub_lag_ms: 500,
            pin_start: 0.0,
            pin_span: 6.0,
            go_up_threshold: 100.0,
            nav_threshold: 50.0,
            reveal_start: 0.6,
            sections,
            workers: 0,
            ready_timeout_ms: None,
        }
    }
}

impl SequenceConfig {
    /// Load config from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            log::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.frame_count == 0 {
            bail!("frame_count must be at least 1");
        }
        if !Loader::is_supported(self.extension.trim_start_matches('.')) {
            bail!("Unsupported frame extension: {}", self.extension);
        }
        if !(self.pin_span > 0.0) {
            bail!("pin_span must be positive, got {}", self.pin_span);
        }
        if !(0.0..=1.0).contains(&self.reveal_start) {
            bail!("reveal_start must be within 0..1, got {}", self.reveal_start);
        }
        if !self.top_offset.is_finite() {
            bail!("top_offset must be finite");
        }
        Ok(())
    }

    pub fn locator_template(&self) -> LocatorTemplate {
        LocatorTemplate::new(&self.base_path, &self.extension)
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    pub fn scrub_lag(&self) -> Duration {
        Duration::from_millis(self.scrub_lag_ms)
    }

    pub fn ready_timeout(&self) -> Option<Duration> {
        self.ready_timeout_ms.map(Duration::from_millis)
    }
}

/// Configuration for overriding default application paths
#[derive(Debug, Clone, Default)]
pub struct PathConfig {
    /// Custom config directory (from CLI or ENV)
    pub config_dir: Option<PathBuf>,
}

impl PathConfig {
    /// Priority: CLI args → ENV var (SCROLLSEQ_CONFIG_DIR) → None (use defaults)
    pub fn from_env_and_cli(cli_dir: Option<PathBuf>) -> Self {
        let config_dir = cli_dir.or_else(|| std::env::var(CONFIG_DIR_ENV).ok().map(PathBuf::from));
        Self { config_dir }
    }
}

/// Path to a configuration file
///
/// Platform paths:
/// - Linux: ~/.config/scrollseq/{name}
/// - macOS: ~/Library/Application Support/scrollseq/{name}
/// - Windows: %APPDATA%\scrollseq\{name}
pub fn config_file(name: &str, config: &PathConfig) -> PathBuf {
    resolve_dir(config, dirs_next::config_dir).join(name)
}

/// Path to a data file (logs)
///
/// Platform paths:
/// - Linux: ~/.local/share/scrollseq/{name}
/// - macOS: ~/Library/Application Support/scrollseq/{name}
/// - Windows: %APPDATA%\scrollseq\{name}
pub fn data_file(name: &str, config: &PathConfig) -> PathBuf {
    resolve_dir(config, dirs_next::data_dir).join(name)
}

/// Create config and data directories if missing
pub fn ensure_dirs(config: &PathConfig) -> Result<()> {
    let config_dir = resolve_dir(config, dirs_next::config_dir);
    let data_dir = resolve_dir(config, dirs_next::data_dir);

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).with_context(|| {
            format!("Failed to create config directory: {}", config_dir.display())
        })?;
    }
    if data_dir != config_dir && !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    }
    Ok(())
}

fn has_local_config_files(dir: &Path) -> bool {
    [CONFIG_FILE, LOG_FILE].iter().any(|f| dir.join(f).exists())
}

fn resolve_dir(config: &PathConfig, platform_dir: fn() -> Option<PathBuf>) -> PathBuf {
    // Priority 1: Custom directory from CLI or ENV
    if let Some(dir) = &config.config_dir {
        return dir.clone();
    }

    // Priority 2: Local folder IF config files exist there
    if let Ok(current_dir) = std::env::current_dir() {
        if has_local_config_files(&current_dir) {
            return current_dir;
        }
    }

    // Priority 3: Platform-specific directory
    if let Some(dir) = platform_dir() {
        return dir.join(APP_DIR);
    }

    PathBuf::from(".")
}
