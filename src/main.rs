use scrollseq::cli::Args;
use scrollseq::config::{self, SequenceConfig};
use scrollseq::core::session_events::{NavFlagsChangedEvent, RevealEvent};
use scrollseq::core::{RendererSession, ScrollOrchestrator, SharedScroll, Workers};
use scrollseq::entities::{DiskSource, FrameSource};
use scrollseq::progress::LoadProgress;
use scrollseq::{EventBus, downcast_event};

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Wait used when neither CLI nor config sets a preload timeout
const UNBOUNDED_WAIT: Duration = Duration::from_secs(24 * 60 * 60);

fn init_logging(args: &Args, path_config: &config::PathConfig) -> Result<()> {
    // 0 (default) = warn, 1 (-v) = info, 2 (-vv) = debug, 3+ (-vvv) = trace
    let log_level = match args.verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    if let Some(log_path_opt) = &args.log_file {
        let log_path = log_path_opt
            .as_ref()
            .cloned()
            .unwrap_or_else(|| config::data_file(config::LOG_FILE, path_config));

        let file = std::fs::File::create(&log_path)
            .with_context(|| format!("Failed to create log file: {}", log_path.display()))?;

        env_logger::Builder::new()
            .filter_level(log_level)
            .format_timestamp_millis()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();

        info!("Logging to file: {} (level: {:?})", log_path.display(), log_level);
    } else {
        // Console logging (respects RUST_LOG if set)
        let default_level = match args.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
            .format_timestamp_millis()
            .init();
    }
    Ok(())
}

/// Config file from --config, else the discovered default, with CLI overrides applied
fn load_config(args: &Args, path_config: &config::PathConfig) -> Result<SequenceConfig> {
    let mut cfg = match &args.config {
        Some(path) => SequenceConfig::load(path)?,
        None => {
            let path = config::config_file(config::CONFIG_FILE, path_config);
            SequenceConfig::load_or_default(&path)?
        }
    };

    if let Some(dir) = &args.frames_dir {
        cfg.base_path = dir.clone();
    }
    if let Some(count) = args.frame_count {
        cfg.frame_count = count;
    }
    if let Some(ext) = &args.extension {
        cfg.extension = ext.trim_start_matches('.').to_string();
    }
    if let Some(workers) = args.workers {
        cfg.workers = workers;
    }
    if let Some(offset) = args.top_offset {
        cfg.top_offset = offset;
    }
    if let Some(ms) = args.timeout_ms {
        cfg.ready_timeout_ms = Some(ms);
    }

    cfg.validate()?;
    Ok(cfg)
}

fn save_surface(session: &RendererSession, out_dir: &Path, name: &str) -> Result<()> {
    let path = out_dir.join(name);
    session
        .surface()
        .save(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote {} (frame {})", path.display(), session.cursor());
    Ok(())
}

/// Log scroll-side effects queued since the last drain (keeps the bus queue empty)
fn drain_events(bus: &EventBus) {
    for event in bus.poll() {
        if let Some(e) = downcast_event::<RevealEvent>(&event) {
            info!("Reveal {:?}: {}", e.action, e.section);
        } else if let Some(e) = downcast_event::<NavFlagsChangedEvent>(&event) {
            info!("Nav: go_up_visible={} nav_scrolled={}", e.go_up_visible, e.nav_scrolled);
        }
    }
}

/// Scrub to each position and write `scrub_<k>.png`. Returns images written.
fn render_progress(
    session: &mut RendererSession,
    bus: &EventBus,
    positions: &[f64],
    out_dir: &Path,
) -> Result<usize> {
    for (k, p) in positions.iter().enumerate() {
        session.on_scroll_progress(*p);
        session.on_refresh();
        drain_events(bus);
        save_surface(session, out_dir, &format!("scrub_{:03}.png", k))?;
    }
    Ok(positions.len())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let path_config = config::PathConfig::from_env_and_cli(args.config_dir.clone());
    if let Err(e) = config::ensure_dirs(&path_config) {
        eprintln!("Warning: Failed to create application directories: {}", e);
    }

    init_logging(&args, &path_config)?;
    info!("scrollseq starting...");
    debug!("Command-line args: {:?}", args);

    let cfg = load_config(&args, &path_config)?;
    info!(
        "Sequence: {} frames at {} (*.{})",
        cfg.frame_count,
        cfg.base_path.display(),
        cfg.extension
    );

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("Failed to create output dir: {}", args.out_dir.display()))?;

    let bus = EventBus::new();
    let progress = LoadProgress::attach(&bus, cfg.frame_count);
    let workers = Workers::new(cfg.workers);
    let source: Arc<dyn FrameSource> = Arc::new(DiskSource);

    let mut session = RendererSession::new(&cfg, args.size, bus.clone())?;
    session.start_preload(&workers, source);

    let timeout = cfg.ready_timeout().unwrap_or(UNBOUNDED_WAIT);
    if let Err(e) = session.wait_ready(timeout) {
        progress.abandon("Preload stalled");
        return Err(e).context("Sequence never became ready");
    }
    let stats = session.stats();
    if stats.failed > 0 {
        warn!("{} of {} frames failed to load; they render as gaps", stats.failed, stats.total);
    }
    bus.poll();

    let mut rendered = render_progress(&mut session, &bus, &args.progress, &args.out_dir)?;

    if !args.scroll.is_empty() {
        // Offline render: no easing, every offset lands on its exact frame
        let scroll_cfg = SequenceConfig {
            scrub_lag_ms: 0,
            ..cfg.clone()
        };
        let scroll = SharedScroll::new(args.size.height as f64);
        let mut orchestrator = ScrollOrchestrator::new(&scroll_cfg, bus.clone());
        orchestrator.bind(Some(Box::new(scroll.clone())));

        for (k, y) in args.scroll.iter().enumerate() {
            scroll.set_scroll_y(*y);
            orchestrator.on_scroll(&mut session);
            session.on_refresh();
            drain_events(&bus);
            save_surface(&session, &args.out_dir, &format!("scroll_{:03}.png", k))?;
            rendered += 1;
        }
    }

    if rendered == 0 {
        save_surface(&session, &args.out_dir, "scrub_000.png")?;
        rendered = 1;
    }

    info!("Done: {} image(s) in {}", rendered, args.out_dir.display());
    Ok(())
}
