//! Entry point for the EPUB pacer.
//!
//! Responsibilities here are intentionally minimal:
//! - Parse command-line arguments.
//! - Load user configuration from `conf/config.toml` and stored preferences.
//! - Set up file logging.
//! - Hand the session to the terminal UI or the plain stdout mode.

mod app;
mod plain;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use pacer_core::CancellationToken;
use pacer_core::config::{AppConfig, LogLevel, load_config};
use pacer_core::document::Layout;
use pacer_core::preferences;
use pacer_core::session::ReaderSession;
use pacer_core::store::FileStore;
use std::env;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LayoutArg {
    Chapter,
    Page,
}

impl From<LayoutArg> for Layout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Chapter => Layout::Chapter,
            LayoutArg::Page => Layout::Page,
        }
    }
}

/// Read an EPUB by highlighting a few words at a time.
#[derive(Debug, Parser)]
#[command(name = "epub-pacer", version)]
struct Args {
    /// Book to open (.epub or .txt).
    path: PathBuf,

    /// Configuration file.
    #[arg(long, default_value = "conf/config.toml")]
    config: PathBuf,

    /// Group paragraphs by chapter or by character-budget page.
    #[arg(long, value_enum)]
    layout: Option<LayoutArg>,

    /// Words per highlighted chunk.
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Autoplay speed level (1 is slowest).
    #[arg(long)]
    speed: Option<u32>,

    /// Print chunks to stdout instead of opening the terminal UI.
    #[arg(long)]
    plain: bool,

    /// Start from the beginning and forget the saved position.
    #[arg(long)]
    restart: bool,

    /// Log filter, overriding the configured level (e.g. `info`).
    #[arg(long)]
    log_level: Option<String>,

    /// File that receives the log output.
    #[arg(long, default_value = "epub-pacer.log")]
    log_file: PathBuf,
}

fn main() {
    let args = Args::parse();
    let (reload_handle, guard) = init_tracing(&args.log_file);
    let config = load_config(&args.config);
    let env_filter_set = env::var_os(EnvFilter::DEFAULT_ENV).is_some();
    if let Some(filter) = log_filter_override(args.log_level.as_deref(), &config, env_filter_set) {
        set_log_level(&reload_handle, &filter);
    }

    let code = match run(args, config) {
        Ok(()) => 0,
        Err(err) => {
            error!("{err:?}");
            eprintln!("{err:#}");
            1
        }
    };
    drop(guard);
    std::process::exit(code);
}

fn run(args: Args, mut config: AppConfig) -> Result<()> {
    let store = FileStore::new(&config.cache_dir);
    if let Some(prefs) = preferences::load(&store) {
        info!("Applying stored reader preferences");
        prefs.apply_to(&mut config);
    }
    apply_cli_overrides(&args, &mut config);
    info!(
        path = %args.path.display(),
        layout = %config.layout,
        chunk_size = config.chunk_size,
        speed = config.speed,
        plain = args.plain,
        "Starting EPUB pacer"
    );

    let session = ReaderSession::new(config, Box::new(store));
    let resume = !args.restart;
    if args.plain {
        return plain::run(session, &args.path, resume);
    }
    run_interactive(session, &args.path, resume)
}

fn run_interactive(mut session: ReaderSession, path: &Path, resume: bool) -> Result<()> {
    // Load failures are shown inside the UI.
    if let Err(err) = session.load_path(path, resume, &CancellationToken::new()) {
        warn!(kind = err.kind(), "Opening UI without a book");
    }
    app::run(session)
}

fn apply_cli_overrides(args: &Args, config: &mut AppConfig) {
    if let Some(layout) = args.layout {
        config.layout = layout.into();
    }
    if let Some(chunk_size) = args.chunk_size {
        config.chunk_size = chunk_size;
    }
    if let Some(speed) = args.speed {
        config.speed = speed;
    }
    config.clamp_in_place();
}

/// Filter to apply once the config is known: the command line wins, then
/// `RUST_LOG` (already active), then the configured level.
fn log_filter_override(
    cli_level: Option<&str>,
    config: &AppConfig,
    env_filter_set: bool,
) -> Option<String> {
    match cli_level {
        Some(level) => Some(level.to_string()),
        None if env_filter_set => None,
        None => Some(config.log_level.as_filter_str().to_string()),
    }
}

fn init_tracing(log_path: &Path) -> (ReloadHandle, WorkerGuard) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(LogLevel::default().as_filter_str()));
    let (filter_layer, handle) = reload::Layer::new(env_filter);

    let dir = log_path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = log_path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "epub-pacer.log".into());
    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(file_writer)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
    info!(file = %log_path.display(), "Logging initialized; override level with --log-level or RUST_LOG");
    (handle, guard)
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("debug"));
    if let Err(err) = handle.modify(|filter| *filter = parsed) {
        warn!(%level, "Failed to update log level: {err}");
    } else {
        info!(%level, "Applied log level");
    }
}
