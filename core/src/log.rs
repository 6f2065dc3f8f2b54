//! Log file setup
//!
//! Neovim owns stdout, so logs only go to a file:
//! `<data_local_dir>/im-switch.nvim/logs/im-switch-<pid>.log`
//! - macOS: `~/Library/Application Support/im-switch.nvim/logs/`
//! - Linux: `~/.local/share/im-switch.nvim/logs/`
//!
//! The filter comes from `IM_SWITCH_LOG`, then `RUST_LOG`, and defaults to
//! `warn` globally and `info` for the plugin crates.

use std::{env, path::PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

/// Returned from [`init`]; must be held alive to ensure log file flushing.
pub struct LogGuard {
    _file_guard: WorkerGuard,
    pub log_file: PathBuf,
}

/// Install the file subscriber, writing into `log_dir` or the default
/// location. Returns `Ok(None)` without touching the file system when the
/// host process already installed a global subscriber.
pub fn init(
    log_dir: Option<PathBuf>,
) -> Result<Option<LogGuard>, Box<dyn std::error::Error + Send + Sync>> {
    if tracing::dispatcher::has_been_set() {
        return Ok(None);
    }

    let log_dir = log_dir.unwrap_or_else(default_log_dir);
    let filename = format!("im-switch-{}.log", std::process::id());

    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::never(&log_dir, &filename);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_filter(create_filter()?);

    Registry::default().with(file_layer).try_init()?;

    Ok(Some(LogGuard {
        _file_guard: file_guard,
        log_file: log_dir.join(filename),
    }))
}

fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("im-switch.nvim")
        .join("logs")
}

fn create_filter() -> Result<EnvFilter, Box<dyn std::error::Error + Send + Sync>> {
    if let Ok(directives) = env::var("IM_SWITCH_LOG") {
        return Ok(EnvFilter::try_new(directives)?);
    }
    if let Ok(directives) = env::var("RUST_LOG") {
        return Ok(EnvFilter::try_new(directives)?);
    }
    Ok(EnvFilter::try_new("warn,im_switch=info,im_switch_core=info")?)
}
