//! Logging setup for queuebot using tracing.

use anyhow::Result;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Logging options taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    /// Directory for the rolling log file (platform data dir when `None`)
    pub log_dir: Option<PathBuf>,
    /// Raise the default filter to `debug` for every target
    pub verbose: bool,
    /// Write the log file as JSON lines
    pub json: bool,
}

/// Initialize logging with a daily-rolling file and console output.
///
/// The returned guard flushes the file writer when dropped; keep it alive.
pub fn init(options: &LogOptions) -> Result<(WorkerGuard, PathBuf)> {
    let log_dir = match &options.log_dir {
        Some(dir) => dir.clone(),
        None => default_log_dir()?,
    };
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "queuebot.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let default_filter = if options.verbose {
        "debug"
    } else {
        "info,queuebot=debug"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let file_layer = if options.json {
        fmt::layer()
            .json()
            .with_writer(non_blocking)
            .with_current_span(false)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(true)
            .with_line_number(true)
            .boxed()
    };

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()?;

    tracing::debug!("Logging to {}", log_dir.display());

    Ok((guard, log_dir))
}

fn default_log_dir() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("org", "queuebot", "queuebot")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;

    Ok(dirs.data_dir().join("logs"))
}
