//! Subscriber installation for the CLI
//!
//! Command output goes to stdout, so log lines only ever go to stderr and the
//! optional run log file.

use anyhow::{Context, Result};
use showreel_core::LogConfig;
use std::fs::File;
use std::io::IsTerminal;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer,
};

/// Installed logging; dropping it flushes the run log
#[derive(Default)]
pub struct LogSession {
    /// Run log file, if file output is on
    pub log_file: Option<PathBuf>,
    _worker: Option<WorkerGuard>,
}

/// `RUST_LOG` wins over the configured level
fn level_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(config.parse_level().into())
        .from_env_lossy()
}

/// Prepare the log directory, rotate old runs and create this run's file
fn open_run_log(config: &LogConfig) -> Result<Option<(File, PathBuf)>> {
    if !config.file_output {
        return Ok(None);
    }
    config
        .ensure_log_directory()
        .with_context(|| format!("Failed to create log directory {:?}", config.log_dir))?;

    // Rotation failing must not stop a render
    let rotated = config.cleanup_old_logs().unwrap_or_else(|e| {
        eprintln!("Warning: could not remove old log files: {}", e);
        0
    });

    let path = config.current_log_path();
    let file =
        File::create(&path).with_context(|| format!("Failed to create log file {:?}", path))?;
    if rotated > 0 {
        eprintln!("Removed {} old log file(s) from {:?}", rotated, config.log_dir);
    }
    Ok(Some((file, path)))
}

/// Install the global subscriber for this process
pub fn init(config: &LogConfig) -> Result<LogSession> {
    let stderr_layer = config.console_output.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(std::io::stderr().is_terminal())
            .with_target(false)
            .without_time()
            .with_filter(level_filter(config))
    });

    let mut session = LogSession::default();
    let run_log_layer = match open_run_log(config)? {
        Some((file, path)) => {
            let (writer, worker) = tracing_appender::non_blocking(file);
            session.log_file = Some(path);
            session._worker = Some(worker);
            Some(
                fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_filter(level_filter(config)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(run_log_layer)
        .try_init()
        .context("A tracing subscriber is already installed")?;

    tracing::debug!("Log level {}", config.level);
    if let Some(path) = &session.log_file {
        tracing::info!("Writing run log to {:?}", path);
    }
    Ok(session)
}
