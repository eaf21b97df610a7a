use std::path::Path;

use anyhow::{Context, Result};
pub use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::ForgeConfig;

/// Log file prefix inside the diagnostics directory.
const LOG_FILE_PREFIX: &str = "testforge.log";

/// Install the global subscriber: a daily log file under the diagnostics
/// directory plus compact console output.
///
/// `RUST_LOG` takes precedence over the configured filter. The returned guard
/// flushes the file writer on drop and must outlive the run.
pub fn init_logging(config: &ForgeConfig) -> Result<WorkerGuard> {
    let (file_writer, guard) = file_writer(&config.diagnostics_dir)?;

    tracing_subscriber::registry()
        .with(env_filter(&config.log_filter))
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .with(fmt::layer().with_target(false).compact())
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    Ok(guard)
}

fn file_writer(dir: &Path) -> Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
    let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
    Ok(tracing_appender::non_blocking(appender))
}

fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}
