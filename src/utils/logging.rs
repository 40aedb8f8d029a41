//! Subscriber setup for the binary. Library code only emits events.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;
use crate::utils::fs::ensure_dir;
use crate::Result;

/// `RUST_LOG` wins over the configured level.
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("permit_watcher={}", config.level)))
}

/// Installs the global subscriber: stderr always, plus a daily rolling file
/// in `log_dir` when enabled. Keep the returned guard alive until exit or
/// buffered file output is lost.
pub fn init(config: &LoggingConfig, log_dir: &Path) -> Result<Option<WorkerGuard>> {
    let console = fmt::layer().with_writer(std::io::stderr).with_target(false);

    if !config.to_file {
        tracing_subscriber::registry()
            .with(env_filter(config))
            .with(console)
            .init();
        return Ok(None);
    }

    ensure_dir(log_dir)?;
    let appender = tracing_appender::rolling::daily(log_dir, &config.file_prefix);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(console)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .init();

    Ok(Some(guard))
}
