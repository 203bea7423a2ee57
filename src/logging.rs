//! Logging configuration for the helpdesk service

use std::path::Path;

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::{
    self,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Registry;

use crate::config::LoggingConfig;
use crate::Result;

const LOG_FILE_PREFIX: &str = "helpdesk-rag.log";

/// Initialize logging with configuration
///
/// `RUST_LOG` wins over the configured level when it is set.
pub fn init_logging_with_config(config: &LoggingConfig) -> Result<()> {
    if config.backtrace && std::env::var_os("RUST_BACKTRACE").is_none() {
        std::env::set_var("RUST_BACKTRACE", "1");
    }
    init_logging_in(&config.directory, &config.level)
}

/// Initialize logging with custom log level, writing files under `logs/`
pub fn init_logging_with_level(level: &str) -> Result<()> {
    init_logging_in("logs", level)
}

fn init_logging_in(directory: &str, level: &str) -> Result<()> {
    let logs_dir = Path::new(directory);
    if !logs_dir.exists() {
        std::fs::create_dir_all(logs_dir)?;
    }

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{level},helpdesk_rag={level}")));

    let file_appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);

    let file_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(non_blocking)
        .with_ansi(false);

    Registry::default()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| crate::HelpdeskError::Custom(format!("Failed to init logging: {e}")))?;

    tracing::info!("Logging initialized with level: {level}");
    tracing::info!(
        "Log files will be saved to: {}/{LOG_FILE_PREFIX}.YYYY-MM-DD",
        logs_dir.display()
    );

    // The writer thread must outlive every span; keep the guard for the process lifetime
    std::mem::forget(guard);

    Ok(())
}

/// Initialize simple console-only logging, for tests and one-shot commands
pub fn init_simple_logging() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(true)
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| crate::HelpdeskError::Custom(format!("Failed to init logging: {e}")))?;

    Ok(())
}
