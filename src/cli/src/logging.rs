use anyhow::{Context, Result};
use meshmap_common::constants::{LOG_FILE, WORKING_DIR};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, time::SystemTime},
    prelude::*,
    EnvFilter,
};

/// Routes all tracing output to the session log file; the terminal stays
/// reserved for operator prompts.
pub fn setup_logging() -> Result<()> {
    std::fs::create_dir_all(WORKING_DIR)
        .with_context(|| format!("failed to create {}", WORKING_DIR))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::from("info"));

    let file_appender = RollingFileAppender::new(Rotation::NEVER, WORKING_DIR, "meshmap.log");

    let file_layer = fmt::layer()
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_level(true)
        .with_timer(SystemTime)
        .with_ansi(false)
        .with_writer(file_appender);

    let subscriber = tracing_subscriber::registry().with(filter).with(file_layer);

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    tracing::info!("Logging initialized. Writing to {}", LOG_FILE);
    Ok(())
}
