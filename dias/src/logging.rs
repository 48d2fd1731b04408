use crate::logic::config::LogLevel;
use anyhow::Context;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warning => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

/// Install the global subscriber.
///
/// Console output goes to stderr unless `silent`; `file`, when set, gets the
/// same events appended without colors.
pub fn init(level: LogLevel, silent: bool, file: Option<&Path>) -> anyhow::Result<()> {
    let console = (!silent).then(|| fmt::layer().with_writer(std::io::stderr));

    let file_layer = match file {
        Some(path) => {
            let log_file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(log_file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(LevelFilter::from_level(level.into()))
        .with(console)
        .with(file_layer)
        .try_init()
        .context("failed to install log subscriber")?;
    Ok(())
}
