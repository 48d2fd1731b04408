use crate::logic::config::{LogLevel, DEFAULT_CONFIG_FILE};
use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevelArg {
    #[value(name = "DEBUG")]
    Debug,
    #[value(name = "INFO")]
    Info,
    #[value(name = "WARNING")]
    Warning,
    #[value(name = "ERROR")]
    Error,
}

impl From<LogLevelArg> for LogLevel {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Debug => LogLevel::Debug,
            LogLevelArg::Info => LogLevel::Info,
            LogLevelArg::Warning => LogLevel::Warning,
            LogLevelArg::Error => LogLevel::Error,
        }
    }
}

/// CleanUp Instant VDI Clones - remove temporary DI clients
#[derive(Debug, Parser)]
#[command(name = "dias", version)]
pub struct Cli {
    /// Load a config file (supports `~`)
    #[arg(short = 'c', long = "config_file", default_value = DEFAULT_CONFIG_FILE)]
    pub config_file: String,

    /// Define the log level (overrides the config file)
    #[arg(short = 'L', long = "log_level")]
    pub log_level: Option<LogLevelArg>,

    /// Print debug messages
    #[arg(short, long)]
    pub debug: bool,

    /// Disable console output
    #[arg(short, long)]
    pub silent: bool,
}

impl Cli {
    /// Verbosity for this run: `--debug` beats everything else
    pub fn effective_level(&self, configured: LogLevel) -> LogLevel {
        if self.debug {
            LogLevel::Debug
        } else {
            configured
        }
    }
}
