use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "./dias.cfg";
pub const DEFAULT_OFFLINE_HOURS: u32 = 12;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("fqdn missing in config file")]
    MissingFqdn,
    #[error("api key missing in config file")]
    MissingApiKey,
    #[error("cleanup tag missing in config file")]
    MissingTag,
    #[error("cleanup group missing in config file")]
    MissingGroup,
    #[error("invalid appliance fqdn `{0}`")]
    InvalidFqdn(String),
    #[error("invalid log level `{0}` (expected DEBUG, INFO, WARNING or ERROR)")]
    InvalidLogLevel(String),
}

/// Log verbosity as spelled in the config file and on the command line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARNING" | "WARN" => Ok(LogLevel::Warning),
            "ERROR" => Ok(LogLevel::Error),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// Connection settings shared by the inventory and removal clients
#[derive(Clone)]
pub struct ApplianceConfig {
    pub fqdn: String,
    pub api_key: String,
}

impl fmt::Debug for ApplianceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplianceConfig")
            .field("fqdn", &self.fqdn)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// What counts as a stale instant clone
#[derive(Debug, Clone)]
pub struct CleanupConfig {
    pub tag: String,
    pub group: String,
    pub offline_hours: u32,
    pub include_deactivated: bool,
}

#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub file: Option<PathBuf>,
}

/// Validated configuration for one cleanup run
#[derive(Debug, Clone)]
pub struct Config {
    pub appliance: ApplianceConfig,
    pub cleanup: CleanupConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default, alias = "Appliance")]
    appliance: RawAppliance,
    #[serde(default, alias = "Cleanup_VDI_instant_clones")]
    cleanup: RawCleanup,
    #[serde(default, alias = "Logging")]
    logging: RawLogging,
}

#[derive(Debug, Default, Deserialize)]
struct RawAppliance {
    fqdn: Option<String>,
    api_key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawCleanup {
    tag: Option<String>,
    group: Option<String>,
    offline_hours: Option<u32>,
    include_deactivated: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct RawLogging {
    level: Option<String>,
    file: Option<String>,
}

/// Treat empty and whitespace-only values like absent keys
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    /// Load and validate a config file, `~` in the path is expanded.
    ///
    /// `log_level_override` (from `--log_level`) wins over `logging.level`.
    pub fn from_file(path: &str, log_level_override: Option<LogLevel>) -> Result<Self, ConfigError> {
        let expanded = PathBuf::from(shellexpand::tilde(path).into_owned());
        let content = std::fs::read_to_string(&expanded).map_err(|source| ConfigError::Read {
            path: expanded.clone(),
            source,
        })?;
        Self::from_toml_str(&content, log_level_override)
    }

    pub fn from_toml_str(
        content: &str,
        log_level_override: Option<LogLevel>,
    ) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content)?;
        Self::validate(raw, log_level_override)
    }

    fn validate(raw: RawConfig, log_level_override: Option<LogLevel>) -> Result<Self, ConfigError> {
        let fqdn = non_empty(raw.appliance.fqdn).ok_or(ConfigError::MissingFqdn)?;
        let api_key = non_empty(raw.appliance.api_key).ok_or(ConfigError::MissingApiKey)?;
        check_fqdn(&fqdn)?;

        let tag = non_empty(raw.cleanup.tag).ok_or(ConfigError::MissingTag)?;
        let group = non_empty(raw.cleanup.group).ok_or(ConfigError::MissingGroup)?;

        let level = match (log_level_override, non_empty(raw.logging.level)) {
            (Some(level), _) => level,
            (None, Some(level)) => level.parse()?,
            (None, None) => LogLevel::default(),
        };
        let file = non_empty(raw.logging.file)
            .map(|f| PathBuf::from(shellexpand::tilde(&f).into_owned()));

        Ok(Config {
            appliance: ApplianceConfig { fqdn, api_key },
            cleanup: CleanupConfig {
                tag,
                group,
                offline_hours: raw.cleanup.offline_hours.unwrap_or(DEFAULT_OFFLINE_HOURS),
                include_deactivated: raw.cleanup.include_deactivated.unwrap_or(false),
            },
            logging: LoggingConfig { level, file },
        })
    }

    pub fn log_file(&self) -> Option<&Path> {
        self.logging.file.as_deref()
    }
}

/// The fqdn ends up as the authority of every request URL, so it must parse
/// as one.
fn check_fqdn(fqdn: &str) -> Result<(), ConfigError> {
    let candidate = if fqdn.starts_with("http://") || fqdn.starts_with("https://") {
        fqdn.to_string()
    } else {
        format!("https://{}", fqdn)
    };
    match url::Url::parse(&candidate) {
        Ok(url) if url.host_str().is_some() => Ok(()),
        _ => Err(ConfigError::InvalidFqdn(fqdn.to_string())),
    }
}
