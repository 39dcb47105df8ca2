//! Configuration file handling for ~/.wildlens/config.ini.
//!
//! Loads and saves console configuration with sensible defaults. A missing
//! file yields defaults; an unparsable value falls back to its default with
//! a warning rather than failing the whole load.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use thiserror::Error;
use tracing::warn;

/// Default backend base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default interval between poll ticks in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Default bound on total polling time; 0 means unbounded.
pub const DEFAULT_MAX_WAIT_SECS: u64 = 0;

/// Default log file path.
pub const DEFAULT_LOG_FILE: &str = "logs/wildlens.log";

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    Read(#[from] ini::Error),

    /// Failed to write config file
    #[error("Failed to write config file: {0}")]
    Write(String),

    /// Failed to create config directory
    #[error("Failed to create config directory: {0}")]
    Directory(std::io::Error),
}

/// Backend API settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiSettings {
    /// Base URL of the WildLens backend.
    pub base_url: String,
    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Job polling settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSettings {
    /// Interval between poll ticks in seconds.
    pub interval_secs: u64,
    /// Bound on total polling time in seconds; 0 means unbounded.
    pub max_wait_secs: u64,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            max_wait_secs: DEFAULT_MAX_WAIT_SECS,
        }
    }
}

impl PollSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// The configured polling bound, if any.
    pub fn max_wait(&self) -> Option<Duration> {
        (self.max_wait_secs > 0).then(|| Duration::from_secs(self.max_wait_secs))
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Log file path.
    pub file: PathBuf,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

/// Console configuration, one section per concern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub api: ApiSettings,
    pub poll: PollSettings,
    pub logging: LoggingSettings,
}

impl ConfigFile {
    /// Load configuration from the default path (~/.wildlens/config.ini).
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load() -> Result<Self, ConfigFileError> {
        let path = config_file_path();
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        Ok(Self::from_ini(&ini))
    }

    fn from_ini(ini: &Ini) -> Self {
        let mut config = Self::default();

        if let Some(section) = ini.section(Some("api")) {
            if let Some(url) = section.get("base_url") {
                if url.starts_with("http://") || url.starts_with("https://") {
                    config.api.base_url = url.trim_end_matches('/').to_string();
                } else {
                    warn!(value = url, "api.base_url is not a URL, using default");
                }
            }
            config.api.timeout_secs =
                parse_or_default(section.get("timeout_secs"), "api.timeout_secs", config.api.timeout_secs);
        }

        if let Some(section) = ini.section(Some("poll")) {
            config.poll.interval_secs = parse_or_default(
                section.get("interval_secs"),
                "poll.interval_secs",
                config.poll.interval_secs,
            );
            config.poll.max_wait_secs = parse_or_default(
                section.get("max_wait_secs"),
                "poll.max_wait_secs",
                config.poll.max_wait_secs,
            );
        }

        if let Some(section) = ini.section(Some("logging")) {
            if let Some(file) = section.get("file") {
                if !file.trim().is_empty() {
                    config.logging.file = PathBuf::from(file);
                }
            }
        }

        config
    }

    /// Save configuration to the default path (~/.wildlens/config.ini).
    pub fn save(&self) -> Result<(), ConfigFileError> {
        let path = config_file_path();
        self.save_to(&path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigFileError::Directory)?;
        }

        let mut ini = Ini::new();
        ini.with_section(Some("api"))
            .set("base_url", self.api.base_url.as_str())
            .set("timeout_secs", self.api.timeout_secs.to_string());
        ini.with_section(Some("poll"))
            .set("interval_secs", self.poll.interval_secs.to_string())
            .set("max_wait_secs", self.poll.max_wait_secs.to_string());
        ini.with_section(Some("logging"))
            .set("file", self.logging.file.display().to_string());

        ini.write_to_file(path)
            .map_err(|e| ConfigFileError::Write(e.to_string()))
    }

    /// Create the default config file if it doesn't exist.
    ///
    /// Returns the path to the config file.
    pub fn ensure_exists() -> Result<PathBuf, ConfigFileError> {
        let path = config_file_path();
        if !path.exists() {
            let config = Self::default();
            config.save_to(&path)?;
        }
        Ok(path)
    }
}

fn parse_or_default(value: Option<&str>, key: &str, default: u64) -> u64 {
    match value {
        None => default,
        Some(raw) => match raw.parse() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(key = key, value = raw, "not a valid integer, using default");
                default
            }
        },
    }
}

/// Get the path to the config directory (~/.wildlens).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".wildlens")
}

/// Get the path to the config file (~/.wildlens/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}
