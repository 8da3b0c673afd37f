use crate::retry::{
    ErrorKind, DEFAULT_INITIAL_DELAY_SECS, DEFAULT_MAX_DELAY_SECS, DEFAULT_TIMEOUT_SECS,
};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Retry policy parameters (optional `[retry]` section in config.toml).
///
/// These are raw values; `RetryPolicyBuilder::from_config` feeds them through
/// the same validation as programmatic configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Seconds after the first attempt during which retries are allowed.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,
    /// Delay before the first retry, in seconds.
    #[serde(default = "default_initial_delay_secs")]
    pub initial_delay_secs: f64,
    /// Upper bound on the backoff delay, in seconds.
    #[serde(default = "default_max_delay_secs")]
    pub max_delay_secs: f64,
    /// Kinds retried by type alone. When absent, any driver error wrapping a
    /// socket failure is retried.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retryable_kinds: Option<Vec<ErrorKind>>,
}

fn default_timeout_secs() -> f64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_initial_delay_secs() -> f64 {
    DEFAULT_INITIAL_DELAY_SECS
}

fn default_max_delay_secs() -> f64 {
    DEFAULT_MAX_DELAY_SECS
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            initial_delay_secs: DEFAULT_INITIAL_DELAY_SECS,
            max_delay_secs: DEFAULT_MAX_DELAY_SECS,
            retryable_kinds: None,
        }
    }
}

/// Global configuration loaded from `~/.config/sqlretry/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SqlRetryConfig {
    /// Database URL used by `sqlretry probe` when none is given on the command line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl SqlRetryConfig {
    /// Retry section, falling back to defaults.
    pub fn retry_or_default(&self) -> RetryConfig {
        self.retry.clone().unwrap_or_default()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("sqlretry")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<SqlRetryConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = SqlRetryConfig {
            database_url: None,
            retry: Some(RetryConfig::default()),
        };
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from(&path)
}

/// Load configuration from an explicit path.
pub fn load_from(path: &Path) -> Result<SqlRetryConfig> {
    let data = fs::read_to_string(path)?;
    let cfg: SqlRetryConfig = toml::from_str(&data)?;
    Ok(cfg)
}
