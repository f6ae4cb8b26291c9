use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::ProtocolVersion;

/// Name of the config file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "cloudcompile.toml";

/// Configuration loaded from cloudcompile.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub behavior: BehaviorConfig,
}

/// Remote backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base endpoint; `split/`, `compile/` and `upload/` are appended to it
    #[serde(default)]
    pub url: Option<String>,
    /// Wire protocol generation the backend speaks
    #[serde(default)]
    pub protocol: ProtocolVersion,
    /// Timeout in seconds for a single HTTP exchange
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: None,
            protocol: ProtocolVersion::default(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    300
}

/// Retry policy for transient network faults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts including the first one (1 = never retry)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay before the first retry, doubled on every further attempt
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    /// Upper bound for a single backoff delay
    #[serde(default = "default_backoff_cap_ms")]
    pub backoff_cap_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_cap_ms: default_backoff_cap_ms(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    200
}

fn default_backoff_cap_ms() -> u64 {
    2000
}

/// Behavior configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BehaviorConfig {
    /// Use the status reported by the remote compiler/splitter as the process exit code
    #[serde(default)]
    pub forward_remote_status: bool,
}

/// Command line values that take precedence over the config file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub url: Option<String>,
    pub protocol: Option<ProtocolVersion>,
    pub timeout: Option<u64>,
    pub retries: Option<u32>,
    pub forward_status: bool,
}

impl Config {
    /// Load config from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_path_buf(), e))?;
        toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e))
    }

    /// Try to load config from cloudcompile.toml in the given directory
    pub fn load_from_dir(dir: &Path) -> Result<Self, ConfigError> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            Self::load_from_file(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Merge CLI overrides into the config
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(u) = overrides.url {
            self.remote.url = Some(u);
        }
        if let Some(p) = overrides.protocol {
            self.remote.protocol = p;
        }
        if let Some(t) = overrides.timeout {
            self.remote.timeout_seconds = t;
        }
        if let Some(r) = overrides.retries {
            // --retries counts retries, max_attempts counts the first try too
            self.retry.max_attempts = r.saturating_add(1);
        }
        if overrides.forward_status {
            self.behavior.forward_remote_status = true;
        }
        self
    }

    /// Base endpoint of the remote backend, without a trailing slash
    pub fn endpoint(&self) -> Result<String, ConfigError> {
        let url = self
            .remote
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or(ConfigError::MissingEndpoint)?;

        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidEndpoint(url.to_string()));
        }

        Ok(url.trim_end_matches('/').to_string())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    ReadError(PathBuf, std::io::Error),
    #[error("Failed to parse config file {0}: {1}")]
    ParseError(PathBuf, toml::de::Error),
    #[error("No remote endpoint configured. Set [remote] url in cloudcompile.toml or pass --url")]
    MissingEndpoint,
    #[error("Remote endpoint must be an http(s) URL: {0}")]
    InvalidEndpoint(String),
}
