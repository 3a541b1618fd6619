use serde::Deserialize;
use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::api::ApiVersion;
use crate::api::http::DEFAULT_HOST;
use crate::error::{ReclaimError, Result};

const USER_CONFIG_PATH: &str = ".config/reclaim.toml";

/// Environment variable overriding the daemon host.
pub const HOST_ENV: &str = "DOCKER_HOST";

/// Environment variable pinning the API version.
pub const API_VERSION_ENV: &str = "DOCKER_API_VERSION";

/// Known top-level config keys
const KNOWN_KEYS: &[&str] = &["host", "api_version", "timeout_secs", "prune_filters"];

#[derive(Debug, Default, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Daemon address, e.g. `unix:///var/run/docker.sock` or `tcp://127.0.0.1:2375`
    pub host: Option<String>,
    /// Pin the API version instead of negotiating it
    pub api_version: Option<String>,
    /// Per-request timeout; requests wait indefinitely when unset
    pub timeout_secs: Option<u64>,
    /// Default `name=value` filters merged into every prune request.
    #[serde(default)]
    pub prune_filters: Vec<String>,
}

impl Config {
    /// Load the user config (~/.config/reclaim.toml) with environment
    /// overrides applied. A missing file yields defaults.
    pub fn load() -> Result<Self> {
        let config = Self::load_user()?;
        Ok(config.with_env(
            std::env::var(HOST_ENV).ok(),
            std::env::var(API_VERSION_ENV).ok(),
        ))
    }

    /// Load config exclusively from a specific file (ignores default locations).
    /// Unlike load_from_path, this returns an error if the file doesn't exist.
    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ReclaimError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let config = Self::load_from_path(path)?;
        Ok(config.with_env(
            std::env::var(HOST_ENV).ok(),
            std::env::var(API_VERSION_ENV).ok(),
        ))
    }

    fn load_user() -> Result<Self> {
        Self::load_user_from(std::env::var_os("HOME"))
    }

    /// Without a home directory there is no user config to read.
    fn load_user_from(home: Option<OsString>) -> Result<Self> {
        let Some(home) = home.filter(|h| !h.is_empty()) else {
            debug!("HOME not set, using default config");
            return Ok(Config::default());
        };
        let config_path = PathBuf::from(home).join(USER_CONFIG_PATH);
        Self::load_from_path(&config_path)
    }

    /// Load config from a specific path (returns default if not exists)
    fn load_from_path(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let contents = std::fs::read_to_string(config_path).map_err(|e| {
            ReclaimError::Config(format!("Failed to read {}: {}", config_path.display(), e))
        })?;

        Self::parse(&contents, &config_path.display().to_string())
    }

    fn parse(contents: &str, origin: &str) -> Result<Self> {
        // First parse as generic TOML to check for unknown keys
        if let Ok(value) = contents.parse::<toml::Table>() {
            let known: HashSet<&str> = KNOWN_KEYS.iter().copied().collect();
            for key in value.keys() {
                if !known.contains(key.as_str()) {
                    warn!(file = %origin, key = %key, "Unknown config key (ignored)");
                }
            }
        }

        toml::from_str(contents)
            .map_err(|e| ReclaimError::Config(format!("Failed to parse {}: {}", origin, e)))
    }

    /// Apply environment overrides; set, non-empty values win over the file.
    fn with_env(self, host: Option<String>, api_version: Option<String>) -> Self {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Config {
            host: non_empty(host).or(self.host),
            api_version: non_empty(api_version).or(self.api_version),
            ..self
        }
    }

    /// Daemon host, falling back to the local daemon socket.
    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    /// Pinned API version, if any.
    pub fn api_version(&self) -> Result<Option<ApiVersion>> {
        self.api_version.as_deref().map(str::parse).transpose()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
