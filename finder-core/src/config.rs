//! Application configuration loaded from a TOML file.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! configuration pointing at the local development services.

use crate::{ConfigError, CoreError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "distributor-finder.toml";

/// How a submitted search reconciles remote results with the cached dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Query both services concurrently and union the results into the cache.
    #[default]
    Parallel,
    /// Query the posts service first, then the search service as a follow-up.
    Sequential,
    /// Query the posts service only and replace the cache with its results.
    Replace,
}

impl std::str::FromStr for SearchMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "parallel" => Ok(SearchMode::Parallel),
            "sequential" => Ok(SearchMode::Sequential),
            "replace" => Ok(SearchMode::Replace),
            other => Err(ConfigError::InvalidValue {
                field: "search_mode".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub jitter_factor: f64,
    pub failure_threshold: u32,
    pub recovery_timeout_s: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
            max_delay_ms: 10_000,
            jitter_factor: 0.1,
            failure_threshold: 5,
            recovery_timeout_s: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the service answering `/posts` and `/:query`.
    pub posts_base_url: String,
    /// Base URL of the service answering `/search?q=`.
    pub search_base_url: String,
    pub request_timeout_secs: u64,
    pub database_url: String,
    pub history_limit: usize,
    pub search_mode: SearchMode,
    pub history_selection_triggers_search: bool,
    pub export_dir: PathBuf,
    pub retry: RetrySettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            posts_base_url: "http://localhost:4000".to_string(),
            search_base_url: "http://localhost:3001".to_string(),
            request_timeout_secs: 30,
            database_url: "sqlite://distributor_finder.db".to_string(),
            history_limit: 10,
            search_mode: SearchMode::Parallel,
            history_selection_triggers_search: true,
            export_dir: PathBuf::from("."),
            retry: RetrySettings::default(),
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, CoreError> {
        let config: AppConfig = toml::from_str(contents).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, CoreError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CoreError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                CoreError::Io(e)
            }
        })?;
        debug!("Read configuration from {}", path.display());
        Self::from_toml_str(&contents)
    }

    /// Loads an explicitly requested file, or the default file when present,
    /// or falls back to built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, CoreError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)
                } else {
                    info!("No configuration file found, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_base_url("posts_base_url", &self.posts_base_url)?;
        validate_base_url("search_base_url", &self.search_base_url)?;

        if self.history_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "history_limit".to_string(),
                value: "0".to_string(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_secs".to_string(),
                value: "0".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.retry.jitter_factor) {
            return Err(ConfigError::InvalidValue {
                field: "retry.jitter_factor".to_string(),
                value: self.retry.jitter_factor.to_string(),
            });
        }
        Ok(())
    }
}

fn validate_base_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let invalid = || ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    };
    let url = Url::parse(value).map_err(|_| invalid())?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        _ => Err(invalid()),
    }
}
