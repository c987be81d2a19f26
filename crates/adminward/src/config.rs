//! Console configuration.
//!
//! # Load order
//!
//! 1. Default values (compile-time)
//! 2. A JSON document, if the host has one ([`ConsoleConfig::from_json`])
//! 3. Environment variables (`ADMINWARD_*`)
//!
//! Each layer overrides the previous.

use std::path::PathBuf;
use std::time::Duration;

use adminward_router::GuardConfig;
use serde::Deserialize;

use crate::{ConfigError, PipelineConfig};

/// Base URL of the console API, e.g. `http://127.0.0.1:5000`.
pub const ENV_BASE_API: &str = "ADMINWARD_BASE_API";

/// Where the console backend listens in a development setup.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
/// Request timeout in milliseconds.
pub const ENV_TIMEOUT_MS: &str = "ADMINWARD_TIMEOUT_MS";
/// Directory for the durable credential store.
pub const ENV_STORAGE_DIR: &str = "ADMINWARD_STORAGE_DIR";

/// Everything the console core needs to know about its environment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Absolute `http(s)://` URL every API path is joined onto.
    pub base_url: String,
    pub timeout_ms: u64,
    /// Where the token and cached identity are kept. `None` keeps them in
    /// memory only.
    pub storage_dir: Option<PathBuf>,
    pub notice_duration_ms: u64,
    pub login_path: String,
    pub home_path: String,
    pub not_found_path: String,
    pub redirect_param: String,
    pub default_title: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        let guard = GuardConfig::default();
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            timeout_ms: 5000,
            storage_dir: None,
            notice_duration_ms: 5000,
            login_path: guard.login_path,
            home_path: guard.home_path,
            not_found_path: guard.not_found_path,
            redirect_param: guard.redirect_param,
            default_title: guard.default_title,
        }
    }
}

impl ConsoleConfig {
    /// Defaults overlaid with the process environment.
    ///
    /// # Errors
    /// [`ConfigError::InvalidValue`] if a variable is set but unusable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Parses a JSON document. Missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::InvalidValue {
            key: "<document>".into(),
            value: json.chars().take(64).collect(),
            reason: e.to_string(),
        })
    }

    /// Applies `ADMINWARD_*` overrides read through `lookup`.
    ///
    /// `lookup` stands in for the environment, so tests never have to
    /// touch real process state.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(val) = lookup(ENV_BASE_API) {
            self.base_url = val.trim().to_string();
        }

        if let Some(val) = lookup(ENV_TIMEOUT_MS) {
            self.timeout_ms = match val.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => ms,
                Ok(_) => return Err(invalid(ENV_TIMEOUT_MS, &val, "must be positive")),
                Err(e) => return Err(invalid(ENV_TIMEOUT_MS, &val, &e.to_string())),
            };
        }

        if let Some(val) = lookup(ENV_STORAGE_DIR) {
            let val = val.trim();
            self.storage_dir = (!val.is_empty()).then(|| PathBuf::from(val));
        }

        tracing::debug!(base_url = %self.base_url, timeout_ms = self.timeout_ms, "console config loaded");
        Ok(self)
    }

    /// Checks the values the HTTP stack depends on.
    ///
    /// # Errors
    /// [`ConfigError::InvalidValue`] if `base_url` is not an absolute
    /// `http://` or `https://` URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.base_url.trim();
        if base.starts_with("http://") || base.starts_with("https://") {
            Ok(())
        } else {
            Err(invalid(
                ENV_BASE_API,
                &self.base_url,
                "must be an absolute http:// or https:// URL",
            ))
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn notice_duration(&self) -> Duration {
        Duration::from_millis(self.notice_duration_ms)
    }

    /// The navigation guard's slice of this config.
    pub fn guard_config(&self) -> GuardConfig {
        GuardConfig {
            login_path: self.login_path.clone(),
            home_path: self.home_path.clone(),
            not_found_path: self.not_found_path.clone(),
            redirect_param: self.redirect_param.clone(),
            default_title: self.default_title.clone(),
            notice_duration: self.notice_duration(),
            ..GuardConfig::default()
        }
    }

    /// The client pipeline's slice of this config.
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            notice_duration: self.notice_duration(),
            ..PipelineConfig::default()
        }
    }
}

fn invalid(key: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
