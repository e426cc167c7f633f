//! Configuration management for tribuna.
//!
//! Loads configuration from ${TRIBUNA_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::conversation::Mode;

/// How responses are requested from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Delivery {
    /// Incremental token stream over `POST /search/stream` (default).
    #[default]
    Stream,
    /// Single request/response over `POST /search`.
    Batch,
}

impl Delivery {
    /// Returns the short display name for this delivery shape.
    pub fn display_name(self) -> &'static str {
        match self {
            Delivery::Stream => "stream",
            Delivery::Batch => "batch",
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend base URL.
    pub base_url: String,

    /// Default query mode.
    pub mode: Mode,

    /// Response delivery shape.
    pub delivery: Delivery,

    /// Request timeout in seconds (0 disables).
    pub request_timeout_secs: u64,
}

impl Config {
    /// Default backend deployment.
    pub const DEFAULT_BASE_URL: &str =
        "https://political-discourse-analyzer-production.up.railway.app";
    const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Resolves the effective base URL with precedence: env > config > default.
    ///
    /// # Errors
    /// Returns an error if the chosen URL is not well-formed.
    pub fn resolve_base_url(&self) -> Result<String> {
        let env_url = std::env::var("TRIBUNA_BASE_URL").ok();
        pick_base_url(env_url.as_deref(), &self.base_url)
    }

    /// Returns the request timeout, or None when disabled.
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            mode: Mode::default(),
            delivery: Delivery::default(),
            request_timeout_secs: Self::DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Picks a base URL from env override and config value.
///
/// Trailing slashes are stripped so endpoint paths can be appended directly.
fn pick_base_url(env_url: Option<&str>, config_url: &str) -> Result<String> {
    let candidate = match env_url.map(str::trim) {
        Some(url) if !url.is_empty() => url,
        _ => {
            let trimmed = config_url.trim();
            if trimmed.is_empty() {
                Config::DEFAULT_BASE_URL
            } else {
                trimmed
            }
        }
    };

    url::Url::parse(candidate)
        .with_context(|| format!("Invalid backend base URL: {candidate}"))?;
    Ok(candidate.trim_end_matches('/').to_string())
}

pub mod paths {
    //! Path resolution for tribuna configuration and data directories.
    //!
    //! TRIBUNA_HOME resolution order:
    //! 1. TRIBUNA_HOME environment variable (if set)
    //! 2. ~/.config/tribuna (default)

    use std::path::PathBuf;

    /// Returns the tribuna home directory.
    ///
    /// Checks TRIBUNA_HOME env var first, falls back to ~/.config/tribuna
    pub fn tribuna_home() -> PathBuf {
        if let Ok(home) = std::env::var("TRIBUNA_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("tribuna"))
            .expect("Could not determine home directory")
    }

    /// Returns the path to the config file.
    pub fn config_path() -> PathBuf {
        tribuna_home().join("config.toml")
    }

    /// Returns the directory for log files.
    pub fn log_dir() -> PathBuf {
        tribuna_home().join("logs")
    }

    /// Returns the path of the legal-notice acknowledgement flag.
    pub fn notice_ack_path() -> PathBuf {
        tribuna_home().join("legal_notice_ack")
    }
}
