//! Configuration management for aniresolve
//!
//! Handles config file loading/saving and environment overrides.
//! Config is stored at ~/.config/aniresolve/config.toml

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default provider origin
pub const DEFAULT_BASE_URL: &str = "https://hianime.to";

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Provider origin, without trailing slash
    pub base_url: String,
    /// Also resolve DUB servers (after SUB)
    pub include_dub: bool,
    /// Per-request timeout
    pub request_timeout_secs: u64,
    /// Deadline for a whole episode resolution
    pub deadline_secs: u64,
    /// Servers processed in parallel
    pub concurrency: usize,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            include_dub: false,
            request_timeout_secs: 30,
            deadline_secs: 90,
            concurrency: 4,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Config {
    /// Get config file path (~/.config/aniresolve/config.toml)
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("aniresolve").join("config.toml"))
    }

    /// Load config from the default path, or return default if not found
    pub fn load() -> Self {
        Self::path()
            .map(|p| Self::load_from(&p))
            .unwrap_or_default()
            .with_env_overrides()
    }

    /// Load config from a specific file; missing or invalid files yield defaults
    pub fn load_from(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|s| toml::from_str(&s).ok())
            .unwrap_or_default()
    }

    /// Save config to file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml = toml::to_string_pretty(self)?;
        std::fs::write(path, toml)?;
        Ok(())
    }

    /// Apply environment overrides (ANIRESOLVE_BASE_URL)
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("ANIRESOLVE_BASE_URL") {
            if !url.trim().is_empty() {
                self.base_url = url;
            }
        }
        self
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs.max(1))
    }

    /// Parallelism, never below one
    pub fn concurrency(&self) -> usize {
        self.concurrency.max(1)
    }
}
