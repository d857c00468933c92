//! Configuration Management
//!
//! Handles persistent configuration storage for dexcache.

use crate::api::{TransportOptions, DEFAULT_BASE_URL};
use crate::resource::DEFAULT_PAGE_LIMIT;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// API base URL
    #[serde(default)]
    pub base_url: Option<String>,
    /// Default page size for listings
    #[serde(default)]
    pub page_limit: Option<usize>,
    /// User agent sent with requests
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Request timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("dexcache").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load configuration from a specific file, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring invalid config {:?}: {}", path, e);
                Self::default()
            }),
            Err(e) => {
                tracing::warn!("Could not read config {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };
        self.save_to(&path)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Overwrite every field that is set in `changes`; returns whether
    /// anything was set
    pub fn merge(&mut self, changes: Config) -> bool {
        let mut changed = false;
        if let Some(base_url) = changes.base_url {
            self.base_url = Some(base_url);
            changed = true;
        }
        if let Some(page_limit) = changes.page_limit {
            self.page_limit = Some(page_limit);
            changed = true;
        }
        if let Some(user_agent) = changes.user_agent {
            self.user_agent = Some(user_agent);
            changed = true;
        }
        if let Some(timeout_secs) = changes.timeout_secs {
            self.timeout_secs = Some(timeout_secs);
            changed = true;
        }
        changed
    }

    /// Get effective base URL (CLI > config > default)
    pub fn effective_base_url(&self, cli: Option<&str>) -> String {
        cli.map(str::to_string)
            .or_else(|| self.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    /// Get effective page limit (config > default)
    pub fn effective_page_limit(&self) -> usize {
        self.page_limit
            .filter(|limit| *limit > 0)
            .unwrap_or(DEFAULT_PAGE_LIMIT)
    }

    /// Transport options with configured overrides applied
    pub fn transport_options(&self) -> TransportOptions {
        let mut options = TransportOptions::default();
        if let Some(user_agent) = &self.user_agent {
            options.user_agent = user_agent.clone();
        }
        if let Some(secs) = self.timeout_secs {
            options.timeout = Duration::from_secs(secs);
        }
        options
    }
}
