//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! the credential store names, and which authentication backend to use.
//!
//! Configuration is stored at `~/.config/keygate/config.json`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::auth::SecretKey;

/// Application name used for config/cache directory paths
pub const APP_NAME: &str = "keygate";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Default HTTP request timeout in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default artificial delay of the simulated backend.
const DEFAULT_SIMULATED_LATENCY_MS: u64 = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service name under which both secrets are stored
    pub service_name: String,
    /// Account holding the session token
    pub token_account: String,
    /// Account holding the remembered username
    pub username_account: String,
    /// Authentication endpoint; the simulated backend is used when unset
    pub auth_url: Option<String>,
    pub request_timeout_secs: u64,
    pub simulated_latency_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: APP_NAME.to_string(),
            token_account: "auth-token".to_string(),
            username_account: "remembered-username".to_string(),
            auth_url: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            simulated_latency_ms: DEFAULT_SIMULATED_LATENCY_MS,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    pub fn token_key(&self) -> SecretKey {
        SecretKey::new(&self.service_name, &self.token_account)
    }

    pub fn username_key(&self) -> SecretKey {
        SecretKey::new(&self.service_name, &self.username_account)
    }
}
