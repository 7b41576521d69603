//! Application configuration management.
//!
//! Configuration is stored at `~/.config/eventdeck/config.json`. Every field
//! has a default, so a missing file is the same as an empty one. A few
//! settings can be overridden through the environment (or a `.env` file
//! loaded by the front end):
//!
//! - `EVENTDECK_STATIC_URL`: bundled dataset location
//! - `EVENTDECK_REMOTE_URL`: listing page to scrape
//! - `EVENTDECK_CACHE_DIR`: directory for cached events and favorites

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::sources::remote::{DEFAULT_PROXY_TEMPLATES, DEFAULT_REMOTE_URL};
use crate::sources::ProxyTemplate;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "eventdeck";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Bundled dataset file name, looked up in the data directory by default
const DATASET_FILE: &str = "events.json";

const ENV_STATIC_URL: &str = "EVENTDECK_STATIC_URL";
const ENV_REMOTE_URL: &str = "EVENTDECK_REMOTE_URL";
const ENV_CACHE_DIR: &str = "EVENTDECK_CACHE_DIR";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Bundled dataset URL (`file://` or http). `None` means `events.json`
    /// in the data directory.
    pub static_url: Option<String>,
    pub remote_url: String,
    /// Proxy templates tried in order; `{url}` is replaced by the encoded
    /// target.
    pub proxies: Vec<String>,
    pub cache_dir: Option<PathBuf>,
    pub user_agent: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            static_url: None,
            remote_url: DEFAULT_REMOTE_URL.to_string(),
            proxies: DEFAULT_PROXY_TEMPLATES.iter().map(|t| t.to_string()).collect(),
            cache_dir: None,
            user_agent: None,
        }
    }
}

impl Config {
    /// Load from the config file, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(url) = non_empty(ENV_STATIC_URL) {
            self.static_url = Some(url);
        }
        if let Some(url) = non_empty(ENV_REMOTE_URL) {
            self.remote_url = url;
        }
        if let Some(dir) = non_empty(ENV_CACHE_DIR) {
            self.cache_dir = Some(PathBuf::from(dir));
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding the event cache, favorites and default dataset.
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.cache_dir {
            return Ok(dir.clone());
        }
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Resolved dataset URL.
    pub fn static_url(&self) -> Result<String> {
        if let Some(ref url) = self.static_url {
            return Ok(url.clone());
        }
        let path = self.data_dir()?.join(DATASET_FILE);
        let url = url::Url::from_file_path(&path)
            .map_err(|_| anyhow::anyhow!("Dataset path is not absolute: {}", path.display()))?;
        Ok(url.to_string())
    }

    pub fn proxy_templates(&self) -> Vec<ProxyTemplate> {
        self.proxies.iter().map(ProxyTemplate::new).collect()
    }
}
