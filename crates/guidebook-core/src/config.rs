//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the guide server origin, the last opened guide and the
//! offline simulation switch.
//!
//! Configuration is stored at `~/.config/guidebook/config.json`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
pub const APP_NAME: &str = "guidebook";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Known third-party image hosts (demo imagery)
const DEFAULT_EXTERNAL_IMAGE_HOSTS: [&str; 2] = ["pexels.com", "images.pexels.com"];

pub const ENV_BASE_URL: &str = "GUIDEBOOK_BASE_URL";
pub const ENV_OFFLINE: &str = "GUIDEBOOK_OFFLINE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub last_slug: Option<String>,
    pub offline_mode: bool,
    pub external_image_hosts: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            last_slug: None,
            offline_mode: false,
            external_image_hosts: DEFAULT_EXTERNAL_IMAGE_HOSTS.iter().map(|h| h.to_string()).collect(),
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
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            Ok(serde_json::from_str(&contents)?)
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

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Apply environment overrides on top of the stored values.
    pub fn with_env(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL).filter(|u| !u.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }
        if let Some(flag) = lookup(ENV_OFFLINE) {
            self.offline_mode = matches!(flag.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
        self
    }

    /// Origin the guides are served from.
    pub fn origin(&self) -> Result<Url> {
        let url = Url::parse(&self.base_url).with_context(|| format!("Invalid base URL: {}", self.base_url))?;
        if url.cannot_be_a_base() || url.host_str().is_none() {
            anyhow::bail!("Base URL has no host: {}", self.base_url);
        }
        Ok(url)
    }

    /// Root for everything guidebook keeps on disk (logs, per-origin caches).
    pub fn data_dir() -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Response cache for the configured origin.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        let origin = self.origin()?;
        let mut path = Self::data_dir()?;
        if let Some(host) = origin.host_str() {
            path = path.join(host);
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.base_url, "http://localhost:3000");
        assert!(!config.offline_mode);
        assert_eq!(config.external_image_hosts, vec!["pexels.com", "images.pexels.com"]);
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let config: Config = serde_json::from_str(r#"{"last_slug": "harbor"}"#).unwrap();
        assert_eq!(config.last_slug.as_deref(), Some("harbor"));
        assert_eq!(config.base_url, "http://localhost:3000");
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());

        let config = Config {
            last_slug: Some("loft".to_string()),
            offline_mode: true,
            ..Config::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_BASE_URL, " https://guide.example "),
            (ENV_OFFLINE, "TRUE"),
        ]
        .into_iter()
        .collect();
        let config = Config::default().with_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.base_url, "https://guide.example");
        assert!(config.offline_mode);

        let config = config.with_overrides(|k| (k == ENV_OFFLINE).then(|| "0".to_string()));
        assert!(!config.offline_mode);
    }

    #[test]
    fn test_origin_validation() {
        let mut config = Config::default();
        assert_eq!(config.origin().unwrap().host_str(), Some("localhost"));

        config.base_url = "not a url".to_string();
        assert!(config.origin().is_err());

        config.base_url = "mailto:someone@example.com".to_string();
        assert!(config.origin().is_err());
    }
}
