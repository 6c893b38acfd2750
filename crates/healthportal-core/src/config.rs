//! Application configuration management.
//!
//! Configuration is stored at `~/.config/healthportal/config.json` and
//! can be overridden per run with `HP_API_URL` and `HP_STORAGE_DIR`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::GOOGLE_USERINFO_URL;
use crate::auth::FileStorage;

/// Application name used for config directory paths
const APP_NAME: &str = "healthportal";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Backend used when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

pub const API_URL_ENV: &str = "HP_API_URL";
pub const STORAGE_DIR_ENV: &str = "HP_STORAGE_DIR";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub api_url: Option<String>,
    pub userinfo_url: Option<String>,
    pub storage_dir: Option<PathBuf>,
    pub last_email: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path).context("Failed to read config file")?;
            serde_json::from_str(&contents).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
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

    /// Environment, then config file, then the default
    pub fn api_url(&self) -> String {
        std::env::var(API_URL_ENV)
            .ok()
            .filter(|s| !s.is_empty())
            .or_else(|| self.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    pub fn userinfo_url(&self) -> String {
        self.userinfo_url
            .clone()
            .unwrap_or_else(|| GOOGLE_USERINFO_URL.to_string())
    }

    /// Where the session slots live. Every process pointed at the same
    /// directory shares one session.
    pub fn storage_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(STORAGE_DIR_ENV).filter(|s| !s.is_empty()) {
            return Ok(PathBuf::from(dir));
        }
        match self.storage_dir {
            Some(ref dir) => Ok(dir.clone()),
            None => FileStorage::default_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            api_url: Some("https://portal.example".to_string()),
            storage_dir: Some(dir.path().join("session")),
            last_email: Some("ada@example.com".to_string()),
            ..Default::default()
        };

        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_corrupt_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{oops").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_userinfo_url_default() {
        assert_eq!(Config::default().userinfo_url(), GOOGLE_USERINFO_URL);
    }
}
