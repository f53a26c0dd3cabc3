use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

pub const API_KEY_ENV: &str = "VISUAL_CROSSING_API_KEY";
pub const BIND_ADDR_ENV: &str = "CITYWEATHER_BIND_ADDR";
pub const ENDPOINT_ENV: &str = "CITYWEATHER_ENDPOINT";
pub const LOG_LEVEL_ENV: &str = "CITYWEATHER_LOG_LEVEL";

/// Settings for the Visual Crossing weather API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    /// Language of the returned condition text.
    pub lang: String,
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://weather.visualcrossing.com".to_string(),
            lang: "ru".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Settings for the HTTP backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub cities_path: PathBuf,
    pub flags_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5000".to_string(),
            cities_path: PathBuf::from("cities.json"),
            flags_dir: PathBuf::from("static/flags"),
        }
    }
}

/// Settings for the polling widget.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    pub endpoint: String,
    pub poll_interval_secs: u64,
    /// Base URL of the image search service used for backgrounds.
    pub photo_base_url: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:5000".to_string(),
            poll_interval_secs: 30,
            photo_base_url: "https://source.unsplash.com/1920x1080/".to_string(),
        }
    }
}

impl WidgetConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// log_level = "info"
///
/// [provider]
/// api_key = "..."
///
/// [widget]
/// poll_interval_secs = 30
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: String,
    pub provider: ProviderConfig,
    pub server: ServerConfig,
    pub widget: WidgetConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            provider: ProviderConfig::default(),
            server: ServerConfig::default(),
            widget: WidgetConfig::default(),
        }
    }
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet,
    /// then apply `.env` and process environment overrides.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let path = Self::config_file_path()?;
        let mut cfg = Self::load_from(&path)?;
        cfg.apply_env(|key| std::env::var(key).ok());
        Ok(cfg)
    }

    /// Load config from an explicit path; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "cityweather", "cityweather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Override file values with whatever `lookup` returns for the known variables.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.provider.api_key = Some(key);
        }
        if let Some(addr) = lookup(BIND_ADDR_ENV) {
            self.server.bind_addr = addr;
        }
        if let Some(endpoint) = lookup(ENDPOINT_ENV) {
            self.widget.endpoint = endpoint;
        }
        if let Some(level) = lookup(LOG_LEVEL_ENV) {
            self.log_level = level;
        }
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.provider.api_key = Some(api_key);
    }

    /// Returns the provider API key, if present.
    pub fn api_key(&self) -> Option<&str> {
        self.provider.api_key.as_deref().filter(|k| !k.is_empty())
    }

    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key().ok_or_else(|| {
            anyhow!(
                "No Visual Crossing API key configured.\n\
                 Hint: run `cityweather configure` or set {API_KEY_ENV}."
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("nope.toml")).unwrap();

        assert_eq!(cfg.widget.poll_interval_secs, 30);
        assert_eq!(cfg.server.bind_addr, "0.0.0.0:5000");
        assert!(cfg.api_key().is_none());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[provider]\napi_key = \"KEY\"\n").unwrap();

        let cfg = Config::load_from(&path).unwrap();

        assert_eq!(cfg.api_key(), Some("KEY"));
        assert_eq!(cfg.provider.lang, "ru");
        assert_eq!(cfg.widget.endpoint, "http://127.0.0.1:5000");
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.set_api_key("SECRET".into());
        cfg.widget.poll_interval_secs = 5;
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.api_key(), Some("SECRET"));
        assert_eq!(loaded.widget.poll_interval(), Duration::from_secs(5));
    }

    #[test]
    fn invalid_toml_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "log_level = [").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn env_overrides_file_values() {
        let vars: HashMap<&str, &str> = [
            (API_KEY_ENV, "ENV_KEY"),
            (BIND_ADDR_ENV, "127.0.0.1:9000"),
            (LOG_LEVEL_ENV, "debug"),
        ]
        .into_iter()
        .collect();

        let mut cfg = Config::default();
        cfg.apply_env(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(cfg.api_key(), Some("ENV_KEY"));
        assert_eq!(cfg.server.bind_addr, "127.0.0.1:9000");
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.widget.endpoint, "http://127.0.0.1:5000");
    }

    #[test]
    fn blank_env_key_does_not_override() {
        let mut cfg = Config::default();
        cfg.set_api_key("FILE_KEY".into());
        cfg.apply_env(|k| (k == API_KEY_ENV).then(|| "  ".to_string()));

        assert_eq!(cfg.api_key(), Some("FILE_KEY"));
    }

    #[test]
    fn require_api_key_errors_with_hint() {
        let cfg = Config::default();
        let err = cfg.require_api_key().unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No Visual Crossing API key configured"));
        assert!(msg.contains("Hint: run `cityweather configure`"));
    }

    #[test]
    fn poll_interval_never_zero() {
        let mut cfg = Config::default();
        cfg.widget.poll_interval_secs = 0;
        assert_eq!(cfg.widget.poll_interval(), Duration::from_secs(1));
    }
}
