use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}, time::Duration};

use crate::model::Coordinate;

/// Environment variable consulted first for the OpenWeather key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Key baked in at build time, if `OPENWEATHER_API_KEY` was set when compiling.
const BUILD_API_KEY: Option<&str> = option_env!("OPENWEATHER_API_KEY");

const DEFAULT_LOCATION_TIMEOUT_SECS: u64 = 5;

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// OpenWeather API key.
    pub api_key: Option<String>,

    /// Override for the One Call root, e.g. a proxy.
    pub api_base_url: Option<String>,

    /// Override for the map script fetched on first map activation.
    pub map_script_url: Option<String>,

    /// How long to wait for a location fix before reporting it unavailable.
    pub location_timeout_secs: Option<u64>,

    /// Example TOML:
    /// [location]
    /// latitude = 51.5
    /// longitude = -0.12
    pub location: Option<Coordinate>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
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
        let dirs = ProjectDirs::from("dev", "weatherview", "weatherview")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    /// API key from the environment, then this config, then the build.
    pub fn resolve_api_key(&self) -> Result<String> {
        let from_env = std::env::var(API_KEY_ENV).ok();
        self.pick_api_key(from_env.as_deref(), BUILD_API_KEY)
    }

    fn pick_api_key(&self, from_env: Option<&str>, from_build: Option<&str>) -> Result<String> {
        from_env
            .or(self.api_key.as_deref())
            .or(from_build)
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_owned)
            .ok_or_else(|| {
                anyhow!(
                    "No OpenWeather API key configured.\n\
                     Hint: run `weatherview configure` or set {API_KEY_ENV}."
                )
            })
    }

    pub fn location_timeout(&self) -> Duration {
        Duration::from_secs(self.location_timeout_secs.unwrap_or(DEFAULT_LOCATION_TIMEOUT_SECS))
    }
}
