use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::model::Coordinates;

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Where the car is parked when no live position source is available.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationConfig {
    pub latitude: f64,
    pub longitude: f64,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Saved answer to the location permission prompt; `None` asks every time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_location: Option<bool>,

    #[serde(default = "default_true")]
    pub reverse_geocode: bool,

    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Example TOML:
    /// [location]
    /// latitude = 40.0
    /// longitude = -75.0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            share_location: None,
            reverse_geocode: true,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            location: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_http_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

impl Config {
    pub fn coordinates(&self) -> Option<Coordinates> {
        self.location.map(|l| Coordinates::new(l.latitude, l.longitude))
    }

    /// Store the parked location, rejecting values outside valid ranges.
    pub fn set_location(&mut self, latitude: f64, longitude: f64) -> Result<()> {
        validate_coordinates(latitude, longitude)?;
        self.location = Some(LocationConfig { latitude, longitude });
        Ok(())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.max(1))
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(contents)?;
        if let Some(loc) = cfg.location {
            validate_coordinates(loc.latitude, loc.longitude)?;
        }
        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "carcover", "carcover")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<()> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(anyhow!("Latitude {latitude} is out of range (-90..=90)."));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(anyhow!("Longitude {longitude} is out of range (-180..=180)."));
    }
    Ok(())
}
