//! Configuration management for siaprime.
//!
//! Configuration is loaded from `~/.config/siaprime/config.toml`.

use crate::client::{self, Connection};
use crate::daemon::{self, DaemonProcess, ProcessSettings};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Address of the daemon API (default: localhost:4280).
    #[serde(default = "default_address")]
    pub address: String,
    /// Path to the daemon executable (default: spd on $PATH).
    #[serde(default = "default_executable")]
    pub executable: PathBuf,
    /// Daemon launch settings, applied over the daemon defaults.
    #[serde(default)]
    pub settings: ProcessSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: default_address(),
            executable: default_executable(),
            settings: ProcessSettings::default(),
        }
    }
}

fn default_address() -> String {
    "localhost:4280".to_string()
}

fn default_executable() -> PathBuf {
    PathBuf::from("spd")
}

impl Config {
    /// Get the config directory path.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join("siaprime"))
            .context("Could not determine config directory")
    }

    /// Get the config file path.
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from the default path, using defaults if not found.
    pub fn load() -> Result<Self> {
        Self::load_from(Self::config_path()?)
    }

    /// Load configuration from `path`, using defaults if not found.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default path.
    pub fn save(&self) -> Result<()> {
        self.save_to(Self::config_path()?)
    }

    /// Save configuration to `path`.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Launch the configured daemon.
    pub fn launch(&self) -> crate::Result<DaemonProcess> {
        daemon::launch(&self.executable, &self.settings)
    }

    /// Connect to the configured address.
    pub async fn connect(&self) -> crate::Result<Connection> {
        client::connect(self.address.as_str()).await
    }
}
