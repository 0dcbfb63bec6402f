//! Program settings.
//!
//! Optional TOML file at `~/.config/upnext/config.toml`; every field has
//! a default so the file can be absent entirely.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// IANA zone used to render the event time (e.g. "Europe/Madrid").
    /// The system-local zone is used when unset.
    #[serde(default)]
    pub timezone: Option<String>,

    /// Override for the client credentials path.
    #[serde(default)]
    pub credentials_file: Option<PathBuf>,

    /// Override for the cached token path.
    #[serde(default)]
    pub token_file: Option<PathBuf>,

    /// Override for the log path.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

pub fn base_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Could not determine config directory")?
        .join("upnext"))
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = base_dir()?.join("config.toml");

        if !path.exists() {
            return Ok(Config::default());
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        Ok(config)
    }

    pub fn credentials_path(&self) -> Result<PathBuf> {
        match &self.credentials_file {
            Some(path) => Ok(path.clone()),
            None => Ok(base_dir()?.join("credentials.json")),
        }
    }

    pub fn token_path(&self) -> Result<PathBuf> {
        match &self.token_file {
            Some(path) => Ok(path.clone()),
            None => Ok(base_dir()?.join("token.json")),
        }
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        match &self.log_file {
            Some(path) => Ok(path.clone()),
            None => Ok(base_dir()?.join("upnext.log")),
        }
    }

    /// Parse the configured display zone, if any.
    pub fn display_timezone(&self) -> Result<Option<Tz>> {
        match &self.timezone {
            Some(name) => {
                let tz = name
                    .parse::<Tz>()
                    .map_err(|_| anyhow::anyhow!("Unknown timezone '{}' in config", name))?;
                Ok(Some(tz))
            }
            None => Ok(None),
        }
    }
}
