//! Hub configuration
//!
//! Supports `~/.config/omni/ember/config.toml` as a persistent config
//! source. All fields are optional — the file is a partial overlay on
//! top of defaults, and CLI flags override both.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{Error, Result};

/// Default HTTP API port
pub const DEFAULT_PORT: u16 = 18990;

/// Resolved runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Human-readable name of this hub instance
    pub instance_name: String,

    /// HTTP API port
    pub port: u16,

    /// Directory holding the database and other mutable state
    pub data_dir: PathBuf,

    /// Instance cache tuning
    pub cache: CacheConfig,

    /// Whether to advertise the hub via mDNS
    pub advertise: bool,
}

/// Instance cache tuning
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached entries
    pub max_entries: u64,

    /// Per-entry time to live, in seconds
    pub ttl_secs: u64,
}

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    instance_name: Option<String>,

    #[serde(default)]
    port: Option<u16>,

    #[serde(default)]
    data_dir: Option<PathBuf>,

    #[serde(default)]
    advertise: Option<bool>,

    #[serde(default)]
    cache: CacheFileConfig,
}

/// Cache tuning overlay
#[derive(Debug, Default, Deserialize)]
struct CacheFileConfig {
    max_entries: Option<u64>,
    ttl_secs: Option<u64>,
}

impl Config {
    /// Load configuration from the default file location
    ///
    /// # Errors
    ///
    /// Returns error if the config file exists but cannot be parsed,
    /// or if the data directory cannot be created
    pub fn load() -> Result<Self> {
        let file = default_config_path()
            .filter(|p| p.exists())
            .map(|p| load_file(&p))
            .transpose()?
            .unwrap_or_default();
        Self::from_file(file)
    }

    /// Load configuration from an explicit file path
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn load_from(path: &Path) -> Result<Self> {
        Self::from_file(load_file(path)?)
    }

    fn from_file(file: ConfigFile) -> Result<Self> {
        let data_dir = file.data_dir.map_or_else(default_data_dir, Ok)?;
        std::fs::create_dir_all(&data_dir)?;

        Ok(Self {
            instance_name: file
                .instance_name
                .unwrap_or_else(|| "Ember Hub".to_string()),
            port: file.port.unwrap_or(DEFAULT_PORT),
            data_dir,
            cache: CacheConfig {
                max_entries: file
                    .cache
                    .max_entries
                    .unwrap_or(crate::cache::DEFAULT_MAX_ENTRIES),
                ttl_secs: file.cache.ttl_secs.unwrap_or(crate::cache::DEFAULT_TTL_SECS),
            },
            advertise: file.advertise.unwrap_or(true),
        })
    }

    /// Path of the hub database inside the data directory
    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("ember.db")
    }
}

fn load_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

fn default_config_path() -> Option<PathBuf> {
    directories::BaseDirs::new()
        .map(|d| d.config_dir().join("omni").join("ember").join("config.toml"))
}

fn default_data_dir() -> Result<PathBuf> {
    directories::BaseDirs::new()
        .map(|d| d.data_dir().join("omni").join("ember"))
        .ok_or_else(|| Error::Config("could not determine a data directory".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_overlays_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            format!(
                "port = 9000\ndata_dir = \"{}\"\n\n[cache]\nttl_secs = 60\n",
                dir.path().join("data").display()
            ),
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.instance_name, "Ember Hub");
        assert_eq!(config.cache.ttl_secs, 60);
        assert_eq!(config.cache.max_entries, crate::cache::DEFAULT_MAX_ENTRIES);
        assert!(config.advertise);
        assert!(config.data_dir.exists());
    }

    #[test]
    fn invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "port = \"not a number\"").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
