use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::app::storage::DEFAULT_STORAGE_KEY;
use crate::errors::AppResult;

pub const CONFIG_ENV: &str = "DAYLIST_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: PathBuf,
    pub storage_key: String,
    pub log_level: String,
    pub log_dir: PathBuf,
    pub tick_rate_ms: u64,
    pub background: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: Self::data_dir().join("daylist.sqlite"),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            log_level: "info".to_string(),
            log_dir: Self::data_dir().join("logs"),
            tick_rate_ms: 50,
            background: true,
        }
    }
}

impl Config {
    // Platform config directory, falling back to the working directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("daylist")
    }

    // Platform data directory holding the database and logs
    pub fn data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("daylist")
    }

    // The config file in use: `$DAYLIST_CONFIG` if set, else the default location
    pub fn config_file() -> PathBuf {
        match env::var_os(CONFIG_ENV) {
            Some(path) => PathBuf::from(path),
            None => Self::config_dir().join("daylist.toml"),
        }
    }

    pub fn load() -> AppResult<Config> {
        Self::load_from(&Self::config_file())
    }

    // Read `path`; a missing file means defaults, a malformed one is an error
    pub fn load_from(path: &Path) -> AppResult<Config> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms.max(1))
    }
}
