//! Configuration management for fieldlog.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::net::SocketAddr;
use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::filter::SortOrder;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "fieldlog";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "fieldlog.db";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `FIELDLOG_`, sections separated
///    by `__`, e.g. `FIELDLOG_INCIDENTS__MAX_PHOTOS=5`)
/// 2. TOML config file at `~/.config/fieldlog/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Draft autosave configuration.
    pub drafts: DraftConfig,
    /// Incident form configuration.
    pub incidents: IncidentConfig,
    /// Health server configuration.
    pub server: ServerConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/fieldlog/fieldlog.db`
    pub database_path: Option<PathBuf>,
}

/// Draft-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftConfig {
    /// Write the in-progress draft on every change.
    pub autosave: bool,
}

/// Incident form and history configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncidentConfig {
    /// Maximum photos attached to a fire incident.
    pub max_photos: usize,
    /// Sort order used by history listings when none is given.
    pub default_sort: SortOrder,
    /// Fire types offered by the fire incident form.
    pub fire_types: Vec<String>,
    /// Responding units offered by the fire incident form.
    pub units: Vec<String>,
    /// Condition chips offered by the EMT incident form and history filter.
    pub conditions: Vec<String>,
    /// Quick-action timeline events offered by the EMT incident form.
    pub emt_events: Vec<String>,
}

/// Health server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for DraftConfig {
    fn default() -> Self {
        Self { autosave: true }
    }
}

impl Default for IncidentConfig {
    fn default() -> Self {
        Self {
            max_photos: 3,
            default_sort: SortOrder::Newest,
            fire_types: to_strings(crate::record::FIRE_TYPES),
            units: to_strings(crate::record::PRESET_UNITS),
            conditions: to_strings(crate::record::CONDITIONS),
            emt_events: to_strings(crate::record::EMT_EVENTS),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
        }
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

impl IncidentConfig {
    /// Resolve a fire type against the configured list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownChoice`] if `value` is not a configured type.
    pub fn fire_type(&self, value: &str) -> Result<String> {
        choose("fire type", &self.fire_types, value)
    }

    /// Resolve a patient condition against the configured chips.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownChoice`] if `value` is not a configured condition.
    pub fn condition(&self, value: &str) -> Result<String> {
        choose("condition", &self.conditions, value)
    }

    /// Resolve an EMT timeline event against the configured quick actions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownChoice`] if `value` is not a configured event.
    pub fn emt_event(&self, value: &str) -> Result<String> {
        choose("EMT event", &self.emt_events, value)
    }

    /// The configured spelling of `value` if it names a preset unit.
    #[must_use]
    pub fn preset_unit(&self, value: &str) -> Option<&str> {
        find_choice(&self.units, value)
    }
}

/// Case-insensitive lookup that returns the configured spelling.
fn find_choice<'a>(choices: &'a [String], value: &str) -> Option<&'a str> {
    let value = value.trim();
    choices
        .iter()
        .find(|c| c.eq_ignore_ascii_case(value))
        .map(String::as_str)
}

fn choose(field: &'static str, choices: &[String], value: &str) -> Result<String> {
    find_choice(choices, value)
        .map(str::to_string)
        .ok_or_else(|| Error::unknown_choice(field, value, choices))
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed("FIELDLOG_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.incidents.max_photos == 0 {
            return Err(Error::ConfigValidation {
                message: "max_photos must be greater than 0".to_string(),
            });
        }

        if self.server.port == 0 {
            return Err(Error::ConfigValidation {
                message: "server port must be greater than 0".to_string(),
            });
        }

        let presets = [
            ("fire_types", &self.incidents.fire_types),
            ("units", &self.incidents.units),
            ("conditions", &self.incidents.conditions),
            ("emt_events", &self.incidents.emt_events),
        ];
        for (name, values) in presets {
            if values.iter().any(|v| v.trim().is_empty()) {
                return Err(Error::ConfigValidation {
                    message: format!("{name} must not contain blank entries"),
                });
            }
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the socket address for the health server.
    ///
    /// # Errors
    ///
    /// Returns an error if the host does not parse as an IP address.
    pub fn server_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|_| Error::ConfigValidation {
                message: format!("invalid server host: {}", self.server.host),
            })
    }
}
