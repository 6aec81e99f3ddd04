//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::PathBuf;

/// boxroom configuration with layered hierarchy
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the inventory database
    pub database: Option<PathBuf>,

    /// Default caller identity for CLI invocations
    pub identity: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/boxroom/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                if let Ok(contents) = std::fs::read_to_string(&global_path) {
                    if let Ok(global) = serde_yml::from_str::<Config>(&contents) {
                        config.merge(global);
                    }
                }
            }
        }

        // 3. Environment variables
        if let Ok(db) = std::env::var("BOXROOM_DB") {
            config.database = Some(PathBuf::from(db));
        }
        if let Ok(identity) = std::env::var("BOXROOM_IDENTITY") {
            config.identity = Some(identity);
        }

        config
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "boxroom")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.database.is_some() {
            self.database = other.database;
        }
        if other.identity.is_some() {
            self.identity = other.identity;
        }
    }

    /// Default database location when neither config nor flags name one
    pub fn default_database_path() -> PathBuf {
        directories::ProjectDirs::from("", "", "boxroom")
            .map(|dirs| dirs.data_dir().join("inventory.db"))
            .unwrap_or_else(|| PathBuf::from("inventory.db"))
    }
}
