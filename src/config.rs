//! Dashboard configuration.
//!
//! Resolution order:
//! 1. JSON file named by `DASHBOARD_CONFIG`, else `dashboard.json` if present
//! 2. `DASHBOARD_RATE_SOURCE` / `DASHBOARD_AMOUNT_SOURCE` /
//!    `DASHBOARD_OPERATIONS_SOURCE` overrides
//! 3. Built-in defaults

use crate::data::SourceSet;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_ENV: &str = "DASHBOARD_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "dashboard.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {error}")]
    Io {
        path: PathBuf,
        error: std::io::Error,
    },
    #[error("Invalid config '{path}': {error}")]
    Parse {
        path: PathBuf,
        error: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub sources: SourceSet,
    pub window_size: [f32; 2],
    /// PNG export size in pixels.
    pub export_size: [u32; 2],
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            sources: SourceSet::new("data/mestasa.csv", "data/mesmonto.csv", "data/mesop.csv"),
            window_size: [1400.0, 800.0],
            export_size: [1600, 900],
        }
    }
}

impl DashboardConfig {
    /// Resolve the configuration from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::resolve(|key| std::env::var(key).ok())
    }

    /// Resolve with an injectable environment lookup.
    pub fn resolve(env: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let explicit = env(CONFIG_ENV).map(PathBuf::from);
        let mut config = match explicit {
            Some(path) => Self::from_file(&path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_overrides(env);
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|error| ConfigError::Io {
            path: path.to_path_buf(),
            error,
        })?;
        let config = serde_json::from_str(&text).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })?;
        tracing::info!(path = %path.display(), "configuration file loaded");
        Ok(config)
    }

    fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(path) = env("DASHBOARD_RATE_SOURCE") {
            self.sources.rate = path.into();
        }
        if let Some(path) = env("DASHBOARD_AMOUNT_SOURCE") {
            self.sources.amount = path.into();
        }
        if let Some(path) = env("DASHBOARD_OPERATIONS_SOURCE") {
            self.sources.operations = path.into();
        }
    }
}
