use anyhow::{Context, Result};
use ngm_core::Theme;
use ngm_git::DiscoveryOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// User configuration, read from `<config_dir>/ngm/config.toml`.
///
/// Every section is optional; missing keys take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub discovery: DiscoveryConfig,
    pub runner: RunnerConfig,
    pub ui: UiConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Directory names never searched for repositories
    pub exclude: Vec<String>,
    pub max_depth: Option<usize>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        let options = DiscoveryOptions::default();
        Self {
            exclude: options.exclude,
            max_depth: options.max_depth,
        }
    }
}

impl DiscoveryConfig {
    pub fn options(&self) -> DiscoveryOptions {
        DiscoveryOptions {
            exclude: self.exclude.clone(),
            max_depth: self.max_depth,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Concurrent git processes; one per core when unset
    pub max_parallel: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Built-in theme name or path to a theme `.toml` file
    pub theme: String,
    pub nerd_font: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: "frappe".to_string(),
            nerd_font: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing` filter used when neither `-v` nor `NGM_LOG`/`RUST_LOG` is set
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Load from the default location, falling back to defaults when the
    /// file does not exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        toml::from_str(&contents).with_context(|| format!("Failed to parse config from {:?}", path))
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Failed to find config directory")?;
        Ok(config_dir.join("ngm").join("config.toml"))
    }

    /// Log file used while the terminal UI owns the screen
    pub fn log_path() -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir().context("Failed to find cache directory")?;
        Ok(cache_dir.join("ngm").join("ngm.log"))
    }

    pub fn theme(&self) -> Result<Theme> {
        Theme::resolve(&self.ui.theme)
            .with_context(|| format!("Failed to load theme {:?}", self.ui.theme))
    }
}
