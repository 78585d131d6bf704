//! # Configuration Persistence
//!
//! Manages user configuration stored in `~/.config/tabdeck/config.json`.
//!
//! ## Overview
//!
//! The [`Config`] struct is serialized to / deserialized from a JSON file in
//! the user's XDG config directory. Every section and field is optional; a
//! missing file yields [`Config::default()`].
//!
//! ```json
//! {
//!   "translator": { "program": "trans", "default_target": ":bg", "verbose": false },
//!   "picker": { "activation": "auto", "title": "Tabs" },
//!   "overlay": { "max_width": 60, "max_height": 16 }
//! }
//! ```
//!
//! The `directories` crate is used to resolve the platform-appropriate config
//! directory.

use crate::tabs::ActivationMode;
use crate::translate::DEFAULT_PROGRAM;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Persisted user configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub translator: TranslatorConfig,
    #[serde(default)]
    pub picker: PickerConfig,
    #[serde(default)]
    pub overlay: OverlayConfig,
}

/// How the external translator is invoked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TranslatorConfig {
    #[serde(default = "default_program")]
    pub program: String,
    /// Language selector used when `:Translate` gets no argument.
    #[serde(default)]
    pub default_target: Option<String>,
    /// Verbose output for the `T` key binding.
    #[serde(default)]
    pub verbose: bool,
    /// Extra environment, applied on top of the runner defaults.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

fn default_program() -> String {
    DEFAULT_PROGRAM.to_string()
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            default_target: None,
            verbose: false,
            env: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PickerConfig {
    #[serde(default)]
    pub activation: ActivationMode,
    #[serde(default = "default_picker_title")]
    pub title: String,
}

fn default_picker_title() -> String {
    "Tabs".to_string()
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            activation: ActivationMode::default(),
            title: default_picker_title(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OverlayConfig {
    #[serde(default = "default_max_width")]
    pub max_width: u16,
    #[serde(default = "default_max_height")]
    pub max_height: u16,
}

fn default_max_width() -> u16 {
    60
}

fn default_max_height() -> u16 {
    16
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            max_width: default_max_width(),
            max_height: default_max_height(),
        }
    }
}

impl Config {
    /// Load configuration from disk. Returns `Config::default()` if the file
    /// does not exist or cannot be parsed.
    pub fn load() -> Self {
        Self::try_load().unwrap_or_default()
    }

    /// Try to load configuration, returning an error on failure.
    fn try_load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load configuration from a specific path. Returns `Config::default()` if
    /// the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Save the current configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Return the path to the config file.
    pub fn config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "tabdeck")
            .context("Could not determine config directory")?;
        Ok(dirs.config_dir().join("config.json"))
    }
}
