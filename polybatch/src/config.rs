//! Batching configuration (TOML)
//!
//! Settings that drive the batcher: whether batching is on at all, the
//! user's shader setting, and initial arena sizes. All fields have defaults,
//! so a partial or empty file is valid.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::buffer::DEFAULT_CAPACITY;
use crate::error::ConfigError;

/// User shader setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShaderMode {
    /// Fixed-function rendering, no shader binds
    Off,
    /// Shaders on, custom shaders used when allowed
    #[default]
    On,
    /// Shaders on, but only the built-in base shaders
    IgnoreCustom,
}

impl ShaderMode {
    /// Whether shaders are enabled at all
    pub fn is_enabled(self) -> bool {
        self != ShaderMode::Off
    }

    /// Whether custom shaders may replace base shaders
    pub fn uses_custom(self) -> bool {
        self == ShaderMode::On
    }
}

/// Batcher configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Collect and sort polygons per frame instead of drawing immediately (default: true)
    #[serde(default = "default_true")]
    pub batching: bool,
    /// Shader setting (default: on)
    #[serde(default)]
    pub shaders: ShaderMode,
    /// Whether the session allows custom shaders (default: true)
    #[serde(default = "default_true")]
    pub allow_custom_shaders: bool,
    /// Initial polygon ledger capacity (default: 65536)
    #[serde(default = "default_capacity")]
    pub polygon_capacity: usize,
    /// Initial vertex store capacity (default: 65536)
    #[serde(default = "default_capacity")]
    pub vertex_capacity: usize,
    /// Initial output vertex capacity; indices get 3x this (default: 65536)
    #[serde(default = "default_capacity")]
    pub output_capacity: usize,
}

fn default_true() -> bool {
    true
}
fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batching: default_true(),
            shaders: ShaderMode::default(),
            allow_custom_shaders: default_true(),
            polygon_capacity: default_capacity(),
            vertex_capacity: default_capacity(),
            output_capacity: default_capacity(),
        }
    }
}

impl BatchConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load a configuration file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Serialize to pretty TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
