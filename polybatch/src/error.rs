//! Error types

use std::path::PathBuf;

/// Batching contract violation
///
/// These signal a caller bug. They are reported before any buffer or
/// backend state is touched and are never recovered from: propagate them
/// to the top of the render operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BatchError {
    /// `begin_collecting` called while a cycle is already in flight
    #[error("repeat call to begin_collecting without a flush")]
    AlreadyCollecting,

    /// `flush` called without a preceding `begin_collecting`
    #[error("flush called without starting batching")]
    NotCollecting,

    /// Polygon submitted for batching without a surface descriptor
    #[error("got a polygon without surface info while batching")]
    MissingSurface,
}

/// Configuration loading error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}
