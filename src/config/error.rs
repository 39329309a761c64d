use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse config file '{0}'")]
    Parse(PathBuf, #[source] serde_json::Error),

    #[error("Could not determine the system data directory")]
    DataDirResolution,

    #[error("Data path exists but is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Failed to create data directory '{0}'")]
    DirCreation(PathBuf, #[source] std::io::Error),

    #[error("Unknown time zone '{0}'")]
    InvalidTimezone(String),

    #[error("Invalid brightness bounds: min {min} must be finite and below max {max}")]
    InvalidBounds { min: f64, max: f64 },

    #[error("Fetch interval must be at least one hour")]
    InvalidInterval,
}
