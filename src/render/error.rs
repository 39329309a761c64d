use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to create output directory '{0}'")]
    DirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to encode layer '{0}'")]
    Encode(PathBuf, #[source] serde_json::Error),

    #[error("Failed to write layer '{0}'")]
    Write(PathBuf, #[source] std::io::Error),
}
