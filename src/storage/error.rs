use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Snapshot path '{0}' is not valid UTF-8")]
    NonUtf8Path(PathBuf),

    #[error("Invalid partition search pattern")]
    Pattern(#[from] glob::PatternError),

    #[error("Failed to read directory entry '{0}'")]
    Walk(PathBuf, #[source] std::io::Error),

    #[error("Failed to open partition file '{0}'")]
    FileOpen(PathBuf, #[source] std::io::Error),

    #[error("Failed to read parquet partition '{0}'")]
    ParquetRead(PathBuf, #[source] PolarsError),

    #[error("Failed to normalize columns of partition '{0}'")]
    Canonicalize(PathBuf, #[source] PolarsError),

    #[error("Partition '{path}' has no '{column}' column")]
    MissingColumn { path: PathBuf, column: String },

    #[error("Column '{column}' of '{path}' has unsupported type {dtype}")]
    UnsupportedColumnType {
        path: PathBuf,
        column: String,
        dtype: String,
    },

    #[error("Failed to create snapshot directory '{0}'")]
    DirCreation(PathBuf, #[source] std::io::Error),

    // Errors during parquet writing (inside blocking task)
    #[error("I/O error writing parquet file '{0}'")]
    ParquetWriteIo(PathBuf, #[source] std::io::Error),
    #[error("Encoding error writing parquet file '{0}'")]
    ParquetWritePolars(PathBuf, #[source] PolarsError),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),
}
