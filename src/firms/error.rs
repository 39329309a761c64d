use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FirmsError {
    #[error("No FIRMS map key configured (set `firms.map_key` or FIRMS_MAP_KEY)")]
    MissingMapKey,

    #[error("FIRMS day range must be between 1 and 10, got {0}")]
    InvalidDayRange(u8),

    #[error("Unknown FIRMS source '{0}'")]
    UnknownSource(String),

    #[error("Invalid FIRMS area '{0}', expected 'world', a country code or 'west,south,east,north'")]
    InvalidArea(String),

    // URLs are stored with the map key redacted
    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Data download failed")]
    DownloadIo(#[from] std::io::Error),

    #[error("I/O error buffering CSV data from {url}")]
    CsvReadIo {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parsing error processing CSV data from {url}")]
    CsvReadPolars {
        url: String,
        #[source]
        source: PolarsError,
    },

    #[error("FIRMS response from {url} is missing required column '{column}'")]
    MissingColumn { url: String, column: String },

    #[error("Column '{column}' of the FIRMS response from {url} has unsupported type {dtype}")]
    UnexpectedColumnType {
        url: String,
        column: String,
        dtype: String,
    },

    #[error("Failed to parse JSON data")]
    JsonParse(#[from] serde_json::Error),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),
}
