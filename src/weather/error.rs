use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("No OpenWeatherMap API key configured (set `weather.api_key` or OPENWEATHER_API_KEY)")]
    MissingApiKey,

    #[error("No city configured for weather requests")]
    MissingCity,

    #[error("Unknown time zone '{0}'")]
    InvalidTimezone(String),

    // URLs are stored with the API key redacted
    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to parse weather response from {url}")]
    JsonParse {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Weather response has no observation time")]
    MissingTimestamp,

    #[error("Observation time {0} is out of range")]
    InvalidTimestamp(i64),
}
