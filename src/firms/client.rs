use crate::firms::error::FirmsError;
use crate::storage::reader::acq_date_expr;
use crate::types::firms_source::{AreaScope, FirmsSource};
use crate::types::observation::{COL_ACQ_DATE, COL_ACQ_TIME, COL_LATITUDE, COL_LONGITUDE};
use futures_util::TryStreamExt;
use log::{debug, info, warn};
use polars::prelude::*;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::io::Write;
use tempfile::NamedTempFile;
use tokio::io::AsyncReadExt;
use tokio::task;
use tokio_util::io::StreamReader;

pub const DEFAULT_FIRMS_BASE_URL: &str = "https://firms.modaps.eosdis.nasa.gov";

/// Accepted values for the trailing day range of hotspot requests.
pub const DAY_RANGE: std::ops::RangeInclusive<u8> = 1..=10;

/// Transaction budget of a FIRMS map key, as reported by `mapkey_status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapKeyStatus {
    pub transaction_limit: u32,
    pub current_transactions: u32,
    /// Length of the window the limit applies to, e.g. `"10 minutes"`.
    pub transaction_interval: String,
}

impl MapKeyStatus {
    pub fn remaining(&self) -> u32 {
        self.transaction_limit
            .saturating_sub(self.current_transactions)
    }
}

/// HTTP client for the FIRMS area, country and status endpoints.
pub struct FirmsClient {
    base_url: String,
    map_key: Option<String>,
    download_client: Client,
}

impl FirmsClient {
    pub fn new(base_url: &str, map_key: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            map_key: map_key.filter(|k| !k.trim().is_empty()),
            download_client: Client::new(),
        }
    }

    fn key(&self) -> Result<&str, FirmsError> {
        self.map_key.as_deref().ok_or(FirmsError::MissingMapKey)
    }

    pub(crate) fn hotspots_url(
        &self,
        key: &str,
        source: FirmsSource,
        area: &AreaScope,
        day_range: u8,
    ) -> String {
        match area {
            AreaScope::Country(code) => format!(
                "{}/api/country/csv/{}/{}/{}/{}",
                self.base_url, key, source, code, day_range
            ),
            AreaScope::World | AreaScope::BoundingBox { .. } => format!(
                "{}/api/area/csv/{}/{}/{}/{}",
                self.base_url, key, source, area, day_range
            ),
        }
    }

    /// Downloads the hotspots detected by `source` inside `area` during the last
    /// `day_range` days.
    ///
    /// The returned frame keeps every column FIRMS sends; `latitude` and `longitude` are
    /// `Float64` and `acq_date` is a polars `Date`.
    ///
    /// # Errors
    ///
    /// [`FirmsError::InvalidDayRange`] is returned before any request when `day_range` is
    /// outside `1..=10`. A response without coordinates or acquisition dates (FIRMS answers
    /// an invalid key with a plain text body) yields [`FirmsError::MissingColumn`].
    pub async fn hotspots(
        &self,
        source: FirmsSource,
        area: &AreaScope,
        day_range: u8,
    ) -> Result<DataFrame, FirmsError> {
        if !DAY_RANGE.contains(&day_range) {
            return Err(FirmsError::InvalidDayRange(day_range));
        }
        let key = self.key()?;
        let url = self.hotspots_url(key, source, area, day_range);
        let shown = redact(&url, key);

        let bytes = self.download(&url, &shown).await?;
        let df = Self::csv_to_dataframe(bytes, &shown, b',').await?;
        let df = normalize_hotspots(df, &shown)?;
        info!(
            "Fetched {} {} hotspots for {} over {} day(s)",
            df.height(),
            source,
            area,
            day_range
        );
        Ok(df)
    }

    pub async fn key_status(&self) -> Result<MapKeyStatus, FirmsError> {
        let key = self.key()?;
        let url = format!("{}/mapserver/mapkey_status/?MAP_KEY={}", self.base_url, key);
        let shown = redact(&url, key);
        let bytes = self.download(&url, &shown).await?;
        let status: MapKeyStatus = serde_json::from_slice(&bytes)?;
        debug!(
            "Map key has used {} of {} transactions",
            status.current_transactions, status.transaction_limit
        );
        Ok(status)
    }

    /// Date ranges available per product, for one source or for all of them.
    pub async fn data_availability(
        &self,
        source: Option<FirmsSource>,
    ) -> Result<DataFrame, FirmsError> {
        let key = self.key()?;
        let segment = source.map_or("all", |s| s.path_segment());
        let url = format!(
            "{}/api/data_availability/csv/{}/{}",
            self.base_url, key, segment
        );
        let shown = redact(&url, key);
        let bytes = self.download(&url, &shown).await?;
        Self::csv_to_dataframe(bytes, &shown, b',').await
    }

    /// Country codes and names accepted by the country endpoint. Needs no map key.
    pub async fn countries(&self) -> Result<DataFrame, FirmsError> {
        let url = format!("{}/api/countries", self.base_url);
        let bytes = self.download(&url, &url).await?;
        Self::csv_to_dataframe(bytes, &url, b';').await
    }

    /// Streams the body of `url` into memory. `shown` is the form of the url used in logs
    /// and errors.
    async fn download(&self, url: &str, shown: &str) -> Result<Vec<u8>, FirmsError> {
        info!("Downloading {}", shown);

        let response = self
            .download_client
            .get(url)
            .send()
            .await
            .map_err(|e| FirmsError::NetworkRequest(shown.to_string(), e.without_url()))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                let e = e.without_url();
                warn!("HTTP error for {}: {}", shown, e);
                return Err(if let Some(status) = e.status() {
                    FirmsError::HttpStatus {
                        url: shown.to_string(),
                        status,
                        source: e,
                    }
                } else {
                    FirmsError::NetworkRequest(shown.to_string(), e)
                });
            }
        };

        let stream = response
            .bytes_stream()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.without_url()));
        let mut reader = StreamReader::new(stream);
        let mut body = Vec::new();
        reader.read_to_end(&mut body).await?;
        debug!("Downloaded {} bytes from {}", body.len(), shown);
        Ok(body)
    }

    /// Parses CSV bytes with a header row into a DataFrame on a blocking task.
    pub(crate) async fn csv_to_dataframe(
        bytes: Vec<u8>,
        url: &str,
        separator: u8,
    ) -> Result<DataFrame, FirmsError> {
        let url_owned = url.to_string();

        task::spawn_blocking(move || {
            let csv_io = |source| FirmsError::CsvReadIo {
                url: url_owned.clone(),
                source,
            };
            let mut temp_file = NamedTempFile::new().map_err(csv_io)?;
            temp_file.write_all(&bytes).map_err(csv_io)?;
            temp_file.flush().map_err(csv_io)?;

            CsvReadOptions::default()
                .with_has_header(true)
                .map_parse_options(|options| {
                    options
                        .with_separator(separator)
                        .with_try_parse_dates(true)
                })
                .try_into_reader_with_file_path(Some(temp_file.path().to_path_buf()))
                .and_then(|reader| reader.finish())
                .map_err(|source| FirmsError::CsvReadPolars {
                    url: url_owned.clone(),
                    source,
                })
        })
        .await?
    }
}

/// Checks that a hotspot table has coordinates and acquisition dates and casts them to
/// `Float64` and `Date`. An `acq_time` column (`HHMM` in UTC) becomes an `HH:MM` string.
pub(crate) fn normalize_hotspots(df: DataFrame, url: &str) -> Result<DataFrame, FirmsError> {
    for column in [COL_LATITUDE, COL_LONGITUDE, COL_ACQ_DATE] {
        if df.get_column_index(column).is_none() {
            return Err(FirmsError::MissingColumn {
                url: url.to_string(),
                column: column.to_string(),
            });
        }
    }
    let dtype = df.column(COL_ACQ_DATE)?.dtype().clone();
    let date = acq_date_expr(&dtype).ok_or_else(|| FirmsError::UnexpectedColumnType {
        url: url.to_string(),
        column: COL_ACQ_DATE.to_string(),
        dtype: dtype.to_string(),
    })?;

    let mut df = df
        .lazy()
        .with_columns([
            col(COL_LATITUDE).cast(DataType::Float64),
            col(COL_LONGITUDE).cast(DataType::Float64),
            date.alias(COL_ACQ_DATE),
        ])
        .collect()?;

    if let Ok(column) = df.column(COL_ACQ_TIME) {
        let raw = column.cast(&DataType::Int64)?;
        let times: StringChunked = raw
            .i64()?
            .into_iter()
            .map(|value| value.and_then(format_acq_time))
            .collect();
        df.with_column(times.with_name(COL_ACQ_TIME.into()).into_series())?;
    }
    Ok(df)
}

/// `342` -> `"03:42"`. Values that are not a time of day give `None`.
fn format_acq_time(hhmm: i64) -> Option<String> {
    let (hours, minutes) = (hhmm / 100, hhmm % 100);
    ((0..24).contains(&hours) && (0..60).contains(&minutes))
        .then(|| format!("{:02}:{:02}", hours, minutes))
}

/// Replaces every occurrence of `key` in `url`.
pub(crate) fn redact(url: &str, key: &str) -> String {
    if key.is_empty() {
        url.to_string()
    } else {
        url.replace(key, "<MAP_KEY>")
    }
}
