//! The main entry point: fetches upstream data into the snapshot store and builds
//! snapshots for map queries.

use crate::config::{ensure_dir_exists, Config};
use crate::error::HeatspotError;
use crate::firms::client::{FirmsClient, MapKeyStatus};
use crate::regions::load_regions_async;
use crate::render::{choropleth, write_layers, HeatLayer};
use crate::snapshot::Snapshot;
use crate::storage::{Dataset, SnapshotStore};
use crate::types::filter_spec::FilterSpec;
use crate::types::firms_source::{AreaScope, FirmsSource};
use crate::types::region::RegionSet;
use crate::types::weather_record::WeatherRecord;
use crate::weather::client::WeatherClient;
use crate::weather::error::WeatherError;
use bon::bon;
use chrono::Utc;
use log::info;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Client tying the FIRMS and OpenWeatherMap fetchers, the snapshot store and the
/// boundary file together.
///
/// # Examples
///
/// ```no_run
/// # use heatspot::{Config, FilterSpec, Heatspot, HeatspotError};
/// # use chrono::NaiveDate;
/// # #[tokio::main]
/// # async fn main() -> Result<(), HeatspotError> {
/// let client = Heatspot::new(Config::load(None)?).await?;
///
/// // Last two days of MODIS detections over Thailand, as configured by default.
/// let written = client.fetch_hotspots().call().await?;
/// println!("wrote {} partitions", written.len());
///
/// let snapshot = client.reload().await?;
/// let day = FilterSpec::exact(NaiveDate::from_ymd_opt(2025, 5, 1).unwrap());
/// for entry in snapshot.region_counts(&day)?.iter() {
///     println!("{}: {}", entry.id, entry.count);
/// }
/// # Ok(())
/// # }
/// ```
pub struct Heatspot {
    config: Config,
    firms: FirmsClient,
    weather: WeatherClient,
    store: SnapshotStore,
    regions: OnceCell<Arc<RegionSet>>,
}

#[bon]
impl Heatspot {
    /// Validates `config` and creates the data directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`HeatspotError::Config`] for invalid bounds, an unknown time zone, or a data
    /// directory that cannot be resolved or created.
    pub async fn new(config: Config) -> Result<Self, HeatspotError> {
        config.validate()?;
        let data_dir = config.data_dir()?;
        ensure_dir_exists(&data_dir).await?;

        let firms = FirmsClient::new(&config.firms.base_url, config.firms.map_key.clone());
        let weather = WeatherClient::new(
            &config.weather.base_url,
            config.weather.api_key.clone(),
            config.weather.tz()?,
        );
        Ok(Self {
            store: SnapshotStore::new(&data_dir),
            firms,
            weather,
            config,
            regions: OnceCell::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn firms(&self) -> &FirmsClient {
        &self.firms
    }

    pub fn weather(&self) -> &WeatherClient {
        &self.weather
    }

    /// Downloads FIRMS hotspots and stores them, one parquet file per acquisition date.
    ///
    /// Every argument falls back to the `firms` section of the configuration.
    ///
    /// Returns the paths of the written partition files.
    #[builder]
    pub async fn fetch_hotspots(
        &self,
        source: Option<FirmsSource>,
        area: Option<AreaScope>,
        day_range: Option<u8>,
    ) -> Result<Vec<PathBuf>, HeatspotError> {
        let source = source.unwrap_or(self.config.firms.source);
        let area = area.unwrap_or_else(|| self.config.firms.area.clone());
        let day_range = day_range.unwrap_or(self.config.firms.day_range);

        let df = self.firms.hotspots(source, &area, day_range).await?;
        let stem = format!("firms_{}_{}", source, Utc::now().format("%Y%m%dT%H%M%S"));
        let written = self.store.store(Dataset::Firms, &stem, df).await?;
        info!("Stored {} FIRMS partition file(s)", written.len());
        Ok(written)
    }

    /// Fetches the current weather for `city` (default: `weather.city`) and stores it.
    #[builder]
    pub async fn fetch_weather(&self, city: Option<&str>) -> Result<WeatherRecord, HeatspotError> {
        let city = city
            .or(self.config.weather.city.as_deref())
            .ok_or(WeatherError::MissingCity)?;
        let record = self.weather.current(city).await?;

        let stem = format!(
            "weather_{}_{}",
            file_stem_segment(city),
            Utc::now().format("%Y%m%dT%H%M%S")
        );
        self.store
            .store(Dataset::Weather, &stem, record.to_frame()?)
            .await?;
        Ok(record)
    }

    pub async fn key_status(&self) -> Result<MapKeyStatus, HeatspotError> {
        Ok(self.firms.key_status().await?)
    }

    /// The configured region set, read from disk on first use and shared afterwards.
    pub async fn regions(&self) -> Result<Arc<RegionSet>, HeatspotError> {
        let path = self.config.regions_path()?;
        let name_property = self.config.region_name_property.as_str();
        let regions = self
            .regions
            .get_or_try_init(|| async move {
                load_regions_async(&path, name_property).await.map(Arc::new)
            })
            .await?;
        Ok(Arc::clone(regions))
    }

    /// Loads every observation partition currently in the store into a new snapshot.
    pub async fn reload(&self) -> Result<Snapshot, HeatspotError> {
        let regions = self.regions().await?;
        let loaded = self.store.load_observations().await?;
        Ok(Snapshot::from_loaded(loaded, regions))
    }

    /// Builds both map layers for `spec` from `snapshot` and writes them into `out_dir`.
    pub fn render(
        &self,
        snapshot: &Snapshot,
        spec: &FilterSpec,
        out_dir: &Path,
    ) -> Result<(PathBuf, PathBuf), HeatspotError> {
        let result = snapshot.query(spec, &self.config.brightness)?;
        let regions = choropleth(
            snapshot.regions(),
            &result.counts,
            &self.config.region_name_property,
        );
        let heat = HeatLayer::new(&self.config.render, result.heat_points);
        Ok(write_layers(out_dir, &regions, &heat)?)
    }
}

/// Lower-cased ASCII alphanumerics of `value`, everything else replaced by `_`.
fn file_stem_segment(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}
