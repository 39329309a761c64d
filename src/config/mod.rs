//! Runtime configuration, read from an optional JSON file with every field defaulted.

pub mod error;

use crate::analysis::normalize::BrightnessBounds;
use crate::config::error::ConfigError;
use crate::firms::DEFAULT_FIRMS_BASE_URL;
use crate::render::RenderConfig;
use crate::types::firms_source::{AreaScope, FirmsSource};
use crate::weather::DEFAULT_WEATHER_BASE_URL;
use chrono_tz::Tz;
use log::info;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DATA_DIR_NAME: &str = "heatspot";
const REGIONS_FILE_NAME: &str = "regions.geojson";

pub const FIRMS_MAP_KEY_ENV: &str = "FIRMS_MAP_KEY";
pub const OPENWEATHER_API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Snapshot root. Defaults to `<system data dir>/heatspot`.
    pub data_dir: Option<PathBuf>,
    /// GeoJSON boundary file. Defaults to `<data_dir>/regions.geojson`.
    pub regions_path: Option<PathBuf>,
    /// Feature property used as the region identifier.
    pub region_name_property: String,
    pub brightness: BrightnessBounds,
    pub fetch_interval_hours: u64,
    pub firms: FirmsConfig,
    pub weather: WeatherConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            regions_path: None,
            region_name_property: "ADM1_TH".to_string(),
            brightness: BrightnessBounds::default(),
            fetch_interval_hours: 8,
            firms: FirmsConfig::default(),
            weather: WeatherConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirmsConfig {
    pub base_url: String,
    pub map_key: Option<String>,
    pub source: FirmsSource,
    pub area: AreaScope,
    pub day_range: u8,
}

impl Default for FirmsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_FIRMS_BASE_URL.to_string(),
            map_key: None,
            source: FirmsSource::ModisNrt,
            area: AreaScope::Country("THA".to_string()),
            day_range: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    /// City queried by the scheduler; `None` disables scheduled weather fetches.
    pub city: Option<String>,
    /// IANA zone the observation time is converted into.
    pub timezone: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_WEATHER_BASE_URL.to_string(),
            api_key: None,
            city: Some("Bangkok".to_string()),
            timezone: "Asia/Bangkok".to_string(),
        }
    }
}

impl WeatherConfig {
    pub fn tz(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse()
            .map_err(|_| ConfigError::InvalidTimezone(self.timezone.clone()))
    }
}

impl Config {
    /// Reads a JSON config file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
        let config: Config =
            serde_json::from_str(&text).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Reads `path` when given, otherwise starts from the defaults, then fills missing
    /// API keys from the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(config.with_env_keys())
    }

    /// Fills `firms.map_key` and `weather.api_key` from [`FIRMS_MAP_KEY_ENV`] and
    /// [`OPENWEATHER_API_KEY_ENV`] when the file left them unset.
    pub fn with_env_keys(mut self) -> Self {
        if self.firms.map_key.is_none() {
            self.firms.map_key = std::env::var(FIRMS_MAP_KEY_ENV).ok();
        }
        if self.weather.api_key.is_none() {
            self.weather.api_key = std::env::var(OPENWEATHER_API_KEY_ENV).ok();
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        BrightnessBounds::new(self.brightness.min(), self.brightness.max())?;
        self.weather.tz()?;
        if self.fetch_interval_hours == 0 {
            return Err(ConfigError::InvalidInterval);
        }
        Ok(())
    }

    pub fn data_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_data_dir(),
        }
    }

    pub fn regions_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.regions_path {
            Some(path) => Ok(path.clone()),
            None => Ok(self.data_dir()?.join(REGIONS_FILE_NAME)),
        }
    }

    pub fn fetch_interval(&self) -> Duration {
        Duration::from_secs(self.fetch_interval_hours.max(1).saturating_mul(60 * 60))
    }
}

pub fn default_data_dir() -> Result<PathBuf, ConfigError> {
    dirs::data_dir()
        .ok_or(ConfigError::DataDirResolution)
        .map(|p| p.join(DATA_DIR_NAME))
}

/// Creates `path` if it does not exist yet.
pub async fn ensure_dir_exists(path: &Path) -> Result<(), ConfigError> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(ConfigError::NotADirectory(path.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("Creating data directory: {}", path.display());
            tokio::fs::create_dir_all(path)
                .await
                .map_err(|e| ConfigError::DirCreation(path.to_path_buf(), e))
        }
        Err(e) => Err(ConfigError::DirCreation(path.to_path_buf(), e)),
    }
}
