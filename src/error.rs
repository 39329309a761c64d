use crate::config::error::ConfigError;
use crate::firms::error::FirmsError;
use crate::regions::error::RegionError;
use crate::render::error::RenderError;
use crate::storage::error::StorageError;
use crate::weather::error::WeatherError;
use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HeatspotError {
    #[error(transparent)]
    Firms(#[from] FirmsError),

    #[error(transparent)]
    Weather(#[from] WeatherError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Region(#[from] RegionError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),
}
