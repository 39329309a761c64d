pub mod analysis;
pub mod config;
mod error;
pub mod firms;
mod heatspot;
pub mod regions;
pub mod render;
pub mod schedule;
mod snapshot;
pub mod storage;
mod types;
pub mod weather;

pub use error::HeatspotError;
pub use heatspot::*;
pub use snapshot::{QueryResult, Snapshot};

pub use analysis::{aggregate, BrightnessBounds, ObservationFrame, RegionCount, RegionCounts};
pub use config::Config;
pub use render::{HeatLayer, HeatStyle, MapView, RenderConfig};
pub use storage::{Dataset, SnapshotStore};

pub use types::filter_spec::FilterSpec;
pub use types::firms_source::{AreaScope, FirmsSource};
pub use types::observation::{HeatPoint, Observation};
pub use types::region::{Region, RegionSet};
pub use types::weather_record::WeatherRecord;

pub use config::error::ConfigError;
pub use firms::error::FirmsError;
pub use regions::error::RegionError;
pub use render::error::RenderError;
pub use storage::error::StorageError;
pub use weather::error::WeatherError;
