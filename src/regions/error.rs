use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegionError {
    #[error("Failed to read region file '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse GeoJSON in '{0}'")]
    Parse(PathBuf, #[source] geojson::Error),

    #[error("Region file '{0}' is not a GeoJSON FeatureCollection")]
    NotFeatureCollection(PathBuf),

    #[error("Unsupported coordinate reference system '{0}', expected EPSG:4326 or EPSG:3857")]
    UnsupportedCrs(String),

    #[error("Malformed 'crs' member: {0}")]
    MalformedCrs(String),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
