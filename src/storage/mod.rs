//! Date partitioned parquet snapshots on the local file system.
//!
//! Layout: `<root>/<dataset>/acq_date=YYYY-MM-DD/<stem>.parquet`.

pub mod error;
pub mod reader;
pub mod writer;

use crate::storage::error::StorageError;
use crate::storage::reader::LoadedObservations;
use polars::prelude::DataFrame;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::task;

/// The kinds of tables kept in the snapshot store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    /// FIRMS hotspot detections.
    Firms,
    /// OpenWeatherMap current conditions.
    Weather,
}

impl Dataset {
    pub(crate) fn path_segment(&self) -> &'static str {
        match self {
            Dataset::Firms => "firms",
            Dataset::Weather => "weather",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path_segment())
    }
}

/// Handle on a snapshot root directory.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    root: PathBuf,
}

impl SnapshotStore {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dataset_dir(&self, dataset: Dataset) -> PathBuf {
        self.root.join(dataset.path_segment())
    }

    /// Writes `df` into `dataset`, one file per acquisition date, on a blocking task.
    pub async fn store(
        &self,
        dataset: Dataset,
        stem: &str,
        df: DataFrame,
    ) -> Result<Vec<PathBuf>, StorageError> {
        let dir = self.dataset_dir(dataset);
        let stem = stem.to_string();
        task::spawn_blocking(move || writer::write_partitioned(&dir, &stem, &df)).await?
    }

    /// Loads every FIRMS partition currently on disk, skipping the ones that fail.
    pub async fn load_observations(&self) -> Result<LoadedObservations, StorageError> {
        let dir = self.dataset_dir(Dataset::Firms);
        task::spawn_blocking(move || reader::load_observations(&dir)).await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_store_then_load() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;
        let store = SnapshotStore::new(dir.path());
        let df = df!(
            "latitude" => [13.0, 14.0],
            "longitude" => [100.0, 101.0],
            "brightness" => [300.0, 350.0],
            "acq_date" => [20_209i32, 20_210],
        )?
        .lazy()
        .with_column(col("acq_date").cast(DataType::Date))
        .collect()?;

        let written = store.store(Dataset::Firms, "batch", df).await?;
        assert_eq!(written.len(), 2);
        assert!(written
            .iter()
            .all(|p| p.starts_with(dir.path().join("firms"))));

        let loaded = store.load_observations().await?;
        assert_eq!(loaded.frame.height(), 2);
        assert_eq!(loaded.files_read, 2);
        Ok(())
    }

    #[test]
    fn test_dataset_dirs() {
        let store = SnapshotStore::new(Path::new("/srv/heatspot"));
        assert_eq!(store.dataset_dir(Dataset::Firms), Path::new("/srv/heatspot/firms"));
        assert_eq!(Dataset::Weather.to_string(), "weather");
    }
}
