//! Best-effort loading of every observation partition below a snapshot root.

use crate::storage::error::StorageError;
use crate::types::observation::{
    epoch_days, COL_ACQ_DATE, COL_BRIGHTNESS, COL_LATITUDE, COL_LONGITUDE,
};
use chrono::NaiveDate;
use log::{debug, info, warn};
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Brightness used for partitions that carry neither `brightness` nor `bright_ti4`.
pub const DEFAULT_BRIGHTNESS: f64 = 1.0;

/// Brightness columns in order of preference (MODIS, then VIIRS I-band 4).
const BRIGHTNESS_COLUMNS: [&str; 2] = [COL_BRIGHTNESS, "bright_ti4"];

/// A partition file that was left out of a load, together with the reason.
#[derive(Debug)]
pub struct SkippedPartition {
    pub path: PathBuf,
    pub error: StorageError,
}

/// Result of loading a snapshot root: the canonical observation table plus every
/// partition that could not be used.
#[derive(Debug)]
pub struct LoadedObservations {
    /// Columns `latitude`, `longitude`, `brightness` (all `Float64`) and `acq_date` (`Date`).
    pub frame: DataFrame,
    pub skipped: Vec<SkippedPartition>,
    pub files_read: usize,
}

/// An empty table with the canonical observation schema.
pub fn empty_observation_frame() -> PolarsResult<DataFrame> {
    DataFrame::new(vec![
        Column::new_empty(COL_LATITUDE.into(), &DataType::Float64),
        Column::new_empty(COL_LONGITUDE.into(), &DataType::Float64),
        Column::new_empty(COL_BRIGHTNESS.into(), &DataType::Float64),
        Column::new_empty(COL_ACQ_DATE.into(), &DataType::Date),
    ])
}

/// Lists all `*.parquet` files below `root` at any depth, sorted by path.
///
/// Directory entries that cannot be read are returned as skipped partitions instead of
/// failing the listing. A missing root yields no files.
pub fn partition_files(root: &Path) -> Result<(Vec<PathBuf>, Vec<SkippedPartition>), StorageError> {
    if !root.is_dir() {
        warn!("Snapshot root {} does not exist, nothing to load", root.display());
        return Ok((Vec::new(), Vec::new()));
    }
    let root_str = root
        .to_str()
        .ok_or_else(|| StorageError::NonUtf8Path(root.to_path_buf()))?;
    let pattern = format!("{}/**/*.parquet", glob::Pattern::escape(root_str));

    let mut files = Vec::new();
    let mut skipped = Vec::new();
    for entry in glob::glob(&pattern)? {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => {
                let path = e.path().to_path_buf();
                warn!("Skipping unreadable entry {}: {}", path.display(), e);
                skipped.push(SkippedPartition {
                    error: StorageError::Walk(path.clone(), e.into()),
                    path,
                });
            }
        }
    }
    files.sort();
    Ok((files, skipped))
}

/// Reads every partition below `root` into one canonical table.
///
/// Each file is read and normalized on its own; a file that fails either step is logged,
/// recorded in [`LoadedObservations::skipped`], and the load continues. This is a blocking
/// function; async callers should run it on `spawn_blocking`.
pub fn load_observations(root: &Path) -> Result<LoadedObservations, StorageError> {
    let (files, mut skipped) = partition_files(root)?;
    let mut frames = Vec::with_capacity(files.len());

    for path in files {
        match read_partition(&path) {
            Ok(df) => {
                debug!("Loaded {} rows from {}", df.height(), path.display());
                frames.push(df.lazy());
            }
            Err(error) => {
                warn!("Skipping partition {}: {}", path.display(), error);
                skipped.push(SkippedPartition { path, error });
            }
        }
    }

    let files_read = frames.len();
    let frame = if frames.is_empty() {
        empty_observation_frame()?
    } else {
        concat(frames, UnionArgs::default())?.collect()?
    };
    info!(
        "Loaded {} observations from {} partitions under {} ({} skipped)",
        frame.height(),
        files_read,
        root.display(),
        skipped.len()
    );
    Ok(LoadedObservations {
        frame,
        skipped,
        files_read,
    })
}

/// Reads one parquet file and converts it to the canonical observation schema.
pub(crate) fn read_partition(path: &Path) -> Result<DataFrame, StorageError> {
    let file = File::open(path).map_err(|e| StorageError::FileOpen(path.to_path_buf(), e))?;
    let df = ParquetReader::new(file)
        .finish()
        .map_err(|e| StorageError::ParquetRead(path.to_path_buf(), e))?;
    canonicalize(df, path)
}

fn canonicalize(df: DataFrame, path: &Path) -> Result<DataFrame, StorageError> {
    let missing = |column: &str| StorageError::MissingColumn {
        path: path.to_path_buf(),
        column: column.to_string(),
    };

    let mut exprs = Vec::with_capacity(4);
    for name in [COL_LATITUDE, COL_LONGITUDE] {
        df.get_column_index(name).ok_or_else(|| missing(name))?;
        exprs.push(col(name).cast(DataType::Float64));
    }

    exprs.push(
        match BRIGHTNESS_COLUMNS
            .iter()
            .find(|name| df.get_column_index(name).is_some())
        {
            Some(name) => col(*name).cast(DataType::Float64).alias(COL_BRIGHTNESS),
            None => lit(DEFAULT_BRIGHTNESS).alias(COL_BRIGHTNESS),
        },
    );

    let date_expr = match df.column(COL_ACQ_DATE) {
        Ok(column) => {
            acq_date_expr(column.dtype()).ok_or_else(|| StorageError::UnsupportedColumnType {
                path: path.to_path_buf(),
                column: COL_ACQ_DATE.to_string(),
                dtype: column.dtype().to_string(),
            })?
        }
        // Hive style writers move the partition key out of the file into the path.
        Err(_) => {
            let date = hive_partition_date(path).ok_or_else(|| missing(COL_ACQ_DATE))?;
            lit(epoch_days(date)).cast(DataType::Date)
        }
    };
    // Every partition must end up with the same schema for the concat in `load_observations`.
    exprs.push(date_expr.cast(DataType::Date).alias(COL_ACQ_DATE));

    df.lazy()
        .select(exprs)
        .collect()
        .map_err(|e| StorageError::Canonicalize(path.to_path_buf(), e))
}

/// Expression converting an `acq_date` column of the given type into a polars `Date`.
///
/// Strings must be `YYYY-MM-DD`; values that do not parse become null and never match a
/// date filter.
pub(crate) fn acq_date_expr(dtype: &DataType) -> Option<Expr> {
    match dtype {
        DataType::Date => Some(col(COL_ACQ_DATE)),
        DataType::Datetime(_, _) => Some(col(COL_ACQ_DATE).cast(DataType::Date)),
        DataType::String => Some(col(COL_ACQ_DATE).str().to_date(StrptimeOptions {
            format: Some("%Y-%m-%d".into()),
            strict: false,
            ..Default::default()
        })),
        _ => None,
    }
}

/// Finds the innermost `acq_date=YYYY-MM-DD` directory component of `path`.
pub(crate) fn hive_partition_date(path: &Path) -> Option<NaiveDate> {
    path.ancestors()
        .filter_map(|p| p.file_name()?.to_str())
        .filter_map(|segment| segment.strip_prefix("acq_date="))
        .find_map(|value| NaiveDate::parse_from_str(value, "%Y-%m-%d").ok())
}
