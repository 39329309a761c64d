use crate::storage::error::StorageError;
use crate::types::observation::{date_from_epoch_days, COL_ACQ_DATE};
use chrono::NaiveDate;
use log::{info, warn};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Directory name of the partition holding rows acquired on `date`.
pub fn partition_dir_name(date: NaiveDate) -> String {
    format!("{}={}", COL_ACQ_DATE, date)
}

/// Splits `df` by its `acq_date` column and writes one Snappy compressed parquet file per
/// date to `<dir>/acq_date=<date>/<stem>.parquet`.
///
/// Every file is written to a temporary file in its partition directory first and then
/// renamed, so concurrent loaders never see a partially written partition. Rows without
/// an acquisition date are dropped. Blocking.
pub fn write_partitioned(
    dir: &Path,
    stem: &str,
    df: &DataFrame,
) -> Result<Vec<PathBuf>, StorageError> {
    let dtype = df
        .column(COL_ACQ_DATE)
        .map_err(|_| StorageError::MissingColumn {
            path: dir.to_path_buf(),
            column: COL_ACQ_DATE.to_string(),
        })?
        .dtype();
    if dtype != &DataType::Date {
        return Err(StorageError::UnsupportedColumnType {
            path: dir.to_path_buf(),
            column: COL_ACQ_DATE.to_string(),
            dtype: dtype.to_string(),
        });
    }

    let dates = df
        .clone()
        .lazy()
        .select([col(COL_ACQ_DATE).unique().cast(DataType::Int32)])
        .collect()?;
    let mut days: Vec<i32> = dates.column(COL_ACQ_DATE)?.i32()?.into_iter().flatten().collect();
    days.sort_unstable();

    let dated_rows: usize = df.height() - df.column(COL_ACQ_DATE)?.null_count();
    if dated_rows < df.height() {
        warn!(
            "Dropping {} rows without acquisition date before writing to {}",
            df.height() - dated_rows,
            dir.display()
        );
    }

    let mut written = Vec::with_capacity(days.len());
    for day in days {
        let Some(date) = date_from_epoch_days(day) else {
            continue;
        };
        let mut part = df
            .clone()
            .lazy()
            .filter(col(COL_ACQ_DATE).eq(lit(date)))
            .collect()?;

        let part_dir = dir.join(partition_dir_name(date));
        std::fs::create_dir_all(&part_dir)
            .map_err(|e| StorageError::DirCreation(part_dir.clone(), e))?;
        let path = part_dir.join(format!("{}.parquet", stem));
        write_parquet(&mut part, &path)?;
        info!("Wrote {} rows to {}", part.height(), path.display());
        written.push(path);
    }
    Ok(written)
}

fn write_parquet(df: &mut DataFrame, path: &Path) -> Result<(), StorageError> {
    let part_dir = path.parent().unwrap_or(Path::new("."));
    let temp = NamedTempFile::new_in(part_dir)
        .map_err(|e| StorageError::ParquetWriteIo(path.to_path_buf(), e))?;
    ParquetWriter::new(temp.as_file())
        .with_compression(ParquetCompression::Snappy)
        .finish(df)
        .map_err(|e| StorageError::ParquetWritePolars(path.to_path_buf(), e))?;
    temp.persist(path)
        .map_err(|e| StorageError::ParquetWriteIo(path.to_path_buf(), e.error))?;
    Ok(())
}
