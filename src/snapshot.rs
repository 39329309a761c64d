//! Immutable loaded state that every map query runs against.

use crate::analysis::aggregate::{aggregate, RegionCounts};
use crate::analysis::filtering::ObservationFrame;
use crate::analysis::normalize::BrightnessBounds;
use crate::storage::reader::{LoadedObservations, SkippedPartition};
use crate::types::filter_spec::FilterSpec;
use crate::types::observation::{HeatPoint, Observation};
use crate::types::region::RegionSet;
use chrono::{DateTime, Utc};
use log::debug;
use polars::prelude::*;
use serde::Serialize;
use std::sync::Arc;

/// Both map layers for one filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub counts: RegionCounts,
    pub heat_points: Vec<HeatPoint>,
}

/// Observations and regions as of one load.
///
/// A snapshot never changes after construction; picking up new partitions means building
/// a new one (see [`crate::Heatspot::reload`]).
#[derive(Debug)]
pub struct Snapshot {
    observations: DataFrame,
    regions: Arc<RegionSet>,
    skipped: Vec<SkippedPartition>,
    loaded_at: DateTime<Utc>,
}

impl Snapshot {
    /// `observations` must have the canonical columns `latitude`, `longitude`,
    /// `brightness` and `acq_date`.
    pub fn new(observations: DataFrame, regions: Arc<RegionSet>) -> Self {
        Self {
            observations,
            regions,
            skipped: Vec::new(),
            loaded_at: Utc::now(),
        }
    }

    pub(crate) fn from_loaded(loaded: LoadedObservations, regions: Arc<RegionSet>) -> Self {
        Self {
            observations: loaded.frame,
            regions,
            skipped: loaded.skipped,
            loaded_at: Utc::now(),
        }
    }

    pub fn observations(&self) -> &DataFrame {
        &self.observations
    }

    pub fn regions(&self) -> &RegionSet {
        &self.regions
    }

    /// Partition files that were left out of this snapshot.
    pub fn skipped(&self) -> &[SkippedPartition] {
        &self.skipped
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn frame(&self) -> ObservationFrame {
        ObservationFrame::new(self.observations.clone().lazy())
    }

    pub fn filtered(&self, spec: &FilterSpec) -> PolarsResult<Vec<Observation>> {
        let observations = self.frame().filter_dates(spec).observations()?;
        debug!(
            "Filter {} kept {} of {} observations",
            spec,
            observations.len(),
            self.observations.height()
        );
        Ok(observations)
    }

    /// Heat spot count of every region for the observations selected by `spec`.
    pub fn region_counts(&self, spec: &FilterSpec) -> PolarsResult<RegionCounts> {
        Ok(aggregate(&self.filtered(spec)?, &self.regions))
    }

    pub fn heat_points(
        &self,
        spec: &FilterSpec,
        bounds: &BrightnessBounds,
    ) -> PolarsResult<Vec<HeatPoint>> {
        Ok(bounds.heat_points(&self.filtered(spec)?))
    }

    /// Runs the filter once and derives both layers from the same rows.
    pub fn query(&self, spec: &FilterSpec, bounds: &BrightnessBounds) -> PolarsResult<QueryResult> {
        let observations = self.filtered(spec)?;
        Ok(QueryResult {
            counts: aggregate(&observations, &self.regions),
            heat_points: bounds.heat_points(&observations),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::region::Region;
    use chrono::NaiveDate;
    use geo::{polygon, MultiPolygon};

    fn square(x0: f64, y0: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![polygon![
            (x: x0, y: y0),
            (x: x0 + 1.0, y: y0),
            (x: x0 + 1.0, y: y0 + 1.0),
            (x: x0, y: y0 + 1.0),
            (x: x0, y: y0),
        ]])
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, day).unwrap()
    }

    fn snapshot() -> Snapshot {
        let regions = RegionSet::new(vec![
            Region::new("A", square(100.0, 13.0)),
            Region::new("B", square(102.0, 13.0)),
            Region::new("C", square(104.0, 13.0)),
        ]);
        let df = df!(
            "latitude" => [13.2, 13.5, 13.8, 13.5],
            "longitude" => [100.2, 100.5, 100.8, 102.5],
            "brightness" => [250.0, 325.0, 400.0, 310.0],
            "acq_date" => [date(1), date(1), date(1), date(2)],
        )
        .unwrap();
        Snapshot::new(df, Arc::new(regions))
    }

    #[test]
    fn test_exact_day_end_to_end() {
        let snapshot = snapshot();
        let result = snapshot
            .query(&FilterSpec::exact(date(1)), &BrightnessBounds::default())
            .unwrap();

        assert_eq!(result.counts.get("A"), Some(3));
        assert_eq!(result.counts.get("B"), Some(0));
        assert_eq!(result.counts.get("C"), Some(0));
        let weights: Vec<f64> = result.heat_points.iter().map(|p| p.weight).collect();
        assert_eq!(weights, [0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_range_and_inverted_range() {
        let snapshot = snapshot();
        let counts = snapshot
            .region_counts(&FilterSpec::range(date(1), date(2)))
            .unwrap();
        assert_eq!(counts.get("A"), Some(3));
        assert_eq!(counts.get("B"), Some(1));

        let inverted = FilterSpec::range(date(2), date(1));
        let counts = snapshot.region_counts(&inverted).unwrap();
        assert_eq!(counts.total(), 0);
        assert_eq!(counts.len(), 3);
        assert!(snapshot
            .heat_points(&inverted, &BrightnessBounds::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_queries_do_not_change_snapshot() {
        let snapshot = snapshot();
        let spec = FilterSpec::exact(date(2));
        let first = snapshot.region_counts(&spec).unwrap();
        let second = snapshot.region_counts(&spec).unwrap();
        assert_eq!(first, second);
        assert_eq!(snapshot.observations().height(), 4);
    }

    #[test]
    fn test_null_brightness_still_counts() {
        let regions = RegionSet::new(vec![Region::new("A", square(100.0, 13.0))]);
        let df = df!(
            "latitude" => [13.2, 13.5],
            "longitude" => [100.2, 100.5],
            "brightness" => [Some(325.0), None],
            "acq_date" => [date(1), date(1)],
        )
        .unwrap();
        let result = Snapshot::new(df, Arc::new(regions))
            .query(&FilterSpec::exact(date(1)), &BrightnessBounds::default())
            .unwrap();
        assert_eq!(result.counts.get("A"), Some(2));
        assert_eq!(result.counts.unassigned(), 0);
        let weights: Vec<f64> = result.heat_points.iter().map(|p| p.weight).collect();
        assert_eq!(weights, [0.5, 0.0]);
    }
}
