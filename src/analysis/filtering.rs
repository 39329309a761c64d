//! Lazy date filtering of the observation table.

use crate::types::filter_spec::FilterSpec;
use crate::types::observation::{
    date_from_epoch_days, Observation, COL_ACQ_DATE, COL_BRIGHTNESS, COL_LATITUDE, COL_LONGITUDE,
};
use polars::prelude::*;

/// A wrapper around a polars `LazyFrame` holding canonical observation columns
/// (`latitude`, `longitude`, `brightness`, `acq_date`).
///
/// Every method returns a new frame; the wrapped plan is never changed in place.
#[derive(Clone)]
pub struct ObservationFrame {
    /// The underlying lazy plan.
    pub frame: LazyFrame,
}

impl ObservationFrame {
    pub fn new(frame: LazyFrame) -> Self {
        Self { frame }
    }

    /// Applies an arbitrary polars predicate.
    pub fn filter(&self, predicate: Expr) -> ObservationFrame {
        ObservationFrame::new(self.frame.clone().filter(predicate))
    }

    /// Keeps the rows selected by `spec`, in their original order.
    ///
    /// An inverted range is applied as written and leaves no rows. Rows without an
    /// acquisition date never match.
    ///
    /// # Example
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use heatspot::{FilterSpec, ObservationFrame};
    /// use polars::prelude::*;
    ///
    /// # fn main() -> Result<(), PolarsError> {
    /// let df = df!(
    ///     "latitude" => [13.7, 18.8],
    ///     "longitude" => [100.5, 98.9],
    ///     "brightness" => [320.0, 345.5],
    ///     "acq_date" => [
    ///         NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
    ///         NaiveDate::from_ymd_opt(2025, 5, 2).unwrap(),
    ///     ],
    /// )?;
    /// let frame = ObservationFrame::new(df.lazy());
    /// let day = FilterSpec::exact(NaiveDate::from_ymd_opt(2025, 5, 2).unwrap());
    /// let kept = frame.filter_dates(&day).observations()?;
    /// assert_eq!(kept.len(), 1);
    /// assert_eq!(kept[0].brightness, 345.5);
    /// # Ok(())
    /// # }
    /// ```
    pub fn filter_dates(&self, spec: &FilterSpec) -> ObservationFrame {
        self.filter(date_predicate(spec))
    }

    pub fn collect(&self) -> PolarsResult<DataFrame> {
        self.frame.clone().collect()
    }

    /// Collects the frame into observation rows. Rows with a null coordinate or date are
    /// dropped; a null brightness is kept as NaN, which normalizes to a weight of 0.
    pub fn observations(&self) -> PolarsResult<Vec<Observation>> {
        let df = self
            .frame
            .clone()
            .select([
                col(COL_LATITUDE).cast(DataType::Float64),
                col(COL_LONGITUDE).cast(DataType::Float64),
                col(COL_BRIGHTNESS).cast(DataType::Float64),
                col(COL_ACQ_DATE).cast(DataType::Date).cast(DataType::Int32),
            ])
            .collect()?;

        let latitudes = df.column(COL_LATITUDE)?.f64()?;
        let longitudes = df.column(COL_LONGITUDE)?.f64()?;
        let brightness = df.column(COL_BRIGHTNESS)?.f64()?;
        let days = df.column(COL_ACQ_DATE)?.i32()?;

        Ok(latitudes
            .into_iter()
            .zip(longitudes)
            .zip(brightness)
            .zip(days)
            .filter_map(|(((lat, lon), b), day)| {
                Some(Observation::new(
                    lat?,
                    lon?,
                    b.unwrap_or(f64::NAN),
                    date_from_epoch_days(day?)?,
                ))
            })
            .collect())
    }
}

/// Polars predicate equivalent to [`FilterSpec::contains`] on the `acq_date` column.
pub fn date_predicate(spec: &FilterSpec) -> Expr {
    match *spec {
        FilterSpec::Exact { date } => col(COL_ACQ_DATE).eq(lit(date)),
        FilterSpec::Range { start, end } => col(COL_ACQ_DATE)
            .gt_eq(lit(start))
            .and(col(COL_ACQ_DATE).lt_eq(lit(end))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, day).unwrap()
    }

    fn frame() -> ObservationFrame {
        let df = df!(
            "latitude" => [10.0, 11.0, 12.0, 13.0, 14.0],
            "longitude" => [100.0, 101.0, 102.0, 103.0, 104.0],
            "brightness" => [300.0, 310.0, 320.0, 330.0, 340.0],
            "acq_date" => [date(3), date(1), date(2), date(1), date(5)],
        )
        .unwrap();
        ObservationFrame::new(df.lazy())
    }

    fn latitudes(frame: &ObservationFrame) -> Vec<f64> {
        frame
            .observations()
            .unwrap()
            .iter()
            .map(|o| o.latitude)
            .collect()
    }

    #[test]
    fn test_exact_keeps_matching_rows_in_order() {
        let kept = frame().filter_dates(&FilterSpec::exact(date(1)));
        assert_eq!(latitudes(&kept), [11.0, 13.0]);
    }

    #[test]
    fn test_range_is_inclusive() {
        let kept = frame().filter_dates(&FilterSpec::range(date(2), date(3)));
        assert_eq!(latitudes(&kept), [10.0, 12.0]);
        let kept = frame().filter_dates(&FilterSpec::range(date(1), date(5)));
        assert_eq!(latitudes(&kept).len(), 5);
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let spec = FilterSpec::range(date(5), date(1));
        assert!(spec.is_inverted());
        let kept = frame().filter_dates(&spec);
        assert_eq!(kept.collect().unwrap().height(), 0);
    }

    #[test]
    fn test_filter_agrees_with_contains() {
        let all = frame().observations().unwrap();
        for spec in [
            FilterSpec::exact(date(2)),
            FilterSpec::range(date(1), date(3)),
            FilterSpec::range(date(4), date(9)),
        ] {
            let expected: Vec<_> = all
                .iter()
                .filter(|o| spec.contains(o.acq_date))
                .copied()
                .collect();
            assert_eq!(frame().filter_dates(&spec).observations().unwrap(), expected);
        }
    }

    #[test]
    fn test_null_rows_are_dropped() {
        let df = df!(
            "latitude" => [Some(1.0), None, Some(3.0)],
            "longitude" => [1.0, 2.0, 3.0],
            "brightness" => [300.0, 300.0, 300.0],
            "acq_date" => [Some(date(1)), Some(date(1)), None],
        )
        .unwrap();
        let frame = ObservationFrame::new(df.lazy());
        assert_eq!(frame.observations().unwrap().len(), 1);
        assert_eq!(
            frame
                .filter_dates(&FilterSpec::range(date(1), date(31)))
                .collect()
                .unwrap()
                .height(),
            2
        );
    }

    #[test]
    fn test_null_brightness_keeps_the_detection() {
        let df = df!(
            "latitude" => [1.0, 2.0],
            "longitude" => [1.0, 2.0],
            "brightness" => [Some(300.0), None],
            "acq_date" => [date(1), date(1)],
        )
        .unwrap();
        let rows = ObservationFrame::new(df.lazy())
            .filter_dates(&FilterSpec::exact(date(1)))
            .observations()
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[1].brightness.is_nan());
    }
}
