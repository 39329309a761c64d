//! Row types produced from the observation table: the fire detection itself and its
//! render projection.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Column names of the canonical observation table.
pub const COL_LATITUDE: &str = "latitude";
pub const COL_LONGITUDE: &str = "longitude";
pub const COL_BRIGHTNESS: &str = "brightness";
pub const COL_ACQ_DATE: &str = "acq_date";
pub const COL_ACQ_TIME: &str = "acq_time";

/// A single fire detection as it is read back from the snapshot store.
///
/// Observations carry no identity beyond their position in the table and are never
/// modified after loading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Latitude in decimal degrees, -90..90.
    pub latitude: f64,
    /// Longitude in decimal degrees, -180..180.
    pub longitude: f64,
    /// Sensor brightness temperature in Kelvin (`brightness` for MODIS, `bright_ti4` for VIIRS).
    pub brightness: f64,
    /// Acquisition date as reported by FIRMS (UTC).
    pub acq_date: NaiveDate,
}

impl Observation {
    pub fn new(latitude: f64, longitude: f64, brightness: f64, acq_date: NaiveDate) -> Self {
        Self {
            latitude,
            longitude,
            brightness,
            acq_date,
        }
    }
}

/// An observation projected for the heat layer: position plus a `[0, 1]` weight.
///
/// Serializes as the `[latitude, longitude, weight]` triple heat map widgets expect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub weight: f64,
}

impl Serialize for HeatPoint {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.latitude, self.longitude, self.weight].serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for HeatPoint {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let [latitude, longitude, weight] = <[f64; 3]>::deserialize(deserializer)?;
        Ok(HeatPoint {
            latitude,
            longitude,
            weight,
        })
    }
}

/// Converts the physical value of a polars `Date` (days since 1970-01-01) into a `NaiveDate`.
pub(crate) fn date_from_epoch_days(days: i32) -> Option<NaiveDate> {
    // 719_163 is the number of days from 0001-01-01 (CE day 1) to 1970-01-01.
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(719_163)?)
}

/// Inverse of [`date_from_epoch_days`].
pub(crate) fn epoch_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - 719_163
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_days_conversion() {
        assert_eq!(
            date_from_epoch_days(0),
            NaiveDate::from_ymd_opt(1970, 1, 1)
        );
        assert_eq!(
            date_from_epoch_days(20_209),
            NaiveDate::from_ymd_opt(2025, 5, 1)
        );
        assert_eq!(date_from_epoch_days(i32::MAX), None);
        let date = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        assert_eq!(epoch_days(date), 20_209);
    }

    #[test]
    fn test_heat_point_serializes_as_triple() {
        let point = HeatPoint {
            latitude: 13.5,
            longitude: 100.25,
            weight: 0.5,
        };
        let json = serde_json::to_string(&point).unwrap();
        assert_eq!(json, "[13.5,100.25,0.5]");
        let back: HeatPoint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, point);
    }
}
