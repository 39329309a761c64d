//! The flattened current-conditions record stored for every weather fetch.

use crate::types::observation::{epoch_days, COL_ACQ_DATE};
use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use polars::prelude::*;
use serde::Serialize;

/// One OpenWeatherMap current-conditions response, flattened into a single row.
///
/// Every upstream member is optional because the API omits fields it has no value for
/// (`rain`, `snow`, `wind.gust`, ...). The observation time is converted into the
/// configured local time zone, and `acq_date` / `acq_time` are derived from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherRecord {
    pub lon: Option<f64>,
    pub lat: Option<f64>,
    pub weather_id: Option<i64>,
    pub weather_main: Option<String>,
    pub weather_description: Option<String>,
    pub weather_icon: Option<String>,
    pub base: Option<String>,
    pub temp: Option<f64>,
    pub feels_like: Option<f64>,
    pub pressure: Option<i64>,
    pub humidity: Option<i64>,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    pub sea_level: Option<i64>,
    pub grnd_level: Option<i64>,
    pub visibility: Option<i64>,
    pub wind_speed: Option<f64>,
    pub wind_deg: Option<i64>,
    pub wind_gust: Option<f64>,
    pub clouds_all: Option<i64>,
    pub rain_1h: Option<f64>,
    pub snow_1h: Option<f64>,
    /// Observation time in the configured zone.
    pub observed_at: DateTime<Tz>,
    /// Local calendar date of `observed_at`.
    pub acq_date: NaiveDate,
    /// Local wall clock time of `observed_at`, `HH:MM:SS`.
    pub acq_time: String,
    pub sys_type: Option<i64>,
    pub sys_id: Option<i64>,
    pub sys_country: Option<String>,
    pub sys_sunrise: Option<i64>,
    pub sys_sunset: Option<i64>,
    /// Shift in seconds from UTC reported by the API for the city.
    pub timezone: Option<i64>,
    pub city_id: Option<i64>,
    pub name: Option<String>,
    pub cod: Option<i64>,
}

impl WeatherRecord {
    /// Builds a one row DataFrame; `acq_date` is a polars `Date` so the record can be
    /// written through the date partitioned snapshot store.
    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        let df = df!(
            "lon" => [self.lon],
            "lat" => [self.lat],
            "weather_id" => [self.weather_id],
            "weather_main" => [self.weather_main.as_deref()],
            "weather_description" => [self.weather_description.as_deref()],
            "weather_icon" => [self.weather_icon.as_deref()],
            "base" => [self.base.as_deref()],
            "temp" => [self.temp],
            "feels_like" => [self.feels_like],
            "pressure" => [self.pressure],
            "humidity" => [self.humidity],
            "temp_min" => [self.temp_min],
            "temp_max" => [self.temp_max],
            "sea_level" => [self.sea_level],
            "grnd_level" => [self.grnd_level],
            "visibility" => [self.visibility],
            "wind_speed" => [self.wind_speed],
            "wind_deg" => [self.wind_deg],
            "wind_gust" => [self.wind_gust],
            "clouds_all" => [self.clouds_all],
            "rain_1h" => [self.rain_1h],
            "snow_1h" => [self.snow_1h],
            "observed_at" => [self.observed_at.to_rfc3339()],
            COL_ACQ_DATE => [epoch_days(self.acq_date)],
            "acq_time" => [self.acq_time.as_str()],
            "sys_type" => [self.sys_type],
            "sys_id" => [self.sys_id],
            "sys_country" => [self.sys_country.as_deref()],
            "sys_sunrise" => [self.sys_sunrise],
            "sys_sunset" => [self.sys_sunset],
            "timezone" => [self.timezone],
            "city_id" => [self.city_id],
            "name" => [self.name.as_deref()],
            "cod" => [self.cod],
        )?;
        df.lazy()
            .with_column(col(COL_ACQ_DATE).cast(DataType::Date))
            .collect()
    }
}
