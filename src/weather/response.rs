//! Typed view of the OpenWeatherMap `data/2.5/weather` JSON body.
//!
//! Every member is optional; the API drops whole objects (`rain`, `snow`) and single
//! fields (`wind.gust`, `main.sea_level`) when it has no value for them.

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CurrentWeather {
    pub coord: Option<Coord>,
    pub weather: Vec<Condition>,
    pub base: Option<String>,
    pub main: Option<MainReadings>,
    pub visibility: Option<i64>,
    pub wind: Option<Wind>,
    pub clouds: Option<Clouds>,
    pub rain: Option<Precipitation>,
    pub snow: Option<Precipitation>,
    pub dt: Option<i64>,
    pub sys: Option<Sys>,
    pub timezone: Option<i64>,
    pub id: Option<i64>,
    pub name: Option<String>,
    /// Numeric on success, but a string such as `"404"` on error bodies.
    pub cod: Option<Value>,
    pub message: Option<String>,
}

impl CurrentWeather {
    pub fn code(&self) -> Option<i64> {
        match self.cod.as_ref()? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Coord {
    pub lon: Option<f64>,
    pub lat: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Condition {
    pub id: Option<i64>,
    pub main: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MainReadings {
    pub temp: Option<f64>,
    pub feels_like: Option<f64>,
    pub pressure: Option<i64>,
    pub humidity: Option<i64>,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    pub sea_level: Option<i64>,
    pub grnd_level: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Wind {
    pub speed: Option<f64>,
    pub deg: Option<i64>,
    pub gust: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Clouds {
    pub all: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Precipitation {
    #[serde(rename = "1h")]
    pub one_hour: Option<f64>,
    #[serde(rename = "3h")]
    pub three_hours: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Sys {
    #[serde(rename = "type")]
    pub kind: Option<i64>,
    pub id: Option<i64>,
    pub country: Option<String>,
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
}
