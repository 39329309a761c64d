use crate::types::weather_record::WeatherRecord;
use crate::weather::error::WeatherError;
use crate::weather::response::CurrentWeather;
use chrono::DateTime;
use chrono_tz::Tz;
use log::{info, warn};
use reqwest::Client;

pub const DEFAULT_WEATHER_BASE_URL: &str = "https://api.openweathermap.org";

/// HTTP client for OpenWeatherMap current conditions.
pub struct WeatherClient {
    base_url: String,
    api_key: Option<String>,
    timezone: Tz,
    download_client: Client,
}

impl WeatherClient {
    pub fn new(base_url: &str, api_key: Option<String>, timezone: Tz) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            timezone,
            download_client: Client::new(),
        }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Fetches the current conditions for `city` and flattens them into a record whose
    /// times are expressed in the client's time zone.
    pub async fn current(&self, city: &str) -> Result<WeatherRecord, WeatherError> {
        let key = self.api_key.as_deref().ok_or(WeatherError::MissingApiKey)?;
        let city = city.trim();
        if city.is_empty() {
            return Err(WeatherError::MissingCity);
        }
        let url = format!("{}/data/2.5/weather", self.base_url);
        let shown = format!("{}?q={}", url, city);
        info!("Requesting current weather from {}", shown);

        let response = self
            .download_client
            .get(&url)
            .query(&[("q", city), ("appid", key)])
            .send()
            .await
            .map_err(|e| WeatherError::NetworkRequest(shown.clone(), e.without_url()))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                let e = e.without_url();
                warn!("HTTP error for {}: {}", shown, e);
                return Err(if let Some(status) = e.status() {
                    WeatherError::HttpStatus {
                        url: shown,
                        status,
                        source: e,
                    }
                } else {
                    WeatherError::NetworkRequest(shown, e)
                });
            }
        };

        let body = response
            .bytes()
            .await
            .map_err(|e| WeatherError::NetworkRequest(shown.clone(), e.without_url()))?;
        let parsed: CurrentWeather =
            serde_json::from_slice(&body).map_err(|source| WeatherError::JsonParse {
                url: shown.clone(),
                source,
            })?;
        flatten(parsed, self.timezone)
    }
}

/// Flattens a decoded response into one record, converting `dt` into `tz`.
pub(crate) fn flatten(response: CurrentWeather, tz: Tz) -> Result<WeatherRecord, WeatherError> {
    let dt = response.dt.ok_or(WeatherError::MissingTimestamp)?;
    let observed_at = DateTime::from_timestamp(dt, 0)
        .ok_or(WeatherError::InvalidTimestamp(dt))?
        .with_timezone(&tz);

    let cod = response.code();
    let CurrentWeather {
        coord,
        weather,
        base,
        main,
        visibility,
        wind,
        clouds,
        rain,
        snow,
        sys,
        timezone,
        id,
        name,
        ..
    } = response;
    let coord = coord.unwrap_or_default();
    // Only the primary condition is kept.
    let condition = weather.into_iter().next().unwrap_or_default();
    let main = main.unwrap_or_default();
    let wind = wind.unwrap_or_default();
    let sys = sys.unwrap_or_default();

    Ok(WeatherRecord {
        lon: coord.lon,
        lat: coord.lat,
        weather_id: condition.id,
        weather_main: condition.main,
        weather_description: condition.description,
        weather_icon: condition.icon,
        base,
        temp: main.temp,
        feels_like: main.feels_like,
        pressure: main.pressure,
        humidity: main.humidity,
        temp_min: main.temp_min,
        temp_max: main.temp_max,
        sea_level: main.sea_level,
        grnd_level: main.grnd_level,
        visibility,
        wind_speed: wind.speed,
        wind_deg: wind.deg,
        wind_gust: wind.gust,
        clouds_all: clouds.and_then(|c| c.all),
        rain_1h: rain.and_then(|r| r.one_hour),
        snow_1h: snow.and_then(|s| s.one_hour),
        acq_date: observed_at.date_naive(),
        acq_time: observed_at.format("%H:%M:%S").to_string(),
        observed_at,
        sys_type: sys.kind,
        sys_id: sys.id,
        sys_country: sys.country,
        sys_sunrise: sys.sunrise,
        sys_sunset: sys.sunset,
        timezone,
        city_id: id,
        name,
        cod,
    })
}
