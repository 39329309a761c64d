//! Client for OpenWeatherMap current conditions.

pub mod client;
pub mod error;
pub mod response;

pub use client::{WeatherClient, DEFAULT_WEATHER_BASE_URL};
