//! Brightness to heat weight scaling.

use crate::config::error::ConfigError;
use crate::types::observation::{HeatPoint, Observation};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MIN_BRIGHTNESS: f64 = 250.0;
pub const DEFAULT_MAX_BRIGHTNESS: f64 = 400.0;

/// Clamp range used to scale brightness temperatures (Kelvin) into `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrightnessBounds {
    min: f64,
    max: f64,
}

impl Default for BrightnessBounds {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_BRIGHTNESS,
            max: DEFAULT_MAX_BRIGHTNESS,
        }
    }
}

impl BrightnessBounds {
    /// Both bounds must be finite and `min < max`.
    pub fn new(min: f64, max: f64) -> Result<Self, ConfigError> {
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(ConfigError::InvalidBounds { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// `(clamp(brightness, min, max) - min) / (max - min)`.
    ///
    /// Infinite values clamp to the nearest bound; NaN maps to `0.0`.
    ///
    /// ```
    /// use heatspot::BrightnessBounds;
    ///
    /// let bounds = BrightnessBounds::default();
    /// assert_eq!(bounds.normalize(325.0), 0.5);
    /// assert_eq!(bounds.normalize(500.0), 1.0);
    /// ```
    pub fn normalize(&self, brightness: f64) -> f64 {
        // f64::max returns the non-NaN operand, so NaN lands on `min`.
        let clamped = brightness.max(self.min).min(self.max);
        (clamped - self.min) / (self.max - self.min)
    }

    /// Projects every observation onto a heat point, preserving order.
    pub fn heat_points(&self, observations: &[Observation]) -> Vec<HeatPoint> {
        observations
            .iter()
            .map(|o| HeatPoint {
                latitude: o.latitude,
                longitude: o.longitude,
                weight: self.normalize(o.brightness),
            })
            .collect()
    }
}
