//! FIRMS sensor products and the geographic scope of a hotspot request.

use crate::firms::error::FirmsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A FIRMS data product, identified on the API by its upper case source name.
///
/// `*_NRT` products are near real time, `*_SP` are the standard processing archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FirmsSource {
    #[serde(rename = "MODIS_NRT")]
    ModisNrt,
    #[serde(rename = "MODIS_SP")]
    ModisSp,
    #[serde(rename = "VIIRS_SNPP_NRT")]
    ViirsSnppNrt,
    #[serde(rename = "VIIRS_SNPP_SP")]
    ViirsSnppSp,
    #[serde(rename = "VIIRS_NOAA20_NRT")]
    ViirsNoaa20Nrt,
    #[serde(rename = "VIIRS_NOAA20_SP")]
    ViirsNoaa20Sp,
    #[serde(rename = "VIIRS_NOAA21_NRT")]
    ViirsNoaa21Nrt,
    #[serde(rename = "LANDSAT_NRT")]
    LandsatNrt,
}

impl FirmsSource {
    pub const ALL: [FirmsSource; 8] = [
        FirmsSource::ModisNrt,
        FirmsSource::ModisSp,
        FirmsSource::ViirsSnppNrt,
        FirmsSource::ViirsSnppSp,
        FirmsSource::ViirsNoaa20Nrt,
        FirmsSource::ViirsNoaa20Sp,
        FirmsSource::ViirsNoaa21Nrt,
        FirmsSource::LandsatNrt,
    ];

    pub fn path_segment(&self) -> &'static str {
        match self {
            FirmsSource::ModisNrt => "MODIS_NRT",
            FirmsSource::ModisSp => "MODIS_SP",
            FirmsSource::ViirsSnppNrt => "VIIRS_SNPP_NRT",
            FirmsSource::ViirsSnppSp => "VIIRS_SNPP_SP",
            FirmsSource::ViirsNoaa20Nrt => "VIIRS_NOAA20_NRT",
            FirmsSource::ViirsNoaa20Sp => "VIIRS_NOAA20_SP",
            FirmsSource::ViirsNoaa21Nrt => "VIIRS_NOAA21_NRT",
            FirmsSource::LandsatNrt => "LANDSAT_NRT",
        }
    }
}

impl fmt::Display for FirmsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path_segment())
    }
}

impl FromStr for FirmsSource {
    type Err = FirmsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FirmsSource::ALL
            .into_iter()
            .find(|source| source.path_segment().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FirmsError::UnknownSource(s.to_string()))
    }
}

/// Geographic scope of a FIRMS hotspot request.
///
/// Parsed from `world`, a three letter ISO country code (`THA`), or a
/// `west,south,east,north` bounding box in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AreaScope {
    World,
    Country(String),
    BoundingBox {
        west: f64,
        south: f64,
        east: f64,
        north: f64,
    },
}

impl fmt::Display for AreaScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AreaScope::World => write!(f, "world"),
            AreaScope::Country(code) => write!(f, "{}", code),
            AreaScope::BoundingBox {
                west,
                south,
                east,
                north,
            } => write!(f, "{},{},{},{}", west, south, east, north),
        }
    }
}

impl FromStr for AreaScope {
    type Err = FirmsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("world") {
            return Ok(AreaScope::World);
        }
        if s.contains(',') {
            let values: Vec<f64> = s
                .split(',')
                .map(|v| v.trim().parse::<f64>())
                .collect::<Result<_, _>>()
                .map_err(|_| FirmsError::InvalidArea(s.to_string()))?;
            let [west, south, east, north] = values[..] else {
                return Err(FirmsError::InvalidArea(s.to_string()));
            };
            if !(-180.0..=180.0).contains(&west)
                || !(-180.0..=180.0).contains(&east)
                || !(-90.0..=90.0).contains(&south)
                || !(-90.0..=90.0).contains(&north)
                || south > north
            {
                return Err(FirmsError::InvalidArea(s.to_string()));
            }
            return Ok(AreaScope::BoundingBox {
                west,
                south,
                east,
                north,
            });
        }
        if s.len() == 3 && s.chars().all(|c| c.is_ascii_alphabetic()) {
            return Ok(AreaScope::Country(s.to_ascii_uppercase()));
        }
        Err(FirmsError::InvalidArea(s.to_string()))
    }
}

impl TryFrom<String> for AreaScope {
    type Error = FirmsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AreaScope> for String {
    fn from(value: AreaScope) -> Self {
        value.to_string()
    }
}
