//! Coordinate reference systems accepted for boundary files.

use crate::regions::error::RegionError;
use geo::{Coord, MapCoords, MultiPolygon};
use serde_json::{Map, Value};
use std::f64::consts::PI;

/// Semi-major axis of the WGS84 ellipsoid as used by spherical web mercator.
const EARTH_RADIUS_M: f64 = 6_378_137.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crs {
    /// Longitude/latitude degrees (EPSG:4326, OGC CRS84).
    Geographic,
    /// Spherical mercator metres (EPSG:3857 and its legacy aliases).
    WebMercator,
}

impl Crs {
    /// Resolves a CRS name such as `EPSG:3857` or `urn:ogc:def:crs:OGC:1.3:CRS84`.
    pub fn from_name(name: &str) -> Result<Self, RegionError> {
        let code = name.rsplit(':').next().unwrap_or(name).trim();
        match code.to_ascii_uppercase().as_str() {
            "4326" | "CRS84" => Ok(Crs::Geographic),
            "3857" | "900913" | "3785" | "102100" => Ok(Crs::WebMercator),
            _ => Err(RegionError::UnsupportedCrs(name.to_string())),
        }
    }

    /// Reads the legacy GeoJSON 2008 `crs` member from a FeatureCollection's foreign
    /// members. Files without one are geographic, as RFC 7946 requires.
    pub fn from_foreign_members(members: Option<&Map<String, Value>>) -> Result<Self, RegionError> {
        let Some(crs) = members.and_then(|m| m.get("crs")) else {
            return Ok(Crs::Geographic);
        };
        if crs.is_null() {
            return Ok(Crs::Geographic);
        }
        let name = crs
            .get("properties")
            .and_then(|p| p.get("name"))
            .and_then(Value::as_str)
            .ok_or_else(|| RegionError::MalformedCrs(crs.to_string()))?;
        Crs::from_name(name)
    }

    /// Converts `geometry` from this CRS to longitude/latitude degrees.
    pub fn to_geographic(self, geometry: MultiPolygon<f64>) -> MultiPolygon<f64> {
        match self {
            Crs::Geographic => geometry,
            Crs::WebMercator => geometry.map_coords(inverse_web_mercator),
        }
    }
}

fn inverse_web_mercator(coord: Coord<f64>) -> Coord<f64> {
    let lon = (coord.x / EARTH_RADIUS_M).to_degrees();
    let lat = (2.0 * (coord.y / EARTH_RADIUS_M).exp().atan() - PI / 2.0).to_degrees();
    Coord { x: lon, y: lat }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_names() {
        assert_eq!(Crs::from_name("EPSG:4326").unwrap(), Crs::Geographic);
        assert_eq!(
            Crs::from_name("urn:ogc:def:crs:OGC:1.3:CRS84").unwrap(),
            Crs::Geographic
        );
        assert_eq!(
            Crs::from_name("urn:ogc:def:crs:EPSG::3857").unwrap(),
            Crs::WebMercator
        );
        assert!(matches!(
            Crs::from_name("EPSG:32647"),
            Err(RegionError::UnsupportedCrs(_))
        ));
    }

    #[test]
    fn test_foreign_members() {
        assert_eq!(Crs::from_foreign_members(None).unwrap(), Crs::Geographic);
        let members = json!({"crs": {"type": "name", "properties": {"name": "EPSG:3857"}}});
        assert_eq!(
            Crs::from_foreign_members(members.as_object()).unwrap(),
            Crs::WebMercator
        );
        let broken = json!({"crs": {"type": "name"}});
        assert!(matches!(
            Crs::from_foreign_members(broken.as_object()),
            Err(RegionError::MalformedCrs(_))
        ));
    }

    #[test]
    fn test_inverse_web_mercator() {
        let origin = inverse_web_mercator(Coord { x: 0.0, y: 0.0 });
        assert!(origin.x.abs() < 1e-12 && origin.y.abs() < 1e-12);

        // Bangkok, 100.5231E 13.7367N.
        let bangkok = inverse_web_mercator(Coord {
            x: 11_190_180.3,
            y: 1_544_026.0,
        });
        assert!((bangkok.x - 100.5231).abs() < 1e-3, "{:?}", bangkok);
        assert!((bangkok.y - 13.7367).abs() < 1e-3, "{:?}", bangkok);
    }
}
