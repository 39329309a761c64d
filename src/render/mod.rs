//! Render-ready documents for the map dashboard: a choropleth FeatureCollection and a
//! heat layer description.

pub mod error;

use crate::analysis::aggregate::RegionCounts;
use crate::render::error::RenderError;
use crate::types::observation::HeatPoint;
use crate::types::region::RegionSet;
use geojson::{Feature, FeatureCollection, Geometry};
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Property holding the per-region count in the choropleth layer.
pub const COUNT_PROPERTY: &str = "heat_spot_count";

pub const CHOROPLETH_FILE: &str = "choropleth.geojson";
pub const HEAT_LAYER_FILE: &str = "heat_layer.json";

/// Initial map position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub lat: f64,
    pub lon: f64,
    pub zoom: u8,
}

impl Default for MapView {
    fn default() -> Self {
        // Bangkok
        Self {
            lat: 13.7367,
            lon: 100.5231,
            zoom: 6,
        }
    }
}

/// Heat layer styling, in the units leaflet.heat style widgets take.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatStyle {
    pub radius: u32,
    pub blur: u32,
    pub max_zoom: u8,
    /// Weight stop (`"0.2"`) to CSS colour.
    pub gradient: BTreeMap<String, String>,
}

impl Default for HeatStyle {
    fn default() -> Self {
        Self {
            radius: 10,
            blur: 15,
            max_zoom: 7,
            gradient: BTreeMap::from([
                ("0.2".to_string(), "#FFA500".to_string()),
                ("0.5".to_string(), "#FF4500".to_string()),
                ("0.8".to_string(), "#FF0000".to_string()),
                ("1.0".to_string(), "#8B0000".to_string()),
            ]),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub view: MapView,
    pub style: HeatStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatLayer {
    pub view: MapView,
    pub style: HeatStyle,
    pub points: Vec<HeatPoint>,
}

impl HeatLayer {
    pub fn new(config: &RenderConfig, points: Vec<HeatPoint>) -> Self {
        Self {
            view: config.view.clone(),
            style: config.style.clone(),
            points,
        }
    }
}

/// One feature per region, in load order, carrying the region's original properties
/// plus `name_property = id` and `heat_spot_count`. Regions missing from `counts` get 0.
pub fn choropleth(
    regions: &RegionSet,
    counts: &RegionCounts,
    name_property: &str,
) -> FeatureCollection {
    let features = regions
        .regions()
        .iter()
        .map(|region| {
            let mut properties = region.properties.clone();
            properties.insert(name_property.to_string(), Value::String(region.id.clone()));
            properties.insert(
                COUNT_PROPERTY.to_string(),
                Value::from(counts.get(&region.id).unwrap_or(0)),
            );
            Feature {
                bbox: None,
                geometry: Some(Geometry::new(geojson::Value::from(&region.geometry))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Writes [`CHOROPLETH_FILE`] and [`HEAT_LAYER_FILE`] into `dir`, creating it if needed.
pub fn write_layers(
    dir: &Path,
    choropleth: &FeatureCollection,
    heat_layer: &HeatLayer,
) -> Result<(PathBuf, PathBuf), RenderError> {
    std::fs::create_dir_all(dir).map_err(|e| RenderError::DirCreation(dir.to_path_buf(), e))?;
    let choropleth_path = dir.join(CHOROPLETH_FILE);
    let heat_path = dir.join(HEAT_LAYER_FILE);
    write_json(&choropleth_path, choropleth)?;
    write_json(&heat_path, heat_layer)?;
    info!(
        "Wrote {} regions and {} heat points to {}",
        choropleth.features.len(),
        heat_layer.points.len(),
        dir.display()
    );
    Ok((choropleth_path, heat_path))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), RenderError> {
    let bytes =
        serde_json::to_vec(value).map_err(|e| RenderError::Encode(path.to_path_buf(), e))?;
    std::fs::write(path, bytes).map_err(|e| RenderError::Write(path.to_path_buf(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::aggregate::aggregate;
    use crate::types::observation::Observation;
    use crate::types::region::Region;
    use chrono::NaiveDate;
    use geo::{polygon, MultiPolygon};
    use serde_json::json;
    use tempfile::TempDir;

    fn regions() -> RegionSet {
        RegionSet::new(vec![
            Region::new(
                "A",
                MultiPolygon(vec![polygon![
                    (x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 0.0)
                ]]),
            ),
            Region::new(
                "B",
                MultiPolygon(vec![polygon![
                    (x: 5.0, y: 5.0), (x: 6.0, y: 5.0), (x: 6.0, y: 6.0), (x: 5.0, y: 5.0)
                ]]),
            ),
        ])
    }

    #[test]
    fn test_choropleth_properties() {
        let set = regions();
        let date = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        let counts = aggregate(&[Observation::new(0.25, 0.75, 300.0, date)], &set);
        let collection = choropleth(&set, &counts, "ADM1_TH");

        assert_eq!(collection.features.len(), 2);
        let props: Vec<_> = collection
            .features
            .iter()
            .map(|f| Value::Object(f.properties.clone().unwrap()))
            .collect();
        assert_eq!(props[0], json!({"ADM1_TH": "A", "heat_spot_count": 1}));
        assert_eq!(props[1], json!({"ADM1_TH": "B", "heat_spot_count": 0}));
        assert!(collection.features[0].geometry.is_some());
    }

    #[test]
    fn test_heat_layer_document() {
        let layer = HeatLayer::new(
            &RenderConfig::default(),
            vec![HeatPoint {
                latitude: 13.7,
                longitude: 100.5,
                weight: 0.5,
            }],
        );
        let value = serde_json::to_value(&layer).unwrap();
        assert_eq!(value["view"], json!({"lat": 13.7367, "lon": 100.5231, "zoom": 6}));
        assert_eq!(value["style"]["radius"], json!(10));
        assert_eq!(value["style"]["gradient"]["0.8"], json!("#FF0000"));
        assert_eq!(value["points"], json!([[13.7, 100.5, 0.5]]));
    }

    #[test]
    fn test_write_layers() {
        let dir = TempDir::new().unwrap();
        let set = regions();
        let counts = aggregate(&[], &set);
        let layer = HeatLayer::new(&RenderConfig::default(), Vec::new());
        let (choropleth_path, heat_path) =
            write_layers(&dir.path().join("out"), &choropleth(&set, &counts, "name"), &layer)
                .unwrap();

        let written: geojson::GeoJson = std::fs::read_to_string(choropleth_path)
            .unwrap()
            .parse()
            .unwrap();
        assert!(matches!(written, geojson::GeoJson::FeatureCollection(fc) if fc.features.len() == 2));
        let heat: HeatLayer =
            serde_json::from_str(&std::fs::read_to_string(heat_path).unwrap()).unwrap();
        assert!(heat.points.is_empty());
    }
}
