use crate::regions::crs::Crs;
use crate::regions::error::RegionError;
use crate::types::region::{Region, RegionSet};
use geojson::feature::Id;
use geojson::{FeatureCollection, GeoJson};
use log::{info, warn};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tokio::task;

/// Reads a GeoJSON FeatureCollection of administrative boundaries and builds the indexed
/// region set. Blocking.
pub fn load_regions(path: &Path, name_property: &str) -> Result<RegionSet, RegionError> {
    let text =
        std::fs::read_to_string(path).map_err(|e| RegionError::Read(path.to_path_buf(), e))?;
    let geojson: GeoJson = text
        .parse()
        .map_err(|e| RegionError::Parse(path.to_path_buf(), e))?;
    let GeoJson::FeatureCollection(collection) = geojson else {
        return Err(RegionError::NotFeatureCollection(path.to_path_buf()));
    };
    let regions = regions_from_collection(collection, name_property)?;
    info!("Loaded {} regions from {}", regions.len(), path.display());
    Ok(RegionSet::new(regions))
}

/// [`load_regions`] on a blocking task.
pub async fn load_regions_async(
    path: &Path,
    name_property: &str,
) -> Result<RegionSet, RegionError> {
    let path: PathBuf = path.to_path_buf();
    let name_property = name_property.to_string();
    task::spawn_blocking(move || load_regions(&path, &name_property)).await?
}

/// Converts the polygon features of `collection` into regions in file order.
///
/// Features without geometry, or with a geometry other than a polygon or multipolygon,
/// are skipped with a warning. The identifier is the `name_property` value, else the
/// feature id, else `region-<position>`; repeated identifiers get a `#<n>` suffix.
pub fn regions_from_collection(
    collection: FeatureCollection,
    name_property: &str,
) -> Result<Vec<Region>, RegionError> {
    let crs = Crs::from_foreign_members(collection.foreign_members.as_ref())?;
    let mut emitted: HashSet<String> = HashSet::new();
    let mut next_suffix: HashMap<String, usize> = HashMap::new();
    let mut regions = Vec::with_capacity(collection.features.len());

    for (position, feature) in collection.features.into_iter().enumerate() {
        let Some(geometry) = feature.geometry else {
            warn!("Skipping feature {} without geometry", position);
            continue;
        };
        let geometry = match geo::Geometry::<f64>::try_from(geometry.value) {
            Ok(geo::Geometry::Polygon(polygon)) => geo::MultiPolygon(vec![polygon]),
            Ok(geo::Geometry::MultiPolygon(multi)) => multi,
            Ok(_) => {
                warn!("Skipping feature {}: not a polygon", position);
                continue;
            }
            Err(e) => {
                warn!("Skipping feature {}: {}", position, e);
                continue;
            }
        };

        let properties = feature.properties.unwrap_or_default();
        let base_id = properties
            .get(name_property)
            .and_then(property_text)
            .or_else(|| match feature.id {
                Some(Id::String(s)) => Some(s),
                Some(Id::Number(n)) => Some(n.to_string()),
                None => None,
            })
            .unwrap_or_else(|| format!("region-{}", position));

        let id = if emitted.contains(&base_id) {
            let suffix = next_suffix.entry(base_id.clone()).or_insert(1);
            let renamed = loop {
                *suffix += 1;
                let candidate = format!("{}#{}", base_id, suffix);
                if !emitted.contains(&candidate) {
                    break candidate;
                }
            };
            warn!("Duplicate region id '{}', renaming to '{}'", base_id, renamed);
            renamed
        } else {
            base_id
        };
        emitted.insert(id.clone());

        regions.push(Region {
            id,
            geometry: crs.to_geographic(geometry),
            properties,
        });
    }
    Ok(regions)
}

fn property_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{BoundingRect, Contains, Point};
    use tempfile::TempDir;

    const PROVINCES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"ADM1_TH": "A"},
             "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]]}},
            {"type": "Feature", "properties": {"ADM1_TH": "B"},
             "geometry": {"type": "MultiPolygon", "coordinates": [[[[2,0],[3,0],[3,1],[2,1],[2,0]]]]}},
            {"type": "Feature", "properties": {"ADM1_TH": "point"},
             "geometry": {"type": "Point", "coordinates": [5, 5]}},
            {"type": "Feature", "properties": {"ADM1_TH": "none"}, "geometry": null},
            {"type": "Feature", "id": "f-7", "properties": {},
             "geometry": {"type": "Polygon", "coordinates": [[[4,0],[5,0],[5,1],[4,1],[4,0]]]}},
            {"type": "Feature", "properties": {"ADM1_TH": "A"},
             "geometry": {"type": "Polygon", "coordinates": [[[6,0],[7,0],[7,1],[6,1],[6,0]]]}},
            {"type": "Feature", "properties": null,
             "geometry": {"type": "Polygon", "coordinates": [[[8,0],[9,0],[9,1],[8,1],[8,0]]]}}
        ]
    }"#;

    fn write(dir: &TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_loads_polygons_and_assigns_ids() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "provinces.geojson", PROVINCES);
        let set = load_regions(&path, "ADM1_TH").unwrap();

        let ids: Vec<&str> = set.regions().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["A", "B", "f-7", "A#2", "region-6"]);
        assert_eq!(
            set.get(0).unwrap().properties.get("ADM1_TH"),
            Some(&Value::String("A".into()))
        );
    }

    #[test]
    fn test_renamed_ids_never_collide() {
        let square = r#"{"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]]}"#;
        let feature = |name: &str| {
            format!(
                r#"{{"type": "Feature", "properties": {{"ADM1_TH": "{}"}}, "geometry": {}}}"#,
                name, square
            )
        };
        let body = format!(
            r#"{{"type": "FeatureCollection", "features": [{}]}}"#,
            ["A", "A", "A#2", "A#2", "A"]
                .iter()
                .map(|name| feature(name))
                .collect::<Vec<_>>()
                .join(",")
        );
        let collection: FeatureCollection = body.parse().unwrap();
        let regions = regions_from_collection(collection, "ADM1_TH").unwrap();

        let ids: Vec<&str> = regions.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["A", "A#2", "A#2#2", "A#2#3", "A#3"]);
        let unique: HashSet<&str> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn test_web_mercator_is_reprojected() {
        // Square of roughly one degree around the origin, in metres.
        let body = r#"{
            "type": "FeatureCollection",
            "crs": {"type": "name", "properties": {"name": "urn:ogc:def:crs:EPSG::3857"}},
            "features": [
                {"type": "Feature", "properties": {"ADM1_TH": "M"},
                 "geometry": {"type": "Polygon", "coordinates": [[
                    [0,0],[111319.49,0],[111319.49,111325.14],[0,111325.14],[0,0]]]}}
            ]
        }"#;
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "mercator.geojson", body);
        let set = load_regions(&path, "ADM1_TH").unwrap();
        let region = set.get(0).unwrap();
        let rect = region.geometry.bounding_rect().unwrap();
        assert!((rect.max().x - 1.0).abs() < 1e-4, "{:?}", rect);
        assert!((rect.max().y - 1.0).abs() < 1e-4, "{:?}", rect);
        assert!(region.geometry.contains(&Point::new(0.5, 0.5)));
    }

    #[test]
    fn test_unsupported_crs_is_an_error() {
        let body = r#"{"type": "FeatureCollection",
            "crs": {"type": "name", "properties": {"name": "EPSG:32647"}},
            "features": []}"#;
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "utm.geojson", body);
        assert!(matches!(
            load_regions(&path, "ADM1_TH"),
            Err(RegionError::UnsupportedCrs(_))
        ));
    }

    #[test]
    fn test_rejects_non_collections_and_missing_files() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "single.geojson",
            r#"{"type": "Point", "coordinates": [1, 2]}"#,
        );
        assert!(matches!(
            load_regions(&path, "ADM1_TH"),
            Err(RegionError::NotFeatureCollection(_))
        ));
        assert!(matches!(
            load_regions(&dir.path().join("missing.geojson"), "ADM1_TH"),
            Err(RegionError::Read(..))
        ));
    }

    #[tokio::test]
    async fn test_async_load() -> Result<(), RegionError> {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "provinces.geojson", PROVINCES);
        let set = load_regions_async(&path, "ADM1_TH").await?;
        assert_eq!(set.len(), 5);
        Ok(())
    }
}
