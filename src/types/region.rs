//! Administrative regions and the spatial index used to find candidate regions for a point.

use geo::{BoundingRect, MultiPolygon};
use rstar::{RTree, RTreeObject, AABB};
use serde_json::{Map, Value};

/// One administrative polygon (province, district, ...) in geographic coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Unique identifier, taken from the configured name property of the boundary file.
    pub id: String,
    /// Boundary in longitude/latitude degrees (x = longitude, y = latitude).
    pub geometry: MultiPolygon<f64>,
    /// Remaining properties of the source feature.
    pub properties: Map<String, Value>,
}

impl Region {
    pub fn new(id: impl Into<String>, geometry: MultiPolygon<f64>) -> Self {
        Self {
            id: id.into(),
            geometry,
            properties: Map::new(),
        }
    }
}

/// Bounding box of a region, stored in the R-tree together with the region's position
/// in load order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RegionEnvelope {
    pub(crate) index: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for RegionEnvelope {
    /// Axis aligned box in `[longitude, latitude]` order, matching the geo coordinate order.
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// The full, ordered list of regions plus an R-tree over their bounding boxes.
///
/// Load order is significant: it is the order regions are reported in and the tie-break
/// when a point lies inside more than one region.
#[derive(Debug, Clone)]
pub struct RegionSet {
    regions: Vec<Region>,
    index: RTree<RegionEnvelope>,
}

impl RegionSet {
    pub fn new(regions: Vec<Region>) -> Self {
        let envelopes = regions
            .iter()
            .enumerate()
            .filter_map(|(index, region)| {
                // Empty geometries have no bounding box and can never contain a point.
                let rect = region.geometry.bounding_rect()?;
                Some(RegionEnvelope {
                    index,
                    envelope: AABB::from_corners(
                        [rect.min().x, rect.min().y],
                        [rect.max().x, rect.max().y],
                    ),
                })
            })
            .collect();
        Self {
            regions,
            index: RTree::bulk_load(envelopes),
        }
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Region> {
        self.regions.get(index)
    }

    /// Indices of all regions whose bounding box covers the given point, in no particular order.
    pub(crate) fn candidates(
        &self,
        longitude: f64,
        latitude: f64,
    ) -> impl Iterator<Item = usize> + '_ {
        self.index
            .locate_in_envelope_intersecting(&AABB::from_point([longitude, latitude]))
            .map(|envelope| envelope.index)
    }
}
