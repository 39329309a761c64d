//! Point-in-polygon counting of observations per region.

use crate::types::observation::Observation;
use crate::types::region::RegionSet;
use geo::{Contains, Point};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionCount {
    pub id: String,
    pub count: u64,
}

/// Heat spot count of every region, in region load order.
///
/// Regions without any matching observation are present with a count of zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionCounts {
    entries: Vec<RegionCount>,
    /// Observations that lie inside no region.
    unassigned: u64,
}

impl RegionCounts {
    pub fn entries(&self) -> &[RegionCount] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegionCount> {
        self.entries.iter()
    }

    pub fn get(&self, id: &str) -> Option<u64> {
        self.entries.iter().find(|e| e.id == id).map(|e| e.count)
    }

    pub fn unassigned(&self) -> u64 {
        self.unassigned
    }

    /// Sum over all regions. Never larger than the number of aggregated observations.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|e| e.count).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_map(&self) -> BTreeMap<String, u64> {
        self.entries
            .iter()
            .map(|e| (e.id.clone(), e.count))
            .collect()
    }
}

/// Counts the observations strictly inside each region.
///
/// A point on a region boundary is not inside that region. A point inside several
/// overlapping regions is counted once, for the region loaded first.
pub fn aggregate(observations: &[Observation], regions: &RegionSet) -> RegionCounts {
    let mut counts = vec![0u64; regions.len()];
    let mut unassigned = 0;

    for observation in observations {
        match containing_region(observation, regions) {
            Some(index) => counts[index] += 1,
            None => unassigned += 1,
        }
    }

    RegionCounts {
        entries: regions
            .regions()
            .iter()
            .zip(counts)
            .map(|(region, count)| RegionCount {
                id: region.id.clone(),
                count,
            })
            .collect(),
        unassigned,
    }
}

/// Load-order position of the first region containing the observation.
fn containing_region(observation: &Observation, regions: &RegionSet) -> Option<usize> {
    let point = Point::new(observation.longitude, observation.latitude);
    regions
        .candidates(observation.longitude, observation.latitude)
        .filter(|&index| {
            regions
                .get(index)
                .is_some_and(|region| region.geometry.contains(&point))
        })
        .min()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::region::Region;
    use chrono::NaiveDate;
    use geo::{polygon, MultiPolygon};

    fn square(x0: f64, y0: f64, size: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![polygon![
            (x: x0, y: y0),
            (x: x0 + size, y: y0),
            (x: x0 + size, y: y0 + size),
            (x: x0, y: y0 + size),
            (x: x0, y: y0),
        ]])
    }

    fn at(longitude: f64, latitude: f64) -> Observation {
        Observation::new(
            latitude,
            longitude,
            300.0,
            NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
        )
    }

    fn regions() -> RegionSet {
        RegionSet::new(vec![
            Region::new("A", square(0.0, 0.0, 1.0)),
            Region::new("B", square(2.0, 0.0, 1.0)),
            Region::new("C", square(10.0, 10.0, 1.0)),
        ])
    }

    #[test]
    fn test_counts_and_zero_regions() {
        let observations = [at(0.5, 0.5), at(0.25, 0.75), at(2.5, 0.5), at(5.0, 5.0)];
        let counts = aggregate(&observations, &regions());

        assert_eq!(counts.get("A"), Some(2));
        assert_eq!(counts.get("B"), Some(1));
        assert_eq!(counts.get("C"), Some(0));
        assert_eq!(counts.unassigned(), 1);
        assert_eq!(counts.len(), 3);
        assert!(counts.total() <= observations.len() as u64);
        assert_eq!(counts.total() + counts.unassigned(), observations.len() as u64);
    }

    #[test]
    fn test_total_equals_input_when_all_points_inside() {
        let observations: Vec<_> = (1..10)
            .map(|i| at(i as f64 / 10.0, 0.5))
            .chain((1..5).map(|i| at(2.0 + i as f64 / 10.0, 0.5)))
            .collect();
        let counts = aggregate(&observations, &regions());
        assert_eq!(counts.total(), observations.len() as u64);
        assert_eq!(counts.unassigned(), 0);
    }

    #[test]
    fn test_boundary_points_are_unassigned() {
        let observations = [at(0.0, 0.5), at(1.0, 1.0), at(0.5, 0.0)];
        let counts = aggregate(&observations, &regions());
        assert_eq!(counts.get("A"), Some(0));
        assert_eq!(counts.unassigned(), 3);
    }

    #[test]
    fn test_overlap_counts_once_for_first_region() {
        let overlapping = RegionSet::new(vec![
            Region::new("outer", square(0.0, 0.0, 4.0)),
            Region::new("inner", square(1.0, 1.0, 1.0)),
        ]);
        let counts = aggregate(&[at(1.5, 1.5), at(3.5, 3.5)], &overlapping);
        assert_eq!(counts.get("outer"), Some(2));
        assert_eq!(counts.get("inner"), Some(0));

        let reversed = RegionSet::new(vec![
            Region::new("inner", square(1.0, 1.0, 1.0)),
            Region::new("outer", square(0.0, 0.0, 4.0)),
        ]);
        let counts = aggregate(&[at(1.5, 1.5), at(3.5, 3.5)], &reversed);
        assert_eq!(counts.get("inner"), Some(1));
        assert_eq!(counts.get("outer"), Some(1));
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let observations = [at(0.5, 0.5), at(2.5, 0.5), at(7.0, 7.0)];
        let set = regions();
        assert_eq!(aggregate(&observations, &set), aggregate(&observations, &set));
    }

    #[test]
    fn test_empty_input() {
        let counts = aggregate(&[], &regions());
        assert_eq!(
            counts.to_map(),
            BTreeMap::from([("A".into(), 0), ("B".into(), 0), ("C".into(), 0)])
        );
        assert_eq!(counts.unassigned(), 0);
    }
}
