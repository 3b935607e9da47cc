//! Nearest-stop and radius lookups over stop coordinates.
//!
//! Two queries, two distance formulas:
//!
//! - [`StopIndex::nearest`] answers "k closest stops to this point" with the
//!   planar approximation. It is a linear scan followed by a stable sort, so
//!   equidistant stops come back in stop insertion order. That order is part
//!   of the contract: the trip planner's candidate sweep depends on it.
//! - [`StopIndex::within_radius`] answers "every stop within R metres" with
//!   the haversine distance. An R-tree over `[lat, lon]` prunes candidates by
//!   bounding box before the exact check. Only graph construction uses it.

use rstar::{AABB, RTree, RTreeObject};

use crate::domain::{GeoPoint, Stop, StopId};
use crate::graph::StopIdx;

/// A stop together with its distance from a query point.
#[derive(Debug, Clone, PartialEq)]
pub struct StopDistance {
    pub stop: StopIdx,
    pub id: StopId,
    pub distance_m: f64,
}

/// R-tree entry: a stop position in degree space.
#[derive(Debug, Clone)]
struct IndexedStop {
    point: [f64; 2],
    stop: StopIdx,
}

impl RTreeObject for IndexedStop {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

/// Spatial index over the positioned stops of a graph.
///
/// Built once from a stop slice and read-only afterwards.
pub struct StopIndex {
    /// Positioned stops in insertion order.
    entries: Vec<(StopIdx, StopId, GeoPoint)>,
    tree: RTree<IndexedStop>,
}

impl StopIndex {
    /// Index every stop that carries a position. `stops[i]` gets `StopIdx(i)`.
    pub fn new(stops: &[Stop]) -> Self {
        let entries: Vec<(StopIdx, StopId, GeoPoint)> = stops
            .iter()
            .enumerate()
            .filter_map(|(i, stop)| {
                let pos = stop.position.filter(GeoPoint::is_finite)?;
                Some((StopIdx(i as u32), stop.id.clone(), pos))
            })
            .collect();

        let tree = RTree::bulk_load(
            entries
                .iter()
                .map(|(stop, _, pos)| IndexedStop {
                    point: pos.to_array(),
                    stop: *stop,
                })
                .collect(),
        );

        Self { entries, tree }
    }

    /// Number of positioned stops.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Up to `k` stops closest to `point`, ascending by planar distance.
    ///
    /// Returns an empty vector when no stop has coordinates.
    pub fn nearest(&self, point: GeoPoint, k: usize) -> Vec<StopDistance> {
        if k == 0 {
            return Vec::new();
        }
        let mut candidates: Vec<StopDistance> = self
            .entries
            .iter()
            .map(|(stop, id, pos)| StopDistance {
                stop: *stop,
                id: id.clone(),
                distance_m: pos.planar_distance_m(&point),
            })
            .collect();
        // `sort_by` is stable: ties keep insertion order.
        candidates.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));
        candidates.truncate(k);
        candidates
    }

    /// Every stop within `radius_m` great-circle metres of `point`, ordered by
    /// stop index. The query point's own stop (distance 0) is included.
    pub fn within_radius(&self, point: GeoPoint, radius_m: f64) -> Vec<StopDistance> {
        if radius_m.is_nan() || radius_m < 0.0 {
            return Vec::new();
        }
        let mut hits: Vec<StopDistance> = bounding_boxes(point, radius_m)
            .iter()
            .flat_map(|envelope| self.tree.locate_in_envelope_intersecting(envelope))
            .filter_map(|entry| {
                let pos = GeoPoint::new(entry.point[0], entry.point[1]);
                let distance_m = point.haversine_m(&pos);
                (distance_m <= radius_m).then(|| StopDistance {
                    stop: entry.stop,
                    id: self.id_of(entry.stop),
                    distance_m,
                })
            })
            .collect();
        hits.sort_by_key(|hit| hit.stop);
        hits.dedup_by_key(|hit| hit.stop);
        hits
    }

    fn id_of(&self, stop: StopIdx) -> StopId {
        // Entries are in ascending StopIdx order.
        let pos = self.entries.partition_point(|(idx, _, _)| *idx < stop);
        self.entries[pos].1.clone()
    }
}

/// Degree-space boxes that together contain every point within `radius_m`
/// of `center`.
///
/// Padded by 10% so points on the rim are never cut off by the flat-earth
/// approximation of the box. A box reaching past +-180 degrees of longitude
/// gets a second box for the part that wraps onto the other side.
fn bounding_boxes(center: GeoPoint, radius_m: f64) -> Vec<AABB<[f64; 2]>> {
    let metres_per_deg_lat = crate::domain::EARTH_RADIUS_M.to_radians();
    let dlat = radius_m / metres_per_deg_lat * 1.1;
    let cos_lat = center.lat.to_radians().cos().abs().max(1e-6);
    let dlon = (radius_m / (metres_per_deg_lat * cos_lat) * 1.1).min(180.0);
    let (lat_lo, lat_hi) = (center.lat - dlat, center.lat + dlat);
    let (lon_lo, lon_hi) = (center.lon - dlon, center.lon + dlon);

    let mut boxes = vec![AABB::from_corners([lat_lo, lon_lo], [lat_hi, lon_hi])];
    if lon_lo < -180.0 {
        boxes.push(AABB::from_corners([lat_lo, lon_lo + 360.0], [lat_hi, 180.0]));
    }
    if lon_hi > 180.0 {
        boxes.push(AABB::from_corners([lat_lo, -180.0], [lat_hi, lon_hi - 360.0]));
    }
    boxes
}
