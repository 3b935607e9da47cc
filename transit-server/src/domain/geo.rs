//! Geographic points and the two distance formulas used by the planner.
//!
//! Nearest-stop queries use a cheap planar approximation (degrees scaled by
//! a constant), while graph construction uses the great-circle distance.
//! The two do not agree exactly and are kept separate on purpose: walking
//! legs to and from the trip endpoints are priced with the planar figure,
//! transfer edges inside the graph with the haversine one.

use std::fmt;

/// Metres per degree used by the planar approximation.
pub const METRES_PER_DEGREE: f64 = 111_000.0;

/// Mean Earth radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A WGS-84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Returns true if both components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }

    /// Planar distance in metres: Euclidean distance in degree space scaled
    /// by [`METRES_PER_DEGREE`].
    ///
    /// # Examples
    ///
    /// ```
    /// use transit_server::domain::GeoPoint;
    ///
    /// let a = GeoPoint::new(0.0, 0.0);
    /// let b = GeoPoint::new(0.0, 0.001);
    /// assert!((a.planar_distance_m(&b) - 111.0).abs() < 1e-9);
    /// ```
    pub fn planar_distance_m(&self, other: &GeoPoint) -> f64 {
        let dlat = self.lat - other.lat;
        let dlon = self.lon - other.lon;
        (dlat * dlat + dlon * dlon).sqrt() * METRES_PER_DEGREE
    }

    /// Great-circle distance in metres.
    pub fn haversine_m(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let dlat = lat2 - lat1;
        let dlon = (other.lon - self.lon).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * a.sqrt().asin() * EARTH_RADIUS_M
    }

    /// Returns `[lat, lon]`, the layout used by polylines and the R-tree.
    pub fn to_array(self) -> [f64; 2] {
        [self.lat, self.lon]
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}
