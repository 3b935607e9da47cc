//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::{GeoPoint, Stop};
use crate::planner::{BusSegment, Itinerary, ItinerarySegment, WalkRole, WalkSegment};
use crate::spatial::StopDistance;

/// Departure time used when a route request leaves it out.
pub const DEFAULT_DEPARTURE: &str = "08:00";

/// Number of nearest stops returned when the query leaves `k` out.
pub const DEFAULT_NEAREST: usize = 3;

/// Upper bound on `k` for the nearest-stop query.
pub const MAX_NEAREST: usize = 50;

/// A coordinate in a request body.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PointRequest {
    pub lat: f64,
    pub lon: f64,
}

impl From<PointRequest> for GeoPoint {
    fn from(p: PointRequest) -> Self {
        GeoPoint::new(p.lat, p.lon)
    }
}

/// Request to plan a trip.
#[derive(Debug, Deserialize)]
pub struct FindRouteRequest {
    /// Where the rider starts
    pub start: PointRequest,

    /// Where the rider wants to go
    pub end: PointRequest,

    /// Departure time in HH:MM format (defaults to 08:00)
    pub time: Option<String>,
}

/// Query for the stops nearest to a point.
#[derive(Debug, Deserialize)]
pub struct NearestStopsQuery {
    pub lat: f64,
    pub lon: f64,

    /// How many stops to return (defaults to 3, at most 50)
    pub k: Option<usize>,
}

impl NearestStopsQuery {
    pub fn limit(&self) -> usize {
        self.k.unwrap_or(DEFAULT_NEAREST).min(MAX_NEAREST)
    }
}

/// A stop in the stop listing.
#[derive(Debug, Serialize)]
pub struct StopResult {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    pub name: Option<String>,
}

impl StopResult {
    /// Stops without coordinates are not listed.
    pub fn from_stop(stop: &Stop) -> Option<Self> {
        let pos = stop.position?;
        Some(Self {
            id: stop.id.to_string(),
            lat: pos.lat,
            lon: pos.lon,
            name: stop.name.clone(),
        })
    }
}

/// A stop near a query point.
#[derive(Debug, Serialize)]
pub struct NearestStopResult {
    pub stop_id: String,
    pub name: String,
    pub distance_m: f64,
}

impl NearestStopResult {
    pub fn new(found: &StopDistance, stop: &Stop) -> Self {
        Self {
            stop_id: found.id.to_string(),
            name: stop.display_name(),
            distance_m: found.distance_m,
        }
    }
}

/// One step of a planned trip, ready for display.
#[derive(Debug, Serialize)]
pub struct SegmentView {
    /// `walk`, `transfer` or `bus`
    #[serde(rename = "type")]
    pub kind: &'static str,

    /// Short title
    pub desc: String,

    /// Detail line; may contain `<b>` markup
    pub sub: String,

    /// Polyline as `[lat, lon]` pairs
    pub coords: Vec<[f64; 2]>,
}

impl SegmentView {
    pub fn from_segment(segment: &ItinerarySegment) -> Self {
        match segment {
            ItinerarySegment::Walk(walk) => Self::from_walk(walk),
            ItinerarySegment::Bus(bus) => Self::from_bus(bus),
        }
    }

    fn from_walk(walk: &WalkSegment) -> Self {
        let minutes = walk.duration_mins.trunc() as i64;
        let (kind, desc, sub) = match walk.role() {
            WalkRole::Depart => (
                "walk",
                "Depart".to_string(),
                format!("Walk to <b>{}</b> in {} min", walk.to.name(), minutes),
            ),
            WalkRole::Arrive => (
                "walk",
                "Arrive".to_string(),
                format!(
                    "Walk to the destination in {} min (arriving at {})",
                    minutes, walk.arrives
                ),
            ),
            WalkRole::Transfer => (
                "transfer",
                format!("Transfer at {}", walk.from.name()),
                format!("Walk to <b>{}</b> in {} min", walk.to.name(), minutes),
            ),
        };
        Self {
            kind,
            desc,
            sub,
            coords: coords(&walk.polyline),
        }
    }

    fn from_bus(bus: &BusSegment) -> Self {
        Self {
            kind: "bus",
            desc: match &bus.route_id {
                Some(route) => format!("Bus {route}"),
                None => "Bus".to_string(),
            },
            sub: format!(
                "Board at {} · alight at {} at <b>{}</b>",
                bus.boards,
                bus.alights,
                bus.to.name()
            ),
            coords: coords(&bus.polyline),
        }
    }
}

fn coords(polyline: &[GeoPoint]) -> Vec<[f64; 2]> {
    polyline.iter().map(|p| p.to_array()).collect()
}

/// Successful response to a route request.
#[derive(Debug, Serialize)]
pub struct FindRouteResponse {
    pub status: &'static str,

    /// Whole minutes from departure to arrival
    pub total_duration: i64,

    /// Arrival clock time, HH:MM
    pub arrival_time: String,

    pub segments: Vec<SegmentView>,
}

impl FindRouteResponse {
    pub fn from_itinerary(itinerary: &Itinerary) -> Self {
        Self {
            status: "success",
            total_duration: itinerary.total_duration_mins,
            arrival_time: itinerary.arrival.to_string(),
            segments: itinerary
                .segments
                .iter()
                .map(SegmentView::from_segment)
                .collect(),
        }
    }
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: message.into(),
        }
    }
}
