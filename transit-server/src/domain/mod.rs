//! Domain types for the trip planner.
//!
//! Stops, edges, schedules, service-day times and geographic points. These
//! types are plain data: the graph, router and itinerary builder give them
//! behaviour.

mod edge;
mod geo;
mod stop;
mod time;

pub use edge::{Edge, EdgeKind, Schedule};
pub use geo::{EARTH_RADIUS_M, GeoPoint, METRES_PER_DEGREE};
pub use stop::{Stop, StopId};
pub use time::{ServiceTime, TimeError};
