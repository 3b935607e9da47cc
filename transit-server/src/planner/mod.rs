//! Door-to-door trip planner.
//!
//! This module answers: "I am standing here at this time - how do I get
//! there by bus and on foot?"
//!
//! Three pieces do the work. The spatial index proposes candidate stops near
//! each endpoint, the [`Router`] runs a time-dependent earliest-arrival search
//! between them, and the [`ItineraryBuilder`] merges the winning edge path
//! into walk and bus segments a rider can follow.

mod config;
mod error;
mod itinerary;
mod router;
mod trip;

#[cfg(test)]
mod trip_tests;

pub use config::{CandidateStrategy, PlannerConfig};
pub use error::{PlanError, RouteError};
pub use itinerary::{
    BusSegment, Itinerary, ItineraryBuilder, ItinerarySegment, Place, WalkRole, WalkSegment,
    Walkway,
};
pub use router::{PathLeg, RoutedPath, Router, SearchOutcome};
pub use trip::TripPlanner;
