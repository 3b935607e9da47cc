//! Planner outcomes that are not an itinerary.

use crate::domain::TimeError;
use crate::graph::StopIdx;

/// Error from a stop-to-stop search.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// A source or target index is outside the graph
    #[error("stop index {0:?} is not in the graph")]
    UnknownStop(StopIdx),

    /// The queue emptied without reaching any target
    #[error("no path to the target")]
    NoPath,

    /// The search popped more states than allowed
    #[error("search gave up after {budget} queue pops")]
    BudgetExhausted { budget: usize },
}

/// Error from planning a door-to-door trip.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    /// No positioned stop exists near one of the endpoints
    #[error("no stops found")]
    NoStopsFound,

    /// Every candidate combination failed, e.g. because the last bus has left
    #[error("no route found (the last bus may have left)")]
    NoPathFound,

    /// The request was rejected before any search began
    #[error("malformed input: {0}")]
    MalformedInput(String),
}

impl From<TimeError> for PlanError {
    fn from(err: TimeError) -> Self {
        PlanError::MalformedInput(err.to_string())
    }
}
