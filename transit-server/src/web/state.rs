//! Application state for the web layer.

use std::sync::Arc;

use crate::planner::TripPlanner;

/// Shared application state.
///
/// Cloned into every handler; the planner itself is shared behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Trip planner over the loaded graph
    pub planner: Arc<TripPlanner>,

    /// Maximum number of stops returned by the stop listing
    pub stops_limit: usize,
}

impl AppState {
    /// Create a new app state.
    pub fn new(planner: TripPlanner, stops_limit: usize) -> Self {
        Self {
            planner: Arc::new(planner),
            stops_limit,
        }
    }
}
