//! Web layer for the trip planner.
//!
//! Provides HTTP endpoints for listing stops, finding nearby stops and
//! planning door-to-door trips.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
