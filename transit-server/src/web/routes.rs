//! HTTP route handlers.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::domain::GeoPoint;
use crate::planner::PlanError;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/get_all_stops", get(get_all_stops))
        .route("/nearest_stops", get(nearest_stops))
        .route("/find_route", post(find_route))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// List positioned stops, up to the configured limit.
async fn get_all_stops(State(state): State<AppState>) -> Json<Vec<StopResult>> {
    let stops = state
        .planner
        .graph()
        .stops()
        .iter()
        .filter_map(StopResult::from_stop)
        .take(state.stops_limit)
        .collect();
    Json(stops)
}

/// Stops closest to a point.
async fn nearest_stops(
    State(state): State<AppState>,
    Query(query): Query<NearestStopsQuery>,
) -> Result<Json<Vec<NearestStopResult>>, AppError> {
    if !GeoPoint::new(query.lat, query.lon).is_finite() {
        return Err(AppError::BadRequest {
            message: "lat and lon must be finite numbers".to_string(),
        });
    }

    let graph = state.planner.graph();
    let found = state
        .planner
        .nearest_stops(query.lat, query.lon, query.limit())
        .iter()
        .map(|s| NearestStopResult::new(s, graph.stop(s.stop)))
        .collect();
    Ok(Json(found))
}

/// Plan a door-to-door trip.
///
/// The search is CPU-bound, so it runs on the blocking pool.
async fn find_route(
    State(state): State<AppState>,
    payload: Result<Json<FindRouteRequest>, JsonRejection>,
) -> Result<Json<FindRouteResponse>, AppError> {
    let Json(req) = payload.map_err(|e| AppError::BadRequest {
        message: e.body_text(),
    })?;
    let time = req
        .time
        .unwrap_or_else(|| DEFAULT_DEPARTURE.to_string());
    let origin = GeoPoint::from(req.start);
    let destination = GeoPoint::from(req.end);

    let planner = Arc::clone(&state.planner);
    let itinerary =
        tokio::task::spawn_blocking(move || planner.plan_trip(origin, destination, &time))
            .await
            .map_err(|e| AppError::Internal {
                message: format!("planner task failed: {e}"),
            })??;

    Ok(Json(FindRouteResponse::from_itinerary(&itinerary)))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl From<PlanError> for AppError {
    fn from(e: PlanError) -> Self {
        match e {
            PlanError::NoStopsFound | PlanError::NoPathFound => AppError::NotFound {
                message: e.to_string(),
            },
            PlanError::MalformedInput(_) => AppError::BadRequest {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            warn!(%status, %message, "request rejected");
        }

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}
