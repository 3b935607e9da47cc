use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use transit_server::config::ServerConfig;
use transit_server::graph::load_snapshot;
use transit_server::planner::{PlannerConfig, TripPlanner};
use transit_server::web::{AppState, create_router};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("transit_server=info,tower_http=info")),
        )
        .init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Without a graph there is nothing to serve.
    let graph = match load_snapshot(&config.graph_path) {
        Ok(graph) => graph,
        Err(e) => {
            error!(path = %config.graph_path.display(), "failed to load graph: {e}");
            return ExitCode::FAILURE;
        }
    };

    let planner = TripPlanner::new(Arc::new(graph), PlannerConfig::default());
    let state = AppState::new(planner, config.stops_limit);
    let app = create_router(state);

    let listener = match tokio::net::TcpListener::bind(config.addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(addr = %config.addr, "failed to bind: {e}");
            return ExitCode::FAILURE;
        }
    };

    info!(addr = %config.addr, "transit planner listening");
    info!("  GET  /health");
    info!("  GET  /get_all_stops");
    info!("  GET  /nearest_stops?lat=..&lon=..&k=..");
    info!("  POST /find_route");

    if let Err(e) = axum::serve(listener, app).await {
        error!("server error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
