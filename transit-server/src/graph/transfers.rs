//! Walking transfers between nearby stops.
//!
//! Stops close enough to walk between get a pair of walk edges, enabling
//! interchanges that no bus route provides. Distances here are great-circle
//! distances; this is the graph-construction side of the two distance
//! formulas described in [`crate::domain`].

use tracing::info;

use crate::domain::Edge;
use crate::spatial::StopIndex;

use super::error::GraphError;
use super::transit_graph::GraphBuilder;

/// Parameters for generating walk transfer edges.
#[derive(Debug, Clone)]
pub struct TransferConfig {
    /// Maximum straight-line walking distance, in metres.
    pub max_walk_m: f64,

    /// Walking speed, in metres per second.
    pub walk_speed_mps: f64,
}

impl TransferConfig {
    pub fn new(max_walk_m: f64, walk_speed_mps: f64) -> Self {
        Self {
            max_walk_m,
            walk_speed_mps,
        }
    }

    /// Walking time in minutes for a distance in metres.
    pub fn walk_minutes(&self, distance_m: f64) -> f64 {
        distance_m / self.walk_speed_mps / 60.0
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            max_walk_m: 300.0,
            walk_speed_mps: 1.3,
        }
    }
}

/// Add a walk edge from every positioned stop to every other stop within
/// `max_walk_m`. Returns the number of edges added.
///
/// Both directions are produced because the radius query is run from each
/// stop in turn.
pub fn add_walk_transfers(
    builder: &mut GraphBuilder,
    config: &TransferConfig,
) -> Result<usize, GraphError> {
    let index = StopIndex::new(builder.stops());

    let mut transfers = Vec::new();
    for stop in builder.stops() {
        let Some(pos) = stop.position else {
            continue;
        };
        for hit in index.within_radius(pos, config.max_walk_m) {
            if hit.id == stop.id {
                continue;
            }
            transfers.push(Edge::walk(
                stop.id.clone(),
                hit.id,
                config.walk_minutes(hit.distance_m),
                hit.distance_m,
            ));
        }
    }

    let added = transfers.len();
    for edge in transfers {
        builder.add_edge(edge)?;
    }
    info!(added, max_walk_m = config.max_walk_m, "added walk transfer edges");
    Ok(added)
}
