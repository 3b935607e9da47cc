//! On-disk graph snapshot (JSON).
//!
//! The snapshot is the hand-off between the offline graph builder and the
//! server. Its shape:
//!
//! ```json
//! {
//!   "stops": [{ "id": "S1", "lat": 21.02, "lon": 105.85, "name": "Hoan Kiem" }],
//!   "edges": [{ "from": "S1", "to": "S2", "kind": "bus", "route_id": "07",
//!               "schedule": [5.1, 5.6], "base_travel_time": 3.2, "distance_m": 420.0 }]
//! }
//! ```
//!
//! Lenient on input: stop ids may be numbers, `kind` defaults to bus,
//! `base_travel_time` (minutes) defaults to 5, `distance_m` may be spelled
//! `weight`, and walk edges may carry the `"WALK"` route sentinel.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{Edge, EdgeKind, GeoPoint, Schedule, ServiceTime, Stop, StopId};

use super::error::GraphError;
use super::transit_graph::{GraphBuilder, TransitGraph};

/// Route id written for walk edges.
pub const WALK_ROUTE_SENTINEL: &str = "WALK";

const DEFAULT_TRAVEL_MINS: f64 = 5.0;

/// Serialized graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub stops: Vec<SnapshotStop>,
    #[serde(default)]
    pub edges: Vec<SnapshotEdge>,
}

/// A stop id as it appears in JSON: a string or a non-negative integer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawStopId {
    Int(u64),
    Text(String),
}

impl From<RawStopId> for StopId {
    fn from(raw: RawStopId) -> Self {
        match raw {
            RawStopId::Int(n) => StopId::from(n),
            RawStopId::Text(s) => StopId::from(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotStop {
    pub id: RawStopId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    #[serde(default, alias = "stop_name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotKind {
    #[default]
    Bus,
    Walk,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEdge {
    pub from: RawStopId,
    pub to: RawStopId,
    #[serde(default, alias = "type")]
    pub kind: SnapshotKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Vec<f64>>,
    #[serde(default = "default_travel_mins")]
    pub base_travel_time: f64,
    #[serde(default, alias = "weight")]
    pub distance_m: f64,
}

fn default_travel_mins() -> f64 {
    DEFAULT_TRAVEL_MINS
}

impl Snapshot {
    /// Parse a snapshot from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, GraphError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Write the snapshot as compact JSON.
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<(), GraphError> {
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    /// Capture a built graph.
    pub fn from_graph(graph: &TransitGraph) -> Self {
        let stops = graph.stops().iter().map(SnapshotStop::from_stop).collect();
        let edges = graph.edges().iter().map(SnapshotEdge::from_edge).collect();
        Self { stops, edges }
    }

    /// Validate the snapshot into a builder, ready for further offline passes
    /// or for [`GraphBuilder::build`].
    pub fn into_builder(self) -> Result<GraphBuilder, GraphError> {
        let mut builder = GraphBuilder::with_capacity(self.stops.len(), self.edges.len());
        for stop in self.stops {
            builder.add_stop(stop.into_stop())?;
        }
        for edge in self.edges {
            builder.add_edge(edge.into_edge())?;
        }
        Ok(builder)
    }

    pub fn into_graph(self) -> Result<TransitGraph, GraphError> {
        Ok(self.into_builder()?.build())
    }
}

impl SnapshotStop {
    fn from_stop(stop: &Stop) -> Self {
        Self {
            id: RawStopId::Text(stop.id.as_str().to_string()),
            lat: stop.position.map(|p| p.lat),
            lon: stop.position.map(|p| p.lon),
            name: stop.name.clone(),
        }
    }

    fn into_stop(self) -> Stop {
        let position = match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
            _ => None,
        };
        Stop::new(self.id.into(), position, self.name)
    }
}

impl SnapshotEdge {
    fn from_edge(edge: &Edge) -> Self {
        let (kind, route_id) = match edge.kind {
            EdgeKind::Bus => (SnapshotKind::Bus, edge.route_id.clone()),
            EdgeKind::Walk => (SnapshotKind::Walk, Some(WALK_ROUTE_SENTINEL.to_string())),
        };
        Self {
            from: RawStopId::Text(edge.from.as_str().to_string()),
            to: RawStopId::Text(edge.to.as_str().to_string()),
            kind,
            route_id,
            schedule: edge
                .schedule
                .as_ref()
                .map(|s| s.departures().iter().map(ServiceTime::hours).collect()),
            base_travel_time: edge.base_travel_mins,
            distance_m: edge.distance_m,
        }
    }

    fn into_edge(self) -> Edge {
        let (kind, route_id, schedule) = match self.kind {
            SnapshotKind::Bus => (
                EdgeKind::Bus,
                self.route_id,
                self.schedule.map(|hours| Schedule::from_hours(&hours)),
            ),
            SnapshotKind::Walk => (EdgeKind::Walk, None, None),
        };
        Edge {
            from: self.from.into(),
            to: self.to.into(),
            kind,
            route_id,
            schedule,
            base_travel_mins: self.base_travel_time,
            distance_m: self.distance_m,
        }
    }
}

/// Load and validate a graph snapshot from disk.
pub fn load_snapshot(path: impl AsRef<Path>) -> Result<TransitGraph, GraphError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let graph = Snapshot::from_reader(BufReader::new(file))?.into_graph()?;
    info!(
        path = %path.display(),
        stops = graph.stop_count(),
        edges = graph.edge_count(),
        "graph loaded"
    );
    Ok(graph)
}

/// Write a graph snapshot to disk.
pub fn save_snapshot(graph: &TransitGraph, path: impl AsRef<Path>) -> Result<(), GraphError> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    Snapshot::from_graph(graph).to_writer(&mut writer)?;
    writer.flush()?;
    info!(path = %path.display(), "graph saved");
    Ok(())
}
