//! The multimodal transit graph: construction, validation, persistence and
//! the offline passes that turn a bare link network into a timetabled one.

mod error;
mod names;
mod snapshot;
mod synth;
mod transfers;
mod transit_graph;

pub use error::GraphError;
pub use names::StopNames;
pub use snapshot::{
    RawStopId, Snapshot, SnapshotEdge, SnapshotKind, SnapshotStop, WALK_ROUTE_SENTINEL,
    load_snapshot, save_snapshot,
};
pub use synth::{RoutePattern, ScheduleSynth, SynthConfig, random_network};
pub use transfers::{TransferConfig, add_walk_transfers};
pub use transit_graph::{EdgeIdx, GraphBuilder, StopIdx, TransitGraph};
