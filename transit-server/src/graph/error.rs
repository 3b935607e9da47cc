//! Graph construction and loading errors.
//!
//! All of these are fatal at server start: a graph that fails to load or
//! validate is never served.

use crate::domain::StopId;

/// Errors raised while building, loading or saving a transit graph.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Two stops share an id
    #[error("duplicate stop id {0}")]
    DuplicateStop(StopId),

    /// An edge endpoint does not name a known stop
    #[error("edge {from} -> {to} references unknown stop {missing}")]
    UnknownStop {
        from: StopId,
        to: StopId,
        missing: StopId,
    },

    /// A schedule or travel time is not a finite, non-negative number
    #[error("edge {from} -> {to} has an invalid schedule or travel time: {reason}")]
    InvalidEdge {
        from: StopId,
        to: StopId,
        reason: &'static str,
    },

    /// Timetable synthesis parameters are unusable
    #[error("invalid synthesis config: {0}")]
    InvalidSynthConfig(&'static str),

    /// Reading or writing the snapshot file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot is not valid JSON for the expected shape
    #[error("snapshot JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The stop-name CSV could not be read
    #[error("stop names CSV error: {0}")]
    Csv(#[from] csv::Error),
}
