//! Stop identifiers and stops.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::GeoPoint;

/// Opaque, unique key of a stop.
///
/// Snapshot files may carry numeric ids (as produced by network extracts)
/// or strings; both are normalised to their string form.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StopId(String);

impl StopId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StopId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for StopId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<u64> for StopId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl fmt::Debug for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopId({})", self.0)
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A bus stop.
///
/// Stops without a position are legal graph nodes but are invisible to the
/// nearest-stop index.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    pub id: StopId,
    pub position: Option<GeoPoint>,
    pub name: Option<String>,
}

impl Stop {
    pub fn new(id: StopId, position: Option<GeoPoint>, name: Option<String>) -> Self {
        Self { id, position, name }
    }

    /// Convenience constructor for a positioned stop without a name.
    pub fn at(id: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self::new(StopId::new(id), Some(GeoPoint::new(lat, lon)), None)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The name shown to riders, falling back to a generated placeholder.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("Stop {}", self.id),
        }
    }
}
