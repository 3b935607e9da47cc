//! Spatial lookups over stop coordinates.

mod index;

pub use index::{StopDistance, StopIndex};
