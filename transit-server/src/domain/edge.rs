//! Directed graph edges: scheduled bus hops and always-open walks.

use std::fmt;

use super::{ServiceTime, StopId};

/// Travel mode of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    Bus,
    Walk,
}

impl EdgeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EdgeKind::Bus => "bus",
            EdgeKind::Walk => "walk",
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ascending departure times of a bus edge.
///
/// # Examples
///
/// ```
/// use transit_server::domain::{Schedule, ServiceTime};
///
/// let schedule = Schedule::from_hours(&[8.5, 8.0, 8.25]);
/// let next = schedule.next_departure(ServiceTime::from_hours(8.1)).unwrap();
/// assert_eq!(next.hours(), 8.25);
/// assert!(schedule.next_departure(ServiceTime::from_hours(9.0)).is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schedule {
    departures: Vec<ServiceTime>,
}

impl Schedule {
    /// Build a schedule, sorting the departures.
    pub fn new(mut departures: Vec<ServiceTime>) -> Self {
        departures.sort();
        Self { departures }
    }

    pub fn from_hours(hours: &[f64]) -> Self {
        Self::new(hours.iter().copied().map(ServiceTime::from_hours).collect())
    }

    /// First departure at or after `t`, or `None` once the last trip has left.
    pub fn next_departure(&self, t: ServiceTime) -> Option<ServiceTime> {
        let idx = self.departures.partition_point(|dep| *dep < t);
        self.departures.get(idx).copied()
    }

    pub fn departures(&self) -> &[ServiceTime] {
        &self.departures
    }

    pub fn len(&self) -> usize {
        self.departures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.departures.is_empty()
    }

    /// True if every departure is a finite number.
    pub fn is_finite(&self) -> bool {
        self.departures.iter().all(|d| d.hours().is_finite())
    }
}

/// A directed edge between two stops.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub from: StopId,
    pub to: StopId,
    pub kind: EdgeKind,
    /// Route identifier; `None` for walks.
    pub route_id: Option<String>,
    /// Departures for bus edges; walks have none.
    pub schedule: Option<Schedule>,
    /// Nominal traversal time outside rush hour, in minutes.
    pub base_travel_mins: f64,
    /// Length in metres.
    pub distance_m: f64,
}

impl Edge {
    /// A scheduled bus hop.
    pub fn bus(
        from: impl Into<StopId>,
        to: impl Into<StopId>,
        route_id: impl Into<String>,
        schedule: Schedule,
        base_travel_mins: f64,
        distance_m: f64,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind: EdgeKind::Bus,
            route_id: Some(route_id.into()),
            schedule: Some(schedule),
            base_travel_mins,
            distance_m,
        }
    }

    /// An always-open walking transfer.
    pub fn walk(
        from: impl Into<StopId>,
        to: impl Into<StopId>,
        base_travel_mins: f64,
        distance_m: f64,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind: EdgeKind::Walk,
            route_id: None,
            schedule: None,
            base_travel_mins,
            distance_m,
        }
    }

    pub fn is_bus(&self) -> bool {
        self.kind == EdgeKind::Bus
    }

    pub fn is_walk(&self) -> bool {
        self.kind == EdgeKind::Walk
    }

    /// Nominal travel time in hours.
    pub fn base_travel_hours(&self) -> f64 {
        self.base_travel_mins / 60.0
    }

    /// When a rider standing at the tail at `t` can leave along this edge.
    ///
    /// Walks leave immediately. Buses leave at the next scheduled departure;
    /// `None` means the last trip has already gone (or the edge has no
    /// schedule at all) and the edge is unusable at `t`.
    pub fn departure_at_or_after(&self, t: ServiceTime) -> Option<ServiceTime> {
        match self.kind {
            EdgeKind::Walk => Some(t),
            EdgeKind::Bus => self.schedule.as_ref()?.next_departure(t),
        }
    }
}
