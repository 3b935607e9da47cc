//! Trip planner configuration.

use crate::domain::{Edge, ServiceTime};

/// How origin/destination candidate stops are combined into a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CandidateStrategy {
    /// Run one stop-to-stop search per (origin stop, destination stop) pair
    /// and keep the pair with the earliest finish. Pairs whose two stops are
    /// the same are skipped.
    #[default]
    PairSweep,

    /// Run a single search seeded from every origin stop (at its access-walk
    /// arrival time) towards a virtual sink reachable from every destination
    /// stop via its egress walk.
    VirtualEndpoints,
}

/// Configuration parameters for trip planning.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Number of nearest stops considered around each endpoint.
    pub candidate_count: usize,

    /// Walking speed for access and egress legs, in metres per second.
    pub walk_speed_mps: f64,

    /// Hour-of-day windows (inclusive) in which bus travel is slowed.
    pub rush_windows: Vec<(f64, f64)>,

    /// Factor applied to bus travel time inside a rush window.
    pub rush_multiplier: f64,

    /// Maximum number of queue pops per search before giving up.
    pub max_settled: usize,

    pub strategy: CandidateStrategy,
}

impl PlannerConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(
        candidate_count: usize,
        walk_speed_mps: f64,
        rush_windows: Vec<(f64, f64)>,
        rush_multiplier: f64,
        max_settled: usize,
        strategy: CandidateStrategy,
    ) -> Self {
        Self {
            candidate_count,
            walk_speed_mps,
            rush_windows,
            rush_multiplier,
            max_settled,
            strategy,
        }
    }

    /// Same configuration with a different candidate strategy.
    pub fn with_strategy(mut self, strategy: CandidateStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// True if the hour of day of `t` falls inside a rush window.
    pub fn is_rush_hour(&self, t: ServiceTime) -> bool {
        let hour = t.hour_of_day();
        self.rush_windows
            .iter()
            .any(|&(start, end)| start <= hour && hour <= end)
    }

    /// Travel time in hours along `edge` for a rider at its tail at `t`.
    ///
    /// The rush penalty depends on when the rider reaches the stop, not on
    /// when the bus leaves. Walks are never penalised.
    pub fn travel_hours(&self, edge: &Edge, t: ServiceTime) -> f64 {
        let base = edge.base_travel_hours();
        if edge.is_bus() && self.is_rush_hour(t) {
            base * self.rush_multiplier
        } else {
            base
        }
    }

    /// Walking time in minutes for a straight-line distance in metres.
    pub fn walk_minutes(&self, distance_m: f64) -> f64 {
        distance_m / self.walk_speed_mps / 60.0
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            candidate_count: 3,
            walk_speed_mps: 1.3,
            rush_windows: vec![(7.0, 9.0), (17.0, 19.0)],
            rush_multiplier: 2.0,
            max_settled: 2_000_000,
            strategy: CandidateStrategy::PairSweep,
        }
    }
}
