//! Synthetic bus timetables for a network that only has link geometry.
//!
//! Each link becomes a bus edge. Links that share a route share its operating
//! pattern (last departure, peak and off-peak headway), but every link gets
//! its own random start offset, so departures along a route are not aligned.
//!
//! All randomness comes from a caller-supplied seed, so a given base network
//! and seed always synthesise the same timetable.

use std::collections::HashMap;

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::domain::{Edge, EdgeKind, Schedule, ServiceTime, Stop};

use super::error::GraphError;
use super::transit_graph::GraphBuilder;

/// Candidate last-departure hours and their weights.
const END_HOURS: [f64; 4] = [20.0, 21.0, 22.0, 22.5];
const END_HOUR_WEIGHTS: [f64; 4] = [0.1, 0.3, 0.5, 0.1];

/// Headways in hours (roughly 10/15 and 20/30 minutes).
const PEAK_HEADWAYS: [f64; 2] = [0.16, 0.25];
const OFF_PEAK_HEADWAYS: [f64; 2] = [0.33, 0.5];

/// Peak windows used when stepping the timetable, inclusive.
const PEAK_WINDOWS: [(f64, f64); 2] = [(7.0, 9.0), (16.5, 18.5)];

/// Operating pattern shared by every link of one route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoutePattern {
    /// Last departure may not be later than this hour.
    pub end_hour: f64,
    pub peak_headway: f64,
    pub off_peak_headway: f64,
}

impl RoutePattern {
    /// Departures from `start` until `end_hour`, stepping by the peak headway
    /// inside the peak windows and the off-peak headway outside them.
    pub fn departures_from(&self, start: f64) -> Vec<f64> {
        let mut departures = Vec::new();
        let mut t = start;
        while t <= self.end_hour {
            departures.push(t);
            let in_peak = PEAK_WINDOWS.iter().any(|&(lo, hi)| lo <= t && t <= hi);
            t += if in_peak {
                self.peak_headway
            } else {
                self.off_peak_headway
            };
        }
        departures
    }
}

/// Parameters for timetable synthesis.
#[derive(Debug, Clone)]
pub struct SynthConfig {
    /// First departure is `first_departure + U(0, start_jitter)`.
    pub first_departure: f64,
    pub start_jitter: f64,

    /// Cruising speed used to derive nominal travel time, in km/h.
    pub bus_speed_kmh: f64,

    /// Length assumed for links that carry no distance, in metres.
    pub default_link_m: f64,

    /// Route ids drawn for unlabelled links are `01..=route_pool`.
    pub route_pool: u32,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            first_departure: 5.0,
            start_jitter: 0.5,
            bus_speed_kmh: 25.0,
            default_link_m: 500.0,
            route_pool: 40,
        }
    }
}

impl SynthConfig {
    /// Nominal bus travel time in minutes for a link of `distance_m`.
    pub fn travel_minutes(&self, distance_m: f64) -> f64 {
        let metres_per_sec = self.bus_speed_kmh / 3.6;
        distance_m / metres_per_sec / 60.0
    }
}

/// Seeded timetable generator.
pub struct ScheduleSynth {
    config: SynthConfig,
    rng: SmallRng,
    end_hours: WeightedIndex<f64>,
    patterns: HashMap<String, RoutePattern>,
}

impl ScheduleSynth {
    pub fn new(config: SynthConfig, seed: u64) -> Result<Self, GraphError> {
        let end_hours = WeightedIndex::new(END_HOUR_WEIGHTS).map_err(|_| {
            GraphError::InvalidSynthConfig("end-hour weights must be positive")
        })?;
        if config.route_pool == 0 {
            return Err(GraphError::InvalidSynthConfig("route pool must not be empty"));
        }
        if config.bus_speed_kmh.is_nan() || config.bus_speed_kmh <= 0.0 {
            return Err(GraphError::InvalidSynthConfig("bus speed must be positive"));
        }
        if !config.start_jitter.is_finite() || config.start_jitter < 0.0 {
            return Err(GraphError::InvalidSynthConfig(
                "start jitter must be a finite, non-negative number of hours",
            ));
        }
        Ok(Self {
            config,
            rng: SmallRng::seed_from_u64(seed),
            end_hours,
            patterns: HashMap::new(),
        })
    }

    /// Patterns drawn so far, keyed by route id.
    pub fn patterns(&self) -> &HashMap<String, RoutePattern> {
        &self.patterns
    }

    /// Turn every edge into a scheduled bus edge. Returns the number of
    /// edges rewritten.
    pub fn apply(&mut self, builder: &mut GraphBuilder) -> usize {
        let mut rewritten = 0;
        for edge in builder.edges_mut() {
            self.schedule_edge(edge);
            rewritten += 1;
        }
        info!(
            edges = rewritten,
            routes = self.patterns.len(),
            "synthesised bus schedules"
        );
        rewritten
    }

    fn schedule_edge(&mut self, edge: &mut Edge) {
        let route_id = match edge.route_id.take() {
            Some(id) => id,
            None => format!("{:02}", self.rng.gen_range(1..=self.config.route_pool)),
        };
        let pattern = self.pattern_for(&route_id);

        let jitter = self.rng.gen_range(0.0..=self.config.start_jitter);
        let start = self.config.first_departure + jitter;
        let departures = pattern.departures_from(start);

        let distance_m = if edge.distance_m > 0.0 {
            edge.distance_m
        } else {
            self.config.default_link_m
        };

        edge.kind = EdgeKind::Bus;
        edge.route_id = Some(route_id);
        edge.schedule = Some(Schedule::new(
            departures.into_iter().map(ServiceTime::from_hours).collect(),
        ));
        edge.distance_m = distance_m;
        edge.base_travel_mins = self.config.travel_minutes(distance_m);
    }

    fn pattern_for(&mut self, route_id: &str) -> RoutePattern {
        if let Some(pattern) = self.patterns.get(route_id) {
            return *pattern;
        }
        let pattern = RoutePattern {
            end_hour: END_HOURS[self.end_hours.sample(&mut self.rng)],
            peak_headway: *PEAK_HEADWAYS.choose(&mut self.rng).unwrap_or(&PEAK_HEADWAYS[0]),
            off_peak_headway: *OFF_PEAK_HEADWAYS
                .choose(&mut self.rng)
                .unwrap_or(&OFF_PEAK_HEADWAYS[0]),
        };
        debug!(route_id, ?pattern, "new route pattern");
        self.patterns.insert(route_id.to_string(), pattern);
        pattern
    }
}

/// A random directed network of `stop_count` stops scattered over a
/// 0.1 x 0.1 degree box near Hanoi, each ordered pair linked with
/// probability `link_probability` and a length of 300-2000 m.
///
/// Used when no base network is available.
pub fn random_network(
    stop_count: usize,
    link_probability: f64,
    seed: u64,
) -> Result<GraphBuilder, GraphError> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let p = if link_probability.is_nan() {
        0.0
    } else {
        link_probability.clamp(0.0, 1.0)
    };

    let mut builder = GraphBuilder::with_capacity(stop_count, 0);
    for i in 0..stop_count {
        let lat = 21.0 + rng.gen_range(0.0..0.1);
        let lon = 105.8 + rng.gen_range(0.0..0.1);
        builder.add_stop(Stop::at(i.to_string(), lat, lon))?;
    }

    let mut links = Vec::new();
    for u in 0..stop_count {
        for v in 0..stop_count {
            if u != v && rng.gen_bool(p) {
                let distance_m = f64::from(rng.gen_range(300u32..=2000));
                links.push((u, v, distance_m));
            }
        }
    }
    for (u, v, distance_m) in links {
        builder.add_edge(Edge {
            from: u.to_string().into(),
            to: v.to_string().into(),
            kind: EdgeKind::Bus,
            route_id: None,
            schedule: None,
            base_travel_mins: 0.0,
            distance_m,
        })?;
    }

    info!(
        stops = builder.stop_count(),
        links = builder.edge_count(),
        "generated random base network"
    );
    Ok(builder)
}
