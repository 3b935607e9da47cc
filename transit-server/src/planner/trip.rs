//! Door-to-door trip planning.
//!
//! The router works stop to stop, but a trip runs point to point. The planner
//! picks candidate stops around each endpoint, walks to and from them, runs
//! the router and keeps the earliest finish.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::{GeoPoint, ServiceTime};
use crate::graph::TransitGraph;
use crate::spatial::{StopDistance, StopIndex};

use super::config::{CandidateStrategy, PlannerConfig};
use super::error::PlanError;
use super::itinerary::{Itinerary, ItineraryBuilder, Walkway};
use super::router::{RoutedPath, Router};

/// The winning combination of access walk, ride and egress walk.
struct Candidate {
    access: Walkway,
    egress: Walkway,
    path: RoutedPath,
    finish: ServiceTime,
}

/// Plans trips over one shared graph.
///
/// Cheap to share: the graph is behind an `Arc` and the index is read-only.
/// Every call to [`TripPlanner::plan`] owns its own search state.
pub struct TripPlanner {
    graph: Arc<TransitGraph>,
    index: StopIndex,
    config: PlannerConfig,
}

impl TripPlanner {
    /// Build the stop index and wrap the graph.
    pub fn new(graph: Arc<TransitGraph>, config: PlannerConfig) -> Self {
        let index = StopIndex::new(graph.stops());
        info!(
            stops = graph.stop_count(),
            indexed = index.len(),
            edges = graph.edge_count(),
            strategy = ?config.strategy,
            "trip planner ready"
        );
        Self {
            graph,
            index,
            config,
        }
    }

    pub fn graph(&self) -> &Arc<TransitGraph> {
        &self.graph
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Up to `k` stops nearest to a point, closest first.
    pub fn nearest_stops(&self, lat: f64, lon: f64, k: usize) -> Vec<StopDistance> {
        self.index.nearest(GeoPoint::new(lat, lon), k)
    }

    /// Plan a trip leaving at an `HH:MM` clock time.
    pub fn plan_trip(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        departure: &str,
    ) -> Result<Itinerary, PlanError> {
        let departure = ServiceTime::parse_hhmm(departure)?;
        self.plan(origin, destination, departure)
    }

    /// Plan a trip leaving `origin` at `departure`.
    pub fn plan(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        departure: ServiceTime,
    ) -> Result<Itinerary, PlanError> {
        if !origin.is_finite() || !destination.is_finite() {
            return Err(PlanError::MalformedInput(
                "coordinates must be finite numbers".to_string(),
            ));
        }
        if !departure.hours().is_finite() {
            return Err(PlanError::MalformedInput(
                "departure must be a finite time".to_string(),
            ));
        }

        let k = self.config.candidate_count;
        let starts = self.index.nearest(origin, k);
        let ends = self.index.nearest(destination, k);
        if starts.is_empty() || ends.is_empty() {
            return Err(PlanError::NoStopsFound);
        }

        let best = match self.config.strategy {
            CandidateStrategy::PairSweep => self.pair_sweep(&starts, &ends, departure),
            CandidateStrategy::VirtualEndpoints => {
                self.virtual_endpoints(&starts, &ends, departure)
            }
        };
        let Some(best) = best else {
            debug!(%origin, %destination, %departure, "no feasible candidate");
            return Err(PlanError::NoPathFound);
        };

        let mut builder = ItineraryBuilder::new(
            &self.graph,
            origin,
            destination,
            departure,
            best.access,
            best.egress,
        );
        for leg in &best.path.legs {
            builder.push(leg);
        }
        let itinerary = builder.finish(best.path.arrival, best.finish);
        debug!(
            %departure,
            arrival = %itinerary.arrival,
            segments = itinerary.segments.len(),
            "trip planned"
        );
        Ok(itinerary)
    }

    fn walkway(&self, candidate: &StopDistance) -> Walkway {
        Walkway {
            stop: candidate.stop,
            distance_m: candidate.distance_m,
            minutes: self.config.walk_minutes(candidate.distance_m),
        }
    }

    /// One search per (start, end) pair; the earliest finish wins and the
    /// first pair wins a tie.
    fn pair_sweep(
        &self,
        starts: &[StopDistance],
        ends: &[StopDistance],
        departure: ServiceTime,
    ) -> Option<Candidate> {
        let router = Router::new(&self.graph, &self.config);
        let mut best: Option<Candidate> = None;

        for start in starts {
            let access = self.walkway(start);
            let at_start = departure.add_minutes(access.minutes);
            for end in ends {
                if start.stop == end.stop {
                    continue;
                }
                let egress = self.walkway(end);
                let path = match router.find_path(start.stop, end.stop, at_start) {
                    Ok(path) => path,
                    Err(err) => {
                        debug!(from = %start.id, to = %end.id, %err, "pair infeasible");
                        continue;
                    }
                };
                let finish = path.arrival.add_minutes(egress.minutes);
                if best.as_ref().is_none_or(|b| finish < b.finish) {
                    best = Some(Candidate {
                        access,
                        egress,
                        path,
                        finish,
                    });
                }
            }
        }
        best
    }

    /// One search from every start towards a sink behind every end.
    fn virtual_endpoints(
        &self,
        starts: &[StopDistance],
        ends: &[StopDistance],
        departure: ServiceTime,
    ) -> Option<Candidate> {
        let access: Vec<Walkway> = starts.iter().map(|s| self.walkway(s)).collect();
        let egress: Vec<Walkway> = ends.iter().map(|e| self.walkway(e)).collect();

        let sources: Vec<_> = access
            .iter()
            .map(|w| (w.stop, departure.add_minutes(w.minutes)))
            .collect();
        let targets: Vec<_> = egress.iter().map(|w| (w.stop, w.minutes / 60.0)).collect();

        match Router::new(&self.graph, &self.config).search(&sources, &targets) {
            Ok(outcome) => Some(Candidate {
                access: access[outcome.source],
                egress: egress[outcome.target],
                path: outcome.path,
                finish: outcome.finish,
            }),
            Err(err) => {
                debug!(%err, "virtual-endpoint search failed");
                None
            }
        }
    }
}
