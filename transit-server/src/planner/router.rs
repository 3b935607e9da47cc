//! Time-dependent earliest-arrival search.
//!
//! A label-setting Dijkstra keyed by arrival time. A bus edge can only be
//! entered at one of its scheduled departures at or after the rider reaches
//! its tail, and its travel time depends on the time of day (see
//! [`PlannerConfig::travel_hours`]). Walk edges are always open.
//!
//! Costs are never negative (a departure is never earlier than the arrival
//! that resolved it), so a stop's label is final once it is popped.
//!
//! # Multiple sources and targets
//!
//! [`Router::search`] seeds the queue with any number of source stops, each
//! with its own start time, and finishes on a virtual sink one egress step
//! away from every target stop. [`Router::find_path`] is the single-source,
//! single-target, zero-egress case.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use tracing::{trace, warn};

use crate::domain::{EdgeKind, ServiceTime};
use crate::graph::{EdgeIdx, StopIdx, TransitGraph};

use super::config::PlannerConfig;
use super::error::RouteError;

/// One traversed edge of a routed path.
#[derive(Debug, Clone, PartialEq)]
pub struct PathLeg {
    pub from: StopIdx,
    pub to: StopIdx,
    pub edge: EdgeIdx,
    pub kind: EdgeKind,
    pub route_id: Option<String>,
    pub departure: ServiceTime,
    pub arrival: ServiceTime,
    /// Minutes spent at `from` before departing. Always zero for walks.
    pub wait_mins: f64,
}

/// A stop-to-stop path and the arrival time at its last stop.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedPath {
    pub legs: Vec<PathLeg>,
    pub arrival: ServiceTime,
}

/// Result of a multi-source, multi-target [`Router::search`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// Index into the `sources` slice the path starts from.
    pub source: usize,
    /// Index into the `targets` slice the path ends at.
    pub target: usize,
    /// Legs and arrival at the target stop.
    pub path: RoutedPath,
    /// Arrival at the target stop plus its egress time.
    pub finish: ServiceTime,
}

/// How a label was reached.
#[derive(Debug, Clone, Copy)]
enum Link {
    Unreached,
    Source(usize),
    Edge { edge: EdgeIdx, departure: ServiceTime },
    Egress { stop: StopIdx, target: usize },
}

/// Earliest-arrival router over a shared graph.
pub struct Router<'a> {
    graph: &'a TransitGraph,
    config: &'a PlannerConfig,
}

impl<'a> Router<'a> {
    pub fn new(graph: &'a TransitGraph, config: &'a PlannerConfig) -> Self {
        Self { graph, config }
    }

    /// Earliest-arrival path from `start` to `end` leaving at `start_time`.
    ///
    /// `find_path(s, s, t)` is an empty path arriving at `t`.
    pub fn find_path(
        &self,
        start: StopIdx,
        end: StopIdx,
        start_time: ServiceTime,
    ) -> Result<RoutedPath, RouteError> {
        let outcome = self.search(&[(start, start_time)], &[(end, 0.0)])?;
        Ok(outcome.path)
    }

    /// Earliest finish over all `(source, start time)` seeds and all
    /// `(target, egress hours)` exits.
    pub fn search(
        &self,
        sources: &[(StopIdx, ServiceTime)],
        targets: &[(StopIdx, f64)],
    ) -> Result<SearchOutcome, RouteError> {
        let n = self.graph.stop_count();
        for &(stop, _) in sources {
            self.check(stop)?;
        }
        let mut exits: HashMap<StopIdx, Vec<(usize, f64)>> = HashMap::new();
        for (i, &(stop, egress)) in targets.iter().enumerate() {
            self.check(stop)?;
            exits.entry(stop).or_default().push((i, egress));
        }

        // Slot `n` is the virtual sink.
        let sink = n;
        let mut best: Vec<Option<ServiceTime>> = vec![None; n + 1];
        let mut parent: Vec<Link> = vec![Link::Unreached; n + 1];
        let mut heap: BinaryHeap<Reverse<(ServiceTime, usize)>> = BinaryHeap::new();

        for (i, &(stop, t)) in sources.iter().enumerate() {
            if improves(best[stop.index()], t) {
                best[stop.index()] = Some(t);
                parent[stop.index()] = Link::Source(i);
                heap.push(Reverse((t, stop.index())));
            }
        }

        let mut popped = 0usize;
        while let Some(Reverse((t, u))) = heap.pop() {
            popped += 1;
            if popped > self.config.max_settled {
                warn!(
                    budget = self.config.max_settled,
                    stops = n,
                    "router budget exhausted"
                );
                return Err(RouteError::BudgetExhausted {
                    budget: self.config.max_settled,
                });
            }

            if best[u].is_some_and(|b| t > b) {
                continue;
            }
            if u == sink {
                trace!(popped, "router reached sink");
                return self
                    .reconstruct(&best, &parent, t)
                    .ok_or(RouteError::NoPath);
            }

            let stop = StopIdx(u as u32);
            if let Some(exits) = exits.get(&stop) {
                for &(target, egress) in exits {
                    let finish = t.add_hours(egress);
                    if improves(best[sink], finish) {
                        best[sink] = Some(finish);
                        parent[sink] = Link::Egress { stop, target };
                        heap.push(Reverse((finish, sink)));
                    }
                }
            }

            for e in self.graph.out_edges(stop) {
                let edge = self.graph.edge(e);
                let Some(departure) = edge.departure_at_or_after(t) else {
                    continue;
                };
                let arrival = departure.add_hours(self.config.travel_hours(edge, t));
                let (_, v) = self.graph.endpoints(e);
                if improves(best[v.index()], arrival) {
                    best[v.index()] = Some(arrival);
                    parent[v.index()] = Link::Edge { edge: e, departure };
                    heap.push(Reverse((arrival, v.index())));
                }
            }
        }

        Err(RouteError::NoPath)
    }

    fn check(&self, stop: StopIdx) -> Result<(), RouteError> {
        if stop.index() < self.graph.stop_count() {
            Ok(())
        } else {
            Err(RouteError::UnknownStop(stop))
        }
    }

    /// Follow parent links back from the sink.
    fn reconstruct(
        &self,
        best: &[Option<ServiceTime>],
        parent: &[Link],
        finish: ServiceTime,
    ) -> Option<SearchOutcome> {
        let sink = parent.len() - 1;
        let Link::Egress { stop: end, target } = parent[sink] else {
            return None;
        };
        let arrival_at = |stop: StopIdx| best[stop.index()].unwrap_or(finish);

        let mut legs = Vec::new();
        let mut cur = end;
        let source = loop {
            match parent[cur.index()] {
                Link::Source(i) => break i,
                Link::Edge { edge, departure } => {
                    let (from, to) = self.graph.endpoints(edge);
                    let data = self.graph.edge(edge);
                    legs.push(PathLeg {
                        from,
                        to,
                        edge,
                        kind: data.kind,
                        route_id: data.route_id.clone(),
                        departure,
                        arrival: arrival_at(to),
                        wait_mins: departure.minutes_since(arrival_at(from)),
                    });
                    cur = from;
                }
                Link::Unreached | Link::Egress { .. } => return None,
            }
        };
        legs.reverse();

        Some(SearchOutcome {
            source,
            target,
            path: RoutedPath {
                legs,
                arrival: arrival_at(end),
            },
            finish,
        })
    }
}

/// Strictly earlier than the current label, or the first label.
#[inline]
fn improves(current: Option<ServiceTime>, candidate: ServiceTime) -> bool {
    current.is_none_or(|b| candidate < b)
}
