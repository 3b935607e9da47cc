//! Immutable multimodal transit graph and its builder.
//!
//! # Layout
//!
//! Stops are addressed by a dense [`StopIdx`] assigned in insertion order.
//! Edges are stored sorted by tail stop (stable, so parallel edges keep their
//! insertion order) with a CSR row pointer, so the outgoing edges of stop `n`
//! are the contiguous range `out_start[n] .. out_start[n + 1]`.
//!
//! A built [`TransitGraph`] has no mutating methods. Share it behind an
//! `Arc` and read it from any number of threads.

use std::collections::HashMap;

use tracing::debug;

use crate::domain::{Edge, Stop, StopId};

use super::error::GraphError;

/// Dense index of a stop inside a [`TransitGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StopIdx(pub u32);

impl StopIdx {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Dense index of an edge inside a [`TransitGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeIdx(pub u32);

impl EdgeIdx {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Directed multigraph of stops and bus/walk edges.
#[derive(Debug)]
pub struct TransitGraph {
    stops: Vec<Stop>,
    lookup: HashMap<StopId, StopIdx>,
    edges: Vec<Edge>,
    edge_from: Vec<StopIdx>,
    edge_to: Vec<StopIdx>,
    out_start: Vec<u32>,
}

impl TransitGraph {
    /// A graph with no stops or edges.
    pub fn empty() -> Self {
        GraphBuilder::new().build()
    }

    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// All stops in insertion order.
    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    /// All edges, grouped by tail stop.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[inline]
    pub fn stop(&self, idx: StopIdx) -> &Stop {
        &self.stops[idx.index()]
    }

    #[inline]
    pub fn edge(&self, idx: EdgeIdx) -> &Edge {
        &self.edges[idx.index()]
    }

    /// Tail and head of an edge.
    #[inline]
    pub fn endpoints(&self, idx: EdgeIdx) -> (StopIdx, StopIdx) {
        (self.edge_from[idx.index()], self.edge_to[idx.index()])
    }

    pub fn index_of(&self, id: &StopId) -> Option<StopIdx> {
        self.lookup.get(id).copied()
    }

    /// Outgoing edges of `stop`, in insertion order.
    #[inline]
    pub fn out_edges(&self, stop: StopIdx) -> impl Iterator<Item = EdgeIdx> + '_ {
        let start = self.out_start[stop.index()];
        let end = self.out_start[stop.index() + 1];
        (start..end).map(EdgeIdx)
    }

    pub fn out_degree(&self, stop: StopIdx) -> usize {
        (self.out_start[stop.index() + 1] - self.out_start[stop.index()]) as usize
    }
}

/// Incrementally assemble a [`TransitGraph`], validating as edges arrive.
///
/// # Example
///
/// ```
/// use transit_server::domain::{Edge, Schedule, Stop};
/// use transit_server::graph::GraphBuilder;
///
/// let mut b = GraphBuilder::new();
/// b.add_stop(Stop::at("A", 21.0, 105.8)).unwrap();
/// b.add_stop(Stop::at("B", 21.0, 105.81)).unwrap();
/// b.add_edge(Edge::bus("A", "B", "07", Schedule::from_hours(&[8.0]), 4.0, 1000.0)).unwrap();
/// let graph = b.build();
/// assert_eq!(graph.stop_count(), 2);
/// assert_eq!(graph.edge_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct GraphBuilder {
    stops: Vec<Stop>,
    lookup: HashMap<StopId, StopIdx>,
    edges: Vec<Edge>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(stops: usize, edges: usize) -> Self {
        Self {
            stops: Vec::with_capacity(stops),
            lookup: HashMap::with_capacity(stops),
            edges: Vec::with_capacity(edges),
        }
    }

    /// Add a stop and return its dense index.
    pub fn add_stop(&mut self, stop: Stop) -> Result<StopIdx, GraphError> {
        if self.lookup.contains_key(&stop.id) {
            return Err(GraphError::DuplicateStop(stop.id));
        }
        let idx = StopIdx(self.stops.len() as u32);
        self.lookup.insert(stop.id.clone(), idx);
        self.stops.push(stop);
        Ok(idx)
    }

    /// Add a directed edge. Both endpoints must already be stops.
    pub fn add_edge(&mut self, edge: Edge) -> Result<(), GraphError> {
        for endpoint in [&edge.from, &edge.to] {
            if !self.lookup.contains_key(endpoint) {
                return Err(GraphError::UnknownStop {
                    from: edge.from.clone(),
                    to: edge.to.clone(),
                    missing: endpoint.clone(),
                });
            }
        }
        if let Some(reason) = invalid_edge_reason(&edge) {
            return Err(GraphError::InvalidEdge {
                from: edge.from,
                to: edge.to,
                reason,
            });
        }
        self.edges.push(edge);
        Ok(())
    }

    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub fn stop_mut(&mut self, idx: StopIdx) -> &mut Stop {
        &mut self.stops[idx.index()]
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Mutable access for offline passes that rewrite edge attributes
    /// (e.g. schedule synthesis). Endpoints must not be changed.
    pub fn edges_mut(&mut self) -> &mut [Edge] {
        &mut self.edges
    }

    pub fn index_of(&self, id: &StopId) -> Option<StopIdx> {
        self.lookup.get(id).copied()
    }

    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Keep only the largest weakly connected component.
    ///
    /// Returns the number of stops removed. Ties between equally large
    /// components go to the one containing the earliest-inserted stop.
    pub fn retain_largest_component(&mut self) -> usize {
        let n = self.stops.len();
        if n == 0 {
            return 0;
        }

        let mut parent: Vec<usize> = (0..n).collect();
        for edge in &self.edges {
            let a = find(&mut parent, self.lookup[&edge.from].index());
            let b = find(&mut parent, self.lookup[&edge.to].index());
            if a != b {
                parent[a.max(b)] = a.min(b);
            }
        }

        let mut sizes = vec![0usize; n];
        let roots: Vec<usize> = (0..n).map(|i| find(&mut parent, i)).collect();
        for &root in &roots {
            sizes[root] += 1;
        }
        let components = sizes.iter().filter(|&&s| s > 0).count();
        if components <= 1 {
            return 0;
        }

        // First root with the maximal size, scanning in insertion order.
        let mut keep_root = roots[0];
        for &root in &roots {
            if sizes[root] > sizes[keep_root] {
                keep_root = root;
            }
        }

        let stops = std::mem::take(&mut self.stops);
        let edges = std::mem::take(&mut self.edges);
        self.lookup.clear();

        for (stop, root) in stops.into_iter().zip(&roots) {
            if *root == keep_root {
                self.lookup.insert(stop.id.clone(), StopIdx(self.stops.len() as u32));
                self.stops.push(stop);
            }
        }
        self.edges = edges
            .into_iter()
            .filter(|e| self.lookup.contains_key(&e.from))
            .collect();

        let removed = n - self.stops.len();
        debug!(components, removed, "kept largest weakly connected component");
        removed
    }

    /// Consume the builder and produce a [`TransitGraph`].
    pub fn build(self) -> TransitGraph {
        let stop_count = self.stops.len();

        let mut edges = self.edges;
        let lookup = self.lookup;
        // Stable: parallel edges keep insertion order.
        edges.sort_by_key(|e| lookup[&e.from]);

        let edge_from: Vec<StopIdx> = edges.iter().map(|e| lookup[&e.from]).collect();
        let edge_to: Vec<StopIdx> = edges.iter().map(|e| lookup[&e.to]).collect();

        let mut out_start = vec![0u32; stop_count + 1];
        for from in &edge_from {
            out_start[from.index() + 1] += 1;
        }
        for i in 1..=stop_count {
            out_start[i] += out_start[i - 1];
        }
        debug_assert_eq!(out_start[stop_count] as usize, edges.len());

        TransitGraph {
            stops: self.stops,
            lookup,
            edges,
            edge_from,
            edge_to,
            out_start,
        }
    }
}

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

fn invalid_edge_reason(edge: &Edge) -> Option<&'static str> {
    if !edge.base_travel_mins.is_finite() || edge.base_travel_mins < 0.0 {
        return Some("travel time must be a finite, non-negative number of minutes");
    }
    if !edge.distance_m.is_finite() || edge.distance_m < 0.0 {
        return Some("distance must be a finite, non-negative number of metres");
    }
    if let Some(schedule) = &edge.schedule {
        if !schedule.is_finite() {
            return Some("schedule contains a non-finite departure");
        }
    }
    None
}
