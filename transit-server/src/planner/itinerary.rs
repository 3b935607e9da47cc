//! Turning a routed edge path into rider-facing segments.
//!
//! Consecutive walk edges collapse into one walk segment, and consecutive bus
//! edges of the same route collapse into one bus segment. The access walk
//! from the origin and the egress walk to the destination are folded into
//! the neighbouring walk segment when there is one.

use crate::domain::{EdgeKind, GeoPoint, ServiceTime};
use crate::graph::{StopIdx, TransitGraph};

use super::router::PathLeg;

/// A named endpoint of a segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Place {
    Origin,
    Destination,
    Stop(String),
}

impl Place {
    pub fn name(&self) -> &str {
        match self {
            Place::Origin => "Starting point",
            Place::Destination => "Destination",
            Place::Stop(name) => name,
        }
    }
}

/// What a walk segment does for the rider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkRole {
    /// Leaves the trip origin.
    Depart,
    /// Ends at the trip destination.
    Arrive,
    /// Connects two stops between bus rides.
    Transfer,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WalkSegment {
    pub from: Place,
    pub to: Place,
    /// Sum of whole metres per merged piece.
    pub distance_m: u64,
    pub duration_mins: f64,
    pub polyline: Vec<GeoPoint>,
    pub departs: ServiceTime,
    pub arrives: ServiceTime,
}

impl WalkSegment {
    pub fn role(&self) -> WalkRole {
        if self.from == Place::Origin {
            WalkRole::Depart
        } else if self.to == Place::Destination {
            WalkRole::Arrive
        } else {
            WalkRole::Transfer
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BusSegment {
    /// `None` when the network does not label the route.
    pub route_id: Option<String>,
    pub from: Place,
    pub to: Place,
    pub polyline: Vec<GeoPoint>,
    pub boards: ServiceTime,
    pub alights: ServiceTime,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ItinerarySegment {
    Walk(WalkSegment),
    Bus(BusSegment),
}

impl ItinerarySegment {
    pub fn polyline(&self) -> &[GeoPoint] {
        match self {
            ItinerarySegment::Walk(w) => &w.polyline,
            ItinerarySegment::Bus(b) => &b.polyline,
        }
    }
}

/// A complete door-to-door plan.
#[derive(Debug, Clone, PartialEq)]
pub struct Itinerary {
    pub departure: ServiceTime,
    pub arrival: ServiceTime,
    /// Whole minutes from departure to arrival, truncated.
    pub total_duration_mins: i64,
    pub segments: Vec<ItinerarySegment>,
}

/// A straight-line walk between an endpoint of the trip and a stop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Walkway {
    pub stop: StopIdx,
    pub distance_m: f64,
    pub minutes: f64,
}

/// Merges path legs into segments.
///
/// The open segment is the accumulator's state: either a walk being
/// extended or a bus ride on one route being extended.
pub struct ItineraryBuilder<'a> {
    graph: &'a TransitGraph,
    destination: GeoPoint,
    departure: ServiceTime,
    egress: Walkway,
    open: ItinerarySegment,
    done: Vec<ItinerarySegment>,
}

impl<'a> ItineraryBuilder<'a> {
    /// Start with the access walk from `origin` to the first stop.
    pub fn new(
        graph: &'a TransitGraph,
        origin: GeoPoint,
        destination: GeoPoint,
        departure: ServiceTime,
        access: Walkway,
        egress: Walkway,
    ) -> Self {
        let start = graph.stop(access.stop);
        let mut polyline = vec![origin];
        polyline.extend(start.position);
        let open = ItinerarySegment::Walk(WalkSegment {
            from: Place::Origin,
            to: Place::Stop(start.display_name()),
            distance_m: whole_metres(access.distance_m),
            duration_mins: access.minutes,
            polyline,
            departs: departure,
            arrives: departure.add_minutes(access.minutes),
        });
        Self {
            graph,
            destination,
            departure,
            egress,
            open,
            done: Vec::new(),
        }
    }

    pub fn push(&mut self, leg: &PathLeg) {
        let graph = self.graph;
        let to = graph.stop(leg.to);
        let distance_m = whole_metres(graph.edge(leg.edge).distance_m);

        let continues = match (&self.open, leg.kind) {
            (ItinerarySegment::Walk(_), EdgeKind::Walk) => true,
            (ItinerarySegment::Bus(bus), EdgeKind::Bus) => {
                leg.route_id == bus.route_id
            }
            _ => false,
        };

        if continues {
            match &mut self.open {
                ItinerarySegment::Walk(walk) => {
                    walk.distance_m += distance_m;
                    walk.duration_mins += leg.arrival.minutes_since(leg.departure);
                    walk.polyline.extend(to.position);
                    walk.to = Place::Stop(to.display_name());
                    walk.arrives = leg.arrival;
                }
                ItinerarySegment::Bus(bus) => {
                    bus.polyline.extend(to.position);
                    bus.to = Place::Stop(to.display_name());
                    bus.alights = leg.arrival;
                }
            }
            return;
        }

        let from = Place::Stop(graph.stop(leg.from).display_name());
        let polyline = self.hop_polyline(leg);
        let next = match leg.kind {
            EdgeKind::Walk => ItinerarySegment::Walk(WalkSegment {
                from,
                to: Place::Stop(to.display_name()),
                distance_m,
                duration_mins: leg.arrival.minutes_since(leg.departure),
                polyline,
                departs: leg.departure,
                arrives: leg.arrival,
            }),
            EdgeKind::Bus => ItinerarySegment::Bus(BusSegment {
                route_id: leg.route_id.clone(),
                from,
                to: Place::Stop(to.display_name()),
                polyline,
                boards: leg.departure,
                alights: leg.arrival,
            }),
        };
        let closed = std::mem::replace(&mut self.open, next);
        self.done.push(closed);
    }

    /// Close the trip with the egress walk. `end_arrival` is when the rider
    /// reaches the last stop, `finish` when they reach the destination.
    pub fn finish(self, end_arrival: ServiceTime, finish: ServiceTime) -> Itinerary {
        let Self {
            graph,
            destination,
            departure,
            egress,
            open,
            mut done,
        } = self;
        let end = graph.stop(egress.stop);

        match open {
            ItinerarySegment::Walk(mut walk) => {
                walk.distance_m += whole_metres(egress.distance_m);
                walk.duration_mins += egress.minutes;
                walk.polyline.push(destination);
                walk.to = Place::Destination;
                walk.arrives = finish;
                done.push(ItinerarySegment::Walk(walk));
            }
            bus @ ItinerarySegment::Bus(_) => {
                let mut polyline: Vec<GeoPoint> = end.position.into_iter().collect();
                polyline.push(destination);
                done.push(bus);
                done.push(ItinerarySegment::Walk(WalkSegment {
                    from: Place::Stop(end.display_name()),
                    to: Place::Destination,
                    distance_m: whole_metres(egress.distance_m),
                    duration_mins: egress.minutes,
                    polyline,
                    departs: end_arrival,
                    arrives: finish,
                }));
            }
        }

        Itinerary {
            departure,
            arrival: finish,
            total_duration_mins: finish.whole_minutes_since(departure),
            segments: done,
        }
    }

    fn hop_polyline(&self, leg: &PathLeg) -> Vec<GeoPoint> {
        [leg.from, leg.to]
            .into_iter()
            .filter_map(|s| self.graph.stop(s).position)
            .collect()
    }
}

fn whole_metres(distance_m: f64) -> u64 {
    if distance_m.is_finite() && distance_m > 0.0 {
        distance_m.trunc() as u64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Edge, Schedule, Stop, StopId};
    use crate::graph::{EdgeIdx, GraphBuilder};

    fn t(h: f64) -> ServiceTime {
        ServiceTime::from_hours(h)
    }

    /// A-B-C-D in a row, with both modes available on every hop.
    fn graph() -> TransitGraph {
        let mut b = GraphBuilder::new();
        for (i, id) in ["A", "B", "C", "D"].iter().enumerate() {
            b.add_stop(Stop::at(*id, 0.0, i as f64 * 0.01).with_name(format!("Stop-{id}")))
                .unwrap();
        }
        for (from, to) in [("A", "B"), ("B", "C"), ("C", "D")] {
            b.add_edge(Edge::walk(from, to, 12.0, 1000.7)).unwrap();
            b.add_edge(Edge::bus(from, to, "01", Schedule::from_hours(&[8.0]), 3.0, 1000.0))
                .unwrap();
            b.add_edge(Edge::bus(from, to, "02", Schedule::from_hours(&[8.0]), 3.0, 1000.0))
                .unwrap();
        }
        b.build()
    }

    fn stop(g: &TransitGraph, id: &str) -> StopIdx {
        g.index_of(&StopId::from(id)).unwrap()
    }

    fn leg(
        g: &TransitGraph,
        from: &str,
        to: &str,
        route: Option<&str>,
        dep: f64,
        arr: f64,
    ) -> PathLeg {
        let (from, to) = (stop(g, from), stop(g, to));
        let edge: EdgeIdx = g
            .out_edges(from)
            .find(|&e| g.endpoints(e).1 == to && g.edge(e).route_id.as_deref() == route)
            .unwrap();
        PathLeg {
            from,
            to,
            edge,
            kind: g.edge(edge).kind,
            route_id: route.map(str::to_string),
            departure: t(dep),
            arrival: t(arr),
            wait_mins: 0.0,
        }
    }

    fn builder<'a>(g: &'a TransitGraph, first: &str, last: &str) -> ItineraryBuilder<'a> {
        ItineraryBuilder::new(
            g,
            GeoPoint::new(0.001, 0.0),
            GeoPoint::new(0.001, 0.03),
            t(8.0),
            Walkway {
                stop: stop(g, first),
                distance_m: 111.9,
                minutes: 1.5,
            },
            Walkway {
                stop: stop(g, last),
                distance_m: 222.2,
                minutes: 3.0,
            },
        )
    }

    fn kinds(it: &Itinerary) -> Vec<String> {
        it.segments
            .iter()
            .map(|s| match s {
                ItinerarySegment::Walk(_) => "walk".to_string(),
                ItinerarySegment::Bus(b) => {
                    format!("bus {}", b.route_id.as_deref().unwrap_or("-"))
                }
            })
            .collect()
    }

    #[test]
    fn bus_ride_gets_access_and_separate_egress_walks() {
        let g = graph();
        let mut b = builder(&g, "A", "C");
        b.push(&leg(&g, "A", "B", Some("01"), 8.1, 8.2));
        b.push(&leg(&g, "B", "C", Some("01"), 8.2, 8.3));
        let it = b.finish(t(8.3), t(8.35));

        assert_eq!(kinds(&it), vec!["walk", "bus 01", "walk"]);

        let ItinerarySegment::Walk(access) = &it.segments[0] else {
            panic!("expected walk");
        };
        assert_eq!(access.role(), WalkRole::Depart);
        assert_eq!(access.distance_m, 111);
        assert_eq!(access.to, Place::Stop("Stop-A".to_string()));
        assert_eq!(access.arrives, t(8.0).add_minutes(1.5));

        let ItinerarySegment::Bus(bus) = &it.segments[1] else {
            panic!("expected bus");
        };
        assert_eq!(bus.from.name(), "Stop-A");
        assert_eq!(bus.to.name(), "Stop-C");
        assert_eq!(bus.boards, t(8.1));
        assert_eq!(bus.alights, t(8.3));
        assert_eq!(bus.polyline.len(), 3);

        let ItinerarySegment::Walk(egress) = &it.segments[2] else {
            panic!("expected walk");
        };
        assert_eq!(egress.role(), WalkRole::Arrive);
        assert_eq!(egress.from.name(), "Stop-C");
        assert_eq!(egress.distance_m, 222);
        assert_eq!(egress.departs, t(8.3));
        assert_eq!(egress.arrives, t(8.35));
        assert_eq!(*egress.polyline.last().unwrap(), GeoPoint::new(0.001, 0.03));

        assert_eq!(it.arrival, t(8.35));
        assert_eq!(it.total_duration_mins, 21);
    }

    #[test]
    fn route_change_splits_bus_segments() {
        let g = graph();
        let mut b = builder(&g, "A", "C");
        b.push(&leg(&g, "A", "B", Some("01"), 8.1, 8.2));
        b.push(&leg(&g, "B", "C", Some("02"), 8.25, 8.3));
        let it = b.finish(t(8.3), t(8.35));

        assert_eq!(kinds(&it), vec!["walk", "bus 01", "bus 02", "walk"]);
    }

    #[test]
    fn walks_merge_with_access_and_egress() {
        let g = graph();
        let mut b = builder(&g, "A", "C");
        b.push(&leg(&g, "A", "B", None, 8.025, 8.225));
        b.push(&leg(&g, "B", "C", None, 8.225, 8.425));
        let it = b.finish(t(8.425), t(8.475));

        assert_eq!(kinds(&it), vec!["walk"]);
        let ItinerarySegment::Walk(walk) = &it.segments[0] else {
            panic!("expected walk");
        };
        assert_eq!(walk.from, Place::Origin);
        assert_eq!(walk.to, Place::Destination);
        assert_eq!(walk.role(), WalkRole::Depart);
        // 111 + 1000 + 1000 + 222
        assert_eq!(walk.distance_m, 2333);
        assert!((walk.duration_mins - (1.5 + 12.0 + 12.0 + 3.0)).abs() < 1e-9);
        assert_eq!(walk.polyline.len(), 5);
        assert_eq!(walk.arrives, t(8.475));
    }

    #[test]
    fn transfer_walk_between_buses() {
        let g = graph();
        let mut b = builder(&g, "A", "D");
        b.push(&leg(&g, "A", "B", Some("01"), 8.1, 8.2));
        b.push(&leg(&g, "B", "C", None, 8.2, 8.4));
        b.push(&leg(&g, "C", "D", Some("01"), 8.5, 8.6));
        let it = b.finish(t(8.6), t(8.65));

        assert_eq!(kinds(&it), vec!["walk", "bus 01", "walk", "bus 01", "walk"]);
        let ItinerarySegment::Walk(transfer) = &it.segments[2] else {
            panic!("expected walk");
        };
        assert_eq!(transfer.role(), WalkRole::Transfer);
        assert_eq!(transfer.from.name(), "Stop-B");
        assert_eq!(transfer.distance_m, 1000);
    }

    #[test]
    fn empty_path_is_one_walk() {
        let g = graph();
        let it = builder(&g, "B", "B").finish(t(8.025), t(8.075));
        assert_eq!(kinds(&it), vec!["walk"]);
        assert_eq!(it.total_duration_mins, 4);
    }

    #[test]
    fn place_names() {
        assert_eq!(Place::Origin.name(), "Starting point");
        assert_eq!(Place::Destination.name(), "Destination");
        assert_eq!(Place::Stop("X".into()).name(), "X");
    }
}
