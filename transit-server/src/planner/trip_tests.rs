//! End-to-end tests for trip planning and property tests for the router and
//! itinerary merging.

use std::sync::Arc;

use super::*;
use crate::domain::{Edge, EdgeKind, GeoPoint, Schedule, ServiceTime, Stop, StopId};
use crate::graph::{GraphBuilder, StopIdx, TransitGraph};

fn t(h: f64) -> ServiceTime {
    ServiceTime::from_hours(h)
}

/// A at the origin and B about 111 m east, joined by one bus edge.
fn one_bus_line(schedule: &[f64]) -> Arc<TransitGraph> {
    let mut b = GraphBuilder::new();
    b.add_stop(Stop::at("A", 0.0, 0.0).with_name("Ga A")).unwrap();
    b.add_stop(Stop::at("B", 0.0, 0.001).with_name("Ga B")).unwrap();
    b.add_edge(Edge::bus("A", "B", "01", Schedule::from_hours(schedule), 10.0, 111.0))
        .unwrap();
    Arc::new(b.build())
}

fn planner(graph: Arc<TransitGraph>) -> TripPlanner {
    TripPlanner::new(graph, PlannerConfig::default())
}

fn segment_kinds(it: &Itinerary) -> Vec<String> {
    it.segments
        .iter()
        .map(|s| match s {
            ItinerarySegment::Walk(w) => format!("walk {:?}", w.role()),
            ItinerarySegment::Bus(b) => format!("bus {}", b.route_id.as_deref().unwrap_or("-")),
        })
        .collect()
}

#[test]
fn boards_next_departure_in_rush_hour() {
    let planner = planner(one_bus_line(&[8.0, 8.25, 8.5]));
    let it = planner
        .plan_trip(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 0.001), "08:05")
        .unwrap();

    assert_eq!(
        segment_kinds(&it),
        vec!["walk Depart", "bus 01", "walk Arrive"]
    );
    let ItinerarySegment::Bus(bus) = &it.segments[1] else {
        panic!("expected bus segment");
    };
    assert_eq!(bus.boards, t(8.25));
    assert_eq!(bus.boards.to_string(), "08:15");
    // 10 nominal minutes doubled in the morning rush.
    assert_eq!(bus.alights.to_string(), "08:35");
    assert_eq!(bus.from.name(), "Ga A");
    assert_eq!(bus.to.name(), "Ga B");

    assert_eq!(it.arrival.to_string(), "08:35");
    assert_eq!(it.total_duration_mins, 30);
}

#[test]
fn egress_walk_is_added_to_finish() {
    let planner = planner(one_bus_line(&[8.0, 8.25, 8.5]));
    // Destination ~780 m past B: a ten-minute walk at 1.3 m/s.
    let it = planner
        .plan_trip(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 0.00803), "08:05")
        .unwrap();

    assert_eq!(it.arrival.to_string(), "08:45");
    assert_eq!(it.total_duration_mins, 40);
    let Some(ItinerarySegment::Walk(egress)) = it.segments.last() else {
        panic!("expected a final walk");
    };
    assert_eq!(egress.role(), WalkRole::Arrive);
    assert_eq!(egress.from.name(), "Ga B");
    assert_eq!(egress.distance_m, 780);
    assert_eq!(egress.departs.to_string(), "08:35");
}

#[test]
fn single_digit_hour_is_accepted() {
    let planner = planner(one_bus_line(&[8.0, 8.25, 8.5]));
    let a = planner
        .plan_trip(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 0.001), "8:05")
        .unwrap();
    let b = planner
        .plan_trip(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 0.001), "08:05")
        .unwrap();
    assert_eq!(a, b);
}

#[test]
fn missed_last_bus_is_no_path() {
    let planner = planner(one_bus_line(&[6.0, 6.5]));
    let err = planner
        .plan_trip(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 0.001), "08:05")
        .unwrap_err();
    assert_eq!(err, PlanError::NoPathFound);
}

#[test]
fn shared_single_stop_is_no_path() {
    let mut b = GraphBuilder::new();
    b.add_stop(Stop::at("A", 0.0, 0.0)).unwrap();
    let planner = planner(Arc::new(b.build()));

    let err = planner
        .plan_trip(GeoPoint::new(0.0, -0.0005), GeoPoint::new(0.0, 0.0005), "08:00")
        .unwrap_err();
    assert_eq!(err, PlanError::NoPathFound);
}

#[test]
fn virtual_endpoints_allow_walking_through_a_shared_stop() {
    let mut b = GraphBuilder::new();
    b.add_stop(Stop::at("A", 0.0, 0.0)).unwrap();
    let config = PlannerConfig::default().with_strategy(CandidateStrategy::VirtualEndpoints);
    let planner = TripPlanner::new(Arc::new(b.build()), config);

    let it = planner
        .plan_trip(GeoPoint::new(0.0, -0.0005), GeoPoint::new(0.0, 0.0005), "08:00")
        .unwrap();
    assert_eq!(segment_kinds(&it), vec!["walk Depart"]);
    let ItinerarySegment::Walk(walk) = &it.segments[0] else {
        panic!("expected walk");
    };
    assert_eq!(walk.from, Place::Origin);
    assert_eq!(walk.to, Place::Destination);
    assert_eq!(walk.polyline.len(), 3);
}

#[test]
fn no_positioned_stops_is_no_stops_found() {
    let mut b = GraphBuilder::new();
    b.add_stop(Stop::new(StopId::from("X"), None, None)).unwrap();
    let planner = planner(Arc::new(b.build()));

    let err = planner
        .plan_trip(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 0.001), "08:00")
        .unwrap_err();
    assert_eq!(err, PlanError::NoStopsFound);
}

#[test]
fn malformed_input_is_rejected_before_search() {
    let planner = planner(one_bus_line(&[8.0]));

    let err = planner
        .plan_trip(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 0.001), "25:00")
        .unwrap_err();
    assert!(matches!(err, PlanError::MalformedInput(_)));

    let err = planner
        .plan_trip(GeoPoint::new(f64::NAN, 0.0), GeoPoint::new(0.0, 0.001), "08:00")
        .unwrap_err();
    assert!(matches!(err, PlanError::MalformedInput(_)));
}

/// Two ways from the origin to B: a late bus from A, or a short walk to C
/// and an earlier bus from there.
fn two_boarding_stops() -> Arc<TransitGraph> {
    let mut b = GraphBuilder::new();
    b.add_stop(Stop::at("A", 0.0, 0.0).with_name("A")).unwrap();
    b.add_stop(Stop::at("C", 0.0, 0.0005).with_name("C")).unwrap();
    b.add_stop(Stop::at("B", 0.0, 0.01).with_name("B")).unwrap();
    b.add_edge(Edge::bus("A", "B", "01", Schedule::from_hours(&[9.0]), 10.0, 1100.0))
        .unwrap();
    b.add_edge(Edge::bus("C", "B", "02", Schedule::from_hours(&[8.5]), 10.0, 1050.0))
        .unwrap();
    Arc::new(b.build())
}

#[test]
fn pair_sweep_keeps_earliest_finish() {
    let planner = planner(two_boarding_stops());
    let it = planner
        .plan_trip(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 0.01), "08:00")
        .unwrap();

    assert_eq!(segment_kinds(&it), vec!["walk Depart", "bus 02", "walk Arrive"]);
    let ItinerarySegment::Walk(access) = &it.segments[0] else {
        panic!("expected walk");
    };
    assert_eq!(access.to.name(), "C");
    assert_eq!(access.distance_m, 55);
    assert_eq!(it.arrival.to_string(), "08:50");
}

#[test]
fn virtual_endpoints_can_skip_the_bus_entirely() {
    let config = PlannerConfig::default().with_strategy(CandidateStrategy::VirtualEndpoints);
    let planner = TripPlanner::new(one_bus_line(&[8.0, 8.25, 8.5]), config);

    // B is a 111 m walk away, which beats waiting for any bus.
    let it = planner
        .plan_trip(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 0.001), "08:00")
        .unwrap();
    assert_eq!(segment_kinds(&it), vec!["walk Depart"]);
    assert_eq!(it.arrival.to_string(), "08:01");
    let ItinerarySegment::Walk(walk) = &it.segments[0] else {
        panic!("expected walk");
    };
    assert_eq!(walk.distance_m, 111);
}

#[test]
fn walking_is_not_slowed_by_rush_hour() {
    let mut b = GraphBuilder::new();
    b.add_stop(Stop::at("A", 0.0, 0.0)).unwrap();
    b.add_stop(Stop::at("B", 0.0, 0.002)).unwrap();
    b.add_edge(Edge::walk("A", "B", 3.0, 222.0)).unwrap();
    let planner = planner(Arc::new(b.build()));

    let origin = GeoPoint::new(0.0, 0.0);
    let destination = GeoPoint::new(0.0, 0.002);
    let rush = planner.plan_trip(origin, destination, "08:00").unwrap();
    let calm = planner.plan_trip(origin, destination, "12:00").unwrap();

    assert_eq!(rush.total_duration_mins, calm.total_duration_mins);
    assert_eq!(rush.total_duration_mins, 3);
    assert_eq!(segment_kinds(&rush), vec!["walk Depart"]);
}

#[test]
fn nearest_stops_are_closest_first() {
    let planner = planner(two_boarding_stops());
    let near = planner.nearest_stops(0.0, 0.0004, 2);
    let ids: Vec<&str> = near.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["C", "A"]);
    assert!(near[0].distance_m <= near[1].distance_m);
}

#[test]
fn unlabelled_route_hops_merge_into_one_ride() {
    // Stops 1110 m apart; neither bus edge carries a route id.
    let snapshot = r#"{
        "stops": [
            {"id": "A", "lat": 0.0, "lon": 0.0},
            {"id": "B", "lat": 0.0, "lon": 0.01},
            {"id": "C", "lat": 0.0, "lon": 0.02}
        ],
        "edges": [
            {"from": "A", "to": "B", "kind": "bus", "schedule": [12.0], "base_travel_time": 5.0},
            {"from": "B", "to": "C", "kind": "bus", "schedule": [12.1], "base_travel_time": 5.0}
        ]
    }"#;
    let graph = crate::graph::Snapshot::from_reader(snapshot.as_bytes())
        .unwrap()
        .into_graph()
        .unwrap();
    let planner = planner(Arc::new(graph));

    let it = planner
        .plan_trip(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 0.02), "11:55")
        .unwrap();

    assert_eq!(
        segment_kinds(&it),
        vec!["walk Depart", "bus -", "walk Arrive"]
    );
    let ItinerarySegment::Bus(bus) = &it.segments[1] else {
        panic!("expected bus segment");
    };
    assert_eq!(bus.route_id, None);
    assert_eq!(bus.boards.to_string(), "12:00");
    assert_eq!(bus.alights.to_string(), "12:11");
    assert_eq!(bus.polyline.len(), 3);
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    struct EdgeSpec {
        from: usize,
        to: usize,
        bus: bool,
        schedule: Vec<f64>,
        minutes: f64,
    }

    fn network() -> impl Strategy<Value = (Vec<(f64, f64)>, Vec<EdgeSpec>)> {
        (2usize..7).prop_flat_map(|n| {
            let positions = prop::collection::vec((0.0f64..0.01, 0.0f64..0.01), n);
            let edge = (
                0..n,
                0..n,
                any::<bool>(),
                prop::collection::vec(5.0f64..23.0, 0..4),
                1.0f64..30.0,
            )
                .prop_map(|(from, to, bus, schedule, minutes)| EdgeSpec {
                    from,
                    to,
                    bus,
                    schedule,
                    minutes,
                });
            (positions, prop::collection::vec(edge, 0..15))
        })
    }

    fn build(positions: &[(f64, f64)], edges: &[EdgeSpec]) -> TransitGraph {
        let mut b = GraphBuilder::new();
        for (i, &(lat, lon)) in positions.iter().enumerate() {
            b.add_stop(Stop::at(format!("S{i}"), lat, lon)).unwrap();
        }
        for (i, link) in edges.iter().enumerate() {
            let (from, to) = (format!("S{}", link.from), format!("S{}", link.to));
            let edge = if link.bus {
                let route = format!("{:02}", i % 3);
                Edge::bus(from, to, route, Schedule::from_hours(&link.schedule), link.minutes, 500.0)
            } else {
                Edge::walk(from, to, link.minutes, 500.0)
            };
            b.add_edge(edge).unwrap();
        }
        b.build()
    }

    proptest! {
        #[test]
        fn walk_only_duration_ignores_departure_time(
            minutes in prop::collection::vec(0.5f64..30.0, 1..6),
            first in 0.0f64..30.0,
            second in 0.0f64..30.0,
        ) {
            let mut b = GraphBuilder::new();
            for i in 0..=minutes.len() {
                b.add_stop(Stop::at(format!("S{i}"), 0.0, i as f64 * 0.001)).unwrap();
            }
            for (i, m) in minutes.iter().enumerate() {
                b.add_edge(Edge::walk(format!("S{i}"), format!("S{}", i + 1), *m, 100.0)).unwrap();
            }
            let g = b.build();
            let config = PlannerConfig::default();
            let router = Router::new(&g, &config);
            let last = StopIdx(minutes.len() as u32);

            let a = router.find_path(StopIdx(0), last, t(first)).unwrap();
            let b = router.find_path(StopIdx(0), last, t(second)).unwrap();
            let da = a.arrival.hours() - first;
            let db = b.arrival.hours() - second;
            prop_assert!((da - db).abs() < 1e-9, "{} vs {}", da, db);
        }

        #[test]
        fn routed_legs_are_consistent(
            (positions, edges) in network(),
            start_hour in 5.0f64..22.0,
        ) {
            let g = build(&positions, &edges);
            let config = PlannerConfig::default();
            let router = Router::new(&g, &config);
            let n = g.stop_count() as u32;

            for s in 0..n {
                for e in 0..n {
                    let Ok(path) = router.find_path(StopIdx(s), StopIdx(e), t(start_hour)) else {
                        continue;
                    };
                    if s == e {
                        prop_assert!(path.legs.is_empty());
                        continue;
                    }
                    prop_assert!(!path.legs.is_empty());
                    prop_assert_eq!(path.legs[0].from, StopIdx(s));
                    prop_assert_eq!(path.legs.last().unwrap().to, StopIdx(e));
                    prop_assert_eq!(path.legs.last().unwrap().arrival, path.arrival);

                    let mut at = t(start_hour);
                    for leg in &path.legs {
                        prop_assert!(leg.wait_mins >= -1e-9);
                        prop_assert!(leg.departure >= at);
                        let edge = g.edge(leg.edge);
                        match leg.kind {
                            EdgeKind::Walk => prop_assert_eq!(leg.departure, at),
                            EdgeKind::Bus => {
                                let schedule = edge.schedule.as_ref().unwrap();
                                prop_assert!(schedule.departures().contains(&leg.departure));
                            }
                        }
                        prop_assert!(leg.arrival >= leg.departure);
                        at = leg.arrival;
                    }
                    for pair in path.legs.windows(2) {
                        prop_assert_eq!(pair[0].to, pair[1].from);
                    }
                }
            }
        }

        #[test]
        fn virtual_endpoints_never_finish_later(
            (positions, edges) in network(),
            origin in (0.0f64..0.01, 0.0f64..0.01),
            destination in (0.0f64..0.01, 0.0f64..0.01),
            start_hour in 5.0f64..22.0,
        ) {
            // Without the rush penalty every edge is first-in first-out, so
            // one multi-source search is exact.
            let base = PlannerConfig {
                rush_windows: vec![],
                ..PlannerConfig::default()
            };
            let g = Arc::new(build(&positions, &edges));
            let sweep = TripPlanner::new(g.clone(), base.clone());
            let virt = TripPlanner::new(
                g,
                base.with_strategy(CandidateStrategy::VirtualEndpoints),
            );
            let origin = GeoPoint::new(origin.0, origin.1);
            let destination = GeoPoint::new(destination.0, destination.1);

            if let Ok(swept) = sweep.plan(origin, destination, t(start_hour)) {
                let joined = virt.plan(origin, destination, t(start_hour)).unwrap();
                prop_assert!(joined.arrival.hours() <= swept.arrival.hours() + 1e-9);
            }
        }

        #[test]
        fn merged_segments_never_repeat(
            hops in prop::collection::vec(0usize..3, 1..12),
        ) {
            // A line of stops with a walk and two bus routes on every hop.
            let mut b = GraphBuilder::new();
            for i in 0..=hops.len() {
                b.add_stop(Stop::at(format!("S{i}"), 0.0, i as f64 * 0.001)).unwrap();
            }
            for i in 0..hops.len() {
                let (from, to) = (format!("S{i}"), format!("S{}", i + 1));
                b.add_edge(Edge::walk(from.clone(), to.clone(), 2.0, 100.0)).unwrap();
                for route in ["1", "2"] {
                    let schedule = Schedule::from_hours(&[8.0]);
                    b.add_edge(Edge::bus(from.clone(), to.clone(), route, schedule, 2.0, 100.0))
                        .unwrap();
                }
            }
            let g = b.build();

            let mut builder = ItineraryBuilder::new(
                &g,
                GeoPoint::new(0.0, -0.001),
                GeoPoint::new(0.0, hops.len() as f64 * 0.001 + 0.001),
                t(8.0),
                Walkway { stop: StopIdx(0), distance_m: 111.0, minutes: 1.4 },
                Walkway { stop: StopIdx(hops.len() as u32), distance_m: 111.0, minutes: 1.4 },
            );
            let mut clock = t(8.0);
            for (i, &choice) in hops.iter().enumerate() {
                let from = StopIdx(i as u32);
                let edge = g.out_edges(from).nth(choice).unwrap();
                let data = g.edge(edge);
                let arrival = clock.add_minutes(2.0);
                builder.push(&PathLeg {
                    from,
                    to: g.endpoints(edge).1,
                    edge,
                    kind: data.kind,
                    route_id: data.route_id.clone(),
                    departure: clock,
                    arrival,
                    wait_mins: 0.0,
                });
                clock = arrival;
            }
            let it = builder.finish(clock, clock.add_minutes(1.4));

            prop_assert!(matches!(
                it.segments.first(),
                Some(ItinerarySegment::Walk(w)) if w.from == Place::Origin
            ));
            prop_assert!(matches!(
                it.segments.last(),
                Some(ItinerarySegment::Walk(w)) if w.to == Place::Destination
            ));
            for pair in it.segments.windows(2) {
                match (&pair[0], &pair[1]) {
                    (ItinerarySegment::Walk(_), ItinerarySegment::Walk(_)) => {
                        prop_assert!(false, "two walks in a row");
                    }
                    (ItinerarySegment::Bus(a), ItinerarySegment::Bus(b)) => {
                        prop_assert_ne!(&a.route_id, &b.route_id);
                    }
                    _ => {}
                }
            }
        }
    }
}
