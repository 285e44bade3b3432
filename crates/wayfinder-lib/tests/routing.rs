mod common;

use std::collections::HashSet;
use std::time::Duration;

use wayfinder_lib::{find_top_k, plan_routes, Error, ErrorKind, RouteQuery};

use common::fixture_graph;

#[test]
fn cross_floor_route_goes_through_the_stairwell() {
    let graph = fixture_graph();
    let routes = find_top_k(&graph, "Floor_First_Office_101", "Floor_Second_Office_201", 3)
        .expect("route exists");

    assert_eq!(routes.len(), 2);
    let best = &routes[0];
    assert_eq!(
        best.node_path,
        vec![
            "Floor_First_Door_Office_101_1",
            "Floor_First_Intersection_1",
            "Floor_First_Intersection_2",
            "Floor_First_Door_Stairs_1_1",
            "Floor_Second_Door_Stairs_1_1",
            "Floor_Second_Intersection_1",
            "Floor_Second_Door_Office_201_1",
        ]
    );
    assert_eq!(
        best.line_ids,
        vec![
            "Floor_First_AllowedLine_a1",
            "Floor_First_AllowedLine_a2",
            "Floor_First_AllowedLine_a5",
            "Floor_First_Stairs_1",
            "Floor_Second_AllowedLine_b2",
            "Floor_Second_AllowedLine_b1",
        ]
    );
    let expected = 66.0 + 70.0 + 46.0 + 50.0 + 46.0 + 9256f64.sqrt();
    assert!((best.total_weight - expected).abs() < 1e-9);
    assert_eq!(routes[1].node_path[0], "Floor_First_Door_Office_101_2");
}

#[test]
fn best_route_may_start_at_any_door() {
    let graph = fixture_graph();
    let routes = find_top_k(&graph, "Floor_First_Office_101", "Floor_First_Office_102", 1)
        .expect("route exists");
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].node_path[0], "Floor_First_Door_Office_101_2");
    assert_eq!(
        routes[0].node_path.last().map(String::as_str),
        Some("Floor_First_Door_Office_102_1")
    );
}

#[test]
fn route_properties_hold_for_every_room_pair() {
    let graph = fixture_graph();
    let rooms: Vec<&str> = graph
        .rooms()
        .iter()
        .filter(|room| !room.doors.is_empty())
        .map(|room| room.id.as_str())
        .collect();

    for source in &rooms {
        for target in &rooms {
            for k in [1, 2, 4] {
                let routes = match find_top_k(&graph, source, target, k) {
                    Ok(routes) => routes,
                    Err(Error::NoRouteFound { .. }) => continue,
                    Err(other) => panic!("{source} -> {target}: {other}"),
                };
                assert!(!routes.is_empty());
                assert!(routes.len() <= k);
                assert!(routes
                    .windows(2)
                    .all(|pair| pair[0].total_weight <= pair[1].total_weight));

                let unique: HashSet<&Vec<String>> = routes.iter().map(|r| &r.node_path).collect();
                assert_eq!(unique.len(), routes.len());

                for route in &routes {
                    let recomputed = graph.path_weight(&route.node_path).expect("path is connected");
                    assert!((recomputed - route.total_weight).abs() < 1e-9);
                    let distinct: HashSet<&String> = route.node_path.iter().collect();
                    assert_eq!(distinct.len(), route.node_path.len(), "route is simple");
                    assert!(route.node_path.len() > 1);
                }
            }
        }
    }
}

#[test]
fn disconnected_rooms_report_no_route() {
    let graph = fixture_graph();
    let error = find_top_k(&graph, "Floor_First_Office_Gym", "Floor_First_Office_102", 3)
        .unwrap_err();
    assert!(matches!(error, Error::NoRouteFound { .. }));
    assert_eq!(error.kind(), ErrorKind::NotFound);
}

#[test]
fn doorless_room_is_unroutable_regardless_of_connectivity() {
    let graph = fixture_graph();
    let error = find_top_k(&graph, "Floor_First_Office_101", "Floor_Second_Office_202", 3)
        .unwrap_err();
    assert!(matches!(error, Error::RoomUnroutable { ref room } if room == "Floor_Second_Office_202"));
    assert_eq!(error.kind(), ErrorKind::InvalidRequest);
}

#[test]
fn unknown_rooms_suggest_close_matches() {
    let graph = fixture_graph();
    let error = find_top_k(&graph, "Floor_First_Office_10", "Floor_First_Office_102", 1)
        .unwrap_err();
    match error {
        Error::UnknownRoom { id, suggestions } => {
            assert_eq!(id, "Floor_First_Office_10");
            assert!(suggestions.contains(&"Floor_First_Office_101".to_string()));
        }
        other => panic!("expected UnknownRoom, got {other}"),
    }
}

#[test]
fn expired_deadline_aborts_the_search() {
    let graph = fixture_graph();
    let query = RouteQuery::new("Floor_First_Office_101", "Floor_Second_Office_201")
        .with_deadline(Duration::ZERO);
    let error = plan_routes(&graph, &query).unwrap_err();
    assert!(matches!(error, Error::SearchTimedOut { .. }));
}
