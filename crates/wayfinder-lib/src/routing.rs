use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::graph::{Graph, NodeId, Room};
use crate::path::{k_shortest_paths, PathCandidate, SearchBudget};

/// Number of routes returned when the caller does not ask for a count.
pub const DEFAULT_ROUTE_COUNT: usize = 3;

/// Number of room ids offered when a room is unknown.
const MAX_SUGGESTIONS: usize = 3;

/// A route between two rooms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub node_path: Vec<NodeId>,
    /// One line id per hop, skipping hops without one. Where two nodes are
    /// joined by parallel edges the hop uses the lightest of them (the first
    /// stored one on ties), the same edge that contributes to `total_weight`.
    pub line_ids: Vec<String>,
    /// Sum of the lightest parallel edge weight of every hop.
    pub total_weight: f64,
}

/// High-level routing request between two rooms.
#[derive(Debug, Clone)]
pub struct RouteQuery {
    pub source: String,
    pub target: String,
    pub k: usize,
    /// Wall-clock bound on the whole enumeration.
    pub deadline: Option<Duration>,
}

impl RouteQuery {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            k: DEFAULT_ROUTE_COUNT,
            deadline: None,
        }
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// The `k` lowest-weight distinct routes between any door of `source` and
/// any door of `target`.
pub fn find_top_k(graph: &Graph, source: &str, target: &str, k: usize) -> Result<Vec<Route>> {
    plan_routes(graph, &RouteQuery::new(source, target).with_k(k))
}

/// Resolve a [`RouteQuery`] against the graph.
///
/// Every ordered door pair contributes up to `k` loopless paths; pairs whose
/// doors coincide are skipped. The pooled candidates are ordered by weight
/// (stable, so earlier door pairs win ties), deduplicated by node sequence,
/// and cut to `k`.
pub fn plan_routes(graph: &Graph, query: &RouteQuery) -> Result<Vec<Route>> {
    if query.k == 0 {
        return Err(Error::InvalidRouteCount { k: query.k });
    }

    let source = resolve_room(graph, &query.source)?;
    let target = resolve_room(graph, &query.target)?;
    let budget = SearchBudget::new(query.deadline);

    let mut pool: Vec<PathCandidate> = Vec::new();
    let mut pairs = 0usize;
    for door_a in &source.doors {
        for door_b in &target.doors {
            if door_a == door_b {
                debug!(door = %door_a, "skipping door shared by both rooms");
                continue;
            }
            pairs += 1;
            let paths = k_shortest_paths(graph, door_a, door_b, query.k, &budget)?;
            debug!(from = %door_a, to = %door_b, paths = paths.len(), "door pair searched");
            pool.extend(paths);
        }
    }

    if pool.is_empty() {
        return Err(Error::NoRouteFound {
            from: source.id.clone(),
            to: target.id.clone(),
        });
    }

    let mut routes = Vec::with_capacity(query.k);
    for candidate in &mut pool {
        candidate.weight = graph
            .path_weight(&candidate.nodes)
            .ok_or_else(|| Error::assembly("enumerated path uses a missing edge"))?;
    }
    pool.sort_by(|a, b| a.weight.total_cmp(&b.weight));

    let mut seen = HashSet::new();
    for candidate in pool {
        if routes.len() == query.k {
            break;
        }
        if !seen.insert(candidate.nodes.clone()) {
            continue;
        }
        routes.push(to_route(graph, candidate));
    }

    info!(
        source = %source.id,
        target = %target.id,
        door_pairs = pairs,
        routes = routes.len(),
        "planned routes"
    );

    Ok(routes)
}

fn resolve_room<'a>(graph: &'a Graph, id: &str) -> Result<&'a Room> {
    let room = graph.room(id).ok_or_else(|| Error::UnknownRoom {
        id: id.to_string(),
        suggestions: graph.suggest_rooms(id, MAX_SUGGESTIONS),
    })?;
    if room.doors.is_empty() {
        return Err(Error::RoomUnroutable {
            room: room.id.clone(),
        });
    }
    Ok(room)
}

fn to_route(graph: &Graph, candidate: PathCandidate) -> Route {
    let line_ids = candidate
        .nodes
        .windows(2)
        .filter_map(|hop| graph.edge_between(&hop[0], &hop[1]))
        .filter_map(|edge| edge.line_id.clone())
        .collect();
    Route {
        node_path: candidate.nodes,
        line_ids,
        total_weight: candidate.weight,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeKind, EdgeRecord};
    use crate::test_helpers::{door, office, scenario_a, scenario_a_builder};

    #[test]
    fn scenario_a_returns_two_best_routes() {
        let graph = scenario_a();
        let routes = find_top_k(&graph, "RoomX", "RoomY", 2).unwrap();
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].node_path, vec!["A", "B", "C", "D"]);
        assert_eq!(routes[0].total_weight, 4.0);
        assert_eq!(routes[0].line_ids, vec!["A-B", "B-C", "C-D"]);
        assert_eq!(routes[1].node_path, vec!["A", "C", "D"]);
        assert_eq!(routes[1].total_weight, 6.0);
    }

    #[test]
    fn zero_routes_is_rejected() {
        let graph = scenario_a();
        let error = find_top_k(&graph, "RoomX", "RoomY", 0).unwrap_err();
        assert!(matches!(error, Error::InvalidRouteCount { k: 0 }));
    }

    #[test]
    fn doorless_room_is_unroutable() {
        let graph = scenario_a_builder().room(office("Closet", "F", &[])).build();
        let error = find_top_k(&graph, "Closet", "RoomY", 1).unwrap_err();
        assert!(matches!(error, Error::RoomUnroutable { ref room } if room == "Closet"));
    }

    #[test]
    fn unknown_room_offers_suggestions() {
        let graph = scenario_a();
        match find_top_k(&graph, "RoomZ", "RoomY", 1) {
            Err(Error::UnknownRoom { suggestions, .. }) => assert!(!suggestions.is_empty()),
            other => panic!("expected UnknownRoom, got {other:?}"),
        }
    }

    #[test]
    fn shared_door_pair_is_skipped() {
        let graph = scenario_a_builder()
            .room(office("Lobby", "F", &["A", "D"]))
            .build();
        let routes = find_top_k(&graph, "RoomX", "Lobby", 5).unwrap();
        assert!(routes.iter().all(|r| r.node_path.len() > 1));
        assert_eq!(routes[0].node_path, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn disconnected_rooms_have_no_route() {
        let graph = scenario_a_builder()
            .node(door("E", "F", 50.0, 50.0))
            .room(office("Island", "F", &["E"]))
            .build();
        let error = find_top_k(&graph, "RoomX", "Island", 3).unwrap_err();
        assert!(matches!(error, Error::NoRouteFound { .. }));
        assert_eq!(error.kind(), crate::error::ErrorKind::NotFound);
    }

    #[test]
    fn parallel_edges_report_the_lightest_line() {
        let mut parts = scenario_a_builder().parts();
        parts.edges.push(EdgeRecord {
            source: "A".to_string(),
            target: "B".to_string(),
            weight: 0.5,
            line_id: Some("A-B-short".to_string()),
            kind: EdgeKind::Walkway,
        });
        let graph = Graph::from_parts(parts).unwrap();

        let routes = find_top_k(&graph, "RoomX", "RoomY", 1).unwrap();
        assert_eq!(routes[0].node_path, vec!["A", "B", "C", "D"]);
        assert_eq!(routes[0].line_ids, vec!["A-B-short", "B-C", "C-D"]);
        assert_eq!(routes[0].total_weight, 3.5);
    }

    #[test]
    fn duplicated_doors_do_not_duplicate_routes() {
        let graph = scenario_a_builder()
            .room(office("Twice", "F", &["D", "D"]))
            .build();
        let routes = find_top_k(&graph, "RoomX", "Twice", 4).unwrap();
        assert_eq!(routes.len(), 2);
        assert_ne!(routes[0].node_path, routes[1].node_path);
    }
}
