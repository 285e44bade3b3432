use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::BuildOptions;
use crate::error::{Error, Result};
use crate::extract::FloorExtraction;
use crate::geometry::{Point, Rect};
use crate::ids;
use crate::matcher::PointIndex;

/// Globally unique, floor-prefixed node identifier.
pub type NodeId = String;
/// Room or stairwell identifier.
pub type RoomId = String;
/// Floor key, as used to name the floor's groups in the plan.
pub type FloorId = String;

/// Minimum Jaro-Winkler similarity for a room id to be offered as a suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// Classification of a routable point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Door,
    Intersection,
}

/// A routable point: a door threshold or a walkway junction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub floor: FloorId,
    pub kind: NodeKind,
    pub position: Point,
    /// Owning room for doors.
    pub room: Option<RoomId>,
}

/// Classification for the edge used in the routing graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Drawn walkable segment on one floor.
    Walkway,
    /// Synthetic connection between stairwell doors on different floors.
    Stairs,
}

/// Undirected edge as stored in the graph; endpoints index the node table.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    source: usize,
    target: usize,
    pub weight: f64,
    pub line_id: Option<String>,
    pub kind: EdgeKind,
}

impl Edge {
    /// Endpoint opposite to `node`.
    pub(crate) fn other(&self, node: usize) -> usize {
        if self.source == node {
            self.target
        } else {
            self.source
        }
    }
}

/// Id-based edge description used to assemble or export a graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub source: NodeId,
    pub target: NodeId,
    pub weight: f64,
    pub line_id: Option<String>,
    pub kind: EdgeKind,
}

/// What kind of walkable-through region a room is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomKind {
    Office,
    /// Stairwell sharing `key` with its counterparts on other floors.
    Stairwell { key: String },
}

/// A named region reachable through one or more doors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub floor: FloorId,
    pub kind: RoomKind,
    pub bounds: Rect,
    /// Door node ids in drawing order.
    pub doors: Vec<NodeId>,
}

impl Room {
    /// Cross-floor key when the room is a stairwell.
    pub fn stair_key(&self) -> Option<&str> {
        match &self.kind {
            RoomKind::Stairwell { key } => Some(key),
            RoomKind::Office => None,
        }
    }
}

/// Per-floor drawing metadata the renderer needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorLayer {
    pub id: FloorId,
    /// Position in the bottom-to-top floor order.
    pub index: usize,
    /// Floor groups that are dimmed or hidden as a whole (rooms, stairs, doors).
    pub group_ids: Vec<String>,
    /// Every walkable line drawn on this floor, in drawing order.
    pub line_ids: Vec<String>,
    pub lines_group: Option<String>,
    pub intersections_group: Option<String>,
}

/// Serializable description of a whole building graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphParts {
    pub floors: Vec<FloorLayer>,
    pub nodes: Vec<Node>,
    pub rooms: Vec<Room>,
    pub edges: Vec<EdgeRecord>,
}

#[derive(Debug)]
struct GraphInner {
    floors: Vec<FloorLayer>,
    nodes: Vec<Node>,
    rooms: Vec<Room>,
    edges: Vec<Edge>,
    node_index: HashMap<NodeId, usize>,
    room_index: HashMap<RoomId, usize>,
    floor_index: HashMap<FloorId, usize>,
    adjacency: Vec<Vec<usize>>,
    line_floors: HashMap<String, usize>,
}

/// Immutable multi-floor routing graph. Cloning is cheap and clones share
/// the same storage, so one build can serve any number of readers.
#[derive(Debug, Clone)]
pub struct Graph {
    inner: Arc<GraphInner>,
}

impl Graph {
    /// Validate and index a set of parts.
    ///
    /// Fails with [`Error::GraphAssemblyError`] when ids collide or when an
    /// edge, room, or node references something that does not exist.
    pub fn from_parts(parts: GraphParts) -> Result<Self> {
        let GraphParts {
            mut floors,
            nodes,
            rooms,
            edges: records,
        } = parts;

        let mut floor_index = HashMap::with_capacity(floors.len());
        for (index, floor) in floors.iter_mut().enumerate() {
            floor.index = index;
            if floor_index.insert(floor.id.clone(), index).is_some() {
                return Err(Error::assembly(format!("duplicate floor {}", floor.id)));
            }
        }

        let mut node_index = HashMap::with_capacity(nodes.len());
        for (index, node) in nodes.iter().enumerate() {
            if !floor_index.contains_key(&node.floor) {
                return Err(Error::assembly(format!(
                    "node {} is on unknown floor {}",
                    node.id, node.floor
                )));
            }
            if node_index.insert(node.id.clone(), index).is_some() {
                return Err(Error::assembly(format!("duplicate node {}", node.id)));
            }
        }

        let mut room_index = HashMap::with_capacity(rooms.len());
        for (index, room) in rooms.iter().enumerate() {
            if let Some(door) = room.doors.iter().find(|d| !node_index.contains_key(*d)) {
                return Err(Error::assembly(format!(
                    "room {} references missing door {}",
                    room.id, door
                )));
            }
            if room_index.insert(room.id.clone(), index).is_some() {
                return Err(Error::assembly(format!("duplicate room {}", room.id)));
            }
        }

        let mut adjacency = vec![Vec::new(); nodes.len()];
        let mut edges = Vec::with_capacity(records.len());
        for record in records {
            let resolve = |id: &str| {
                node_index.get(id).copied().ok_or_else(|| {
                    Error::assembly(format!("edge references missing node {id}"))
                })
            };
            let source = resolve(&record.source)?;
            let target = resolve(&record.target)?;
            if !(record.weight >= 0.0) {
                return Err(Error::assembly(format!(
                    "edge {} - {} has invalid weight {}",
                    record.source, record.target, record.weight
                )));
            }

            let edge_index = edges.len();
            adjacency[source].push(edge_index);
            if target != source {
                adjacency[target].push(edge_index);
            }
            edges.push(Edge {
                source,
                target,
                weight: record.weight,
                line_id: record.line_id,
                kind: record.kind,
            });
        }

        let mut line_floors = HashMap::new();
        for floor in &floors {
            for line_id in &floor.line_ids {
                line_floors.insert(line_id.clone(), floor.index);
            }
        }
        for edge in &edges {
            if let Some(line_id) = &edge.line_id {
                let floor = floor_index[&nodes[edge.source].floor];
                line_floors.entry(line_id.clone()).or_insert(floor);
            }
        }

        Ok(Self {
            inner: Arc::new(GraphInner {
                floors,
                nodes,
                rooms,
                edges,
                node_index,
                room_index,
                floor_index,
                adjacency,
                line_floors,
            }),
        })
    }

    /// Export the graph as id-based parts (snapshots, JSON dumps).
    pub fn to_parts(&self) -> GraphParts {
        let inner = &self.inner;
        GraphParts {
            floors: inner.floors.clone(),
            nodes: inner.nodes.clone(),
            rooms: inner.rooms.clone(),
            edges: inner
                .edges
                .iter()
                .map(|edge| EdgeRecord {
                    source: inner.nodes[edge.source].id.clone(),
                    target: inner.nodes[edge.target].id.clone(),
                    weight: edge.weight,
                    line_id: edge.line_id.clone(),
                    kind: edge.kind,
                })
                .collect(),
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.inner.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.inner.edges
    }

    pub fn rooms(&self) -> &[Room] {
        &self.inner.rooms
    }

    /// Floors in bottom-to-top order.
    pub fn floors(&self) -> &[FloorLayer] {
        &self.inner.floors
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.node_index(id).map(|index| &self.inner.nodes[index])
    }

    pub fn room(&self, id: &str) -> Option<&Room> {
        self.inner
            .room_index
            .get(id)
            .map(|&index| &self.inner.rooms[index])
    }

    pub fn floor(&self, id: &str) -> Option<&FloorLayer> {
        self.inner
            .floor_index
            .get(id)
            .map(|&index| &self.inner.floors[index])
    }

    /// Floor a line id is drawn on (stair edges report their lower floor).
    pub fn floor_of_line(&self, line_id: &str) -> Option<&FloorLayer> {
        self.inner
            .line_floors
            .get(line_id)
            .map(|&index| &self.inner.floors[index])
    }

    /// Human-readable label for a room, for search and display collaborators.
    pub fn room_label(&self, id: &str) -> Option<String> {
        self.room(id).map(|room| ids::room_label(&room.floor, &room.id))
    }

    /// Known room ids most similar to `id`, best first.
    pub fn suggest_rooms(&self, id: &str, limit: usize) -> Vec<String> {
        let mut scored: Vec<(f64, &str)> = self
            .inner
            .rooms
            .iter()
            .map(|room| (strsim::jaro_winkler(id, &room.id), room.id.as_str()))
            .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        scored
            .into_iter()
            .take(limit)
            .map(|(_, id)| id.to_string())
            .collect()
    }

    /// Representative edge between two nodes: the lightest of any parallel
    /// edges, the first stored one on ties.
    pub fn edge_between(&self, a: &str, b: &str) -> Option<&Edge> {
        let a = self.node_index(a)?;
        let b = self.node_index(b)?;
        self.edge_between_indices(a, b)
    }

    /// Sum of representative edge weights along `path`; `None` when two
    /// consecutive nodes are not adjacent.
    pub fn path_weight(&self, path: &[NodeId]) -> Option<f64> {
        path.windows(2).try_fold(0.0, |total, hop| {
            self.edge_between(&hop[0], &hop[1])
                .map(|edge| total + edge.weight)
        })
    }

    pub fn node_count(&self) -> usize {
        self.inner.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edges.len()
    }

    pub(crate) fn node_index(&self, id: &str) -> Option<usize> {
        self.inner.node_index.get(id).copied()
    }

    pub(crate) fn node_at(&self, index: usize) -> &Node {
        &self.inner.nodes[index]
    }

    /// Edges touching `node`, as `(edge index, edge)`.
    pub(crate) fn incident(&self, node: usize) -> impl Iterator<Item = (usize, &Edge)> + '_ {
        self.inner.adjacency[node]
            .iter()
            .map(move |&edge_index| (edge_index, &self.inner.edges[edge_index]))
    }

    pub(crate) fn edge_between_indices(&self, a: usize, b: usize) -> Option<&Edge> {
        self.incident(a)
            .map(|(_, edge)| edge)
            .filter(|edge| edge.other(a) == b)
            .fold(None, |best: Option<&Edge>, edge| match best {
                Some(current) if current.weight <= edge.weight => Some(current),
                _ => Some(edge),
            })
    }
}

/// Assemble the building graph from per-floor extractions, lowest floor first.
///
/// Segments whose endpoints do not both resolve to a node are dropped with a
/// warning. Stairwells sharing a key are stitched between consecutive floors
/// on which the key appears.
pub fn build_graph(extractions: &[FloorExtraction], options: &BuildOptions) -> Result<Graph> {
    let mut parts = GraphParts::default();
    let mut seen_nodes: HashSet<NodeId> = HashSet::new();
    let mut seen_rooms: HashSet<RoomId> = HashSet::new();
    let mut dropped = 0usize;

    for (index, floor) in extractions.iter().enumerate() {
        parts.floors.push(FloorLayer {
            id: floor.floor.clone(),
            index,
            group_ids: floor.group_ids.clone(),
            line_ids: floor.segments.iter().map(|s| s.id.clone()).collect(),
            lines_group: floor.lines_group.clone(),
            intersections_group: floor.intersections_group.clone(),
        });

        for node in floor.doors.iter().chain(&floor.intersections) {
            if seen_nodes.insert(node.id.clone()) {
                parts.nodes.push(node.clone());
            } else {
                warn!(floor = %floor.floor, node = %node.id, "duplicate node id, keeping first");
            }
        }

        for room in floor.rooms.iter().chain(&floor.stairwells) {
            if seen_rooms.insert(room.id.clone()) {
                parts.rooms.push(room.clone());
            } else {
                warn!(floor = %floor.floor, room = %room.id, "duplicate room id, keeping first");
            }
        }

        let matcher = PointIndex::new(&floor.doors, &floor.intersections);
        for segment in &floor.segments {
            let start = matcher.match_point(segment.start, options.match_threshold);
            let end = matcher.match_point(segment.end, options.match_threshold);
            match (start, end) {
                (Some(source), Some(target)) => parts.edges.push(EdgeRecord {
                    source: source.to_string(),
                    target: target.to_string(),
                    weight: segment.length(),
                    line_id: Some(segment.id.clone()),
                    kind: EdgeKind::Walkway,
                }),
                _ => {
                    dropped += 1;
                    let mismatch = Error::GeometryMismatch {
                        floor: floor.floor.clone(),
                        line_id: segment.id.clone(),
                    };
                    warn!(
                        floor = %floor.floor,
                        line_id = %segment.id,
                        start_matched = start.is_some(),
                        end_matched = end.is_some(),
                        "{mismatch}; segment dropped"
                    );
                }
            }
        }
    }

    let stitched = stitch_stairwells(&mut parts, options.stair_weight)?;
    let graph = Graph::from_parts(parts)?;

    info!(
        floors = graph.floors().len(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        stair_edges = stitched,
        dropped_segments = dropped,
        "assembled building graph"
    );

    Ok(graph)
}

/// Add stair edges between every door pair of same-keyed stairwells on
/// consecutive floors. Returns the number of edges added.
fn stitch_stairwells(parts: &mut GraphParts, weight: f64) -> Result<usize> {
    let floor_order: HashMap<&str, usize> = parts
        .floors
        .iter()
        .enumerate()
        .map(|(index, floor)| (floor.id.as_str(), index))
        .collect();
    let node_ids: HashSet<&str> = parts.nodes.iter().map(|node| node.id.as_str()).collect();

    // key -> floor index -> stairwell positions in `parts.rooms`
    let mut by_key: BTreeMap<&str, BTreeMap<usize, Vec<usize>>> = BTreeMap::new();
    for (position, room) in parts.rooms.iter().enumerate() {
        let Some(key) = room.stair_key() else {
            continue;
        };
        let floor = *floor_order.get(room.floor.as_str()).ok_or_else(|| {
            Error::assembly(format!(
                "stairwell {} is on unknown floor {}",
                room.id, room.floor
            ))
        })?;
        by_key
            .entry(key)
            .or_default()
            .entry(floor)
            .or_default()
            .push(position);
    }

    let mut stitched = Vec::new();
    for (key, levels) in &by_key {
        let levels: Vec<&Vec<usize>> = levels.values().collect();
        for pair in levels.windows(2) {
            for &lower in pair[0] {
                for &upper in pair[1] {
                    let lower = &parts.rooms[lower];
                    let upper = &parts.rooms[upper];
                    for door_a in &lower.doors {
                        for door_b in &upper.doors {
                            for door in [door_a, door_b] {
                                if !node_ids.contains(door.as_str()) {
                                    return Err(Error::assembly(format!(
                                        "stairwell door {door} is not a graph node"
                                    )));
                                }
                            }
                            stitched.push(EdgeRecord {
                                source: door_a.clone(),
                                target: door_b.clone(),
                                weight,
                                line_id: Some(lower.id.clone()),
                                kind: EdgeKind::Stairs,
                            });
                        }
                    }
                }
            }
        }
        debug!(key, floors = levels.len(), "stitched stairwell");
    }

    let count = stitched.len();
    parts.edges.extend(stitched);
    Ok(count)
}
