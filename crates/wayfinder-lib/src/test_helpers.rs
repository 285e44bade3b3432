// Test-only helpers for `wayfinder-lib` tests
#![allow(dead_code)]

use crate::geometry::{Point, Rect};
use crate::graph::{
    EdgeKind, EdgeRecord, FloorLayer, Graph, GraphParts, Node, NodeKind, Room, RoomKind,
};

pub fn door(id: &str, floor: &str, x: f64, y: f64) -> Node {
    Node {
        id: id.to_string(),
        floor: floor.to_string(),
        kind: NodeKind::Door,
        position: Point::new(x, y),
        room: None,
    }
}

pub fn intersection(id: &str, floor: &str, x: f64, y: f64) -> Node {
    Node {
        kind: NodeKind::Intersection,
        ..door(id, floor, x, y)
    }
}

pub fn office(id: &str, floor: &str, doors: &[&str]) -> Room {
    Room {
        id: id.to_string(),
        floor: floor.to_string(),
        kind: RoomKind::Office,
        bounds: Rect::default(),
        doors: doors.iter().map(|d| d.to_string()).collect(),
    }
}

/// Builder for hand-made graphs with sensible defaults.
pub struct PartsBuilder {
    parts: GraphParts,
}

impl PartsBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            parts: GraphParts::default(),
        }
    }

    pub fn floor(mut self, id: &str) -> Self {
        let index = self.parts.floors.len();
        self.parts.floors.push(FloorLayer {
            id: id.to_string(),
            index,
            group_ids: vec![id.to_string()],
            line_ids: Vec::new(),
            lines_group: Some(format!("{id}_AllowedLines")),
            intersections_group: Some(format!("{id}_Intersections")),
        });
        self
    }

    pub fn node(mut self, node: Node) -> Self {
        self.parts.nodes.push(node);
        self
    }

    pub fn room(mut self, room: Room) -> Self {
        self.parts.rooms.push(room);
        self
    }

    /// Walkway edge whose line id is `<a>-<b>`, registered on `a`'s floor.
    pub fn walkway(mut self, a: &str, b: &str, weight: f64) -> Self {
        let line_id = format!("{a}-{b}");
        let floor = self
            .parts
            .nodes
            .iter()
            .find(|node| node.id == a)
            .map(|node| node.floor.clone());
        if let Some(layer) = floor.and_then(|f| self.parts.floors.iter_mut().find(|l| l.id == f)) {
            layer.line_ids.push(line_id.clone());
        }
        self.parts.edges.push(EdgeRecord {
            source: a.to_string(),
            target: b.to_string(),
            weight,
            line_id: Some(line_id),
            kind: EdgeKind::Walkway,
        });
        self
    }

    pub fn parts(self) -> GraphParts {
        self.parts
    }

    pub fn build(self) -> Graph {
        Graph::from_parts(self.parts).expect("test graph assembles")
    }
}

impl Default for PartsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Nodes `A..D` on floor `F`; edges A-B(1), B-C(2), A-C(5), C-D(1).
/// Room `RoomX` opens through `A`, `RoomY` through `D`.
pub fn scenario_a() -> Graph {
    scenario_a_builder().build()
}

pub fn scenario_a_builder() -> PartsBuilder {
    PartsBuilder::new()
        .floor("F")
        .node(door("A", "F", 0.0, 0.0))
        .node(intersection("B", "F", 1.0, 0.0))
        .node(intersection("C", "F", 3.0, 0.0))
        .node(door("D", "F", 4.0, 0.0))
        .room(office("RoomX", "F", &["A"]))
        .room(office("RoomY", "F", &["D"]))
        .walkway("A", "B", 1.0)
        .walkway("B", "C", 2.0)
        .walkway("A", "C", 5.0)
        .walkway("C", "D", 1.0)
}
