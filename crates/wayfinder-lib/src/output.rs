use std::fmt::Write;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::graph::{Graph, RoomKind};
use crate::ids::floor_display;
use crate::routing::Route;

/// Presentation style for turning a [`RouteSummary`] into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteRenderMode {
    PlainText,
    RichText,
}

/// Room at either end of a route.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RouteEndpoint {
    pub id: String,
    pub label: String,
}

impl RouteEndpoint {
    fn resolve(graph: &Graph, id: &str) -> Result<Self> {
        let label = graph.room_label(id).ok_or_else(|| Error::UnknownRoom {
            id: id.to_string(),
            suggestions: Vec::new(),
        })?;
        Ok(Self {
            id: id.to_string(),
            label,
        })
    }
}

/// One ranked route option.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteOption {
    pub index: usize,
    pub total_weight: f64,
    pub hops: usize,
    /// Floors the route passes through, in travel order.
    pub floors: Vec<String>,
    pub node_path: Vec<String>,
    pub line_ids: Vec<String>,
}

/// Structured representation of ranked routes that consumers can serialise.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteSummary {
    pub source: RouteEndpoint,
    pub target: RouteEndpoint,
    pub routes: Vec<RouteOption>,
}

impl RouteSummary {
    pub fn from_routes(graph: &Graph, source: &str, target: &str, routes: &[Route]) -> Result<Self> {
        let options = routes
            .iter()
            .enumerate()
            .map(|(index, route)| {
                let mut floors: Vec<String> = Vec::new();
                for node in route.node_path.iter().filter_map(|id| graph.node(id)) {
                    if floors.last() != Some(&node.floor) {
                        floors.push(node.floor.clone());
                    }
                }
                RouteOption {
                    index,
                    total_weight: route.total_weight,
                    hops: route.node_path.len().saturating_sub(1),
                    floors,
                    node_path: route.node_path.clone(),
                    line_ids: route.line_ids.clone(),
                }
            })
            .collect();

        Ok(Self {
            source: RouteEndpoint::resolve(graph, source)?,
            target: RouteEndpoint::resolve(graph, target)?,
            routes: options,
        })
    }

    /// Render the summary using the requested textual mode.
    pub fn render(&self, mode: RouteRenderMode) -> String {
        match mode {
            RouteRenderMode::PlainText => self.render_plain(),
            RouteRenderMode::RichText => self.render_rich(),
        }
    }

    fn render_plain(&self) -> String {
        let mut buffer = String::new();
        let _ = writeln!(
            buffer,
            "Routes: {} -> {} ({} found)",
            self.source.label,
            self.target.label,
            self.routes.len()
        );
        for option in &self.routes {
            let floors = option
                .floors
                .iter()
                .map(|floor| floor_display(floor))
                .collect::<Vec<_>>()
                .join(" -> ");
            let _ = writeln!(
                buffer,
                "{:>3}: weight {:.1}, {} hops, floors {}",
                option.index + 1,
                option.total_weight,
                option.hops,
                floors
            );
            let _ = writeln!(buffer, "     {}", option.node_path.join(" -> "));
        }
        buffer
    }

    fn render_rich(&self) -> String {
        let mut buffer = String::new();
        let _ = writeln!(
            buffer,
            "**Routes** _{} to {}_",
            self.source.label, self.target.label
        );
        for option in &self.routes {
            let _ = writeln!(
                buffer,
                "* {}. weight `{:.1}` over {} hops: {}",
                option.index + 1,
                option.total_weight,
                option.hops,
                option
                    .node_path
                    .iter()
                    .map(|node| format!("`{node}`"))
                    .collect::<Vec<_>>()
                    .join(" → ")
            );
        }
        buffer
    }
}

/// Room metadata handed to search and listing consumers.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RoomEntry {
    pub id: String,
    pub label: String,
    pub floor: String,
    pub stairwell: bool,
    pub doors: usize,
}

/// Every room of the building, in floor order.
pub fn room_entries(graph: &Graph) -> Vec<RoomEntry> {
    let mut entries: Vec<(usize, RoomEntry)> = graph
        .rooms()
        .iter()
        .map(|room| {
            let floor_index = graph.floor(&room.floor).map(|f| f.index).unwrap_or(usize::MAX);
            (
                floor_index,
                RoomEntry {
                    id: room.id.clone(),
                    label: graph.room_label(&room.id).unwrap_or_else(|| room.id.clone()),
                    floor: room.floor.clone(),
                    stairwell: matches!(room.kind, RoomKind::Stairwell { .. }),
                    doors: room.doors.len(),
                },
            )
        })
        .collect();
    entries.sort_by_key(|(floor, _)| *floor);
    entries.into_iter().map(|(_, entry)| entry).collect()
}
