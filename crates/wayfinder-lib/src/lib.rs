//! Wayfinder library entry points.
//!
//! This crate turns an SVG floor plan into a multi-floor walkability graph,
//! answers top-K route queries between rooms, and produces per-floor style
//! instructions for drawing a route. Higher-level consumers (the CLI, any
//! service front end) should only depend on the functions exported here
//! instead of reimplementing behavior.
//!

#![deny(warnings)]

pub mod building;
pub mod config;
pub mod error;
pub mod extract;
pub mod geometry;
pub mod graph;
pub mod ids;
pub mod matcher;
pub mod output;
pub mod path;
pub mod render;
pub mod routing;
pub mod snapshot;
mod svg_edit;

#[cfg(test)]
mod test_helpers;

pub use building::{build_from_svg, load_graph, SharedBuilding};
pub use config::BuildOptions;
pub use error::{Error, ErrorKind, Result};
pub use extract::{
    assign_door_ids, extract_plan, rewrite_plan_ids, DoorAssignment, FloorExtraction, PlanRewrite,
    Segment,
};
pub use geometry::{Point, Rect};
pub use graph::{build_graph, Edge, EdgeKind, FloorLayer, Graph, GraphParts, Node, NodeKind, Room, RoomKind};
pub use matcher::{match_point, PointIndex};
pub use output::{room_entries, RoomEntry, RouteRenderMode, RouteSummary};
pub use path::{k_shortest_paths, shortest_path, PathCandidate, SearchBudget};
pub use render::{
    add_room_labels, apply_to_svg, render, FloorStyle, FloorStyles, FloorVisibility, RenderOptions,
};
pub use routing::{find_top_k, plan_routes, Route, RouteQuery, DEFAULT_ROUTE_COUNT};
pub use snapshot::{snapshot_path, try_load_snapshot, GraphSnapshot};
