//! Room listing for search front ends and quick inspection.

use anyhow::Result;

use wayfinder_cli::output::{emit, format_rooms};
use wayfinder_lib::room_entries;

use super::PlanContext;

pub fn handle_rooms(context: &PlanContext) -> Result<()> {
    let graph = context.load_graph()?;
    emit(&format_rooms(&room_entries(&graph), context.format)?)
}
