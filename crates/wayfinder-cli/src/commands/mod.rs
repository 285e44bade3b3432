// Module exports for CLI subcommands
//
// Each module handles one subcommand. main.rs parses arguments, resolves the
// shared plan context, and dispatches to these handlers.

use std::path::PathBuf;

use anyhow::{Context, Result};

use wayfinder_cli::output::OutputFormat;
use wayfinder_lib::{load_graph, BuildOptions, Graph};

pub mod assign_doors;
pub mod extract;
pub mod render;
pub mod rooms;
pub mod route;
pub mod snapshot;

pub use assign_doors::AssignDoorsArgs;
pub use extract::ExtractArgs;
pub use render::RenderArgs;
pub use route::RouteArgs;
pub use snapshot::SnapshotArgs;

/// Inputs shared by every subcommand.
#[derive(Debug, Clone)]
pub struct PlanContext {
    pub plan: PathBuf,
    pub options: BuildOptions,
    pub format: OutputFormat,
}

impl PlanContext {
    pub fn read_plan(&self) -> Result<String> {
        std::fs::read_to_string(&self.plan)
            .with_context(|| format!("failed to read floor plan {}", self.plan.display()))
    }

    pub fn load_graph(&self) -> Result<Graph> {
        load_graph(&self.plan, &self.options)
            .with_context(|| format!("failed to load floor plan {}", self.plan.display()))
    }
}
