//! Door id assignment for raw drawings.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use wayfinder_cli::output::{emit, format_assignments};
use wayfinder_lib::rewrite_plan_ids;

use super::PlanContext;

#[derive(Args, Debug, Clone)]
pub struct AssignDoorsArgs {
    /// Floor whose doors get new ids; repeat for several floors. Defaults to
    /// the global floor list, then to every floor found in the plan.
    #[arg(long)]
    pub floor: Vec<String>,
    /// Write the plan with the new ids to this file.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl AssignDoorsArgs {
    fn floors(&self, context: &PlanContext) -> Vec<String> {
        if !self.floor.is_empty() {
            return self.floor.clone();
        }
        context.options.floors.clone().unwrap_or_default()
    }
}

pub fn handle_assign_doors(context: &PlanContext, args: &AssignDoorsArgs) -> Result<()> {
    let source = context.read_plan()?;
    let floors = args.floors(context);
    let rewrite = rewrite_plan_ids(&source, &floors, context.options.match_threshold)
        .with_context(|| format!("failed to assign door ids in {}", context.plan.display()))?;

    if let Some(path) = &args.output {
        fs::write(path, &rewrite.svg)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(
            path = %path.display(),
            doors = rewrite.assignments.len(),
            generated = rewrite.generated_ids.len(),
            "wrote floor plan with assigned ids"
        );
    }

    emit(&format_assignments(&rewrite.assignments, context.format)?)
}
