//! Snapshot build command handler.

use anyhow::{Context, Result};
use clap::Args;

use wayfinder_lib::{build_from_svg, snapshot_path, GraphSnapshot};

use super::PlanContext;

#[derive(Args, Debug, Clone)]
pub struct SnapshotArgs {
    /// Rebuild even if a snapshot already exists.
    #[arg(long)]
    pub force: bool,
}

pub fn handle_snapshot(context: &PlanContext, args: &SnapshotArgs) -> Result<()> {
    let path = snapshot_path(&context.plan);

    if path.exists() && !args.force {
        println!(
            "Graph snapshot already exists at {}\nUse --force to rebuild.",
            path.display()
        );
        return Ok(());
    }

    let source = context.read_plan()?;
    let graph = build_from_svg(&source, &context.options)
        .with_context(|| format!("failed to build graph from {}", context.plan.display()))?;
    GraphSnapshot::new(&graph, source.as_bytes(), &context.options)
        .save(&path)
        .with_context(|| format!("failed to save snapshot to {}", path.display()))?;

    println!(
        "Graph snapshot saved to {} ({} nodes, {} edges)",
        path.display(),
        graph.node_count(),
        graph.edge_count()
    );
    Ok(())
}
