use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use tracing::info;

use crate::config::BuildOptions;
use crate::error::Result;
use crate::extract::extract_plan;
use crate::graph::{build_graph, Graph};
use crate::snapshot::try_load_snapshot;

/// Build a graph straight from SVG text.
pub fn build_from_svg(svg: &str, options: &BuildOptions) -> Result<Graph> {
    let floors = extract_plan(svg, options)?;
    build_graph(&floors, options)
}

/// Load the graph for the plan at `plan_path`, reusing a matching snapshot
/// when one is stored beside the plan.
pub fn load_graph(plan_path: &Path, options: &BuildOptions) -> Result<Graph> {
    let source = fs::read_to_string(plan_path)?;
    if let Some(graph) = try_load_snapshot(plan_path, source.as_bytes(), options) {
        return Ok(graph);
    }

    info!(path = %plan_path.display(), "building graph from floor plan");
    build_from_svg(&source, options)
}

/// A building graph loaded on first use and shared afterwards.
///
/// Concurrent first callers block on a single build; later callers get the
/// same graph. A failed build is not cached, so the next call retries.
#[derive(Debug)]
pub struct SharedBuilding {
    plan_path: PathBuf,
    options: BuildOptions,
    graph: OnceCell<Graph>,
}

impl SharedBuilding {
    pub fn new(plan_path: impl Into<PathBuf>, options: BuildOptions) -> Self {
        Self {
            plan_path: plan_path.into(),
            options,
            graph: OnceCell::new(),
        }
    }

    pub fn plan_path(&self) -> &Path {
        &self.plan_path
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    pub fn is_loaded(&self) -> bool {
        self.graph.get().is_some()
    }

    /// The graph, loading it if no caller has yet.
    pub fn get_or_load(&self) -> Result<&Graph> {
        self.graph
            .get_or_try_init(|| load_graph(&self.plan_path, &self.options))
    }
}
