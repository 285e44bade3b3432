//! Route command handler for computing the best routes between two rooms.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use wayfinder_cli::output::{emit, format_routes};
use wayfinder_lib::{plan_routes, RouteQuery, RouteSummary, DEFAULT_ROUTE_COUNT};

use super::PlanContext;

/// Arguments for the route command.
#[derive(Args, Debug, Clone)]
pub struct RouteArgs {
    /// Source room id.
    #[arg(long = "from")]
    pub from: String,
    /// Target room id.
    #[arg(long = "to")]
    pub to: String,
    /// Number of routes to return.
    #[arg(short = 'k', long = "count", default_value_t = DEFAULT_ROUTE_COUNT)]
    pub k: usize,
    /// Abort the search after this many milliseconds.
    #[arg(long = "timeout-ms")]
    pub timeout_ms: Option<u64>,
}

impl RouteArgs {
    pub fn query(&self) -> RouteQuery {
        let query = RouteQuery::new(&self.from, &self.to).with_k(self.k);
        match self.timeout_ms {
            Some(ms) => query.with_deadline(Duration::from_millis(ms)),
            None => query,
        }
    }
}

pub fn handle_route(context: &PlanContext, args: &RouteArgs) -> Result<()> {
    let graph = context.load_graph()?;
    let routes = plan_routes(&graph, &args.query())
        .with_context(|| format!("failed to route {} -> {}", args.from, args.to))?;
    let summary = RouteSummary::from_routes(&graph, &args.from, &args.to, &routes)?;
    emit(&format_routes(&summary, context.format)?)
}
