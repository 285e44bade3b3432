//! Render command: restyle the floor plan for one floor.

use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Args;
use tracing::info;

use wayfinder_cli::output::emit;
use wayfinder_lib::{add_room_labels, apply_to_svg, find_top_k, render, RenderOptions};

use super::PlanContext;

#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    /// Floor to display.
    #[arg(long)]
    pub floor: String,
    /// Source room of the route to draw.
    #[arg(long = "from", requires = "to")]
    pub from: Option<String>,
    /// Target room of the route to draw.
    #[arg(long = "to", requires = "from")]
    pub to: Option<String>,
    /// Which of the ranked routes to draw (0 is the best).
    #[arg(long, default_value_t = 0)]
    pub route_index: usize,
    /// Draw a centred name on every office.
    #[arg(long)]
    pub labels: bool,
    /// Where to write the SVG; stdout when omitted.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub fn handle_render(context: &PlanContext, args: &RenderArgs) -> Result<()> {
    let source = context.read_plan()?;
    let graph = context.load_graph()?;
    let options = RenderOptions::default();

    let route = match (&args.from, &args.to) {
        (Some(from), Some(to)) => {
            let mut routes = find_top_k(&graph, from, to, args.route_index + 1)
                .with_context(|| format!("failed to route {from} -> {to}"))?;
            if args.route_index >= routes.len() {
                return Err(anyhow!(
                    "route index {} out of range: only {} route(s) found",
                    args.route_index,
                    routes.len()
                ));
            }
            Some(routes.swap_remove(args.route_index))
        }
        _ => None,
    };

    let styles = render(&graph, route.as_ref(), &args.floor, &options)?;
    let source = if args.labels {
        add_room_labels(&source, &graph, &options)?
    } else {
        source
    };
    let svg = apply_to_svg(&source, &styles, &options)?;

    match &args.output {
        Some(path) => {
            fs::write(path, svg).with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), floor = %args.floor, "wrote rendered floor plan");
            Ok(())
        }
        None => emit(&svg),
    }
}
