use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use wayfinder_cli::output::OutputFormat;
use wayfinder_lib::config::{parse_floor_list, BuildOptions};

mod commands;

use commands::{AssignDoorsArgs, ExtractArgs, PlanContext, RenderArgs, RouteArgs, SnapshotArgs};

/// Environment variable naming the floor plan when `--plan` is absent.
const ENV_PLAN: &str = "WAYFINDER_PLAN";

#[derive(Parser, Debug)]
#[command(author, version, about = "Indoor floor-plan routing utilities")]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct GlobalOptions {
    /// SVG floor plan (defaults to $WAYFINDER_PLAN).
    #[arg(long, global = true)]
    plan: Option<PathBuf>,

    /// Comma-separated floor keys, lowest floor first.
    #[arg(long, global = true)]
    floors: Option<String>,

    /// Distance within which a line endpoint snaps to a door or intersection.
    #[arg(long, global = true)]
    threshold: Option<f64>,

    /// Weight of an edge between stairwell doors on consecutive floors.
    #[arg(long, global = true)]
    stair_weight: Option<f64>,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List rooms with their labels and door counts.
    Rooms,
    /// Compute the best routes between two rooms.
    Route(RouteArgs),
    /// Write the floor plan restyled for one floor, optionally with a route.
    Render(RenderArgs),
    /// Dump the per-floor geometry extraction as JSON.
    Extract(ExtractArgs),
    /// Derive structured door ids for a floor from rectangle overlap.
    AssignDoors(AssignDoorsArgs),
    /// Build the graph and store a snapshot beside the plan.
    Snapshot(SnapshotArgs),
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let context = plan_context(&cli.global)?;

    match cli.command {
        Command::Rooms => commands::rooms::handle_rooms(&context),
        Command::Route(args) => commands::route::handle_route(&context, &args),
        Command::Render(args) => commands::render::handle_render(&context, &args),
        Command::Extract(args) => commands::extract::handle_extract(&context, &args),
        Command::AssignDoors(args) => commands::assign_doors::handle_assign_doors(&context, &args),
        Command::Snapshot(args) => commands::snapshot::handle_snapshot(&context, &args),
    }
}

/// Resolve the plan path and build options: flags override the environment.
fn plan_context(global: &GlobalOptions) -> Result<PlanContext> {
    let plan = match &global.plan {
        Some(plan) => plan.clone(),
        None => std::env::var_os(ENV_PLAN)
            .map(PathBuf::from)
            .ok_or_else(|| anyhow!("no floor plan given; pass --plan or set {ENV_PLAN}"))?,
    };

    let mut options = BuildOptions::from_env();
    if let Some(raw) = &global.floors {
        let floors =
            parse_floor_list(raw).ok_or_else(|| anyhow!("--floors must name at least one floor"))?;
        options.floors = Some(floors);
    }
    if let Some(threshold) = global.threshold {
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(anyhow!("--threshold must be positive, got {threshold}"));
        }
        options.match_threshold = threshold;
    }
    if let Some(weight) = global.stair_weight {
        if !weight.is_finite() || weight < 0.0 {
            return Err(anyhow!("--stair-weight must not be negative, got {weight}"));
        }
        options.stair_weight = weight;
    }

    Ok(PlanContext {
        plan,
        options,
        format: global.format,
    })
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|value| value.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);
    let _ = if json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
}
