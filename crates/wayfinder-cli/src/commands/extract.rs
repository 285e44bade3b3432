//! Extraction export: the typed primitives of every floor as JSON.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use wayfinder_cli::output::{emit, to_json};
use wayfinder_lib::extract_plan;

use super::PlanContext;

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    /// Where to write the JSON; stdout when omitted.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub fn handle_extract(context: &PlanContext, args: &ExtractArgs) -> Result<()> {
    let source = context.read_plan()?;
    let floors = extract_plan(&source, &context.options)
        .with_context(|| format!("failed to extract {}", context.plan.display()))?;
    let json = to_json(&floors)?;

    match &args.output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
        }
        None => emit(&json),
    }
}
