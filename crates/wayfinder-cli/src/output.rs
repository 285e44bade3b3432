//! Output formatting for command results.

use std::fmt::Write as _;
use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;

use wayfinder_lib::{DoorAssignment, RoomEntry, RouteRenderMode, RouteSummary};

/// How command results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Serialize `value` as pretty JSON followed by a newline.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    json.push('\n');
    Ok(json)
}

pub fn format_rooms(entries: &[RoomEntry], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(entries),
        OutputFormat::Text => {
            let mut buffer = String::new();
            let _ = writeln!(buffer, "Rooms: {}", entries.len());
            for entry in entries {
                let doors = match entry.doors {
                    1 => "1 door".to_string(),
                    n => format!("{n} doors"),
                };
                let _ = writeln!(buffer, "  {:<28} {:<24} {}", entry.id, entry.label, doors);
            }
            Ok(buffer)
        }
    }
}

pub fn format_routes(summary: &RouteSummary, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(summary),
        OutputFormat::Text => Ok(summary.render(RouteRenderMode::PlainText)),
    }
}

pub fn format_assignments(assignments: &[DoorAssignment], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(assignments),
        OutputFormat::Text => {
            let mut buffer = String::new();
            for assignment in assignments {
                let previous = assignment.previous_id.as_deref().unwrap_or("<none>");
                let _ = writeln!(buffer, "{previous} -> {}", assignment.new_id);
            }
            Ok(buffer)
        }
    }
}

/// Write `text` to stdout.
pub fn emit(text: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(text.as_bytes())
        .context("failed to write to stdout")?;
    stdout.flush().context("failed to flush stdout")
}
