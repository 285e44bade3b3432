//! Build-time knobs for turning a floor plan into a routing graph.
//!
//! # Environment Variables
//!
//! - `WAYFINDER_MATCH_THRESHOLD`: maximum endpoint-to-node distance (default `10`)
//! - `WAYFINDER_STAIR_WEIGHT`: weight of a synthetic stair edge (default `50`)
//! - `WAYFINDER_FLOORS`: comma-separated floor keys, lowest floor first

use std::env;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Default distance within which a segment endpoint snaps to a node.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 10.0;

/// Default weight of an edge that stitches two floors through a stairwell.
/// Empirical; it only needs to keep stair hops comparable to corridor lengths.
pub const DEFAULT_STAIR_WEIGHT: f64 = 50.0;

pub const ENV_MATCH_THRESHOLD: &str = "WAYFINDER_MATCH_THRESHOLD";
pub const ENV_STAIR_WEIGHT: &str = "WAYFINDER_STAIR_WEIGHT";
pub const ENV_FLOORS: &str = "WAYFINDER_FLOORS";

/// Options controlling extraction and graph assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildOptions {
    /// Endpoints snap to the closest node strictly closer than this.
    pub match_threshold: f64,
    /// Weight given to every stair-stitching edge.
    pub stair_weight: f64,
    /// Floors to extract, lowest first. `None` discovers them from the plan.
    pub floors: Option<Vec<String>>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            stair_weight: DEFAULT_STAIR_WEIGHT,
            floors: None,
        }
    }
}

impl BuildOptions {
    /// Defaults overridden by any valid `WAYFINDER_*` environment variables.
    pub fn from_env() -> Self {
        let mut options = Self::default();
        if let Some(threshold) = read_positive(ENV_MATCH_THRESHOLD) {
            options.match_threshold = threshold;
        }
        if let Some(weight) = read_non_negative(ENV_STAIR_WEIGHT) {
            options.stair_weight = weight;
        }
        if let Ok(raw) = env::var(ENV_FLOORS) {
            options.floors = parse_floor_list(&raw);
        }
        options
    }

    pub fn with_floors(mut self, floors: Vec<String>) -> Self {
        self.floors = Some(floors);
        self
    }
}

/// Split a comma-separated floor list, dropping blanks. Empty input yields `None`.
pub fn parse_floor_list(raw: &str) -> Option<Vec<String>> {
    let floors: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|floor| !floor.is_empty())
        .map(str::to_string)
        .collect();
    if floors.is_empty() {
        None
    } else {
        Some(floors)
    }
}

fn read_positive(key: &str) -> Option<f64> {
    read_f64(key).filter(|value| {
        let ok = *value > 0.0;
        if !ok {
            warn!(key, value, "ignoring non-positive value");
        }
        ok
    })
}

fn read_non_negative(key: &str) -> Option<f64> {
    read_f64(key).filter(|value| {
        let ok = *value >= 0.0;
        if !ok {
            warn!(key, value, "ignoring negative value");
        }
        ok
    })
}

fn read_f64(key: &str) -> Option<f64> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => {
            warn!(key, value = %raw, "ignoring unparseable value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_list_trims_and_drops_blanks() {
        assert_eq!(
            parse_floor_list(" Floor_First, ,Floor_Second "),
            Some(vec!["Floor_First".to_string(), "Floor_Second".to_string()])
        );
        assert_eq!(parse_floor_list(" , "), None);
    }

    #[test]
    fn defaults_match_documented_constants() {
        let options = BuildOptions::default();
        assert_eq!(options.match_threshold, DEFAULT_MATCH_THRESHOLD);
        assert_eq!(options.stair_weight, DEFAULT_STAIR_WEIGHT);
        assert!(options.floors.is_none());
    }
}
