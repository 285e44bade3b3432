//! Common test utilities and fixture helpers.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;
use wayfinder_lib::{build_from_svg, BuildOptions, Graph};

/// Path to fixtures directory used by tests.
#[allow(dead_code)]
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

#[allow(dead_code)]
pub fn fixture_plan() -> PathBuf {
    fixtures_dir().join("building.svg")
}

#[allow(dead_code)]
pub fn fixture_svg() -> String {
    fs::read_to_string(fixture_plan()).expect("fixture plan readable")
}

#[allow(dead_code)]
pub fn fixture_graph() -> Graph {
    build_from_svg(&fixture_svg(), &BuildOptions::default()).expect("fixture builds")
}

/// Copy the fixture plan into a fresh temporary directory so tests can write
/// snapshots beside it.
#[allow(dead_code)]
pub fn plan_in_temp_dir() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let target = dir.path().join("building.svg");
    fs::copy(fixture_plan(), &target).expect("copy fixture plan");
    (dir, target)
}
