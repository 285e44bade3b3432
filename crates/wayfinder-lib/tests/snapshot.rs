//! Integration tests for graph snapshots stored beside the floor plan.

mod common;

use std::fs;

use wayfinder_lib::{
    load_graph, snapshot_path, try_load_snapshot, BuildOptions, GraphSnapshot, SharedBuilding,
};

use common::plan_in_temp_dir;

#[test]
fn saved_snapshot_is_reused_for_the_same_plan() {
    let (_dir, plan) = plan_in_temp_dir();
    let options = BuildOptions::default();
    let source = fs::read(&plan).unwrap();

    let graph = load_graph(&plan, &options).expect("builds from plan");
    GraphSnapshot::new(&graph, &source, &options)
        .save(&snapshot_path(&plan))
        .expect("snapshot saved");

    let restored = try_load_snapshot(&plan, &source, &options).expect("snapshot matches");
    assert_eq!(restored.to_parts(), graph.to_parts());
}

#[test]
fn changed_plan_or_options_trigger_a_rebuild() {
    let (_dir, plan) = plan_in_temp_dir();
    let options = BuildOptions::default();
    let source = fs::read(&plan).unwrap();
    let graph = load_graph(&plan, &options).unwrap();
    GraphSnapshot::new(&graph, &source, &options)
        .save(&snapshot_path(&plan))
        .unwrap();

    let mut edited = source.clone();
    edited.extend_from_slice(b"\n<!-- edited -->\n");
    assert!(try_load_snapshot(&plan, &edited, &options).is_none());

    let tuned = BuildOptions {
        match_threshold: 4.0,
        ..BuildOptions::default()
    };
    assert!(try_load_snapshot(&plan, &source, &tuned).is_none());
}

#[test]
fn corrupt_snapshot_falls_back_to_rebuild() {
    let (_dir, plan) = plan_in_temp_dir();
    fs::write(snapshot_path(&plan), b"WFGS garbage").unwrap();

    let options = BuildOptions::default();
    let source = fs::read(&plan).unwrap();
    assert!(try_load_snapshot(&plan, &source, &options).is_none());
    assert!(load_graph(&plan, &options).is_ok());
}

#[test]
fn shared_building_loads_once_for_concurrent_callers() {
    let (_dir, plan) = plan_in_temp_dir();
    let building = SharedBuilding::new(&plan, BuildOptions::default());
    assert!(!building.is_loaded());

    let counts: Vec<usize> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| building.get_or_load().map(|g| g.node_count())))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap().expect("graph loads"))
            .collect()
    });

    assert!(building.is_loaded());
    assert!(counts.windows(2).all(|pair| pair[0] == pair[1]));
    let first = building.get_or_load().unwrap() as *const _;
    let second = building.get_or_load().unwrap() as *const _;
    assert_eq!(first, second);
}
