#![cfg(test)]

use std::fs;
use std::sync::Arc;
use std::thread;

use tempfile::tempdir;

use super::error::SolverError;
use super::transform::{DstAlgorithm, PlanFlags, SineTransformPlan, WisdomCache};

#[test]
fn measured_plans_are_remembered() {
    let wisdom = WisdomCache::in_memory();
    assert!(wisdom.is_empty());

    let first = SineTransformPlan::create(48, PlanFlags::MEASURE, &wisdom).unwrap();
    assert!(!first.planned_from_wisdom());
    assert_eq!(wisdom.lookup(48), Some(first.algorithm()));

    let second = SineTransformPlan::create(48, PlanFlags::MEASURE, &wisdom).unwrap();
    assert!(second.planned_from_wisdom());
    assert_eq!(second.algorithm(), first.algorithm());
    assert_eq!(wisdom.len(), 1);
}

#[test]
fn estimated_plans_leave_no_wisdom() {
    let wisdom = WisdomCache::in_memory();
    SineTransformPlan::create(48, PlanFlags::ESTIMATE, &wisdom).unwrap();
    assert!(wisdom.lookup(48).is_none());
}

#[test]
fn long_transforms_always_measure_to_odd_extension() {
    let wisdom = WisdomCache::in_memory();
    let plan = SineTransformPlan::create(1000, PlanFlags::MEASURE, &wisdom).unwrap();
    assert_eq!(plan.algorithm(), DstAlgorithm::OddExtension);
}

#[test]
fn wisdom_only_fails_for_unknown_lengths() {
    let wisdom = WisdomCache::in_memory();
    let err = SineTransformPlan::create(20, PlanFlags::MEASURE.wisdom_only(), &wisdom)
        .err()
        .expect("no wisdom yet");
    assert!(matches!(
        err,
        SolverError::PlanCreationFailure { len: 20, howmany: 1, .. }
    ));

    SineTransformPlan::create(20, PlanFlags::MEASURE, &wisdom).unwrap();
    let plan = SineTransformPlan::create(20, PlanFlags::ESTIMATE.wisdom_only(), &wisdom).unwrap();
    assert!(plan.planned_from_wisdom());
}

#[test]
fn wisdom_file_survives_the_cache() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("breeze2d.wisdom");

    {
        let wisdom = WisdomCache::persistent(&path);
        SineTransformPlan::create(40, PlanFlags::MEASURE, &wisdom).unwrap();
        SineTransformPlan::create(6, PlanFlags::MEASURE, &wisdom).unwrap();
    }

    let text = fs::read_to_string(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["version"], 1);
    assert!(json["entries"].get("40").is_some());
    assert!(json["entries"].get("6").is_some());

    let fresh = WisdomCache::persistent(&path);
    assert_eq!(fresh.path(), Some(path.as_path()));
    let plan = SineTransformPlan::create(40, PlanFlags::MEASURE.wisdom_only(), &fresh).unwrap();
    assert!(plan.planned_from_wisdom());
}

#[test]
fn missing_wisdom_file_is_not_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.wisdom");
    let wisdom = WisdomCache::persistent(&path);
    SineTransformPlan::create(12, PlanFlags::ESTIMATE, &wisdom).unwrap();
    assert!(!path.exists(), "estimates must not write wisdom");
}

#[test]
fn malformed_wisdom_file_is_ignored_and_replaced() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.wisdom");
    fs::write(&path, "this is not wisdom").unwrap();

    let wisdom = WisdomCache::persistent(&path);
    let plan = SineTransformPlan::create(16, PlanFlags::MEASURE, &wisdom).unwrap();
    assert!(!plan.planned_from_wisdom());

    let text = fs::read_to_string(&path).unwrap();
    assert!(serde_json::from_str::<serde_json::Value>(&text).is_ok());
}

#[test]
fn wisdom_file_with_other_version_is_ignored() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("old.wisdom");
    fs::write(&path, r#"{"version": 0, "entries": {"16": "direct"}}"#).unwrap();

    let wisdom = WisdomCache::persistent(&path);
    let plan = SineTransformPlan::create(16, PlanFlags::ESTIMATE, &wisdom).unwrap();
    assert!(!plan.planned_from_wisdom());
}

#[test]
fn unwritable_wisdom_path_does_not_fail_planning() {
    let dir = tempdir().unwrap();
    // A directory cannot be written as a file.
    let wisdom = WisdomCache::persistent(dir.path());
    let plan = SineTransformPlan::create(10, PlanFlags::MEASURE, &wisdom).unwrap();
    assert_eq!(wisdom.lookup(10), Some(plan.algorithm()));
}

#[test]
fn concurrent_planners_share_one_cache() {
    let dir = tempdir().unwrap();
    let wisdom = Arc::new(WisdomCache::persistent(dir.path().join("shared.wisdom")));

    thread::scope(|scope| {
        for len in [8, 24, 24, 96, 8, 50] {
            let wisdom = Arc::clone(&wisdom);
            scope.spawn(move || {
                SineTransformPlan::create(len, PlanFlags::MEASURE, &wisdom).unwrap();
            });
        }
    });

    for len in [8, 24, 50, 96] {
        assert!(wisdom.lookup(len).is_some(), "len {len} not recorded");
    }
    assert_eq!(wisdom.len(), 4);
}
