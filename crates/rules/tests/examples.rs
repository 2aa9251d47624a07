//! Integration tests that verify every sample rule in `data/rules/`
//! loads and behaves as documented.

use vsm_core::{StateStore, Value};
use vsm_rules::{LoadStatus, RuleIndex};

/// Resolve the sample directory relative to the workspace root.
/// Integration tests run from the crate directory, so we go up two levels.
fn rules_dir() -> std::path::PathBuf {
    let manifest = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest.join("../../data/rules")
}

fn load() -> RuleIndex {
    RuleIndex::load(rules_dir())
        .unwrap_or_else(|e| panic!("Failed to load {}: {}", rules_dir().display(), e))
}

#[test]
fn every_sample_loads() {
    let index = load();
    assert_eq!(index.triggers(), vec!["car.gear", "car.moving", "car.speed"]);
    assert!(index
        .report()
        .iter()
        .all(|r| matches!(r.status, LoadStatus::Loaded { .. })));
}

// ── car.moving.yaml ─────────────────────────────────────────

#[test]
fn car_moving_backs_up_when_damaged() {
    let index = load();
    let rule = index.find("car.moving").unwrap();
    assert_eq!(rule.action().signal, "car.backup");
    assert_eq!(rule.action().value, Value::Absent);

    let mut state = StateStore::new();
    state.set("car.damage", Value::Bool(true));
    assert!(rule.matches(&state.snapshot()).unwrap());

    state.set("car.damage", Value::Bool(false));
    assert!(!rule.matches(&state.snapshot()).unwrap());
}

// ── car.gear.yaml ───────────────────────────────────────────

#[test]
fn car_gear_stops_moving_car() {
    let index = load();
    let rule = index.find("car.gear").unwrap();
    assert_eq!(rule.action().signal, "car.stop");
    assert_eq!(rule.condition().signals(), vec!["car.moving"]);

    // never assigned: condition is false, not an error
    assert!(!rule.matches(&StateStore::new().snapshot()).unwrap());
}

// ── car.speed.yaml ──────────────────────────────────────────

#[test]
fn car_speed_warns_with_value_and_delay() {
    let index = load();
    let rule = index.find("car.speed").unwrap();
    assert_eq!(rule.action().signal, "car.speed.warning");
    assert_eq!(rule.action().value, Value::from("overspeed"));
    assert_eq!(
        rule.action().delay,
        Some(std::time::Duration::from_millis(50))
    );

    let mut state = StateStore::new();
    state.set("car.speed", Value::Int(130));
    state.set("car.gear", Value::from("drive"));
    assert!(rule.matches(&state.snapshot()).unwrap());

    state.set("car.gear", Value::from("reverse"));
    assert!(!rule.matches(&state.snapshot()).unwrap());
}
