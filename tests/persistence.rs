// tests/persistence.rs

use std::fs;

use persistrig::engine::{ManualClock, TriggerEvent};
use persistrig::fs::RealFileSystem;
use persistrig::fs::mock::MockFileSystem;
use persistrig::store::FileStore;
use persistrig::types::TriggerMode;
use persistrig_test_utils::builders::SettingsBuilder;
use persistrig_test_utils::failing_store::FailingStore;
use persistrig_test_utils::harness::{Harness, payloads};
use persistrig_test_utils::init_tracing;
use serde_json::{Value, json};
use tempfile::tempdir;

const T0: i64 = 1_000_000;

#[test]
fn every_mutation_is_persisted() {
    init_tracing();
    let mut h = Harness::new(
        SettingsBuilder::new(TriggerMode::Wait)
            .delay_ms(1_000)
            .build(),
    );

    h.input(json!({"payload": "a", "req": {"socket": 1}}));
    let table = h.persisted().unwrap();
    assert_eq!(table["all"]["mode"], json!("wait"));
    assert_eq!(table["all"]["expiry"], json!(T0 + 1_000));
    assert_eq!(table["all"]["original"], json!({"payload": "a"}));

    h.input(json!({"payload": "b"}));
    assert_eq!(h.persisted().unwrap()["all"]["latest"], json!({"payload": "b"}));

    h.advance(1_000);
    assert_eq!(h.persisted(), Some(json!({})));
}

#[test]
fn store_failures_do_not_stop_emissions() {
    init_tracing();
    let settings = SettingsBuilder::new(TriggerMode::Wait).delay_ms(100).build();
    let mut h = Harness::with_backing(settings, Box::new(FailingStore), ManualClock::new(T0));

    assert!(h.restore().is_empty());
    assert_eq!(payloads(&h.input(json!({"payload": 1}))), vec![json!(1)]);
    assert_eq!(payloads(&h.advance(100)), vec![json!("done")]);
}

#[test]
fn shutdown_keeps_entries_for_the_next_start() {
    init_tracing();
    let mut h = Harness::new(SettingsBuilder::new(TriggerMode::Resend).delay_ms(100).build());
    h.input(json!({"payload": 1}));

    let step = h.step(TriggerEvent::Shutdown { remove: false });
    assert!(!step.keep_running);
    assert!(h.timers.active().is_empty());
    assert!(h.persisted().unwrap().get("all").is_some());
}

#[test]
fn shutdown_with_remove_clears_the_store() {
    init_tracing();
    let mut h = Harness::new(SettingsBuilder::new(TriggerMode::Wait).delay_ms(100).build());
    h.input(json!({"payload": 1}));

    let step = h.step(TriggerEvent::Shutdown { remove: true });
    assert!(!step.keep_running);
    assert!(h.core.table().is_empty());
    assert_eq!(h.persisted(), None);
}

#[test]
fn file_store_survives_a_restart() {
    init_tracing();
    let dir = tempdir().unwrap();
    let path = dir.path().join("state").join("entries.json");
    let settings = SettingsBuilder::new(TriggerMode::Wait)
        .delay_ms(1_000)
        .id("door")
        .build();
    let clock = ManualClock::new(T0);

    {
        let store = FileStore::new(RealFileSystem, path.clone());
        let mut h = Harness::with_backing(settings.clone(), Box::new(store), clock.clone());
        h.input(json!({"payload": "open"}));
    }

    let doc: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(doc["persisted-trigger:door"]["all"]["mode"], json!("wait"));

    clock.advance(300);
    let store = FileStore::new(RealFileSystem, path.clone());
    let mut h = Harness::with_backing(settings, Box::new(store), clock);
    assert!(h.restore().is_empty());
    assert_eq!(h.timers_for("all")[0].due_at_ms, T0 + 1_000);
    assert_eq!(payloads(&h.advance(700)), vec![json!("done")]);
}

#[test]
fn failed_writes_are_retried_on_the_next_mutation() {
    init_tracing();
    let fs = MockFileSystem::new();
    let path = std::path::PathBuf::from("/state.json");
    let settings = SettingsBuilder::new(TriggerMode::WaitReset).keyed_by("topic").build();
    let store = FileStore::new(fs.clone(), path.clone());
    let mut h = Harness::with_backing(settings, Box::new(store), ManualClock::new(T0));

    fs.set_fail_writes(true);
    assert_eq!(h.input(json!({"topic": "a", "payload": 1})).len(), 1);
    assert!(fs.contents(&path).is_none());

    fs.set_fail_writes(false);
    h.input(json!({"topic": "b", "payload": 2}));
    let doc: Value = serde_json::from_str(&fs.contents(&path).unwrap()).unwrap();
    let table = doc["persisted-trigger:test"].as_object().unwrap();
    assert!(table.contains_key("a"));
    assert!(table.contains_key("b"));
}
