// tests/waitreset_mode.rs

use persistrig::engine::OutputSlot;
use persistrig::types::TriggerMode;
use persistrig_test_utils::builders::SettingsBuilder;
use persistrig_test_utils::harness::{Harness, payloads};
use persistrig_test_utils::init_tracing;
use serde_json::json;

fn waitreset() -> SettingsBuilder {
    SettingsBuilder::new(TriggerMode::WaitReset)
}

#[test]
fn waits_for_reset_without_a_timer() {
    init_tracing();
    let mut h = Harness::new(waitreset().op2("payl", "").build());

    assert_eq!(payloads(&h.input(json!({"payload": "a"}))), vec![json!("a")]);
    assert!(h.input(json!({"payload": "b"})).is_empty());
    assert!(h.timers.active().is_empty());
    assert!(h.advance(10_000_000).is_empty());

    let out = h.input(json!({"reset": true}));
    assert_eq!(payloads(&out), vec![json!("b")]);
    assert!(h.core.entry("all").is_none());

    // The next event starts over.
    assert_eq!(payloads(&h.input(json!({"payload": "c"}))), vec![json!("c")]);
}

#[test]
fn reset_emission_is_always_primary() {
    init_tracing();
    let mut h = Harness::new(waitreset().second_output(true).reset_match("off").build());

    h.input(json!({"payload": "on"}));
    let out = h.input(json!({"payload": "off"}));
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].slot, OutputSlot::Primary);
    assert_eq!(payloads(&out), vec![json!("done")]);
}

#[test]
fn reset_of_unknown_key_emits_nothing() {
    init_tracing();
    let mut h = Harness::new(waitreset().keyed_by("topic").build());

    h.input(json!({"topic": "a", "payload": 1}));
    assert!(h.input(json!({"topic": "b", "reset": true})).is_empty());
    assert!(h.core.entry("a").is_some());

    let out = h.input(json!({"topic": "a", "reset": true}));
    assert_eq!(out.len(), 1);
    assert!(h.core.table().is_empty());
}
