// tests/resend_mode.rs

use persistrig::engine::{EntryTiming, OutputSlot};
use persistrig::types::TriggerMode;
use persistrig_test_utils::builders::SettingsBuilder;
use persistrig_test_utils::harness::{Harness, payloads};
use persistrig_test_utils::init_tracing;
use serde_json::json;

fn resend(interval_ms: u64) -> SettingsBuilder {
    SettingsBuilder::new(TriggerMode::Resend).delay_ms(interval_ms)
}

#[test]
fn repeats_op1_every_interval() {
    init_tracing();
    let mut h = Harness::new(resend(500).build());
    let t0 = h.now_ms();

    assert_eq!(payloads(&h.input(json!({"payload": "a"}))), vec![json!("a")]);
    assert!(h.advance(499).is_empty());

    let out = h.advance(1);
    assert_eq!(payloads(&out), vec![json!("a")]);
    assert_eq!(out[0].slot, OutputSlot::Primary);

    assert_eq!(h.advance(1_000).len(), 2);
    match h.core.entry("all").unwrap().timing {
        EntryTiming::Resend {
            interval_ms,
            last_sent,
        } => {
            assert_eq!(interval_ms, 500);
            assert_eq!(last_sent, Some(t0 + 1_500));
        }
        ref other => panic!("unexpected timing: {other:?}"),
    }
}

#[test]
fn new_event_restarts_the_sequence() {
    init_tracing();
    let mut h = Harness::new(resend(500).build());

    h.input(json!({"payload": "a"}));
    h.advance(300);
    assert_eq!(payloads(&h.input(json!({"payload": "b"}))), vec![json!("b")]);
    assert_eq!(h.timers_for("all").len(), 1);

    assert!(h.advance(499).is_empty());
    assert_eq!(payloads(&h.advance(1)), vec![json!("b")]);
}

#[test]
fn reset_stops_resending() {
    init_tracing();
    let mut h = Harness::new(resend(200).reset_match("stop").build());

    h.input(json!({"payload": "a"}));
    assert_eq!(h.advance(200).len(), 1);
    assert!(h.input(json!({"payload": "stop"})).is_empty());
    assert!(h.timers.active().is_empty());
    assert!(h.advance(5_000).is_empty());
    assert!(h.core.table().is_empty());
}

#[test]
fn override_delay_sets_the_entry_interval() {
    init_tracing();
    let mut h = Harness::new(resend(1_000).override_delay(true).build());

    h.input(json!({"payload": "a", "delay": "100"}));
    match h.core.entry("all").unwrap().timing {
        EntryTiming::Resend { interval_ms, .. } => assert_eq!(interval_ms, 100),
        ref other => panic!("unexpected timing: {other:?}"),
    }
    assert_eq!(h.advance(300).len(), 3);
}

#[test]
fn second_output_does_not_apply_to_resend() {
    init_tracing();
    let mut h = Harness::new(resend(100).second_output(true).build());
    h.input(json!({"payload": "a"}));
    let out = h.advance(100);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].slot, OutputSlot::Primary);
}

#[test]
fn huge_interval_override_never_ticks_and_restores() {
    init_tracing();
    let settings = resend(1_000).override_delay(true).build();
    let mut h = Harness::new(settings.clone());

    assert_eq!(h.input(json!({"payload": "a", "delay": 1e19})).len(), 1);
    assert!(h.advance(1_000_000_000).is_empty());

    let mut h = h.restart(settings);
    assert!(h.restore().is_empty());
    assert_eq!(h.timers_for("all").len(), 1);
    assert!(h.advance(1_000_000_000).is_empty());
}
