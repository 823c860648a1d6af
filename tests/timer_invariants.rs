// tests/timer_invariants.rs

use proptest::prelude::*;
use persistrig::engine::{EntryTiming, Status};
use persistrig::types::TriggerMode;
use persistrig_test_utils::builders::SettingsBuilder;
use persistrig_test_utils::harness::Harness;
use serde_json::json;

#[derive(Debug, Clone)]
enum Op {
    Input { key: usize, reset: bool },
    Advance(i64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..3usize, any::<bool>()).prop_map(|(key, reset)| Op::Input { key, reset }),
        2 => (0..1_500i64).prop_map(Op::Advance),
    ]
}

fn mode_strategy() -> impl Strategy<Value = TriggerMode> {
    prop_oneof![
        Just(TriggerMode::Wait),
        Just(TriggerMode::WaitReset),
        Just(TriggerMode::Resend),
    ]
}

fn check_invariants(h: &Harness) -> Result<(), TestCaseError> {
    let table = h.core.table();
    prop_assert_eq!(h.core.status(), Status::from_count(table.len()));

    for (key, entry) in table.iter() {
        let timers = h.timers_for(key);
        prop_assert!(timers.len() <= 1, "key {} has {} timers", key, timers.len());
        let armed = !matches!(entry.timing, EntryTiming::WaitReset);
        prop_assert_eq!(timers.len(), usize::from(armed));
        prop_assert_eq!(h.core.timers().has_timer(key), armed);
    }

    for timer in h.timers.active() {
        prop_assert!(table.contains(&timer.key), "orphan timer for {}", timer.key);
    }
    prop_assert_eq!(h.core.timers().len(), h.timers.active().len());
    Ok(())
}

proptest! {
    #[test]
    fn at_most_one_timer_per_key_and_no_orphans(
        mode in mode_strategy(),
        delay_ms in 50..2_000u64,
        extend in any::<bool>(),
        ops in proptest::collection::vec(op_strategy(), 1..40),
    ) {
        let settings = SettingsBuilder::new(mode)
            .delay_ms(delay_ms)
            .extend(extend)
            .keyed_by("topic")
            .build();
        let mut h = Harness::new(settings);

        for op in ops {
            match op {
                Op::Input { key, reset } => {
                    let ev = if reset {
                        json!({"topic": key, "reset": true})
                    } else {
                        json!({"topic": key, "payload": key})
                    };
                    h.input(ev);
                }
                Op::Advance(ms) => {
                    h.advance(ms);
                }
            }
            check_invariants(&h)?;
        }
    }

    #[test]
    fn restart_restores_the_same_keys(
        mode in mode_strategy(),
        keys in proptest::collection::vec(0..5usize, 1..10),
        downtime in 0..500i64,
    ) {
        // Long delay: nothing expires while down.
        let settings = SettingsBuilder::new(mode)
            .delay_ms(10_000)
            .keyed_by("topic")
            .build();
        let mut h = Harness::new(settings.clone());
        for key in &keys {
            h.input(json!({"topic": key}));
        }
        let before = h.core.table().keys();

        h.clock.advance(downtime);
        let mut h = h.restart(settings);
        prop_assert!(h.restore().is_empty());
        prop_assert_eq!(h.core.table().keys(), before);
        check_invariants(&h)?;
    }
}
