// src/timers/manual.rs

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{Generation, TimerBackend, TimerKind, signed_millis};
use crate::engine::clock::{Clock, ManualClock};

/// A timer recorded by [`ManualTimerBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledTimer {
    pub id: u64,
    pub key: String,
    pub generation: Generation,
    pub kind: TimerKind,
    pub period_ms: u64,
    /// Absolute clock time of the next fire.
    pub due_at_ms: i64,
}

#[derive(Debug, Default)]
struct ManualState {
    next_id: u64,
    active: BTreeMap<u64, ScheduledTimer>,
}

/// Backend that only records timers; nothing fires by itself.
///
/// Clones share state, so a test keeps one clone for inspection while the
/// engine owns the other.
#[derive(Debug, Clone)]
pub struct ManualTimerBackend {
    clock: ManualClock,
    state: Arc<Mutex<ManualState>>,
}

impl ManualTimerBackend {
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            state: Arc::new(Mutex::new(ManualState::default())),
        }
    }

    /// All active timers, in scheduling order.
    pub fn active(&self) -> Vec<ScheduledTimer> {
        self.state.lock().unwrap().active.values().cloned().collect()
    }

    pub fn active_for(&self, key: &str) -> Vec<ScheduledTimer> {
        self.active().into_iter().filter(|t| t.key == key).collect()
    }

    /// Take the earliest timer due at or before `until_ms`.
    ///
    /// One-shot timers are removed; repeating timers move on by one period.
    pub fn next_due(&self, until_ms: i64) -> Option<ScheduledTimer> {
        let mut state = self.state.lock().unwrap();
        let id = state
            .active
            .values()
            .filter(|t| t.due_at_ms <= until_ms)
            .min_by_key(|t| (t.due_at_ms, t.id))
            .map(|t| t.id)?;
        let timer = state.active.get(&id).cloned()?;
        match timer.kind {
            TimerKind::OneShot => {
                state.active.remove(&id);
            }
            TimerKind::Repeating => {
                if let Some(t) = state.active.get_mut(&id) {
                    t.due_at_ms = t.due_at_ms.saturating_add(signed_millis(t.period_ms));
                }
            }
        }
        Some(timer)
    }

    fn record(&self, key: &str, generation: Generation, kind: TimerKind, period: Duration) -> u64 {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = state.next_id;
        let period_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX);
        state.active.insert(
            id,
            ScheduledTimer {
                id,
                key: key.to_string(),
                generation,
                kind,
                period_ms,
                due_at_ms: self.clock.now_ms().saturating_add(signed_millis(period_ms)),
            },
        );
        id
    }
}

impl TimerBackend for ManualTimerBackend {
    type Handle = u64;

    fn start_once(&mut self, key: &str, generation: Generation, delay: Duration) -> u64 {
        self.record(key, generation, TimerKind::OneShot, delay)
    }

    fn start_repeating(&mut self, key: &str, generation: Generation, period: Duration) -> u64 {
        self.record(key, generation, TimerKind::Repeating, period)
    }

    fn stop(&mut self, handle: u64) {
        self.state.lock().unwrap().active.remove(&handle);
    }
}
