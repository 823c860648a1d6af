#![allow(dead_code)]

use std::sync::Arc;

use persistrig::config::TriggerSettings;
use persistrig::engine::{
    Clock, CoreStep, Emission, EntryTable, ManualClock, TriggerCore, TriggerEvent,
};
use persistrig::message::{ContextResolver, Message, MessageBuilder};
use persistrig::store::{EntryStore, MemoryStore};
use persistrig::timers::{ManualTimerBackend, ScheduledTimer, TimerManager};
use serde_json::Value;

use crate::builders::event;

/// Deterministic driver for a `TriggerCore`.
///
/// Time only moves through [`Harness::advance`], which fires every timer
/// that falls due on the way, in order.
pub struct Harness {
    pub core: TriggerCore<ManualTimerBackend>,
    pub clock: ManualClock,
    pub timers: ManualTimerBackend,
    pub store: MemoryStore,
}

impl Harness {
    /// Fresh harness at t = 1_000_000 ms with an empty memory store.
    pub fn new(settings: TriggerSettings) -> Self {
        Self::with_store(settings, MemoryStore::new(), ManualClock::new(1_000_000))
    }

    /// Harness over an existing store and clock; the core is not restored yet.
    pub fn with_store(settings: TriggerSettings, store: MemoryStore, clock: ManualClock) -> Self {
        let table = EntryTable::load(Box::new(store.clone()), settings.store_key());
        Self::assemble(settings, table, store, clock)
    }

    /// Harness whose core persists through `backing` (a file or failing
    /// store). `persisted()` is not meaningful for such a harness.
    pub fn with_backing(
        settings: TriggerSettings,
        backing: Box<dyn EntryStore>,
        clock: ManualClock,
    ) -> Self {
        let table = EntryTable::load(backing, settings.store_key());
        Self::assemble(settings, table, MemoryStore::new(), clock)
    }

    fn assemble(
        settings: TriggerSettings,
        table: EntryTable,
        store: MemoryStore,
        clock: ManualClock,
    ) -> Self {
        let timers = ManualTimerBackend::new(clock.clone());
        let builder = MessageBuilder::new(Arc::new(ContextResolver::default()));
        let core = TriggerCore::new(
            settings,
            table,
            TimerManager::new(timers.clone()),
            builder,
            Arc::new(clock.clone()),
        );
        Self {
            core,
            clock,
            timers,
            store,
        }
    }

    /// Simulate a process restart: a new core over the same store and clock.
    /// Timers of the old core are gone with it.
    pub fn restart(self, settings: TriggerSettings) -> Self {
        let Harness { store, clock, .. } = self;
        Self::with_store(settings, store, clock)
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    pub fn restore(&mut self) -> Vec<Emission> {
        self.core.restore().emissions
    }

    pub fn input(&mut self, value: Value) -> Vec<Emission> {
        self.core.step(TriggerEvent::Input(event(value))).emissions
    }

    pub fn step(&mut self, ev: TriggerEvent) -> CoreStep {
        self.core.step(ev)
    }

    /// Move time forward by `ms`, firing due timers along the way.
    pub fn advance(&mut self, ms: i64) -> Vec<Emission> {
        let target = self.clock.now_ms() + ms;
        let mut emissions = Vec::new();
        while let Some(timer) = self.timers.next_due(target) {
            self.clock.set(timer.due_at_ms.max(self.clock.now_ms()));
            let step = self.core.step(TriggerEvent::TimerFired {
                key: timer.key,
                generation: timer.generation,
            });
            emissions.extend(step.emissions);
        }
        self.clock.set(target);
        emissions
    }

    pub fn timers_for(&self, key: &str) -> Vec<ScheduledTimer> {
        self.timers.active_for(key)
    }

    /// Persisted table of this harness's trigger, as JSON.
    pub fn persisted(&self) -> Option<Value> {
        self.store.snapshot(&self.core.settings().store_key())
    }
}

/// Payloads of a list of emissions.
pub fn payloads(emissions: &[Emission]) -> Vec<Value> {
    emissions
        .iter()
        .map(|e| e.message.get("payload").cloned().unwrap_or(Value::Null))
        .collect()
}

/// Message of the single emission in `emissions`.
pub fn only(emissions: &[Emission]) -> &Message {
    assert_eq!(emissions.len(), 1, "expected exactly one emission: {emissions:?}");
    &emissions[0].message
}
