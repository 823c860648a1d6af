// src/engine/core.rs

//! Pure trigger state machine.
//!
//! [`TriggerCore`] consumes [`TriggerEvent`]s and returns the emissions they
//! cause. It owns the entry table and the timer manager of one trigger
//! instance; timers are started through a [`TimerBackend`] and come back as
//! `TimerFired` events, so every mutation happens inside `step`.
//!
//! No Tokio types and no channels here; with a manual clock and timer
//! backend the core is fully deterministic.

use std::sync::Arc;

use tracing::{debug, info};

use super::clock::Clock;
use super::entry::{Entry, EntryTable};
use super::{Emission, OutputSlot, Status, TriggerEvent};
use crate::config::TriggerSettings;
use crate::message::MessageBuilder;
use crate::timers::{TimerBackend, TimerManager};
use crate::types::TriggerMode;

/// Result of handling one event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoreStep {
    /// Messages to emit, in order.
    pub emissions: Vec<Emission>,
    /// Whether the outer loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    pub(crate) fn running(emissions: Vec<Emission>) -> Self {
        Self {
            emissions,
            keep_running: true,
        }
    }
}

/// State of one trigger instance.
#[derive(Debug)]
pub struct TriggerCore<B: TimerBackend> {
    pub(super) settings: TriggerSettings,
    pub(super) table: EntryTable,
    pub(super) timers: TimerManager<B>,
    pub(super) builder: MessageBuilder,
    pub(super) clock: Arc<dyn Clock>,
    status: Status,
    restored: bool,
}

impl<B: TimerBackend> TriggerCore<B> {
    pub fn new(
        settings: TriggerSettings,
        table: EntryTable,
        timers: TimerManager<B>,
        builder: MessageBuilder,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let status = Status::from_count(table.len());
        Self {
            settings,
            table,
            timers,
            builder,
            clock,
            status,
            restored: false,
        }
    }

    pub fn settings(&self) -> &TriggerSettings {
        &self.settings
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn entry(&self, key: &str) -> Option<&Entry> {
        self.table.get(key)
    }

    pub fn table(&self) -> &EntryTable {
        &self.table
    }

    pub fn timers(&self) -> &TimerManager<B> {
        &self.timers
    }

    pub fn is_restored(&self) -> bool {
        self.restored
    }

    /// Run startup reconciliation once. Later calls return an empty step.
    pub fn restore(&mut self) -> CoreStep {
        if self.restored {
            return CoreStep::running(Vec::new());
        }
        self.restored = true;
        let emissions = self.reconcile();
        self.refresh_status();
        CoreStep::running(emissions)
    }

    /// Handle a single event.
    ///
    /// Reconciliation runs first if it has not yet, so no input is ever
    /// handled against unrestored state.
    pub fn step(&mut self, event: TriggerEvent) -> CoreStep {
        let mut emissions = self.restore().emissions;

        let keep_running = match event {
            TriggerEvent::Input(msg) => {
                emissions.extend(self.handle_input(msg));
                true
            }
            TriggerEvent::TimerFired { key, generation } => {
                emissions.extend(self.handle_timer_fired(&key, generation));
                true
            }
            TriggerEvent::Shutdown { remove } => {
                self.shutdown(remove);
                false
            }
        };

        self.refresh_status();
        CoreStep {
            emissions,
            keep_running,
        }
    }

    /// Cancel a key's timer and delete its entry.
    pub(super) fn clear_entry(&mut self, key: &str) {
        self.timers.cancel(key);
        self.table.delete(key);
    }

    /// Slot for a deferred (op2) message of an entry in `mode`.
    pub(super) fn deferred_slot(&self, mode: TriggerMode) -> OutputSlot {
        if self.settings.second_output
            && mode != TriggerMode::Resend
            && mode != TriggerMode::WaitReset
        {
            OutputSlot::Secondary
        } else {
            OutputSlot::Primary
        }
    }

    fn shutdown(&mut self, remove: bool) {
        self.timers.cancel_all();
        if remove {
            info!(store_key = %self.table.store_key(), "shutting down; removing persisted entries");
            self.table.purge();
        } else {
            info!(entries = self.table.len(), "shutting down; entries persisted for next start");
            self.table.persist();
        }
    }

    fn refresh_status(&mut self) {
        let status = Status::from_count(self.table.len());
        if status != self.status {
            info!(status = %status, "trigger status changed");
            self.status = status;
        } else {
            debug!(status = %status, "trigger status unchanged");
        }
    }
}
