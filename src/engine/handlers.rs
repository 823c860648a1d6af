// src/engine/handlers.rs

//! Input, reset and timer handling for [`TriggerCore`].

use tracing::{debug, warn};

use super::core::TriggerCore;
use super::entry::{Entry, EntryTiming};
use super::key::{delay_override, is_reset};
use super::{Emission, OutputSlot};
use crate::message::{Message, persistable_clone};
use crate::timers::{Generation, TimerBackend, TimerPurpose, signed_millis};
use crate::types::TriggerMode;

impl<B: TimerBackend> TriggerCore<B> {
    pub(super) fn handle_input(&mut self, event: Message) -> Vec<Emission> {
        let key = self.settings.keying.key_for(&event);

        if is_reset(&event, self.settings.reset_match.as_deref()) {
            return self.handle_reset(&key);
        }

        let delay_ms = self.effective_delay(&event);
        debug!(key = %key, delay_ms, mode = ?self.settings.mode, "input event");

        match self.settings.mode {
            TriggerMode::Wait => self.input_wait(&key, event, delay_ms),
            TriggerMode::WaitReset => self.input_waitreset(&key, event),
            TriggerMode::Resend => self.input_resend(&key, event, delay_ms),
        }
    }

    fn effective_delay(&self, event: &Message) -> u64 {
        if self.settings.override_delay {
            if let Some(ms) = delay_override(event) {
                return ms;
            }
            if event.contains_key("delay") {
                debug!("ignoring invalid delay override");
            }
        }
        self.settings.delay_ms
    }

    fn input_wait(&mut self, key: &str, event: Message, delay_ms: u64) -> Vec<Emission> {
        let delay = signed_millis(delay_ms);
        let expiry = self.clock.now_ms().saturating_add(delay);

        if self.table.contains(key) {
            let latest = persistable_clone(&event);
            if self.settings.extend {
                self.table.update(key, |e| {
                    e.latest = latest;
                    e.timing = EntryTiming::Wait { expiry };
                });
                self.timers.schedule_once(key, delay, TimerPurpose::Expiry);
                debug!(key = %key, expiry, "extended wait");
            } else {
                self.table.update(key, |e| e.latest = latest);
            }
            return Vec::new();
        }

        let emissions = self.immediate(&event, &event);
        let entry = Entry::new(persistable_clone(&event), EntryTiming::Wait { expiry });
        self.table.put(key, entry);
        self.timers.schedule_once(key, delay, TimerPurpose::Expiry);
        emissions
    }

    fn input_waitreset(&mut self, key: &str, event: Message) -> Vec<Emission> {
        if self.table.contains(key) {
            let latest = persistable_clone(&event);
            self.table.update(key, |e| e.latest = latest);
            return Vec::new();
        }

        let emissions = self.immediate(&event, &event);
        self.table.put(key, Entry::new(persistable_clone(&event), EntryTiming::WaitReset));
        emissions
    }

    fn input_resend(&mut self, key: &str, event: Message, interval_ms: u64) -> Vec<Emission> {
        self.clear_entry(key);

        let entry = Entry::new(
            persistable_clone(&event),
            EntryTiming::Resend {
                interval_ms,
                last_sent: Some(self.clock.now_ms()),
            },
        );
        let emissions = self.immediate(&entry.original, &entry.latest);
        self.table.put(key, entry);
        self.timers.schedule_repeating(key, interval_ms, TimerPurpose::ResendTick);
        emissions
    }

    pub(super) fn handle_reset(&mut self, key: &str) -> Vec<Emission> {
        let Some(entry) = self.table.get(key) else {
            debug!(key = %key, "reset for unknown key; ignoring");
            return Vec::new();
        };

        let emissions = match entry.timing {
            EntryTiming::WaitReset => {
                // Reset releases op2 on the primary output only.
                self.deferred(entry, None)
                    .map(|mut em| {
                        em.slot = OutputSlot::Primary;
                        vec![em]
                    })
                    .unwrap_or_default()
            }
            _ => {
                debug!(key = %key, mode = ?entry.mode(), "reset suppresses pending output");
                Vec::new()
            }
        };

        self.clear_entry(key);
        emissions
    }

    pub(super) fn handle_timer_fired(&mut self, key: &str, generation: Generation) -> Vec<Emission> {
        let Some(purpose) = self.timers.accept_fire(key, generation) else {
            return Vec::new();
        };

        match purpose {
            TimerPurpose::Expiry => self.expire(key),
            TimerPurpose::ResendTick => self.resend_tick(key),
            TimerPurpose::ResendCatchUp => {
                let emissions = self.resend_tick(key);
                if let Some(interval_ms) = self.resend_interval(key) {
                    self.timers.schedule_repeating(key, interval_ms, TimerPurpose::ResendTick);
                }
                emissions
            }
        }
    }

    /// Emit op2 for an expired wait entry and clear it.
    fn expire(&mut self, key: &str) -> Vec<Emission> {
        let emissions = match self.table.get(key) {
            Some(entry) => self.deferred(entry, None).into_iter().collect(),
            None => {
                warn!(key = %key, "expiry timer fired without an entry");
                Vec::new()
            }
        };
        self.clear_entry(key);
        emissions
    }

    /// Re-emit op1 from a resend entry and stamp `lastSent`.
    fn resend_tick(&mut self, key: &str) -> Vec<Emission> {
        let now_ms = self.clock.now_ms();
        let updated = self.table.update(key, |e| {
            if let EntryTiming::Resend { last_sent, .. } = &mut e.timing {
                *last_sent = Some(now_ms);
            }
        });
        if !updated {
            self.timers.cancel(key);
            return Vec::new();
        }

        match self.table.get(key) {
            Some(entry) => {
                let (original, latest) = (entry.original.clone(), entry.latest.clone());
                self.immediate(&original, &latest)
            }
            None => Vec::new(),
        }
    }

    /// Interval of a resend entry, falling back to the configured delay.
    pub(super) fn resend_interval(&self, key: &str) -> Option<u64> {
        match self.table.get(key)?.timing {
            EntryTiming::Resend { interval_ms, .. } if interval_ms > 0 => Some(interval_ms),
            EntryTiming::Resend { .. } => Some(self.settings.delay_ms),
            _ => None,
        }
    }

    /// op1, always on the primary output.
    fn immediate(&self, original: &Message, latest: &Message) -> Vec<Emission> {
        self.builder
            .build(&self.settings.op1, original, latest, self.clock.now())
            .map(Emission::primary)
            .into_iter()
            .collect()
    }

    /// op2 for `entry`, routed by its mode. `expired_at` adds the
    /// expired-on-restore marker.
    pub(super) fn deferred(&self, entry: &Entry, expired_at: Option<i64>) -> Option<Emission> {
        let mut message = self.builder.build(
            &self.settings.op2,
            &entry.original,
            &entry.latest,
            self.clock.now(),
        )?;
        if let Some(expiry) = expired_at {
            message.insert("expired".to_string(), true.into());
            message.insert("triggerOriginalExpiry".to_string(), expiry.into());
        }
        Some(Emission {
            slot: self.deferred_slot(entry.mode()),
            message,
        })
    }
}
