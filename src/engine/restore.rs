// src/engine/restore.rs

//! Startup reconciliation.
//!
//! Runs once over every persisted entry before any input is handled:
//!
//! - `wait`: expired entries are finalized per the expiry policy; live ones
//!   get a one-shot timer for exactly the remaining time.
//! - `resend`: one catch-up tick, then a regular repeating timer. An overdue
//!   entry waits one full interval; missed ticks are never replayed.
//! - `waitreset`: kept as is, no timer.
//!
//! The table is persisted once at the end.

use tracing::{debug, info};

use super::Emission;
use super::core::TriggerCore;
use super::entry::EntryTiming;
use crate::timers::{TimerBackend, TimerPurpose, signed_millis};
use crate::types::ExpiryPolicy;

impl<B: TimerBackend> TriggerCore<B> {
    pub(super) fn reconcile(&mut self) -> Vec<Emission> {
        let now_ms = self.clock.now_ms();
        let mut emissions = Vec::new();
        let keys = self.table.keys();

        info!(entries = keys.len(), "restoring persisted entries");

        for key in keys {
            let Some(entry) = self.table.get(&key).cloned() else {
                continue;
            };

            match entry.timing {
                EntryTiming::Wait { expiry } => {
                    let remaining = expiry.saturating_sub(now_ms);
                    if remaining > 0 {
                        debug!(key = %key, remaining, "resuming wait");
                        self.timers.schedule_once(&key, remaining, TimerPurpose::Expiry);
                        continue;
                    }

                    let policy = self.settings.expiry_policy;
                    info!(key = %key, expiry, ?policy, "wait entry expired while down");
                    let emission = match policy {
                        ExpiryPolicy::Discard => None,
                        ExpiryPolicy::Send => self.deferred(&entry, None),
                        ExpiryPolicy::Flag => self.deferred(&entry, Some(expiry)),
                    };
                    emissions.extend(emission);
                    self.table.forget(&key);
                }
                EntryTiming::Resend { last_sent, .. } => {
                    let Some(interval_ms) = self.resend_interval(&key) else {
                        continue;
                    };
                    let delay_ms = catch_up_delay(last_sent, interval_ms, now_ms);
                    debug!(key = %key, delay_ms, interval_ms, "resuming resend");
                    self.timers.schedule_once(&key, delay_ms, TimerPurpose::ResendCatchUp);
                }
                EntryTiming::WaitReset => {
                    debug!(key = %key, "waitreset entry keeps waiting for reset");
                }
            }
        }

        self.table.persist();
        emissions
    }
}

/// Delay before the first tick of a restored resend entry.
///
/// The next tick on schedule if it is still ahead; otherwise one full
/// interval from now.
fn catch_up_delay(last_sent: Option<i64>, interval_ms: u64, now_ms: i64) -> i64 {
    let interval = signed_millis(interval_ms);
    match last_sent.map(|last| last.saturating_add(interval)) {
        Some(next) if next > now_ms => next.saturating_sub(now_ms),
        _ => interval,
    }
}
