// src/timers/manager.rs

use std::collections::HashMap;
use std::time::Duration;

use tracing::debug;

use super::{Generation, MAX_TIMER_MS, TimerBackend, TimerKind, TimerPurpose};

#[derive(Debug)]
struct ActiveTimer<H> {
    purpose: TimerPurpose,
    generation: Generation,
    handle: H,
}

/// Owns the active timer of every key.
///
/// Invariant: at most one active timer per key. Every schedule call cancels
/// the key's existing timer first.
#[derive(Debug)]
pub struct TimerManager<B: TimerBackend> {
    backend: B,
    active: HashMap<String, ActiveTimer<B::Handle>>,
    next_generation: Generation,
}

impl<B: TimerBackend> TimerManager<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            active: HashMap::new(),
            next_generation: 1,
        }
    }

    /// Schedule a one-shot timer. The delay is clamped to `0..=MAX_TIMER_MS`.
    pub fn schedule_once(&mut self, key: &str, delay_ms: i64, purpose: TimerPurpose) -> Generation {
        debug_assert_eq!(purpose.kind(), TimerKind::OneShot);
        self.cancel(key);
        let generation = self.bump();
        let delay = Duration::from_millis(u64::try_from(delay_ms).unwrap_or(0).min(MAX_TIMER_MS));
        let handle = self.backend.start_once(key, generation, delay);
        debug!(key = %key, generation, delay_ms = delay.as_millis() as u64, ?purpose, "scheduled one-shot timer");
        self.active.insert(
            key.to_string(),
            ActiveTimer {
                purpose,
                generation,
                handle,
            },
        );
        generation
    }

    /// Schedule a repeating timer. The period is clamped to `1..=MAX_TIMER_MS`.
    pub fn schedule_repeating(
        &mut self,
        key: &str,
        interval_ms: u64,
        purpose: TimerPurpose,
    ) -> Generation {
        debug_assert_eq!(purpose.kind(), TimerKind::Repeating);
        self.cancel(key);
        let generation = self.bump();
        let period = Duration::from_millis(interval_ms.clamp(1, MAX_TIMER_MS));
        let handle = self.backend.start_repeating(key, generation, period);
        debug!(key = %key, generation, interval_ms = period.as_millis() as u64, "scheduled repeating timer");
        self.active.insert(
            key.to_string(),
            ActiveTimer {
                purpose,
                generation,
                handle,
            },
        );
        generation
    }

    /// Cancel the key's timer. Returns whether one was active.
    pub fn cancel(&mut self, key: &str) -> bool {
        match self.active.remove(key) {
            Some(timer) => {
                debug!(key = %key, generation = timer.generation, "cancelled timer");
                self.backend.stop(timer.handle);
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&mut self) {
        let keys: Vec<String> = self.active.keys().cloned().collect();
        for key in keys {
            self.cancel(&key);
        }
    }

    /// Validate a fire against the key's current timer.
    ///
    /// Returns the purpose when `generation` is current; one-shot timers are
    /// retired at this point. Stale fires return `None`.
    pub fn accept_fire(&mut self, key: &str, generation: Generation) -> Option<TimerPurpose> {
        let current = self.active.get(key)?;
        if current.generation != generation {
            debug!(key = %key, generation, current = current.generation, "ignoring stale timer fire");
            return None;
        }
        let purpose = current.purpose;
        if purpose.kind() == TimerKind::OneShot {
            if let Some(timer) = self.active.remove(key) {
                self.backend.stop(timer.handle);
            }
        }
        Some(purpose)
    }

    pub fn has_timer(&self, key: &str) -> bool {
        self.active.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    fn bump(&mut self) -> Generation {
        let generation = self.next_generation;
        self.next_generation += 1;
        generation
    }
}
