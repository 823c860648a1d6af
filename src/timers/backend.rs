// src/timers/backend.rs

//! Pluggable timer backend abstraction.
//!
//! - [`TokioTimerBackend`] is the production implementation: one Tokio task
//!   per timer, sending fires over the runtime event channel.
//! - [`super::ManualTimerBackend`] records timers so tests can fire them
//!   deterministically against a manual clock.

use std::fmt::Debug;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at, sleep};
use tracing::debug;

use super::Generation;
use crate::engine::TriggerEvent;

/// Trait abstracting how timers wait and deliver fires.
pub trait TimerBackend: Send + Debug {
    type Handle: Send + Debug;

    /// Fire once after `delay`.
    fn start_once(&mut self, key: &str, generation: Generation, delay: Duration) -> Self::Handle;

    /// Fire every `period`, first after one full `period`.
    fn start_repeating(
        &mut self,
        key: &str,
        generation: Generation,
        period: Duration,
    ) -> Self::Handle;

    /// Stop a timer. Stopping a finished timer is a no-op.
    fn stop(&mut self, handle: Self::Handle);
}

/// Production backend: timers are Tokio tasks.
///
/// Must be used from within a Tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioTimerBackend {
    tx: mpsc::Sender<TriggerEvent>,
}

impl TokioTimerBackend {
    pub fn new(tx: mpsc::Sender<TriggerEvent>) -> Self {
        Self { tx }
    }
}

impl TimerBackend for TokioTimerBackend {
    type Handle = AbortHandle;

    fn start_once(&mut self, key: &str, generation: Generation, delay: Duration) -> AbortHandle {
        let tx = self.tx.clone();
        let key = key.to_string();
        tokio::spawn(async move {
            sleep(delay).await;
            debug!(key = %key, generation, "one-shot timer elapsed");
            let _ = tx.send(TriggerEvent::TimerFired { key, generation }).await;
        })
        .abort_handle()
    }

    fn start_repeating(
        &mut self,
        key: &str,
        generation: Generation,
        period: Duration,
    ) -> AbortHandle {
        let tx = self.tx.clone();
        let key = key.to_string();
        tokio::spawn(async move {
            let start = Instant::now().checked_add(period).unwrap_or_else(Instant::now);
            let mut ticker = interval_at(start, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let event = TriggerEvent::TimerFired {
                    key: key.clone(),
                    generation,
                };
                if tx.send(event).await.is_err() {
                    debug!(key = %key, "event channel closed; repeating timer ends");
                    break;
                }
            }
        })
        .abort_handle()
    }

    fn stop(&mut self, handle: AbortHandle) {
        handle.abort();
    }
}
