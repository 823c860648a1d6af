// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::io::OutputSink;
use crate::timers::TimerBackend;

use super::core::{CoreStep, TriggerCore};
use super::TriggerEvent;

/// Drives a [`TriggerCore`] from a channel of [`TriggerEvent`]s and hands
/// its emissions to an [`OutputSink`].
///
/// Inputs, timer fires and shutdown requests all arrive on the same channel
/// and are handled one at a time, so no two mutations of the core overlap.
pub struct Runtime<B: TimerBackend, S: OutputSink> {
    core: TriggerCore<B>,
    event_rx: mpsc::Receiver<TriggerEvent>,
    sink: S,
}

impl<B: TimerBackend, S: OutputSink> fmt::Debug for Runtime<B, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<B: TimerBackend, S: OutputSink> Runtime<B, S> {
    pub fn new(core: TriggerCore<B>, event_rx: mpsc::Receiver<TriggerEvent>, sink: S) -> Self {
        Self {
            core,
            event_rx,
            sink,
        }
    }

    /// Main event loop.
    ///
    /// - Restores persisted entries before reading any event.
    /// - Feeds each event into the core and emits what it returns.
    /// - Stops after a shutdown event, or persists and stops if the channel
    ///   closes.
    /// - Sink errors are logged and never end the loop.
    pub async fn run(mut self) -> Result<()> {
        info!(
            store_key = %self.core.table().store_key(),
            mode = ?self.core.settings().mode,
            "persistrig runtime started"
        );

        let restored = self.core.restore();
        self.emit(restored).await;

        loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("runtime event channel closed; shutting down");
                    let step = self.core.step(TriggerEvent::Shutdown { remove: false });
                    self.emit(step).await;
                    break;
                }
            };

            debug!(?event, "runtime received event");

            let step = self.core.step(event);
            let keep_running = step.keep_running;
            self.emit(step).await;

            if !keep_running {
                info!("core requested exit; stopping runtime");
                break;
            }
        }

        info!("runtime exiting");
        Ok(())
    }

    /// A failed write loses these messages only. The loop keeps running so
    /// timers and persistence stay consistent with the table.
    async fn emit(&mut self, step: CoreStep) {
        if step.emissions.is_empty() {
            return;
        }
        let count = step.emissions.len();
        debug!(count, "emitting messages");
        if let Err(err) = self.sink.emit(step.emissions).await {
            warn!(error = %err, count, "failed to write emissions; continuing");
        }
    }
}
