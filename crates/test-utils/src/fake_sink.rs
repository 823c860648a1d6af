use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use persistrig::engine::Emission;
use persistrig::errors::{Result, TriggerError};
use persistrig::io::OutputSink;
use tokio::sync::Notify;

/// A fake sink that records every emission and wakes waiters.
#[derive(Clone, Default)]
pub struct RecordingSink {
    emitted: Arc<Mutex<Vec<Emission>>>,
    notify: Arc<Notify>,
    fail_writes: Arc<AtomicBool>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every write fails and records nothing.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn emitted(&self) -> Vec<Emission> {
        self.emitted.lock().unwrap().clone()
    }

    /// Wait until at least `count` emissions were recorded.
    pub async fn wait_for(&self, count: usize) -> Vec<Emission> {
        loop {
            let notified = self.notify.notified();
            {
                let guard = self.emitted.lock().unwrap();
                if guard.len() >= count {
                    return guard.clone();
                }
            }
            notified.await;
        }
    }
}

impl OutputSink for RecordingSink {
    fn emit(
        &mut self,
        emissions: Vec<Emission>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let emitted = Arc::clone(&self.emitted);
        let notify = Arc::clone(&self.notify);
        let fail = self.fail_writes.load(Ordering::SeqCst);

        Box::pin(async move {
            if fail {
                return Err(TriggerError::IoError(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "sink closed",
                )));
            }
            {
                let mut guard = emitted.lock().unwrap();
                guard.extend(emissions);
            }
            notify.notify_waiters();
            Ok(())
        })
    }
}
