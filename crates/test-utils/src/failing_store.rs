use anyhow::{Result, bail};
use serde_json::Value;

use persistrig::store::EntryStore;

/// A store whose every operation fails, for durability-loss tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingStore;

impl EntryStore for FailingStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        bail!("store unavailable while reading {key}")
    }

    fn set(&mut self, key: &str, _value: Option<Value>) -> Result<()> {
        bail!("store unavailable while writing {key}")
    }
}
