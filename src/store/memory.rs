// src/store/memory.rs

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use serde_json::Value;

use super::EntryStore;

/// Stores values in memory only.
///
/// Clones share the same map, so a test can hand one clone to an engine and
/// read (or hand to a second engine) through another, simulating a restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    map: Arc<Mutex<HashMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value under `key`, if any.
    pub fn snapshot(&self, key: &str) -> Option<Value> {
        self.map.lock().ok()?.get(key).cloned()
    }
}

impl EntryStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let map = self.map.lock().map_err(|_| anyhow!("memory store poisoned"))?;
        Ok(map.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Option<Value>) -> Result<()> {
        let mut map = self.map.lock().map_err(|_| anyhow!("memory store poisoned"))?;
        match value {
            Some(v) => {
                map.insert(key.to_string(), v);
            }
            None => {
                map.remove(key);
            }
        }
        Ok(())
    }
}
