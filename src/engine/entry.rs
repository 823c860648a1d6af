// src/engine/entry.rs

//! The entry table: durable key -> entry map.
//!
//! The table is the serializable half of a trigger's state (the timer
//! manager is the other half). It is written to its store after every
//! mutation; a failed write is logged and the in-memory table stays
//! authoritative.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::message::Message;
use crate::store::EntryStore;
use crate::types::TriggerMode;

/// In-progress trigger sequence of one key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub original: Message,
    pub latest: Message,
    #[serde(flatten)]
    pub timing: EntryTiming,
}

/// Mode-specific timing; the `mode` tag selects which fields exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum EntryTiming {
    Wait {
        /// Absolute expiry, epoch ms. A missing value counts as long expired.
        #[serde(default)]
        expiry: i64,
    },
    WaitReset,
    Resend {
        /// Zero means "use the configured delay".
        #[serde(rename = "intervalMs", default)]
        interval_ms: u64,
        #[serde(rename = "lastSent", default)]
        last_sent: Option<i64>,
    },
}

impl Entry {
    pub fn new(snapshot: Message, timing: EntryTiming) -> Self {
        Self {
            original: snapshot.clone(),
            latest: snapshot,
            timing,
        }
    }

    pub fn mode(&self) -> TriggerMode {
        match self.timing {
            EntryTiming::Wait { .. } => TriggerMode::Wait,
            EntryTiming::WaitReset => TriggerMode::WaitReset,
            EntryTiming::Resend { .. } => TriggerMode::Resend,
        }
    }
}

#[derive(Debug)]
pub struct EntryTable {
    entries: BTreeMap<String, Entry>,
    store: Box<dyn EntryStore>,
    store_key: String,
}

impl EntryTable {
    /// Read the persisted table for `store_key`.
    ///
    /// An unreadable image starts an empty table; malformed entries are
    /// dropped. Both are logged as warnings.
    pub fn load(store: Box<dyn EntryStore>, store_key: impl Into<String>) -> Self {
        let store_key = store_key.into();
        let mut entries = BTreeMap::new();

        match store.get(&store_key) {
            Ok(Some(Value::Object(raw))) => {
                for (key, value) in raw {
                    match serde_json::from_value::<Entry>(value) {
                        Ok(entry) => {
                            entries.insert(key, entry);
                        }
                        Err(err) => {
                            warn!(key = %key, error = %err, "dropping malformed persisted entry");
                        }
                    }
                }
            }
            Ok(Some(Value::Null)) | Ok(None) => {}
            Ok(Some(other)) => {
                warn!(store_key = %store_key, kind = %json_kind(&other), "persisted table is not an object; starting empty");
            }
            Err(err) => {
                warn!(store_key = %store_key, error = %err, "failed to read persisted entries; starting empty");
            }
        }

        debug!(store_key = %store_key, entries = entries.len(), "entry table loaded");
        Self {
            entries,
            store,
            store_key,
        }
    }

    pub fn store_key(&self) -> &str {
        &self.store_key
    }

    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or replace an entry, then persist.
    pub fn put(&mut self, key: &str, entry: Entry) {
        self.entries.insert(key.to_string(), entry);
        self.persist();
    }

    /// Mutate an entry in place, then persist. Returns whether it existed.
    pub fn update(&mut self, key: &str, f: impl FnOnce(&mut Entry)) -> bool {
        match self.entries.get_mut(key) {
            Some(entry) => {
                f(entry);
                self.persist();
                true
            }
            None => false,
        }
    }

    /// Remove an entry, persisting if it existed.
    pub fn delete(&mut self, key: &str) -> Option<Entry> {
        let removed = self.entries.remove(key);
        if removed.is_some() {
            self.persist();
        }
        removed
    }

    /// Remove an entry without persisting; the caller persists later.
    pub(crate) fn forget(&mut self, key: &str) -> Option<Entry> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Entry)> {
        self.entries.iter()
    }

    /// Write the whole table to the store.
    pub fn persist(&mut self) {
        let image = match serde_json::to_value(&self.entries) {
            Ok(v) => v,
            Err(err) => {
                warn!(store_key = %self.store_key, error = %err, "failed to serialize entries; not persisted");
                return;
            }
        };
        if let Err(err) = self.store.set(&self.store_key, Some(image)) {
            warn!(store_key = %self.store_key, error = %err, "failed to persist entries");
        }
    }

    /// Drop every entry and clear the persisted image.
    pub fn purge(&mut self) {
        self.entries.clear();
        if let Err(err) = self.store.set(&self.store_key, None) {
            warn!(store_key = %self.store_key, error = %err, "failed to clear persisted entries");
        }
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
