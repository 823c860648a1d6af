// src/store/mod.rs

//! Durable key-value storage for entry tables.
//!
//! Each trigger instance persists its whole entry table as one JSON value
//! under a store key unique to the instance. Stores are synchronous; callers
//! treat failures as non-fatal.

use std::fmt::Debug;

use anyhow::Result;
use serde_json::Value;

use crate::config::StoreSection;
use crate::fs::RealFileSystem;
use crate::types::StoreKind;

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Synchronous get/set store addressed by a stable key.
pub trait EntryStore: Send + Debug {
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Store `value` under `key`; `None` removes the key.
    fn set(&mut self, key: &str, value: Option<Value>) -> Result<()>;
}

/// Open the store selected by `[store]`.
pub fn open_store(section: &StoreSection) -> Box<dyn EntryStore> {
    match section.kind {
        StoreKind::File => Box::new(FileStore::new(RealFileSystem, section.path.clone())),
        StoreKind::Memory => Box::new(MemoryStore::new()),
    }
}
