// src/store/file.rs

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};
use tracing::debug;

use super::EntryStore;
use crate::fs::FileSystem;

/// Stores every instance's table in one JSON document:
///
/// ```json
/// { "persisted-trigger:door": { "all": { "mode": "wait", ... } } }
/// ```
#[derive(Debug)]
pub struct FileStore<F: FileSystem> {
    fs: F,
    path: PathBuf,
}

impl<F: FileSystem> FileStore<F> {
    pub fn new(fs: F, path: PathBuf) -> Self {
        Self { fs, path }
    }

    fn load_document(&self) -> Result<Map<String, Value>> {
        if !self.fs.exists(&self.path) {
            return Ok(Map::new());
        }
        let text = self.fs.read_to_string(&self.path)?;
        if text.trim().is_empty() {
            return Ok(Map::new());
        }
        let doc: Value = serde_json::from_str(&text)
            .with_context(|| format!("parsing store document {:?}", self.path))?;
        match doc {
            Value::Object(map) => Ok(map),
            _ => bail!("store document {:?} is not a JSON object", self.path),
        }
    }

    fn save_document(&self, doc: &Map<String, Value>) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(doc)?;
        self.fs.write(&self.path, &bytes)
    }
}

impl<F: FileSystem> EntryStore for FileStore<F> {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let doc = self.load_document()?;
        Ok(doc.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Option<Value>) -> Result<()> {
        let mut doc = self.load_document()?;
        match value {
            Some(v) => {
                doc.insert(key.to_string(), v);
            }
            None => {
                if doc.remove(key).is_none() {
                    return Ok(());
                }
            }
        }
        self.save_document(&doc)?;
        debug!(key, path = ?self.path, "store document written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;
    use serde_json::json;

    #[test]
    fn keys_share_one_document() {
        let fs = MockFileSystem::new();
        let mut store = FileStore::new(fs.clone(), PathBuf::from("state.json"));

        store.set("a", Some(json!({"x": 1}))).unwrap();
        store.set("b", Some(json!({"y": 2}))).unwrap();
        assert_eq!(store.get("a").unwrap(), Some(json!({"x": 1})));

        store.set("a", None).unwrap();
        assert_eq!(store.get("a").unwrap(), None);

        let doc: Value = serde_json::from_str(&fs.contents("state.json").unwrap()).unwrap();
        assert_eq!(doc, json!({"b": {"y": 2}}));
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let store = FileStore::new(MockFileSystem::new(), PathBuf::from("none.json"));
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn corrupt_document_is_an_error() {
        let fs = MockFileSystem::new();
        fs.add_file("state.json", "{not json");
        let store = FileStore::new(fs, PathBuf::from("state.json"));
        assert!(store.get("k").is_err());
    }

    #[test]
    fn write_failures_surface() {
        let fs = MockFileSystem::new();
        fs.set_fail_writes(true);
        let mut store = FileStore::new(fs, PathBuf::from("state.json"));
        assert!(store.set("k", Some(json!(1))).is_err());
    }
}
