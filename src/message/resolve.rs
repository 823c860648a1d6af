// src/message/resolve.rs

//! Read-only lookups used by the `flow`, `global` and `env` types.

use std::collections::BTreeMap;
use std::fmt::Debug;

use anyhow::{Context, Result};
use serde_json::Value;

use super::Message;
use super::fields::lookup_path;
use crate::config::ContextSection;

/// Source of scoped values.
pub trait ScopeResolver: Send + Sync + Debug {
    fn flow(&self, name: &str) -> Result<Option<Value>>;
    fn global(&self, name: &str) -> Result<Option<Value>>;
    fn env(&self, name: &str) -> Option<String>;
}

/// Resolver backed by the `[context.flow]` / `[context.global]` config tables
/// and the process environment.
#[derive(Debug, Clone, Default)]
pub struct ContextResolver {
    flow: Message,
    global: Message,
}

impl ContextResolver {
    pub fn new(flow: Message, global: Message) -> Self {
        Self { flow, global }
    }

    pub fn from_config(section: &ContextSection) -> Result<Self> {
        Ok(Self {
            flow: toml_table_to_json(&section.flow).context("converting [context.flow]")?,
            global: toml_table_to_json(&section.global)
                .context("converting [context.global]")?,
        })
    }
}

impl ScopeResolver for ContextResolver {
    fn flow(&self, name: &str) -> Result<Option<Value>> {
        Ok(lookup_path(&self.flow, name).cloned())
    }

    fn global(&self, name: &str) -> Result<Option<Value>> {
        Ok(lookup_path(&self.global, name).cloned())
    }

    fn env(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

fn toml_table_to_json(table: &BTreeMap<String, toml::Value>) -> Result<Message> {
    let mut out = Message::new();
    for (k, v) in table {
        out.insert(k.clone(), serde_json::to_value(v)?);
    }
    Ok(out)
}
