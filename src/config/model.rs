// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::engine::key::Keying;
use crate::message::OutputDescriptor;
use crate::types::{DelayUnit, ExpiryPolicy, KeyMode, StoreKind, TriggerMode};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// id = "door-sensor"
/// mode = "wait"
/// duration = 5
/// units = "s"
/// bymode = "each"
/// by = "topic"
/// expired = "flag"
///
/// [op1]
/// type = "pay"
///
/// [op2]
/// type = "str"
/// value = "closed"
///
/// [store]
/// kind = "file"
/// path = ".persistrig/state.json"
/// ```
///
/// Every field is optional; defaults mirror a freshly created trigger.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    /// Instance id; forms the store key `persisted-trigger:<id>`.
    #[serde(default = "default_id")]
    pub id: String,

    #[serde(default)]
    pub mode: TriggerMode,

    /// Delay (wait) or interval (resend), in `units`.
    #[serde(default)]
    pub duration: f64,

    #[serde(default)]
    pub units: DelayUnit,

    /// Restart the wait clock when another event arrives for a pending key.
    #[serde(default)]
    pub extend: bool,

    /// Let an event's `delay` field (milliseconds) replace `duration`.
    #[serde(default)]
    pub override_delay: bool,

    /// Payload text that marks an event as a reset. Empty disables matching.
    #[serde(default)]
    pub reset: String,

    #[serde(default)]
    pub bymode: KeyMode,

    /// Event field (dot-separated path) used as the key when `bymode = "each"`.
    #[serde(default = "default_by")]
    pub by: String,

    /// Route deferred `wait` emissions to the second output.
    #[serde(default)]
    pub second_output: bool,

    /// What to do with wait entries that expired while the process was down.
    #[serde(default)]
    pub expired: ExpiryPolicy,

    /// Immediate emission. Defaults to the original event.
    #[serde(default)]
    pub op1: Option<OutputSection>,

    /// Deferred emission. Defaults to nothing.
    #[serde(default)]
    pub op2: Option<OutputSection>,

    #[serde(default)]
    pub store: StoreSection,

    #[serde(default)]
    pub context: ContextSection,
}

/// `[op1]` / `[op2]` section: a typed value.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct OutputSection {
    /// Type tag (`pay`, `payl`, `nothing`, `str`, `num`, `json`, ...).
    #[serde(rename = "type", default)]
    pub kind: Option<String>,

    #[serde(default)]
    pub value: String,
}

impl OutputSection {
    /// Resolve into a descriptor, using `fallback_tag` when `type` is unset.
    pub fn descriptor(section: Option<&OutputSection>, fallback_tag: &str) -> OutputDescriptor {
        match section {
            Some(s) => OutputDescriptor::from_typed(
                s.kind.as_deref().unwrap_or(fallback_tag),
                &s.value,
            ),
            None => OutputDescriptor::from_typed(fallback_tag, ""),
        }
    }
}

/// `[store]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreSection {
    #[serde(default)]
    pub kind: StoreKind,

    /// JSON document holding the persisted entries of every instance.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            kind: StoreKind::default(),
            path: default_store_path(),
        }
    }
}

/// `[context]` section: read-only values for `flow` / `global` lookups.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ContextSection {
    #[serde(default)]
    pub flow: BTreeMap<String, toml::Value>,

    #[serde(default)]
    pub global: BTreeMap<String, toml::Value>,
}

fn default_id() -> String {
    "default".to_string()
}

fn default_by() -> String {
    "topic".to_string()
}

fn default_store_path() -> PathBuf {
    PathBuf::from(".persistrig/state.json")
}

/// Immutable settings consumed by the trigger engine.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerSettings {
    pub id: String,
    pub mode: TriggerMode,
    /// Configured delay / interval in milliseconds.
    pub delay_ms: u64,
    pub extend: bool,
    pub override_delay: bool,
    /// `None` when reset matching by payload is disabled.
    pub reset_match: Option<String>,
    pub keying: Keying,
    pub second_output: bool,
    pub expiry_policy: ExpiryPolicy,
    pub op1: OutputDescriptor,
    pub op2: OutputDescriptor,
}

impl TriggerSettings {
    /// Key under which this instance's entry table is persisted.
    pub fn store_key(&self) -> String {
        format!("persisted-trigger:{}", self.id)
    }
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub settings: TriggerSettings,
    pub store: StoreSection,
    pub context: ContextSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        settings: TriggerSettings,
        store: StoreSection,
        context: ContextSection,
    ) -> Self {
        Self {
            settings,
            store,
            context,
        }
    }
}
