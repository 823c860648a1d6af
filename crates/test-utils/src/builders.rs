#![allow(dead_code)]

use persistrig::config::TriggerSettings;
use persistrig::engine::Keying;
use persistrig::message::{Message, OutputDescriptor, into_message};
use persistrig::types::{ExpiryPolicy, TriggerMode};
use serde_json::Value;

/// Builder for `TriggerSettings` to simplify test setup.
///
/// Defaults: wait mode, 1000 ms, keying `all`, op1 = original event,
/// op2 = string "done", discard expired entries.
pub struct SettingsBuilder {
    settings: TriggerSettings,
}

impl SettingsBuilder {
    pub fn new(mode: TriggerMode) -> Self {
        Self {
            settings: TriggerSettings {
                id: "test".to_string(),
                mode,
                delay_ms: 1_000,
                extend: false,
                override_delay: false,
                reset_match: None,
                keying: Keying::All,
                second_output: false,
                expiry_policy: ExpiryPolicy::Discard,
                op1: OutputDescriptor::Original,
                op2: OutputDescriptor::Str("done".to_string()),
            },
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.settings.id = id.to_string();
        self
    }

    pub fn delay_ms(mut self, ms: u64) -> Self {
        self.settings.delay_ms = ms;
        self
    }

    pub fn extend(mut self, val: bool) -> Self {
        self.settings.extend = val;
        self
    }

    pub fn override_delay(mut self, val: bool) -> Self {
        self.settings.override_delay = val;
        self
    }

    pub fn reset_match(mut self, val: &str) -> Self {
        self.settings.reset_match = Some(val.to_string());
        self
    }

    pub fn keyed_by(mut self, field: &str) -> Self {
        self.settings.keying = Keying::Each {
            field: field.to_string(),
        };
        self
    }

    pub fn second_output(mut self, val: bool) -> Self {
        self.settings.second_output = val;
        self
    }

    pub fn expiry_policy(mut self, policy: ExpiryPolicy) -> Self {
        self.settings.expiry_policy = policy;
        self
    }

    pub fn op1(mut self, type_tag: &str, value: &str) -> Self {
        self.settings.op1 = OutputDescriptor::from_typed(type_tag, value);
        self
    }

    pub fn op2(mut self, type_tag: &str, value: &str) -> Self {
        self.settings.op2 = OutputDescriptor::from_typed(type_tag, value);
        self
    }

    pub fn build(self) -> TriggerSettings {
        self.settings
    }
}

/// Shorthand for building an input event from `json!`.
pub fn event(value: Value) -> Message {
    into_message(value)
}
