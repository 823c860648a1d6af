// src/engine/key.rs

//! Reading keys, reset markers and delay overrides from input events.

use crate::message::Message;
use crate::message::fields::{is_truthy, lookup_path, non_negative_millis, value_text};

/// Key shared by every event when keying is `all`.
pub const ALL_KEY: &str = "all";

/// Key for events lacking the configured key field.
pub const UNDEFINED_KEY: &str = "undefined";

/// How events are grouped into entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keying {
    All,
    Each { field: String },
}

impl Keying {
    pub fn key_for(&self, event: &Message) -> String {
        match self {
            Keying::All => ALL_KEY.to_string(),
            Keying::Each { field } => match lookup_path(event, field) {
                None | Some(serde_json::Value::Null) => UNDEFINED_KEY.to_string(),
                Some(v) => value_text(v),
            },
        }
    }
}

/// Whether `event` asks to reset its key.
///
/// A truthy `reset` field always does; otherwise, with a reset-match value
/// configured, the payload's text must equal it.
pub fn is_reset(event: &Message, reset_match: Option<&str>) -> bool {
    if event.get("reset").is_some_and(is_truthy) {
        return true;
    }
    match reset_match {
        Some(expected) => payload_text(event) == expected,
        None => false,
    }
}

fn payload_text(event: &Message) -> String {
    match event.get("payload") {
        Some(v) => value_text(v),
        None => "undefined".to_string(),
    }
}

/// Delay override from the event's `delay` field, in milliseconds.
pub fn delay_override(event: &Message) -> Option<u64> {
    event.get("delay").and_then(non_negative_millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::into_message;
    use serde_json::json;

    #[test]
    fn keys_by_mode() {
        let each = Keying::Each {
            field: "topic".to_string(),
        };
        assert_eq!(Keying::All.key_for(&into_message(json!({"topic": "a"}))), "all");
        assert_eq!(each.key_for(&into_message(json!({"topic": "a"}))), "a");
        assert_eq!(each.key_for(&into_message(json!({"topic": 7}))), "7");
        assert_eq!(each.key_for(&into_message(json!({"payload": 1}))), "undefined");
        assert_eq!(each.key_for(&into_message(json!({"topic": null}))), "undefined");
    }

    #[test]
    fn reset_detection() {
        assert!(is_reset(&into_message(json!({"reset": true})), None));
        assert!(!is_reset(&into_message(json!({"reset": false})), None));
        assert!(is_reset(&into_message(json!({"payload": "stop"})), Some("stop")));
        assert!(is_reset(&into_message(json!({"payload": 0})), Some("0")));
        assert!(!is_reset(&into_message(json!({"payload": "go"})), Some("stop")));
        assert!(!is_reset(&into_message(json!({"payload": "stop"})), None));
    }

    #[test]
    fn delay_override_reads_field() {
        assert_eq!(delay_override(&into_message(json!({"delay": 20}))), Some(20));
        assert_eq!(delay_override(&into_message(json!({"delay": -5}))), None);
        assert_eq!(delay_override(&into_message(json!({"delay": "x"}))), None);
        assert_eq!(delay_override(&into_message(json!({}))), None);
    }
}
