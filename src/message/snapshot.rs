// src/message/snapshot.rs

//! Snapshots of events stored inside entries.

use serde_json::Value;
use tracing::debug;

use super::Message;

/// Fields holding live transport handles; they are never persisted.
const TRANSPORT_FIELDS: &[&str] = &["req", "res", "socket"];

/// Turn an arbitrary JSON value into a message.
pub fn into_message(value: Value) -> Message {
    match value {
        Value::Object(map) => map,
        other => {
            let mut msg = Message::new();
            msg.insert("payload".to_string(), other);
            msg
        }
    }
}

/// Clone an event for storage in an entry, stripping transport handles.
pub fn persistable_clone(msg: &Message) -> Message {
    let mut clean = msg.clone();
    for field in TRANSPORT_FIELDS {
        if clean.remove(*field).is_some() {
            debug!(field, "stripped transport field from snapshot");
        }
    }
    clean
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars_are_wrapped_as_payload() {
        let m = into_message(json!(5));
        assert_eq!(Value::Object(m), json!({"payload": 5}));
    }

    #[test]
    fn transport_fields_are_stripped() {
        let m = into_message(json!({"payload": 1, "req": {"id": 1}, "res": {}, "socket": 3}));
        let clean = persistable_clone(&m);
        assert_eq!(Value::Object(clean), json!({"payload": 1}));
        // The source is untouched.
        assert!(m.contains_key("req"));
    }
}
