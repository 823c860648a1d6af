// src/message/builder.rs

//! Builds op1 / op2 messages from a descriptor and an entry's snapshots.
//!
//! Every branch is total: parse or lookup failures fall back to a documented
//! value instead of surfacing an error.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Number, Value, json};
use tracing::debug;

use super::descriptor::{DateFormat, OutputDescriptor};
use super::resolve::ScopeResolver;
use super::Message;

#[derive(Debug, Clone)]
pub struct MessageBuilder {
    resolver: Arc<dyn ScopeResolver>,
}

impl MessageBuilder {
    pub fn new(resolver: Arc<dyn ScopeResolver>) -> Self {
        Self { resolver }
    }

    /// Build the message described by `descriptor`.
    ///
    /// `None` means nothing should be emitted.
    pub fn build(
        &self,
        descriptor: &OutputDescriptor,
        original: &Message,
        latest: &Message,
        now: DateTime<Utc>,
    ) -> Option<Message> {
        let payload = match descriptor {
            OutputDescriptor::Original => return Some(original.clone()),
            OutputDescriptor::Latest => return Some(latest.clone()),
            OutputDescriptor::Nothing => return None,
            OutputDescriptor::Flow(name) => scoped(name, "flow", self.resolver.flow(name)),
            OutputDescriptor::Global(name) => scoped(name, "global", self.resolver.global(name)),
            OutputDescriptor::Env(name) => self.resolver.env(name).map(Value::String),
            OutputDescriptor::Date(format) => Some(date_payload(format, now)),
            OutputDescriptor::Json(raw) => Some(
                serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.clone())),
            ),
            OutputDescriptor::Bin(raw) => {
                Some(Value::Array(raw.bytes().map(Value::from).collect()))
            }
            OutputDescriptor::Bool(raw) => {
                let v = raw.to_lowercase();
                Some(Value::Bool(v == "true" || v == "1"))
            }
            OutputDescriptor::Num(raw) => {
                Some(parse_number(raw).unwrap_or_else(|| Value::String(raw.clone())))
            }
            OutputDescriptor::Str(raw) => Some(Value::String(raw.clone())),
        };

        Some(payload_message(payload))
    }
}

/// A message carrying `payload`, or no payload at all when unresolved.
fn payload_message(payload: Option<Value>) -> Message {
    let mut msg = Message::new();
    if let Some(value) = payload {
        msg.insert("payload".to_string(), value);
    }
    msg
}

fn scoped(name: &str, scope: &str, resolved: anyhow::Result<Option<Value>>) -> Option<Value> {
    match resolved {
        Ok(value) => value,
        Err(err) => {
            debug!(scope, name, error = %err, "scoped lookup failed; payload left undefined");
            None
        }
    }
}

fn date_payload(format: &DateFormat, now: DateTime<Utc>) -> Value {
    match format {
        DateFormat::EpochMillis => json!(now.timestamp_millis()),
        DateFormat::Iso => json!(iso_string(now)),
        DateFormat::Object => json!({
            "epochMs": now.timestamp_millis(),
            "iso": iso_string(now),
        }),
        DateFormat::Raw(raw) => match leading_integer(raw) {
            Some(n) => json!(n),
            None => json!(now.timestamp_millis()),
        },
    }
}

fn iso_string(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Integer prefix of `raw` after optional whitespace and sign (`"12abc"` -> 12).
fn leading_integer(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

/// Numeric value of `raw`; blank text counts as zero.
fn parse_number(raw: &str) -> Option<Value> {
    let s = raw.trim();
    if s.is_empty() {
        return Some(json!(0));
    }
    if let Ok(i) = s.parse::<i64>() {
        return Some(json!(i));
    }
    let f = s.parse::<f64>().ok()?;
    Number::from_f64(f).map(Value::Number)
}
