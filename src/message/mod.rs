// src/message/mod.rs

//! Messages flowing in and out of a trigger.
//!
//! A message is a JSON object. Input events that are not objects are wrapped
//! as `{"payload": <value>}` on arrival.

pub mod builder;
pub mod descriptor;
pub mod fields;
pub mod resolve;
pub mod snapshot;

/// A single event or emitted message.
pub type Message = serde_json::Map<String, serde_json::Value>;

pub use builder::MessageBuilder;
pub use descriptor::{DateFormat, OutputDescriptor};
pub use resolve::{ContextResolver, ScopeResolver};
pub use snapshot::{into_message, persistable_clone};
