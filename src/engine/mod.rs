// src/engine/mod.rs

//! Trigger engine.
//!
//! The pure state machine lives in [`core`] (with input/reset/timer handling
//! in [`handlers`] and the startup pass in [`restore`]); the async shell that
//! feeds it events and forwards its emissions is [`runtime`].

use serde_json::{Value, json};

use crate::message::Message;
use crate::timers::Generation;

pub mod clock;
pub mod core;
pub mod entry;
pub mod handlers;
pub mod key;
pub mod restore;
pub mod runtime;

pub use self::core::{CoreStep, TriggerCore};
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{Entry, EntryTable, EntryTiming};
pub use key::{ALL_KEY, Keying, UNDEFINED_KEY};
pub use runtime::Runtime;

/// Events flowing into the engine loop.
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerEvent {
    /// An input event from the host.
    Input(Message),
    /// A timer owned by the engine elapsed.
    TimerFired { key: String, generation: Generation },
    /// Stop the engine. With `remove`, persisted entries are cleared too.
    Shutdown { remove: bool },
}

/// The two output slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSlot {
    Primary,
    Secondary,
}

impl OutputSlot {
    /// 1-based output number.
    pub fn number(self) -> u8 {
        match self {
            OutputSlot::Primary => 1,
            OutputSlot::Secondary => 2,
        }
    }
}

/// A message emitted on one output slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Emission {
    pub slot: OutputSlot,
    pub message: Message,
}

impl Emission {
    pub fn primary(message: Message) -> Self {
        Self {
            slot: OutputSlot::Primary,
            message,
        }
    }

    /// Wire form: `{"output": 1, "msg": {...}}`.
    pub fn to_json(&self) -> Value {
        json!({
            "output": self.slot.number(),
            "msg": Value::Object(self.message.clone()),
        })
    }
}

/// Summary of pending work, recomputed after every step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Idle,
    Pending(usize),
}

impl Status {
    pub fn from_count(count: usize) -> Self {
        if count == 0 {
            Status::Idle
        } else {
            Status::Pending(count)
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Idle => write!(f, "idle"),
            Status::Pending(n) => write!(f, "{n} pending"),
        }
    }
}
