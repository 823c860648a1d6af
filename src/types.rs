use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How a trigger reacts to input events.
///
/// - `Wait`: emit op1 now, emit op2 once after the delay.
/// - `WaitReset`: emit op1 now, emit op2 only when a reset arrives.
/// - `Resend`: emit op1 now and again on every interval until reset or
///   superseded by a newer event for the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerMode {
    Wait,
    WaitReset,
    Resend,
}

impl Default for TriggerMode {
    fn default() -> Self {
        TriggerMode::Wait
    }
}

impl FromStr for TriggerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "wait" => Ok(TriggerMode::Wait),
            "waitreset" => Ok(TriggerMode::WaitReset),
            "resend" => Ok(TriggerMode::Resend),
            other => Err(format!(
                "invalid mode: {other} (expected \"wait\", \"waitreset\" or \"resend\")"
            )),
        }
    }
}

/// Unit applied to the configured `duration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DelayUnit {
    Ms,
    S,
    Min,
    Hr,
    Day,
}

impl Default for DelayUnit {
    fn default() -> Self {
        DelayUnit::S
    }
}

impl DelayUnit {
    /// Milliseconds in one unit.
    pub fn millis(self) -> u64 {
        match self {
            DelayUnit::Ms => 1,
            DelayUnit::S => 1_000,
            DelayUnit::Min => 60 * 1_000,
            DelayUnit::Hr => 3_600 * 1_000,
            DelayUnit::Day => 24 * 3_600 * 1_000,
        }
    }

    /// Convert `amount` of this unit into whole milliseconds.
    pub fn to_millis(self, amount: f64) -> u64 {
        if !amount.is_finite() || amount <= 0.0 {
            return 0;
        }
        (amount * self.millis() as f64).round() as u64
    }
}

impl FromStr for DelayUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ms" => Ok(DelayUnit::Ms),
            "s" => Ok(DelayUnit::S),
            "min" => Ok(DelayUnit::Min),
            "hr" => Ok(DelayUnit::Hr),
            "day" => Ok(DelayUnit::Day),
            other => Err(format!(
                "invalid units: {other} (expected ms, s, min, hr or day)"
            )),
        }
    }
}

/// Whether every event shares one entry or events are grouped by a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyMode {
    All,
    Each,
}

impl Default for KeyMode {
    fn default() -> Self {
        KeyMode::All
    }
}

impl FromStr for KeyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(KeyMode::All),
            "each" => Ok(KeyMode::Each),
            other => Err(format!(
                "invalid bymode: {other} (expected \"all\" or \"each\")"
            )),
        }
    }
}

/// What to do with a `wait` entry that expired while the process was down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpiryPolicy {
    /// Drop the entry silently.
    Discard,
    /// Emit op2 as if the timer had fired.
    Send,
    /// Emit op2 marked with `expired = true` and the original expiry.
    Flag,
}

impl Default for ExpiryPolicy {
    fn default() -> Self {
        ExpiryPolicy::Discard
    }
}

impl FromStr for ExpiryPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "discard" => Ok(ExpiryPolicy::Discard),
            "send" => Ok(ExpiryPolicy::Send),
            "flag" => Ok(ExpiryPolicy::Flag),
            other => Err(format!(
                "invalid expired policy: {other} (expected \"discard\", \"send\" or \"flag\")"
            )),
        }
    }
}

/// Backend used to persist the entry table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// Store entries in a JSON document on disk.
    File,
    /// Keep entries in memory only (lost on restart).
    Memory,
}

impl Default for StoreKind {
    fn default() -> Self {
        StoreKind::File
    }
}
