// src/timers/mod.rs

//! Per-key timers.
//!
//! [`TimerManager`] owns at most one active timer per key and hands the
//! actual waiting to a [`TimerBackend`]. Backends never touch engine state:
//! they deliver `TriggerEvent::TimerFired` messages into the engine loop,
//! tagged with a generation so that fires of replaced timers can be told
//! apart and dropped.

pub mod backend;
pub mod manager;
pub mod manual;

pub use backend::{TimerBackend, TokioTimerBackend};
pub use manager::TimerManager;
pub use manual::{ManualTimerBackend, ScheduledTimer};

/// Sequence number distinguishing successive timers.
pub type Generation = u64;

/// Longest wait handed to a backend, about 100 years. Longer delays are
/// clamped to it.
pub const MAX_TIMER_MS: u64 = 100 * 365 * 24 * 3_600 * 1_000;

/// A millisecond count as `i64`, saturating at `i64::MAX`.
pub fn signed_millis(ms: u64) -> i64 {
    i64::try_from(ms).unwrap_or(i64::MAX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    OneShot,
    Repeating,
}

/// Why a timer exists; decides what the engine does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPurpose {
    /// `wait` entry expiry.
    Expiry,
    /// First tick of a restored `resend` entry; switches to `ResendTick`.
    ResendCatchUp,
    /// Regular `resend` tick.
    ResendTick,
}

impl TimerPurpose {
    pub fn kind(self) -> TimerKind {
        match self {
            TimerPurpose::Expiry | TimerPurpose::ResendCatchUp => TimerKind::OneShot,
            TimerPurpose::ResendTick => TimerKind::Repeating,
        }
    }
}
