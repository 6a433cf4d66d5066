use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::TimerMode;

/// Every timer state change produces an Event.
/// The CLI prints them as text or JSON lines; widgets subscribe via the
/// engine's callbacks instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        mode: TimerMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        mode: TimerMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: TimerMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// Mode changed, either by user intent or by the post-completion
    /// auto-transition (`auto: true`).
    ModeSwitched {
        mode: TimerMode,
        duration_secs: u64,
        auto: bool,
        at: DateTime<Utc>,
    },
    /// A countdown reached zero. For Focus mode, `completed_sessions` has
    /// already been incremented; for breaks it is unchanged.
    TimerCompleted {
        mode: TimerMode,
        next_mode: TimerMode,
        completed_sessions: u32,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        mode: TimerMode,
        is_running: bool,
        remaining_secs: u64,
        total_secs: u64,
        completed_sessions: u32,
        progress_pct: f64,
        at: DateTime<Utc>,
    },
}
