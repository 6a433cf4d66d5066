use serde::{Deserialize, Serialize};
use std::fmt;

/// Timer mode. Determines the countdown duration and which completion
/// behavior applies when the countdown reaches zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerMode {
    Focus,
    ShortBreak,
    LongBreak,
}

impl TimerMode {
    /// Human-readable label for display surfaces.
    pub fn label(self) -> &'static str {
        match self {
            TimerMode::Focus => "Focus",
            TimerMode::ShortBreak => "Short Break",
            TimerMode::LongBreak => "Long Break",
        }
    }

    pub fn is_break(self) -> bool {
        !matches!(self, TimerMode::Focus)
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Resolved duration table, seconds per mode.
///
/// Built once from preferences (or defaults) and treated as immutable for
/// the lifetime of an engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Durations {
    pub focus_secs: u64,
    pub short_break_secs: u64,
    pub long_break_secs: u64,
}

impl Durations {
    /// Build from per-mode durations in minutes.
    ///
    /// Uses saturating arithmetic to prevent overflow with large values.
    pub fn from_minutes(focus_min: u64, short_break_min: u64, long_break_min: u64) -> Self {
        Self {
            focus_secs: focus_min.saturating_mul(60),
            short_break_secs: short_break_min.saturating_mul(60),
            long_break_secs: long_break_min.saturating_mul(60),
        }
    }

    pub fn secs_for(&self, mode: TimerMode) -> u64 {
        match mode {
            TimerMode::Focus => self.focus_secs,
            TimerMode::ShortBreak => self.short_break_secs,
            TimerMode::LongBreak => self.long_break_secs,
        }
    }
}

impl Default for Durations {
    fn default() -> Self {
        Self {
            focus_secs: 25 * 60,
            short_break_secs: 5 * 60,
            long_break_secs: 15 * 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_duration_table() {
        let d = Durations::default();
        assert_eq!(d.secs_for(TimerMode::Focus), 1500);
        assert_eq!(d.secs_for(TimerMode::ShortBreak), 300);
        assert_eq!(d.secs_for(TimerMode::LongBreak), 900);
    }

    #[test]
    fn from_minutes_converts_to_seconds() {
        let d = Durations::from_minutes(50, 10, 30);
        assert_eq!(d.focus_secs, 3000);
        assert_eq!(d.short_break_secs, 600);
        assert_eq!(d.long_break_secs, 1800);
    }

    #[test]
    fn from_minutes_saturates_on_overflow() {
        let d = Durations::from_minutes(u64::MAX, 5, 15);
        assert_eq!(d.focus_secs, u64::MAX);
    }

    #[test]
    fn mode_labels() {
        assert_eq!(TimerMode::Focus.label(), "Focus");
        assert_eq!(TimerMode::ShortBreak.label(), "Short Break");
        assert_eq!(TimerMode::LongBreak.label(), "Long Break");
        assert!(!TimerMode::Focus.is_break());
        assert!(TimerMode::ShortBreak.is_break());
        assert!(TimerMode::LongBreak.is_break());
    }

    #[test]
    fn mode_serializes_camel_case() {
        assert_eq!(
            serde_json::to_string(&TimerMode::ShortBreak).unwrap(),
            "\"shortBreak\""
        );
    }
}
