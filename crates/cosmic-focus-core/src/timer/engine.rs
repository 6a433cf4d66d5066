//! Timer engine implementation.
//!
//! The timer engine is a caller-driven state machine. It does not use
//! internal threads or timers - an external scheduling source is expected
//! to call `tick()` once per second while the engine is running, and
//! `poll_switch()` on the same cadence regardless of running state so the
//! deferred post-completion mode switch can fire.
//!
//! ## State Transitions
//!
//! ```text
//! (mode, Paused) -> start -> (mode, Running)
//! (mode, Running) -> tick x duration -> (mode, Paused, remaining=0)
//!                                        + completion protocol
//! completion protocol -> settle delay -> (next mode, Paused)
//! ```
//!
//! Redundant calls (starting a depleted timer, double-pausing, ticking a
//! paused engine) are silent no-ops that return `None`, never errors.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(Durations::default());
//! engine.start();
//! // In a 1-second loop:
//! engine.tick();        // Some(Event::TimerCompleted) when the countdown ends
//! engine.poll_switch(); // Some(Event::ModeSwitched) once the settle delay passes
//! ```

use chrono::Utc;
use std::fmt;

use super::mode::{Durations, TimerMode};
use crate::events::Event;

/// Settle delay before the post-completion mode switch, in milliseconds.
/// Long enough for a display transition to play before the numbers change.
const SETTLE_DELAY_MS: u64 = 500;

/// Every 4th completed focus session earns a long break.
const SESSIONS_PER_LONG_BREAK: u32 = 4;

type ModeChangeFn = Box<dyn FnMut(TimerMode, bool) + Send>;
type SessionCompleteFn = Box<dyn FnMut(u32) + Send>;

/// One-shot deferred mode switch scheduled by the completion protocol.
///
/// Intervening operations do not cancel it: it fires on schedule and
/// overwrites whatever state is current at that point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingSwitch {
    to: TimerMode,
    due_epoch_ms: u64,
}

/// Core timer engine.
///
/// Owns the countdown state, applies the mode-transition policy on
/// completion, and notifies listeners through two optional callbacks:
/// `on_mode_change(mode, is_running)` on every mode or activity change and
/// `on_session_complete(total)` once per completed focus session.
pub struct TimerEngine {
    durations: Durations,
    mode: TimerMode,
    /// Remaining time in seconds for the current countdown.
    remaining_secs: u64,
    is_running: bool,
    /// Focus intervals that reached zero. Monotone; breaks never count.
    completed_sessions: u32,
    settle_delay_ms: u64,
    pending_switch: Option<PendingSwitch>,
    on_mode_change: Option<ModeChangeFn>,
    on_session_complete: Option<SessionCompleteFn>,
}

impl TimerEngine {
    /// Create a new engine in `(Focus, Paused)` with a full countdown.
    pub fn new(durations: Durations) -> Self {
        Self::with_settle_delay(durations, SETTLE_DELAY_MS)
    }

    /// Create an engine with a custom settle delay. Tests pass 0 so the
    /// deferred switch is due as soon as `poll_switch()` is called.
    pub fn with_settle_delay(durations: Durations, settle_delay_ms: u64) -> Self {
        Self {
            durations,
            mode: TimerMode::Focus,
            remaining_secs: durations.secs_for(TimerMode::Focus),
            is_running: false,
            completed_sessions: 0,
            settle_delay_ms,
            pending_switch: None,
            on_mode_change: None,
            on_session_complete: None,
        }
    }

    /// Register the mode/activity change listener.
    pub fn on_mode_change(&mut self, f: impl FnMut(TimerMode, bool) + Send + 'static) {
        self.on_mode_change = Some(Box::new(f));
    }

    /// Register the session-completion listener.
    pub fn on_session_complete(&mut self, f: impl FnMut(u32) + Send + 'static) {
        self.on_session_complete = Some(Box::new(f));
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn total_secs(&self) -> u64 {
        self.durations.secs_for(self.mode)
    }

    pub fn completed_sessions(&self) -> u32 {
        self.completed_sessions
    }

    /// Target of the deferred auto-switch, if one is scheduled.
    pub fn pending_switch(&self) -> Option<TimerMode> {
        self.pending_switch.map(|p| p.to)
    }

    /// 0.0 .. 100.0 progress within the current countdown.
    pub fn progress_pct(&self) -> f64 {
        let total = self.total_secs();
        if total == 0 {
            return 0.0;
        }
        (1.0 - self.remaining_secs as f64 / total as f64) * 100.0
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            mode: self.mode,
            is_running: self.is_running,
            remaining_secs: self.remaining_secs,
            total_secs: self.total_secs(),
            completed_sessions: self.completed_sessions,
            progress_pct: self.progress_pct(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start the countdown. No-op when already running or when the
    /// countdown is depleted - a finished timer must be reset or
    /// auto-transition before it can run again.
    pub fn start(&mut self) -> Option<Event> {
        if self.is_running || self.remaining_secs == 0 {
            return None;
        }
        self.is_running = true;
        self.notify_mode_change();
        Some(Event::TimerStarted {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Stop the countdown without losing the remaining time. No-op when
    /// already paused.
    pub fn pause(&mut self) -> Option<Event> {
        if !self.is_running {
            return None;
        }
        self.is_running = false;
        self.notify_mode_change();
        Some(Event::TimerPaused {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Restore the current mode's full countdown. Keeps `mode` and the
    /// session counter.
    pub fn reset(&mut self) -> Option<Event> {
        let was_running = self.is_running;
        self.is_running = false;
        self.remaining_secs = self.durations.secs_for(self.mode);
        if was_running {
            self.notify_mode_change();
        }
        Some(Event::TimerReset {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Switch to `new_mode` with a full countdown, stopped. Callable at any
    /// time; abandoning a running countdown has no effect on the session
    /// counter.
    pub fn switch_mode(&mut self, new_mode: TimerMode) -> Option<Event> {
        self.apply_switch(new_mode, false)
    }

    /// Advance the countdown by one second. Call at a 1-second cadence
    /// while running. Returns `Some(Event::TimerCompleted)` when the
    /// countdown reaches zero; ticks on a paused or depleted engine are
    /// ignored so a stale scheduling source cannot double-complete.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.is_running || self.remaining_secs == 0 {
            return None;
        }
        self.remaining_secs -= 1;
        if self.remaining_secs > 0 {
            return None;
        }
        self.complete()
    }

    /// Apply the deferred post-completion switch once its settle delay has
    /// passed. Call on the scheduling cadence regardless of running state.
    /// The new mode starts stopped; starting it is host policy.
    pub fn poll_switch(&mut self) -> Option<Event> {
        let pending = self.pending_switch?;
        if now_ms() < pending.due_epoch_ms {
            return None;
        }
        self.pending_switch = None;
        self.apply_switch(pending.to, true)
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Completion protocol. Runs exactly once per countdown reaching zero:
    /// stop, count focus sessions, pick the next mode, schedule the switch.
    fn complete(&mut self) -> Option<Event> {
        self.is_running = false;
        self.notify_mode_change();

        let next_mode = if self.mode == TimerMode::Focus {
            self.completed_sessions += 1;
            let total = self.completed_sessions;
            if let Some(cb) = self.on_session_complete.as_mut() {
                cb(total);
            }
            if total % SESSIONS_PER_LONG_BREAK == 0 {
                TimerMode::LongBreak
            } else {
                TimerMode::ShortBreak
            }
        } else {
            TimerMode::Focus
        };

        self.pending_switch = Some(PendingSwitch {
            to: next_mode,
            due_epoch_ms: now_ms().saturating_add(self.settle_delay_ms),
        });

        Some(Event::TimerCompleted {
            mode: self.mode,
            next_mode,
            completed_sessions: self.completed_sessions,
            at: Utc::now(),
        })
    }

    fn apply_switch(&mut self, new_mode: TimerMode, auto: bool) -> Option<Event> {
        self.mode = new_mode;
        self.remaining_secs = self.durations.secs_for(new_mode);
        self.is_running = false;
        self.notify_mode_change();
        Some(Event::ModeSwitched {
            mode: new_mode,
            duration_secs: self.remaining_secs,
            auto,
            at: Utc::now(),
        })
    }

    fn notify_mode_change(&mut self) {
        let (mode, is_running) = (self.mode, self.is_running);
        if let Some(cb) = self.on_mode_change.as_mut() {
            cb(mode, is_running);
        }
    }
}

impl fmt::Debug for TimerEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerEngine")
            .field("mode", &self.mode)
            .field("remaining_secs", &self.remaining_secs)
            .field("is_running", &self.is_running)
            .field("completed_sessions", &self.completed_sessions)
            .field("pending_switch", &self.pending_switch)
            .finish_non_exhaustive()
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone, Copy)]
    enum Op {
        Start,
        Pause,
        Reset,
        Switch(TimerMode),
        Tick,
        Poll,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Start),
            Just(Op::Pause),
            Just(Op::Reset),
            Just(Op::Switch(TimerMode::Focus)),
            Just(Op::Switch(TimerMode::ShortBreak)),
            Just(Op::Switch(TimerMode::LongBreak)),
            Just(Op::Tick),
            Just(Op::Poll),
        ]
    }

    proptest! {
        #[test]
        fn invariants_hold_under_any_op_sequence(ops in prop::collection::vec(op_strategy(), 1..200)) {
            // Tiny durations keep countdowns completable within a sequence.
            let durations = Durations::from_minutes(1, 1, 1);
            let mut engine = TimerEngine::with_settle_delay(durations, 0);
            let mut sessions_before = 0;

            for op in ops {
                match op {
                    Op::Start => { engine.start(); }
                    Op::Pause => { engine.pause(); }
                    Op::Reset => { engine.reset(); }
                    Op::Switch(mode) => { engine.switch_mode(mode); }
                    Op::Tick => { engine.tick(); }
                    Op::Poll => { engine.poll_switch(); }
                }

                prop_assert!(engine.remaining_secs() <= engine.total_secs());
                prop_assert!(engine.completed_sessions() >= sessions_before);
                if engine.remaining_secs() == 0 {
                    prop_assert!(!engine.is_running());
                }
                sessions_before = engine.completed_sessions();
            }
        }
    }
}
