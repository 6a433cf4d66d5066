//! # Cosmic Focus Core Library
//!
//! This library provides the core logic for the Cosmic Focus timer.
//! It implements a CLI-first philosophy where all operations are available
//! via a standalone CLI binary, with any GUI being a thin display layer
//! over the same core library.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A caller-driven state machine. An external
//!   scheduling source calls `tick()` once per second while the engine is
//!   running and `poll_switch()` on the same cadence for the deferred
//!   post-completion mode switch.
//! - **Widgets**: In-memory task list and daily goal tracker, fed through
//!   the engine's notification callbacks. No persistence - their state
//!   lives and dies with the process.
//! - **Storage**: TOML-based preference storage (durations, sound and UI
//!   toggles, host policies).
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`DailyTracker`]: Daily goal tracking driven by session completions
//! - [`TaskList`]: Task checklist
//! - [`Config`]: Preference management

pub mod error;
pub mod events;
pub mod progress;
pub mod storage;
pub mod tasks;
pub mod timer;

pub use error::{ConfigError, CoreError};
pub use events::Event;
pub use progress::{DailyGoal, DailyTracker};
pub use storage::{Config, Theme};
pub use tasks::{Task, TaskList};
pub use timer::{Durations, TimerEngine, TimerMode};
