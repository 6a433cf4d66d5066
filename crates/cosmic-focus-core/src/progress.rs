//! Daily goal tracking.
//!
//! Holds the day's goal list and an overall completion percentage. One
//! goal is special: the session goal ("Complete N focus sessions") tracks
//! the timer engine's completed-session total, fed in through the engine's
//! session-completion callback. All goals, the session goal included, can
//! still be toggled by hand.

use serde::{Deserialize, Serialize};

/// Fixed id of the auto-tracked session goal.
const SESSION_GOAL_ID: &str = "daily-sessions";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyGoal {
    pub id: String,
    pub text: String,
    /// Completion target. 1 for plain checklist goals.
    pub target: u32,
    pub current: u32,
    pub completed: bool,
}

/// The day's goals, seeded with the session goal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyTracker {
    goals: Vec<DailyGoal>,
    sessions_today: u32,
}

impl DailyTracker {
    pub fn new(session_target: u32) -> Self {
        Self {
            goals: vec![DailyGoal {
                id: SESSION_GOAL_ID.to_string(),
                text: format!("Complete {session_target} focus sessions"),
                target: session_target,
                current: 0,
                completed: false,
            }],
            sessions_today: 0,
        }
    }

    /// Feed the engine-reported session total into the session goal.
    /// The total is authoritative; it overwrites any manual toggle.
    pub fn record_sessions(&mut self, total: u32) {
        self.sessions_today = total;
        if let Some(goal) = self.goals.iter_mut().find(|g| g.id == SESSION_GOAL_ID) {
            goal.current = total;
            goal.completed = total >= goal.target;
        }
    }

    /// Add a manual goal. Blank texts are rejected as a no-op.
    pub fn add_goal(&mut self, text: &str) -> Option<&DailyGoal> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        self.goals.push(DailyGoal {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.to_string(),
            target: 1,
            current: 0,
            completed: false,
        });
        self.goals.last()
    }

    /// Toggle a goal by id. Returns false if the id is unknown.
    pub fn toggle(&mut self, id: &str) -> bool {
        match self.goals.iter_mut().find(|g| g.id == id) {
            Some(goal) => {
                goal.completed = !goal.completed;
                true
            }
            None => false,
        }
    }

    pub fn goals(&self) -> &[DailyGoal] {
        &self.goals
    }

    pub fn sessions_today(&self) -> u32 {
        self.sessions_today
    }

    /// 0.0 .. 100.0, completed goals over all goals.
    pub fn progress_pct(&self) -> f64 {
        if self.goals.is_empty() {
            return 0.0;
        }
        let done = self.goals.iter().filter(|g| g.completed).count();
        done as f64 / self.goals.len() as f64 * 100.0
    }
}

impl Default for DailyTracker {
    fn default() -> Self {
        Self::new(4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_goal_completes_at_target() {
        let mut tracker = DailyTracker::new(4);
        for total in 1..=3 {
            tracker.record_sessions(total);
            assert!(!tracker.goals()[0].completed);
        }
        tracker.record_sessions(4);
        let goal = &tracker.goals()[0];
        assert!(goal.completed);
        assert_eq!(goal.current, 4);
        assert_eq!(tracker.sessions_today(), 4);
    }

    #[test]
    fn record_overwrites_manual_toggle() {
        let mut tracker = DailyTracker::new(4);
        let id = tracker.goals()[0].id.clone();
        assert!(tracker.toggle(&id));
        assert!(tracker.goals()[0].completed);

        tracker.record_sessions(1);
        assert!(!tracker.goals()[0].completed);
    }

    #[test]
    fn progress_counts_completed_goals() {
        let mut tracker = DailyTracker::new(4);
        tracker.add_goal("Review project notes");
        tracker.add_goal("Plan tomorrow's tasks");
        assert_eq!(tracker.progress_pct(), 0.0);

        let id = tracker.goals()[1].id.clone();
        tracker.toggle(&id);
        let pct = tracker.progress_pct();
        assert!((pct - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn blank_goal_is_rejected() {
        let mut tracker = DailyTracker::new(4);
        assert!(tracker.add_goal("  ").is_none());
        assert_eq!(tracker.goals().len(), 1);
    }
}
