//! In-memory task checklist.
//!
//! A loosely-coupled widget with no shared invariants with the timer:
//! tasks are added, toggled, and removed by user intent only, and die with
//! the process.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub completed: bool,
}

/// Ordered, in-memory task list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a task. Blank titles are rejected as a no-op.
    pub fn add(&mut self, title: &str) -> Option<&Task> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }
        self.tasks.push(Task {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.to_string(),
            completed: false,
        });
        self.tasks.last()
    }

    /// Toggle completion. Returns false if the id is unknown.
    pub fn toggle(&mut self, id: &str) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.completed = !task.completed;
                true
            }
            None => false,
        }
    }

    /// Remove a task. Returns false if the id is unknown.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
