//! User-maintained list of things to do during a break

use std::sync::Mutex;

use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakTask {
    pub id: u64,
    pub text: String,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: u64,
    tasks: Vec<BreakTask>,
    last_suggestion: Option<String>,
}

/// Break task list shared between the HTTP layer and the work-cycle collaborator
#[derive(Debug, Default)]
pub struct BreakTasks {
    inner: Mutex<Inner>,
}

impl BreakTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a task. Blank text is refused.
    pub fn add(&self, text: &str) -> Result<BreakTask, String> {
        let text = text.trim();
        if text.is_empty() {
            return Err("Break task text must not be empty".to_string());
        }

        let mut inner = self.inner.lock()
            .map_err(|e| format!("Failed to lock break tasks: {}", e))?;
        inner.next_id += 1;
        let task = BreakTask { id: inner.next_id, text: text.to_string() };
        inner.tasks.push(task.clone());
        info!("Added break task {}: {}", task.id, task.text);
        Ok(task)
    }

    /// Remove a task by id, returning whether it existed
    pub fn remove(&self, id: u64) -> Result<bool, String> {
        let mut inner = self.inner.lock()
            .map_err(|e| format!("Failed to lock break tasks: {}", e))?;
        let before = inner.tasks.len();
        inner.tasks.retain(|task| task.id != id);
        Ok(inner.tasks.len() != before)
    }

    pub fn list(&self) -> Result<Vec<BreakTask>, String> {
        self.inner.lock()
            .map(|inner| inner.tasks.clone())
            .map_err(|e| format!("Failed to lock break tasks: {}", e))
    }

    /// Pick a random task and remember it as the latest suggestion
    pub fn suggest(&self) -> Result<Option<String>, String> {
        let mut inner = self.inner.lock()
            .map_err(|e| format!("Failed to lock break tasks: {}", e))?;
        let suggestion = inner.tasks.choose(&mut rand::rng()).map(|task| task.text.clone());
        if suggestion.is_some() {
            inner.last_suggestion = suggestion.clone();
        }
        Ok(suggestion)
    }

    pub fn last_suggestion(&self) -> Option<String> {
        self.inner.lock().ok().and_then(|inner| inner.last_suggestion.clone())
    }
}
