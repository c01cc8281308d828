//! Planner contract
//!
//! The planner proposes the next thought and action for a task. It sees a
//! read-only snapshot and never mutates the task itself.

use crate::task::{Step, Task};
use agentflow_foundation::{Error, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Produces the next step (or `DONE`) for a task
#[async_trait]
pub trait Planner: Send + Sync {
    async fn next_step(&self, task: &Task) -> Result<Step>;
}

/// Replays a fixed sequence of steps, one per call
///
/// Useful for deterministic runs and tests. Fails once the script is exhausted.
#[derive(Debug, Default)]
pub struct ScriptedPlanner {
    steps: Mutex<VecDeque<Step>>,
}

impl ScriptedPlanner {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into_iter().collect()),
        }
    }

    /// Steps not yet handed out
    pub fn remaining(&self) -> usize {
        self.steps.lock().map(|s| s.len()).unwrap_or(0)
    }
}

#[async_trait]
impl Planner for ScriptedPlanner {
    async fn next_step(&self, task: &Task) -> Result<Step> {
        let next = self
            .steps
            .lock()
            .map_err(|_| Error::Internal("planner script lock poisoned".to_string()))?
            .pop_front();

        next.ok_or_else(|| {
            Error::planner(format!(
                "script exhausted at iteration {}",
                task.current_iteration
            ))
        })
    }
}
