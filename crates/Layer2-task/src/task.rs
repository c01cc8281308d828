//! Task and step definitions

use crate::state::TaskStatus;
use agentflow_foundation::ToolCall;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use uuid::Uuid;

/// Side information supplied with a goal
pub type TaskContext = HashMap<String, Value>;

/// Unique identifier for a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(pub Uuid);

impl TaskId {
    /// Generate a new random TaskId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// What a step does: call a tool, or declare the goal reached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ActionRepr", into = "ActionRepr")]
pub enum StepAction {
    Tool(ToolCall),
    Done,
}

impl StepAction {
    pub fn is_done(&self) -> bool {
        matches!(self, StepAction::Done)
    }

    pub fn tool_call(&self) -> Option<&ToolCall> {
        match self {
            StepAction::Tool(call) => Some(call),
            StepAction::Done => None,
        }
    }
}

// Wire shape: a tool call object, or the string "DONE".
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ActionRepr {
    Done(DoneMarker),
    Tool(ToolCall),
}

#[derive(Serialize, Deserialize)]
enum DoneMarker {
    #[serde(rename = "DONE")]
    Done,
}

impl From<ActionRepr> for StepAction {
    fn from(repr: ActionRepr) -> Self {
        match repr {
            ActionRepr::Done(_) => StepAction::Done,
            ActionRepr::Tool(call) => StepAction::Tool(call),
        }
    }
}

impl From<StepAction> for ActionRepr {
    fn from(action: StepAction) -> Self {
        match action {
            StepAction::Done => ActionRepr::Done(DoneMarker::Done),
            StepAction::Tool(call) => ActionRepr::Tool(call),
        }
    }
}

/// One iteration's record: thought, action, observation, evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// 1-based iteration that produced this step
    pub iteration: u32,

    /// Planner's reasoning
    pub thought: String,

    /// Tool call or `DONE`
    pub action: StepAction,

    /// Raw result of the action
    pub observation: Option<Value>,

    /// Short assessment of the outcome
    pub evaluation: String,

    /// When the step was produced
    pub timestamp: DateTime<Utc>,

    /// Present only if the action failed or was rejected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Step {
    pub fn new(thought: impl Into<String>, action: StepAction) -> Self {
        Self {
            iteration: 0,
            thought: thought.into(),
            action,
            observation: None,
            evaluation: String::new(),
            timestamp: Utc::now(),
            error: None,
        }
    }

    /// A step that calls a tool
    pub fn tool(thought: impl Into<String>, call: ToolCall) -> Self {
        Self::new(thought, StepAction::Tool(call))
    }

    /// A step that declares the goal reached
    pub fn done(thought: impl Into<String>) -> Self {
        Self::new(thought, StepAction::Done)
    }

    /// Set the observation (for `DONE` steps this becomes the task result)
    pub fn with_observation(mut self, observation: Value) -> Self {
        self.observation = Some(observation);
        self
    }

    pub fn is_done(&self) -> bool {
        self.action.is_done()
    }
}

/// One goal-directed unit of agent work
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task identifier
    pub id: TaskId,

    /// Operator-supplied objective
    pub goal: String,

    /// Side information supplied at creation
    pub context: TaskContext,

    /// One entry per completed iteration
    pub steps: Vec<Step>,

    /// Current state
    pub status: TaskStatus,

    /// Iteration ceiling, fixed at creation
    pub max_iterations: u32,

    /// Iterations started so far
    pub current_iteration: u32,

    /// Final payload, set only on completion
    pub result: Option<Value>,

    /// Failure or cancellation reason
    pub error: Option<String>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task reached a terminal state
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Create a new task in the `Planning` state
    pub fn new(goal: impl Into<String>, context: TaskContext, max_iterations: u32) -> Self {
        Self {
            id: TaskId::new(),
            goal: goal.into(),
            context,
            steps: Vec::new(),
            status: TaskStatus::Planning,
            max_iterations,
            current_iteration: 0,
            result: None,
            error: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Mark task as executing
    pub fn start(&mut self) {
        self.status = TaskStatus::Executing;
    }

    /// Mark task as paused (loop-top check)
    pub fn pause(&mut self) {
        self.status = TaskStatus::Paused;
    }

    /// Mark task as completed
    pub fn complete(&mut self, result: Option<Value>) {
        self.status = TaskStatus::Complete;
        self.result = result;
        self.completed_at = Some(Utc::now());
    }

    /// Mark task as failed
    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = TaskStatus::Failed;
        self.error = Some(error.into());
        self.completed_at = Some(Utc::now());
    }

    /// Mark task as cancelled
    pub fn cancel(&mut self, reason: impl Into<String>) {
        self.status = TaskStatus::Cancelled;
        self.error = Some(reason.into());
        self.completed_at = Some(Utc::now());
    }

    /// Most recent step, if any
    pub fn last_step(&self) -> Option<&Step> {
        self.steps.last()
    }

    /// Check if task can still make progress (not terminal)
    pub fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }

    /// Iterations left before the ceiling
    pub fn remaining_iterations(&self) -> u32 {
        self.max_iterations.saturating_sub(self.current_iteration)
    }

    /// Time from creation to completion (or now, if still active)
    pub fn duration(&self) -> Duration {
        let end = self.completed_at.unwrap_or_else(Utc::now);
        (end - self.created_at).to_std().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_task() {
        let task = Task::new("Summarize my inbox", TaskContext::new(), 10);
        assert_eq!(task.status, TaskStatus::Planning);
        assert_eq!(task.current_iteration, 0);
        assert_eq!(task.remaining_iterations(), 10);
        assert!(task.steps.is_empty());
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn test_terminal_transitions_stamp_completion() {
        let mut task = Task::new("goal", TaskContext::new(), 3);
        task.start();
        assert!(task.completed_at.is_none());

        task.fail("boom");
        assert_eq!(task.status, TaskStatus::Failed);
        assert_eq!(task.error.as_deref(), Some("boom"));
        assert!(task.completed_at.is_some());

        task.cancel("Cancelled by user");
        assert_eq!(task.status, TaskStatus::Cancelled);
        assert_eq!(task.error.as_deref(), Some("Cancelled by user"));
    }

    #[test]
    fn test_action_wire_format() {
        let done = serde_json::to_value(StepAction::Done).unwrap();
        assert_eq!(done, json!("DONE"));

        let call = StepAction::Tool(ToolCall::new("fs", "read_file").arg("path", "a.txt"));
        let value = serde_json::to_value(&call).unwrap();
        assert_eq!(value["toolName"], json!("read_file"));

        let parsed: StepAction = serde_json::from_value(json!("DONE")).unwrap();
        assert!(parsed.is_done());
        let parsed: StepAction = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, call);
    }

    #[test]
    fn test_step_builders() {
        let step = Step::done("all set").with_observation(json!({"summary": "3 unread"}));
        assert!(step.is_done());
        assert_eq!(step.observation, Some(json!({"summary": "3 unread"})));
        assert!(step.error.is_none());

        let step = Step::tool("look", ToolCall::new("fs", "list"));
        assert_eq!(step.action.tool_call().map(|c| c.tool_name.as_str()), Some("list"));
    }

    #[test]
    fn test_display_id_is_short() {
        assert_eq!(TaskId::new().to_string().len(), 8);
    }
}
