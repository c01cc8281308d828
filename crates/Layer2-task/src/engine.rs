//! Task Engine - drives tasks through the plan / confirm / execute loop
//!
//! One iteration:
//!
//! ```text
//! pause check ─► planner ─► DONE? ─► classify ─► confirm? ─► retry executor ─► commit
//! ```
//!
//! The registry lock is taken only to read a snapshot before an iteration and
//! to commit its outcome afterwards. Planner, confirmer and tool calls run
//! with no lock held, so `pause_task` / `cancel_task` from another tokio task
//! take effect at the next commit or loop-top check.

use crate::planner::Planner;
use crate::retry::{RetryExecutor, RetryPolicy};
use crate::state::TaskStatus;
use crate::task::{Step, StepAction, Task, TaskContext, TaskId};
use agentflow_foundation::{
    classify, ConfirmationAuthority, EngineConfig, Error, Result, ToolExecutor,
};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

const REJECTED_TASK_ERROR: &str = "User cancelled operation";
const REJECTED_STEP_EVALUATION: &str = "User cancelled the operation";
const REJECTED_STEP_ERROR: &str = "User cancelled";
const CANCELLED_BY_USER: &str = "Cancelled by user";
const MAX_ITERATIONS_REACHED: &str = "Maximum iterations reached";

/// Why the loop keeps going or stops after an iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    /// Run another iteration
    Continue,
    /// Status is already Complete / Failed / Cancelled
    Terminal(TaskStatus),
    /// `current_iteration >= max_iterations`
    CeilingReached,
    /// The last step declared the goal reached
    GoalReached,
    /// The last step failed and its evaluation does not mention a retry
    StepFailed,
}

impl Continuation {
    pub fn should_continue(&self) -> bool {
        matches!(self, Continuation::Continue)
    }
}

/// Continuation decision for a task, with the reason it stops
pub fn continuation(task: &Task) -> Continuation {
    if task.status.is_terminal() {
        return Continuation::Terminal(task.status);
    }
    if task.current_iteration >= task.max_iterations {
        return Continuation::CeilingReached;
    }
    let Some(last) = task.last_step() else {
        return Continuation::Continue;
    };
    if last.is_done() {
        return Continuation::GoalReached;
    }
    if last.error.is_some() && !last.evaluation.contains("retry") {
        return Continuation::StepFailed;
    }
    Continuation::Continue
}

/// `true` if the loop should run another iteration
pub fn should_continue(task: &Task) -> bool {
    continuation(task).should_continue()
}

/// Registry entry: the task, its pending pause request and whether a loop owns it
#[derive(Debug, Clone)]
struct TaskRecord {
    task: Task,
    paused: bool,
    running: bool,
}

/// What happened to an iteration's action before commit
#[derive(Debug)]
enum StepOutcome {
    GoalReached,
    Rejected,
    Succeeded,
    Failed { error: String, retryable: bool },
}

/// Cloneable handle to the task registry and its execution loop
#[derive(Clone)]
pub struct TaskEngine {
    /// All tasks by ID, with their pause marks
    tasks: Arc<RwLock<HashMap<TaskId, TaskRecord>>>,

    /// Retry-wrapped tool executor
    retry: RetryExecutor,

    /// Configuration
    config: Arc<EngineConfig>,
}

impl TaskEngine {
    /// Create an engine that runs tool calls through `executor`
    pub fn new(config: EngineConfig, executor: Arc<dyn ToolExecutor>) -> Self {
        let retry = RetryExecutor::new(executor, RetryPolicy::from_config(&config));
        Self {
            tasks: Arc::new(RwLock::new(HashMap::new())),
            retry,
            config: Arc::new(config),
        }
    }

    /// Create with default configuration
    pub fn with_defaults(executor: Arc<dyn ToolExecutor>) -> Self {
        Self::new(EngineConfig::default(), executor)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ========================================================================
    // Registry
    // ========================================================================

    /// Register a new task with the configured iteration ceiling
    pub async fn create_task(&self, goal: impl Into<String>, context: TaskContext) -> Task {
        let task = Task::new(goal, context, self.config.max_iterations.max(1));
        self.register(task).await
    }

    /// Register a new task with an explicit iteration ceiling
    pub async fn create_task_with_limit(
        &self,
        goal: impl Into<String>,
        context: TaskContext,
        max_iterations: u32,
    ) -> Result<Task> {
        if max_iterations == 0 {
            return Err(Error::InvalidInput(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        Ok(self.register(Task::new(goal, context, max_iterations)).await)
    }

    async fn register(&self, task: Task) -> Task {
        info!("Task {} created: {}", task.id, task.goal);
        let record = TaskRecord {
            task: task.clone(),
            paused: false,
            running: false,
        };
        self.tasks.write().await.insert(task.id, record);
        task
    }

    /// Snapshot of a task
    pub async fn get_task(&self, id: TaskId) -> Option<Task> {
        self.tasks.read().await.get(&id).map(|r| r.task.clone())
    }

    /// Snapshots of every registered task
    pub async fn all_tasks(&self) -> Vec<Task> {
        self.tasks
            .read()
            .await
            .values()
            .map(|r| r.task.clone())
            .collect()
    }

    /// Whether a pause request is pending for the task
    pub async fn is_paused(&self, id: TaskId) -> bool {
        self.tasks
            .read()
            .await
            .get(&id)
            .map(|r| r.paused)
            .unwrap_or(false)
    }

    // ========================================================================
    // Execution loop
    // ========================================================================

    /// Run the iteration loop until the task stops
    ///
    /// Fails only for unknown ids. Planner errors, tool failures, rejections
    /// and the iteration ceiling all end up in the returned task's status.
    ///
    /// At most one loop runs per task. A call made while another loop owns
    /// the task returns the current snapshot without running anything.
    pub async fn execute_task(
        &self,
        id: TaskId,
        planner: &dyn Planner,
        confirmer: Option<&dyn ConfirmationAuthority>,
    ) -> Result<Task> {
        {
            let mut tasks = self.tasks.write().await;
            let record = tasks
                .get_mut(&id)
                .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;

            if record.task.status.is_terminal() {
                warn!(
                    "Task {} is already {}; not executing again",
                    id, record.task.status
                );
                return Ok(record.task.clone());
            }
            if record.running {
                warn!("Task {} is already being executed", id);
                return Ok(record.task.clone());
            }

            record.running = true;
            record.task.start();
            info!("Task {} executing: {}", id, record.task.goal);
        }

        let result = self.run_loop(id, planner, confirmer).await;

        if let Some(record) = self.tasks.write().await.get_mut(&id) {
            record.running = false;
        }
        result
    }

    async fn run_loop(
        &self,
        id: TaskId,
        planner: &dyn Planner,
        confirmer: Option<&dyn ConfirmationAuthority>,
    ) -> Result<Task> {
        loop {
            // Loop-top: honour pause/cancel, then start the iteration
            let snapshot = {
                let mut tasks = self.tasks.write().await;
                let record = tasks
                    .get_mut(&id)
                    .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;

                if !record.task.status.is_running() {
                    debug!("Task {} stopped externally ({})", id, record.task.status);
                    return Ok(record.task.clone());
                }
                if record.paused {
                    record.task.pause();
                    info!(
                        "Task {} paused at iteration {}",
                        id, record.task.current_iteration
                    );
                    return Ok(record.task.clone());
                }
                if record.task.current_iteration >= record.task.max_iterations {
                    warn!(
                        "Task {} hit its ceiling of {} iterations",
                        id, record.task.max_iterations
                    );
                    record.task.fail(MAX_ITERATIONS_REACHED);
                    return Ok(record.task.clone());
                }

                record.task.current_iteration += 1;
                record.task.clone()
            };
            let iteration = snapshot.current_iteration;
            debug!(
                "Task {} iteration {}/{}",
                id, iteration, snapshot.max_iterations
            );

            let mut step = match planner.next_step(&snapshot).await {
                Ok(step) => step,
                Err(e) => return self.commit_planner_failure(id, e).await,
            };
            step.iteration = iteration;
            step.timestamp = Utc::now();

            let outcome = self.perform(&mut step, confirmer).await;

            let mut tasks = self.tasks.write().await;
            let record = tasks
                .get_mut(&id)
                .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
            let task = &mut record.task;

            // A concurrent cancel wins; the step is still recorded.
            if task.status.is_running() {
                match &outcome {
                    StepOutcome::GoalReached => {
                        info!("Task {} completed at iteration {}", id, iteration);
                        task.complete(step.observation.clone());
                    }
                    StepOutcome::Rejected => {
                        info!("Task {} cancelled: action rejected", id);
                        task.cancel(REJECTED_TASK_ERROR);
                    }
                    StepOutcome::Failed {
                        error,
                        retryable: false,
                    } => {
                        warn!("Task {} failed: {}", id, error);
                        task.fail(error.clone());
                    }
                    StepOutcome::Failed { retryable: true, .. } | StepOutcome::Succeeded => {}
                }
            }
            task.steps.push(step);

            match continuation(task) {
                Continuation::Continue => {}
                Continuation::Terminal(_) => return Ok(task.clone()),
                Continuation::CeilingReached => {
                    warn!("Task {} hit its ceiling of {} iterations", id, task.max_iterations);
                    task.fail(MAX_ITERATIONS_REACHED);
                    return Ok(task.clone());
                }
                Continuation::GoalReached | Continuation::StepFailed => {
                    let result = task.result.take();
                    task.complete(result);
                    return Ok(task.clone());
                }
            }
        }
    }

    /// Confirmation gate and tool invocation for one step (no lock held)
    async fn perform(
        &self,
        step: &mut Step,
        confirmer: Option<&dyn ConfirmationAuthority>,
    ) -> StepOutcome {
        let call = match &step.action {
            StepAction::Done => return StepOutcome::GoalReached,
            StepAction::Tool(call) => call.clone(),
        };

        let gate = classify(&call);
        if gate.required {
            // No authority supplied: approve.
            if let Some(confirmer) = confirmer {
                debug!("{} needs confirmation ({} risk)", call, gate.risk);
                if !confirmer.confirm(&gate).await {
                    step.observation = None;
                    step.evaluation = REJECTED_STEP_EVALUATION.to_string();
                    step.error = Some(REJECTED_STEP_ERROR.to_string());
                    return StepOutcome::Rejected;
                }
            }
        }

        let result = self.retry.execute_with_retry(&call).await;
        if result.success {
            step.observation = result.result;
            step.error = None;
            step.evaluation = format!("Tool {} executed successfully", call.tool_name);
            StepOutcome::Succeeded
        } else {
            let error = result
                .error
                .unwrap_or_else(|| "Unknown error".to_string());
            step.observation = None;
            step.evaluation = format!("Tool {} failed: {}", call.tool_name, error);
            step.error = Some(error.clone());
            StepOutcome::Failed {
                error,
                retryable: result.retryable,
            }
        }
    }

    async fn commit_planner_failure(&self, id: TaskId, error: Error) -> Result<Task> {
        let mut tasks = self.tasks.write().await;
        let record = tasks
            .get_mut(&id)
            .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
        let task = &mut record.task;

        // No step was produced for this iteration.
        task.current_iteration = task.current_iteration.saturating_sub(1);
        if task.status.is_running() {
            warn!("Task {} failed: {}", id, error);
            let message = match error {
                Error::Planner(message) => message,
                other => other.to_string(),
            };
            task.fail(message);
        }
        Ok(task.clone())
    }

    // ========================================================================
    // Lifecycle controls
    // ========================================================================

    /// Request a pause; honoured at the next loop-top check
    ///
    /// Only an executing task can be paused.
    pub async fn pause_task(&self, id: TaskId) -> bool {
        let mut tasks = self.tasks.write().await;
        match tasks.get_mut(&id) {
            Some(record) if record.task.status == TaskStatus::Executing => {
                record.paused = true;
                info!("Task {} pause requested", id);
                true
            }
            _ => false,
        }
    }

    /// Clear the pause mark; a paused task goes back to `Executing`
    ///
    /// This does not restart the loop. Call [`TaskEngine::execute_task`] again.
    pub async fn resume_task(&self, id: TaskId) -> bool {
        let mut tasks = self.tasks.write().await;
        let Some(record) = tasks.get_mut(&id) else {
            return false;
        };

        record.paused = false;
        if record.task.status.is_paused() {
            record.task.start();
            info!("Task {} resumed", id);
        }
        true
    }

    /// Cancel a task regardless of its current status
    ///
    /// Overwrites any earlier terminal reason.
    pub async fn cancel_task(&self, id: TaskId) -> bool {
        let mut tasks = self.tasks.write().await;
        let Some(record) = tasks.get_mut(&id) else {
            return false;
        };

        record.paused = false;
        record.task.cancel(CANCELLED_BY_USER);
        info!("Task {} cancelled", id);
        true
    }

    /// Drop every terminal task from the registry; returns how many were removed
    pub async fn clear_completed_tasks(&self) -> usize {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|_, record| !record.task.status.is_terminal());
        let removed = before - tasks.len();
        if removed > 0 {
            debug!("Cleared {} finished tasks", removed);
        }
        removed
    }
}
