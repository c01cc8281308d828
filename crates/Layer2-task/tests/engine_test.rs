//! Task engine integration tests
//!
//! `cargo test -p agentflow-task --test engine_test`

use agentflow_foundation::{
    ConfirmationAuthority, Error, Result, StaticDecision, ToolCall, ToolExecutor,
};
use agentflow_task::{
    Planner, ScriptedPlanner, Step, Task, TaskContext, TaskEngine, TaskStatus,
};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

// ============================================================================
// Fakes
// ============================================================================

/// Executor that fails the first `failures` calls and counts every call
struct CountingExecutor {
    failures: u32,
    calls: AtomicU32,
}

impl CountingExecutor {
    fn ok() -> Arc<Self> {
        Self::failing(0)
    }

    fn always_failing() -> Arc<Self> {
        Self::failing(u32::MAX)
    }

    fn failing(failures: u32) -> Arc<Self> {
        Arc::new(Self {
            failures,
            calls: AtomicU32::new(0),
        })
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ToolExecutor for CountingExecutor {
    async fn call_tool(&self, server_id: &str, tool: &str, _: &Map<String, Value>) -> Result<Value> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if n <= self.failures {
            Err(Error::tool_execution(tool, "quota exceeded"))
        } else {
            Ok(json!({ "server": server_id, "tool": tool, "call": n }))
        }
    }
}

/// Never declares the goal reached
struct EndlessPlanner;

#[async_trait]
impl Planner for EndlessPlanner {
    async fn next_step(&self, task: &Task) -> Result<Step> {
        Ok(Step::tool(
            format!("look again ({})", task.current_iteration),
            ToolCall::new("fs", "list_dir").arg("path", "."),
        ))
    }
}

/// Requests a pause (or a cancel) while planning the first step
struct InterruptingPlanner {
    engine: TaskEngine,
    cancel: bool,
}

#[async_trait]
impl Planner for InterruptingPlanner {
    async fn next_step(&self, task: &Task) -> Result<Step> {
        if self.cancel {
            self.engine.cancel_task(task.id).await;
        } else {
            self.engine.pause_task(task.id).await;
        }
        Ok(Step::tool("list files", ToolCall::new("fs", "list_dir")))
    }
}

/// Takes a while to plan so a second caller can race it
struct SlowPlanner;

#[async_trait]
impl Planner for SlowPlanner {
    async fn next_step(&self, _: &Task) -> Result<Step> {
        tokio::time::sleep(Duration::from_millis(20)).await;
        Ok(Step::tool("list", ToolCall::new("fs", "list_dir")))
    }
}

fn engine_with(executor: Arc<CountingExecutor>) -> TaskEngine {
    TaskEngine::with_defaults(executor)
}

fn send_mail_step() -> Step {
    Step::tool(
        "mail the report",
        ToolCall::new("gmail", "gmail_send")
            .arg("to", "team@example.com")
            .arg("subject", "Weekly report"),
    )
}

// ============================================================================
// Completion
// ============================================================================

#[tokio::test]
async fn test_done_on_first_iteration() {
    let executor = CountingExecutor::ok();
    let engine = engine_with(executor.clone());
    let task = engine.create_task("Say hello", TaskContext::new()).await;

    let planner =
        ScriptedPlanner::new([Step::done("nothing to do").with_observation(json!("hello"))]);
    let task = engine.execute_task(task.id, &planner, None).await.unwrap();

    assert_eq!(task.status, TaskStatus::Complete);
    assert_eq!(task.result, Some(json!("hello")));
    assert_eq!(task.current_iteration, 1);
    assert_eq!(task.steps.len(), 1);
    assert_eq!(task.steps[0].iteration, 1);
    assert!(task.completed_at.is_some());
    assert_eq!(executor.calls(), 0);
}

#[tokio::test]
async fn test_tool_steps_then_done() {
    let executor = CountingExecutor::ok();
    let engine = engine_with(executor.clone());
    let task = engine.create_task("Read notes", TaskContext::new()).await;

    let planner = ScriptedPlanner::new([
        Step::tool("list", ToolCall::new("fs", "list_dir")),
        Step::tool("read", ToolCall::new("fs", "read_file").arg("path", "notes.md")),
        Step::done("read everything"),
    ]);
    let task = engine.execute_task(task.id, &planner, None).await.unwrap();

    assert_eq!(task.status, TaskStatus::Complete);
    assert_eq!(task.steps.len(), 3);
    assert_eq!(task.current_iteration, 3);
    assert_eq!(executor.calls(), 2);

    let second = &task.steps[1];
    assert_eq!(second.iteration, 2);
    assert_eq!(second.evaluation, "Tool read_file executed successfully");
    assert_eq!(second.observation.as_ref().unwrap()["tool"], json!("read_file"));
    assert!(second.error.is_none());
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_always_failing_executor_fails_after_one_iteration() {
    let executor = CountingExecutor::always_failing();
    let engine = engine_with(executor.clone());
    let task = engine.create_task("List files", TaskContext::new()).await;

    let start = Instant::now();
    let task = engine.execute_task(task.id, &EndlessPlanner, None).await.unwrap();

    assert_eq!(task.status, TaskStatus::Failed);
    assert_eq!(task.steps.len(), 1);
    assert_eq!(executor.calls(), 3);
    // 2s + 4s of backoff on the paused clock
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(6) && elapsed < Duration::from_millis(6_010));

    let error = task.error.unwrap();
    assert!(error.contains("quota exceeded"));
    assert_ne!(error, "Maximum iterations reached");

    let step = &task.steps[0];
    assert_eq!(step.error.as_deref(), Some(error.as_str()));
    assert_eq!(step.evaluation, format!("Tool list_dir failed: {}", error));
    assert!(step.observation.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_transient_failure_is_retried_within_the_step() {
    let executor = CountingExecutor::failing(2);
    let engine = engine_with(executor.clone());
    let task = engine.create_task("List files", TaskContext::new()).await;

    let planner = ScriptedPlanner::new([
        Step::tool("list", ToolCall::new("fs", "list_dir")),
        Step::done("listed"),
    ]);
    let task = engine.execute_task(task.id, &planner, None).await.unwrap();

    assert_eq!(task.status, TaskStatus::Complete);
    assert_eq!(executor.calls(), 3);
    assert_eq!(task.steps[0].observation.as_ref().unwrap()["call"], json!(3));
}

#[tokio::test]
async fn test_ceiling_fails_task() {
    let engine = engine_with(CountingExecutor::ok());
    let task = engine
        .create_task_with_limit("Keep looking", TaskContext::new(), 3)
        .await
        .unwrap();

    let task = engine.execute_task(task.id, &EndlessPlanner, None).await.unwrap();

    assert_eq!(task.status, TaskStatus::Failed);
    assert_eq!(task.error.as_deref(), Some("Maximum iterations reached"));
    assert_eq!(task.current_iteration, 3);
    assert_eq!(task.steps.len(), 3);
    assert!(task.completed_at.is_some());
}

#[tokio::test]
async fn test_planner_failure_fails_task() {
    let engine = engine_with(CountingExecutor::ok());
    let task = engine.create_task("Plan nothing", TaskContext::new()).await;

    let planner = ScriptedPlanner::new([Step::tool("list", ToolCall::new("fs", "list_dir"))]);
    let task = engine.execute_task(task.id, &planner, None).await.unwrap();

    assert_eq!(task.status, TaskStatus::Failed);
    assert_eq!(
        task.error.as_deref(),
        Some("script exhausted at iteration 2")
    );
    assert_eq!(task.steps.len(), 1);
    assert_eq!(task.current_iteration, 1);
}

#[tokio::test]
async fn test_unknown_task_is_an_error() {
    let engine = engine_with(CountingExecutor::ok());
    let other = engine.create_task("elsewhere", TaskContext::new()).await;
    engine.cancel_task(other.id).await;
    engine.clear_completed_tasks().await;

    let result = engine.execute_task(other.id, &EndlessPlanner, None).await;
    assert!(matches!(result, Err(Error::TaskNotFound(_))));
}

// ============================================================================
// Confirmation
// ============================================================================

#[tokio::test]
async fn test_rejected_action_cancels_task() {
    let executor = CountingExecutor::ok();
    let engine = engine_with(executor.clone());
    let task = engine.create_task("Mail the report", TaskContext::new()).await;

    let reject: &dyn ConfirmationAuthority = &StaticDecision::RejectAll;
    let planner = ScriptedPlanner::new([send_mail_step()]);
    let task = engine
        .execute_task(task.id, &planner, Some(reject))
        .await
        .unwrap();

    assert_eq!(task.status, TaskStatus::Cancelled);
    assert_eq!(task.error.as_deref(), Some("User cancelled operation"));
    assert_eq!(executor.calls(), 0);

    let step = &task.steps[0];
    assert_eq!(step.error.as_deref(), Some("User cancelled"));
    assert_eq!(step.evaluation, "User cancelled the operation");
    assert!(step.observation.is_none());
}

#[tokio::test]
async fn test_approved_and_ungated_actions_run() {
    let executor = CountingExecutor::ok();
    let engine = engine_with(executor.clone());

    // Approved sensitive action
    let approve: &dyn ConfirmationAuthority = &StaticDecision::ApproveAll;
    let task = engine.create_task("Mail the report", TaskContext::new()).await;
    let planner = ScriptedPlanner::new([send_mail_step(), Step::done("sent")]);
    let task = engine
        .execute_task(task.id, &planner, Some(approve))
        .await
        .unwrap();
    assert_eq!(task.status, TaskStatus::Complete);
    assert_eq!(executor.calls(), 1);

    // No authority: sensitive actions are approved
    let task = engine.create_task("Mail the report", TaskContext::new()).await;
    let planner = ScriptedPlanner::new([send_mail_step(), Step::done("sent")]);
    let task = engine.execute_task(task.id, &planner, None).await.unwrap();
    assert_eq!(task.status, TaskStatus::Complete);
    assert_eq!(executor.calls(), 2);

    // Unlisted tools never reach the authority
    let reject: &dyn ConfirmationAuthority = &StaticDecision::RejectAll;
    let task = engine.create_task("Read", TaskContext::new()).await;
    let planner = ScriptedPlanner::new([
        Step::tool("read", ToolCall::new("fs", "read_file")),
        Step::done("read"),
    ]);
    let task = engine
        .execute_task(task.id, &planner, Some(reject))
        .await
        .unwrap();
    assert_eq!(task.status, TaskStatus::Complete);
    assert_eq!(executor.calls(), 3);
}

// ============================================================================
// Lifecycle controls
// ============================================================================

#[tokio::test]
async fn test_pause_then_resume() {
    let engine = engine_with(CountingExecutor::ok());
    let task = engine.create_task("List and finish", TaskContext::new()).await;

    let pausing = InterruptingPlanner {
        engine: engine.clone(),
        cancel: false,
    };
    let paused = engine.execute_task(task.id, &pausing, None).await.unwrap();

    assert_eq!(paused.status, TaskStatus::Paused);
    assert_eq!(paused.steps.len(), 1);
    assert_eq!(paused.current_iteration, 1);
    assert!(paused.completed_at.is_none());
    assert!(engine.is_paused(task.id).await);

    assert!(engine.resume_task(task.id).await);
    assert!(!engine.is_paused(task.id).await);
    assert_eq!(
        engine.get_task(task.id).await.unwrap().status,
        TaskStatus::Executing
    );

    let planner = ScriptedPlanner::new([Step::done("finished")]);
    let task = engine.execute_task(task.id, &planner, None).await.unwrap();
    assert_eq!(task.status, TaskStatus::Complete);
    assert_eq!(task.steps.len(), 2);
    assert_eq!(task.steps[1].iteration, 2);
}

#[tokio::test]
async fn test_pause_requires_executing_status() {
    let engine = engine_with(CountingExecutor::ok());
    let task = engine.create_task("idle", TaskContext::new()).await;

    assert!(!engine.pause_task(task.id).await);
    assert!(!engine.is_paused(task.id).await);
    assert_eq!(
        engine.get_task(task.id).await.unwrap().status,
        TaskStatus::Planning
    );

    let missing = Task::new("never registered", TaskContext::new(), 1);
    assert!(!engine.pause_task(missing.id).await);
    assert!(!engine.resume_task(missing.id).await);
    assert!(!engine.cancel_task(missing.id).await);
}

#[tokio::test]
async fn test_cancel_during_iteration_keeps_cancelled_status() {
    let executor = CountingExecutor::ok();
    let engine = engine_with(executor.clone());
    let task = engine.create_task("List files", TaskContext::new()).await;

    let cancelling = InterruptingPlanner {
        engine: engine.clone(),
        cancel: true,
    };
    let task = engine.execute_task(task.id, &cancelling, None).await.unwrap();

    assert_eq!(task.status, TaskStatus::Cancelled);
    assert_eq!(task.error.as_deref(), Some("Cancelled by user"));
    assert_eq!(task.steps.len(), 1);
    assert_eq!(executor.calls(), 1);
}

#[tokio::test]
async fn test_cancel_overwrites_terminal_status() {
    let engine = engine_with(CountingExecutor::ok());
    let task = engine.create_task("Say hello", TaskContext::new()).await;
    let planner = ScriptedPlanner::new([Step::done("done")]);
    let completed = engine.execute_task(task.id, &planner, None).await.unwrap();
    let completed_at = completed.completed_at.unwrap();

    tokio::time::sleep(Duration::from_millis(5)).await;
    assert!(engine.cancel_task(task.id).await);

    let task = engine.get_task(task.id).await.unwrap();
    assert_eq!(task.status, TaskStatus::Cancelled);
    assert_eq!(task.error.as_deref(), Some("Cancelled by user"));
    assert!(task.completed_at.unwrap() > completed_at);
}

#[tokio::test]
async fn test_terminal_task_is_not_rerun() {
    let executor = CountingExecutor::ok();
    let engine = engine_with(executor.clone());
    let task = engine.create_task("Say hello", TaskContext::new()).await;
    engine.cancel_task(task.id).await;

    let task = engine.execute_task(task.id, &EndlessPlanner, None).await.unwrap();
    assert_eq!(task.status, TaskStatus::Cancelled);
    assert!(task.steps.is_empty());
    assert_eq!(executor.calls(), 0);
}

#[tokio::test]
async fn test_clear_completed_tasks_is_idempotent() {
    let engine = engine_with(CountingExecutor::ok());

    let done = engine.create_task("done", TaskContext::new()).await;
    let planner = ScriptedPlanner::new([Step::done("ok")]);
    engine.execute_task(done.id, &planner, None).await.unwrap();

    let cancelled = engine.create_task("cancelled", TaskContext::new()).await;
    engine.cancel_task(cancelled.id).await;

    let pending = engine.create_task("pending", TaskContext::new()).await;

    assert_eq!(engine.clear_completed_tasks().await, 2);
    assert_eq!(engine.clear_completed_tasks().await, 0);

    let remaining = engine.all_tasks().await;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, pending.id);
}

#[tokio::test]
async fn test_zero_iteration_limit_is_rejected() {
    let engine = engine_with(CountingExecutor::ok());
    let result = engine
        .create_task_with_limit("nothing", TaskContext::new(), 0)
        .await;
    assert!(matches!(result, Err(Error::InvalidInput(_))));
    assert!(engine.all_tasks().await.is_empty());
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_same_task_runs_one_loop_at_a_time() {
    let executor = CountingExecutor::ok();
    let engine = engine_with(executor.clone());
    let task = engine
        .create_task_with_limit("List once", TaskContext::new(), 1)
        .await
        .unwrap();

    let (first, second) = tokio::join!(
        engine.execute_task(task.id, &SlowPlanner, None),
        engine.execute_task(task.id, &SlowPlanner, None),
    );
    let (first, second) = (first.unwrap(), second.unwrap());

    // The second call sees the first loop in progress and runs nothing
    assert_eq!(second.status, TaskStatus::Executing);
    assert!(second.steps.is_empty());

    assert_eq!(first.status, TaskStatus::Failed);
    assert_eq!(first.error.as_deref(), Some("Maximum iterations reached"));

    let task = engine.get_task(task.id).await.unwrap();
    assert_eq!(task.current_iteration, 1);
    assert_eq!(task.steps.len(), 1);
    assert_eq!(executor.calls(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_tasks_stay_isolated() {
    let executor = CountingExecutor::ok();
    let engine = engine_with(executor.clone());

    let mut handles = Vec::new();
    for i in 0..8u32 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            let task = engine
                .create_task(format!("task {}", i), TaskContext::new())
                .await;
            let mut script: Vec<Step> = (0..i % 3)
                .map(|_| Step::tool("list", ToolCall::new("fs", "list_dir")))
                .collect();
            script.push(Step::done(format!("finished {}", i)).with_observation(json!(i)));
            let planner = ScriptedPlanner::new(script);
            engine.execute_task(task.id, &planner, None).await
        }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        let task = handle.await.unwrap().unwrap();
        let i = i as u32;
        assert_eq!(task.status, TaskStatus::Complete);
        assert_eq!(task.goal, format!("task {}", i));
        assert_eq!(task.result, Some(json!(i)));
        assert_eq!(task.steps.len() as u32, i % 3 + 1);
        assert_eq!(task.steps.len() as u32, task.current_iteration);
    }

    assert_eq!(executor.calls(), (0..8u32).map(|i| i % 3).sum::<u32>());
    assert_eq!(engine.all_tasks().await.len(), 8);
}
