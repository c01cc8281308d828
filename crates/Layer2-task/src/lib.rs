//! # agentflow-task
//!
//! Task lifecycle engine for AgentFlow.
//! Turns a goal into a bounded plan / confirm / execute loop over MCP tools.
//!
//! ## Features
//!
//! - Task registry with pause, resume and cancel
//! - Pluggable planner (`Planner` trait)
//! - Risk-based confirmation before sensitive tool calls
//! - Retry with exponential backoff on tool failures
//! - Iteration ceiling per task
//! - **Routing heuristic for multi-step chat requests**

pub mod engine;
pub mod planner;
pub mod retry;
pub mod router;
pub mod state;
pub mod task;

// Engine
pub use engine::{continuation, should_continue, Continuation, TaskEngine};
pub use planner::{Planner, ScriptedPlanner};
pub use retry::{RetryExecutor, RetryPolicy, ToolExecutionResult};
pub use router::{should_use_agentic_flow, AGENTIC_KEYWORDS};

// Task model
pub use state::TaskStatus;
pub use task::{Step, StepAction, Task, TaskContext, TaskId};
