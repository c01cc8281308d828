//! Retry logic with exponential backoff around a single tool invocation
//!
//! Attempt `n` (1-based) that fails is followed by a `base_delay * 2^n` sleep
//! when attempts remain: 2s, 4s, 8s, ... with the default 1s base. No jitter,
//! no cap.
//!
//! Exhausted calls always report `retryable = false`, whatever the nature of
//! the last error. Callers must not use that flag to tell transient failures
//! from permanent ones.

use agentflow_foundation::{EngineConfig, ToolCall, ToolExecutor};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Configuration for retry behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first)
    pub max_retries: u32,

    /// Base delay; the wait after failed attempt `n` is `base_delay * 2^n`
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: config.retry_base_delay(),
        }
    }

    /// A single attempt, no backoff
    pub fn no_retry() -> Self {
        Self {
            max_retries: 1,
            ..Default::default()
        }
    }

    /// Delay after the given failed attempt (1-based)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Outcome of one retry-wrapped invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolExecutionResult {
    pub success: bool,

    /// Tool output on success
    pub result: Option<Value>,

    /// Last error message on failure
    pub error: Option<String>,

    /// Always `false` (see module docs)
    pub retryable: bool,

    /// Number of invocations performed
    pub attempts: u32,
}

impl ToolExecutionResult {
    fn success(result: Value, attempts: u32) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
            retryable: false,
            attempts,
        }
    }

    fn failure(error: Option<String>, attempts: u32) -> Self {
        Self {
            success: false,
            result: None,
            error,
            retryable: false,
            attempts,
        }
    }
}

/// Wraps a [`ToolExecutor`] with bounded retries and exponential backoff
#[derive(Clone)]
pub struct RetryExecutor {
    executor: Arc<dyn ToolExecutor>,
    policy: RetryPolicy,
}

impl RetryExecutor {
    pub fn new(executor: Arc<dyn ToolExecutor>, policy: RetryPolicy) -> Self {
        Self { executor, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Execute a tool call using the configured attempt limit
    pub async fn execute_with_retry(&self, call: &ToolCall) -> ToolExecutionResult {
        self.execute_with_limit(call, self.policy.max_retries).await
    }

    /// Execute a tool call with an explicit attempt limit (`0` behaves like `1`)
    pub async fn execute_with_limit(&self, call: &ToolCall, max_retries: u32) -> ToolExecutionResult {
        let max_attempts = max_retries.max(1);
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            match self
                .executor
                .call_tool(&call.server_id, &call.tool_name, &call.args)
                .await
            {
                Ok(result) => {
                    debug!("{}: succeeded on attempt {}", call, attempt);
                    return ToolExecutionResult::success(result, attempt);
                }
                Err(e) => {
                    let message = e.to_string();
                    warn!(
                        "Tool execution failed (attempt {}/{}): {}: {}",
                        attempt, max_attempts, call, message
                    );
                    last_error = Some(message);

                    if attempt < max_attempts {
                        sleep(self.policy.delay_for_attempt(attempt)).await;
                    }
                }
            }
        }

        ToolExecutionResult::failure(last_error, max_attempts)
    }
}
