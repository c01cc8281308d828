//! Task state machine
//!
//! ```text
//! Planning ──► Executing ◄──► Paused
//!                 │
//!                 ▼
//!     Complete | Failed | Cancelled   (terminal)
//! ```

use serde::{Deserialize, Serialize};

/// Possible states of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Created, loop not started yet
    Planning,

    /// Iteration loop is running
    Executing,

    /// Kept for compatibility; treated exactly like `Executing`
    Evaluating,

    /// Stopped at a loop-top pause check; resumable
    Paused,

    /// Goal reached (or the loop stopped without failure)
    Complete,

    /// Planner failure, unrecoverable tool failure, or iteration ceiling
    Failed,

    /// Rejected by the confirmation authority or cancelled by the operator
    Cancelled,
}

impl TaskStatus {
    /// Check if this is a terminal state (cannot transition further)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Complete | TaskStatus::Failed | TaskStatus::Cancelled
        )
    }

    /// `Evaluating` counts as running
    pub fn is_running(&self) -> bool {
        matches!(self, TaskStatus::Executing | TaskStatus::Evaluating)
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, TaskStatus::Paused)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TaskStatus::Complete)
    }

    /// Get display name for the state
    pub fn display_name(&self) -> &'static str {
        match self {
            TaskStatus::Planning => "Planning",
            TaskStatus::Executing => "Executing",
            TaskStatus::Evaluating => "Evaluating",
            TaskStatus::Paused => "Paused",
            TaskStatus::Complete => "Complete",
            TaskStatus::Failed => "Failed",
            TaskStatus::Cancelled => "Cancelled",
        }
    }

    /// Get a symbol for the state (for progress displays)
    pub fn symbol(&self) -> &'static str {
        match self {
            TaskStatus::Planning => "◯",
            TaskStatus::Executing | TaskStatus::Evaluating => "⟳",
            TaskStatus::Paused => "⏸",
            TaskStatus::Complete => "✓",
            TaskStatus::Failed => "✗",
            TaskStatus::Cancelled => "⊘",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
