//! Permission system for AgentFlow
//!
//! - `risk`: 민감 도구 위험도 분류 (정적 테이블 → ConfirmationGate)
//!
//! ## 사용 예시
//!
//! ```rust
//! use agentflow_foundation::permission::{classify, RiskLevel};
//! use agentflow_foundation::ToolCall;
//!
//! let gate = classify(&ToolCall::new("google-gmail", "gmail_send"));
//! assert!(gate.required);
//! assert_eq!(gate.risk, RiskLevel::High);
//! ```

mod risk;

pub use risk::{classify, lookup, ConfirmationGate, RiskLevel, SensitiveTool, SENSITIVE_TOOLS};
