//! # agentflow-foundation
//!
//! Foundation layer for AgentFlow:
//! - Core: 외부 협력자 Trait 정의 (ToolExecutor, ConfirmationAuthority) 및 ToolCall
//! - Permission: 민감 도구 위험도 분류 (ConfirmationGate)
//! - Registry: MCP 서버 설정
//! - Storage: JsonStore (설정 파일)
//! - Config: 통합 설정 (AgentFlowConfig, EngineConfig)
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Task Engine (Layer2-task)                              │
//! │      │                                                  │
//! │      ▼                                                  │
//! │  Risk Classifier ── ConfirmationAuthority (승인/거부)    │
//! │      │                                                  │
//! │      ▼                                                  │
//! │  Retry Executor ── ToolExecutor                         │
//! │                        │                                │
//! │                        ▼                                │
//! │               ServerPool (Layer2-core)                  │
//! │               MCP Transport (외부)                       │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod permission;
pub mod registry;
pub mod storage;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Core (핵심 Trait 및 타입)
// ============================================================================
pub use self::core::{ConfirmationAuthority, StaticDecision, ToolCall, ToolExecutor};

// ============================================================================
// Config (설정)
// ============================================================================
pub use config::{AgentFlowConfig, EngineConfig, AGENTFLOW_CONFIG_FILE};

// ============================================================================
// Permission (위험도 분류)
// ============================================================================
pub use permission::{classify, ConfirmationGate, RiskLevel, SensitiveTool, SENSITIVE_TOOLS};

// ============================================================================
// Registry (레지스트리)
// ============================================================================
pub use registry::{McpConfig, McpServer, McpTransport};

// ============================================================================
// Storage (저장소)
// ============================================================================
pub use storage::JsonStore;
