//! Core Traits - 핵심 인터페이스 정의
//!
//! Layer2 이상에서 구현하거나 주입하는 외부 협력자 계약.
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Layer2-Task                                                │
//! │  ├── TaskEngine (반복 루프, 일시정지/재개/취소)              │
//! │  └── RetryExecutor ──────────┐                              │
//! ├──────────────────────────────┼──────────────────────────────┤
//! │  Layer2-Core                 ▼                              │
//! │  └── ServerPool ── impl ToolExecutor                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Layer1-Foundation (이 레이어)                              │
//! │  ├── ToolExecutor (도구 호출 계약)                           │
//! │  ├── ConfirmationAuthority (승인 계약)                       │
//! │  └── Risk Classifier (민감 도구 정적 테이블)                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use crate::permission::ConfirmationGate;
use crate::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};

// ============================================================================
// Tool Executor - 도구 호출
// ============================================================================

/// 서버 ID + 도구 이름 + 인자로 실제 호출을 수행하는 실행기
///
/// 모든 실패는 일시적일 수 있다고 가정하고 에러로 돌려준다.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn call_tool(
        &self,
        server_id: &str,
        tool_name: &str,
        args: &Map<String, Value>,
    ) -> Result<Value>;
}

// ============================================================================
// Confirmation Authority - 승인
// ============================================================================

/// 민감한 작업 실행 전 승인/거부를 결정하는 주체 (사람 또는 정책)
#[async_trait]
pub trait ConfirmationAuthority: Send + Sync {
    /// `true`면 승인
    async fn confirm(&self, gate: &ConfirmationGate) -> bool;
}

/// 항상 같은 결정을 내리는 정책
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaticDecision {
    ApproveAll,
    RejectAll,
}

#[async_trait]
impl ConfirmationAuthority for StaticDecision {
    async fn confirm(&self, _gate: &ConfirmationGate) -> bool {
        matches!(self, StaticDecision::ApproveAll)
    }
}
