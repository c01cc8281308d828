//! Core Module - 핵심 인터페이스 및 타입
//!
//! - `types.rs`: 데이터 타입 (ToolCall)
//! - `traits.rs`: 외부 협력자 인터페이스 (ToolExecutor, ConfirmationAuthority)

pub mod traits;
pub mod types;

// ============================================================================
// Types - 데이터 타입 (types.rs)
// ============================================================================

pub use types::ToolCall;

// ============================================================================
// Traits - 인터페이스 (traits.rs)
// ============================================================================

pub use traits::{ConfirmationAuthority, StaticDecision, ToolExecutor};
