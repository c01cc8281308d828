//! Error types for AgentFlow
//!
//! 모든 에러를 중앙에서 관리

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// AgentFlow 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // 설정 관련
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    // ========================================================================
    // 저장소 관련
    // ========================================================================
    #[error("Storage error: {0}")]
    Storage(String),

    // ========================================================================
    // MCP 관련
    // ========================================================================
    #[error("MCP error: {0}")]
    Mcp(String),

    #[error("Server {0} not found")]
    McpServerNotFound(String),

    #[error("Server {0} is not connected")]
    McpNotConnected(String),

    #[error("MCP connection error: {0}")]
    McpConnection(String),

    // ========================================================================
    // Tool 관련
    // ========================================================================
    #[error("Tool error: {0}")]
    Tool(String),

    #[error("Tool execution failed: {tool} - {message}")]
    ToolExecution { tool: String, message: String },

    // ========================================================================
    // Task/Planner 관련
    // ========================================================================
    #[error("Planner error: {0}")]
    Planner(String),

    #[error("Task error: {0}")]
    Task(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    // ========================================================================
    // 실행 관련
    // ========================================================================
    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Cancelled")]
    Cancelled,

    // ========================================================================
    // 일반
    // ========================================================================
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // ========================================================================
    // 외부 에러 변환
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ========================================================================
    // 기타
    // ========================================================================
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// 일시적 장애로 볼 수 있는 에러인지 확인
    ///
    /// 재시도 실행기는 이 값을 사용하지 않는다 (모든 실패를 동일하게 재시도).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Timeout(_) | Error::McpConnection(_) | Error::McpNotConnected(_)
        )
    }

    /// Tool 실행 에러 생성 헬퍼
    pub fn tool_execution(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ToolExecution {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Planner 에러 생성 헬퍼
    pub fn planner(message: impl Into<String>) -> Self {
        Error::Planner(message.into())
    }
}

// ============================================================================
// From 구현 (추가 변환)
// ============================================================================

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Internal(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Internal(s.to_string())
    }
}
