//! MCP - Model Context Protocol 서버 풀
//!
//! 외부 MCP 서버의 도구를 태스크 엔진에 연결합니다.
//!
//! ## 기능
//! - 서버 등록 및 연결 상태 관리
//! - 도구/리소스 목록 집계
//! - 도구 호출 프록시 (`ToolExecutor`)
//!
//! ## 참고
//! - https://modelcontextprotocol.io/

mod connector;
mod pool;
mod types;

pub use connector::McpConnector;
pub use pool::{ServerPool, HEALTH_CHECK_FAILED};
pub use types::{
    ConnectionStatus, McpResource, McpTool, ServerInstance, ServerResources, ServerTools,
};
