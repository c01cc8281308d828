//! agentflow-core: Core Runtime for AgentFlow
//!
//! Layer2 - MCP 서버 연동 레이어
//!
//! # 주요 모듈
//!
//! - `mcp`: MCP 서버 풀 (등록, 연결, 헬스 체크, 도구 호출)
//!
//! # 사용 예시
//!
//! ```ignore
//! use agentflow_core::ServerPool;
//! use agentflow_foundation::{McpConfig, McpServer};
//!
//! let mut config = McpConfig::new();
//! config.add("gmail", McpServer::stdio("Gmail", "uvx").arg("workspace-mcp"));
//! 
//! let pool = ServerPool::new(Arc::new(connector));
//! pool.register_all(&config).await;
//! pool.connect_multiple(&["gmail", "calendar"]).await;
//!
//! // 연결된 서버의 도구 목록
//! for group in pool.all_tools().await {
//!     println!("{}: {} tools", group.server_name, group.tools.len());
//! }
//! ```

pub mod mcp;

// Re-exports: MCP
pub use mcp::{
    ConnectionStatus, McpConnector, McpResource, McpTool, ServerInstance, ServerPool,
    ServerResources, ServerTools, HEALTH_CHECK_FAILED,
};
