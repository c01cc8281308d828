//! Registry - 외부 도구 서버 등록/관리
//!
//! - `mcp/` - MCP 서버 설정 (자체 load/save)

pub mod mcp;

// MCP
pub use mcp::{McpConfig, McpServer, McpTransport};
