//! MCP 서버 설정 레지스트리

mod server;

pub use server::{McpConfig, McpServer, McpTransport};
