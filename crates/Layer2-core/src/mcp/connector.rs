//! MCP Connector - 전송 계층 계약
//!
//! 실제 stdio/SSE 연결은 호스트 쪽에서 구현한다. 풀은 이 트레이트만 본다.

use super::types::{McpResource, McpTool};
use agentflow_foundation::{McpServer, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};

/// 서버 ID 단위로 MCP 서버와 통신하는 전송 구현
#[async_trait]
pub trait McpConnector: Send + Sync {
    /// 서버에 연결하고 노출된 도구 목록을 돌려준다
    async fn connect(&self, server_id: &str, server: &McpServer) -> Result<Vec<McpTool>>;

    async fn disconnect(&self, server_id: &str) -> Result<()>;

    async fn call_tool(
        &self,
        server_id: &str,
        tool_name: &str,
        args: &Map<String, Value>,
    ) -> Result<Value>;

    async fn read_resource(&self, server_id: &str, uri: &str) -> Result<Value>;

    /// `Err`는 프로브 자체의 실패 (서버가 응답하지 않음)
    async fn health_check(&self, server_id: &str) -> Result<bool>;

    /// 연결 직후 리소스 목록 조회 (기본: 없음)
    async fn list_resources(&self, _server_id: &str) -> Result<Vec<McpResource>> {
        Ok(Vec::new())
    }
}
