//! MCP Types - MCP 관련 타입 정의

use agentflow_foundation::McpServer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// MCP 서버에서 제공하는 도구 정보
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpTool {
    /// 도구 이름
    pub name: String,

    /// 도구 설명
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// 입력 스키마 (JSON Schema)
    #[serde(rename = "inputSchema", default)]
    pub input_schema: Value,
}

impl McpTool {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            input_schema: serde_json::json!({ "type": "object" }),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// MCP 서버에서 제공하는 리소스 정보
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpResource {
    pub uri: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// 서버 연결 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Error,
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionStatus::Connected)
    }
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Error => "error",
        };
        write!(f, "{}", s)
    }
}

/// 풀에 등록된 서버 한 개의 상태
#[derive(Debug, Clone, Serialize)]
pub struct ServerInstance {
    /// 등록 시 설정
    pub config: McpServer,

    pub status: ConnectionStatus,

    /// 연결 시 받아온 도구 목록 (연결 해제 시 비움)
    pub tools: Vec<McpTool>,

    pub resources: Vec<McpResource>,

    /// 마지막 연결/헬스 체크 실패 메시지
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ServerInstance {
    pub fn new(config: McpServer) -> Self {
        Self {
            config,
            status: ConnectionStatus::Disconnected,
            tools: Vec::new(),
            resources: Vec::new(),
            error: None,
        }
    }

    /// 표시용 이름 (설정에 이름이 없으면 ID)
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        if self.config.name.is_empty() {
            id
        } else {
            &self.config.name
        }
    }
}

/// 서버별로 묶인 도구 목록
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerTools {
    pub server_id: String,
    pub server_name: String,
    pub tools: Vec<McpTool>,
}

/// 서버별로 묶인 리소스 목록
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerResources {
    pub server_id: String,
    pub server_name: String,
    pub resources: Vec<McpResource>,
}
