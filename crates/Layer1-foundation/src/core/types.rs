//! Core Types - 공용 타입 정의
//!
//! 모든 레이어에서 공통으로 사용하는 타입들

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Tool Call - 도구 호출 요청
// ============================================================================

/// 특정 서버의 도구를 인자와 함께 호출하는 요청
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCall {
    /// 도구를 제공하는 서버 ID
    pub server_id: String,

    /// 도구 이름
    pub tool_name: String,

    /// 호출 인자
    #[serde(default)]
    pub args: Map<String, Value>,
}

impl ToolCall {
    pub fn new(server_id: impl Into<String>, tool_name: impl Into<String>) -> Self {
        Self {
            server_id: server_id.into(),
            tool_name: tool_name.into(),
            args: Map::new(),
        }
    }

    /// 인자 하나 추가
    pub fn arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }

    /// JSON 객체로 인자 설정 (객체가 아니면 무시)
    pub fn with_args(mut self, args: Value) -> Self {
        if let Value::Object(map) = args {
            self.args = map;
        }
        self
    }

    /// 표시용 이름 (`server/tool`)
    pub fn display_name(&self) -> String {
        format!("{}/{}", self.server_id, self.tool_name)
    }
}

impl std::fmt::Display for ToolCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
