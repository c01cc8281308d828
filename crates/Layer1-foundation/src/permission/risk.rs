//! 위험도 분류 (정적 테이블)
//!
//! 알려진 민감 도구 이름을 위험 등급과 설명에 매핑한다.
//! 도구 이름 완전 일치만 사용하며 서버 ID는 보지 않는다.
//! 테이블에 없는 도구는 새 서버의 민감 도구라도 자동 분류되지 않는다.

use crate::core::ToolCall;
use serde::{Deserialize, Serialize};

/// 위험 등급
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 민감 도구 정의
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensitiveTool {
    pub name: &'static str,
    pub risk: RiskLevel,
    pub description: &'static str,
}

const fn sensitive(
    name: &'static str,
    risk: RiskLevel,
    description: &'static str,
) -> SensitiveTool {
    SensitiveTool {
        name,
        risk,
        description,
    }
}

/// 확인이 필요한 도구 목록 (허용 목록 방식)
pub const SENSITIVE_TOOLS: &[SensitiveTool] = &[
    // Gmail
    sensitive("gmail_send", RiskLevel::High, "Send email"),
    sensitive("gmail_delete", RiskLevel::High, "Delete email"),
    // Calendar
    sensitive("event_delete", RiskLevel::Medium, "Delete calendar event"),
    sensitive("event_create", RiskLevel::Low, "Create calendar event"),
    // Drive
    sensitive("drive_delete", RiskLevel::High, "Delete file"),
    sensitive("drive_share", RiskLevel::Medium, "Share file"),
    sensitive("drive_upload", RiskLevel::Low, "Upload file"),
    // Docs/Sheets
    sensitive("docs_update", RiskLevel::Medium, "Update document"),
    sensitive("sheets_update", RiskLevel::Medium, "Update spreadsheet"),
];

/// 도구 이름으로 민감 도구 정의 조회
pub fn lookup(tool_name: &str) -> Option<&'static SensitiveTool> {
    SENSITIVE_TOOLS.iter().find(|t| t.name == tool_name)
}

/// 대기 중인 작업 하나에 대한 위험 평가 (저장하지 않음)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmationGate {
    /// 승인 필요 여부
    pub required: bool,

    /// 사용자에게 보여줄 메시지 (`<설명>: <인자 JSON>`)
    pub message: String,

    /// 평가 대상 작업
    pub action: ToolCall,

    /// 위험 등급
    pub risk: RiskLevel,
}

/// 작업을 분류해 확인 게이트 생성
pub fn classify(action: &ToolCall) -> ConfirmationGate {
    match lookup(&action.tool_name) {
        Some(tool) => {
            let args = serde_json::to_string_pretty(&action.args).unwrap_or_default();
            ConfirmationGate {
                required: true,
                message: format!("{}: {}", tool.description, args),
                action: action.clone(),
                risk: tool.risk,
            }
        }
        None => ConfirmationGate {
            required: false,
            message: String::new(),
            action: action.clone(),
            risk: RiskLevel::Low,
        },
    }
}
