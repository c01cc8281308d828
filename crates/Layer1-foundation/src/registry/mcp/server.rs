use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::path::PathBuf;

/// MCP 서버 타입 (전송 방식)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum McpTransport {
    /// 로컬 프로세스 (stdin/stdout)
    #[default]
    Stdio,
    /// HTTP Server-Sent Events
    Sse,
}

/// 개별 MCP 서버 설정
///
/// ```json
/// {
///   "name": "Gmail",
///   "command": "uvx",
///   "args": ["workspace-mcp", "--tools", "gmail"],
///   "env": { "GOOGLE_OAUTH_CLIENT_ID": "..." }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct McpServer {
    /// 표시 이름
    pub name: String,

    /// 설명
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// 전송 타입 (기본: stdio)
    #[serde(rename = "type", default)]
    pub transport: McpTransport,

    /// 활성화 여부
    #[serde(default = "default_true")]
    pub enabled: bool,

    // === stdio 전용 ===
    /// 실행 명령어
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// 명령어 인자
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,

    /// 작업 디렉토리
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,

    // === sse 전용 ===
    /// 서버 URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    // === 공통 ===
    /// 환경 변수 (커넥터에 그대로 전달)
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub env: HashMap<String, String>,
}

impl McpServer {
    /// stdio 타입 서버 생성
    pub fn stdio(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            transport: McpTransport::Stdio,
            enabled: true,
            command: Some(command.into()),
            args: vec![],
            cwd: None,
            url: None,
            env: HashMap::new(),
        }
    }

    /// sse 타입 서버 생성
    pub fn sse(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            transport: McpTransport::Sse,
            enabled: true,
            command: None,
            args: vec![],
            cwd: None,
            url: Some(url.into()),
            env: HashMap::new(),
        }
    }

    /// 유효성 검증
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("server requires a 'name'".to_string());
        }
        match self.transport {
            McpTransport::Stdio if self.command.is_none() => {
                Err("stdio server requires 'command'".to_string())
            }
            McpTransport::Sse if self.url.is_none() => {
                Err("sse server requires 'url'".to_string())
            }
            _ => Ok(()),
        }
    }

    // === Builder methods ===

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn cwd(mut self, path: impl Into<PathBuf>) -> Self {
        self.cwd = Some(path.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// MCP 설정 (서버 ID -> 서버 설정)
///
/// 정렬된 맵을 사용해 순회 순서가 항상 같다.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct McpConfig {
    pub servers: BTreeMap<String, McpServer>,
}

impl McpConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// 서버 추가 (같은 ID면 교체)
    pub fn add(&mut self, id: impl Into<String>, server: McpServer) {
        self.servers.insert(id.into(), server);
    }

    pub fn get(&self, id: &str) -> Option<&McpServer> {
        self.servers.get(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<McpServer> {
        self.servers.remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.servers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &McpServer)> {
        self.servers.iter()
    }

    /// 활성화된 서버만
    pub fn iter_enabled(&self) -> impl Iterator<Item = (&String, &McpServer)> {
        self.servers.iter().filter(|(_, s)| s.enabled)
    }

    /// 유효성 검증 (서버별 에러 메시지 수집)
    pub fn validate(&self) -> std::result::Result<(), Vec<String>> {
        let errors: Vec<_> = self
            .servers
            .iter()
            .filter_map(|(id, s)| s.validate().err().map(|e| format!("{}: {}", id, e)))
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// 다른 설정과 병합 (other가 우선)
    pub fn merge(&mut self, other: McpConfig) {
        self.servers.extend(other.servers);
    }
}

fn default_true() -> bool {
    true
}
