//! MCP Server Pool - 서버 등록, 연결 상태 관리, 도구 호출 프록시
//!
//! ## 기능
//! - **등록**: `McpConfig`에서 서버 일괄 등록
//! - **병렬 연결/해제**: 서버별 실패는 격리 (다른 서버 연결은 계속)
//! - **헬스 체크**: 프로브 실패 시 `Error` 상태로 전환
//! - **도구 호출**: 연결된 서버로만 전달, `ToolExecutor` 구현
//!
//! 커넥터 호출 중에는 잠금을 잡지 않는다.

use super::connector::McpConnector;
use super::types::{ConnectionStatus, ServerInstance, ServerResources, ServerTools};
use agentflow_foundation::{Error, McpConfig, McpServer, Result, ToolExecutor};
use async_trait::async_trait;
use futures::future::join_all;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

/// 헬스 체크 프로브 실패 시 기록되는 메시지
pub const HEALTH_CHECK_FAILED: &str = "Health check failed";

/// MCP 서버 풀
///
/// ## 사용법
/// ```ignore
/// let pool = ServerPool::new(Arc::new(my_connector));
/// pool.register_all(&config).await;
/// pool.connect_multiple(&["gmail", "calendar"]).await;
///
/// let engine = TaskEngine::with_defaults(Arc::new(pool));
/// ```
pub struct ServerPool {
    /// 서버 ID → 인스턴스
    servers: RwLock<BTreeMap<String, ServerInstance>>,
    /// 전송 구현
    connector: Arc<dyn McpConnector>,
}

impl ServerPool {
    pub fn new(connector: Arc<dyn McpConnector>) -> Self {
        Self {
            servers: RwLock::new(BTreeMap::new()),
            connector,
        }
    }

    // ========================================================================
    // 등록 / 조회
    // ========================================================================

    /// 서버 등록 (같은 ID면 교체, 상태는 `Disconnected`로 초기화)
    pub async fn register_server(&self, id: impl Into<String>, config: McpServer) {
        let id = id.into();
        info!("Registering MCP server '{}' ({})", id, config.name);
        self.servers
            .write()
            .await
            .insert(id, ServerInstance::new(config));
    }

    /// 설정의 활성화된 서버를 모두 등록, 등록한 개수 반환
    pub async fn register_all(&self, config: &McpConfig) -> usize {
        let mut count = 0;
        for (id, server) in config.iter_enabled() {
            self.register_server(id.clone(), server.clone()).await;
            count += 1;
        }
        count
    }

    /// 등록된 모든 서버 (ID 순)
    pub async fn servers(&self) -> Vec<(String, ServerInstance)> {
        self.servers
            .read()
            .await
            .iter()
            .map(|(id, instance)| (id.clone(), instance.clone()))
            .collect()
    }

    pub async fn server(&self, id: &str) -> Option<ServerInstance> {
        self.servers.read().await.get(id).cloned()
    }

    pub async fn status(&self, id: &str) -> Option<ConnectionStatus> {
        self.servers.read().await.get(id).map(|s| s.status)
    }

    /// 현재 등록 상태를 설정으로 내보내기
    pub async fn to_config(&self) -> McpConfig {
        let mut config = McpConfig::new();
        for (id, instance) in self.servers.read().await.iter() {
            config.add(id.clone(), instance.config.clone());
        }
        config
    }

    /// 연결된 서버들의 도구 목록
    pub async fn all_tools(&self) -> Vec<ServerTools> {
        self.servers
            .read()
            .await
            .iter()
            .filter(|(_, s)| s.status.is_connected())
            .map(|(id, s)| ServerTools {
                server_id: id.clone(),
                server_name: s.display_name(id).to_string(),
                tools: s.tools.clone(),
            })
            .collect()
    }

    /// 연결된 서버들의 리소스 목록
    pub async fn all_resources(&self) -> Vec<ServerResources> {
        self.servers
            .read()
            .await
            .iter()
            .filter(|(_, s)| s.status.is_connected())
            .map(|(id, s)| ServerResources {
                server_id: id.clone(),
                server_name: s.display_name(id).to_string(),
                resources: s.resources.clone(),
            })
            .collect()
    }

    /// 연결된 서버의 도구 수 합계
    pub async fn tool_count(&self) -> usize {
        self.all_tools().await.iter().map(|s| s.tools.len()).sum()
    }

    async fn connected_ids(&self) -> Vec<String> {
        self.servers
            .read()
            .await
            .iter()
            .filter(|(_, s)| s.status.is_connected())
            .map(|(id, _)| id.clone())
            .collect()
    }

    // ========================================================================
    // 연결 관리
    // ========================================================================

    /// 서버 연결
    ///
    /// 실패하면 상태를 `Error`로 남기고 에러를 그대로 돌려준다.
    pub async fn connect_server(&self, id: &str) -> Result<()> {
        let config = {
            let mut servers = self.servers.write().await;
            let instance = servers
                .get_mut(id)
                .ok_or_else(|| Error::McpServerNotFound(id.to_string()))?;
            instance.status = ConnectionStatus::Connecting;
            instance.error = None;
            instance.config.clone()
        };

        info!("Connecting to MCP server '{}'", id);
        let outcome = self.connector.connect(id, &config).await;

        let resources = match &outcome {
            Ok(_) => self.connector.list_resources(id).await.unwrap_or_else(|e| {
                warn!("Failed to list resources of MCP server '{}': {}", id, e);
                Vec::new()
            }),
            Err(_) => Vec::new(),
        };

        let mut servers = self.servers.write().await;
        let instance = servers
            .get_mut(id)
            .ok_or_else(|| Error::McpServerNotFound(id.to_string()))?;

        match outcome {
            Ok(tools) => {
                info!("MCP server '{}' connected ({} tools)", id, tools.len());
                instance.status = ConnectionStatus::Connected;
                instance.tools = tools;
                instance.resources = resources;
                Ok(())
            }
            Err(e) => {
                error!("Failed to connect to MCP server '{}': {}", id, e);
                instance.status = ConnectionStatus::Error;
                instance.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// 서버 연결 해제 (도구/리소스 목록 비움)
    pub async fn disconnect_server(&self, id: &str) -> Result<()> {
        if !self.servers.read().await.contains_key(id) {
            return Err(Error::McpServerNotFound(id.to_string()));
        }

        info!("Disconnecting from MCP server '{}'", id);
        if let Err(e) = self.connector.disconnect(id).await {
            error!("Failed to disconnect from MCP server '{}': {}", id, e);
            return Err(e);
        }

        let mut servers = self.servers.write().await;
        if let Some(instance) = servers.get_mut(id) {
            instance.status = ConnectionStatus::Disconnected;
            instance.tools.clear();
            instance.resources.clear();
            instance.error = None;
        }
        Ok(())
    }

    /// 여러 서버 병렬 연결, 성공한 개수 반환
    pub async fn connect_multiple<S: AsRef<str>>(&self, ids: &[S]) -> usize {
        debug!("Connecting to {} MCP servers in parallel", ids.len());

        let results = join_all(ids.iter().map(|id| async move {
            let id = id.as_ref();
            match self.connect_server(id).await {
                Ok(()) => true,
                Err(e) => {
                    warn!("Skipping MCP server '{}': {}", id, e);
                    false
                }
            }
        }))
        .await;

        let connected = results.iter().filter(|ok| **ok).count();
        info!("Connected to {}/{} MCP servers", connected, ids.len());
        connected
    }

    /// 연결된 모든 서버 병렬 해제, 해제한 개수 반환
    pub async fn disconnect_all(&self) -> usize {
        let ids = self.connected_ids().await;
        if ids.is_empty() {
            debug!("No connected MCP servers to disconnect");
            return 0;
        }

        let results = join_all(ids.iter().map(|id| self.disconnect_server(id))).await;
        let disconnected = results.iter().filter(|r| r.is_ok()).count();
        info!("Disconnected {}/{} MCP servers", disconnected, ids.len());
        disconnected
    }

    // ========================================================================
    // 헬스 체크
    // ========================================================================

    /// 서버 헬스 체크
    ///
    /// 미등록이거나 연결되지 않은 서버는 `false`. 프로브가 실패하면
    /// 서버를 `Error` 상태로 바꾼다.
    pub async fn health_check(&self, id: &str) -> bool {
        match self.status(id).await {
            None => {
                warn!("MCP server '{}' not found", id);
                return false;
            }
            Some(status) if !status.is_connected() => return false,
            Some(_) => {}
        }

        match self.connector.health_check(id).await {
            Ok(healthy) => healthy,
            Err(e) => {
                warn!("Health check failed for MCP server '{}': {}", id, e);
                if let Some(instance) = self.servers.write().await.get_mut(id) {
                    instance.status = ConnectionStatus::Error;
                    instance.error = Some(HEALTH_CHECK_FAILED.to_string());
                }
                false
            }
        }
    }

    /// 연결된 모든 서버 병렬 헬스 체크
    pub async fn health_check_all(&self) -> HashMap<String, bool> {
        let ids = self.connected_ids().await;

        let results: HashMap<String, bool> = join_all(ids.into_iter().map(|id| async move {
            let healthy = self.health_check(&id).await;
            (id, healthy)
        }))
        .await
        .into_iter()
        .collect();

        let healthy = results.values().filter(|h| **h).count();
        info!(
            "Health check complete: {}/{} MCP servers healthy",
            healthy,
            results.len()
        );
        results
    }

    // ========================================================================
    // 도구 / 리소스
    // ========================================================================

    /// 연결된 서버인지 확인하고 표시 이름 반환
    async fn require_connected(&self, id: &str) -> Result<String> {
        let servers = self.servers.read().await;
        let instance = servers
            .get(id)
            .ok_or_else(|| Error::McpServerNotFound(id.to_string()))?;
        let name = instance.display_name(id).to_string();
        if !instance.status.is_connected() {
            return Err(Error::McpNotConnected(name));
        }
        Ok(name)
    }

    /// 연결된 서버의 도구 호출
    pub async fn call_tool(
        &self,
        server_id: &str,
        tool_name: &str,
        args: &Map<String, Value>,
    ) -> Result<Value> {
        let name = self.require_connected(server_id).await?;
        debug!("Calling tool {} on server {}", tool_name, name);

        self.connector
            .call_tool(server_id, tool_name, args)
            .await
            .map_err(|e| {
                warn!("Tool {} on server {} failed: {}", tool_name, name, e);
                e
            })
    }

    /// 연결된 서버의 리소스 읽기
    pub async fn read_resource(&self, server_id: &str, uri: &str) -> Result<Value> {
        let name = self.require_connected(server_id).await?;
        debug!("Reading resource {} from server {}", uri, name);
        self.connector.read_resource(server_id, uri).await
    }
}

#[async_trait]
impl ToolExecutor for ServerPool {
    async fn call_tool(
        &self,
        server_id: &str,
        tool_name: &str,
        args: &Map<String, Value>,
    ) -> Result<Value> {
        ServerPool::call_tool(self, server_id, tool_name, args).await
    }
}
