//! AgentFlow Config - 통합 설정
//!
//! 글로벌(`<config_dir>/agentflow/agentflow.json`)과
//! 프로젝트(`.agentflow/agentflow.json`) 설정을 병합한다.

use crate::storage::JsonStore;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 설정 파일명
pub const AGENTFLOW_CONFIG_FILE: &str = "agentflow.json";

// ============================================================================
// AgentFlow Config (통합)
// ============================================================================

/// AgentFlow 통합 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentFlowConfig {
    /// 버전 (마이그레이션용)
    #[serde(default = "default_version")]
    pub version: u32,

    /// 태스크 엔진 설정
    #[serde(default)]
    pub engine: EngineConfig,
}

impl Default for AgentFlowConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentFlowConfig {
    pub fn new() -> Self {
        Self {
            version: default_version(),
            engine: EngineConfig::default(),
        }
    }

    // ========================================================================
    // Load / Save
    // ========================================================================

    /// 글로벌 + 프로젝트 병합 로드
    pub fn load() -> Result<Self> {
        let global = JsonStore::global().ok();
        let project = JsonStore::current_project().ok();
        Self::load_layered(global.iter().chain(project.iter()))
    }

    /// 특정 저장소에서 로드 (파일이 없으면 기본값)
    pub fn load_from(store: &JsonStore) -> Result<Self> {
        Self::load_layered(std::iter::once(store))
    }

    /// 저장소를 순서대로 덮어쓰며 로드 (뒤쪽이 우선)
    ///
    /// 파일에 적힌 필드만 덮어쓴다. 기본값과 같은 값이라도 적혀 있으면 적용된다.
    pub fn load_layered<'a, I>(stores: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a JsonStore>,
    {
        let mut config = Self::new();
        for store in stores {
            if let Some(overlay) = store.load_optional::<ConfigOverlay>(AGENTFLOW_CONFIG_FILE)? {
                config.apply(overlay);
            }
        }
        config.validate()?;
        Ok(config)
    }

    /// 특정 저장소에 저장
    pub fn save_to(&self, store: &JsonStore) -> Result<()> {
        store.save(AGENTFLOW_CONFIG_FILE, self)
    }

    /// 글로벌 설정 저장
    pub fn save_global(&self) -> Result<()> {
        self.save_to(&JsonStore::global()?)
    }

    /// 프로젝트 설정 저장
    pub fn save_project(&self) -> Result<()> {
        self.save_to(&JsonStore::current_project()?)
    }

    // ========================================================================
    // Merge / Validate
    // ========================================================================

    fn apply(&mut self, overlay: ConfigOverlay) {
        if let Some(version) = overlay.version {
            self.version = self.version.max(version);
        }
        if let Some(engine) = overlay.engine {
            self.engine.apply(engine);
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.engine.validate()
    }
}

/// 설정 파일 한 개의 내용 (적히지 않은 필드는 `None`)
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigOverlay {
    version: Option<u32>,
    engine: Option<EngineOverlay>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EngineOverlay {
    max_iterations: Option<u32>,
    max_retries: Option<u32>,
    retry_base_delay_ms: Option<u64>,
}

// ============================================================================
// Engine Config
// ============================================================================

/// 태스크 엔진 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// 태스크 기본 최대 반복 횟수
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// 도구 호출당 최대 시도 횟수
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// 백오프 기준 지연 (ms). n번째 시도 실패 후 `base * 2^n` 대기
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
        }
    }
}

impl EngineConfig {
    pub fn max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn max_retries(mut self, max: u32) -> Self {
        self.max_retries = max;
        self
    }

    pub fn retry_base_delay_ms(mut self, ms: u64) -> Self {
        self.retry_base_delay_ms = ms;
        self
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    fn apply(&mut self, overlay: EngineOverlay) {
        if let Some(max) = overlay.max_iterations {
            self.max_iterations = max;
        }
        if let Some(max) = overlay.max_retries {
            self.max_retries = max;
        }
        if let Some(ms) = overlay.retry_base_delay_ms {
            self.retry_base_delay_ms = ms;
        }
    }

    fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(Error::Config(
                "engine.maxIterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn default_version() -> u32 {
    1
}

fn default_max_iterations() -> u32 {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    1000
}
