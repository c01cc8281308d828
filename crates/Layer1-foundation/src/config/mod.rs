//! Config - 통합 설정 관리
//!
//! - `agentflow.rs` - AgentFlowConfig (엔진 반복/재시도 한도)

mod agentflow;

pub use agentflow::{AgentFlowConfig, EngineConfig, AGENTFLOW_CONFIG_FILE};
