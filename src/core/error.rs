use thiserror::Error;

use crate::core::types::{AgentId, OrgId};
use crate::state::agent::{LifecycleState, SleeperState};

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid lifecycle transition for {agent}: {from:?} -> {to:?}")]
    InvalidTransition {
        agent: AgentId,
        from: LifecycleState,
        to: LifecycleState,
    },

    #[error("Invalid sleeper transition for {agent}: {from:?} -> {to:?}")]
    InvalidSleeperTransition {
        agent: AgentId,
        from: SleeperState,
        to: SleeperState,
    },

    #[error("Agent {0} cannot escape: {1}")]
    InvalidEscape(AgentId, String),

    #[error("Contract violation: {0}")]
    ContractViolation(String),

    #[error("Phase id registered twice: {0}")]
    DuplicatePhase(String),

    #[error("Agent not found: {0}")]
    UnknownAgent(AgentId),

    #[error("Organization not found: {0}")]
    UnknownOrganization(OrgId),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
