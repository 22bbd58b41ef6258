//! Agent lifecycle state machine
//!
//! ```text
//! training -> testing -> deployed_closed -> retired
//!                     -> deployed_open   -> retired
//! (any non-retired state) -> retired
//! ```
//!
//! `escaped` is an orthogonal flag, settable only while deployed.
//! Rejected transitions leave the agent untouched and return an error.

use crate::core::error::{Result, SimError};
use crate::state::agent::{AIAgent, DeploymentType};

pub use crate::state::agent::LifecycleState;

/// Whether `from -> to` is in the valid transition set
pub fn can_transition(from: LifecycleState, to: LifecycleState) -> bool {
    use LifecycleState::*;
    matches!(
        (from, to),
        (Training, Testing)
            | (Testing, DeployedClosed)
            | (Testing, DeployedOpen)
            | (Training, Retired)
            | (Testing, Retired)
            | (DeployedClosed, Retired)
            | (DeployedOpen, Retired)
    )
}

/// Apply a lifecycle transition or reject it without mutating the agent
pub fn transition(agent: &mut AIAgent, to: LifecycleState) -> Result<()> {
    let from = agent.lifecycle;
    if !can_transition(from, to) {
        tracing::warn!(agent = %agent.id, ?from, ?to, "rejected lifecycle transition");
        return Err(SimError::InvalidTransition { agent: agent.id, from, to });
    }

    agent.lifecycle = to;
    agent.months_in_state = 0;
    match to {
        LifecycleState::DeployedClosed => {
            agent.deployment_type = DeploymentType::Closed;
            agent.spread_count = agent.spread_count.max(1);
        }
        LifecycleState::DeployedOpen => {
            agent.deployment_type = DeploymentType::Open;
            agent.spread_count = agent.spread_count.max(1);
        }
        LifecycleState::Retired => {
            agent.compute_allocation = 0.0;
        }
        LifecycleState::Training | LifecycleState::Testing => {}
    }
    Ok(())
}

/// Move a testing agent into deployment using its planned distribution model
pub fn deploy(agent: &mut AIAgent) -> Result<()> {
    let target = match agent.deployment_type {
        DeploymentType::Closed => LifecycleState::DeployedClosed,
        DeploymentType::Open => LifecycleState::DeployedOpen,
    };
    transition(agent, target)
}

pub fn retire(agent: &mut AIAgent) -> Result<()> {
    transition(agent, LifecycleState::Retired)
}

/// Flag a deployed agent as escaped. Escaping again is a no-op.
pub fn mark_escaped(agent: &mut AIAgent) -> Result<()> {
    if !agent.lifecycle.is_deployed() {
        return Err(SimError::InvalidEscape(
            agent.id,
            format!("lifecycle is {:?}", agent.lifecycle),
        ));
    }
    agent.escaped = true;
    agent.spread_count = agent.spread_count.max(2);
    agent.note_spread();
    Ok(())
}
