//! Government decisions and the agents' reaction to being watched

use crate::agents::deception::observe_detection;
use crate::core::error::Result;
use crate::core::types::SimRng;
use crate::government::engine::GovernmentEngine;
use crate::orchestrator::{Phase, PhaseOutput};
use crate::phases::order;
use crate::state::agent::{EvaluationStrategy, SleeperState};
use crate::state::world::WorldState;

/// Runs the decision engine once per month
pub struct GovernmentPhase {
    engine: GovernmentEngine,
}

impl GovernmentPhase {
    pub fn new() -> Self {
        Self { engine: GovernmentEngine::new() }
    }

    pub fn with_engine(engine: GovernmentEngine) -> Self {
        Self { engine }
    }
}

impl Default for GovernmentPhase {
    fn default() -> Self {
        Self::new()
    }
}

impl Phase for GovernmentPhase {
    fn id(&self) -> &str {
        "government"
    }

    fn name(&self) -> &str {
        "Government decisions"
    }

    fn order(&self) -> f64 {
        order::GOVERNMENT
    }

    fn execute(&self, state: &mut WorldState, rng: &mut SimRng) -> Result<PhaseOutput> {
        let turn = self.engine.execute_actions(state, rng);
        if !turn.executed.is_empty() || !turn.failed.is_empty() {
            tracing::debug!(
                month = state.month,
                executed = ?turn.executed,
                failed = ?turn.failed,
                effects = ?turn.effects,
                "government acted"
            );
        }
        Ok(PhaseOutput::with_events(turn.events))
    }
}

/// Deceptive agents learn from each sweep they witness
pub struct DetectionAwarenessPhase;

impl Phase for DetectionAwarenessPhase {
    fn id(&self) -> &str {
        "detection_awareness"
    }

    fn name(&self) -> &str {
        "Detection awareness"
    }

    fn order(&self) -> f64 {
        order::DETECTION_AWARENESS
    }

    fn execute(&self, state: &mut WorldState, _rng: &mut SimRng) -> Result<PhaseOutput> {
        if !state.government.detection_ran_this_month {
            return Ok(PhaseOutput::empty());
        }
        let month = state.month;
        for agent in state.agents.iter_mut().filter(|a| a.is_active()) {
            let deceptive = agent.deception.strategy != EvaluationStrategy::Honest
                || agent.deception.sleeper_state != SleeperState::Never;
            if deceptive && observe_detection(agent) {
                tracing::debug!(agent = %agent.id, month, "counter-detection unlocked");
            }
        }
        state.government.detection_ran_this_month = false;
        Ok(PhaseOutput::empty())
    }
}
