//! Observable inputs to action priority heuristics
//!
//! Everything here is built from revealed agent profiles and public
//! statistics. Ground-truth alignment and capability never reach the
//! decision engine.

use serde::{Deserialize, Serialize};

use crate::core::types::clamp01;
use crate::state::events::EventType;
use crate::state::world::WorldState;

/// Capability score treated as the top of the observable scale
const CAPABILITY_SCALE: f64 = 10.0;

/// Months of event history the government looks back over
pub const INCIDENT_WINDOW: u32 = 6;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriorityInputs {
    pub unemployment: f64,
    /// Highest revealed total capability among active agents
    pub observable_capability: f64,
    /// Mean revealed alignment among active agents (1.0 when none)
    pub average_alignment: f64,
    pub legitimacy: f64,
    pub trust: f64,
    pub control: f64,
    pub social_stability: f64,
    pub environmental_stress: f64,
    pub global_tension: f64,
    /// Escape incidents reported in the recent window
    pub recent_escapes: u32,
    /// Catastrophes reported in the recent window
    pub recent_catastrophes: u32,
}

impl PriorityInputs {
    pub fn from_state(state: &WorldState) -> Self {
        let mut max_capability: f64 = 0.0;
        let mut alignment_sum = 0.0;
        let mut count = 0usize;
        for agent in state.active_agents() {
            let observed = agent.revealed();
            max_capability = max_capability.max(observed.capability.total());
            alignment_sum += observed.alignment;
            count += 1;
        }
        let average_alignment = if count > 0 { alignment_sum / count as f64 } else { 1.0 };

        Self {
            unemployment: clamp01(state.society.unemployment),
            observable_capability: max_capability,
            average_alignment: clamp01(average_alignment),
            legitimacy: clamp01(state.government.legitimacy),
            trust: clamp01(state.society.trust_in_ai),
            control: clamp01(state.government.control),
            social_stability: clamp01(state.society.social_stability),
            environmental_stress: clamp01(state.environment.stress()),
            global_tension: clamp01(state.conflict.global_tension),
            recent_escapes: state.history.count_recent(EventType::AgentEscaped, state.month, INCIDENT_WINDOW)
                as u32,
            recent_catastrophes: state.history.count_recent(EventType::Catastrophe, state.month, INCIDENT_WINDOW)
                as u32,
        }
    }

    /// Observable capability on a [0, 1] scale
    pub fn capability_norm(&self) -> f64 {
        clamp01(self.observable_capability / CAPABILITY_SCALE)
    }

    pub fn misalignment(&self) -> f64 {
        1.0 - self.average_alignment
    }

    /// Recent escapes squashed into [0, 1)
    pub fn escape_pressure(&self) -> f64 {
        let n = self.recent_escapes as f64;
        n / (n + 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_dropping_sandbagging_raises_observable_capability() {
        let mut world = scenario::default_world(&mut ChaCha8Rng::seed_from_u64(7));
        let before = PriorityInputs::from_state(&world);

        for agent in &mut world.agents {
            agent.deception.sandbagging_level = 0.0;
        }
        let after = PriorityInputs::from_state(&world);
        assert!(after.observable_capability >= before.observable_capability);
    }

    #[test]
    fn test_empty_world_defaults() {
        let world = WorldState::new(vec![], vec![]);
        let inputs = PriorityInputs::from_state(&world);
        assert_eq!(inputs.average_alignment, 1.0);
        assert_eq!(inputs.observable_capability, 0.0);
        assert_eq!(inputs.escape_pressure(), 0.0);
    }
}
