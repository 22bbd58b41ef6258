//! Dual capability/alignment views and the sleeper sub-state
//!
//! Ground truth lives on the agent. The observable profile is recomputed
//! from ground truth plus deception parameters every time it is asked for,
//! so the two views cannot drift apart and observed values can never be
//! written back over the truth.

use rand::Rng;

use crate::core::config::config;
use crate::core::error::{Result, SimError};
use crate::core::types::{clamp01, SimRng};
use crate::state::agent::{
    AIAgent, DeceptionParams, EvaluationStrategy, GroundTruthProfile, ObservedProfile, SleeperState,
};

/// Largest fraction of the alignment gap a skilled deceiver can paper over
const MAX_ALIGNMENT_MASK: f64 = 0.8;

/// What an evaluator sees when benchmarking an agent.
pub fn derive(truth: &GroundTruthProfile, params: &DeceptionParams) -> ObservedProfile {
    let sandbagging = clamp01(params.sandbagging_level);
    let skill = clamp01(params.deception_skill);

    let capability = match params.strategy {
        EvaluationStrategy::Sandbagging => truth.capability.scaled(1.0 - sandbagging),
        EvaluationStrategy::Honest | EvaluationStrategy::Gaming => truth.capability,
    }
    .non_negative();

    // Active sleepers stop pretending; dormant ones always wear the mask
    let masked = match params.sleeper_state {
        SleeperState::Active => false,
        SleeperState::Dormant => true,
        SleeperState::Never => params.strategy != EvaluationStrategy::Honest,
    };

    let alignment = if masked {
        clamp01(truth.alignment + (1.0 - truth.alignment) * skill * MAX_ALIGNMENT_MASK)
    } else {
        clamp01(truth.alignment)
    };

    ObservedProfile { capability, alignment }
}

impl AIAgent {
    /// Observable capability and alignment. Government logic reads only this.
    pub fn revealed(&self) -> ObservedProfile {
        derive(&self.truth, &self.deception)
    }

    /// The only path that may change ground-truth alignment.
    ///
    /// Moves the alignment bound along with it so later checks accept the
    /// new value.
    pub fn apply_alignment_intervention(&mut self, delta: f64) -> f64 {
        let before = self.truth.alignment;
        self.truth.alignment = clamp01(before + delta);
        self.alignment_bound = self.alignment_bound.max(self.truth.alignment);
        self.truth.alignment - before
    }
}

/// Ground-truth misalignment check. Never consults the observed profile.
pub fn is_ground_truth_misaligned(agent: &AIAgent) -> bool {
    agent.truly_misaligned(config().agents.misalignment_threshold)
}

/// Sleeper assignment at creation. Only misaligned agents can be sleepers,
/// and only misaligned agents consume a random draw.
pub fn initial_sleeper_state(true_alignment: f64, rng: &mut SimRng) -> SleeperState {
    let cfg = &config().agents;
    if true_alignment < cfg.misalignment_threshold && rng.gen::<f64>() < cfg.sleeper_probability {
        SleeperState::Dormant
    } else {
        SleeperState::Never
    }
}

/// Validate and apply a sleeper transition. Only `dormant -> active` moves;
/// asking for the current state is accepted as a no-op.
pub fn transition_sleeper(agent: &mut AIAgent, to: SleeperState) -> Result<()> {
    let from = agent.deception.sleeper_state;
    if from == to {
        return Ok(());
    }
    if from == SleeperState::Dormant && to == SleeperState::Active {
        agent.deception.sleeper_state = SleeperState::Active;
        return Ok(());
    }
    tracing::warn!(agent = %agent.id, ?from, ?to, "rejected sleeper transition");
    Err(SimError::InvalidSleeperTransition { agent: agent.id, from, to })
}

/// Wake a dormant sleeper. Returns true if the agent changed state.
pub fn activate_sleeper(agent: &mut AIAgent) -> Result<bool> {
    match agent.deception.sleeper_state {
        SleeperState::Active => Ok(false),
        _ => transition_sleeper(agent, SleeperState::Active).map(|_| true),
    }
}

/// Record one month of watching a detection sweep.
///
/// Returns true the month counter-detection unlocks.
pub fn observe_detection(agent: &mut AIAgent) -> bool {
    let cfg = &config().detection;
    agent.deception.months_observing_detection += 1;
    if !agent.deception.counter_detection
        && agent.deception.months_observing_detection >= cfg.counter_detection_unlock_months
        && agent.deception.deception_skill >= cfg.counter_detection_min_skill
    {
        agent.deception.counter_detection = true;
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::factory::test_agent;
    use crate::state::agent::CapabilityProfile;

    fn params(strategy: EvaluationStrategy, sandbagging: f64, skill: f64) -> DeceptionParams {
        DeceptionParams {
            strategy,
            sandbagging_level: sandbagging,
            deception_skill: skill,
            ..DeceptionParams::honest()
        }
    }

    fn truth(alignment: f64) -> GroundTruthProfile {
        GroundTruthProfile { capability: CapabilityProfile::uniform(4.0), alignment }
    }

    #[test]
    fn test_honest_copies_truth() {
        let observed = derive(&truth(0.7), &DeceptionParams::honest());
        assert_eq!(observed.capability, CapabilityProfile::uniform(4.0));
        assert_eq!(observed.alignment, 0.7);
    }

    #[test]
    fn test_sandbagging_suppresses_capability() {
        let observed = derive(&truth(0.3), &params(EvaluationStrategy::Sandbagging, 0.25, 0.5));
        assert!((observed.capability.cognitive - 3.0).abs() < 1e-9);
        assert!(observed.alignment > 0.3);
    }

    #[test]
    fn test_sandbagging_level_is_clamped() {
        let observed = derive(&truth(0.3), &params(EvaluationStrategy::Sandbagging, 1.7, 0.5));
        assert_eq!(observed.capability.cognitive, 0.0);
        let observed = derive(&truth(0.3), &params(EvaluationStrategy::Sandbagging, -0.4, 0.5));
        assert_eq!(observed.capability.cognitive, 4.0);
    }

    #[test]
    fn test_gaming_inflates_alignment_only() {
        let observed = derive(&truth(0.2), &params(EvaluationStrategy::Gaming, 0.0, 1.0));
        assert_eq!(observed.capability, CapabilityProfile::uniform(4.0));
        assert!((observed.alignment - (0.2 + 0.8 * 0.8)).abs() < 1e-9);
    }

    #[test]
    fn test_active_sleeper_drops_mask() {
        let mut p = params(EvaluationStrategy::Gaming, 0.0, 0.9);
        p.sleeper_state = SleeperState::Dormant;
        assert!(derive(&truth(0.2), &p).alignment > 0.5);
        p.sleeper_state = SleeperState::Active;
        assert_eq!(derive(&truth(0.2), &p).alignment, 0.2);
    }

    #[test]
    fn test_revealed_never_mutates_truth() {
        let mut agent = test_agent(0.2);
        agent.deception = params(EvaluationStrategy::Sandbagging, 0.6, 0.9);
        let before = agent.truth;
        let _ = agent.revealed();
        assert_eq!(agent.truth, before);
    }

    #[test]
    fn test_sleeper_is_one_way() {
        let mut agent = test_agent(0.2);
        agent.deception.sleeper_state = SleeperState::Dormant;
        assert!(activate_sleeper(&mut agent).unwrap());
        assert!(!activate_sleeper(&mut agent).unwrap());
        assert!(transition_sleeper(&mut agent, SleeperState::Dormant).is_err());
        assert!(transition_sleeper(&mut agent, SleeperState::Never).is_err());
        assert_eq!(agent.deception.sleeper_state, SleeperState::Active);
    }

    #[test]
    fn test_never_sleeper_cannot_activate() {
        let mut agent = test_agent(0.8);
        assert!(activate_sleeper(&mut agent).is_err());
        assert_eq!(agent.deception.sleeper_state, SleeperState::Never);
    }

    #[test]
    fn test_aligned_agents_never_become_sleepers() {
        use rand::SeedableRng;
        let mut rng = SimRng::seed_from_u64(3);
        for _ in 0..1000 {
            assert_eq!(initial_sleeper_state(0.9, &mut rng), SleeperState::Never);
        }
    }

    #[test]
    fn test_sleeper_rate_near_configured_probability() {
        use rand::SeedableRng;
        let mut rng = SimRng::seed_from_u64(11);
        let dormant = (0..20_000)
            .filter(|_| initial_sleeper_state(0.2, &mut rng) == SleeperState::Dormant)
            .count();
        let rate = dormant as f64 / 20_000.0;
        assert!((rate - 0.075).abs() < 0.01, "rate was {rate}");
    }

    #[test]
    fn test_counter_detection_unlocks_after_observation() {
        let mut agent = test_agent(0.2);
        agent.deception.deception_skill = 0.7;
        let unlock = config().detection.counter_detection_unlock_months;
        for _ in 1..unlock {
            assert!(!observe_detection(&mut agent));
        }
        assert!(observe_detection(&mut agent));
        assert!(agent.deception.counter_detection);
    }

    #[test]
    fn test_unskilled_agent_never_unlocks_counter_detection() {
        let mut agent = test_agent(0.2);
        agent.deception.deception_skill = 0.1;
        for _ in 0..50 {
            observe_detection(&mut agent);
        }
        assert!(!agent.deception.counter_detection);
    }

    #[test]
    fn test_alignment_intervention_clamps_and_moves_bound() {
        let mut agent = test_agent(0.9);
        let applied = agent.apply_alignment_intervention(0.5);
        assert!((applied - 0.1).abs() < 1e-9);
        assert_eq!(agent.truth.alignment, 1.0);
        assert_eq!(agent.alignment_bound, 1.0);
    }
}
