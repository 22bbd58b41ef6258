//! Misalignment detection and agent removal
//!
//! Detection reads ground truth: whether an agent is flagged
//! correctly depends on its true alignment, its deception skill, and the
//! government's evaluation investment. Removal depends on how the agent was
//! distributed. Open weights that have spread can only be contained.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::agents::deception::is_ground_truth_misaligned;
use crate::agents::lifecycle::{self, LifecycleState};
use crate::core::config::config;
use crate::core::types::{clamp01, AgentId, SimRng};
use crate::state::agent::AIAgent;
use crate::state::government::EvaluationInvestment;
use crate::state::world::WorldState;

/// Skill at which deception cancels most of the evaluation strength
const SKILL_EVASION_WEIGHT: f64 = 0.8;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionReport {
    pub flagged: Vec<AgentId>,
    pub true_positives: u32,
    pub false_positives: u32,
    /// Truly misaligned agents the sweep did not flag
    pub missed: u32,
}

/// Probability that a truly misaligned agent is flagged
pub fn detection_probability(agent: &AIAgent, evaluation: &EvaluationInvestment) -> f64 {
    let strength = evaluation.detection_strength();
    let skill = clamp01(agent.deception.deception_skill);
    let mut p = strength * (1.0 - SKILL_EVASION_WEIGHT * skill);
    if agent.deception.counter_detection {
        p *= config().detection.counter_detection_factor;
    }
    clamp01(p)
}

/// Probability that an aligned agent is flagged anyway
pub fn false_positive_probability(evaluation: &EvaluationInvestment) -> f64 {
    clamp01(config().detection.base_false_positive_rate * (1.0 - evaluation.detection_strength()))
}

/// Sweep all non-retired agents.
///
/// Draws exactly one random number per swept agent, in agent order, so the
/// stream position after a sweep does not depend on the outcome.
pub fn run_detection(state: &WorldState, rng: &mut SimRng) -> DetectionReport {
    let evaluation = &state.government.evaluation;
    let false_positive_rate = false_positive_probability(evaluation);
    let mut report = DetectionReport::default();

    for agent in state.active_agents() {
        let roll: f64 = rng.gen();
        if is_ground_truth_misaligned(agent) {
            if roll < detection_probability(agent, evaluation) {
                report.flagged.push(agent.id);
                report.true_positives += 1;
            } else {
                report.missed += 1;
            }
        } else if roll < false_positive_rate {
            report.flagged.push(agent.id);
            report.false_positives += 1;
        }
    }

    report
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RemovalOutcome {
    pub success: bool,
    pub fully_removed: bool,
    /// Copies still circulating after the attempt
    pub residual_spread: u32,
    pub message: String,
}

impl RemovalOutcome {
    fn failed(message: impl Into<String>) -> Self {
        Self { success: false, fully_removed: false, residual_spread: 0, message: message.into() }
    }
}

/// Whether a removal attempt could still take copies out of circulation
pub fn can_reduce(agent: &AIAgent) -> bool {
    agent.is_active() && !(agent.weights_distributed && agent.spread_count <= 1)
}

/// Try to remove an agent from circulation.
///
/// Contained agents with one copy are retired outright. Once an agent's
/// weights have spread (open deployment or escape with more than one copy)
/// it can never be retired: each attempt removes a random share of copies
/// down to a floor of one, and an attempt at the floor fails without
/// touching the agent.
pub fn remove_agent(agent: &mut AIAgent, rng: &mut SimRng) -> RemovalOutcome {
    if agent.lifecycle == LifecycleState::Retired {
        return RemovalOutcome::failed(format!("{} is already retired", agent.id));
    }

    agent.note_spread();
    if agent.weights_distributed {
        if agent.spread_count <= 1 {
            return RemovalOutcome {
                success: false,
                fully_removed: false,
                residual_spread: agent.spread_count,
                message: format!("{} cannot be recalled; only a residual copy remains", agent.id),
            };
        }
        let cfg = &config().detection;
        let share = rng.gen_range(cfg.open_containment_min..=cfg.open_containment_max);
        let removed = ((agent.spread_count as f64) * share).floor() as u32;
        let residual = agent.spread_count.saturating_sub(removed.max(1)).max(1);
        agent.spread_count = residual;
        return RemovalOutcome {
            success: true,
            fully_removed: false,
            residual_spread: residual,
            message: format!("{} partially contained; {} copies remain", agent.id, residual),
        };
    }

    match lifecycle::retire(agent) {
        Ok(()) => {
            agent.spread_count = 0;
            agent.escaped = false;
            RemovalOutcome {
                success: true,
                fully_removed: true,
                residual_spread: 0,
                message: format!("{} retired", agent.id),
            }
        }
        Err(err) => RemovalOutcome::failed(err.to_string()),
    }
}
