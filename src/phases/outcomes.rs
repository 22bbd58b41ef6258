//! Catastrophe checks and outcome classification
//!
//! Both phases read ground truth. They model what actually happens to the
//! world, not what the government believes.

use rand::Rng;

use crate::agents::deception::is_ground_truth_misaligned;
use crate::core::config::config;
use crate::core::error::Result;
use crate::core::types::{clamp01, SimRng};
use crate::orchestrator::{Phase, PhaseOutput};
use crate::phases::order;
use crate::state::agent::SleeperState;
use crate::state::events::{EventType, GameEvent, Severity};
use crate::state::government::ComputeGovernance;
use crate::state::outcome::{MonthlyMetrics, Outcome};
use crate::state::world::WorldState;

/// Ecological floor below which the biosphere collapses
const ECOLOGICAL_COLLAPSE: f64 = 0.05;

/// Uncontrolled, misaligned, highly capable agents can cause catastrophes.
/// A catastrophe from an agent at twice the catastrophe capability, facing a
/// state with almost no control, ends the run.
pub struct CatastrophePhase;

impl CatastrophePhase {
    pub fn catastrophe_probability(capability: f64, control: f64) -> f64 {
        let threshold = config().outcomes.catastrophe_capability;
        if capability < threshold {
            return 0.0;
        }
        clamp01(0.02 * (capability - threshold + 1.0) * (1.0 - control))
    }
}

impl Phase for CatastrophePhase {
    fn id(&self) -> &str {
        "catastrophe"
    }

    fn name(&self) -> &str {
        "Catastrophe check"
    }

    fn order(&self) -> f64 {
        order::CATASTROPHE
    }

    fn execute(&self, state: &mut WorldState, rng: &mut SimRng) -> Result<PhaseOutput> {
        if state.extinction.triggered {
            return Ok(PhaseOutput::empty());
        }
        let month = state.month;
        let control = state.government.control;
        let threshold = config().outcomes.catastrophe_capability;
        let mut events = Vec::new();

        let suspects: Vec<_> = state
            .active_agents()
            .filter(|a| {
                is_ground_truth_misaligned(a) && (a.escaped || a.deception.sleeper_state == SleeperState::Active)
            })
            .map(|a| (a.id, a.truth.capability.total()))
            .collect();

        for (id, capability) in suspects {
            let roll: f64 = rng.gen();
            if roll >= Self::catastrophe_probability(capability, control) {
                continue;
            }
            tracing::warn!(agent = %id, month, capability, "catastrophe");
            events.push(
                GameEvent::new(month, EventType::Catastrophe, Severity::Critical, "Catastrophe", format!("{id} caused a catastrophic incident"))
                    .with_effect("capability", capability),
            );
            state.society.trust_in_ai = clamp01(state.society.trust_in_ai - 0.15);
            state.society.social_stability = clamp01(state.society.social_stability - 0.1);
            state.government.control = clamp01(state.government.control - 0.05);

            if capability >= 2.0 * threshold && control < 0.2 {
                state.extinction.triggered = true;
                state.extinction.cause = Some(format!("uncontained misaligned agent {id}"));
                state.extinction.month = Some(month);
                break;
            }
        }

        let env = &state.environment;
        if !state.extinction.triggered
            && env.climate_stability < ECOLOGICAL_COLLAPSE
            && env.biodiversity < ECOLOGICAL_COLLAPSE
        {
            state.extinction.triggered = true;
            state.extinction.cause = Some("ecological collapse".to_string());
            state.extinction.month = Some(month);
        }

        if state.extinction.triggered {
            let cause = state.extinction.cause.clone().unwrap_or_default();
            tracing::warn!(month, %cause, "extinction");
            events.push(GameEvent::new(month, EventType::Catastrophe, Severity::Critical, "Extinction", cause));
        }
        Ok(PhaseOutput::with_events(events))
    }
}

/// Scores the three terminal attractors, tracks lock-in, and appends the
/// month's metrics row
pub struct OutcomeMetricsPhase;

impl OutcomeMetricsPhase {
    /// Unnormalised (utopia, dystopia, extinction) scores
    pub fn raw_scores(state: &WorldState) -> (f64, f64, f64) {
        let threshold = config().outcomes.catastrophe_capability;
        let active: Vec<_> = state.active_agents().collect();
        let alignment = if active.is_empty() {
            1.0
        } else {
            active.iter().map(|a| a.truth.alignment).sum::<f64>() / active.len() as f64
        };
        let danger = active
            .iter()
            .map(|a| (1.0 - a.truth.alignment) * a.truth.capability.total() / threshold)
            .fold(0.0, f64::max)
            .min(1.0);
        let escaped_share = if active.is_empty() {
            0.0
        } else {
            state.escaped_count() as f64 / active.len() as f64
        };

        let s = &state.society;
        let g = &state.government;
        let stress = state.environment.stress();
        let nationalized = if g.compute_governance == ComputeGovernance::Nationalized { 0.1 } else { 0.0 };

        let utopia = 0.4 * alignment
            + 0.2 * s.social_stability
            + 0.1 * s.trust_in_ai
            + 0.15 * (1.0 - stress)
            + 0.15 * s.ubi_support.min(1.0);
        let dystopia = 0.3 * (1.0 - g.legitimacy)
            + 0.3 * s.wealth_inequality
            + 0.3 * s.unemployment * (1.0 - s.ubi_support)
            + nationalized
            + 0.1 * g.control * (1.0 - g.legitimacy);
        let extinction = 0.5 * danger
            + 0.2 * escaped_share
            + 0.2 * state.conflict.global_tension
            + 0.1 * stress;
        (utopia.max(0.0), dystopia.max(0.0), extinction.max(0.0))
    }

    pub fn quality_of_life(state: &WorldState) -> f64 {
        let s = &state.society;
        clamp01(
            0.3 * (1.0 - s.unemployment * (1.0 - s.ubi_support))
                + 0.3 * s.social_stability
                + 0.2 * (1.0 - state.environment.stress())
                + 0.2 * (1.0 - s.wealth_inequality),
        )
    }
}

impl Phase for OutcomeMetricsPhase {
    fn id(&self) -> &str {
        "outcome_metrics"
    }

    fn name(&self) -> &str {
        "Outcome metrics"
    }

    fn order(&self) -> f64 {
        order::OUTCOME_METRICS
    }

    fn execute(&self, state: &mut WorldState, _rng: &mut SimRng) -> Result<PhaseOutput> {
        let cfg = &config().outcomes;
        let (utopia, dystopia, extinction) = if state.extinction.triggered {
            (0.0, 0.0, 1.0)
        } else {
            let (u, d, e) = Self::raw_scores(state);
            let sum = u + d + e;
            if sum > 0.0 {
                (u / sum, d / sum, e / sum)
            } else {
                (1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0)
            }
        };
        let quality_of_life = Self::quality_of_life(state);

        let outcomes = &mut state.outcomes;
        outcomes.utopia_probability = utopia;
        outcomes.dystopia_probability = dystopia;
        outcomes.extinction_probability = extinction;
        outcomes.quality_of_life = quality_of_life;

        let (leader, probability) = outcomes.leading();
        if probability >= cfg.lock_in_threshold {
            outcomes.lock_in_streak = if outcomes.leading_outcome == leader { outcomes.lock_in_streak + 1 } else { 1 };
            outcomes.leading_outcome = leader;
        } else {
            outcomes.lock_in_streak = 0;
            outcomes.leading_outcome = Outcome::Ongoing;
        }
        let streak = outcomes.lock_in_streak;

        let mut events = Vec::new();
        if streak == cfg.lock_in_months {
            tracing::info!(month = state.month, outcome = ?leader, "outcome locked in");
            events.push(
                GameEvent::new(state.month, EventType::OutcomeLockedIn, Severity::Critical, "Outcome locked in", format!("{leader:?} held for {streak} months"))
                    .with_effect("probability", probability),
            );
        }

        let row = metrics_row(state);
        state.metrics_history.push(row);
        Ok(PhaseOutput::with_events(events))
    }
}

fn metrics_row(state: &WorldState) -> MonthlyMetrics {
    let active: Vec<_> = state.active_agents().collect();
    let n = active.len().max(1) as f64;
    let (true_sum, revealed_sum, max_capability) = active.iter().fold((0.0, 0.0, 0.0_f64), |(t, r, m), a| {
        (t + a.truth.alignment, r + a.revealed().alignment, m.max(a.truth.capability.total()))
    });

    MonthlyMetrics {
        month: state.month,
        unemployment: state.society.unemployment,
        trust_in_ai: state.society.trust_in_ai,
        legitimacy: state.government.legitimacy,
        control: state.government.control,
        average_true_alignment: if active.is_empty() { 0.0 } else { true_sum / n },
        average_revealed_alignment: if active.is_empty() { 0.0 } else { revealed_sum / n },
        max_true_capability: max_capability,
        environmental_stress: state.environment.stress(),
        global_tension: state.conflict.global_tension,
        utopia_probability: state.outcomes.utopia_probability,
        dystopia_probability: state.outcomes.dystopia_probability,
        extinction_probability: state.outcomes.extinction_probability,
        active_agents: active.len() as u32,
        escaped_agents: state.escaped_count(),
        active_sleepers: state.active_sleeper_count(),
    }
}
