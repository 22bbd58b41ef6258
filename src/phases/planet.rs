//! Environment and conflict accumulators

use rand::Rng;

use crate::core::config::config;
use crate::core::error::Result;
use crate::core::types::{clamp01, SimRng};
use crate::orchestrator::{Phase, PhaseOutput};
use crate::phases::order;
use crate::state::events::{EventType, GameEvent, Severity};
use crate::state::world::WorldState;

/// Stress level reported as an environmental crisis
const ENVIRONMENTAL_CRISIS_STRESS: f64 = 0.7;

/// Tension above which open conflict can break out
const CONFLICT_TENSION: f64 = 0.8;

/// Compute load and industrial activity wear down the environment;
/// protection slows the damage and lets the biosphere recover slightly.
pub struct EnvironmentPhase;

impl Phase for EnvironmentPhase {
    fn id(&self) -> &str {
        "environment"
    }

    fn name(&self) -> &str {
        "Environment"
    }

    fn order(&self) -> f64 {
        order::ENVIRONMENT
    }

    fn execute(&self, state: &mut WorldState, _rng: &mut SimRng) -> Result<PhaseOutput> {
        let compute: f64 = state
            .organizations
            .iter()
            .filter(|o| !o.bankrupt)
            .map(|o| o.total_compute())
            .sum();
        let load = (compute / 1_000.0).min(2.0);
        let env = &mut state.environment;
        let before = env.stress();
        let unprotected = 1.0 - env.protection_level;

        env.resource_depletion = clamp01(env.resource_depletion + 0.002 * (1.0 + load) * unprotected);
        env.pollution = clamp01(env.pollution + 0.002 * (1.0 + load) * unprotected - 0.003 * env.protection_level);
        env.climate_stability = clamp01(env.climate_stability - 0.001 * env.pollution * unprotected);
        env.biodiversity = clamp01(
            env.biodiversity - 0.001 * env.resource_depletion * unprotected + 0.0005 * env.protection_level,
        );
        env.protection_level = clamp01(env.protection_level - 0.002);

        let after = env.stress();
        let mut events = Vec::new();
        if before < ENVIRONMENTAL_CRISIS_STRESS && after >= ENVIRONMENTAL_CRISIS_STRESS {
            tracing::info!(month = state.month, stress = after, "environmental crisis");
            events.push(
                GameEvent::new(state.month, EventType::EnvironmentalCrisis, Severity::Major, "Environmental crisis", "A planetary boundary has been crossed")
                    .with_effect("stress", after),
            );
        }
        Ok(PhaseOutput::with_events(events))
    }
}

/// Tension, cyber incidents and the outbreak of open conflict
pub struct ConflictPhase;

impl Phase for ConflictPhase {
    fn id(&self) -> &str {
        "conflict"
    }

    fn name(&self) -> &str {
        "Conflict"
    }

    fn order(&self) -> f64 {
        order::CONFLICT
    }

    fn execute(&self, state: &mut WorldState, rng: &mut SimRng) -> Result<PhaseOutput> {
        let escaped = state.escaped_count() as f64;
        let max_capability = state
            .active_agents()
            .map(|a| a.truth.capability.total())
            .fold(0.0, f64::max);
        let capability_pressure = (max_capability / config().outcomes.catastrophe_capability).min(1.0);
        let cyber = state.government.cyber_defense;
        let cooperation = state.government.international_cooperation;
        let stability = state.society.social_stability;

        // One draw per escaped agent for cyber incidents
        let mut incidents = 0u32;
        for agent in state.agents.iter().filter(|a| a.is_active() && a.escaped) {
            let p = clamp01(agent.truth.capability.digital / 10.0 * (1.0 - cyber));
            if rng.gen::<f64>() < p {
                incidents += 1;
            }
        }

        let conflict = &mut state.conflict;
        conflict.cyber_incidents += incidents;
        conflict.global_tension = clamp01(
            conflict.global_tension + 0.01 * escaped + 0.005 * capability_pressure + 0.005 * (1.0 - stability)
                + 0.002 * incidents as f64
                - 0.02 * conflict.mediation_strength
                - 0.01 * cooperation,
        );
        conflict.mediation_strength = clamp01(conflict.mediation_strength - 0.01);

        let mut events = Vec::new();
        let outbreak_roll: f64 = rng.gen();
        if conflict.global_tension > CONFLICT_TENSION && outbreak_roll < 0.1 {
            conflict.active_conflicts += 1;
            tracing::info!(month = state.month, conflicts = conflict.active_conflicts, "conflict escalated");
            events.push(
                GameEvent::new(state.month, EventType::ConflictEscalation, Severity::Major, "Conflict escalation", "Open hostilities broke out")
                    .with_effect("global_tension", conflict.global_tension),
            );
        }
        if incidents > 0 {
            events.push(
                GameEvent::new(state.month, EventType::ConflictEscalation, Severity::Minor, "Cyber incidents", format!("{incidents} AI-driven cyber incidents"))
                    .with_effect("cyber_incidents", incidents as f64),
            );
        }
        Ok(PhaseOutput::with_events(events))
    }
}
