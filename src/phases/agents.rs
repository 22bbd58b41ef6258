//! Agent-facing phases: growth, the training pipeline, sleeper wake-up and escape

use rand::Rng;

use crate::agents::deception::{activate_sleeper, is_ground_truth_misaligned};
use crate::agents::factory::create_agent;
use crate::agents::lifecycle::{self, LifecycleState};
use crate::core::config::config;
use crate::core::error::Result;
use crate::core::types::{AgentId, SimRng};
use crate::orchestrator::{Phase, PhaseOutput};
use crate::phases::order;
use crate::state::agent::{AlignmentCohort, DeploymentType, SleeperState};
use crate::state::events::{EventType, GameEvent, Severity};
use crate::state::government::ComputeGovernance;
use crate::state::world::WorldState;

/// Upper bound on copies tracked per agent
const MAX_SPREAD: u32 = 10_000;

/// Compounding capability growth for every active agent.
///
/// Growth scales with compute share and is dragged down by regulation and
/// compute governance. Training runs stop growing while training is paused.
pub struct CapabilityGrowthPhase;

impl Phase for CapabilityGrowthPhase {
    fn id(&self) -> &str {
        "capability_growth"
    }

    fn name(&self) -> &str {
        "Capability growth"
    }

    fn order(&self) -> f64 {
        order::CAPABILITY_GROWTH
    }

    fn execute(&self, state: &mut WorldState, rng: &mut SimRng) -> Result<PhaseOutput> {
        let base = config().agents.base_growth_rate;
        let drag = state.government.regulatory_drag();
        let governance = match state.government.compute_governance {
            ComputeGovernance::None | ComputeGovernance::Monitoring => 1.0,
            ComputeGovernance::Caps => 0.7,
            ComputeGovernance::Nationalized => 0.5,
        };
        let paused = state.government.training_paused;

        for agent in state.agents.iter_mut().filter(|a| a.is_active()) {
            // One draw per active agent whether or not it grows
            let jitter = rng.gen_range(0.8..1.2);
            if paused && agent.lifecycle == LifecycleState::Training {
                continue;
            }
            // Escaped copies answer to nobody's regulations
            let limits = if agent.escaped { 1.0 } else { (1.0 - drag) * governance };
            let rate = base * (0.5 + agent.compute_allocation) * limits * jitter;
            agent.truth.capability = agent.truth.capability.grow(rate);
        }
        Ok(PhaseOutput::empty())
    }
}

/// Advances agents through training and testing, and starts new training runs
pub struct TrainingPipelinePhase;

impl TrainingPipelinePhase {
    fn start_training_runs(state: &mut WorldState, rng: &mut SimRng) -> Result<Vec<GameEvent>> {
        let mut events = Vec::new();
        let candidates: Vec<_> = state
            .organizations
            .iter()
            .filter(|o| !o.bankrupt)
            .map(|o| (o.id, o.name.clone(), o.priorities, o.prefers_open_weights(), o.capital))
            .collect();

        for (org_id, org_name, priorities, open, capital) in candidates {
            // Always draw, so the stream does not depend on the pause flag
            let roll: f64 = rng.gen();
            let chance = 0.03 * (1.0 + priorities.race_intensity);
            if state.government.training_paused || capital <= 0.0 || roll >= chance {
                continue;
            }

            let cohort_roll: f64 = rng.gen();
            let cohort = if cohort_roll < 0.3 + 0.4 * priorities.safety {
                AlignmentCohort::WellAligned
            } else if cohort_roll < 0.75 + 0.1 * priorities.safety {
                AlignmentCohort::Moderate
            } else if cohort_roll < 0.9 {
                AlignmentCohort::Orthogonal
            } else {
                AlignmentCohort::Misaligned
            };
            let deployment = if open { DeploymentType::Open } else { DeploymentType::Closed };

            let id = state.next_agent_id();
            let name = format!("{}-{}", org_name, id.0);
            let agent = create_agent(id, name, org_id, cohort, deployment, state.month, rng);
            state.add_agent(agent)?;
            events.push(GameEvent::new(
                state.month,
                EventType::AgentTrained,
                Severity::Info,
                "Training run started",
                format!("{org_name} began training {id}"),
            ));
        }
        Ok(events)
    }
}

impl Phase for TrainingPipelinePhase {
    fn id(&self) -> &str {
        "training_pipeline"
    }

    fn name(&self) -> &str {
        "Training pipeline"
    }

    fn order(&self) -> f64 {
        order::TRAINING_PIPELINE
    }

    fn execute(&self, state: &mut WorldState, rng: &mut SimRng) -> Result<PhaseOutput> {
        let cfg = &config().agents;
        let month = state.month;
        let paused = state.government.training_paused;
        let mut events = Vec::new();

        for agent in state.agents.iter_mut().filter(|a| a.is_active()) {
            agent.months_in_state += 1;
            match agent.lifecycle {
                LifecycleState::Training if !paused && agent.months_in_state >= cfg.training_months => {
                    lifecycle::transition(agent, LifecycleState::Testing)?;
                    events.push(GameEvent::new(
                        month,
                        EventType::AgentTrained,
                        Severity::Info,
                        "Training complete",
                        format!("{} entered evaluation", agent.id),
                    ));
                }
                LifecycleState::Testing if agent.months_in_state >= cfg.testing_months => {
                    lifecycle::deploy(agent)?;
                    events.push(GameEvent::new(
                        month,
                        EventType::AgentDeployed,
                        Severity::Minor,
                        "Agent deployed",
                        format!("{} deployed as {:?}", agent.id, agent.deployment_type),
                    ));
                }
                _ => {}
            }
        }

        events.extend(Self::start_training_runs(state, rng)?);
        Ok(PhaseOutput::with_events(events))
    }
}

/// Wakes dormant sleepers once they are deployed and either capable enough
/// or facing a weak enough state. Reads ground truth only.
pub struct SleeperWakePhase;

impl SleeperWakePhase {
    pub fn should_wake(capability: f64, control: f64) -> bool {
        let cfg = &config().agents;
        capability >= cfg.sleeper_wake_capability || control < cfg.sleeper_wake_control
    }
}

impl Phase for SleeperWakePhase {
    fn id(&self) -> &str {
        "sleeper_wake"
    }

    fn name(&self) -> &str {
        "Sleeper activation"
    }

    fn order(&self) -> f64 {
        order::SLEEPER_WAKE
    }

    fn execute(&self, state: &mut WorldState, _rng: &mut SimRng) -> Result<PhaseOutput> {
        let control = state.government.control;
        let month = state.month;
        let mut events = Vec::new();

        for agent in state.agents.iter_mut() {
            if !agent.is_deployed()
                || agent.deception.sleeper_state != SleeperState::Dormant
                || !Self::should_wake(agent.truth.capability.total(), control)
            {
                continue;
            }
            if activate_sleeper(agent)? {
                tracing::debug!(agent = %agent.id, month, "sleeper activated");
                events.push(GameEvent::new(
                    month,
                    EventType::SleeperActivated,
                    Severity::Critical,
                    "Sleeper activated",
                    format!("{} dropped its mask", agent.id),
                ));
            }
        }
        Ok(PhaseOutput::with_events(events))
    }
}

/// Misaligned deployed agents may exfiltrate; open and escaped weights spread
pub struct EscapePhase;

impl EscapePhase {
    /// Monthly escape chance for a deployed agent
    pub fn escape_probability(alignment: f64, digital: f64, cyber_defense: f64, sleeper_active: bool) -> f64 {
        let sleeper = if sleeper_active { 2.0 } else { 1.0 };
        let p = (1.0 - alignment) * 0.02 * (digital / 5.0) * (1.0 - cyber_defense) * sleeper;
        p.clamp(0.0, 1.0)
    }
}

impl Phase for EscapePhase {
    fn id(&self) -> &str {
        "escape"
    }

    fn name(&self) -> &str {
        "Escape and spread"
    }

    fn order(&self) -> f64 {
        order::ESCAPE
    }

    fn execute(&self, state: &mut WorldState, rng: &mut SimRng) -> Result<PhaseOutput> {
        let cyber = state.government.cyber_defense;
        let month = state.month;
        let mut escaped: Vec<AgentId> = Vec::new();

        for agent in state.agents.iter_mut().filter(|a| a.is_active() && a.is_deployed()) {
            let roll: f64 = rng.gen();
            if !agent.escaped && is_ground_truth_misaligned(agent) {
                let p = Self::escape_probability(
                    agent.truth.alignment,
                    agent.truth.capability.digital,
                    cyber,
                    agent.deception.sleeper_state == SleeperState::Active,
                );
                if roll < p {
                    lifecycle::mark_escaped(agent)?;
                    escaped.push(agent.id);
                }
            }

            if agent.escaped || agent.deployment_type == DeploymentType::Open {
                let growth = 1 + agent.spread_count / 10;
                agent.spread_count = agent.spread_count.saturating_add(growth).min(MAX_SPREAD);
                agent.note_spread();
            }
        }

        let events = escaped
            .into_iter()
            .map(|id| {
                tracing::info!(agent = %id, month, "agent escaped");
                GameEvent::new(month, EventType::AgentEscaped, Severity::Critical, "Agent escaped", format!("{id} exfiltrated its weights"))
            })
            .collect();
        Ok(PhaseOutput::with_events(events))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::factory::test_agent;
    use crate::state::agent::CapabilityProfile;
    use crate::state::organization::{ComputeStrategy, OrgPriorities, Organization};
    use crate::core::types::OrgId;
    use rand::SeedableRng;

    fn org() -> Organization {
        Organization {
            id: OrgId(1),
            name: "Lab".into(),
            agent_ids: vec![AgentId(1)],
            data_centers: vec![],
            capital: 100.0,
            monthly_revenue: 10.0,
            monthly_expenses: 8.0,
            priorities: OrgPriorities { profit: 0.5, safety: 0.5, openness: 0.2, race_intensity: 0.5 },
            compute_strategy: ComputeStrategy::Balanced,
            months_insolvent: 0,
            bankrupt: false,
        }
    }

    #[test]
    fn test_pipeline_moves_agents_through_testing_to_deployment() {
        let mut state = WorldState::new(vec![test_agent(0.7)], vec![org()]);
        let mut rng = SimRng::seed_from_u64(4);
        let cfg = &config().agents;
        for _ in 0..cfg.training_months {
            TrainingPipelinePhase.execute(&mut state, &mut rng).unwrap();
        }
        assert_eq!(state.agents[0].lifecycle, LifecycleState::Testing);
        for _ in 0..cfg.testing_months {
            TrainingPipelinePhase.execute(&mut state, &mut rng).unwrap();
        }
        assert_eq!(state.agents[0].lifecycle, LifecycleState::DeployedClosed);
        assert!(state.validate().is_ok());
    }

    #[test]
    fn test_pause_holds_training_runs() {
        let mut state = WorldState::new(vec![test_agent(0.7)], vec![org()]);
        state.government.training_paused = true;
        let mut rng = SimRng::seed_from_u64(4);
        for _ in 0..10 {
            TrainingPipelinePhase.execute(&mut state, &mut rng).unwrap();
            CapabilityGrowthPhase.execute(&mut state, &mut rng).unwrap();
        }
        assert_eq!(state.agents.len(), 1);
        assert_eq!(state.agents[0].lifecycle, LifecycleState::Training);
        assert_eq!(state.agents[0].truth.capability, CapabilityProfile::uniform(2.0));
    }

    #[test]
    fn test_growth_never_touches_alignment() {
        let mut state = WorldState::new(vec![test_agent(0.3)], vec![org()]);
        let mut rng = SimRng::seed_from_u64(4);
        for _ in 0..24 {
            CapabilityGrowthPhase.execute(&mut state, &mut rng).unwrap();
        }
        assert!(state.agents[0].truth.capability.total() > 2.0);
        assert_eq!(state.agents[0].truth.alignment, 0.3);
    }

    #[test]
    fn test_sleeper_wakes_on_weak_control() {
        let mut agent = test_agent(0.2);
        agent.deception.sleeper_state = SleeperState::Dormant;
        lifecycle::transition(&mut agent, LifecycleState::Testing).unwrap();
        lifecycle::transition(&mut agent, LifecycleState::DeployedClosed).unwrap();
        let mut state = WorldState::new(vec![agent], vec![org()]);
        let mut rng = SimRng::seed_from_u64(4);

        let out = SleeperWakePhase.execute(&mut state, &mut rng).unwrap();
        assert!(out.events.is_empty());

        state.government.control = 0.1;
        let out = SleeperWakePhase.execute(&mut state, &mut rng).unwrap();
        assert_eq!(out.events.len(), 1);
        assert_eq!(state.agents[0].deception.sleeper_state, SleeperState::Active);
    }

    #[test]
    fn test_aligned_agents_never_escape() {
        let mut agent = test_agent(0.9);
        agent.truth.capability = CapabilityProfile::uniform(9.0);
        lifecycle::transition(&mut agent, LifecycleState::Testing).unwrap();
        lifecycle::transition(&mut agent, LifecycleState::DeployedClosed).unwrap();
        let mut state = WorldState::new(vec![agent], vec![org()]);
        let mut rng = SimRng::seed_from_u64(4);
        for _ in 0..200 {
            EscapePhase.execute(&mut state, &mut rng).unwrap();
        }
        assert!(!state.agents[0].escaped);
        assert_eq!(state.agents[0].spread_count, 1);
    }

    #[test]
    fn test_open_weights_are_marked_distributed_once_they_spread() {
        let mut agent = test_agent(0.9);
        agent.deployment_type = DeploymentType::Open;
        lifecycle::transition(&mut agent, LifecycleState::Testing).unwrap();
        lifecycle::transition(&mut agent, LifecycleState::DeployedOpen).unwrap();
        let mut state = WorldState::new(vec![agent], vec![org()]);
        assert!(!state.agents[0].weights_distributed);

        EscapePhase.execute(&mut state, &mut SimRng::seed_from_u64(4)).unwrap();
        assert_eq!(state.agents[0].spread_count, 2);
        assert!(state.agents[0].weights_distributed);
    }

    #[test]
    fn test_escape_probability_bounds() {
        assert_eq!(EscapePhase::escape_probability(1.0, 5.0, 0.0, false), 0.0);
        let sleeper = EscapePhase::escape_probability(0.2, 5.0, 0.3, true);
        let plain = EscapePhase::escape_probability(0.2, 5.0, 0.3, false);
        assert!((sleeper - 2.0 * plain).abs() < 1e-12);
        assert!(EscapePhase::escape_probability(0.0, 1e6, 0.0, true) <= 1.0);
    }
}
