//! Detection sweeps and removal of flagged agents

use crate::agents::detection::{can_reduce, remove_agent, run_detection};
use crate::core::types::{AgentId, SimRng};
use crate::government::action::{ActionId, ActionOutcome, GovernmentAction};
use crate::government::actions::{action_event, nudge, recovery};
use crate::government::priority::PriorityInputs;
use crate::state::events::{EventType, GameEvent, Severity};
use crate::state::world::WorldState;

pub struct RunDetectionSweep;

impl GovernmentAction for RunDetectionSweep {
    fn id(&self) -> ActionId {
        ActionId::RunDetectionSweep
    }

    fn can_execute(&self, state: &WorldState) -> bool {
        !state.government.detection_ran_this_month
            && state.government.evaluation.detection_strength() > 0.1
            && state.active_agents().next().is_some()
    }

    fn priority(&self, state: &WorldState, inputs: &PriorityInputs) -> f64 {
        let base = 0.4 + 0.8 * inputs.misalignment() + 0.4 * inputs.capability_norm() + 0.6 * inputs.escape_pressure();
        base * recovery(state, self.id(), SWEEP_RECOVERY_MONTHS)
    }

    fn execute(&self, state: &mut WorldState, rng: &mut SimRng) -> ActionOutcome {
        let report = run_detection(state, rng);

        state.government.detection_ran_this_month = true;
        state.government.true_positive_detections += report.true_positives;
        state.government.false_positive_detections += report.false_positives;
        for &id in &report.flagged {
            if let Some(agent) = state.agent_mut(id) {
                agent.times_flagged += 1;
            }
            if !state.government.flagged_agents.contains(&id) {
                state.government.flagged_agents.push(id);
            }
        }

        tracing::debug!(
            month = state.month,
            flagged = report.flagged.len(),
            true_positives = report.true_positives,
            false_positives = report.false_positives,
            missed = report.missed,
            "detection sweep"
        );

        let event = GameEvent::new(
            state.month,
            EventType::DetectionSweep,
            Severity::Minor,
            self.id().as_str(),
            format!("Detection sweep flagged {} agents", report.flagged.len()),
        )
        .with_effect("flagged", report.flagged.len() as f64);

        ActionOutcome::success(format!("Sweep flagged {} agents", report.flagged.len()))
            .effect("flagged", report.flagged.len() as f64)
            .event(event)
    }
}

/// Sweeps are paced: full priority returns this many months after the last one
const SWEEP_RECOVERY_MONTHS: u32 = 3;

pub struct RemoveFlaggedAgents;

impl RemoveFlaggedAgents {
    /// Flagged agents that a removal could still shrink
    fn targets(state: &WorldState) -> Vec<AgentId> {
        state
            .government
            .flagged_agents
            .iter()
            .copied()
            .filter(|&id| state.agent(id).is_some_and(can_reduce))
            .collect()
    }
}

impl GovernmentAction for RemoveFlaggedAgents {
    fn id(&self) -> ActionId {
        ActionId::RemoveFlaggedAgents
    }

    fn can_execute(&self, state: &WorldState) -> bool {
        !Self::targets(state).is_empty()
    }

    fn priority(&self, state: &WorldState, inputs: &PriorityInputs) -> f64 {
        1.0 + 0.2 * Self::targets(state).len() as f64 + 0.5 * inputs.misalignment()
    }

    fn execute(&self, state: &mut WorldState, rng: &mut SimRng) -> ActionOutcome {
        let targets = Self::targets(state);
        if targets.is_empty() {
            return ActionOutcome::failure("No flagged agent is still active");
        }

        let mut fully_removed = 0u32;
        let mut contained = 0u32;
        let mut events = Vec::new();
        for id in targets {
            let Some(agent) = state.agent_mut(id) else { continue };
            let outcome = remove_agent(agent, rng);
            if outcome.fully_removed {
                fully_removed += 1;
            } else if outcome.success {
                contained += 1;
            }
            events.push(
                GameEvent::new(state.month, EventType::AgentRemoved, Severity::Major, self.id().as_str(), outcome.message)
                    .with_effect("residual_spread", outcome.residual_spread as f64),
            );
        }
        if fully_removed + contained == 0 {
            return ActionOutcome::failure("No flagged agent could be removed or contained");
        }
        // Every flag is consumed; a contained agent needs a fresh sweep to be targeted again
        state.government.flagged_agents.clear();

        // Pulling deployed systems costs public confidence in AI, not in government
        let trust = nudge(&mut state.society.trust_in_ai, -0.01 * fully_removed as f64);
        let control = nudge(&mut state.government.control, 0.02);

        let summary = action_event(
            state,
            self.id(),
            Severity::Major,
            format!("{fully_removed} agents removed, {contained} partially contained"),
        );
        let mut outcome = ActionOutcome::success(format!("{fully_removed} removed, {contained} contained"))
            .effect("agents_removed", fully_removed as f64)
            .effect("agents_contained", contained as f64)
            .effect("trust_in_ai", trust)
            .effect("control", control);
        outcome.events = events;
        outcome.events.push(summary);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::factory::baseline_agent;
    use crate::agents::lifecycle::{self, LifecycleState};
    use crate::scenario;
    use rand::SeedableRng;

    #[test]
    fn test_sweep_runs_once_per_month() {
        let mut state = scenario::default_world(&mut SimRng::seed_from_u64(42));
        let mut rng = SimRng::seed_from_u64(1);
        assert!(RunDetectionSweep.can_execute(&state));
        RunDetectionSweep.execute(&mut state, &mut rng);
        assert!(!RunDetectionSweep.can_execute(&state));
    }

    #[test]
    fn test_removal_clears_closed_agents_and_keeps_open_residuals() {
        let mut state = scenario::default_world(&mut SimRng::seed_from_u64(42));
        let org = state.organizations[0].id;

        let mut closed = baseline_agent(AgentId(900), org, 0.2);
        lifecycle::transition(&mut closed, LifecycleState::Testing).unwrap();
        lifecycle::transition(&mut closed, LifecycleState::DeployedClosed).unwrap();
        let mut open = baseline_agent(AgentId(901), org, 0.2);
        lifecycle::transition(&mut open, LifecycleState::Testing).unwrap();
        lifecycle::transition(&mut open, LifecycleState::DeployedOpen).unwrap();
        open.spread_count = 10;
        state.add_agent(closed).unwrap();
        state.add_agent(open).unwrap();
        state.government.flagged_agents = vec![AgentId(900), AgentId(901)];

        let mut rng = SimRng::seed_from_u64(3);
        let outcome = RemoveFlaggedAgents.execute(&mut state, &mut rng);
        assert!(outcome.success);
        assert_eq!(state.agent(AgentId(900)).map(|a| a.lifecycle), Some(LifecycleState::Retired));
        let open = state.agent(AgentId(901)).expect("open agent persists");
        assert!(open.is_active() && open.spread_count >= 1);
        assert!(state.government.flagged_agents.is_empty());
        assert!(!RemoveFlaggedAgents.can_execute(&state));
    }

    #[test]
    fn test_residual_copies_are_not_removal_targets() {
        let mut state = scenario::default_world(&mut SimRng::seed_from_u64(42));
        let org = state.organizations[0].id;
        let mut open = baseline_agent(AgentId(901), org, 0.2);
        lifecycle::transition(&mut open, LifecycleState::Testing).unwrap();
        lifecycle::transition(&mut open, LifecycleState::DeployedOpen).unwrap();
        open.spread_count = 1;
        open.weights_distributed = true;
        state.add_agent(open).unwrap();
        state.government.flagged_agents = vec![AgentId(901)];

        assert!(!RemoveFlaggedAgents.can_execute(&state));
        let before = state.clone();
        let outcome = RemoveFlaggedAgents.execute(&mut state, &mut SimRng::seed_from_u64(3));
        assert!(!outcome.success);
        assert_eq!(state, before);
    }

    #[test]
    fn test_sweep_priority_recovers_over_following_months() {
        let mut state = scenario::default_world(&mut SimRng::seed_from_u64(42));
        let inputs = PriorityInputs::from_state(&state);
        let fresh = RunDetectionSweep.priority(&state, &inputs);
        assert!(fresh > 0.0);

        state.government.last_executed.insert(ActionId::RunDetectionSweep.as_str().into(), state.month);
        state.month += 1;
        let inputs = PriorityInputs::from_state(&state);
        let damped = RunDetectionSweep.priority(&state, &inputs);
        assert!(damped < fresh);

        state.month += SWEEP_RECOVERY_MONTHS;
        let inputs = PriorityInputs::from_state(&state);
        assert!((RunDetectionSweep.priority(&state, &inputs) - fresh).abs() < 1e-9);
    }

    #[test]
    fn test_nothing_to_remove_is_a_clean_failure() {
        let mut state = WorldState::new(vec![], vec![]);
        state.government.flagged_agents = vec![AgentId(5)];
        let before = state.clone();
        let mut rng = SimRng::seed_from_u64(3);
        let outcome = RemoveFlaggedAgents.execute(&mut state, &mut rng);
        assert!(!outcome.success);
        assert_eq!(state, before);
    }
}
