//! Containment and security actions

use crate::agents::detection::{can_reduce, remove_agent};
use crate::core::types::{AgentId, SimRng};
use crate::government::action::{ActionId, ActionOutcome, GovernmentAction};
use crate::government::actions::{action_event, enact_regulation, nudge, recovery};
use crate::government::priority::PriorityInputs;
use crate::state::events::{EventType, GameEvent, Severity};
use crate::state::world::WorldState;

/// Escaped agents are publicly known incidents, so the government may see
/// them. Those already down to their last copy are out of reach.
fn escaped_targets(state: &WorldState) -> Vec<AgentId> {
    state.active_agents().filter(|a| a.escaped && can_reduce(a)).map(|a| a.id).collect()
}

/// Full containment priority returns this many months after an operation
const CONTAINMENT_RECOVERY_MONTHS: u32 = 4;

pub struct ContainEscapedAgents;

impl GovernmentAction for ContainEscapedAgents {
    fn id(&self) -> ActionId {
        ActionId::ContainEscapedAgents
    }

    fn can_execute(&self, state: &WorldState) -> bool {
        !escaped_targets(state).is_empty()
    }

    fn priority(&self, state: &WorldState, inputs: &PriorityInputs) -> f64 {
        let base =
            1.5 + 0.3 * escaped_targets(state).len() as f64 + inputs.escape_pressure() + 0.3 * inputs.capability_norm();
        base * recovery(state, self.id(), CONTAINMENT_RECOVERY_MONTHS)
    }

    fn execute(&self, state: &mut WorldState, rng: &mut SimRng) -> ActionOutcome {
        let targets = escaped_targets(state);
        if targets.is_empty() {
            return ActionOutcome::failure("No escaped agents to contain");
        }

        let mut events = Vec::new();
        let mut removed = 0u32;
        let mut contained = 0u32;
        for id in targets {
            let Some(agent) = state.agent_mut(id) else { continue };
            let outcome = remove_agent(agent, rng);
            if outcome.fully_removed {
                removed += 1;
            } else if outcome.success {
                contained += 1;
            }
            events.push(
                GameEvent::new(state.month, EventType::AgentRemoved, Severity::Major, self.id().as_str(), outcome.message)
                    .with_effect("residual_spread", outcome.residual_spread as f64),
            );
        }
        if removed + contained == 0 {
            return ActionOutcome::failure("No escaped copies could be removed");
        }
        let cyber = nudge(&mut state.government.cyber_defense, 0.05);
        let control = nudge(&mut state.government.control, 0.03);

        let summary = action_event(
            state,
            self.id(),
            Severity::Major,
            format!("Containment operation removed {removed} escaped agents, {contained} partially contained"),
        );
        let mut outcome = ActionOutcome::success(format!("{removed} escaped agents removed, {contained} contained"))
            .effect("agents_removed", removed as f64)
            .effect("agents_contained", contained as f64)
            .effect("cyber_defense", cyber)
            .effect("control", control);
        outcome.events = events;
        outcome.events.push(summary);
        outcome
    }
}

pub struct CyberDefenseInvestment;

impl GovernmentAction for CyberDefenseInvestment {
    fn id(&self) -> ActionId {
        ActionId::CyberDefenseInvestment
    }

    fn can_execute(&self, state: &WorldState) -> bool {
        state.government.cyber_defense < 0.95
    }

    fn priority(&self, state: &WorldState, inputs: &PriorityInputs) -> f64 {
        let incidents = (state.conflict.cyber_incidents as f64 / 10.0).min(1.0);
        0.2 + 0.5 * inputs.capability_norm() + 0.5 * incidents + 0.4 * inputs.escape_pressure()
            - 0.3 * state.government.cyber_defense
    }

    fn execute(&self, state: &mut WorldState, _rng: &mut SimRng) -> ActionOutcome {
        let cyber = nudge(&mut state.government.cyber_defense, 0.1);
        let control = nudge(&mut state.government.control, 0.01);
        let event = action_event(state, self.id(), Severity::Info, "Critical infrastructure hardened");
        ActionOutcome::success("Cyber defense improved")
            .effect("cyber_defense", cyber)
            .effect("control", control)
            .event(event)
    }
}

pub struct ExportControls;

impl GovernmentAction for ExportControls {
    fn id(&self) -> ActionId {
        ActionId::ExportControls
    }

    fn can_execute(&self, state: &WorldState) -> bool {
        !state.government.has_regulation(self.id().as_str())
            && PriorityInputs::from_state(state).observable_capability >= 2.5
    }

    fn priority(&self, _state: &WorldState, inputs: &PriorityInputs) -> f64 {
        0.6 * inputs.capability_norm() + 0.3 * inputs.global_tension + 0.2 * inputs.misalignment()
    }

    fn execute(&self, state: &mut WorldState, _rng: &mut SimRng) -> ActionOutcome {
        enact_regulation(state, self.id().as_str(), 0.05);
        let tension = nudge(&mut state.conflict.global_tension, 0.02);
        let cooperation = nudge(&mut state.government.international_cooperation, -0.02);
        let event = action_event(state, self.id(), Severity::Minor, "Export controls placed on frontier chips");
        ActionOutcome::success("Export controls enacted")
            .effect("global_tension", tension)
            .effect("international_cooperation", cooperation)
            .event(event)
    }
}
