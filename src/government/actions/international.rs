use crate::core::types::SimRng;
use crate::government::action::{ActionId, ActionOutcome, GovernmentAction};
use crate::government::actions::{action_event, nudge};
use crate::government::priority::PriorityInputs;
use crate::state::events::Severity;
use crate::state::world::WorldState;

pub struct InternationalAiTreaty;

impl GovernmentAction for InternationalAiTreaty {
    fn id(&self) -> ActionId {
        ActionId::InternationalAiTreaty
    }

    fn can_execute(&self, state: &WorldState) -> bool {
        state.government.international_cooperation < 0.9
            && PriorityInputs::from_state(state).observable_capability >= 2.0
    }

    fn priority(&self, state: &WorldState, inputs: &PriorityInputs) -> f64 {
        0.2 + 0.5 * inputs.capability_norm() + 0.4 * inputs.global_tension + 0.3 * inputs.misalignment()
            - 0.3 * state.government.international_cooperation
    }

    fn execute(&self, state: &mut WorldState, _rng: &mut SimRng) -> ActionOutcome {
        let cooperation = nudge(&mut state.government.international_cooperation, 0.1);
        let tension = nudge(&mut state.conflict.global_tension, -0.05);
        let event = action_event(state, self.id(), Severity::Minor, "Multilateral AI safety treaty signed");
        ActionOutcome::success("Treaty signed")
            .effect("international_cooperation", cooperation)
            .effect("global_tension", tension)
            .event(event)
    }
}

pub struct ConflictMediation;

impl GovernmentAction for ConflictMediation {
    fn id(&self) -> ActionId {
        ActionId::ConflictMediation
    }

    fn can_execute(&self, state: &WorldState) -> bool {
        state.conflict.global_tension > 0.3
    }

    fn priority(&self, _state: &WorldState, inputs: &PriorityInputs) -> f64 {
        1.2 * inputs.global_tension
    }

    fn execute(&self, state: &mut WorldState, _rng: &mut SimRng) -> ActionOutcome {
        let mediation = nudge(&mut state.conflict.mediation_strength, 0.1);
        let tension = nudge(&mut state.conflict.global_tension, -0.03 - 0.05 * state.conflict.mediation_strength);
        if state.conflict.global_tension < 0.3 && state.conflict.active_conflicts > 0 {
            state.conflict.active_conflicts -= 1;
        }
        let event = action_event(state, self.id(), Severity::Minor, "Diplomatic mediation lowered tensions");
        ActionOutcome::success("Mediation held")
            .effect("mediation_strength", mediation)
            .effect("global_tension", tension)
            .event(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_mediation_needs_tension() {
        let mut state = WorldState::new(vec![], vec![]);
        state.conflict.global_tension = 0.3;
        assert!(!ConflictMediation.can_execute(&state));
        state.conflict.global_tension = 0.6;
        state.conflict.active_conflicts = 1;
        assert!(ConflictMediation.can_execute(&state));
        let outcome = ConflictMediation.execute(&mut state, &mut SimRng::seed_from_u64(1));
        assert!(outcome.success);
        assert!(state.conflict.global_tension < 0.6);
    }

    #[test]
    fn test_treaty_needs_visible_capability() {
        let state = WorldState::new(vec![], vec![]);
        assert!(!InternationalAiTreaty.can_execute(&state));
    }
}
