//! Social programs and institutional repair

use crate::core::types::SimRng;
use crate::government::action::{ActionId, ActionOutcome, GovernmentAction};
use crate::government::actions::{action_event, nudge};
use crate::government::priority::PriorityInputs;
use crate::state::events::Severity;
use crate::state::world::WorldState;

pub struct PublicAwarenessCampaign;

impl GovernmentAction for PublicAwarenessCampaign {
    fn id(&self) -> ActionId {
        ActionId::PublicAwarenessCampaign
    }

    fn can_execute(&self, state: &WorldState) -> bool {
        state.society.public_awareness < 0.9
    }

    fn priority(&self, state: &WorldState, inputs: &PriorityInputs) -> f64 {
        0.2 + 0.4 * inputs.capability_norm() + 0.3 * inputs.misalignment() - 0.3 * state.society.public_awareness
    }

    fn execute(&self, state: &mut WorldState, _rng: &mut SimRng) -> ActionOutcome {
        let awareness = nudge(&mut state.society.public_awareness, 0.1);
        let legitimacy = nudge(&mut state.government.legitimacy, 0.01);
        let event = action_event(state, self.id(), Severity::Info, "Public AI literacy campaign launched");
        ActionOutcome::success("Awareness campaign run")
            .effect("public_awareness", awareness)
            .effect("legitimacy", legitimacy)
            .event(event)
    }
}

pub struct StrengthenSafetyNet;

impl GovernmentAction for StrengthenSafetyNet {
    fn id(&self) -> ActionId {
        ActionId::StrengthenSafetyNet
    }

    fn can_execute(&self, state: &WorldState) -> bool {
        state.society.social_stability < 0.6
    }

    fn priority(&self, _state: &WorldState, inputs: &PriorityInputs) -> f64 {
        1.2 * (1.0 - inputs.social_stability) + 0.8 * inputs.unemployment
    }

    fn execute(&self, state: &mut WorldState, _rng: &mut SimRng) -> ActionOutcome {
        let stability = nudge(&mut state.society.social_stability, 0.04);
        let inequality = nudge(&mut state.society.wealth_inequality, -0.02);
        let event = action_event(state, self.id(), Severity::Minor, "Unemployment insurance and housing aid expanded");
        ActionOutcome::success("Safety net strengthened")
            .effect("social_stability", stability)
            .effect("wealth_inequality", inequality)
            .event(event)
    }
}

pub struct EnvironmentalProtection;

impl GovernmentAction for EnvironmentalProtection {
    fn id(&self) -> ActionId {
        ActionId::EnvironmentalProtection
    }

    fn can_execute(&self, state: &WorldState) -> bool {
        state.environment.stress() > 0.3 && state.environment.protection_level < 1.0
    }

    fn priority(&self, state: &WorldState, inputs: &PriorityInputs) -> f64 {
        1.3 * inputs.environmental_stress - 0.3 * state.environment.protection_level
    }

    fn execute(&self, state: &mut WorldState, _rng: &mut SimRng) -> ActionOutcome {
        let protection = nudge(&mut state.environment.protection_level, 0.1);
        let pollution = nudge(&mut state.environment.pollution, -0.02);
        let event = action_event(state, self.id(), Severity::Minor, "Environmental protections tightened");
        ActionOutcome::success("Environmental protection raised")
            .effect("protection_level", protection)
            .effect("pollution", pollution)
            .event(event)
    }
}

pub struct RebuildInstitutionalTrust;

impl GovernmentAction for RebuildInstitutionalTrust {
    fn id(&self) -> ActionId {
        ActionId::RebuildInstitutionalTrust
    }

    fn can_execute(&self, state: &WorldState) -> bool {
        state.government.legitimacy < 0.6
    }

    fn priority(&self, _state: &WorldState, inputs: &PriorityInputs) -> f64 {
        1.5 * (1.0 - inputs.legitimacy)
    }

    fn execute(&self, state: &mut WorldState, _rng: &mut SimRng) -> ActionOutcome {
        let legitimacy = nudge(&mut state.government.legitimacy, 0.05);
        let stability = nudge(&mut state.society.social_stability, 0.01);
        let event = action_event(state, self.id(), Severity::Minor, "Transparency and anti-corruption reforms passed");
        ActionOutcome::success("Institutional trust rebuilt")
            .effect("legitimacy", legitimacy)
            .effect("social_stability", stability)
            .event(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_trust_rebuilding_targets_low_legitimacy() {
        let mut state = WorldState::new(vec![], vec![]);
        state.government.legitimacy = 0.7;
        assert!(!RebuildInstitutionalTrust.can_execute(&state));
        state.government.legitimacy = 0.3;
        assert!(RebuildInstitutionalTrust.can_execute(&state));
        RebuildInstitutionalTrust.execute(&mut state, &mut SimRng::seed_from_u64(1));
        assert!((state.government.legitimacy - 0.35).abs() < 1e-9);
    }

    #[test]
    fn test_environmental_priority_tracks_stress() {
        let mut state = WorldState::new(vec![], vec![]);
        let calm = EnvironmentalProtection.priority(&state, &PriorityInputs::from_state(&state));
        state.environment.pollution = 0.9;
        let stressed = EnvironmentalProtection.priority(&state, &PriorityInputs::from_state(&state));
        assert!(stressed > calm);
    }
}
