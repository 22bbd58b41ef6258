//! Economic actions: the three UBI variants and labour-market programs

use crate::core::config::config;
use crate::core::types::SimRng;
use crate::government::action::{major_policy_ready, ActionId, ActionOutcome, GovernmentAction};
use crate::government::actions::{action_event, enact_regulation, nudge};
use crate::government::priority::PriorityInputs;
use crate::state::events::Severity;
use crate::state::government::UbiVariant;
use crate::state::world::WorldState;

fn ubi_eligible(state: &WorldState) -> bool {
    state.government.ubi_variant.is_none()
        && state.society.unemployment > config().government.ubi_unemployment_threshold
        && major_policy_ready(state)
}

fn adopt_ubi(state: &mut WorldState, id: ActionId, variant: UbiVariant, support: f64) -> ActionOutcome {
    state.government.ubi_variant = Some(variant);
    state.society.ubi_support = support;
    let stability = nudge(&mut state.society.social_stability, support * 0.15);
    let inequality = nudge(&mut state.society.wealth_inequality, -support * 0.2);
    let legitimacy = nudge(&mut state.government.legitimacy, 0.04);

    tracing::info!(month = state.month, ?variant, "UBI adopted");
    let event = action_event(
        state,
        id,
        Severity::Major,
        format!("{variant:?} UBI adopted with support level {support:.2}"),
    );
    ActionOutcome::success(format!("{variant:?} UBI adopted"))
        .effect("ubi_support", support)
        .effect("social_stability", stability)
        .effect("wealth_inequality", inequality)
        .effect("legitimacy", legitimacy)
        .event(event)
}

pub struct ImplementGenerousUbi;

impl GovernmentAction for ImplementGenerousUbi {
    fn id(&self) -> ActionId {
        ActionId::ImplementGenerousUbi
    }

    fn can_execute(&self, state: &WorldState) -> bool {
        ubi_eligible(state)
    }

    fn priority(&self, _state: &WorldState, inputs: &PriorityInputs) -> f64 {
        2.5 * inputs.unemployment + 0.4 * inputs.trust + 0.3 * (1.0 - inputs.social_stability)
    }

    fn execute(&self, state: &mut WorldState, _rng: &mut SimRng) -> ActionOutcome {
        adopt_ubi(state, self.id(), UbiVariant::Generous, 0.6)
    }
}

pub struct ImplementMeansTestedUbi;

impl GovernmentAction for ImplementMeansTestedUbi {
    fn id(&self) -> ActionId {
        ActionId::ImplementMeansTestedUbi
    }

    fn can_execute(&self, state: &WorldState) -> bool {
        ubi_eligible(state)
    }

    fn priority(&self, _state: &WorldState, inputs: &PriorityInputs) -> f64 {
        2.2 * inputs.unemployment + 0.5 * (1.0 - inputs.legitimacy) + 0.2
    }

    fn execute(&self, state: &mut WorldState, _rng: &mut SimRng) -> ActionOutcome {
        adopt_ubi(state, self.id(), UbiVariant::MeansTested, 0.3)
    }
}

pub struct ImplementJobGuarantee;

impl GovernmentAction for ImplementJobGuarantee {
    fn id(&self) -> ActionId {
        ActionId::ImplementJobGuarantee
    }

    fn can_execute(&self, state: &WorldState) -> bool {
        ubi_eligible(state)
    }

    fn priority(&self, _state: &WorldState, inputs: &PriorityInputs) -> f64 {
        2.0 * inputs.unemployment + 0.6 * inputs.legitimacy
    }

    fn execute(&self, state: &mut WorldState, _rng: &mut SimRng) -> ActionOutcome {
        let retraining = nudge(&mut state.society.retraining_capacity, 0.1);
        let unemployment = nudge(&mut state.society.unemployment, -0.03);
        adopt_ubi(state, self.id(), UbiVariant::JobGuarantee, 0.2)
            .effect("retraining_capacity", retraining)
            .effect("unemployment", unemployment)
    }
}

pub struct RetrainingProgram;

impl GovernmentAction for RetrainingProgram {
    fn id(&self) -> ActionId {
        ActionId::RetrainingProgram
    }

    fn can_execute(&self, state: &WorldState) -> bool {
        state.society.unemployment > 0.08 && state.society.retraining_capacity < 0.8
    }

    fn priority(&self, _state: &WorldState, inputs: &PriorityInputs) -> f64 {
        1.5 * inputs.unemployment + 0.2
    }

    fn execute(&self, state: &mut WorldState, _rng: &mut SimRng) -> ActionOutcome {
        let retraining = nudge(&mut state.society.retraining_capacity, 0.1);
        let unemployment = nudge(&mut state.society.unemployment, -0.01);
        let event = action_event(state, self.id(), Severity::Minor, "Retraining capacity expanded");
        ActionOutcome::success("Retraining program funded")
            .effect("retraining_capacity", retraining)
            .effect("unemployment", unemployment)
            .event(event)
    }
}

pub struct AutomationTax;

impl GovernmentAction for AutomationTax {
    fn id(&self) -> ActionId {
        ActionId::AutomationTax
    }

    fn can_execute(&self, state: &WorldState) -> bool {
        state.society.unemployment > 0.15 && !state.government.has_regulation(self.id().as_str())
    }

    fn priority(&self, _state: &WorldState, inputs: &PriorityInputs) -> f64 {
        1.2 * inputs.unemployment + 0.5 * inputs.capability_norm()
    }

    fn execute(&self, state: &mut WorldState, _rng: &mut SimRng) -> ActionOutcome {
        enact_regulation(state, self.id().as_str(), 0.05);
        let mut revenue_cut = 0.0;
        for org in state.organizations.iter_mut().filter(|o| !o.bankrupt) {
            let cut = org.monthly_revenue * 0.05;
            org.monthly_revenue -= cut;
            revenue_cut += cut;
        }
        let inequality = nudge(&mut state.society.wealth_inequality, -0.05);
        let event = action_event(state, self.id(), Severity::Minor, "Automation tax levied on AI revenue");
        ActionOutcome::success("Automation tax enacted")
            .effect("org_revenue", -revenue_cut)
            .effect("wealth_inequality", inequality)
            .event(event)
    }
}

pub struct StimulusPackage;

impl GovernmentAction for StimulusPackage {
    fn id(&self) -> ActionId {
        ActionId::StimulusPackage
    }

    fn can_execute(&self, state: &WorldState) -> bool {
        state.society.social_stability < 0.5
    }

    fn priority(&self, _state: &WorldState, inputs: &PriorityInputs) -> f64 {
        1.5 * (1.0 - inputs.social_stability) + inputs.unemployment
    }

    fn execute(&self, state: &mut WorldState, _rng: &mut SimRng) -> ActionOutcome {
        let stability = nudge(&mut state.society.social_stability, 0.05);
        let legitimacy = nudge(&mut state.government.legitimacy, 0.02);
        let depletion = nudge(&mut state.environment.resource_depletion, 0.01);
        let event = action_event(state, self.id(), Severity::Minor, "Stimulus spending approved");
        ActionOutcome::success("Stimulus package approved")
            .effect("social_stability", stability)
            .effect("legitimacy", legitimacy)
            .effect("resource_depletion", depletion)
            .event(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario;
    use rand::SeedableRng;

    fn world(unemployment: f64) -> WorldState {
        let mut world = scenario::default_world(&mut SimRng::seed_from_u64(42));
        world.society.unemployment = unemployment;
        world
    }

    #[test]
    fn test_ubi_requires_unemployment_above_threshold() {
        assert!(!ImplementGenerousUbi.can_execute(&world(0.2)));
        assert!(ImplementGenerousUbi.can_execute(&world(0.21)));
    }

    #[test]
    fn test_ubi_priority_rises_with_unemployment() {
        let low = world(0.10);
        let high = world(0.40);
        for action in [
            &ImplementGenerousUbi as &dyn GovernmentAction,
            &ImplementMeansTestedUbi,
            &ImplementJobGuarantee,
        ] {
            let p_low = action.priority(&low, &PriorityInputs::from_state(&low));
            let p_high = action.priority(&high, &PriorityInputs::from_state(&high));
            assert!(p_high > p_low, "{} not monotone", action.id());
        }
    }

    #[test]
    fn test_ubi_is_set_once() {
        let mut state = world(0.4);
        let mut rng = SimRng::seed_from_u64(1);
        assert!(ImplementMeansTestedUbi.execute(&mut state, &mut rng).success);
        assert_eq!(state.government.ubi_variant, Some(UbiVariant::MeansTested));
        state.month += 100;
        assert!(!ImplementGenerousUbi.can_execute(&state));
    }
}
