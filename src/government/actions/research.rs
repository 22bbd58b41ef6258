//! Publicly funded safety research

use crate::core::types::SimRng;
use crate::government::action::{ActionId, ActionOutcome, GovernmentAction};
use crate::government::actions::{action_event, nudge};
use crate::government::priority::PriorityInputs;
use crate::state::events::Severity;
use crate::state::world::WorldState;
use crate::state::LifecycleState;

/// Alignment gain per unit of research funding for agents still in training
const TRAINING_ALIGNMENT_GAIN: f64 = 0.02;

pub struct FundAlignmentResearch;

impl GovernmentAction for FundAlignmentResearch {
    fn id(&self) -> ActionId {
        ActionId::FundAlignmentResearch
    }

    fn can_execute(&self, state: &WorldState) -> bool {
        state.government.alignment_research_funding < 1.0
    }

    fn priority(&self, state: &WorldState, inputs: &PriorityInputs) -> f64 {
        0.3 + 0.7 * inputs.misalignment() + 0.3 * inputs.capability_norm()
            - 0.3 * state.government.alignment_research_funding
    }

    fn execute(&self, state: &mut WorldState, _rng: &mut SimRng) -> ActionOutcome {
        let funding = nudge(&mut state.government.alignment_research_funding, 0.1);
        let gain = TRAINING_ALIGNMENT_GAIN * state.government.alignment_research_funding;

        // Only models still being trained can absorb new techniques
        let mut improved = 0.0;
        for agent in state.agents.iter_mut().filter(|a| a.lifecycle == LifecycleState::Training) {
            improved += agent.apply_alignment_intervention(gain);
        }

        let event = action_event(state, self.id(), Severity::Minor, format!("Alignment research funding now {:.2}", state.government.alignment_research_funding));
        ActionOutcome::success("Alignment research funded")
            .effect("alignment_research_funding", funding)
            .effect("training_alignment_gain", improved)
            .event(event)
    }
}

pub struct FundSafetyInstitute;

impl GovernmentAction for FundSafetyInstitute {
    fn id(&self) -> ActionId {
        ActionId::FundSafetyInstitute
    }

    fn can_execute(&self, state: &WorldState) -> bool {
        state.government.evaluation.detection_strength() < 0.9
    }

    fn priority(&self, state: &WorldState, inputs: &PriorityInputs) -> f64 {
        0.25 + 0.4 * inputs.misalignment() + 0.4 * inputs.capability_norm()
            - 0.4 * state.government.evaluation.detection_strength()
    }

    fn execute(&self, state: &mut WorldState, _rng: &mut SimRng) -> ActionOutcome {
        let eval = &mut state.government.evaluation;
        let step = 0.03;
        nudge(&mut eval.benchmark_quality, step);
        nudge(&mut eval.alignment_test_quality, step);
        nudge(&mut eval.red_teaming, step);
        nudge(&mut eval.interpretability, step);
        let strength = eval.detection_strength();
        let legitimacy = nudge(&mut state.government.legitimacy, 0.01);

        let event = action_event(state, self.id(), Severity::Info, "National AI safety institute expanded");
        ActionOutcome::success("Safety institute funded")
            .effect("detection_strength", strength)
            .effect("legitimacy", legitimacy)
            .event(event)
    }
}
