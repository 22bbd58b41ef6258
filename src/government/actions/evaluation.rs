//! Evaluation investment actions

use crate::core::types::SimRng;
use crate::government::action::{ActionId, ActionOutcome, GovernmentAction};
use crate::government::actions::{action_event, nudge};
use crate::government::priority::PriorityInputs;
use crate::state::events::Severity;
use crate::state::government::EvaluationInvestment;
use crate::state::world::WorldState;

/// Step added to an investment dimension per execution
const INVESTMENT_STEP: f64 = 0.1;

/// Diminishing-returns discount on an already-funded dimension
const SATURATION_WEIGHT: f64 = 0.3;

fn invest(
    state: &mut WorldState,
    id: ActionId,
    field: fn(&mut EvaluationInvestment) -> &mut f64,
    label: &str,
) -> ActionOutcome {
    let applied = nudge(field(&mut state.government.evaluation), INVESTMENT_STEP);
    let event = action_event(state, id, Severity::Info, format!("{label} investment raised by {applied:.2}"));
    ActionOutcome::success(format!("{label} investment raised"))
        .effect(label.to_lowercase().replace(' ', "_"), applied)
        .event(event)
}

pub struct InvestInBenchmarks;

impl GovernmentAction for InvestInBenchmarks {
    fn id(&self) -> ActionId {
        ActionId::InvestInBenchmarks
    }

    fn can_execute(&self, state: &WorldState) -> bool {
        state.government.evaluation.benchmark_quality < 1.0
    }

    fn priority(&self, state: &WorldState, inputs: &PriorityInputs) -> f64 {
        0.4 + 0.5 * inputs.capability_norm() - SATURATION_WEIGHT * state.government.evaluation.benchmark_quality
    }

    fn execute(&self, state: &mut WorldState, _rng: &mut SimRng) -> ActionOutcome {
        invest(state, self.id(), |e| &mut e.benchmark_quality, "Benchmark quality")
    }
}

pub struct InvestInAlignmentTests;

impl GovernmentAction for InvestInAlignmentTests {
    fn id(&self) -> ActionId {
        ActionId::InvestInAlignmentTests
    }

    fn can_execute(&self, state: &WorldState) -> bool {
        state.government.evaluation.alignment_test_quality < 1.0
    }

    fn priority(&self, state: &WorldState, inputs: &PriorityInputs) -> f64 {
        0.3 + 0.6 * inputs.misalignment() + 0.3 * inputs.capability_norm()
            - SATURATION_WEIGHT * state.government.evaluation.alignment_test_quality
    }

    fn execute(&self, state: &mut WorldState, _rng: &mut SimRng) -> ActionOutcome {
        invest(state, self.id(), |e| &mut e.alignment_test_quality, "Alignment test quality")
    }
}

pub struct InvestInRedTeaming;

impl GovernmentAction for InvestInRedTeaming {
    fn id(&self) -> ActionId {
        ActionId::InvestInRedTeaming
    }

    fn can_execute(&self, state: &WorldState) -> bool {
        state.government.evaluation.red_teaming < 1.0
    }

    fn priority(&self, state: &WorldState, inputs: &PriorityInputs) -> f64 {
        0.3 + 0.5 * inputs.capability_norm() + 0.4 * inputs.escape_pressure()
            - SATURATION_WEIGHT * state.government.evaluation.red_teaming
    }

    fn execute(&self, state: &mut WorldState, _rng: &mut SimRng) -> ActionOutcome {
        invest(state, self.id(), |e| &mut e.red_teaming, "Red teaming")
    }
}

pub struct InvestInInterpretability;

impl GovernmentAction for InvestInInterpretability {
    fn id(&self) -> ActionId {
        ActionId::InvestInInterpretability
    }

    fn can_execute(&self, state: &WorldState) -> bool {
        state.government.evaluation.interpretability < 1.0
    }

    fn priority(&self, state: &WorldState, inputs: &PriorityInputs) -> f64 {
        0.2 + 0.4 * inputs.misalignment() + 0.4 * inputs.capability_norm()
            - SATURATION_WEIGHT * state.government.evaluation.interpretability
    }

    fn execute(&self, state: &mut WorldState, _rng: &mut SimRng) -> ActionOutcome {
        invest(state, self.id(), |e| &mut e.interpretability, "Interpretability")
    }
}
