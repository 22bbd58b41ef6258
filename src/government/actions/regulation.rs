//! Regulation actions, including the mutually exclusive regulation types

use crate::core::types::SimRng;
use crate::government::action::{major_policy_ready, ActionId, ActionOutcome, GovernmentAction};
use crate::government::actions::{action_event, enact_regulation, nudge};
use crate::government::priority::PriorityInputs;
use crate::state::events::Severity;
use crate::state::government::{ComputeGovernance, RegulationType};
use crate::state::world::WorldState;

fn regulation_type_eligible(state: &WorldState, min_capability: f64) -> bool {
    state.government.regulation_type.is_none()
        && major_policy_ready(state)
        && PriorityInputs::from_state(state).observable_capability >= min_capability
}

fn adopt_regulation_type(
    state: &mut WorldState,
    id: ActionId,
    kind: RegulationType,
    growth_penalty: f64,
) -> ActionOutcome {
    state.government.regulation_type = Some(kind);
    enact_regulation(state, id.as_str(), growth_penalty);
    let control = nudge(&mut state.government.control, 0.05);
    tracing::info!(month = state.month, ?kind, "regulation type adopted");
    let event = action_event(state, id, Severity::Major, format!("{kind:?} regulation regime adopted"));
    ActionOutcome::success(format!("{kind:?} regulation adopted"))
        .effect("growth_penalty", growth_penalty)
        .effect("control", control)
        .event(event)
}

pub struct RegulateLargeCompanies;

impl GovernmentAction for RegulateLargeCompanies {
    fn id(&self) -> ActionId {
        ActionId::RegulateLargeCompanies
    }

    fn can_execute(&self, state: &WorldState) -> bool {
        regulation_type_eligible(state, 3.0)
    }

    fn priority(&self, _state: &WorldState, inputs: &PriorityInputs) -> f64 {
        0.8 * inputs.capability_norm() + 0.6 * inputs.misalignment() + 0.3 * inputs.legitimacy
    }

    fn execute(&self, state: &mut WorldState, _rng: &mut SimRng) -> ActionOutcome {
        adopt_regulation_type(state, self.id(), RegulationType::LargeCompanies, 0.08)
    }
}

pub struct RegulateComputeThreshold;

impl GovernmentAction for RegulateComputeThreshold {
    fn id(&self) -> ActionId {
        ActionId::RegulateComputeThreshold
    }

    fn can_execute(&self, state: &WorldState) -> bool {
        regulation_type_eligible(state, 3.0)
    }

    fn priority(&self, _state: &WorldState, inputs: &PriorityInputs) -> f64 {
        0.9 * inputs.capability_norm() + 0.5 * inputs.misalignment() + 0.2 * (1.0 - inputs.trust)
    }

    fn execute(&self, state: &mut WorldState, _rng: &mut SimRng) -> ActionOutcome {
        adopt_regulation_type(state, self.id(), RegulationType::ComputeThreshold, 0.1)
    }
}

pub struct RegulateCapabilityCeiling;

impl GovernmentAction for RegulateCapabilityCeiling {
    fn id(&self) -> ActionId {
        ActionId::RegulateCapabilityCeiling
    }

    fn can_execute(&self, state: &WorldState) -> bool {
        regulation_type_eligible(state, 4.0)
    }

    fn priority(&self, _state: &WorldState, inputs: &PriorityInputs) -> f64 {
        1.0 * inputs.capability_norm() + 0.7 * inputs.misalignment()
    }

    fn execute(&self, state: &mut WorldState, _rng: &mut SimRng) -> ActionOutcome {
        adopt_regulation_type(state, self.id(), RegulationType::CapabilityCeiling, 0.15)
    }
}

pub struct MandateSafetyStandards;

impl GovernmentAction for MandateSafetyStandards {
    fn id(&self) -> ActionId {
        ActionId::MandateSafetyStandards
    }

    fn can_execute(&self, state: &WorldState) -> bool {
        !state.government.has_regulation(self.id().as_str())
    }

    fn priority(&self, _state: &WorldState, inputs: &PriorityInputs) -> f64 {
        0.6 * inputs.misalignment() + 0.3 * inputs.capability_norm() + 0.2
    }

    fn execute(&self, state: &mut WorldState, _rng: &mut SimRng) -> ActionOutcome {
        enact_regulation(state, self.id().as_str(), 0.03);
        for org in state.organizations.iter_mut().filter(|o| !o.bankrupt) {
            nudge(&mut org.priorities.safety, 0.1);
        }
        let event = action_event(state, self.id(), Severity::Minor, "Safety standards mandated for AI labs");
        ActionOutcome::success("Safety standards mandated")
            .effect("org_safety_priority", 0.1)
            .event(event)
    }
}

pub struct RequireLicensing;

impl GovernmentAction for RequireLicensing {
    fn id(&self) -> ActionId {
        ActionId::RequireLicensing
    }

    fn can_execute(&self, state: &WorldState) -> bool {
        !state.government.has_regulation(self.id().as_str())
            && PriorityInputs::from_state(state).observable_capability >= 2.5
    }

    fn priority(&self, _state: &WorldState, inputs: &PriorityInputs) -> f64 {
        0.5 * inputs.capability_norm() + 0.4 * (1.0 - inputs.trust)
    }

    fn execute(&self, state: &mut WorldState, _rng: &mut SimRng) -> ActionOutcome {
        enact_regulation(state, self.id().as_str(), 0.04);
        let control = nudge(&mut state.government.control, 0.03);
        let event = action_event(state, self.id(), Severity::Minor, "Frontier model licensing required");
        ActionOutcome::success("Licensing regime introduced")
            .effect("control", control)
            .event(event)
    }
}

pub struct EscalateComputeGovernance;

impl GovernmentAction for EscalateComputeGovernance {
    fn id(&self) -> ActionId {
        ActionId::EscalateComputeGovernance
    }

    fn can_execute(&self, state: &WorldState) -> bool {
        state.government.compute_governance < ComputeGovernance::Caps
            && major_policy_ready(state)
            && PriorityInputs::from_state(state).observable_capability >= 3.0
    }

    fn priority(&self, _state: &WorldState, inputs: &PriorityInputs) -> f64 {
        1.1 * inputs.capability_norm() + 0.5 * inputs.misalignment() + 0.6 * inputs.escape_pressure()
    }

    fn execute(&self, state: &mut WorldState, _rng: &mut SimRng) -> ActionOutcome {
        let level = state.government.compute_governance.escalate();
        state.government.compute_governance = level;
        enact_regulation(state, &format!("compute_governance_{level:?}").to_lowercase(), 0.08);
        let control = nudge(&mut state.government.control, 0.06);
        tracing::info!(month = state.month, ?level, "compute governance escalated");
        let event = action_event(state, self.id(), Severity::Major, format!("Compute governance raised to {level:?}"));
        ActionOutcome::success(format!("Compute governance at {level:?}"))
            .effect("control", control)
            .event(event)
    }
}

pub struct ResumeTraining;

impl GovernmentAction for ResumeTraining {
    fn id(&self) -> ActionId {
        ActionId::ResumeTraining
    }

    fn can_execute(&self, state: &WorldState) -> bool {
        let inputs = PriorityInputs::from_state(state);
        state.government.training_paused && inputs.average_alignment > 0.6 && inputs.recent_escapes == 0
    }

    fn priority(&self, _state: &WorldState, inputs: &PriorityInputs) -> f64 {
        0.5 * inputs.average_alignment + 0.4 * inputs.unemployment.min(0.3) + 0.2 * (1.0 - inputs.control)
    }

    fn execute(&self, state: &mut WorldState, _rng: &mut SimRng) -> ActionOutcome {
        state.government.training_paused = false;
        let event = action_event(state, self.id(), Severity::Minor, "Frontier training pause lifted");
        ActionOutcome::success("Training resumed").event(event)
    }
}
