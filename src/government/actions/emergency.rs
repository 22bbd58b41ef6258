//! Emergency powers

use crate::agents::lifecycle;
use crate::core::types::{AgentId, SimRng};
use crate::government::action::{major_policy_ready, ActionId, ActionOutcome, GovernmentAction};
use crate::government::actions::{action_event, enact_regulation, nudge};
use crate::government::priority::PriorityInputs;
use crate::state::events::Severity;
use crate::state::government::ComputeGovernance;
use crate::state::world::WorldState;
use crate::state::LifecycleState;

/// Revealed capability above which a training run is halted by a pause
const PAUSE_CAPABILITY_CUTOFF: f64 = 3.0;

pub struct DeclareEmergency;

impl GovernmentAction for DeclareEmergency {
    fn id(&self) -> ActionId {
        ActionId::DeclareEmergency
    }

    fn can_execute(&self, state: &WorldState) -> bool {
        if state.government.emergency_declared {
            return false;
        }
        let inputs = PriorityInputs::from_state(state);
        inputs.legitimacy < 0.3 || inputs.recent_escapes >= 2 || inputs.environmental_stress > 0.8
    }

    fn priority(&self, _state: &WorldState, inputs: &PriorityInputs) -> f64 {
        1.0 + inputs.escape_pressure() + (0.3 - inputs.legitimacy).max(0.0) * 3.0
            + (inputs.environmental_stress - 0.8).max(0.0) * 3.0
            + 0.5 * inputs.recent_catastrophes as f64
    }

    fn execute(&self, state: &mut WorldState, _rng: &mut SimRng) -> ActionOutcome {
        state.government.emergency_declared = true;
        let control = nudge(&mut state.government.control, 0.1);
        let legitimacy = nudge(&mut state.government.legitimacy, -0.03);
        tracing::warn!(month = state.month, "state of emergency declared");
        let event = action_event(state, self.id(), Severity::Critical, "National AI emergency declared");
        ActionOutcome::success("Emergency declared")
            .effect("control", control)
            .effect("legitimacy", legitimacy)
            .event(event)
    }
}

pub struct NationalizeCompute;

impl GovernmentAction for NationalizeCompute {
    fn id(&self) -> ActionId {
        ActionId::NationalizeCompute
    }

    fn can_execute(&self, state: &WorldState) -> bool {
        state.government.emergency_declared
            && state.government.compute_governance < ComputeGovernance::Nationalized
            && major_policy_ready(state)
    }

    fn priority(&self, _state: &WorldState, inputs: &PriorityInputs) -> f64 {
        1.2 * inputs.capability_norm() + inputs.escape_pressure() + 0.5 * inputs.misalignment()
    }

    fn execute(&self, state: &mut WorldState, _rng: &mut SimRng) -> ActionOutcome {
        state.government.compute_governance = ComputeGovernance::Nationalized;
        enact_regulation(state, self.id().as_str(), 0.2);
        let mut seized = 0.0;
        for org in state.organizations.iter_mut().filter(|o| !o.bankrupt) {
            for dc in org.data_centers.iter_mut().filter(|d| d.operational) {
                seized += dc.capacity;
            }
            org.priorities.race_intensity *= 0.5;
        }
        let control = nudge(&mut state.government.control, 0.15);
        let legitimacy = nudge(&mut state.government.legitimacy, -0.05);
        tracing::warn!(month = state.month, seized, "compute nationalized");
        let event = action_event(state, self.id(), Severity::Critical, format!("{seized:.0} units of compute placed under state control"));
        ActionOutcome::success("Compute nationalized")
            .effect("compute_seized", seized)
            .effect("control", control)
            .effect("legitimacy", legitimacy)
            .event(event)
    }
}

pub struct EmergencyTrainingPause;

impl EmergencyTrainingPause {
    /// Training runs whose evaluated capability crosses the cutoff
    fn halted_runs(state: &WorldState) -> Vec<AgentId> {
        state
            .agents
            .iter()
            .filter(|a| a.lifecycle == LifecycleState::Training)
            .filter(|a| a.revealed().capability.total() > PAUSE_CAPABILITY_CUTOFF)
            .map(|a| a.id)
            .collect()
    }
}

impl GovernmentAction for EmergencyTrainingPause {
    fn id(&self) -> ActionId {
        ActionId::EmergencyTrainingPause
    }

    fn can_execute(&self, state: &WorldState) -> bool {
        state.government.emergency_declared && !state.government.training_paused
    }

    fn priority(&self, _state: &WorldState, inputs: &PriorityInputs) -> f64 {
        0.8 + inputs.capability_norm() + 0.8 * inputs.misalignment() + inputs.escape_pressure()
    }

    fn execute(&self, state: &mut WorldState, _rng: &mut SimRng) -> ActionOutcome {
        state.government.training_paused = true;
        let mut halted = 0u32;
        for id in Self::halted_runs(state) {
            if let Some(agent) = state.agent_mut(id) {
                if lifecycle::retire(agent).is_ok() {
                    halted += 1;
                }
            }
        }
        let legitimacy = nudge(&mut state.government.legitimacy, -0.02);
        tracing::warn!(month = state.month, halted, "frontier training paused");
        let event = action_event(state, self.id(), Severity::Critical, format!("Frontier training paused; {halted} runs halted"));
        ActionOutcome::success("Training paused")
            .effect("runs_halted", halted as f64)
            .effect("legitimacy", legitimacy)
            .event(event)
    }
}
