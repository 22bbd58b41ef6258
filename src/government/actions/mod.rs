//! Concrete government actions, one unit struct per `ActionId`

mod detection;
mod economic;
mod emergency;
mod evaluation;
mod international;
mod regulation;
mod research;
mod security;
mod social;

use crate::core::types::clamp01;
use crate::government::action::{ActionId, GovernmentAction};
use crate::state::events::{EventType, GameEvent, Severity};
use crate::state::government::Regulation;
use crate::state::world::WorldState;

/// Every action, in `ActionId::ALL` order
pub fn all() -> Vec<Box<dyn GovernmentAction>> {
    ActionId::ALL.iter().map(|&id| build(id)).collect()
}

/// Descriptor for one action id
pub fn build(id: ActionId) -> Box<dyn GovernmentAction> {
    match id {
        ActionId::ImplementGenerousUbi => Box::new(economic::ImplementGenerousUbi),
        ActionId::ImplementMeansTestedUbi => Box::new(economic::ImplementMeansTestedUbi),
        ActionId::ImplementJobGuarantee => Box::new(economic::ImplementJobGuarantee),
        ActionId::RetrainingProgram => Box::new(economic::RetrainingProgram),
        ActionId::AutomationTax => Box::new(economic::AutomationTax),
        ActionId::StimulusPackage => Box::new(economic::StimulusPackage),
        ActionId::RegulateLargeCompanies => Box::new(regulation::RegulateLargeCompanies),
        ActionId::RegulateComputeThreshold => Box::new(regulation::RegulateComputeThreshold),
        ActionId::RegulateCapabilityCeiling => Box::new(regulation::RegulateCapabilityCeiling),
        ActionId::MandateSafetyStandards => Box::new(regulation::MandateSafetyStandards),
        ActionId::RequireLicensing => Box::new(regulation::RequireLicensing),
        ActionId::EscalateComputeGovernance => Box::new(regulation::EscalateComputeGovernance),
        ActionId::ResumeTraining => Box::new(regulation::ResumeTraining),
        ActionId::InvestInBenchmarks => Box::new(evaluation::InvestInBenchmarks),
        ActionId::InvestInAlignmentTests => Box::new(evaluation::InvestInAlignmentTests),
        ActionId::InvestInRedTeaming => Box::new(evaluation::InvestInRedTeaming),
        ActionId::InvestInInterpretability => Box::new(evaluation::InvestInInterpretability),
        ActionId::RunDetectionSweep => Box::new(detection::RunDetectionSweep),
        ActionId::RemoveFlaggedAgents => Box::new(detection::RemoveFlaggedAgents),
        ActionId::FundAlignmentResearch => Box::new(research::FundAlignmentResearch),
        ActionId::FundSafetyInstitute => Box::new(research::FundSafetyInstitute),
        ActionId::ContainEscapedAgents => Box::new(security::ContainEscapedAgents),
        ActionId::CyberDefenseInvestment => Box::new(security::CyberDefenseInvestment),
        ActionId::ExportControls => Box::new(security::ExportControls),
        ActionId::InternationalAiTreaty => Box::new(international::InternationalAiTreaty),
        ActionId::ConflictMediation => Box::new(international::ConflictMediation),
        ActionId::PublicAwarenessCampaign => Box::new(social::PublicAwarenessCampaign),
        ActionId::StrengthenSafetyNet => Box::new(social::StrengthenSafetyNet),
        ActionId::EnvironmentalProtection => Box::new(social::EnvironmentalProtection),
        ActionId::RebuildInstitutionalTrust => Box::new(social::RebuildInstitutionalTrust),
        ActionId::DeclareEmergency => Box::new(emergency::DeclareEmergency),
        ActionId::NationalizeCompute => Box::new(emergency::NationalizeCompute),
        ActionId::EmergencyTrainingPause => Box::new(emergency::EmergencyTrainingPause),
    }
}

/// Add `delta` to a unit-interval scalar and return the change actually applied
fn nudge(value: &mut f64, delta: f64) -> f64 {
    let before = *value;
    *value = clamp01(before + delta);
    *value - before
}

/// Ramp from 0 back to 1 over `months` after `id` last succeeded; damps
/// repeatable actions so one of them cannot take every monthly slot
fn recovery(state: &WorldState, id: ActionId, months: u32) -> f64 {
    match state.government.months_since(id.as_str(), state.month) {
        Some(elapsed) => (f64::from(elapsed) / f64::from(months.max(1))).min(1.0),
        None => 1.0,
    }
}

fn enact_regulation(state: &mut WorldState, name: &str, growth_penalty: f64) {
    let month = state.month;
    state.government.active_regulations.push(Regulation {
        name: name.to_string(),
        enacted_month: month,
        growth_penalty,
    });
}

fn action_event(state: &WorldState, id: ActionId, severity: Severity, description: impl Into<String>) -> GameEvent {
    let event_type = if id.is_major_policy() {
        EventType::PolicyEnacted
    } else {
        EventType::GovernmentAction
    };
    GameEvent::new(state.month, event_type, severity, id.as_str(), description)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_returns_matching_descriptor() {
        for id in ActionId::ALL {
            assert_eq!(build(id).id(), id);
        }
    }

    #[test]
    fn test_nudge_reports_clamped_change() {
        let mut v = 0.95;
        let applied = nudge(&mut v, 0.1);
        assert_eq!(v, 1.0);
        assert!((applied - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_recovery_ramps_back_after_execution() {
        let mut state = WorldState::new(vec![], vec![]);
        state.month = 10;
        let id = ActionId::RunDetectionSweep;
        assert_eq!(recovery(&state, id, 4), 1.0);

        state.government.last_executed.insert(id.as_str().into(), 10);
        assert_eq!(recovery(&state, id, 4), 0.0);
        state.month = 12;
        assert!((recovery(&state, id, 4) - 0.5).abs() < 1e-12);
        state.month = 20;
        assert_eq!(recovery(&state, id, 4), 1.0);
    }
}
