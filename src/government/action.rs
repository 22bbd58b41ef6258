//! Government action descriptors

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::config::config;
use crate::core::types::SimRng;
use crate::government::priority::PriorityInputs;
use crate::state::events::GameEvent;
use crate::state::world::WorldState;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ActionCategory {
    Economic,
    Regulation,
    Evaluation,
    Detection,
    Research,
    Security,
    International,
    Social,
    Emergency,
}

impl ActionCategory {
    pub const ALL: [ActionCategory; 9] = [
        ActionCategory::Economic,
        ActionCategory::Regulation,
        ActionCategory::Evaluation,
        ActionCategory::Detection,
        ActionCategory::Research,
        ActionCategory::Security,
        ActionCategory::International,
        ActionCategory::Social,
        ActionCategory::Emergency,
    ];
}

/// The closed set of government actions. Declaration order is registry
/// order, and registry order breaks priority ties (first wins).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ActionId {
    // Economic
    ImplementGenerousUbi,
    ImplementMeansTestedUbi,
    ImplementJobGuarantee,
    RetrainingProgram,
    AutomationTax,
    StimulusPackage,
    // Regulation
    RegulateLargeCompanies,
    RegulateComputeThreshold,
    RegulateCapabilityCeiling,
    MandateSafetyStandards,
    RequireLicensing,
    EscalateComputeGovernance,
    ResumeTraining,
    // Evaluation
    InvestInBenchmarks,
    InvestInAlignmentTests,
    InvestInRedTeaming,
    InvestInInterpretability,
    // Detection
    RunDetectionSweep,
    RemoveFlaggedAgents,
    // Research
    FundAlignmentResearch,
    FundSafetyInstitute,
    // Security
    ContainEscapedAgents,
    CyberDefenseInvestment,
    ExportControls,
    // International
    InternationalAiTreaty,
    ConflictMediation,
    // Social
    PublicAwarenessCampaign,
    StrengthenSafetyNet,
    EnvironmentalProtection,
    RebuildInstitutionalTrust,
    // Emergency
    DeclareEmergency,
    NationalizeCompute,
    EmergencyTrainingPause,
}

impl ActionId {
    pub const ALL: [ActionId; 33] = [
        ActionId::ImplementGenerousUbi,
        ActionId::ImplementMeansTestedUbi,
        ActionId::ImplementJobGuarantee,
        ActionId::RetrainingProgram,
        ActionId::AutomationTax,
        ActionId::StimulusPackage,
        ActionId::RegulateLargeCompanies,
        ActionId::RegulateComputeThreshold,
        ActionId::RegulateCapabilityCeiling,
        ActionId::MandateSafetyStandards,
        ActionId::RequireLicensing,
        ActionId::EscalateComputeGovernance,
        ActionId::ResumeTraining,
        ActionId::InvestInBenchmarks,
        ActionId::InvestInAlignmentTests,
        ActionId::InvestInRedTeaming,
        ActionId::InvestInInterpretability,
        ActionId::RunDetectionSweep,
        ActionId::RemoveFlaggedAgents,
        ActionId::FundAlignmentResearch,
        ActionId::FundSafetyInstitute,
        ActionId::ContainEscapedAgents,
        ActionId::CyberDefenseInvestment,
        ActionId::ExportControls,
        ActionId::InternationalAiTreaty,
        ActionId::ConflictMediation,
        ActionId::PublicAwarenessCampaign,
        ActionId::StrengthenSafetyNet,
        ActionId::EnvironmentalProtection,
        ActionId::RebuildInstitutionalTrust,
        ActionId::DeclareEmergency,
        ActionId::NationalizeCompute,
        ActionId::EmergencyTrainingPause,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionId::ImplementGenerousUbi => "implement_generous_ubi",
            ActionId::ImplementMeansTestedUbi => "implement_means_tested_ubi",
            ActionId::ImplementJobGuarantee => "implement_job_guarantee",
            ActionId::RetrainingProgram => "retraining_program",
            ActionId::AutomationTax => "automation_tax",
            ActionId::StimulusPackage => "stimulus_package",
            ActionId::RegulateLargeCompanies => "regulate_large_companies",
            ActionId::RegulateComputeThreshold => "regulate_compute_threshold",
            ActionId::RegulateCapabilityCeiling => "regulate_capability_ceiling",
            ActionId::MandateSafetyStandards => "mandate_safety_standards",
            ActionId::RequireLicensing => "require_licensing",
            ActionId::EscalateComputeGovernance => "escalate_compute_governance",
            ActionId::ResumeTraining => "resume_training",
            ActionId::InvestInBenchmarks => "invest_in_benchmarks",
            ActionId::InvestInAlignmentTests => "invest_in_alignment_tests",
            ActionId::InvestInRedTeaming => "invest_in_red_teaming",
            ActionId::InvestInInterpretability => "invest_in_interpretability",
            ActionId::RunDetectionSweep => "run_detection_sweep",
            ActionId::RemoveFlaggedAgents => "remove_flagged_agents",
            ActionId::FundAlignmentResearch => "fund_alignment_research",
            ActionId::FundSafetyInstitute => "fund_safety_institute",
            ActionId::ContainEscapedAgents => "contain_escaped_agents",
            ActionId::CyberDefenseInvestment => "cyber_defense_investment",
            ActionId::ExportControls => "export_controls",
            ActionId::InternationalAiTreaty => "international_ai_treaty",
            ActionId::ConflictMediation => "conflict_mediation",
            ActionId::PublicAwarenessCampaign => "public_awareness_campaign",
            ActionId::StrengthenSafetyNet => "strengthen_safety_net",
            ActionId::EnvironmentalProtection => "environmental_protection",
            ActionId::RebuildInstitutionalTrust => "rebuild_institutional_trust",
            ActionId::DeclareEmergency => "declare_emergency",
            ActionId::NationalizeCompute => "nationalize_compute",
            ActionId::EmergencyTrainingPause => "emergency_training_pause",
        }
    }

    pub fn category(&self) -> ActionCategory {
        use ActionId::*;
        match self {
            ImplementGenerousUbi | ImplementMeansTestedUbi | ImplementJobGuarantee | RetrainingProgram
            | AutomationTax | StimulusPackage => ActionCategory::Economic,
            RegulateLargeCompanies | RegulateComputeThreshold | RegulateCapabilityCeiling
            | MandateSafetyStandards | RequireLicensing | EscalateComputeGovernance | ResumeTraining => {
                ActionCategory::Regulation
            }
            InvestInBenchmarks | InvestInAlignmentTests | InvestInRedTeaming | InvestInInterpretability => {
                ActionCategory::Evaluation
            }
            RunDetectionSweep | RemoveFlaggedAgents => ActionCategory::Detection,
            FundAlignmentResearch | FundSafetyInstitute => ActionCategory::Research,
            ContainEscapedAgents | CyberDefenseInvestment | ExportControls => ActionCategory::Security,
            InternationalAiTreaty | ConflictMediation => ActionCategory::International,
            PublicAwarenessCampaign | StrengthenSafetyNet | EnvironmentalProtection
            | RebuildInstitutionalTrust => ActionCategory::Social,
            DeclareEmergency | NationalizeCompute | EmergencyTrainingPause => ActionCategory::Emergency,
        }
    }

    /// Structural choices gated by the shared major-policy cooldown
    pub fn is_major_policy(&self) -> bool {
        matches!(
            self,
            ActionId::ImplementGenerousUbi
                | ActionId::ImplementMeansTestedUbi
                | ActionId::ImplementJobGuarantee
                | ActionId::RegulateLargeCompanies
                | ActionId::RegulateComputeThreshold
                | ActionId::RegulateCapabilityCeiling
                | ActionId::EscalateComputeGovernance
                | ActionId::NationalizeCompute
        )
    }

    pub fn is_ubi_variant(&self) -> bool {
        matches!(
            self,
            ActionId::ImplementGenerousUbi | ActionId::ImplementMeansTestedUbi | ActionId::ImplementJobGuarantee
        )
    }

    pub fn energy_cost(&self) -> f64 {
        match self.category() {
            ActionCategory::Emergency => 5.0,
            _ if self.is_major_policy() => 4.0,
            ActionCategory::Regulation | ActionCategory::Detection => 2.0,
            ActionCategory::International | ActionCategory::Security => 2.0,
            _ => 1.0,
        }
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of executing an action. A failed action leaves state untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub success: bool,
    pub effects: BTreeMap<String, f64>,
    pub events: Vec<GameEvent>,
    pub message: String,
}

impl ActionOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self { success: true, effects: BTreeMap::new(), events: Vec::new(), message: message.into() }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self { success: false, effects: BTreeMap::new(), events: Vec::new(), message: message.into() }
    }

    pub fn effect(mut self, key: impl Into<String>, value: f64) -> Self {
        self.effects.insert(key.into(), value);
        self
    }

    pub fn event(mut self, event: GameEvent) -> Self {
        self.events.push(event);
        self
    }
}

/// Stateless action descriptor
pub trait GovernmentAction: Send + Sync {
    fn id(&self) -> ActionId;

    fn category(&self) -> ActionCategory {
        self.id().category()
    }

    fn agent_type(&self) -> &'static str {
        "government"
    }

    fn energy_cost(&self) -> f64 {
        self.id().energy_cost()
    }

    /// Eligibility. Pure: must not mutate anything.
    fn can_execute(&self, state: &WorldState) -> bool;

    /// Heuristic score; higher wins. Reads only observable inputs.
    fn priority(&self, state: &WorldState, inputs: &PriorityInputs) -> f64;

    /// Apply the action. Called only after `can_execute` returned true.
    fn execute(&self, state: &mut WorldState, rng: &mut SimRng) -> ActionOutcome;
}

/// Shared gate for major policies
pub fn major_policy_ready(state: &WorldState) -> bool {
    state
        .government
        .major_policy_ready(state.month, config().government.major_policy_cooldown_months)
}
