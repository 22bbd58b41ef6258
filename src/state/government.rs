//! Government - the singleton regulator

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::types::{clamp01, AgentId, Month};

/// Structural regulation choice, set at most once per run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegulationType {
    LargeCompanies,
    ComputeThreshold,
    CapabilityCeiling,
}

/// Structural UBI choice, set at most once per run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UbiVariant {
    Generous,
    MeansTested,
    JobGuarantee,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ComputeGovernance {
    #[default]
    None,
    Monitoring,
    Caps,
    Nationalized,
}

impl ComputeGovernance {
    pub fn escalate(self) -> Self {
        match self {
            ComputeGovernance::None => ComputeGovernance::Monitoring,
            ComputeGovernance::Monitoring => ComputeGovernance::Caps,
            ComputeGovernance::Caps | ComputeGovernance::Nationalized => ComputeGovernance::Nationalized,
        }
    }
}

/// Evaluation investment vector, each entry in [0, 1]
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationInvestment {
    pub benchmark_quality: f64,
    pub alignment_test_quality: f64,
    pub red_teaming: f64,
    pub interpretability: f64,
}

impl EvaluationInvestment {
    /// Combined detection strength in [0, 1]; interpretability counts most
    pub fn detection_strength(&self) -> f64 {
        clamp01(
            self.benchmark_quality * 0.15
                + self.alignment_test_quality * 0.25
                + self.red_teaming * 0.25
                + self.interpretability * 0.35,
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Regulation {
    pub name: String,
    pub enacted_month: Month,
    /// Monthly drag on capability growth, [0, 1]
    pub growth_penalty: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Government {
    pub control: f64,
    pub legitimacy: f64,
    /// Expected actions per month before crisis multipliers
    pub base_action_frequency: f64,
    pub active_regulations: Vec<Regulation>,
    pub evaluation: EvaluationInvestment,
    pub last_major_policy_month: Option<Month>,

    pub regulation_type: Option<RegulationType>,
    pub ubi_variant: Option<UbiVariant>,
    pub compute_governance: ComputeGovernance,

    pub emergency_declared: bool,
    pub training_paused: bool,
    pub alignment_research_funding: f64,
    pub international_cooperation: f64,
    pub cyber_defense: f64,

    /// Set by a detection sweep; consumed by the detection awareness phase
    pub detection_ran_this_month: bool,
    /// Agents flagged by detection and awaiting removal
    pub flagged_agents: Vec<AgentId>,
    pub true_positive_detections: u32,
    pub false_positive_detections: u32,

    /// Successful executions per action id
    pub action_log: BTreeMap<String, u32>,
    /// Month of each action's latest successful execution
    #[serde(default)]
    pub last_executed: BTreeMap<String, Month>,
    /// Cumulative energy cost of successful actions
    pub energy_spent: f64,
}

impl Government {
    pub fn major_policy_ready(&self, month: Month, cooldown: u32) -> bool {
        match self.last_major_policy_month {
            None => true,
            Some(last) => month >= last.saturating_add(cooldown),
        }
    }

    pub fn has_regulation(&self, name: &str) -> bool {
        self.active_regulations.iter().any(|r| r.name == name)
    }

    /// Sum of growth penalties, capped so growth never reverses
    pub fn regulatory_drag(&self) -> f64 {
        self.active_regulations
            .iter()
            .map(|r| r.growth_penalty)
            .sum::<f64>()
            .min(0.8)
    }

    pub fn times_executed(&self, action_id: &str) -> u32 {
        self.action_log.get(action_id).copied().unwrap_or(0)
    }

    /// Months since `action_id` last succeeded, `None` if it never has
    pub fn months_since(&self, action_id: &str, now: Month) -> Option<u32> {
        self.last_executed.get(action_id).map(|&last| now.saturating_sub(last))
    }
}

impl Default for Government {
    fn default() -> Self {
        Self {
            control: 0.6,
            legitimacy: 0.6,
            base_action_frequency: 0.5,
            active_regulations: Vec::new(),
            evaluation: EvaluationInvestment {
                benchmark_quality: 0.3,
                alignment_test_quality: 0.2,
                red_teaming: 0.2,
                interpretability: 0.1,
            },
            last_major_policy_month: None,
            regulation_type: None,
            ubi_variant: None,
            compute_governance: ComputeGovernance::None,
            emergency_declared: false,
            training_paused: false,
            alignment_research_funding: 0.1,
            international_cooperation: 0.3,
            cyber_defense: 0.3,
            detection_ran_this_month: false,
            flagged_agents: Vec::new(),
            true_positive_detections: 0,
            false_positive_detections: 0,
            action_log: BTreeMap::new(),
            last_executed: BTreeMap::new(),
            energy_spent: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_months_since_last_execution() {
        let mut gov = Government::default();
        assert_eq!(gov.months_since("run_detection_sweep", 5), None);
        gov.last_executed.insert("run_detection_sweep".into(), 3);
        assert_eq!(gov.months_since("run_detection_sweep", 5), Some(2));
        assert_eq!(gov.months_since("run_detection_sweep", 3), Some(0));
    }

    #[test]
    fn test_major_policy_cooldown_boundary() {
        let mut gov = Government::default();
        assert!(gov.major_policy_ready(0, 12));
        gov.last_major_policy_month = Some(10);
        assert!(!gov.major_policy_ready(10, 12));
        assert!(!gov.major_policy_ready(21, 12));
        assert!(gov.major_policy_ready(22, 12));
    }

    #[test]
    fn test_compute_governance_escalates_and_saturates() {
        let level = ComputeGovernance::None.escalate().escalate().escalate().escalate();
        assert_eq!(level, ComputeGovernance::Nationalized);
    }

    #[test]
    fn test_regulatory_drag_is_capped() {
        let mut gov = Government::default();
        for i in 0..5 {
            gov.active_regulations.push(Regulation {
                name: format!("r{i}"),
                enacted_month: 0,
                growth_penalty: 0.3,
            });
        }
        assert_eq!(gov.regulatory_drag(), 0.8);
    }
}
