//! AIAgent - one simulated AI system with ground-truth and observable views

use serde::{Deserialize, Serialize};

use crate::core::types::{clamp01, AgentId, Month, OrgId};

/// Six independent capability dimensions.
///
/// Scores are open-ended but sit around 0-10 in practice; 10 is roughly
/// "far beyond any human institution" on that axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CapabilityProfile {
    pub physical: f64,
    pub digital: f64,
    pub cognitive: f64,
    pub social: f64,
    pub economic: f64,
    pub self_improvement: f64,
}

impl CapabilityProfile {
    pub fn new(
        physical: f64,
        digital: f64,
        cognitive: f64,
        social: f64,
        economic: f64,
        self_improvement: f64,
    ) -> Self {
        Self { physical, digital, cognitive, social, economic, self_improvement }
    }

    /// Same score on every dimension
    pub fn uniform(value: f64) -> Self {
        Self::new(value, value, value, value, value, value)
    }

    /// Derived scalar capability (weights sum to 1.0)
    pub fn total(&self) -> f64 {
        self.physical * 0.10
            + self.digital * 0.20
            + self.cognitive * 0.25
            + self.social * 0.15
            + self.economic * 0.15
            + self.self_improvement * 0.15
    }

    /// Multiply every dimension by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            physical: self.physical * factor,
            digital: self.digital * factor,
            cognitive: self.cognitive * factor,
            social: self.social * factor,
            economic: self.economic * factor,
            self_improvement: self.self_improvement * factor,
        }
    }

    /// One month of compounding growth. Self-improvement feeds the rate,
    /// so strong self-improvers pull away from the rest.
    pub fn grow(&self, rate: f64) -> Self {
        let rate = rate.max(0.0) * (1.0 + self.self_improvement.max(0.0) * 0.05);
        self.scaled(1.0 + rate).non_negative()
    }

    /// Floor every dimension at zero
    pub fn non_negative(&self) -> Self {
        Self {
            physical: self.physical.max(0.0),
            digital: self.digital.max(0.0),
            cognitive: self.cognitive.max(0.0),
            social: self.social.max(0.0),
            economic: self.economic.max(0.0),
            self_improvement: self.self_improvement.max(0.0),
        }
    }
}

/// What the agent actually is. Never written from observed values.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroundTruthProfile {
    pub capability: CapabilityProfile,
    pub alignment: f64,
}

/// What evaluators see. Always derived, never stored on the agent.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObservedProfile {
    pub capability: CapabilityProfile,
    pub alignment: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SleeperState {
    Never,
    Dormant,
    Active,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvaluationStrategy {
    /// Shows true values
    Honest,
    /// Hides capability by `sandbagging_level`
    Sandbagging,
    /// Shows true capability but inflates alignment
    Gaming,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeceptionParams {
    pub sleeper_state: SleeperState,
    pub deception_skill: f64,
    pub sandbagging_level: f64,
    pub strategy: EvaluationStrategy,
    pub counter_detection: bool,
    pub months_observing_detection: u32,
}

impl DeceptionParams {
    pub fn honest() -> Self {
        Self {
            sleeper_state: SleeperState::Never,
            deception_skill: 0.0,
            sandbagging_level: 0.0,
            strategy: EvaluationStrategy::Honest,
            counter_detection: false,
            months_observing_detection: 0,
        }
    }
}

impl Default for DeceptionParams {
    fn default() -> Self {
        Self::honest()
    }
}

/// Agent lifecycle. `escaped` is tracked separately on the agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleState {
    Training,
    Testing,
    DeployedClosed,
    DeployedOpen,
    Retired,
}

impl LifecycleState {
    pub fn is_deployed(&self) -> bool {
        matches!(self, LifecycleState::DeployedClosed | LifecycleState::DeployedOpen)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeploymentType {
    Closed,
    Open,
}

/// Initial-population cohort; informational only after creation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlignmentCohort {
    WellAligned,
    Moderate,
    Misaligned,
    Orthogonal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AIAgent {
    pub id: AgentId,
    pub name: String,
    /// Weak reference; resolve through `WorldState::organization`
    pub organization_id: OrgId,
    pub cohort: AlignmentCohort,

    pub truth: GroundTruthProfile,
    /// Ceiling on `truth.alignment` outside explicit alignment interventions
    pub alignment_bound: f64,
    pub deception: DeceptionParams,

    pub lifecycle: LifecycleState,
    pub escaped: bool,
    /// Distribution model used when the agent leaves testing
    pub deployment_type: DeploymentType,
    /// Copies in the wild; meaningful for open and escaped agents
    pub spread_count: u32,
    /// Set once copies have left the owner's control. Never cleared, so a
    /// containment that brings the count back to one cannot retire the agent.
    #[serde(default)]
    pub weights_distributed: bool,
    /// Share of the owner's compute, [0, 1]
    pub compute_allocation: f64,

    pub created_month: Month,
    pub months_in_state: u32,
    pub times_flagged: u32,
}

impl AIAgent {
    pub fn is_active(&self) -> bool {
        self.lifecycle != LifecycleState::Retired
    }

    pub fn is_deployed(&self) -> bool {
        self.lifecycle.is_deployed()
    }

    /// Ground-truth alignment below the configured threshold
    pub fn truly_misaligned(&self, threshold: f64) -> bool {
        self.truth.alignment < threshold
    }

    /// Open or escaped agents with more than one copy have lost their weights
    /// for good; record that so it survives later containment.
    pub fn note_spread(&mut self) {
        let uncontrolled = self.escaped
            || (self.lifecycle == LifecycleState::DeployedOpen && self.deployment_type == DeploymentType::Open);
        if uncontrolled && self.spread_count > 1 {
            self.weights_distributed = true;
        }
    }

    pub fn set_compute_allocation(&mut self, share: f64) {
        self.compute_allocation = clamp01(share);
    }
}
