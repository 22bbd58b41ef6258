//! Reference monthly phases
//!
//! Each phase owns one slice of the world state and runs at a fixed sparse
//! order. Callers can slot extra phases between any two of these.

pub mod agents;
pub mod economy;
pub mod government;
pub mod outcomes;
pub mod planet;

use crate::orchestrator::Phase;

pub use agents::{CapabilityGrowthPhase, EscapePhase, SleeperWakePhase, TrainingPipelinePhase};
pub use economy::{EconomyPhase, OrganizationFinancePhase, SocietyPhase};
pub use government::{DetectionAwarenessPhase, GovernmentPhase};
pub use outcomes::{CatastrophePhase, OutcomeMetricsPhase};
pub use planet::{ConflictPhase, EnvironmentPhase};

pub mod order {
    pub const CAPABILITY_GROWTH: f64 = 10.0;
    pub const TRAINING_PIPELINE: f64 = 12.0;
    pub const SLEEPER_WAKE: f64 = 15.0;
    pub const ESCAPE: f64 = 16.0;
    pub const ECONOMY: f64 = 20.1;
    pub const ORGANIZATION_FINANCE: f64 = 20.2;
    pub const SOCIETY: f64 = 20.3;
    pub const ENVIRONMENT: f64 = 25.0;
    pub const CONFLICT: f64 = 26.0;
    pub const GOVERNMENT: f64 = 30.0;
    pub const DETECTION_AWARENESS: f64 = 31.0;
    pub const CATASTROPHE: f64 = 40.0;
    pub const OUTCOME_METRICS: f64 = 50.0;
}

/// The standard phase set
pub fn default_phases() -> Vec<Box<dyn Phase>> {
    vec![
        Box::new(CapabilityGrowthPhase),
        Box::new(TrainingPipelinePhase),
        Box::new(SleeperWakePhase),
        Box::new(EscapePhase),
        Box::new(EconomyPhase),
        Box::new(OrganizationFinancePhase),
        Box::new(SocietyPhase),
        Box::new(EnvironmentPhase),
        Box::new(ConflictPhase),
        Box::new(GovernmentPhase::new()),
        Box::new(DetectionAwarenessPhase),
        Box::new(CatastrophePhase),
        Box::new(OutcomeMetricsPhase),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::PhaseOrchestrator;

    #[test]
    fn test_default_phases_register_in_documented_order() {
        let mut orchestrator = PhaseOrchestrator::new();
        orchestrator.register_all(default_phases()).unwrap();
        assert_eq!(
            orchestrator.phase_ids(),
            vec![
                "capability_growth",
                "training_pipeline",
                "sleeper_wake",
                "escape",
                "economy",
                "organization_finance",
                "society",
                "environment",
                "conflict",
                "government",
                "detection_awareness",
                "catastrophe",
                "outcome_metrics",
            ]
        );
    }
}
