//! World state records
//!
//! Pure data. Behavior lives in `agents`, `phases`, and `government`.

pub mod agent;
pub mod environment;
pub mod events;
pub mod government;
pub mod organization;
pub mod outcome;
pub mod society;
pub mod world;

pub use agent::{
    AIAgent, AlignmentCohort, CapabilityProfile, DeceptionParams, DeploymentType, EvaluationStrategy,
    GroundTruthProfile, LifecycleState, ObservedProfile, SleeperState,
};
pub use environment::{ConflictState, EnvironmentalAccumulation};
pub use events::{EventLog, EventType, GameEvent, Severity};
pub use government::{ComputeGovernance, EvaluationInvestment, Government, Regulation, RegulationType, UbiVariant};
pub use organization::{ComputeStrategy, DataCenter, OrgPriorities, Organization};
pub use outcome::{ExtinctionState, MonthlyMetrics, Outcome, OutcomeMetrics};
pub use society::{EconomicStage, Society};
pub use world::WorldState;
