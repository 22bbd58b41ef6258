//! AI agent lifecycle and deception subsystem
//!
//! Owns the valid transitions of the agent state machine, the derivation of
//! observed values from ground truth, sleeper activation, and detection and
//! removal. Phases and government actions drive it through these functions
//! rather than writing agent fields directly.

pub mod deception;
pub mod detection;
pub mod factory;
pub mod lifecycle;

pub use deception::{activate_sleeper, derive, is_ground_truth_misaligned, observe_detection, transition_sleeper};
pub use detection::{remove_agent, run_detection, DetectionReport, RemovalOutcome};
pub use factory::{baseline_agent, create_agent};
pub use lifecycle::{can_transition, deploy, mark_escaped, retire, transition, LifecycleState};
