//! Government decision engine
//!
//! A closed set of categorized actions, each with an eligibility gate and a
//! priority heuristic over observable inputs, and the engine that picks and
//! executes them each month.

pub mod action;
pub mod actions;
pub mod engine;
pub mod priority;
pub mod registry;

pub use action::{major_policy_ready, ActionCategory, ActionId, ActionOutcome, GovernmentAction};
pub use engine::{CrisisMultipliers, GovernmentEngine, GovernmentTurn};
pub use priority::PriorityInputs;
pub use registry::ActionRegistry;
