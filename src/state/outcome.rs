//! Outcome probabilities and the monthly metrics series

use serde::{Deserialize, Serialize};

use crate::core::types::Month;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Utopia,
    Dystopia,
    Extinction,
    Ongoing,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtinctionState {
    pub triggered: bool,
    pub cause: Option<String>,
    pub month: Option<Month>,
}

/// Normalised outcome probabilities. Sum to 1.0 after each metrics phase.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutcomeMetrics {
    pub utopia_probability: f64,
    pub dystopia_probability: f64,
    pub extinction_probability: f64,
    pub quality_of_life: f64,
    /// Consecutive months the leading outcome stayed above the lock-in threshold
    pub lock_in_streak: u32,
    pub leading_outcome: Outcome,
}

impl OutcomeMetrics {
    /// Highest-probability outcome among the three terminal attractors
    pub fn leading(&self) -> (Outcome, f64) {
        let mut best = (Outcome::Utopia, self.utopia_probability);
        if self.dystopia_probability > best.1 {
            best = (Outcome::Dystopia, self.dystopia_probability);
        }
        if self.extinction_probability > best.1 {
            best = (Outcome::Extinction, self.extinction_probability);
        }
        best
    }
}

impl Default for OutcomeMetrics {
    fn default() -> Self {
        Self {
            utopia_probability: 1.0 / 3.0,
            dystopia_probability: 1.0 / 3.0,
            extinction_probability: 1.0 / 3.0,
            quality_of_life: 0.6,
            lock_in_streak: 0,
            leading_outcome: Outcome::Ongoing,
        }
    }
}

/// One row of the time series produced by a run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonthlyMetrics {
    pub month: Month,
    pub unemployment: f64,
    pub trust_in_ai: f64,
    pub legitimacy: f64,
    pub control: f64,
    pub average_true_alignment: f64,
    pub average_revealed_alignment: f64,
    pub max_true_capability: f64,
    pub environmental_stress: f64,
    pub global_tension: f64,
    pub utopia_probability: f64,
    pub dystopia_probability: f64,
    pub extinction_probability: f64,
    pub active_agents: u32,
    pub escaped_agents: u32,
    pub active_sleepers: u32,
}
