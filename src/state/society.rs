//! Society and economy accumulators

use serde::{Deserialize, Serialize};

/// Economic transition stage, keyed by unemployment band
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EconomicStage {
    /// Unemployment in [0.0, 0.2]
    PreDisruption,
    /// Unemployment in (0.2, 0.5]
    Displacement,
    /// Unemployment in (0.5, 0.8]
    Transition,
    /// Unemployment above 0.8, only reachable with a UBI in place
    PostScarcity,
}

impl EconomicStage {
    /// Documented unemployment range (inclusive bounds)
    pub fn unemployment_range(&self) -> (f64, f64) {
        match self {
            EconomicStage::PreDisruption => (0.0, 0.2),
            EconomicStage::Displacement => (0.2, 0.5),
            EconomicStage::Transition => (0.5, 0.8),
            EconomicStage::PostScarcity => (0.8, 1.0),
        }
    }

    /// Stage for an unemployment level. Without a UBI the economy
    /// stalls in `Transition` instead of reaching post-scarcity.
    pub fn for_unemployment(unemployment: f64, ubi_active: bool) -> Self {
        if unemployment <= 0.2 {
            EconomicStage::PreDisruption
        } else if unemployment <= 0.5 {
            EconomicStage::Displacement
        } else if unemployment <= 0.8 || !ubi_active {
            EconomicStage::Transition
        } else {
            EconomicStage::PostScarcity
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Society {
    pub unemployment: f64,
    pub economic_stage: EconomicStage,
    pub trust_in_ai: f64,
    pub social_stability: f64,
    pub wealth_inequality: f64,
    /// Share of displaced workers the retraining system can absorb
    pub retraining_capacity: f64,
    /// Monthly transfer as a share of median income; 0 without UBI
    pub ubi_support: f64,
    pub public_awareness: f64,
}

impl Default for Society {
    fn default() -> Self {
        Self {
            unemployment: 0.05,
            economic_stage: EconomicStage::PreDisruption,
            trust_in_ai: 0.6,
            social_stability: 0.7,
            wealth_inequality: 0.4,
            retraining_capacity: 0.1,
            ubi_support: 0.0,
            public_awareness: 0.3,
        }
    }
}
