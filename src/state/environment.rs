//! Planetary and conflict accumulators

use serde::{Deserialize, Serialize};

/// Environmental tracks. Owned by the environment phase, readable by all.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalAccumulation {
    pub resource_depletion: f64,
    pub pollution: f64,
    /// 1.0 = stable climate
    pub climate_stability: f64,
    /// 1.0 = intact biosphere
    pub biodiversity: f64,
    pub protection_level: f64,
}

impl EnvironmentalAccumulation {
    /// Worst track expressed as stress in [0, 1]
    pub fn stress(&self) -> f64 {
        self.resource_depletion
            .max(self.pollution)
            .max(1.0 - self.climate_stability)
            .max(1.0 - self.biodiversity)
    }
}

impl Default for EnvironmentalAccumulation {
    fn default() -> Self {
        Self {
            resource_depletion: 0.3,
            pollution: 0.3,
            climate_stability: 0.7,
            biodiversity: 0.65,
            protection_level: 0.2,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConflictState {
    pub global_tension: f64,
    pub active_conflicts: u32,
    pub cyber_incidents: u32,
    pub mediation_strength: f64,
}

impl Default for ConflictState {
    fn default() -> Self {
        Self {
            global_tension: 0.3,
            active_conflicts: 0,
            cyber_incidents: 0,
            mediation_strength: 0.2,
        }
    }
}
