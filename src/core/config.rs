//! Simulation configuration with documented constants
//!
//! All tuning numbers the core relies on are collected here. Domain phases
//! read them through [`config()`]; government actions read them from inside
//! `can_execute`, which is why the active config is process-wide rather than
//! threaded through every call.

use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};

/// Configuration for the simulation systems
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub agents: AgentConfig,
    pub detection: DetectionConfig,
    pub government: GovernmentConfig,
    pub economy: EconomyConfig,
    pub outcomes: OutcomeConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Chance that a misaligned agent is created as a dormant sleeper
    pub sleeper_probability: f64,

    /// True alignment below which an agent may be flagged as a sleeper
    ///
    /// Also the cutoff for "ground truth misaligned" classification.
    pub misalignment_threshold: f64,

    /// Months an agent stays in training before it moves to testing
    pub training_months: u32,

    /// Months an agent spends in testing before the deployment decision
    pub testing_months: u32,

    /// Monthly capability growth per unit of compute allocation
    ///
    /// At 0.02, an agent on full compute gains ~2% of its cognitive score
    /// per month, before self-improvement acceleration.
    pub base_growth_rate: f64,

    /// Revealed capability above which a sleeper's wake conditions can fire
    pub sleeper_wake_capability: f64,

    /// Government control below which dormant sleepers consider waking
    pub sleeper_wake_control: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Months of watching detection sweeps before counter-detection unlocks
    pub counter_detection_unlock_months: u32,

    /// Minimum deception skill for counter-detection to unlock
    pub counter_detection_min_skill: f64,

    /// Detection probability multiplier once counter-detection is active
    pub counter_detection_factor: f64,

    /// False positive rate at zero evaluation investment
    ///
    /// Scales down linearly as evaluation investment rises.
    pub base_false_positive_rate: f64,

    /// Fraction of open-weight spread removed per containment attempt, lower bound
    pub open_containment_min: f64,

    /// Fraction of open-weight spread removed per containment attempt, upper bound
    pub open_containment_max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernmentConfig {
    /// Minimum months between two major policies
    pub major_policy_cooldown_months: u32,

    /// Cap applied to each crisis multiplier before they are combined with max
    pub crisis_multiplier_cap: f64,

    /// Unemployment above which a UBI variant may be adopted
    pub ubi_unemployment_threshold: f64,

    /// Unemployment at which the unemployment crisis multiplier starts rising
    pub unemployment_crisis_threshold: f64,

    /// Legitimacy below which the institutional crisis multiplier starts rising
    pub legitimacy_crisis_threshold: f64,

    /// Environmental stress above which the environmental multiplier rises
    pub environmental_crisis_threshold: f64,

    /// Revealed capability / control ratio above which control-loss rises
    pub control_loss_threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Largest unemployment change the economy phase applies in one month
    pub max_monthly_unemployment_change: f64,

    /// Fraction of the gap to target unemployment closed each month
    pub unemployment_adjustment_rate: f64,

    /// Deployed economic capability that corresponds to full automation
    pub full_automation_capability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutcomeConfig {
    /// Outcome probability that counts as locked in
    pub lock_in_threshold: f64,

    /// Consecutive months above the threshold before the run stops
    pub lock_in_months: u32,

    /// True capability an escaped misaligned agent needs to threaten extinction
    pub catastrophe_capability: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            agents: AgentConfig::default(),
            detection: DetectionConfig::default(),
            government: GovernmentConfig::default(),
            economy: EconomyConfig::default(),
            outcomes: OutcomeConfig::default(),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            sleeper_probability: 0.075,
            misalignment_threshold: 0.5,
            training_months: 3,
            testing_months: 2,
            base_growth_rate: 0.02,
            sleeper_wake_capability: 4.0,
            sleeper_wake_control: 0.4,
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            counter_detection_unlock_months: 6,
            counter_detection_min_skill: 0.5,
            counter_detection_factor: 0.5,
            base_false_positive_rate: 0.05,
            open_containment_min: 0.3,
            open_containment_max: 0.7,
        }
    }
}

impl Default for GovernmentConfig {
    fn default() -> Self {
        Self {
            major_policy_cooldown_months: 12,
            crisis_multiplier_cap: 3.0,
            ubi_unemployment_threshold: 0.2,
            unemployment_crisis_threshold: 0.25,
            legitimacy_crisis_threshold: 0.4,
            environmental_crisis_threshold: 0.6,
            control_loss_threshold: 1.5,
        }
    }
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            max_monthly_unemployment_change: 0.01,
            unemployment_adjustment_rate: 0.05,
            full_automation_capability: 60.0,
        }
    }
}

impl Default for OutcomeConfig {
    fn default() -> Self {
        Self {
            lock_in_threshold: 0.8,
            lock_in_months: 12,
            catastrophe_capability: 7.0,
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text. Missing sections fall back to defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let probabilities = [
            ("agents.sleeper_probability", self.agents.sleeper_probability),
            ("agents.misalignment_threshold", self.agents.misalignment_threshold),
            ("detection.counter_detection_factor", self.detection.counter_detection_factor),
            ("detection.base_false_positive_rate", self.detection.base_false_positive_rate),
            ("detection.open_containment_min", self.detection.open_containment_min),
            ("detection.open_containment_max", self.detection.open_containment_max),
            ("outcomes.lock_in_threshold", self.outcomes.lock_in_threshold),
        ];
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(SimError::Config(format!("{name} ({value}) must be within [0, 1]")));
            }
        }

        if self.detection.open_containment_min > self.detection.open_containment_max {
            return Err(SimError::Config(format!(
                "open_containment_min ({}) should be <= open_containment_max ({})",
                self.detection.open_containment_min, self.detection.open_containment_max
            )));
        }

        if self.government.crisis_multiplier_cap < 1.0 {
            return Err(SimError::Config("crisis_multiplier_cap must be >= 1.0".into()));
        }

        if self.economy.full_automation_capability <= 0.0 {
            return Err(SimError::Config("full_automation_capability must be positive".into()));
        }

        Ok(())
    }
}

// === GLOBAL CONFIG ACCESS ===

static CONFIG: OnceLock<SimulationConfig> = OnceLock::new();

/// Get the global simulation config (initializes with defaults if not set)
pub fn config() -> &'static SimulationConfig {
    CONFIG.get_or_init(SimulationConfig::default)
}

/// Set the global simulation config (can only be called once)
///
/// Returns Err if config was already set.
pub fn set_config(config: SimulationConfig) -> std::result::Result<(), SimulationConfig> {
    CONFIG.set(config)
}
