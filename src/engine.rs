//! Engine driver - runs months until a termination condition holds

use std::path::Path;

use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::core::config::config;
use crate::core::error::Result;
use crate::core::types::{Month, SimRng};
use crate::orchestrator::PhaseOrchestrator;
use crate::phases::default_phases;
use crate::state::events::GameEvent;
use crate::state::outcome::{MonthlyMetrics, Outcome};
use crate::state::world::WorldState;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub max_months: Month,
    pub seed: u64,
    /// Stop early once an outcome locks in
    pub check_actual_outcomes: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self { max_months: 120, seed: 42, check_actual_outcomes: true }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    pub month: Month,
    pub events: Vec<GameEvent>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub final_outcome: Outcome,
    pub final_outcome_reason: String,
    pub total_months: Month,
    pub metrics: Vec<MonthlyMetrics>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub seed: u64,
    pub final_state: WorldState,
    pub summary: RunSummary,
    pub events: Vec<GameEvent>,
}

impl RunResult {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Why a run stopped
#[derive(Clone, Debug, PartialEq)]
enum Stop {
    Extinction(String),
    LockedIn(Outcome),
    MaxMonths,
}

/// Owns the generator and the phase registry for one run
pub struct Engine {
    run_config: RunConfig,
    orchestrator: PhaseOrchestrator,
    rng: SimRng,
}

impl Engine {
    /// Engine with the standard phase set
    pub fn new(run_config: RunConfig) -> Result<Self> {
        let mut orchestrator = PhaseOrchestrator::new();
        orchestrator.register_all(default_phases())?;
        Ok(Self::with_orchestrator(run_config, orchestrator))
    }

    pub fn with_orchestrator(run_config: RunConfig, orchestrator: PhaseOrchestrator) -> Self {
        let rng = SimRng::seed_from_u64(run_config.seed);
        Self { run_config, orchestrator, rng }
    }

    pub fn run_config(&self) -> &RunConfig {
        &self.run_config
    }

    pub fn orchestrator(&self) -> &PhaseOrchestrator {
        &self.orchestrator
    }

    /// Advance one month: bump the month counter, run every phase, and
    /// append the month's events to the world history.
    pub fn step(&mut self, state: &mut WorldState) -> Result<StepResult> {
        state.month += 1;
        let events = self.orchestrator.step(state, &mut self.rng)?;
        state.history.extend(events.iter().cloned());
        Ok(StepResult { month: state.month, events })
    }

    fn stop_condition(&self, state: &WorldState) -> Option<Stop> {
        if state.extinction.triggered {
            let cause = state.extinction.cause.clone().unwrap_or_else(|| "unknown cause".to_string());
            return Some(Stop::Extinction(cause));
        }
        if self.run_config.check_actual_outcomes
            && state.outcomes.leading_outcome != Outcome::Ongoing
            && state.outcomes.lock_in_streak >= config().outcomes.lock_in_months
        {
            return Some(Stop::LockedIn(state.outcomes.leading_outcome));
        }
        if state.month >= self.run_config.max_months {
            return Some(Stop::MaxMonths);
        }
        None
    }

    /// Run from `initial` until extinction, lock-in, or the month limit.
    ///
    /// The initial state is validated first; any phase error aborts the run.
    pub fn run(&mut self, initial: WorldState) -> Result<RunResult> {
        initial.validate()?;
        let mut state = initial;
        let mut events = Vec::new();
        tracing::info!(seed = self.run_config.seed, max_months = self.run_config.max_months, "run started");

        let stop = loop {
            if let Some(stop) = self.stop_condition(&state) {
                break stop;
            }
            let step = self.step(&mut state)?;
            events.extend(step.events);
        };

        let (final_outcome, final_outcome_reason) = match stop {
            Stop::Extinction(cause) => (Outcome::Extinction, format!("extinction: {cause}")),
            Stop::LockedIn(outcome) => (
                outcome,
                format!("{outcome:?} locked in for {} months", config().outcomes.lock_in_months),
            ),
            Stop::MaxMonths => {
                let (leader, probability) = state.outcomes.leading();
                if state.metrics_history.is_empty() {
                    (Outcome::Ongoing, "no months simulated".to_string())
                } else {
                    (
                        Outcome::Ongoing,
                        format!("month limit reached; {leader:?} leading at {probability:.2}"),
                    )
                }
            }
        };

        tracing::info!(
            seed = self.run_config.seed,
            months = state.month,
            outcome = ?final_outcome,
            "run finished"
        );

        let summary = RunSummary {
            final_outcome,
            final_outcome_reason,
            total_months: state.month,
            metrics: state.metrics_history.clone(),
        };
        Ok(RunResult { seed: self.run_config.seed, final_state: state, summary, events })
    }
}
