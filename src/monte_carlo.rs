//! Batches of independent runs over a list of seeds
//!
//! Every run gets its own engine and its own generator seeded from its seed,
//! so a batch produces the same per-seed results as running the seeds one
//! after another.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::types::Month;
use crate::engine::{Engine, RunConfig};
use crate::state::outcome::Outcome;
use crate::state::world::WorldState;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BatchRun {
    pub seed: u64,
    pub final_outcome: Outcome,
    pub final_outcome_reason: String,
    pub total_months: Month,
    pub quality_of_life: f64,
    pub utopia_probability: f64,
    pub dystopia_probability: f64,
    pub extinction_probability: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    /// One entry per seed, in the order the seeds were given
    pub runs: Vec<BatchRun>,
    pub histogram: BTreeMap<Outcome, u32>,
}

impl BatchReport {
    pub fn share(&self, outcome: Outcome) -> f64 {
        if self.runs.is_empty() {
            return 0.0;
        }
        self.histogram.get(&outcome).copied().unwrap_or(0) as f64 / self.runs.len() as f64
    }

    pub fn mean_months(&self) -> f64 {
        if self.runs.is_empty() {
            return 0.0;
        }
        self.runs.iter().map(|r| r.total_months as f64).sum::<f64>() / self.runs.len() as f64
    }
}

fn run_one(initial: &WorldState, seed: u64, template: &RunConfig) -> Result<BatchRun> {
    let run_config = RunConfig { seed, ..template.clone() };
    let result = Engine::new(run_config)?.run(initial.clone())?;
    let outcomes = &result.final_state.outcomes;
    Ok(BatchRun {
        seed,
        final_outcome: result.summary.final_outcome,
        final_outcome_reason: result.summary.final_outcome_reason.clone(),
        total_months: result.summary.total_months,
        quality_of_life: outcomes.quality_of_life,
        utopia_probability: outcomes.utopia_probability,
        dystopia_probability: outcomes.dystopia_probability,
        extinction_probability: outcomes.extinction_probability,
    })
}

/// Run `initial` once per seed in parallel. The template's seed is ignored.
pub fn run_batch(initial: &WorldState, seeds: &[u64], template: &RunConfig) -> Result<BatchReport> {
    tracing::info!(runs = seeds.len(), max_months = template.max_months, "batch started");
    let runs: Vec<BatchRun> = seeds
        .par_iter()
        .map(|&seed| run_one(initial, seed, template))
        .collect::<Result<_>>()?;

    let mut histogram = BTreeMap::new();
    for run in &runs {
        *histogram.entry(run.final_outcome).or_insert(0) += 1;
    }
    Ok(BatchReport { runs, histogram })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::SimRng;
    use crate::scenario;
    use rand::SeedableRng;

    #[test]
    fn test_batch_matches_sequential_runs() {
        let initial = scenario::default_world(&mut SimRng::seed_from_u64(42));
        let template = RunConfig { max_months: 4, seed: 0, check_actual_outcomes: true };
        let seeds = [3, 1, 2];
        let report = run_batch(&initial, &seeds, &template).unwrap();

        let order: Vec<_> = report.runs.iter().map(|r| r.seed).collect();
        assert_eq!(order, seeds.to_vec());
        for (run, &seed) in report.runs.iter().zip(&seeds) {
            let sequential = run_one(&initial, seed, &template).unwrap();
            assert_eq!(run, &sequential);
        }
        assert_eq!(report.histogram.values().sum::<u32>(), 3);
    }

    #[test]
    fn test_empty_batch() {
        let initial = WorldState::new(vec![], vec![]);
        let report = run_batch(&initial, &[], &RunConfig::default()).unwrap();
        assert!(report.runs.is_empty());
        assert_eq!(report.share(Outcome::Utopia), 0.0);
        assert_eq!(report.mean_months(), 0.0);
    }
}
