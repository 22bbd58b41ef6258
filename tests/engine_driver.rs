//! Engine driver surface: runs, steps, termination and batches

use alignment_forecast::core::types::SimRng;
use alignment_forecast::engine::{Engine, RunConfig};
use alignment_forecast::monte_carlo::run_batch;
use alignment_forecast::scenario;
use alignment_forecast::state::outcome::Outcome;
use rand::SeedableRng;

#[test]
fn test_metrics_row_per_month() {
    let initial = scenario::default_world(&mut SimRng::seed_from_u64(42));
    let run_config = RunConfig { max_months: 18, seed: 42, check_actual_outcomes: false };
    let result = Engine::new(run_config).unwrap().run(initial).unwrap();

    let months = result.summary.total_months as usize;
    assert_eq!(result.summary.metrics.len(), months);
    for (i, row) in result.summary.metrics.iter().enumerate() {
        assert_eq!(row.month as usize, i + 1);
        let sum = row.utopia_probability + row.dystopia_probability + row.extinction_probability;
        assert!((sum - 1.0).abs() < 1e-9);
    }
    assert_eq!(result.final_state.history.len(), result.events.len());
}

#[test]
fn test_run_ends_with_a_reason() {
    let initial = scenario::default_world(&mut SimRng::seed_from_u64(3));
    let run_config = RunConfig { max_months: 60, seed: 3, check_actual_outcomes: true };
    let result = Engine::new(run_config).unwrap().run(initial).unwrap();
    assert!(result.summary.total_months <= 60);
    assert!(!result.summary.final_outcome_reason.is_empty());
    if result.summary.final_outcome == Outcome::Extinction {
        assert!(result.final_state.extinction.triggered);
    }
}

#[test]
fn test_state_stays_valid_for_a_long_run() {
    let initial = scenario::default_world(&mut SimRng::seed_from_u64(11));
    let run_config = RunConfig { max_months: 120, seed: 11, check_actual_outcomes: false };
    let result = Engine::new(run_config).unwrap().run(initial).unwrap();
    assert!(result.final_state.validate().is_ok());
    for agent in &result.final_state.agents {
        let observed = agent.revealed();
        assert!((0.0..=1.0).contains(&observed.alignment));
        assert!(agent.truth.alignment <= agent.alignment_bound + 1e-9);
    }
}

#[test]
fn test_batch_histogram_covers_every_run() {
    let initial = scenario::default_world(&mut SimRng::seed_from_u64(42));
    let template = RunConfig { max_months: 12, seed: 0, check_actual_outcomes: true };
    let seeds: Vec<u64> = (100..108).collect();
    let report = run_batch(&initial, &seeds, &template).unwrap();

    assert_eq!(report.runs.len(), seeds.len());
    assert_eq!(report.histogram.values().sum::<u32>() as usize, seeds.len());
    let total: f64 = [Outcome::Utopia, Outcome::Dystopia, Outcome::Extinction, Outcome::Ongoing]
        .into_iter()
        .map(|o| report.share(o))
        .sum();
    assert!((total - 1.0).abs() < 1e-9);
    assert!(report.mean_months() <= 12.0);
}
