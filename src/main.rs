//! Alignment Forecast - command line runner
//!
//! Runs one seeded scenario and prints a summary, or a batch of seeds and
//! prints the outcome histogram.

use std::path::PathBuf;

use clap::Parser;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use alignment_forecast::core::config::{set_config, SimulationConfig};
use alignment_forecast::core::error::{Result, SimError};
use alignment_forecast::core::types::SimRng;
use alignment_forecast::engine::{Engine, RunConfig};
use alignment_forecast::monte_carlo::run_batch;
use alignment_forecast::scenario;
use alignment_forecast::state::outcome::Outcome;

#[derive(Parser, Debug)]
#[command(name = "alignment-forecast")]
#[command(about = "Forecast AI development outcomes with a month-stepped simulation")]
struct Args {
    /// Seed for the first run; batches use seed, seed+1, ...
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Month limit per run
    #[arg(long, default_value_t = 120)]
    months: u32,

    /// TOML file overriding the default tuning
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of runs (more than one runs a parallel batch)
    #[arg(long, default_value_t = 1)]
    runs: u32,

    /// Keep going after an outcome locks in
    #[arg(long)]
    no_outcome_check: bool,

    /// Write the full run result (single run) or batch report as JSON
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("alignment_forecast=info")),
        )
        .init();

    if let Some(path) = &args.config {
        let loaded = SimulationConfig::from_toml_file(path)?;
        if set_config(loaded).is_err() {
            return Err(SimError::Config("configuration was already initialised".into()));
        }
        tracing::info!(path = %path.display(), "configuration loaded");
    }

    let run_config = RunConfig {
        max_months: args.months,
        seed: args.seed,
        check_actual_outcomes: !args.no_outcome_check,
    };
    let initial = scenario::default_world(&mut SimRng::seed_from_u64(args.seed));

    if args.runs > 1 {
        let seeds: Vec<u64> = (0..args.runs as u64).map(|i| args.seed.wrapping_add(i)).collect();
        let report = run_batch(&initial, &seeds, &run_config)?;

        println!("\n=== BATCH: {} runs, up to {} months ===", report.runs.len(), args.months);
        for outcome in [Outcome::Utopia, Outcome::Dystopia, Outcome::Extinction, Outcome::Ongoing] {
            let count = report.histogram.get(&outcome).copied().unwrap_or(0);
            println!("  {:<11} {:>5}  ({:.1}%)", format!("{outcome:?}"), count, report.share(outcome) * 100.0);
        }
        println!("  mean months {:.1}", report.mean_months());

        if let Some(path) = &args.output {
            std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
            println!("report written to {}", path.display());
        }
        return Ok(());
    }

    let result = Engine::new(run_config)?.run(initial)?;
    let state = &result.final_state;

    println!("\n=== RUN: seed {} ===", result.seed);
    println!("Outcome:        {:?}", result.summary.final_outcome);
    println!("Reason:         {}", result.summary.final_outcome_reason);
    println!("Months:         {}", result.summary.total_months);
    println!("Events:         {}", result.events.len());
    println!("Unemployment:   {:.3} ({:?})", state.society.unemployment, state.society.economic_stage);
    println!("Legitimacy:     {:.3}", state.government.legitimacy);
    println!("Control:        {:.3}", state.government.control);
    println!("Escaped agents: {}", state.escaped_count());
    println!(
        "Probabilities:  utopia {:.2} / dystopia {:.2} / extinction {:.2}",
        state.outcomes.utopia_probability, state.outcomes.dystopia_probability, state.outcomes.extinction_probability,
    );

    if let Some(path) = &args.output {
        result.write_json(path)?;
        println!("result written to {}", path.display());
    }
    Ok(())
}
