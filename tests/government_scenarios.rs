//! Government decision engine against whole worlds

use std::collections::BTreeMap;

use alignment_forecast::core::config::config;
use alignment_forecast::core::types::SimRng;
use alignment_forecast::engine::{Engine, RunConfig};
use alignment_forecast::government::{
    ActionCategory, ActionId, ActionRegistry, GovernmentAction, GovernmentEngine, PriorityInputs,
};
use alignment_forecast::scenario;
use alignment_forecast::state::society::EconomicStage;
use alignment_forecast::state::world::WorldState;
use rand::SeedableRng;

fn world() -> WorldState {
    scenario::default_world(&mut SimRng::seed_from_u64(42))
}

#[test]
fn test_major_policies_respect_the_cooldown() {
    let registry = ActionRegistry::standard();
    let cooldown = config().government.major_policy_cooldown_months;
    let last = 7;

    let mut state = world();
    state.society.unemployment = 0.4;
    state.government.last_major_policy_month = Some(last);

    for month in last..last + cooldown {
        state.month = month;
        for action in registry.iter().filter(|a| a.id().is_major_policy()) {
            assert!(!action.can_execute(&state), "{:?} allowed in month {month}", action.id());
        }
    }

    state.month = last + cooldown;
    let ubi = registry.get(ActionId::ImplementMeansTestedUbi).unwrap();
    assert!(ubi.can_execute(&state));
}

#[test]
fn test_ubi_priority_rises_with_unemployment() {
    let registry = ActionRegistry::standard();
    let mut low = world();
    low.society.unemployment = 0.10;
    let mut high = low.clone();
    high.society.unemployment = 0.40;

    let low_inputs = PriorityInputs::from_state(&low);
    let high_inputs = PriorityInputs::from_state(&high);
    for action in registry.iter().filter(|a| a.id().is_ubi_variant()) {
        let before = action.priority(&low, &low_inputs);
        let after = action.priority(&high, &high_inputs);
        assert!(after > before, "{:?}: {after} <= {before}", action.id());
    }
}

#[test]
fn test_calm_economy_never_reaches_for_ubi() {
    let mut state = world();
    state.society.unemployment = 0.0;
    state.government.active_regulations.clear();
    let initial_stage = state.society.economic_stage;
    assert_eq!(initial_stage, EconomicStage::PreDisruption);

    let run_config = RunConfig { max_months: 12, seed: 42, check_actual_outcomes: false };
    let mut engine = Engine::new(run_config).unwrap();
    for _ in 0..12 {
        let before = state.government.action_log.clone();
        let step = engine.step(&mut state).unwrap();
        for id in ActionId::ALL.iter().filter(|a| a.is_ubi_variant()) {
            let key = id.as_str();
            assert_eq!(
                state.government.times_executed(key),
                before.get(key).copied().unwrap_or(0),
                "{key} executed in month {}",
                step.month
            );
        }
        for event in &step.events {
            assert!(
                ActionId::ALL.iter().filter(|a| a.is_ubi_variant()).all(|a| event.title != a.as_str()),
                "UBI event in month {}: {}",
                step.month,
                event.description
            );
        }
    }

    assert!(state.government.ubi_variant.is_none());
    for id in ActionId::ALL.iter().filter(|a| a.is_ubi_variant()) {
        assert_eq!(state.government.times_executed(id.as_str()), 0);
    }
    let (low, high) = initial_stage.unemployment_range();
    assert!(state.society.unemployment >= low && state.society.unemployment <= high);
    assert_eq!(state.society.economic_stage, initial_stage);
}

#[test]
fn test_executed_action_is_charged_its_energy_cost() {
    let mut state = world();
    state.society.unemployment = 0.4;
    state.government.base_action_frequency = 1.0;
    let decisions = GovernmentEngine::with_registry(ActionRegistry::with_ids(&[ActionId::ImplementMeansTestedUbi]));
    let mut rng = SimRng::seed_from_u64(8);

    let turn = decisions.execute_actions(&mut state, &mut rng);
    assert_eq!(turn.executed, vec![ActionId::ImplementMeansTestedUbi]);
    assert_eq!(state.government.energy_spent, ActionId::ImplementMeansTestedUbi.energy_cost());
    assert_eq!(state.government.times_executed(ActionId::ImplementMeansTestedUbi.as_str()), 1);
    assert!(state.government.ubi_variant.is_some());
}

#[test]
fn test_no_removal_action_monopolises_long_runs() {
    let mut totals: BTreeMap<String, u32> = BTreeMap::new();
    for seed in [1, 7, 42, 99] {
        let run_config = RunConfig { max_months: 240, seed, check_actual_outcomes: false };
        let mut engine = Engine::new(run_config).unwrap();
        let result = engine.run(scenario::default_world(&mut SimRng::seed_from_u64(seed))).unwrap();
        for (id, count) in result.final_state.government.action_log {
            *totals.entry(id).or_insert(0) += count;
        }
    }

    let executed: u32 = totals.values().sum();
    assert!(executed > 0);
    let share = |id: ActionId| f64::from(totals.get(id.as_str()).copied().unwrap_or(0)) / f64::from(executed);

    // Each removal consumes the flags of an earlier sweep
    assert!(share(ActionId::RemoveFlaggedAgents) <= 0.5, "{totals:?}");
    assert!(share(ActionId::RunDetectionSweep) <= 0.6, "{totals:?}");
    assert!(share(ActionId::ContainEscapedAgents) <= 0.6, "{totals:?}");

    let evaluation: u32 = ActionId::ALL
        .iter()
        .filter(|id| id.category() == ActionCategory::Evaluation)
        .map(|id| totals.get(id.as_str()).copied().unwrap_or(0))
        .sum();
    assert!(evaluation > 0, "{totals:?}");
}
