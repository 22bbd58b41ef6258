//! Government decision engine
//!
//! Greedy single-winner selection: every eligible action is scored from
//! observable inputs and the highest score wins, with ties going to the
//! earlier registry entry. How many selections happen in a month comes from
//! the adjusted action frequency.

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::config;
use crate::core::types::SimRng;
use crate::government::action::ActionId;
use crate::government::priority::PriorityInputs;
use crate::government::registry::ActionRegistry;
use crate::state::events::GameEvent;
use crate::state::world::WorldState;

/// Per-crisis multipliers on the baseline action frequency, each already capped
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CrisisMultipliers {
    pub unemployment: f64,
    pub institutional: f64,
    pub environmental: f64,
    pub control_loss: f64,
}

impl CrisisMultipliers {
    /// Largest multiplier. Crises do not stack.
    pub fn combined(&self) -> f64 {
        self.unemployment
            .max(self.institutional)
            .max(self.environmental)
            .max(self.control_loss)
            .max(1.0)
    }
}

/// What the government did in one month
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GovernmentTurn {
    pub executed: Vec<ActionId>,
    pub failed: Vec<ActionId>,
    pub events: Vec<GameEvent>,
    /// Effects summed per key across executed actions
    pub effects: BTreeMap<String, f64>,
}

pub struct GovernmentEngine {
    registry: ActionRegistry,
}

impl GovernmentEngine {
    pub fn new() -> Self {
        Self { registry: ActionRegistry::standard() }
    }

    pub fn with_registry(registry: ActionRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    /// Score of every eligible action, in registry order
    pub fn score_board(&self, state: &WorldState) -> Vec<(ActionId, f64)> {
        let inputs = PriorityInputs::from_state(state);
        self.registry
            .iter()
            .filter(|action| action.can_execute(state))
            .map(|action| {
                let score = action.priority(state, &inputs);
                tracing::debug!(month = state.month, action = %action.id(), score, "priority");
                (action.id(), score)
            })
            .collect()
    }

    /// Highest-priority eligible action, or `None` when nothing is eligible
    pub fn select_action(&self, state: &WorldState) -> Option<ActionId> {
        self.select_action_excluding(state, &BTreeSet::new())
    }

    pub fn select_action_excluding(&self, state: &WorldState, excluded: &BTreeSet<ActionId>) -> Option<ActionId> {
        best_of(self.score_board(state).into_iter().filter(|(id, _)| !excluded.contains(id)))
    }

    pub fn crisis_multipliers(&self, state: &WorldState) -> CrisisMultipliers {
        let cfg = &config().government;
        let inputs = PriorityInputs::from_state(state);
        let cap = |m: f64| m.clamp(1.0, cfg.crisis_multiplier_cap);

        let unemployment = 1.0 + (inputs.unemployment - cfg.unemployment_crisis_threshold).max(0.0) * 8.0;
        let institutional = 1.0 + (cfg.legitimacy_crisis_threshold - inputs.legitimacy).max(0.0) * 5.0;
        let environmental =
            1.0 + (inputs.environmental_stress - cfg.environmental_crisis_threshold).max(0.0) * 5.0;

        // Visible capability relative to what the state can still police
        let capability_ratio = inputs.observable_capability / (inputs.control * 5.0).max(0.1);
        let control_loss = 1.0
            + (capability_ratio - cfg.control_loss_threshold).max(0.0) * 0.5
            + 0.5 * inputs.recent_escapes as f64;

        CrisisMultipliers {
            unemployment: cap(unemployment),
            institutional: cap(institutional),
            environmental: cap(environmental),
            control_loss: cap(control_loss),
        }
    }

    /// Expected actions this month
    pub fn adjusted_frequency(&self, state: &WorldState) -> f64 {
        state.government.base_action_frequency.max(0.0) * self.crisis_multipliers(state).combined()
    }

    /// Run this month's selection cycles.
    ///
    /// The integer part of the adjusted frequency gives guaranteed cycles. One
    /// uniform draw is always taken for the fractional part, so the stream
    /// position does not depend on the frequency. A failed action is excluded
    /// for the rest of the month and still uses up its cycle.
    pub fn execute_actions(&self, state: &mut WorldState, rng: &mut SimRng) -> GovernmentTurn {
        let frequency = self.adjusted_frequency(state);
        let whole = frequency.floor();
        let fraction = frequency - whole;
        let roll: f64 = rng.gen();
        let cycles = whole as u32 + u32::from(roll < fraction);

        tracing::debug!(month = state.month, frequency, cycles, "government turn");

        let mut turn = GovernmentTurn::default();
        let mut excluded = BTreeSet::new();
        for _ in 0..cycles {
            let Some(id) = self.select_action_excluding(state, &excluded) else {
                break;
            };
            let Some(action) = self.registry.get(id) else {
                break;
            };

            let outcome = action.execute(state, rng);
            if !outcome.success {
                tracing::debug!(month = state.month, action = %id, reason = %outcome.message, "action failed");
                excluded.insert(id);
                turn.failed.push(id);
                continue;
            }

            let gov = &mut state.government;
            *gov.action_log.entry(id.as_str().to_string()).or_insert(0) += 1;
            gov.last_executed.insert(id.as_str().to_string(), state.month);
            gov.energy_spent += action.energy_cost();
            if id.is_major_policy() {
                gov.last_major_policy_month = Some(state.month);
            }

            for (key, value) in outcome.effects {
                *turn.effects.entry(key).or_insert(0.0) += value;
            }
            turn.events.extend(outcome.events);
            turn.executed.push(id);
        }
        turn
    }
}

/// Maximum finite score. Strict comparison keeps the first of equal scores.
fn best_of(scores: impl IntoIterator<Item = (ActionId, f64)>) -> Option<ActionId> {
    let mut best: Option<(ActionId, f64)> = None;
    for (id, score) in scores {
        if !score.is_finite() {
            tracing::warn!(action = %id, score, "non-finite priority ignored");
            continue;
        }
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((id, score)),
        }
    }
    best.map(|(id, _)| id)
}

impl Default for GovernmentEngine {
    fn default() -> Self {
        Self::new()
    }
}
