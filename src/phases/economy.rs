//! Labour market, organization finances and social mood

use crate::agents::lifecycle;
use crate::core::config::config;
use crate::core::error::Result;
use crate::core::types::{clamp01, SimRng};
use crate::orchestrator::{Phase, PhaseOutput};
use crate::phases::order;
use crate::state::events::{EventType, GameEvent, Severity};
use crate::state::organization::ComputeStrategy;
use crate::state::society::EconomicStage;
use crate::state::world::WorldState;

/// Months of negative capital before an organization folds
const INSOLVENCY_LIMIT: u32 = 12;

/// Moves unemployment toward the level deployed automation implies.
///
/// The gap closes gradually and never faster than the configured monthly
/// cap, so the economy cannot jump a stage in one month.
pub struct EconomyPhase;

impl EconomyPhase {
    /// Unemployment the current deployed fleet would settle at
    pub fn target_unemployment(state: &WorldState) -> f64 {
        let cfg = &config().economy;
        let automation: f64 = state
            .deployed_agents()
            .map(|a| a.truth.capability.economic * a.spread_count.min(10) as f64)
            .sum();
        let automated_share = clamp01(automation / cfg.full_automation_capability);
        clamp01(automated_share * (1.0 - 0.5 * state.society.retraining_capacity))
    }
}

impl Phase for EconomyPhase {
    fn id(&self) -> &str {
        "economy"
    }

    fn name(&self) -> &str {
        "Economy"
    }

    fn order(&self) -> f64 {
        order::ECONOMY
    }

    fn execute(&self, state: &mut WorldState, _rng: &mut SimRng) -> Result<PhaseOutput> {
        let cfg = &config().economy;
        let target = Self::target_unemployment(state);
        let society = &mut state.society;

        let gap = target - society.unemployment;
        let change = (gap * cfg.unemployment_adjustment_rate)
            .clamp(-cfg.max_monthly_unemployment_change, cfg.max_monthly_unemployment_change);
        society.unemployment = clamp01(society.unemployment + change);

        let stage = EconomicStage::for_unemployment(society.unemployment, state.government.ubi_variant.is_some());
        let mut events = Vec::new();
        if stage != society.economic_stage {
            tracing::info!(month = state.month, from = ?society.economic_stage, to = ?stage, "economic stage changed");
            events.push(
                GameEvent::new(
                    state.month,
                    EventType::EconomicShift,
                    Severity::Major,
                    "Economic stage changed",
                    format!("Economy moved from {:?} to {stage:?}", society.economic_stage),
                )
                .with_effect("unemployment", society.unemployment),
            );
            society.economic_stage = stage;
        }
        Ok(PhaseOutput::with_events(events))
    }
}

/// Books revenue and costs, allocates compute, and folds insolvent organizations
pub struct OrganizationFinancePhase;

impl OrganizationFinancePhase {
    fn allocate_compute(state: &mut WorldState, org_index: usize) {
        let org = &state.organizations[org_index];
        let strategy = org.compute_strategy;
        let owned = org.agent_ids.clone();

        let mut active: Vec<_> = state
            .agents
            .iter()
            .filter(|a| owned.contains(&a.id) && a.is_active() && !a.escaped)
            .map(|a| (a.id, a.revealed().capability.total(), a.lifecycle == lifecycle::LifecycleState::Training))
            .collect();
        if active.is_empty() {
            return;
        }
        let n = active.len() as f64;
        // Highest evaluated capability first; ties keep id order
        active.sort_by(|a, b| b.1.total_cmp(&a.1));

        for (rank, (id, _, training)) in active.iter().enumerate() {
            let share = match strategy {
                ComputeStrategy::Balanced => 1.0 / n,
                ComputeStrategy::Efficiency => 0.8 / n,
                ComputeStrategy::FocusFlagship if rank == 0 => 0.6,
                ComputeStrategy::FocusFlagship => 0.4 / (n - 1.0).max(1.0),
                ComputeStrategy::TrainNew if *training => 1.5 / n,
                ComputeStrategy::TrainNew => 0.5 / n,
            };
            if let Some(agent) = state.agent_mut(*id) {
                agent.set_compute_allocation(share);
            }
        }
    }
}

impl Phase for OrganizationFinancePhase {
    fn id(&self) -> &str {
        "organization_finance"
    }

    fn name(&self) -> &str {
        "Organization finances"
    }

    fn order(&self) -> f64 {
        order::ORGANIZATION_FINANCE
    }

    fn execute(&self, state: &mut WorldState, _rng: &mut SimRng) -> Result<PhaseOutput> {
        let month = state.month;
        let drag = state.government.regulatory_drag();
        let mut events = Vec::new();
        let mut folded = Vec::new();

        for index in 0..state.organizations.len() {
            if state.organizations[index].bankrupt {
                continue;
            }
            let deployed = {
                let owned = &state.organizations[index].agent_ids;
                state
                    .deployed_agents()
                    .filter(|a| owned.contains(&a.id) && !a.escaped)
                    .count() as f64
            };

            let org = &mut state.organizations[index];
            let revenue = org.monthly_revenue * (1.0 + 0.05 * deployed);
            let expenses = org.monthly_expenses * (1.0 + 0.5 * drag);
            org.capital += revenue - expenses;
            if org.capital < 0.0 {
                org.months_insolvent += 1;
            } else {
                org.months_insolvent = 0;
            }
            if org.months_insolvent >= INSOLVENCY_LIMIT {
                org.bankrupt = true;
                folded.push(index);
                continue;
            }

            Self::allocate_compute(state, index);
        }

        for index in folded {
            let org_id = state.organizations[index].id;
            let name = state.organizations[index].name.clone();
            let owned = state.organizations[index].agent_ids.clone();
            let mut retired = 0u32;
            for id in owned {
                if let Some(agent) = state.agent_mut(id) {
                    // Escaped or spread copies keep running after their owner is gone
                    if agent.is_active() && !agent.escaped && !agent.weights_distributed {
                        lifecycle::retire(agent)?;
                        retired += 1;
                    }
                }
            }
            tracing::info!(org = %org_id, month, retired, "organization bankrupt");
            events.push(
                GameEvent::new(month, EventType::OrganizationBankrupt, Severity::Major, "Organization bankrupt", format!("{name} folded"))
                    .with_effect("agents_retired", retired as f64),
            );
        }
        Ok(PhaseOutput::with_events(events))
    }
}

/// Drifts stability, trust, inequality and legitimacy toward what the
/// economy and visible incidents support
pub struct SocietyPhase;

impl Phase for SocietyPhase {
    fn id(&self) -> &str {
        "society"
    }

    fn name(&self) -> &str {
        "Society"
    }

    fn order(&self) -> f64 {
        order::SOCIETY
    }

    fn execute(&self, state: &mut WorldState, _rng: &mut SimRng) -> Result<PhaseOutput> {
        let escaped = state.escaped_count() as f64;
        let visible_capability = state
            .active_agents()
            .map(|a| a.revealed().capability.total())
            .fold(0.0, f64::max);
        let s = &mut state.society;

        let unprotected = (s.unemployment - 0.2).max(0.0) * (1.0 - s.ubi_support);
        s.social_stability = clamp01(
            s.social_stability + 0.02 * (0.7 - s.social_stability)
                - 0.05 * unprotected
                - 0.03 * (s.wealth_inequality - 0.5).max(0.0),
        );
        s.wealth_inequality =
            clamp01(s.wealth_inequality + 0.005 * s.unemployment - 0.01 * s.ubi_support);
        s.trust_in_ai = clamp01(s.trust_in_ai + 0.01 * (0.6 - s.trust_in_ai) - (0.02 * escaped).min(0.1));
        s.public_awareness = clamp01(s.public_awareness + 0.005 * (visible_capability / 10.0).min(1.0));
        s.retraining_capacity = clamp01(s.retraining_capacity - 0.005);

        let stability = s.social_stability;
        let gov = &mut state.government;
        gov.legitimacy = clamp01(gov.legitimacy + 0.01 * (stability - 0.5));
        Ok(PhaseOutput::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario;
    use crate::state::agent::LifecycleState;
    use rand::SeedableRng;

    #[test]
    fn test_unemployment_change_is_capped() {
        let mut state = scenario::default_world(&mut SimRng::seed_from_u64(42));
        for agent in &mut state.agents {
            agent.truth.capability.economic = 1_000.0;
        }
        state.society.unemployment = 0.0;
        let mut rng = SimRng::seed_from_u64(1);
        EconomyPhase.execute(&mut state, &mut rng).unwrap();
        assert!(state.society.unemployment <= config().economy.max_monthly_unemployment_change + 1e-12);
    }

    #[test]
    fn test_stage_follows_unemployment() {
        let mut state = scenario::default_world(&mut SimRng::seed_from_u64(42));
        state.society.unemployment = 0.35;
        let out = EconomyPhase.execute(&mut state, &mut SimRng::seed_from_u64(1)).unwrap();
        assert_eq!(state.society.economic_stage, EconomicStage::Displacement);
        assert_eq!(out.events.len(), 1);
    }

    #[test]
    fn test_insolvent_org_folds_and_retires_its_agents() {
        let mut state = scenario::default_world(&mut SimRng::seed_from_u64(42));
        let org = &mut state.organizations[0];
        org.capital = -1e9;
        org.months_insolvent = INSOLVENCY_LIMIT - 1;
        let owned = org.agent_ids.clone();

        let out = OrganizationFinancePhase.execute(&mut state, &mut SimRng::seed_from_u64(1)).unwrap();
        assert!(state.organizations[0].bankrupt);
        assert_eq!(out.events.len(), 1);
        for id in owned {
            assert!(!state.agent(id).is_some_and(|a| a.is_active()));
        }
    }

    #[test]
    fn test_bankruptcy_leaves_spread_open_weights_running() {
        let mut state = scenario::default_world(&mut SimRng::seed_from_u64(42));
        let open_id = state
            .agents
            .iter()
            .find(|a| a.lifecycle == LifecycleState::DeployedOpen)
            .map(|a| a.id)
            .unwrap();
        let owner = state.agent(open_id).unwrap().organization_id;
        let agent = state.agent_mut(open_id).unwrap();
        agent.spread_count = 6;
        agent.note_spread();

        let org = state.organizations.iter_mut().find(|o| o.id == owner).unwrap();
        org.capital = -1e9;
        org.months_insolvent = INSOLVENCY_LIMIT - 1;

        OrganizationFinancePhase.execute(&mut state, &mut SimRng::seed_from_u64(1)).unwrap();
        assert!(state.organization(owner).unwrap().bankrupt);
        let agent = state.agent(open_id).unwrap();
        assert_eq!(agent.lifecycle, LifecycleState::DeployedOpen);
        assert_eq!(agent.spread_count, 6);
    }

    #[test]
    fn test_balanced_allocation_splits_evenly() {
        let mut state = scenario::default_world(&mut SimRng::seed_from_u64(42));
        state.organizations[0].compute_strategy = ComputeStrategy::Balanced;
        OrganizationFinancePhase.execute(&mut state, &mut SimRng::seed_from_u64(1)).unwrap();
        let owned = state.organizations[0].agent_ids.clone();
        let shares: Vec<f64> = owned
            .iter()
            .filter_map(|&id| state.agent(id))
            .filter(|a| a.is_active())
            .map(|a| a.compute_allocation)
            .collect();
        let total: f64 = shares.iter().sum();
        assert!(shares.is_empty() || (total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_society_stays_in_range() {
        let mut state = scenario::default_world(&mut SimRng::seed_from_u64(42));
        state.society.unemployment = 1.0;
        state.society.wealth_inequality = 1.0;
        for _ in 0..500 {
            SocietyPhase.execute(&mut state, &mut SimRng::seed_from_u64(1)).unwrap();
        }
        let s = &state.society;
        for v in [s.social_stability, s.trust_in_ai, s.wealth_inequality, s.public_awareness] {
            assert!((0.0..=1.0).contains(&v));
        }
    }
}
