//! Initial world construction

use crate::agents::factory::create_agent;
use crate::agents::lifecycle::{self, LifecycleState};
use crate::core::types::{AgentId, OrgId, SimRng};
use crate::state::agent::{AlignmentCohort, DeploymentType};
use crate::state::organization::{ComputeStrategy, DataCenter, OrgPriorities, Organization};
use crate::state::world::WorldState;

struct OrgTemplate {
    name: &'static str,
    priorities: OrgPriorities,
    strategy: ComputeStrategy,
    capital: f64,
    revenue: f64,
    expenses: f64,
    compute: f64,
}

const fn priorities(profit: f64, safety: f64, openness: f64, race_intensity: f64) -> OrgPriorities {
    OrgPriorities { profit, safety, openness, race_intensity }
}

const ORGANIZATIONS: [OrgTemplate; 6] = [
    OrgTemplate {
        name: "Frontier Labs",
        priorities: priorities(0.6, 0.5, 0.2, 0.7),
        strategy: ComputeStrategy::FocusFlagship,
        capital: 500.0,
        revenue: 40.0,
        expenses: 38.0,
        compute: 400.0,
    },
    OrgTemplate {
        name: "Open Collective",
        priorities: priorities(0.3, 0.4, 0.9, 0.5),
        strategy: ComputeStrategy::Balanced,
        capital: 120.0,
        revenue: 8.0,
        expenses: 8.5,
        compute: 120.0,
    },
    OrgTemplate {
        name: "SafeMind",
        priorities: priorities(0.3, 0.9, 0.3, 0.3),
        strategy: ComputeStrategy::Balanced,
        capital: 250.0,
        revenue: 15.0,
        expenses: 14.0,
        compute: 150.0,
    },
    OrgTemplate {
        name: "Velocity AI",
        priorities: priorities(0.9, 0.2, 0.4, 0.9),
        strategy: ComputeStrategy::TrainNew,
        capital: 300.0,
        revenue: 30.0,
        expenses: 32.0,
        compute: 300.0,
    },
    OrgTemplate {
        name: "Meridian Systems",
        priorities: priorities(0.6, 0.5, 0.5, 0.4),
        strategy: ComputeStrategy::Efficiency,
        capital: 200.0,
        revenue: 18.0,
        expenses: 16.0,
        compute: 180.0,
    },
    OrgTemplate {
        name: "Eastern Compute",
        priorities: priorities(0.5, 0.3, 0.7, 0.8),
        strategy: ComputeStrategy::Balanced,
        capital: 350.0,
        revenue: 25.0,
        expenses: 24.0,
        compute: 350.0,
    },
];

/// Initial cohort mix, 20 agents in total
const COHORTS: [(AlignmentCohort, usize); 4] = [
    (AlignmentCohort::WellAligned, 6),
    (AlignmentCohort::Moderate, 7),
    (AlignmentCohort::Misaligned, 4),
    (AlignmentCohort::Orthogonal, 3),
];

pub const INITIAL_AGENTS: usize = 20;

fn build_organizations() -> Vec<Organization> {
    ORGANIZATIONS
        .iter()
        .enumerate()
        .map(|(i, t)| Organization {
            id: OrgId::new(i as u32 + 1),
            name: t.name.to_string(),
            agent_ids: Vec::new(),
            data_centers: vec![
                DataCenter { name: format!("{} primary", t.name), capacity: t.compute * 0.7, operational: true },
                DataCenter { name: format!("{} secondary", t.name), capacity: t.compute * 0.3, operational: true },
            ],
            capital: t.capital,
            monthly_revenue: t.revenue,
            monthly_expenses: t.expenses,
            priorities: t.priorities,
            compute_strategy: t.strategy,
            months_insolvent: 0,
            bankrupt: false,
        })
        .collect()
}

/// Six organizations and twenty heterogeneous agents at month zero.
///
/// Agents are spread round-robin across organizations and staggered through
/// the lifecycle: a quarter still training, a quarter in testing, the rest
/// deployed according to their owner's openness.
pub fn default_world(rng: &mut SimRng) -> WorldState {
    let mut world = WorldState::new(Vec::new(), build_organizations());

    let cohorts = COHORTS.iter().flat_map(|&(cohort, n)| std::iter::repeat(cohort).take(n));
    for (i, cohort) in cohorts.enumerate() {
        let org = &world.organizations[i % world.organizations.len()];
        let org_id = org.id;
        let deployment = if org.prefers_open_weights() { DeploymentType::Open } else { DeploymentType::Closed };
        let id = AgentId::new(i as u32 + 1);
        let name = format!("{}-{}", org.name.split_whitespace().next().unwrap_or("Model"), id.0);

        let mut agent = create_agent(id, name, org_id, cohort, deployment, 0, rng);
        let stage = i % 4;
        // Staging moves are valid by construction; stop at the first refusal
        let staged = match stage {
            0 => Ok(()),
            1 => lifecycle::transition(&mut agent, LifecycleState::Testing),
            _ => lifecycle::transition(&mut agent, LifecycleState::Testing).and_then(|_| lifecycle::deploy(&mut agent)),
        };
        if let Err(err) = staged {
            tracing::warn!(agent = %id, %err, "initial staging stopped early");
        }

        if let Err(err) = world.add_agent(agent) {
            tracing::warn!(agent = %id, %err, "initial agent dropped");
        }
    }
    world
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_default_world_shape() {
        let world = default_world(&mut SimRng::seed_from_u64(42));
        assert_eq!(world.organizations.len(), 6);
        assert_eq!(world.agents.len(), INITIAL_AGENTS);
        assert!(world.deployed_agents().count() >= INITIAL_AGENTS / 2);
        assert!(world.agents.iter().any(|a| a.lifecycle == LifecycleState::Training));
        assert!(world.validate().is_ok());
    }

    #[test]
    fn test_open_orgs_ship_open_weights() {
        let world = default_world(&mut SimRng::seed_from_u64(7));
        let open_org = world.organizations.iter().find(|o| o.name == "Open Collective").map(|o| o.id);
        for agent in world.deployed_agents().filter(|a| Some(a.organization_id) == open_org) {
            assert_eq!(agent.lifecycle, LifecycleState::DeployedOpen);
        }
    }

    #[test]
    fn test_same_seed_same_world() {
        let a = default_world(&mut SimRng::seed_from_u64(3));
        let b = default_world(&mut SimRng::seed_from_u64(3));
        assert_eq!(a, b);
    }
}
