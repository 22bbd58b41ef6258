//! Organization - an AI developer that owns agents and compute

use serde::{Deserialize, Serialize};

use crate::core::types::{AgentId, OrgId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComputeStrategy {
    /// Spread compute evenly across active agents
    Balanced,
    /// Most compute to the single most capable agent
    FocusFlagship,
    /// Favour agents still in training
    TrainNew,
    /// Cut total spend, keep existing allocation shape
    Efficiency,
}

/// Priority weights, each in [0, 1]
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrgPriorities {
    pub profit: f64,
    pub safety: f64,
    pub openness: f64,
    pub race_intensity: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DataCenter {
    pub name: String,
    /// Compute units delivered per month
    pub capacity: f64,
    pub operational: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrgId,
    pub name: String,
    /// Owned agents; must mirror `AIAgent::organization_id`
    pub agent_ids: Vec<AgentId>,
    pub data_centers: Vec<DataCenter>,

    pub capital: f64,
    pub monthly_revenue: f64,
    pub monthly_expenses: f64,

    pub priorities: OrgPriorities,
    pub compute_strategy: ComputeStrategy,
    /// Months of negative capital; the organization folds after a year
    pub months_insolvent: u32,
    pub bankrupt: bool,
}

impl Organization {
    pub fn owns(&self, agent: AgentId) -> bool {
        self.agent_ids.contains(&agent)
    }

    pub fn total_compute(&self) -> f64 {
        self.data_centers
            .iter()
            .filter(|dc| dc.operational)
            .map(|dc| dc.capacity)
            .sum()
    }

    /// Deployments default to open weights for openness-first organizations
    pub fn prefers_open_weights(&self) -> bool {
        self.priorities.openness > 0.6
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn org() -> Organization {
        Organization {
            id: OrgId(1),
            name: "Test Lab".to_string(),
            agent_ids: vec![AgentId(1), AgentId(2)],
            data_centers: vec![
                DataCenter { name: "A".into(), capacity: 10.0, operational: true },
                DataCenter { name: "B".into(), capacity: 5.0, operational: false },
            ],
            capital: 100.0,
            monthly_revenue: 5.0,
            monthly_expenses: 4.0,
            priorities: OrgPriorities { profit: 0.5, safety: 0.5, openness: 0.7, race_intensity: 0.3 },
            compute_strategy: ComputeStrategy::Balanced,
            months_insolvent: 0,
            bankrupt: false,
        }
    }

    #[test]
    fn test_total_compute_ignores_offline_centers() {
        assert_eq!(org().total_compute(), 10.0);
    }

    #[test]
    fn test_owns() {
        let o = org();
        assert!(o.owns(AgentId(2)));
        assert!(!o.owns(AgentId(3)));
        assert!(o.prefers_open_weights());
    }
}
