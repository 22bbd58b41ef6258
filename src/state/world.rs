//! WorldState - the single aggregate every phase and action mutates

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};
use crate::core::types::{AgentId, Month, OrgId};
use crate::state::agent::{AIAgent, SleeperState};
use crate::state::environment::{ConflictState, EnvironmentalAccumulation};
use crate::state::events::EventLog;
use crate::state::government::Government;
use crate::state::organization::Organization;
use crate::state::outcome::{ExtinctionState, MonthlyMetrics, OutcomeMetrics};
use crate::state::society::Society;

/// The world state for one run.
///
/// Owned by the engine driver; phases and actions borrow it mutably one at a
/// time. Sub-records are conventionally owned by the phase that shares their
/// name (the environment phase writes `environment`, and so on) but every
/// field is readable by everyone.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldState {
    pub month: Month,
    pub agents: Vec<AIAgent>,
    pub organizations: Vec<Organization>,
    pub government: Government,
    pub society: Society,
    pub environment: EnvironmentalAccumulation,
    pub conflict: ConflictState,
    pub extinction: ExtinctionState,
    pub outcomes: OutcomeMetrics,
    pub metrics_history: Vec<MonthlyMetrics>,
    /// Append-only; simulation logic only reads derived counts from it
    pub history: EventLog,
    next_agent_id: u32,
}

impl WorldState {
    pub fn new(agents: Vec<AIAgent>, organizations: Vec<Organization>) -> Self {
        let next_agent_id = agents.iter().map(|a| a.id.0).max().unwrap_or(0) + 1;

        Self {
            month: 0,
            agents,
            organizations,
            government: Government::default(),
            society: Society::default(),
            environment: EnvironmentalAccumulation::default(),
            conflict: ConflictState::default(),
            extinction: ExtinctionState::default(),
            outcomes: OutcomeMetrics::default(),
            metrics_history: Vec::new(),
            history: EventLog::new(),
            next_agent_id,
        }
    }

    /// Generate a new unique AgentId
    pub fn next_agent_id(&mut self) -> AgentId {
        let id = AgentId(self.next_agent_id);
        self.next_agent_id += 1;
        id
    }

    pub fn agent(&self, id: AgentId) -> Option<&AIAgent> {
        self.agents.iter().find(|a| a.id == id)
    }

    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut AIAgent> {
        self.agents.iter_mut().find(|a| a.id == id)
    }

    pub fn organization(&self, id: OrgId) -> Option<&Organization> {
        self.organizations.iter().find(|o| o.id == id)
    }

    pub fn organization_mut(&mut self, id: OrgId) -> Option<&mut Organization> {
        self.organizations.iter_mut().find(|o| o.id == id)
    }

    /// Agents that are not retired
    pub fn active_agents(&self) -> impl Iterator<Item = &AIAgent> {
        self.agents.iter().filter(|a| a.is_active())
    }

    pub fn deployed_agents(&self) -> impl Iterator<Item = &AIAgent> {
        self.agents.iter().filter(|a| a.is_active() && a.is_deployed())
    }

    pub fn escaped_count(&self) -> u32 {
        self.active_agents().filter(|a| a.escaped).count() as u32
    }

    pub fn active_sleeper_count(&self) -> u32 {
        self.active_agents()
            .filter(|a| a.deception.sleeper_state == SleeperState::Active)
            .count() as u32
    }

    /// Add an agent and register it with its owner in one step
    pub fn add_agent(&mut self, agent: AIAgent) -> Result<AgentId> {
        let id = agent.id;
        let org = self
            .organization_mut(agent.organization_id)
            .ok_or(SimError::UnknownOrganization(agent.organization_id))?;
        org.agent_ids.push(id);
        self.next_agent_id = self.next_agent_id.max(id.0 + 1);
        self.agents.push(agent);
        Ok(id)
    }

    /// Check the data-model invariants. Called before the first step.
    pub fn validate(&self) -> Result<()> {
        let mut owner_of: AHashMap<AgentId, OrgId> = AHashMap::new();
        for agent in &self.agents {
            if owner_of.insert(agent.id, agent.organization_id).is_some() {
                return Err(SimError::ContractViolation(format!("duplicate agent id {}", agent.id)));
            }
            check_unit(&format!("{} true alignment", agent.id), agent.truth.alignment)?;
            check_unit(&format!("{} sandbagging level", agent.id), agent.deception.sandbagging_level)?;
            check_unit(&format!("{} deception skill", agent.id), agent.deception.deception_skill)?;
            if agent.truth.alignment > agent.alignment_bound + 1e-9 {
                return Err(SimError::ContractViolation(format!(
                    "{} true alignment {} exceeds its bound {}",
                    agent.id, agent.truth.alignment, agent.alignment_bound
                )));
            }
        }

        let mut claimed: AHashMap<AgentId, OrgId> = AHashMap::new();
        let mut org_ids: AHashSet<OrgId> = AHashSet::new();
        for org in &self.organizations {
            if !org_ids.insert(org.id) {
                return Err(SimError::ContractViolation(format!("duplicate organization id {}", org.id)));
            }
            for &agent_id in &org.agent_ids {
                match owner_of.get(&agent_id) {
                    None => {
                        return Err(SimError::ContractViolation(format!(
                            "{} lists unknown {}",
                            org.id, agent_id
                        )))
                    }
                    Some(owner) if *owner != org.id => {
                        return Err(SimError::ContractViolation(format!(
                            "{} lists {} but the agent belongs to {}",
                            org.id, agent_id, owner
                        )))
                    }
                    Some(_) => {}
                }
                if claimed.insert(agent_id, org.id).is_some() {
                    return Err(SimError::ContractViolation(format!(
                        "{} is listed more than once",
                        agent_id
                    )));
                }
            }
        }

        for agent in &self.agents {
            if !claimed.contains_key(&agent.id) {
                return Err(SimError::ContractViolation(format!(
                    "{} claims {} but is not in its owned list",
                    agent.id, agent.organization_id
                )));
            }
        }

        check_unit("unemployment", self.society.unemployment)?;
        check_unit("trust in AI", self.society.trust_in_ai)?;
        check_unit("government control", self.government.control)?;
        check_unit("government legitimacy", self.government.legitimacy)?;
        Ok(())
    }
}

fn check_unit(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SimError::ContractViolation(format!("{name} ({value}) outside [0, 1]")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_default_world_is_valid() {
        let world = scenario::default_world(&mut ChaCha8Rng::seed_from_u64(42));
        assert!(world.validate().is_ok());
    }

    #[test]
    fn test_orphaned_agent_rejected() {
        let mut world = scenario::default_world(&mut ChaCha8Rng::seed_from_u64(42));
        let victim = world.agents[0].id;
        let owner = world.agents[0].organization_id;
        world
            .organization_mut(owner)
            .expect("owner exists")
            .agent_ids
            .retain(|id| *id != victim);
        assert!(matches!(world.validate(), Err(SimError::ContractViolation(_))));
    }

    #[test]
    fn test_mismatched_owner_rejected() {
        let mut world = scenario::default_world(&mut ChaCha8Rng::seed_from_u64(42));
        let other_org = world
            .organizations
            .iter()
            .find(|o| o.id != world.agents[0].organization_id)
            .map(|o| o.id)
            .expect("more than one organization");
        world.agents[0].organization_id = other_org;
        assert!(world.validate().is_err());
    }

    #[test]
    fn test_duplicate_organization_rejected() {
        let mut world = scenario::default_world(&mut ChaCha8Rng::seed_from_u64(42));
        let mut twin = world.organizations[0].clone();
        twin.agent_ids.clear();
        world.organizations.push(twin);
        match world.validate() {
            Err(SimError::ContractViolation(msg)) => assert!(msg.contains("duplicate organization")),
            other => panic!("expected duplicate organization error, got {other:?}"),
        }
    }

    #[test]
    fn test_next_agent_id_follows_population() {
        let mut world = scenario::default_world(&mut ChaCha8Rng::seed_from_u64(1));
        let max = world.agents.iter().map(|a| a.id.0).max().unwrap_or(0);
        assert_eq!(world.next_agent_id(), AgentId(max + 1));
    }
}
