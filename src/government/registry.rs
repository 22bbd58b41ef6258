//! Action registry - the ordered set the decision engine iterates

use std::collections::BTreeMap;

use crate::government::action::{ActionCategory, ActionId, GovernmentAction};
use crate::government::actions;

/// Actions in iteration order. Selection ties go to the earlier entry.
pub struct ActionRegistry {
    actions: Vec<Box<dyn GovernmentAction>>,
    index: BTreeMap<ActionId, usize>,
    by_category: BTreeMap<ActionCategory, Vec<ActionId>>,
}

impl ActionRegistry {
    /// Every action, ordered as `ActionId::ALL`
    pub fn standard() -> Self {
        Self::from_actions(actions::all())
    }

    /// Registry restricted to `ids`, kept in the given order. Duplicates are dropped.
    pub fn with_ids(ids: &[ActionId]) -> Self {
        let mut seen = Vec::with_capacity(ids.len());
        for &id in ids {
            if !seen.contains(&id) {
                seen.push(id);
            }
        }
        Self::from_actions(seen.into_iter().map(actions::build).collect())
    }

    fn from_actions(actions: Vec<Box<dyn GovernmentAction>>) -> Self {
        let mut index = BTreeMap::new();
        let mut by_category: BTreeMap<ActionCategory, Vec<ActionId>> = BTreeMap::new();
        for (i, action) in actions.iter().enumerate() {
            index.insert(action.id(), i);
            by_category.entry(action.category()).or_default().push(action.id());
        }
        Self { actions, index, by_category }
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn get(&self, id: ActionId) -> Option<&dyn GovernmentAction> {
        self.index.get(&id).map(|&i| self.actions[i].as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn GovernmentAction> {
        self.actions.iter().map(|a| a.as_ref())
    }

    pub fn in_category(&self, category: ActionCategory) -> &[ActionId] {
        self.by_category.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_covers_every_action_in_order() {
        let registry = ActionRegistry::standard();
        assert_eq!(registry.len(), ActionId::ALL.len());
        let ids: Vec<_> = registry.iter().map(|a| a.id()).collect();
        assert_eq!(ids, ActionId::ALL.to_vec());
    }

    #[test]
    fn test_every_action_is_a_government_action() {
        for action in ActionRegistry::standard().iter() {
            assert_eq!(action.agent_type(), "government");
            assert!(action.energy_cost() > 0.0);
        }
    }

    #[test]
    fn test_category_index() {
        let registry = ActionRegistry::standard();
        assert_eq!(
            registry.in_category(ActionCategory::Detection),
            &[ActionId::RunDetectionSweep, ActionId::RemoveFlaggedAgents]
        );
        let total: usize = ActionCategory::ALL.iter().map(|&c| registry.in_category(c).len()).sum();
        assert_eq!(total, registry.len());
    }

    #[test]
    fn test_with_ids_keeps_given_order() {
        let registry = ActionRegistry::with_ids(&[ActionId::StimulusPackage, ActionId::AutomationTax, ActionId::StimulusPackage]);
        let ids: Vec<_> = registry.iter().map(|a| a.id()).collect();
        assert_eq!(ids, vec![ActionId::StimulusPackage, ActionId::AutomationTax]);
        assert!(registry.get(ActionId::DeclareEmergency).is_none());
    }
}
