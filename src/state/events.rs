//! Game events and the append-only event log

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::types::Month;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Minor,
    Major,
    Critical,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    AgentTrained,
    AgentDeployed,
    AgentRetired,
    AgentEscaped,
    SleeperActivated,
    DetectionSweep,
    AgentRemoved,
    PolicyEnacted,
    RegulationEnacted,
    GovernmentAction,
    EconomicShift,
    OrganizationBankrupt,
    EnvironmentalCrisis,
    ConflictEscalation,
    Catastrophe,
    OutcomeLockedIn,
}

/// Immutable record of something that happened. Reporting only; simulation
/// logic may count events but never reads their contents back.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    pub month: Month,
    pub event_type: EventType,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub effects: BTreeMap<String, f64>,
}

impl GameEvent {
    pub fn new(
        month: Month,
        event_type: EventType,
        severity: Severity,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            month,
            event_type,
            severity,
            title: title.into(),
            description: description.into(),
            effects: BTreeMap::new(),
        }
    }

    pub fn with_effect(mut self, key: impl Into<String>, value: f64) -> Self {
        self.effects.insert(key.into(), value);
        self
    }
}

/// The complete event history of a run
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    pub events: Vec<GameEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, events: impl IntoIterator<Item = GameEvent>) {
        self.events.extend(events);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events_for_month(&self, month: Month) -> impl Iterator<Item = &GameEvent> {
        self.events.iter().filter(move |e| e.month == month)
    }

    /// Events of a type within the last `window` months, inclusive of `now`.
    ///
    /// Events are appended in month order, so the scan walks back from the
    /// newest entry and stops at the first event older than the window.
    pub fn count_recent(&self, event_type: EventType, now: Month, window: u32) -> usize {
        let start = now.saturating_sub(window.saturating_sub(1));
        self.events
            .iter()
            .rev()
            .skip_while(|e| e.month > now)
            .take_while(|e| e.month >= start)
            .filter(|e| e.event_type == event_type)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_recent_window() {
        let mut log = EventLog::new();
        for month in 0..10 {
            log.extend([GameEvent::new(month, EventType::AgentDeployed, Severity::Info, "d", "")]);
        }
        log.extend([GameEvent::new(9, EventType::Catastrophe, Severity::Critical, "c", "")]);
        assert_eq!(log.count_recent(EventType::AgentDeployed, 9, 6), 6);
        assert_eq!(log.count_recent(EventType::Catastrophe, 9, 6), 1);
        assert_eq!(log.events_for_month(9).count(), 2);
    }

    #[test]
    fn test_count_recent_ignores_events_outside_the_window() {
        let mut log = EventLog::new();
        for month in 0..120 {
            log.extend([
                GameEvent::new(month, EventType::AgentEscaped, Severity::Critical, "e", ""),
                GameEvent::new(month, EventType::AgentDeployed, Severity::Info, "d", ""),
            ]);
        }
        assert_eq!(log.count_recent(EventType::AgentEscaped, 119, 12), 12);
        assert_eq!(log.count_recent(EventType::AgentEscaped, 60, 12), 12);
        assert_eq!(log.count_recent(EventType::AgentEscaped, 5, 12), 6);
        assert_eq!(log.count_recent(EventType::AgentEscaped, 200, 12), 0);
    }

    #[test]
    fn test_with_effect() {
        let event = GameEvent::new(1, EventType::PolicyEnacted, Severity::Major, "UBI", "")
            .with_effect("unemployment", -0.05);
        assert_eq!(event.effects.get("unemployment"), Some(&-0.05));
    }
}
