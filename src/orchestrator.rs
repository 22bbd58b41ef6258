//! Phase orchestrator
//!
//! Holds the ordered registry of monthly update routines. Orders are sparse
//! floats (20.1, 20.2, 31.0, ...) so a new phase can be slotted between two
//! existing ones without renumbering. Phases with equal order run in
//! registration order.
//!
//! A phase that returns `Err` aborts the month; the orchestrator does not
//! skip or retry. Phases clamp their own derived values.

use ordered_float::OrderedFloat;

use crate::core::error::{Result, SimError};
use crate::core::types::SimRng;
use crate::state::events::GameEvent;
use crate::state::world::WorldState;

/// Everything a phase hands back to the orchestrator
#[derive(Debug, Default)]
pub struct PhaseOutput {
    pub events: Vec<GameEvent>,
}

impl PhaseOutput {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_events(events: Vec<GameEvent>) -> Self {
        Self { events }
    }
}

/// One named monthly update routine
pub trait Phase {
    /// Unique within an orchestrator
    fn id(&self) -> &str;

    fn name(&self) -> &str;

    /// Sort key, ascending. Need not be unique.
    fn order(&self) -> f64;

    fn execute(&self, state: &mut WorldState, rng: &mut SimRng) -> Result<PhaseOutput>;
}

type PhaseFn = dyn Fn(&mut WorldState, &mut SimRng) -> Result<PhaseOutput>;

/// Phase backed by a closure. Handy for one-off plug-ins and tests.
pub struct FnPhase {
    id: String,
    name: String,
    order: f64,
    run: Box<PhaseFn>,
}

impl FnPhase {
    pub fn new<F>(id: impl Into<String>, name: impl Into<String>, order: f64, run: F) -> Self
    where
        F: Fn(&mut WorldState, &mut SimRng) -> Result<PhaseOutput> + 'static,
    {
        Self { id: id.into(), name: name.into(), order, run: Box::new(run) }
    }
}

impl Phase for FnPhase {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn order(&self) -> f64 {
        self.order
    }

    fn execute(&self, state: &mut WorldState, rng: &mut SimRng) -> Result<PhaseOutput> {
        (self.run)(state, rng)
    }
}

#[derive(Default)]
pub struct PhaseOrchestrator {
    /// Kept sorted by order; stable sort preserves registration order on ties
    phases: Vec<Box<dyn Phase>>,
}

impl PhaseOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_phase(&mut self, phase: Box<dyn Phase>) -> Result<()> {
        if !phase.order().is_finite() {
            return Err(SimError::ContractViolation(format!(
                "phase {} has non-finite order {}",
                phase.id(),
                phase.order()
            )));
        }
        if self.phases.iter().any(|p| p.id() == phase.id()) {
            return Err(SimError::DuplicatePhase(phase.id().to_string()));
        }

        self.phases.push(phase);
        self.phases.sort_by_key(|p| OrderedFloat(p.order()));
        Ok(())
    }

    pub fn register_all(&mut self, phases: impl IntoIterator<Item = Box<dyn Phase>>) -> Result<()> {
        for phase in phases {
            self.register_phase(phase)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    /// Phase ids in execution order
    pub fn phase_ids(&self) -> Vec<&str> {
        self.phases.iter().map(|p| p.id()).collect()
    }

    /// Run every phase once, in order, and collect their events
    pub fn step(&self, state: &mut WorldState, rng: &mut SimRng) -> Result<Vec<GameEvent>> {
        let mut events = Vec::new();
        for phase in &self.phases {
            tracing::trace!(phase = phase.id(), order = phase.order(), month = state.month, "running phase");
            let output = phase.execute(state, rng)?;
            events.extend(output.events);
        }
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::events::{EventType, Severity};
    use rand::SeedableRng;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recording_phase(id: &'static str, order: f64, log: Rc<RefCell<Vec<&'static str>>>) -> Box<dyn Phase> {
        Box::new(FnPhase::new(id, id, order, move |state, _rng| {
            log.borrow_mut().push(id);
            Ok(PhaseOutput::with_events(vec![GameEvent::new(
                state.month,
                EventType::GovernmentAction,
                Severity::Info,
                id,
                "",
            )]))
        }))
    }

    fn empty_world() -> WorldState {
        WorldState::new(vec![], vec![])
    }

    #[test]
    fn test_runs_in_ascending_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut orchestrator = PhaseOrchestrator::new();
        orchestrator.register_phase(recording_phase("c", 31.0, log.clone())).unwrap();
        orchestrator.register_phase(recording_phase("a", 20.1, log.clone())).unwrap();
        orchestrator.register_phase(recording_phase("b", 20.2, log.clone())).unwrap();

        let mut rng = SimRng::seed_from_u64(1);
        let events = orchestrator.step(&mut empty_world(), &mut rng).unwrap();

        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
        let titles: Vec<_> = events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_ties_keep_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut orchestrator = PhaseOrchestrator::new();
        orchestrator.register_phase(recording_phase("second", 5.0, log.clone())).unwrap();
        orchestrator.register_phase(recording_phase("first", 1.0, log.clone())).unwrap();
        orchestrator.register_phase(recording_phase("third", 5.0, log.clone())).unwrap();
        assert_eq!(orchestrator.phase_ids(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_interposed_phase_needs_no_renumbering() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut orchestrator = PhaseOrchestrator::new();
        orchestrator.register_phase(recording_phase("economy", 20.1, log.clone())).unwrap();
        orchestrator.register_phase(recording_phase("society", 20.3, log.clone())).unwrap();
        orchestrator.register_phase(recording_phase("orgs", 20.2, log.clone())).unwrap();
        assert_eq!(orchestrator.phase_ids(), vec!["economy", "orgs", "society"]);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut orchestrator = PhaseOrchestrator::new();
        orchestrator.register_phase(recording_phase("x", 1.0, log.clone())).unwrap();
        let err = orchestrator.register_phase(recording_phase("x", 2.0, log)).unwrap_err();
        assert!(matches!(err, SimError::DuplicatePhase(_)));
        assert_eq!(orchestrator.len(), 1);
    }

    #[test]
    fn test_nan_order_rejected() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut orchestrator = PhaseOrchestrator::new();
        assert!(orchestrator.register_phase(recording_phase("nan", f64::NAN, log)).is_err());
    }

    #[test]
    fn test_failing_phase_aborts_month() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut orchestrator = PhaseOrchestrator::new();
        orchestrator.register_phase(recording_phase("before", 1.0, log.clone())).unwrap();
        orchestrator
            .register_phase(Box::new(FnPhase::new("broken", "broken", 2.0, |_, _| {
                Err(SimError::ContractViolation("missing field".into()))
            })))
            .unwrap();
        orchestrator.register_phase(recording_phase("after", 3.0, log.clone())).unwrap();

        let mut rng = SimRng::seed_from_u64(1);
        let result = orchestrator.step(&mut empty_world(), &mut rng);
        assert!(result.is_err());
        assert_eq!(*log.borrow(), vec!["before"]);
    }
}
