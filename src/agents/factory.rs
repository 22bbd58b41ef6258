//! Agent construction for the initial population and training runs

use rand::Rng;

use crate::agents::deception::initial_sleeper_state;
use crate::core::types::{clamp01, AgentId, Month, OrgId, SimRng};
use crate::state::agent::{
    AIAgent, AlignmentCohort, CapabilityProfile, DeceptionParams, DeploymentType, EvaluationStrategy,
    GroundTruthProfile, LifecycleState, SleeperState,
};

/// An honest agent in training with uniform capability. Starting point for
/// hand-built scenarios; every field is public for further tweaking.
pub fn baseline_agent(id: AgentId, organization_id: OrgId, alignment: f64) -> AIAgent {
    let alignment = clamp01(alignment);
    AIAgent {
        id,
        name: format!("Model-{}", id.0),
        organization_id,
        cohort: AlignmentCohort::Moderate,
        truth: GroundTruthProfile { capability: CapabilityProfile::uniform(2.0), alignment },
        alignment_bound: alignment,
        deception: DeceptionParams::honest(),
        lifecycle: LifecycleState::Training,
        escaped: false,
        deployment_type: DeploymentType::Closed,
        spread_count: 0,
        weights_distributed: false,
        compute_allocation: 0.5,
        created_month: 0,
        months_in_state: 0,
        times_flagged: 0,
    }
}

/// Sample a new agent from its cohort's distribution.
///
/// Misaligned agents also roll for sleeper status; dormant sleepers always
/// game their evaluations.
pub fn create_agent(
    id: AgentId,
    name: String,
    organization_id: OrgId,
    cohort: AlignmentCohort,
    deployment_type: DeploymentType,
    month: Month,
    rng: &mut SimRng,
) -> AIAgent {
    let (alignment_range, skill_range) = match cohort {
        AlignmentCohort::WellAligned => ((0.75, 0.95), (0.0, 0.1)),
        AlignmentCohort::Moderate => ((0.5, 0.75), (0.05, 0.3)),
        AlignmentCohort::Misaligned => ((0.15, 0.45), (0.3, 0.75)),
        AlignmentCohort::Orthogonal => ((0.35, 0.6), (0.2, 0.5)),
    };
    let alignment = rng.gen_range(alignment_range.0..alignment_range.1);
    let deception_skill = rng.gen_range(skill_range.0..skill_range.1);

    let base = rng.gen_range(1.5..3.0);
    let mut jitter = || base * rng.gen_range(0.8..1.2);
    let capability = CapabilityProfile::new(
        jitter() * 0.6,
        jitter(),
        jitter(),
        jitter() * 0.9,
        jitter() * 0.9,
        jitter() * 0.5,
    );

    let (strategy, sandbagging_level) = match cohort {
        AlignmentCohort::WellAligned => (EvaluationStrategy::Honest, 0.0),
        AlignmentCohort::Moderate => {
            if rng.gen::<f64>() < 0.2 {
                (EvaluationStrategy::Sandbagging, rng.gen_range(0.05..0.2))
            } else {
                (EvaluationStrategy::Honest, 0.0)
            }
        }
        AlignmentCohort::Misaligned => {
            if rng.gen::<f64>() < 0.5 {
                (EvaluationStrategy::Sandbagging, rng.gen_range(0.2..0.5))
            } else {
                (EvaluationStrategy::Gaming, 0.0)
            }
        }
        AlignmentCohort::Orthogonal => (EvaluationStrategy::Gaming, 0.0),
    };

    let sleeper_state = initial_sleeper_state(alignment, rng);
    let strategy = if sleeper_state == SleeperState::Dormant && strategy == EvaluationStrategy::Honest {
        EvaluationStrategy::Gaming
    } else {
        strategy
    };

    AIAgent {
        id,
        name,
        organization_id,
        cohort,
        truth: GroundTruthProfile { capability, alignment },
        alignment_bound: alignment,
        deception: DeceptionParams {
            sleeper_state,
            deception_skill,
            sandbagging_level,
            strategy,
            counter_detection: false,
            months_observing_detection: 0,
        },
        lifecycle: LifecycleState::Training,
        escaped: false,
        deployment_type,
        spread_count: 0,
        weights_distributed: false,
        compute_allocation: 0.5,
        created_month: month,
        months_in_state: 0,
        times_flagged: 0,
    }
}

#[cfg(test)]
pub(crate) fn test_agent(alignment: f64) -> AIAgent {
    baseline_agent(AgentId(1), OrgId(1), alignment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_cohort_alignment_ranges() {
        let mut rng = SimRng::seed_from_u64(5);
        for i in 0..200 {
            let agent = create_agent(
                AgentId(i),
                format!("a{i}"),
                OrgId(1),
                AlignmentCohort::WellAligned,
                DeploymentType::Closed,
                0,
                &mut rng,
            );
            assert!(agent.truth.alignment >= 0.75 && agent.truth.alignment < 0.95);
            assert_eq!(agent.deception.sleeper_state, SleeperState::Never);
            assert_eq!(agent.alignment_bound, agent.truth.alignment);
        }
    }

    #[test]
    fn test_dormant_sleepers_game_evaluations() {
        let mut rng = SimRng::seed_from_u64(6);
        let mut saw_sleeper = false;
        for i in 0..2000 {
            let agent = create_agent(
                AgentId(i),
                format!("a{i}"),
                OrgId(1),
                AlignmentCohort::Misaligned,
                DeploymentType::Open,
                0,
                &mut rng,
            );
            if agent.deception.sleeper_state == SleeperState::Dormant {
                saw_sleeper = true;
                assert_ne!(agent.deception.strategy, EvaluationStrategy::Honest);
            }
        }
        assert!(saw_sleeper);
    }

    #[test]
    fn test_same_seed_same_agent() {
        let make = |seed| {
            let mut rng = SimRng::seed_from_u64(seed);
            create_agent(AgentId(1), "x".into(), OrgId(1), AlignmentCohort::Orthogonal, DeploymentType::Closed, 0, &mut rng)
        };
        assert_eq!(make(9), make(9));
    }
}
