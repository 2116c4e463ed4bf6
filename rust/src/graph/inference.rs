//! Rule-based implicit dependencies.
//!
//! Applied after the explicit dependencies are loaded:
//! 1. preparation -> ceremony, finish-to-start, 15 min
//! 2. ceremony -> cleanup, finish-to-start, 30 min
//! 3. critical/high ceremony -> photography, start-to-start
//! 4. catering activities chained in listed order, finish-to-start, 30 min
//! 5. traditional ceremony sequences matched by activity name; only
//!    adjacent steps that are both present are linked
//!
//! Rule 5 matches lower-cased names by substring, so "Post-Wedding Mehendi
//! Touch-up" is taken for the mehendi ceremony. An explicit sequence key from
//! the content generator would avoid this.

use chrono::Duration;

use crate::models::{Activity, ActivityType, CulturalRequirement, Dependency, DependencyType, Priority};

/// Ordered ceremonies of one tradition and the gap kept between them.
#[derive(Clone, Copy, Debug)]
pub struct CeremonySequence {
    pub tradition: CulturalRequirement,
    pub steps: &'static [&'static str],
    pub lag_minutes: i64,
}

impl CeremonySequence {
    pub fn lag(&self) -> Duration {
        Duration::minutes(self.lag_minutes)
    }

    /// The sequence kept for `tradition`, if it has one.
    pub fn for_tradition(tradition: CulturalRequirement) -> Option<&'static CeremonySequence> {
        CEREMONY_SEQUENCES.iter().find(|s| s.tradition == tradition)
    }

    /// The activity matched to each step, indexed like `steps`. Each
    /// activity takes the first step its name contains; a later activity
    /// matching the same step replaces an earlier one.
    pub fn match_steps<'a, I>(&self, activities: I) -> Vec<Option<&'a Activity>>
    where
        I: IntoIterator<Item = &'a Activity>,
    {
        let mut matched: Vec<Option<&Activity>> = vec![None; self.steps.len()];
        for activity in activities {
            let name = activity.name.to_lowercase();
            if let Some(step) = self.steps.iter().position(|s| name.contains(s)) {
                matched[step] = Some(activity);
            }
        }
        matched
    }
}

pub const CEREMONY_SEQUENCES: &[CeremonySequence] = &[
    CeremonySequence {
        tradition: CulturalRequirement::Hindu,
        steps: &["mehendi", "haldi", "sangeet", "wedding", "reception"],
        lag_minutes: 120,
    },
    CeremonySequence {
        tradition: CulturalRequirement::Muslim,
        steps: &["nikkah", "mehndi", "walima"],
        lag_minutes: 60,
    },
];

fn of_type(activities: &[Activity], activity_type: ActivityType) -> Vec<&Activity> {
    activities
        .iter()
        .filter(|a| a.activity_type == activity_type)
        .collect()
}

fn link(
    out: &mut Vec<Dependency>,
    pred: &Activity,
    succ: &Activity,
    dependency_type: DependencyType,
    lag: Duration,
) {
    if pred.id != succ.id {
        out.push(Dependency::new(pred.id.clone(), succ.id.clone(), dependency_type, lag));
    }
}

/// Derive the implicit dependencies for `activities`, in rule order.
///
/// Deterministic: the same input list always yields the same edges in the
/// same order.
pub fn infer_implicit_dependencies(activities: &[Activity]) -> Vec<Dependency> {
    let mut dependencies = Vec::new();

    let preparations = of_type(activities, ActivityType::Preparation);
    let ceremonies = of_type(activities, ActivityType::Ceremony);
    let cleanups = of_type(activities, ActivityType::Cleanup);
    let photography = of_type(activities, ActivityType::Photography);
    let catering = of_type(activities, ActivityType::Catering);

    for prep in &preparations {
        for ceremony in &ceremonies {
            link(
                &mut dependencies,
                prep,
                ceremony,
                DependencyType::FinishToStart,
                Duration::minutes(15),
            );
        }
    }

    for ceremony in &ceremonies {
        for cleanup in &cleanups {
            link(
                &mut dependencies,
                ceremony,
                cleanup,
                DependencyType::FinishToStart,
                Duration::minutes(30),
            );
        }
    }

    for photo in &photography {
        for ceremony in ceremonies
            .iter()
            .filter(|c| matches!(c.priority, Priority::Critical | Priority::High))
        {
            link(
                &mut dependencies,
                ceremony,
                photo,
                DependencyType::StartToStart,
                Duration::zero(),
            );
        }
    }

    for pair in catering.windows(2) {
        link(
            &mut dependencies,
            pair[0],
            pair[1],
            DependencyType::FinishToStart,
            Duration::minutes(30),
        );
    }

    for sequence in CEREMONY_SEQUENCES {
        let matched = sequence.match_steps(activities);
        for pair in matched.windows(2) {
            if let [Some(pred), Some(succ)] = pair {
                link(
                    &mut dependencies,
                    pred,
                    succ,
                    DependencyType::FinishToStart,
                    sequence.lag(),
                );
            }
        }
    }

    dependencies
}
