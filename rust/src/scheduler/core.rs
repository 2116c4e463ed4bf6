//! End-to-end planning pipeline.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::config::PlanningConfig;
use crate::conflicts::{resolve_conflicts, validate_timeline, Conflict, ValidationIssue};
use crate::critical_path::analyze;
use crate::duration::{
    apply_context_adjustments, ActivityDurationCalculator, DurationCalculation, GuestCountBand,
    VenueAdjustments,
};
use crate::error::{PlanningError, PlanningResult};
use crate::graph::DependencyGraph;
use crate::models::{Activity, Dependency, EventContext, TimedActivity, Timeline};
use crate::optimizer::Suggestion;
use crate::{log_decision, log_stage};

use super::context::{add_cultural_notes, adjust_for_venue};

/// Everything needed to plan one event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanningRequest {
    pub activities: Vec<Activity>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
    pub context: EventContext,
    pub project_start: NaiveDateTime,
}

/// The timeline plus every advisory produced while building it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlanningOutcome {
    pub timeline: Timeline,
    pub conflicts: Vec<Conflict>,
    pub suggestions: Vec<Suggestion>,
    pub validation_issues: Vec<ValidationIssue>,
    /// Empty when duration adjustment is disabled.
    pub duration_adjustments: Vec<DurationCalculation>,
}

impl PlanningOutcome {
    /// Any activity with negative slack. Callers should treat this as fatal.
    pub fn is_over_constrained(&self) -> bool {
        self.conflicts
            .iter()
            .any(|c| matches!(c, Conflict::OverConstrained { .. }))
    }

    pub fn has_fatal_issues(&self) -> bool {
        self.validation_issues.iter().any(ValidationIssue::is_fatal)
    }
}

/// Runs duration and context adjustment -> build -> cycle check -> CPM ->
/// buffers -> day packing -> conflicts -> suggestions -> validation for one
/// request.
///
/// Holds no state between calls; a planner can be shared freely.
#[derive(Clone, Debug, Default)]
pub struct TimelinePlanner {
    config: PlanningConfig,
}

impl TimelinePlanner {
    pub fn new(config: PlanningConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlanningConfig {
        &self.config
    }

    pub fn plan(&self, request: PlanningRequest) -> PlanningResult<PlanningOutcome> {
        let verbosity = self.config.verbosity;
        self.config.validate()?;

        let PlanningRequest {
            mut activities,
            dependencies,
            context,
            project_start,
        } = request;

        let problems = context.validate();
        if !problems.is_empty() {
            return Err(PlanningError::validation("event context", problems));
        }
        if activities.is_empty() {
            return Err(PlanningError::validation(
                "planning request",
                vec!["At least one activity is required".to_string()],
            ));
        }

        let duration_adjustments = if self.config.apply_duration_adjustments {
            ActivityDurationCalculator::default().apply(&mut activities, &context)?
        } else {
            Vec::new()
        };
        if self.config.apply_context_adjustments {
            apply_context_adjustments(&mut activities, &context, verbosity);
        }

        let mut graph = DependencyGraph::from_parts(&activities, &dependencies, true, verbosity)?;
        log_stage!(
            verbosity,
            "Built dependency graph: {} activities, {} dependencies",
            graph.len(),
            graph.dependencies.len()
        );
        if graph.has_cycle() {
            log_stage!(verbosity, "Dependency graph contains a cycle");
        }

        analyze(&mut graph, project_start, verbosity)?;
        let candidates = self.candidates(&graph, &context)?;
        let mut packer = self.config.packer();
        if self.config.apply_context_adjustments {
            packer = packer
                .with_coordination_buffer(GuestCountBand::for_guests(context.guest_count).coordination_buffer());
        }
        let days = packer.pack(candidates, project_start)?;

        let conflicts = resolve_conflicts(&graph);
        for conflict in &conflicts {
            log_decision!(verbosity, "conflict: {}", conflict);
        }
        let suggestions = self.config.optimizer().suggest(&graph);
        let validation_issues = validate_timeline(&graph);

        let buffer_time = days
            .iter()
            .flat_map(|d| d.activities.iter())
            .fold(Duration::zero(), |acc, t| acc + t.buffer_before + t.buffer_after);
        let total_estimated_cost = days.iter().map(|d| d.estimated_cost).sum();

        let timeline = Timeline {
            days,
            total_duration: graph.total_duration,
            critical_path: graph.critical_path.clone(),
            buffer_time,
            dependencies: graph.dependencies.clone(),
            total_estimated_cost,
        };
        log_stage!(
            verbosity,
            "Timeline produced: {} days, {} conflicts, {} suggestions",
            timeline.days.len(),
            conflicts.len(),
            suggestions.len()
        );

        Ok(PlanningOutcome {
            timeline,
            conflicts,
            suggestions,
            validation_issues,
            duration_adjustments,
        })
    }

    /// Timed activities in topological order with buffers, venue
    /// contingencies and cultural notes applied.
    fn candidates(
        &self,
        graph: &DependencyGraph,
        context: &EventContext,
    ) -> PlanningResult<Vec<TimedActivity>> {
        let calculator = self.config.buffer_calculator();
        let venue = VenueAdjustments::for_venue(context.venue_type);
        let band = GuestCountBand::for_guests(context.guest_count);
        let adjust = self.config.apply_context_adjustments;

        let mut candidates: Vec<TimedActivity> = graph
            .topological_sort()?
            .into_iter()
            .filter_map(|id| graph.node(&id).map(|node| (id, node)))
            .map(|(id, node)| {
                let activity = node.activity.clone();
                let buffer_before = calculator.calculate_buffer_time(
                    &activity,
                    context.complexity_score,
                    graph.dependency_count(&id),
                );
                log_decision!(
                    self.config.verbosity,
                    "buffer for {}: {}s",
                    id,
                    buffer_before.num_seconds()
                );
                let mut timed = TimedActivity::unscheduled(activity, buffer_before, self.config.buffer_after);
                if adjust {
                    adjust_for_venue(&mut timed, context, &venue, band);
                }
                timed
            })
            .collect();
        if adjust {
            add_cultural_notes(&mut candidates, context);
        }
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityType, CulturalRequirement, DependencyType, Priority, VenueType};
    use chrono::NaiveDate;

    fn t(day: u32, h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 12, day)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn make_activity(id: &str, activity_type: ActivityType, minutes: i64) -> Activity {
        Activity::new(id, id.to_uppercase(), activity_type, Duration::minutes(minutes), Priority::High)
            .with_cost(250.0)
    }

    fn request(activities: Vec<Activity>, dependencies: Vec<Dependency>, context: EventContext) -> PlanningRequest {
        PlanningRequest {
            activities,
            dependencies,
            context,
            project_start: t(6, 9, 0, 0),
        }
    }

    fn small_indoor() -> EventContext {
        EventContext::new(80, VenueType::Indoor, 2.0, 1)
    }

    #[test]
    fn test_prep_ceremony_cleanup_end_to_end() {
        let planner = TimelinePlanner::default();
        let outcome = planner
            .plan(request(
                vec![
                    make_activity("a", ActivityType::Preparation, 60),
                    make_activity("b", ActivityType::Ceremony, 120),
                    make_activity("c", ActivityType::Cleanup, 60),
                ],
                vec![],
                small_indoor(),
            ))
            .unwrap();

        let timeline = &outcome.timeline;
        assert_eq!(timeline.critical_path, vec!["a", "b", "c"]);
        assert_eq!(timeline.total_duration, Duration::minutes(285));
        assert_eq!(timeline.days.len(), 1);
        assert_eq!(timeline.dependencies.len(), 2);
        assert_eq!(timeline.total_estimated_cost, 750.0);

        // b: 2h x 20% x 1.1 (two neighbours) = 26m 24s, raised to the 30m
        // coordination floor of a 51-150 guest event
        let b = timeline.find("b").unwrap();
        assert_eq!(b.buffer_before, Duration::minutes(30));
        assert_eq!((b.start_time, b.end_time), (t(6, 11, 0, 0), t(6, 13, 0, 0)));
        assert_eq!(timeline.buffer_time, Duration::minutes(120));

        assert!(outcome.conflicts.is_empty());
        assert!(outcome.validation_issues.is_empty());
        assert!(!outcome.is_over_constrained());
        assert!(timeline.validate().is_empty());
        assert_eq!(outcome.duration_adjustments.len(), 3);
    }

    #[test]
    fn test_packed_order_respects_finish_to_start() {
        let planner = TimelinePlanner::default();
        let outcome = planner
            .plan(request(
                vec![
                    make_activity("dinner", ActivityType::Catering, 90),
                    make_activity("prep", ActivityType::Preparation, 120),
                    make_activity("vows", ActivityType::Ceremony, 60),
                    make_activity("photos", ActivityType::Photography, 60),
                    make_activity("lunch", ActivityType::Catering, 60),
                    make_activity("teardown", ActivityType::Cleanup, 90),
                ],
                vec![Dependency::new("vows", "dinner", DependencyType::FinishToStart, Duration::zero())],
                small_indoor(),
            ))
            .unwrap();

        let timeline = &outcome.timeline;
        assert_eq!(timeline.activity_count(), 6);
        for dep in &timeline.dependencies {
            let pred = timeline.find(&dep.predecessor_id).unwrap();
            let succ = timeline.find(&dep.successor_id).unwrap();
            match dep.dependency_type {
                DependencyType::FinishToStart => assert!(pred.end_time <= succ.start_time),
                DependencyType::StartToStart => assert!(pred.start_time <= succ.start_time),
                _ => {}
            }
        }
    }

    #[test]
    fn test_identical_requests_produce_identical_output() {
        let planner = TimelinePlanner::default();
        let build = || {
            request(
                vec![
                    make_activity("m", ActivityType::Entertainment, 180).with_vendor("dj"),
                    make_activity("h", ActivityType::Ceremony, 90).with_vendor("dj"),
                    make_activity("p", ActivityType::Photography, 120),
                    make_activity("k", ActivityType::Catering, 60),
                ],
                vec![],
                EventContext::new(250, VenueType::Hybrid, 6.5, 2),
            )
        };
        let first = planner.plan(build()).unwrap();
        let second = planner.plan(build()).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_days_respect_daily_window() {
        let planner = TimelinePlanner::default();
        let activities: Vec<Activity> = (0..10)
            .map(|i| {
                Activity::new(format!("d{i}"), format!("Decor {i}"), ActivityType::Decoration, Duration::hours(3), Priority::Medium)
            })
            .collect();
        let outcome = planner.plan(request(activities, vec![], small_indoor())).unwrap();

        // 3h + 45m before + 15m after = 4h per activity, three per day
        let days = &outcome.timeline.days;
        assert_eq!(days.len(), 4);
        for day in days {
            assert!(day.occupied() <= planner.config().daily_window);
        }
        assert_eq!(days[3].activities.len(), 1);
        assert!(outcome.timeline.validate().is_empty());
    }

    #[test]
    fn test_outdoor_venue_adds_weather_contingency() {
        let planner = TimelinePlanner::new(PlanningConfig {
            apply_duration_adjustments: false,
            ..PlanningConfig::default()
        });
        let outcome = planner
            .plan(request(
                vec![make_activity("vows", ActivityType::Ceremony, 60)],
                vec![],
                EventContext::new(50, VenueType::Outdoor, 0.0, 1),
            ))
            .unwrap();

        let vows = outcome.timeline.find("vows").unwrap();
        assert_eq!(vows.buffer_before, Duration::minutes(18));
        assert_eq!(vows.start_time, t(6, 9, 18, 0));
        assert_eq!(
            vows.contingency_plans,
            vec![
                "Indoor backup location prepared".to_string(),
                "Weather monitoring 24 hours before".to_string(),
            ]
        );
        assert!(outcome.duration_adjustments.is_empty());
    }

    #[test]
    fn test_crowded_home_ceremony_gets_staggered_entry() {
        let planner = TimelinePlanner::new(PlanningConfig {
            apply_duration_adjustments: false,
            ..PlanningConfig::default()
        });
        let outcome = planner
            .plan(request(
                vec![
                    make_activity("vows", ActivityType::Ceremony, 60),
                    make_activity("cake", ActivityType::Catering, 60),
                ],
                vec![],
                EventContext::new(150, VenueType::Home, 0.0, 1),
            ))
            .unwrap();

        let vows = outcome.timeline.find("vows").unwrap();
        assert_eq!(vows.buffer_before, Duration::minutes(45));
        assert_eq!(vows.contingency_plans, vec!["Staggered guest entry to manage capacity".to_string()]);
        assert!(outcome.timeline.find("cake").unwrap().contingency_plans.is_empty());
    }

    #[test]
    fn test_duration_adjustment_applied_before_graph() {
        let planner = TimelinePlanner::default();
        let outcome = planner
            .plan(request(
                vec![make_activity("setup", ActivityType::Preparation, 60)],
                vec![],
                EventContext::new(50, VenueType::Outdoor, 0.0, 1),
            ))
            .unwrap();
        // 60m x 1.5 outdoor setup, then x 0.9 for an event of 50 guests
        let setup = outcome.timeline.find("setup").unwrap();
        assert_eq!(setup.activity.duration, Duration::minutes(81));
        assert_eq!(outcome.timeline.total_duration, Duration::minutes(81));
        assert_eq!(outcome.duration_adjustments[0].base, Duration::minutes(60));
        assert_eq!(outcome.duration_adjustments[0].final_duration, Duration::minutes(90));
    }

    #[test]
    fn test_cycle_is_fatal() {
        let planner = TimelinePlanner::default();
        let err = planner
            .plan(request(
                vec![
                    make_activity("a", ActivityType::Decoration, 60),
                    make_activity("b", ActivityType::Decoration, 60),
                ],
                vec![
                    Dependency::finish_to_start("a", "b"),
                    Dependency::finish_to_start("b", "a"),
                ],
                small_indoor(),
            ))
            .unwrap_err();
        assert!(err.is_cycle());
    }

    #[test]
    fn test_invalid_inputs_are_rejected() {
        let planner = TimelinePlanner::default();
        let bad_context = planner
            .plan(request(
                vec![make_activity("a", ActivityType::Decoration, 60)],
                vec![],
                EventContext::new(0, VenueType::Indoor, 2.0, 1),
            ))
            .unwrap_err();
        assert!(matches!(bad_context, PlanningError::Validation { .. }));

        let empty = planner.plan(request(vec![], vec![], small_indoor())).unwrap_err();
        assert!(matches!(empty, PlanningError::Validation { .. }));

        let unknown = planner
            .plan(request(
                vec![make_activity("a", ActivityType::Decoration, 60)],
                vec![Dependency::finish_to_start("a", "ghost")],
                small_indoor(),
            ))
            .unwrap_err();
        assert!(matches!(unknown, PlanningError::DependencyIntegrity { .. }));
    }

    #[test]
    fn test_request_from_json() {
        let json = r#"{
            "activities": [
                {"id": "a", "name": "Haldi", "activity_type": "ceremony",
                 "duration": 5400, "priority": "critical", "required_vendors": ["decorator"]}
            ],
            "context": {"guest_count": 120, "venue_type": "banquet_hall",
                        "cultural_requirements": ["hindu"], "complexity_score": 4.0,
                        "duration_days": 1},
            "project_start": "2025-12-06T10:00:00"
        }"#;
        let request: PlanningRequest = serde_json::from_str(json).unwrap();
        assert!(request.dependencies.is_empty());
        assert_eq!(request.activities[0].duration, Duration::minutes(90));

        let outcome = TimelinePlanner::default().plan(request).unwrap();
        assert_eq!(outcome.timeline.critical_path, vec!["a"]);
        assert_eq!(
            outcome.timeline.find("a").unwrap().contingency_plans,
            vec!["Fresh turmeric paste prepared".to_string()]
        );
    }

    fn without_duration_adjustment() -> TimelinePlanner {
        TimelinePlanner::new(PlanningConfig {
            apply_duration_adjustments: false,
            ..PlanningConfig::default()
        })
    }

    #[test]
    fn test_context_adjustments_can_be_disabled() {
        let planner = TimelinePlanner::new(PlanningConfig {
            apply_context_adjustments: false,
            ..PlanningConfig::default()
        });
        let outcome = planner
            .plan(request(
                vec![
                    make_activity("a", ActivityType::Preparation, 60),
                    make_activity("b", ActivityType::Ceremony, 120),
                    make_activity("c", ActivityType::Cleanup, 60),
                ],
                vec![],
                small_indoor(),
            ))
            .unwrap();

        let b = outcome.timeline.find("b").unwrap();
        assert_eq!(b.buffer_before, Duration::seconds(1584));
        assert_eq!((b.start_time, b.end_time), (t(6, 10, 56, 24), t(6, 12, 56, 24)));
        assert_eq!(outcome.timeline.buffer_time, Duration::seconds(6084));
    }

    #[test]
    fn test_hotel_staff_shorten_work_and_are_noted() {
        let outcome = without_duration_adjustment()
            .plan(request(
                vec![
                    make_activity("p", ActivityType::Preparation, 100),
                    make_activity("c", ActivityType::Cleanup, 100).with_cleanup(Duration::minutes(50)),
                ],
                vec![],
                EventContext::new(40, VenueType::Hotel, 0.0, 1),
            ))
            .unwrap();

        let timeline = &outcome.timeline;
        let prep = timeline.find("p").unwrap();
        let cleanup = timeline.find("c").unwrap();
        assert_eq!(prep.activity.duration, Duration::minutes(72));
        assert_eq!(cleanup.activity.duration, Duration::minutes(80));
        assert_eq!(cleanup.activity.cleanup_time, Duration::minutes(35));
        for timed in [prep, cleanup] {
            assert_eq!(timed.contingency_plans, vec!["Hotel staff assistance available".to_string()]);
        }
        // The graph sees the adjusted spans: cleanup's 80m + 35m.
        assert_eq!(timeline.total_duration, Duration::minutes(115));
    }

    #[test]
    fn test_large_event_coordination_and_transition_buffers() {
        let decor = |id: &str| {
            Activity::new(id, id, ActivityType::Decoration, Duration::hours(1), Priority::Medium)
        };
        let outcome = without_duration_adjustment()
            .plan(request(
                vec![decor("arch"), decor("aisle")],
                vec![],
                EventContext::new(200, VenueType::Indoor, 0.0, 1),
            ))
            .unwrap();

        let arch = outcome.timeline.find("arch").unwrap();
        let aisle = outcome.timeline.find("aisle").unwrap();
        assert_eq!(arch.buffer_before, Duration::minutes(15));
        assert_eq!(arch.buffer_after, Duration::minutes(20));
        assert_eq!((arch.start_time, arch.end_time), (t(6, 9, 15, 0), t(6, 10, 15, 0)));
        assert_eq!(aisle.buffer_before, Duration::minutes(45));
        assert_eq!(aisle.start_time, t(6, 11, 20, 0));
    }

    #[test]
    fn test_cultural_notes_follow_event_traditions() {
        let context = EventContext::new(120, VenueType::Indoor, 2.0, 2)
            .with_culture(CulturalRequirement::Muslim);
        let outcome = without_duration_adjustment()
            .plan(request(
                vec![
                    Activity::new("n", "Nikkah", ActivityType::Ceremony, Duration::hours(1), Priority::Critical),
                    Activity::new("w", "Walima", ActivityType::Catering, Duration::hours(2), Priority::High),
                ],
                vec![],
                context,
            ))
            .unwrap();

        assert_eq!(
            outcome.timeline.find("n").unwrap().contingency_plans,
            vec!["Imam backup arranged".to_string(), "Marriage contract prepared".to_string()]
        );
        assert_eq!(
            outcome.timeline.find("w").unwrap().contingency_plans,
            vec!["Halal catering confirmed".to_string()]
        );
    }

    #[test]
    fn test_out_of_range_times_are_rejected() {
        let planner = TimelinePlanner::default();
        let huge_lag = planner
            .plan(request(
                vec![
                    make_activity("a", ActivityType::Decoration, 60),
                    make_activity("b", ActivityType::Decoration, 60),
                ],
                vec![Dependency::new(
                    "a",
                    "b",
                    DependencyType::FinishToStart,
                    Duration::days(365 * 300_000),
                )],
                small_indoor(),
            ))
            .unwrap_err();
        assert!(matches!(huge_lag, PlanningError::Validation { .. }));

        let mut late = request(
            vec![make_activity("a", ActivityType::Decoration, 60)],
            vec![],
            small_indoor(),
        );
        late.project_start = NaiveDate::MAX.and_hms_opt(23, 0, 0).unwrap();
        let err = planner.plan(late).unwrap_err();
        assert!(matches!(err, PlanningError::Validation { .. }));
    }
}
