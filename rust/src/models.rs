//! Core data types for event timeline planning.
//!
//! Activities and dependencies come from the upstream content generator;
//! `TimedActivity`, `TimelineDay` and `Timeline` are what the core hands back.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{PlanningError, PlanningResult};

/// Upper bound for any single activity span or dependency lag; matches the
/// longest event `EventContext` accepts.
pub const MAX_SPAN_DAYS: i64 = 30;

/// Serialize time spans as whole seconds.
pub(crate) mod duration_secs {
    use chrono::Duration;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(value.num_seconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = i64::deserialize(deserializer)?;
        Duration::try_seconds(secs)
            .ok_or_else(|| D::Error::custom(format!("time span of {} seconds is out of range", secs)))
    }
}

fn zero() -> Duration {
    Duration::zero()
}

/// `at + span`, failing with `Validation` when the result leaves chrono's
/// representable range.
pub(crate) fn offset(at: NaiveDateTime, span: Duration, subject: &str) -> PlanningResult<NaiveDateTime> {
    at.checked_add_signed(span).ok_or_else(|| {
        PlanningError::validation(
            subject,
            vec![format!(
                "Time {} shifted by {} seconds is out of range",
                at,
                span.num_seconds()
            )],
        )
    })
}

/// `span` scaled by `factor` and rounded to whole seconds. Out-of-range
/// results leave `span` unchanged.
pub(crate) fn scale_span(span: Duration, factor: f64) -> Duration {
    let seconds = (span.num_seconds() as f64 * factor).round();
    if !seconds.is_finite() {
        return span;
    }
    Duration::try_seconds(seconds as i64).unwrap_or(span)
}

fn saturating_sum(spans: impl IntoIterator<Item = Duration>) -> Duration {
    spans
        .into_iter()
        .try_fold(Duration::zero(), |acc, span| acc.checked_add(&span))
        .unwrap_or(Duration::MAX)
}

fn max_span() -> Duration {
    Duration::days(MAX_SPAN_DAYS)
}

/// Human-readable span such as "4h 30m" or "-15m".
pub(crate) fn format_span(span: Duration) -> String {
    let sign = if span < Duration::zero() { "-" } else { "" };
    let minutes = span.num_minutes().abs();
    match (minutes / 60, minutes % 60) {
        (0, m) => format!("{sign}{m}m"),
        (h, 0) => format!("{sign}{h}h"),
        (h, m) => format!("{sign}{h}h {m}m"),
    }
}

/// Kind of work an activity represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Preparation,
    Ceremony,
    Catering,
    Entertainment,
    Photography,
    Decoration,
    Transportation,
    Cleanup,
    Break,
    Networking,
}

/// Activity priority, most to least important.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
    Optional,
}

/// How a successor's timing is tied to its predecessor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyType {
    FinishToStart,
    StartToStart,
    FinishToFinish,
    StartToFinish,
}

impl DependencyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyType::FinishToStart => "finish_to_start",
            DependencyType::StartToStart => "start_to_start",
            DependencyType::FinishToFinish => "finish_to_finish",
            DependencyType::StartToFinish => "start_to_finish",
        }
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DependencyType {
    type Err = PlanningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "finish_to_start" => Ok(DependencyType::FinishToStart),
            "start_to_start" => Ok(DependencyType::StartToStart),
            "finish_to_finish" => Ok(DependencyType::FinishToFinish),
            "start_to_finish" => Ok(DependencyType::StartToFinish),
            other => Err(PlanningError::integrity(
                "?",
                "?",
                format!("Invalid dependency type '{}'", other),
            )),
        }
    }
}

/// Venue category of the event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VenueType {
    Indoor,
    Outdoor,
    Hybrid,
    Home,
    BanquetHall,
    Hotel,
    Restaurant,
    Garden,
    Beach,
    Temple,
    Church,
    CommunityCenter,
}

/// Cultural or religious requirement tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CulturalRequirement {
    Hindu,
    Muslim,
    Christian,
    Sikh,
    Buddhist,
    Jain,
    Jewish,
    Secular,
    Mixed,
}

/// A unit of work to be placed on the timeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub name: String,
    pub activity_type: ActivityType,
    #[serde(with = "duration_secs")]
    pub duration: Duration,
    pub priority: Priority,
    #[serde(default)]
    pub estimated_cost: f64,
    #[serde(default)]
    pub required_vendors: BTreeSet<String>,
    #[serde(with = "duration_secs", default = "zero")]
    pub setup_time: Duration,
    #[serde(with = "duration_secs", default = "zero")]
    pub cleanup_time: Duration,
}

impl Activity {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        activity_type: ActivityType,
        duration: Duration,
        priority: Priority,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            activity_type,
            duration,
            priority,
            estimated_cost: 0.0,
            required_vendors: BTreeSet::new(),
            setup_time: Duration::zero(),
            cleanup_time: Duration::zero(),
        }
    }

    pub fn with_cost(mut self, estimated_cost: f64) -> Self {
        self.estimated_cost = estimated_cost;
        self
    }

    pub fn with_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.required_vendors.insert(vendor.into());
        self
    }

    pub fn with_setup(mut self, setup_time: Duration) -> Self {
        self.setup_time = setup_time;
        self
    }

    pub fn with_cleanup(mut self, cleanup_time: Duration) -> Self {
        self.cleanup_time = cleanup_time;
        self
    }

    /// Setup + duration + cleanup, saturating at `Duration::MAX`.
    pub fn total_duration(&self) -> Duration {
        saturating_sum([self.setup_time, self.duration, self.cleanup_time])
    }

    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.id.trim().is_empty() {
            errors.push("Activity ID is required".to_string());
        }
        if self.name.trim().is_empty() {
            errors.push("Activity name is required".to_string());
        }
        if self.duration <= Duration::zero() {
            errors.push("Duration must be positive".to_string());
        }
        if self.duration > max_span() {
            errors.push(format!("Duration exceeds maximum limit ({} days)", MAX_SPAN_DAYS));
        }
        if !self.estimated_cost.is_finite() || self.estimated_cost < 0.0 {
            errors.push("Estimated cost cannot be negative".to_string());
        }
        if self.setup_time < Duration::zero() {
            errors.push("Setup time cannot be negative".to_string());
        }
        if self.cleanup_time < Duration::zero() {
            errors.push("Cleanup time cannot be negative".to_string());
        }
        if self.setup_time > max_span() || self.cleanup_time > max_span() {
            errors.push(format!(
                "Setup and cleanup time cannot exceed {} days",
                MAX_SPAN_DAYS
            ));
        }
        errors
    }
}

/// Ordering constraint between two activities.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub predecessor_id: String,
    pub successor_id: String,
    pub dependency_type: DependencyType,
    #[serde(with = "duration_secs", default = "zero")]
    pub lag: Duration,
}

impl Dependency {
    pub fn new(
        predecessor_id: impl Into<String>,
        successor_id: impl Into<String>,
        dependency_type: DependencyType,
        lag: Duration,
    ) -> Self {
        Self {
            predecessor_id: predecessor_id.into(),
            successor_id: successor_id.into(),
            dependency_type,
            lag,
        }
    }

    /// Finish-to-start with no lag.
    pub fn finish_to_start(predecessor_id: impl Into<String>, successor_id: impl Into<String>) -> Self {
        Self::new(
            predecessor_id,
            successor_id,
            DependencyType::FinishToStart,
            Duration::zero(),
        )
    }

    /// Build a dependency from a wire-level type name.
    pub fn parse(
        predecessor_id: &str,
        successor_id: &str,
        dependency_type: &str,
        lag: Duration,
    ) -> Result<Self, PlanningError> {
        let kind = dependency_type.parse::<DependencyType>().map_err(|_| {
            PlanningError::integrity(
                predecessor_id,
                successor_id,
                format!("Invalid dependency type '{}'", dependency_type),
            )
        })?;
        Ok(Self::new(predecessor_id, successor_id, kind, lag))
    }

    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.predecessor_id.trim().is_empty() {
            errors.push("Predecessor ID is required".to_string());
        }
        if self.successor_id.trim().is_empty() {
            errors.push("Successor ID is required".to_string());
        }
        if self.predecessor_id == self.successor_id {
            errors.push("Activity cannot depend on itself".to_string());
        }
        if self.lag < Duration::zero() {
            errors.push("Lag cannot be negative".to_string());
        }
        if self.lag > max_span() {
            errors.push(format!("Lag exceeds maximum limit ({} days)", MAX_SPAN_DAYS));
        }
        errors
    }
}

/// Event-level inputs that scale durations and buffers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventContext {
    pub guest_count: u32,
    pub venue_type: VenueType,
    #[serde(default)]
    pub cultural_requirements: Vec<CulturalRequirement>,
    /// 0-10 scale.
    #[serde(default)]
    pub complexity_score: f64,
    pub duration_days: u32,
}

impl EventContext {
    pub fn new(guest_count: u32, venue_type: VenueType, complexity_score: f64, duration_days: u32) -> Self {
        Self {
            guest_count,
            venue_type,
            cultural_requirements: Vec::new(),
            complexity_score,
            duration_days,
        }
    }

    pub fn with_culture(mut self, requirement: CulturalRequirement) -> Self {
        if !self.cultural_requirements.contains(&requirement) {
            self.cultural_requirements.push(requirement);
        }
        self
    }

    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.guest_count == 0 {
            errors.push("Guest count must be positive".to_string());
        }
        if self.guest_count > 10_000 {
            errors.push("Guest count exceeds maximum limit (10,000)".to_string());
        }
        if self.duration_days == 0 {
            errors.push("Duration must be at least 1 day".to_string());
        }
        if self.duration_days > 30 {
            errors.push("Duration exceeds maximum limit (30 days)".to_string());
        }
        if !(0.0..=10.0).contains(&self.complexity_score) {
            errors.push("Complexity score must be between 0 and 10".to_string());
        }
        errors
    }
}

/// An activity bound to concrete times.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimedActivity {
    pub activity: Activity,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    #[serde(with = "duration_secs")]
    pub buffer_before: Duration,
    #[serde(with = "duration_secs")]
    pub buffer_after: Duration,
    #[serde(default)]
    pub contingency_plans: Vec<String>,
}

impl TimedActivity {
    /// An activity whose times will be assigned by the day packer.
    pub fn unscheduled(activity: Activity, buffer_before: Duration, buffer_after: Duration) -> Self {
        Self {
            activity,
            start_time: NaiveDateTime::MIN,
            end_time: NaiveDateTime::MIN,
            buffer_before,
            buffer_after,
            contingency_plans: Vec::new(),
        }
    }

    /// Setup + duration + cleanup + both buffers.
    pub fn footprint(&self) -> Duration {
        saturating_sum([self.activity.total_duration(), self.buffer_before, self.buffer_after])
    }

    pub fn add_contingency(&mut self, plan: impl Into<String>) {
        self.contingency_plans.push(plan.into());
    }

    pub fn validate(&self) -> Vec<String> {
        let mut errors = self.activity.validate();
        if self.start_time >= self.end_time {
            errors.push("Start time must be before end time".to_string());
        }
        let expected = self.activity.total_duration();
        let actual = self.end_time - self.start_time;
        if actual < expected {
            errors.push(format!(
                "Allocated time ({}s) is less than required time ({}s)",
                actual.num_seconds(),
                expected.num_seconds()
            ));
        }
        errors
    }
}

/// One calendar day of the plan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimelineDay {
    pub day_number: u32,
    pub date: NaiveDate,
    pub activities: Vec<TimedActivity>,
    pub estimated_cost: f64,
    #[serde(default)]
    pub notes: Vec<String>,
}

impl TimelineDay {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.day_number == 0 {
            errors.push("Day number must be positive".to_string());
        }
        if self.estimated_cost < 0.0 {
            errors.push("Estimated cost cannot be negative".to_string());
        }
        for timed in &self.activities {
            errors.extend(
                timed
                    .validate()
                    .into_iter()
                    .map(|e| format!("Activity '{}': {}", timed.activity.name, e)),
            );
        }

        let mut ordered: Vec<&TimedActivity> = self.activities.iter().collect();
        ordered.sort_by_key(|t| t.start_time);
        for pair in ordered.windows(2) {
            if pair[0].end_time > pair[1].start_time {
                errors.push(format!(
                    "Activities '{}' and '{}' overlap",
                    pair[0].activity.name, pair[1].activity.name
                ));
            }
        }
        errors
    }

    /// Sum of every activity's footprint on this day.
    pub fn occupied(&self) -> Duration {
        self.activities
            .iter()
            .fold(Duration::zero(), |acc, t| acc + t.footprint())
    }
}

/// The complete plan returned to callers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub days: Vec<TimelineDay>,
    #[serde(with = "duration_secs")]
    pub total_duration: Duration,
    pub critical_path: Vec<String>,
    #[serde(with = "duration_secs")]
    pub buffer_time: Duration,
    pub dependencies: Vec<Dependency>,
    pub total_estimated_cost: f64,
}

impl Timeline {
    pub fn activity_count(&self) -> usize {
        self.days.iter().map(|d| d.activities.len()).sum()
    }

    /// Locate a scheduled activity by id.
    pub fn find(&self, activity_id: &str) -> Option<&TimedActivity> {
        self.days
            .iter()
            .flat_map(|d| d.activities.iter())
            .find(|t| t.activity.id == activity_id)
    }

    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.days.is_empty() {
            errors.push("Timeline must have at least one day".to_string());
        }
        for day in &self.days {
            errors.extend(day.validate());
        }
        for (i, day) in self.days.iter().enumerate() {
            if day.day_number as usize != i + 1 {
                errors.push("Day numbers must be sequential starting from 1".to_string());
                break;
            }
        }
        for dep in &self.dependencies {
            errors.extend(dep.validate());
            if self.find(&dep.predecessor_id).is_none() {
                errors.push(format!(
                    "Dependency references unknown predecessor: {}",
                    dep.predecessor_id
                ));
            }
            if self.find(&dep.successor_id).is_none() {
                errors.push(format!(
                    "Dependency references unknown successor: {}",
                    dep.successor_id
                ));
            }
        }
        errors
    }
}
