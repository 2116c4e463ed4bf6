//! Per-activity buffer time.
//!
//! buffer = clamp(duration x priority pct x complexity mult x dependency mult,
//! min_buffer, max_buffer), rounded to whole seconds.

use chrono::Duration;

use crate::models::{scale_span, Activity, Priority};

/// Share of the activity's duration reserved as buffer.
pub fn priority_percentage(priority: Priority) -> f64 {
    match priority {
        Priority::Critical => 0.15,
        Priority::High => 0.20,
        Priority::Medium => 0.25,
        Priority::Low => 0.30,
        Priority::Optional => 0.35,
    }
}

/// Multiplier for the event's 0-10 complexity score.
pub fn complexity_multiplier(complexity_score: f64) -> f64 {
    if complexity_score <= 3.0 {
        1.0
    } else if complexity_score <= 6.0 {
        1.2
    } else if complexity_score <= 8.0 {
        1.5
    } else {
        2.0
    }
}

/// Multiplier for the number of activities this one is tied to.
pub fn dependency_multiplier(dependency_count: usize) -> f64 {
    match dependency_count {
        0 => 1.0,
        1..=2 => 1.1,
        3..=5 => 1.3,
        _ => 1.5,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferTimeCalculator {
    pub min_buffer: Duration,
    pub max_buffer: Duration,
}

impl Default for BufferTimeCalculator {
    fn default() -> Self {
        Self {
            min_buffer: Duration::minutes(15),
            max_buffer: Duration::hours(2),
        }
    }
}

impl BufferTimeCalculator {
    pub fn new(min_buffer: Duration, max_buffer: Duration) -> Self {
        Self {
            min_buffer,
            max_buffer,
        }
    }

    /// Buffer to place before `activity`.
    ///
    /// `dependency_count` is the number of distinct predecessors plus
    /// successors of the activity in the dependency graph.
    pub fn calculate_buffer_time(
        &self,
        activity: &Activity,
        complexity_score: f64,
        dependency_count: usize,
    ) -> Duration {
        let factor = priority_percentage(activity.priority)
            * complexity_multiplier(complexity_score)
            * dependency_multiplier(dependency_count);
        scale_span(activity.duration, factor)
            .max(self.min_buffer)
            .min(self.max_buffer)
    }
}
