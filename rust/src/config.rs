//! Configuration for the planning pipeline.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::buffer::BufferTimeCalculator;
use crate::error::{PlanningError, PlanningResult};
use crate::models::duration_secs;
use crate::optimizer::TimelineOptimizer;
use crate::scheduler::DaySchedulingPacker;

/// Tunables for one planning request.
///
/// Every field has a default, so a partial JSON object is accepted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningConfig {
    /// Working-hours window available each day.
    #[serde(with = "duration_secs")]
    pub daily_window: Duration,
    /// Trailing buffer placed after every activity.
    #[serde(with = "duration_secs")]
    pub buffer_after: Duration,
    /// Lower clamp for computed leading buffers.
    #[serde(with = "duration_secs")]
    pub min_buffer: Duration,
    /// Upper clamp for computed leading buffers.
    #[serde(with = "duration_secs")]
    pub max_buffer: Duration,
    /// Slack above this is reported as excess.
    #[serde(with = "duration_secs")]
    pub excess_slack_threshold: Duration,
    /// Critical activities longer than this are split candidates.
    #[serde(with = "duration_secs")]
    pub long_critical_duration: Duration,
    /// Share of critical activities above which the path is overloaded.
    pub critical_share_threshold: f64,
    /// Rescale durations by guest count, venue and complexity before planning.
    pub apply_duration_adjustments: bool,
    /// Guest-count, venue and cultural adjustments: preparation and cleanup
    /// corrections, coordination and transition buffers, contingency notes.
    pub apply_context_adjustments: bool,
    /// 0 = silent, 1 = stages, 2 = decisions, 3 = debug
    pub verbosity: u8,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            daily_window: Duration::hours(12),
            buffer_after: Duration::minutes(15),
            min_buffer: Duration::minutes(15),
            max_buffer: Duration::hours(2),
            excess_slack_threshold: Duration::hours(4),
            long_critical_duration: Duration::hours(4),
            critical_share_threshold: 0.5,
            apply_duration_adjustments: true,
            apply_context_adjustments: true,
            verbosity: 0,
        }
    }
}

impl PlanningConfig {
    pub fn validate(&self) -> PlanningResult<()> {
        let mut problems = Vec::new();
        if self.daily_window <= Duration::zero() {
            problems.push("Daily window must be positive".to_string());
        }
        if self.daily_window > Duration::hours(24) {
            problems.push("Daily window cannot exceed 24 hours".to_string());
        }
        if self.buffer_after < Duration::zero() {
            problems.push("Trailing buffer cannot be negative".to_string());
        }
        if self.min_buffer < Duration::zero() {
            problems.push("Minimum buffer cannot be negative".to_string());
        }
        if self.min_buffer > self.max_buffer {
            problems.push("Minimum buffer exceeds maximum buffer".to_string());
        }
        if !(self.critical_share_threshold > 0.0 && self.critical_share_threshold <= 1.0) {
            problems.push("Critical share threshold must be in (0, 1]".to_string());
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(PlanningError::validation("planning config", problems))
        }
    }

    pub fn buffer_calculator(&self) -> BufferTimeCalculator {
        BufferTimeCalculator::new(self.min_buffer, self.max_buffer)
    }

    pub fn optimizer(&self) -> TimelineOptimizer {
        TimelineOptimizer {
            excess_slack_threshold: self.excess_slack_threshold,
            long_critical_duration: self.long_critical_duration,
            critical_share_threshold: self.critical_share_threshold,
        }
    }

    pub fn packer(&self) -> DaySchedulingPacker {
        DaySchedulingPacker::new(self.daily_window, self.verbosity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PlanningConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.daily_window, Duration::hours(12));
        assert_eq!(config.buffer_calculator(), BufferTimeCalculator::default());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: PlanningConfig =
            serde_json::from_str(r#"{"daily_window": 28800, "verbosity": 2}"#).unwrap();
        assert_eq!(config.daily_window, Duration::hours(8));
        assert_eq!(config.verbosity, 2);
        assert_eq!(config.max_buffer, Duration::hours(2));
        assert!(config.apply_context_adjustments);
    }

    #[test]
    fn test_validate_collects_problems() {
        let config = PlanningConfig {
            daily_window: Duration::zero(),
            min_buffer: Duration::hours(3),
            critical_share_threshold: 1.5,
            ..PlanningConfig::default()
        };
        match config.validate().unwrap_err() {
            PlanningError::Validation { problems, .. } => assert_eq!(problems.len(), 3),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
