//! Error taxonomy for the planning core.
//!
//! Every variant here is fatal for the request that produced it. Advisory
//! findings (vendor double-booking, excess slack, critical-path load) are
//! returned as data by `conflicts` and `optimizer` instead.

use thiserror::Error;

/// Errors that stop timeline construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanningError {
    /// A malformed activity, dependency, context or configuration field.
    #[error("Validation failed for {subject}: {}", .problems.join(", "))]
    Validation {
        subject: String,
        problems: Vec<String>,
    },

    /// A dependency references an unknown id, points at itself, or has an
    /// unrecognised type.
    #[error("Invalid dependency {predecessor_id} -> {successor_id}: {reason}")]
    DependencyIntegrity {
        predecessor_id: String,
        successor_id: String,
        reason: String,
    },

    /// The dependency graph is not a DAG.
    #[error("Circular dependency detected: {} of {total} activities could not be ordered", .unordered.len())]
    Cycle {
        unordered: Vec<String>,
        total: usize,
    },

    /// A CPM stage was invoked before the stage it depends on.
    #[error("{stage} requires {required} to have run first (activity {activity_id})")]
    Sequencing {
        stage: &'static str,
        required: &'static str,
        activity_id: String,
    },
}

impl PlanningError {
    pub(crate) fn validation(subject: impl Into<String>, problems: Vec<String>) -> Self {
        PlanningError::Validation {
            subject: subject.into(),
            problems,
        }
    }

    pub(crate) fn integrity(
        predecessor_id: &str,
        successor_id: &str,
        reason: impl Into<String>,
    ) -> Self {
        PlanningError::DependencyIntegrity {
            predecessor_id: predecessor_id.to_string(),
            successor_id: successor_id.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the caller's prescribed recovery is a dependency-free fallback
    /// timeline.
    pub fn is_cycle(&self) -> bool {
        matches!(self, PlanningError::Cycle { .. })
    }
}

/// Result alias used throughout the crate.
pub type PlanningResult<T> = Result<T, PlanningError>;
