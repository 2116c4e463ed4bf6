//! Dependency-aware timeline scheduling for multi-day events.
//!
//! The pipeline turns candidate activities into a time-stamped plan:
//!
//! 1. [`graph::DependencyGraph`] holds the activities, the explicit
//!    dependencies and the rule-inferred implicit ones.
//! 2. [`critical_path::analyze`] runs the forward and backward passes,
//!    computes slack and extracts the critical path.
//! 3. [`buffer::BufferTimeCalculator`] sizes each activity's leading buffer.
//! 4. [`scheduler::DaySchedulingPacker`] packs the activities into days in
//!    topological order.
//! 5. [`conflicts`] and [`optimizer`] report conflicts and advisories.
//!
//! [`scheduler::TimelinePlanner`] wires these together for one request.

pub mod buffer;
pub mod config;
pub mod conflicts;
pub mod critical_path;
pub mod duration;
pub mod error;
pub mod graph;
pub mod index;
pub mod logging;
pub mod models;
pub mod optimizer;
pub mod scheduler;

#[cfg(feature = "python")]
mod python;

pub use buffer::BufferTimeCalculator;
pub use config::PlanningConfig;
pub use conflicts::{resolve_conflicts, validate_timeline, Conflict, ValidationIssue};
pub use critical_path::{analyze, backward_pass, compute_slack, find_critical_path, forward_pass, NodeStage};
pub use duration::{
    apply_context_adjustments, ActivityDurationCalculator, DurationCalculation, GuestCountBand, VenueAdjustments,
};
pub use error::{PlanningError, PlanningResult};
pub use graph::{infer_implicit_dependencies, DependencyGraph, DependencyNode};
pub use models::{
    Activity, ActivityType, CulturalRequirement, Dependency, DependencyType, EventContext, Priority,
    TimedActivity, Timeline, TimelineDay, VenueType,
};
pub use optimizer::{Suggestion, TimelineOptimizer};
pub use scheduler::{DaySchedulingPacker, PlanningOutcome, PlanningRequest, TimelinePlanner};
