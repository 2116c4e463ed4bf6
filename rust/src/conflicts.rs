//! Conflict detection and timeline validation.
//!
//! Both entry points report findings as data and never fail; the caller
//! decides which findings stop the plan (see `ValidationIssue::is_fatal`).

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::graph::{DependencyGraph, DependencyNode};
use crate::models::{duration_secs, format_span};

/// A scheduling conflict found in an analyzed graph.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Conflict {
    CircularDependency,
    OverConstrained {
        activity_id: String,
        activity_name: String,
        #[serde(with = "duration_secs")]
        slack: Duration,
    },
    VendorDoubleBooking {
        vendor: String,
        first_id: String,
        first_name: String,
        second_id: String,
        second_name: String,
    },
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conflict::CircularDependency => write!(
                f,
                "Circular dependencies detected - some activities depend on each other"
            ),
            Conflict::OverConstrained { activity_name, slack, .. } => write!(
                f,
                "Activity '{}' is over-constrained with negative slack ({})",
                activity_name,
                format_span(*slack)
            ),
            Conflict::VendorDoubleBooking {
                vendor,
                first_name,
                second_name,
                ..
            } => write!(
                f,
                "Vendor '{}' conflict between activities '{}' and '{}'",
                vendor, first_name, second_name
            ),
        }
    }
}

/// One entry of `validate_timeline`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum ValidationIssue {
    CircularDependency,
    Conflict(Conflict),
    InvalidActivity { name: String, problem: String },
    InvalidDependency { problem: String },
}

impl ValidationIssue {
    /// Vendor double-booking is a warning for the end user; everything
    /// else means the plan cannot be trusted.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            ValidationIssue::Conflict(Conflict::VendorDoubleBooking { .. })
        )
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::CircularDependency => {
                write!(f, "Timeline contains circular dependencies")
            }
            ValidationIssue::Conflict(conflict) => write!(f, "{}", conflict),
            ValidationIssue::InvalidActivity { name, problem } => {
                write!(f, "Activity '{}': {}", name, problem)
            }
            ValidationIssue::InvalidDependency { problem } => write!(f, "Dependency: {}", problem),
        }
    }
}

/// Cycle, negative slack and vendor double-booking, in that order.
pub fn resolve_conflicts(graph: &DependencyGraph) -> Vec<Conflict> {
    let mut conflicts = Vec::new();

    if graph.has_cycle() {
        conflicts.push(Conflict::CircularDependency);
    }

    for (id, node) in graph.iter() {
        if let Some(slack) = node.slack.filter(|s| *s < Duration::zero()) {
            conflicts.push(Conflict::OverConstrained {
                activity_id: id.to_string(),
                activity_name: node.activity.name.clone(),
                slack,
            });
        }
    }

    conflicts.extend(vendor_conflicts(graph));
    conflicts
}

/// Pairs of activities needing the same vendor whose
/// `[earliest_start, earliest_finish)` windows overlap.
fn vendor_conflicts(graph: &DependencyGraph) -> Vec<Conflict> {
    let mut by_vendor: BTreeMap<&str, Vec<(NaiveDateTime, NaiveDateTime, &str, &DependencyNode)>> =
        BTreeMap::new();
    for (id, node) in graph.iter() {
        let (Some(start), Some(finish)) = (node.earliest_start, node.earliest_finish) else {
            continue;
        };
        for vendor in &node.activity.required_vendors {
            by_vendor
                .entry(vendor.as_str())
                .or_default()
                .push((start, finish, id, node));
        }
    }

    let mut conflicts = Vec::new();
    for (vendor, mut bookings) in by_vendor {
        bookings.sort_by_key(|(start, ..)| *start);
        for (i, (_, finish, first_id, first)) in bookings.iter().enumerate() {
            for (start, _, second_id, second) in &bookings[i + 1..] {
                if start >= finish {
                    break;
                }
                conflicts.push(Conflict::VendorDoubleBooking {
                    vendor: vendor.to_string(),
                    first_id: first_id.to_string(),
                    first_name: first.activity.name.clone(),
                    second_id: second_id.to_string(),
                    second_name: second.activity.name.clone(),
                });
            }
        }
    }
    conflicts
}

/// Everything wrong with the graph: cycles, conflicts and malformed
/// activities or dependencies.
pub fn validate_timeline(graph: &DependencyGraph) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if graph.has_cycle() {
        issues.push(ValidationIssue::CircularDependency);
    }
    issues.extend(resolve_conflicts(graph).into_iter().map(ValidationIssue::Conflict));

    for (_, node) in graph.iter() {
        issues.extend(node.activity.validate().into_iter().map(|problem| {
            ValidationIssue::InvalidActivity {
                name: node.activity.name.clone(),
                problem,
            }
        }));
    }
    for dependency in &graph.dependencies {
        issues.extend(
            dependency
                .validate()
                .into_iter()
                .map(|problem| ValidationIssue::InvalidDependency { problem }),
        );
    }
    issues
}
