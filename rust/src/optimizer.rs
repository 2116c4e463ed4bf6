//! Advisory suggestions over an analyzed graph. Nothing here mutates the
//! graph or the timeline.

use chrono::Duration;
use serde::Serialize;
use std::fmt;

use crate::graph::DependencyGraph;
use crate::models::{duration_secs, format_span};

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Suggestion {
    /// Activities with at most one predecessor.
    Parallelize { activity_ids: Vec<String> },
    ReduceBuffer {
        activity_id: String,
        activity_name: String,
        #[serde(with = "duration_secs")]
        slack: Duration,
    },
    CriticalPathOverloaded {
        critical: usize,
        total: usize,
        threshold: f64,
    },
    SplitActivity {
        activity_id: String,
        activity_name: String,
        #[serde(with = "duration_secs")]
        duration: Duration,
    },
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Suggestion::Parallelize { activity_ids } => write!(
                f,
                "Consider running {} independent activities in parallel",
                activity_ids.len()
            ),
            Suggestion::ReduceBuffer { activity_name, slack, .. } => write!(
                f,
                "Activity '{}' has excessive slack ({}) - consider reducing buffer time",
                activity_name,
                format_span(*slack)
            ),
            Suggestion::CriticalPathOverloaded {
                critical,
                total,
                threshold,
            } => write!(
                f,
                "More than {:.0}% of activities are on critical path ({} of {}) - \
                 consider adding resources or reducing scope",
                threshold * 100.0,
                critical,
                total
            ),
            Suggestion::SplitActivity {
                activity_name,
                duration,
                ..
            } => write!(
                f,
                "Critical activity '{}' has long duration ({}) - consider breaking into smaller tasks",
                activity_name,
                format_span(*duration)
            ),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimelineOptimizer {
    pub excess_slack_threshold: Duration,
    pub long_critical_duration: Duration,
    pub critical_share_threshold: f64,
}

impl Default for TimelineOptimizer {
    fn default() -> Self {
        Self {
            excess_slack_threshold: Duration::hours(4),
            long_critical_duration: Duration::hours(4),
            critical_share_threshold: 0.5,
        }
    }
}

impl TimelineOptimizer {
    /// Parallelization, buffer trim and critical-path load, in that order.
    pub fn suggest(&self, graph: &DependencyGraph) -> Vec<Suggestion> {
        let mut suggestions = Vec::new();

        let independent: Vec<String> = graph
            .iter()
            .filter(|(_, node)| node.predecessors.len() <= 1)
            .map(|(id, _)| id.to_string())
            .collect();
        if independent.len() > 1 {
            suggestions.push(Suggestion::Parallelize {
                activity_ids: independent,
            });
        }

        for (id, node) in graph.iter() {
            if let Some(slack) = node.slack.filter(|s| *s > self.excess_slack_threshold) {
                suggestions.push(Suggestion::ReduceBuffer {
                    activity_id: id.to_string(),
                    activity_name: node.activity.name.clone(),
                    slack,
                });
            }
        }

        let critical: Vec<(&str, _)> = graph.iter().filter(|(_, node)| node.is_critical).collect();
        if critical.len() as f64 > graph.len() as f64 * self.critical_share_threshold {
            suggestions.push(Suggestion::CriticalPathOverloaded {
                critical: critical.len(),
                total: graph.len(),
                threshold: self.critical_share_threshold,
            });
        }
        for (id, node) in critical {
            if node.activity.duration > self.long_critical_duration {
                suggestions.push(Suggestion::SplitActivity {
                    activity_id: id.to_string(),
                    activity_name: node.activity.name.clone(),
                    duration: node.activity.duration,
                });
            }
        }

        suggestions
    }
}
