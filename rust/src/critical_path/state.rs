//! Per-node analysis stage.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How far the critical path analysis has progressed for a node.
///
/// Transitions only move forward:
/// `Unscheduled -> ForwardPassed -> BackwardPassed -> SlackComputed`.
/// Any structural change to the graph drops every node back to
/// `Unscheduled`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStage {
    #[default]
    Unscheduled,
    ForwardPassed,
    BackwardPassed,
    SlackComputed,
}

impl NodeStage {
    /// Whether the fields written by `stage` are available.
    pub fn has_reached(self, stage: NodeStage) -> bool {
        self >= stage
    }

    pub fn name(self) -> &'static str {
        match self {
            NodeStage::Unscheduled => "unscheduled",
            NodeStage::ForwardPassed => "forward pass",
            NodeStage::BackwardPassed => "backward pass",
            NodeStage::SlackComputed => "slack computation",
        }
    }
}

impl fmt::Display for NodeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
