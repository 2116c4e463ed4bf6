//! Critical Path Method over the dependency graph.
//!
//! Stages run in a fixed order and each one refuses to start unless the
//! previous one has annotated every node:
//! forward pass -> backward pass -> slack -> critical path.

mod calculation;
mod state;

pub use calculation::{analyze, backward_pass, compute_slack, find_critical_path, forward_pass};
pub use state::NodeStage;
