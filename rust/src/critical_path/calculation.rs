//! Critical path calculation using forward and backward passes.

use chrono::{Duration, NaiveDateTime};

use crate::error::{PlanningError, PlanningResult};
use crate::graph::DependencyGraph;
use crate::index::NodeId;
use crate::models::{offset, DependencyType};
use crate::{log_debug, log_stage};

use super::state::NodeStage;

fn require_stage(
    graph: &DependencyGraph,
    stage: &'static str,
    required: NodeStage,
) -> PlanningResult<()> {
    for (id, node) in graph.iter() {
        if !node.stage.has_reached(required) {
            return Err(PlanningError::Sequencing {
                stage,
                required: required.name(),
                activity_id: id.to_string(),
            });
        }
    }
    Ok(())
}

fn node_of(graph: &DependencyGraph, activity_id: &str) -> PlanningResult<NodeId> {
    graph
        .index
        .get(activity_id)
        .ok_or_else(|| PlanningError::integrity(activity_id, activity_id, "Activity not in graph"))
}

/// Compute earliest start/finish for every node in topological order.
///
/// A node with no predecessors starts at `project_start`; otherwise its
/// earliest start is the latest of `project_start` and every incoming edge's
/// candidate start. Discards any previous analysis.
pub fn forward_pass(
    graph: &mut DependencyGraph,
    project_start: NaiveDateTime,
    verbosity: u8,
) -> PlanningResult<()> {
    let order = graph.topological_order()?;
    graph.reset_analysis();
    graph.project_start = Some(project_start);

    for node_id in order {
        let idx = node_id as usize;
        let total = graph.nodes[idx].total_duration();

        let mut earliest_start = project_start;
        for &edge in &graph.nodes[idx].incoming {
            let dep = &graph.dependencies[edge];
            let pred = &graph.nodes[node_of(graph, &dep.predecessor_id)? as usize];
            let (Some(pred_start), Some(pred_finish)) = (pred.earliest_start, pred.earliest_finish)
            else {
                return Err(PlanningError::Sequencing {
                    stage: "forward pass",
                    required: "predecessor forward pass",
                    activity_id: dep.predecessor_id.clone(),
                });
            };

            let subject = &dep.successor_id;
            let candidate = match dep.dependency_type {
                DependencyType::FinishToStart => offset(pred_finish, dep.lag, subject)?,
                DependencyType::StartToStart => offset(pred_start, dep.lag, subject)?,
                DependencyType::FinishToFinish => {
                    offset(offset(pred_finish, dep.lag, subject)?, -total, subject)?
                }
                DependencyType::StartToFinish => {
                    offset(offset(pred_start, dep.lag, subject)?, -total, subject)?
                }
            };
            earliest_start = earliest_start.max(candidate);
        }

        let node = &mut graph.nodes[idx];
        let earliest_finish = offset(earliest_start, total, &node.activity.id)?;
        node.earliest_start = Some(earliest_start);
        node.earliest_finish = Some(earliest_finish);
        node.stage = NodeStage::ForwardPassed;
        log_debug!(
            verbosity,
            "forward {}: ES={} EF={}",
            node.activity.id,
            earliest_start,
            earliest_finish
        );
    }
    Ok(())
}

/// Compute latest start/finish for every node in reverse topological order.
///
/// Requires a completed forward pass; the project end is the maximum
/// earliest finish.
pub fn backward_pass(graph: &mut DependencyGraph, verbosity: u8) -> PlanningResult<()> {
    require_stage(graph, "backward pass", NodeStage::ForwardPassed)?;
    let order = graph.topological_order()?;

    let Some(project_end) = graph.nodes.iter().filter_map(|n| n.earliest_finish).max() else {
        return Ok(());
    };

    for &node_id in order.iter().rev() {
        let idx = node_id as usize;
        let total = graph.nodes[idx].total_duration();

        let mut latest_finish = project_end;
        for &edge in &graph.nodes[idx].outgoing {
            let dep = &graph.dependencies[edge];
            let succ = &graph.nodes[node_of(graph, &dep.successor_id)? as usize];
            let (Some(succ_start), Some(succ_finish), true) = (
                succ.latest_start,
                succ.latest_finish,
                succ.stage.has_reached(NodeStage::BackwardPassed),
            ) else {
                return Err(PlanningError::Sequencing {
                    stage: "backward pass",
                    required: "successor backward pass",
                    activity_id: dep.successor_id.clone(),
                });
            };

            let subject = &dep.predecessor_id;
            let candidate = match dep.dependency_type {
                DependencyType::FinishToStart => offset(succ_start, -dep.lag, subject)?,
                DependencyType::StartToStart => {
                    offset(offset(succ_start, -dep.lag, subject)?, total, subject)?
                }
                DependencyType::FinishToFinish => offset(succ_finish, -dep.lag, subject)?,
                DependencyType::StartToFinish => {
                    offset(offset(succ_finish, -dep.lag, subject)?, total, subject)?
                }
            };
            latest_finish = latest_finish.min(candidate);
        }

        let node = &mut graph.nodes[idx];
        let latest_start = offset(latest_finish, -total, &node.activity.id)?;
        node.latest_finish = Some(latest_finish);
        node.latest_start = Some(latest_start);
        node.slack = None;
        node.is_critical = false;
        node.stage = NodeStage::BackwardPassed;
        log_debug!(
            verbosity,
            "backward {}: LS={} LF={}",
            node.activity.id,
            latest_start,
            latest_finish
        );
    }
    Ok(())
}

/// slack = latest_start - earliest_start; critical iff slack is exactly zero.
pub fn compute_slack(graph: &mut DependencyGraph) -> PlanningResult<()> {
    require_stage(graph, "slack computation", NodeStage::BackwardPassed)?;

    for node in &mut graph.nodes {
        if let (Some(es), Some(ls)) = (node.earliest_start, node.latest_start) {
            let slack = ls - es;
            node.slack = Some(slack);
            node.is_critical = slack == Duration::zero();
            node.stage = NodeStage::SlackComputed;
        }
    }
    Ok(())
}

/// Critical node ids ordered by earliest start (ties keep insertion order).
pub fn find_critical_path(graph: &DependencyGraph) -> Vec<String> {
    let mut critical: Vec<(NaiveDateTime, &str)> = graph
        .iter()
        .filter(|(_, node)| node.is_critical)
        .filter_map(|(id, node)| node.earliest_start.map(|es| (es, id)))
        .collect();
    critical.sort_by_key(|(es, _)| *es);
    critical.into_iter().map(|(_, id)| id.to_string()).collect()
}

/// Run the full analysis: forward pass, backward pass, slack, critical path
/// and total duration.
pub fn analyze(
    graph: &mut DependencyGraph,
    project_start: NaiveDateTime,
    verbosity: u8,
) -> PlanningResult<()> {
    forward_pass(graph, project_start, verbosity)?;
    backward_pass(graph, verbosity)?;
    compute_slack(graph)?;

    let critical_path = find_critical_path(graph);
    graph.critical_path = critical_path;
    graph.total_duration = graph
        .nodes
        .iter()
        .filter_map(|n| n.earliest_finish)
        .max()
        .map(|end| end - project_start)
        .unwrap_or_else(Duration::zero);

    log_stage!(
        verbosity,
        "Critical path analysis: {} activities, {} critical, makespan {}m",
        graph.len(),
        graph.critical_path.len(),
        graph.total_duration.num_minutes()
    );
    Ok(())
}
