//! Graph construction: activity upserts and dependency insertion.

use chrono::{Duration, NaiveDateTime};
use std::collections::BTreeSet;

use crate::critical_path::NodeStage;
use crate::error::{PlanningError, PlanningResult};
use crate::index::{ActivityIndex, NodeId};
use crate::models::{Activity, Dependency};
use crate::{log_debug, log_decision};

use super::inference::infer_implicit_dependencies;

/// One activity plus its adjacency and CPM annotations.
#[derive(Clone, Debug)]
pub struct DependencyNode {
    pub activity: Activity,
    pub predecessors: BTreeSet<NodeId>,
    pub successors: BTreeSet<NodeId>,
    /// Positions in `DependencyGraph::dependencies` of edges ending here.
    pub(crate) incoming: Vec<usize>,
    /// Positions in `DependencyGraph::dependencies` of edges starting here.
    pub(crate) outgoing: Vec<usize>,
    pub earliest_start: Option<NaiveDateTime>,
    pub earliest_finish: Option<NaiveDateTime>,
    pub latest_start: Option<NaiveDateTime>,
    pub latest_finish: Option<NaiveDateTime>,
    pub slack: Option<Duration>,
    pub is_critical: bool,
    pub stage: NodeStage,
}

impl DependencyNode {
    fn new(activity: Activity) -> Self {
        Self {
            activity,
            predecessors: BTreeSet::new(),
            successors: BTreeSet::new(),
            incoming: Vec::new(),
            outgoing: Vec::new(),
            earliest_start: None,
            earliest_finish: None,
            latest_start: None,
            latest_finish: None,
            slack: None,
            is_critical: false,
            stage: NodeStage::Unscheduled,
        }
    }

    /// Setup + duration + cleanup of the wrapped activity.
    pub fn total_duration(&self) -> Duration {
        self.activity.total_duration()
    }

    pub(crate) fn clear_timing(&mut self) {
        self.earliest_start = None;
        self.earliest_finish = None;
        self.latest_start = None;
        self.latest_finish = None;
        self.slack = None;
        self.is_critical = false;
        self.stage = NodeStage::Unscheduled;
    }
}

/// Activities, their ordering constraints and the derived critical path.
#[derive(Clone, Debug, Default)]
pub struct DependencyGraph {
    pub(crate) index: ActivityIndex,
    pub(crate) nodes: Vec<DependencyNode>,
    pub dependencies: Vec<Dependency>,
    pub critical_path: Vec<String>,
    pub total_duration: Duration,
    pub project_start: Option<NaiveDateTime>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from activities and explicit dependencies, optionally
    /// followed by the rule-inferred ones.
    pub fn from_parts(
        activities: &[Activity],
        dependencies: &[Dependency],
        infer: bool,
        verbosity: u8,
    ) -> PlanningResult<Self> {
        let mut graph = Self {
            index: ActivityIndex::with_capacity(activities.len()),
            nodes: Vec::with_capacity(activities.len()),
            ..Self::default()
        };
        for activity in activities {
            graph.add_activity(activity.clone())?;
        }
        for dependency in dependencies {
            graph.add_dependency(dependency.clone())?;
        }
        if infer {
            let added = graph.add_inferred_dependencies(verbosity)?;
            log_decision!(verbosity, "Inferred {} implicit dependencies", added);
        }
        Ok(graph)
    }

    /// Insert an activity, or replace the payload of an existing one with the
    /// same id. Edges are kept; analysis results are discarded.
    pub fn add_activity(&mut self, activity: Activity) -> PlanningResult<NodeId> {
        let problems = activity.validate();
        if !problems.is_empty() {
            return Err(PlanningError::validation(
                format!("activity '{}'", activity.id),
                problems,
            ));
        }

        let (node, is_new) = self.index.insert(&activity.id);
        if is_new {
            self.nodes.push(DependencyNode::new(activity));
        } else {
            self.nodes[node as usize].activity = activity;
        }
        self.reset_analysis();
        Ok(node)
    }

    /// Insert an ordering constraint between two known activities.
    ///
    /// Returns `false` when an identical edge is already present.
    pub fn add_dependency(&mut self, dependency: Dependency) -> PlanningResult<bool> {
        let pred_id = dependency.predecessor_id.as_str();
        let succ_id = dependency.successor_id.as_str();

        if pred_id == succ_id {
            return Err(PlanningError::integrity(
                pred_id,
                succ_id,
                "Activity cannot depend on itself",
            ));
        }
        let problems = dependency.validate();
        if !problems.is_empty() {
            return Err(PlanningError::validation(
                format!("dependency {} -> {}", pred_id, succ_id),
                problems,
            ));
        }
        let pred = self.index.get(pred_id).ok_or_else(|| {
            PlanningError::integrity(
                pred_id,
                succ_id,
                format!("Predecessor activity '{}' not found", pred_id),
            )
        })?;
        let succ = self.index.get(succ_id).ok_or_else(|| {
            PlanningError::integrity(
                pred_id,
                succ_id,
                format!("Successor activity '{}' not found", succ_id),
            )
        })?;

        if self.dependencies.contains(&dependency) {
            return Ok(false);
        }

        let edge = self.dependencies.len();
        self.dependencies.push(dependency);
        self.nodes[pred as usize].outgoing.push(edge);
        self.nodes[pred as usize].successors.insert(succ);
        self.nodes[succ as usize].incoming.push(edge);
        self.nodes[succ as usize].predecessors.insert(pred);
        self.reset_analysis();
        Ok(true)
    }

    /// Remove every edge from `predecessor_id` to `successor_id`.
    ///
    /// Returns the number of edges dropped.
    pub fn remove_dependency(&mut self, predecessor_id: &str, successor_id: &str) -> usize {
        let before = self.dependencies.len();
        self.dependencies
            .retain(|d| !(d.predecessor_id == predecessor_id && d.successor_id == successor_id));
        let removed = before - self.dependencies.len();
        if removed > 0 {
            self.rebuild_adjacency();
            self.reset_analysis();
        }
        removed
    }

    /// Apply the implicit dependency rules to the activities currently in
    /// the graph. Returns how many new edges were added.
    pub fn add_inferred_dependencies(&mut self, verbosity: u8) -> PlanningResult<usize> {
        let activities: Vec<Activity> = self.nodes.iter().map(|n| n.activity.clone()).collect();
        let mut added = 0;
        for dependency in infer_implicit_dependencies(&activities) {
            log_debug!(
                verbosity,
                "inferred {} -> {} ({}, lag {}m)",
                dependency.predecessor_id,
                dependency.successor_id,
                dependency.dependency_type,
                dependency.lag.num_minutes()
            );
            if self.add_dependency(dependency)? {
                added += 1;
            }
        }
        Ok(added)
    }

    fn rebuild_adjacency(&mut self) {
        for node in &mut self.nodes {
            node.predecessors.clear();
            node.successors.clear();
            node.incoming.clear();
            node.outgoing.clear();
        }
        for (edge, dep) in self.dependencies.iter().enumerate() {
            let (Some(pred), Some(succ)) = (
                self.index.get(&dep.predecessor_id),
                self.index.get(&dep.successor_id),
            ) else {
                continue;
            };
            self.nodes[pred as usize].outgoing.push(edge);
            self.nodes[pred as usize].successors.insert(succ);
            self.nodes[succ as usize].incoming.push(edge);
            self.nodes[succ as usize].predecessors.insert(pred);
        }
    }

    /// Drop all CPM annotations; the graph must be analyzed again.
    pub fn reset_analysis(&mut self) {
        for node in &mut self.nodes {
            node.clear_timing();
        }
        self.critical_path.clear();
        self.total_duration = Duration::zero();
        self.project_start = None;
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, activity_id: &str) -> Option<&DependencyNode> {
        self.index
            .get(activity_id)
            .map(|node| &self.nodes[node as usize])
    }

    pub fn node_mut(&mut self, activity_id: &str) -> Option<&mut DependencyNode> {
        let node = self.index.get(activity_id)?;
        Some(&mut self.nodes[node as usize])
    }

    /// Nodes with their string ids, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DependencyNode)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, node)| self.index.resolve(i as NodeId).map(|id| (id, node)))
    }

    pub fn activity_id(&self, node: NodeId) -> Option<&str> {
        self.index.resolve(node)
    }

    pub fn predecessor_ids(&self, activity_id: &str) -> Vec<&str> {
        self.node(activity_id)
            .map(|n| self.resolve_all(&n.predecessors))
            .unwrap_or_default()
    }

    pub fn successor_ids(&self, activity_id: &str) -> Vec<&str> {
        self.node(activity_id)
            .map(|n| self.resolve_all(&n.successors))
            .unwrap_or_default()
    }

    /// Number of distinct predecessors plus successors.
    pub fn dependency_count(&self, activity_id: &str) -> usize {
        self.node(activity_id)
            .map(|n| n.predecessors.len() + n.successors.len())
            .unwrap_or(0)
    }

    fn resolve_all(&self, nodes: &BTreeSet<NodeId>) -> Vec<&str> {
        nodes
            .iter()
            .filter_map(|&n| self.index.resolve(n))
            .collect()
    }
}
