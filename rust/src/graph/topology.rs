//! Cycle detection and topological ordering.
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.3-22.4

use std::collections::VecDeque;

use crate::error::{PlanningError, PlanningResult};
use crate::index::NodeId;

use super::builder::DependencyGraph;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

impl DependencyGraph {
    /// Three-color depth-first search for a back edge. O(V+E), no mutation.
    pub fn has_cycle(&self) -> bool {
        let n = self.nodes.len();
        let mut colors = vec![Color::White; n];
        let successors: Vec<Vec<NodeId>> = self
            .nodes
            .iter()
            .map(|node| node.successors.iter().copied().collect())
            .collect();

        // Explicit stack of (node, next successor position) instead of recursion.
        let mut stack: Vec<(NodeId, usize)> = Vec::new();
        for root in 0..n as NodeId {
            if colors[root as usize] != Color::White {
                continue;
            }
            colors[root as usize] = Color::Gray;
            stack.push((root, 0));

            while let Some(top) = stack.last_mut() {
                let (node, pos) = *top;
                match successors[node as usize].get(pos) {
                    Some(&next) => {
                        top.1 += 1;
                        match colors[next as usize] {
                            Color::Gray => return true,
                            Color::White => {
                                colors[next as usize] = Color::Gray;
                                stack.push((next, 0));
                            }
                            Color::Black => {}
                        }
                    }
                    None => {
                        colors[node as usize] = Color::Black;
                        stack.pop();
                    }
                }
            }
        }
        false
    }

    /// Kahn's algorithm with a FIFO queue seeded in insertion order.
    ///
    /// Fails with `PlanningError::Cycle` listing the activities that could
    /// not be ordered.
    pub fn topological_order(&self) -> PlanningResult<Vec<NodeId>> {
        let n = self.nodes.len();
        let mut in_degree: Vec<usize> = self.nodes.iter().map(|n| n.predecessors.len()).collect();
        let mut queue: VecDeque<NodeId> = (0..n as NodeId)
            .filter(|&node| in_degree[node as usize] == 0)
            .collect();
        let mut order: Vec<NodeId> = Vec::with_capacity(n);

        while let Some(node) = queue.pop_front() {
            order.push(node);
            for &succ in &self.nodes[node as usize].successors {
                let degree = &mut in_degree[succ as usize];
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(succ);
                }
            }
        }

        if order.len() < n {
            let unordered = (0..n as NodeId)
                .filter(|&node| in_degree[node as usize] > 0)
                .filter_map(|node| self.index.resolve(node).map(str::to_string))
                .collect();
            return Err(PlanningError::Cycle {
                unordered,
                total: n,
            });
        }

        Ok(order)
    }

    /// Topological order as activity ids.
    pub fn topological_sort(&self) -> PlanningResult<Vec<String>> {
        Ok(self
            .topological_order()?
            .into_iter()
            .filter_map(|node| self.index.resolve(node).map(str::to_string))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use crate::graph::DependencyGraph;
    use crate::models::{Activity, ActivityType, Dependency, Priority};

    fn graph_with(ids: &[&str], edges: &[(&str, &str)]) -> DependencyGraph {
        let activities: Vec<Activity> = ids
            .iter()
            .map(|id| Activity::new(*id, *id, ActivityType::Decoration, Duration::hours(1), Priority::Medium))
            .collect();
        let deps: Vec<Dependency> = edges
            .iter()
            .map(|(p, s)| Dependency::finish_to_start(*p, *s))
            .collect();
        DependencyGraph::from_parts(&activities, &deps, false, 0).unwrap()
    }

    #[test]
    fn test_diamond_is_acyclic_and_ordered() {
        let graph = graph_with(
            &["d", "b", "c", "a"],
            &[("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")],
        );
        assert!(!graph.has_cycle());

        let order = graph.topological_sort().unwrap();
        assert_eq!(order, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_cycle_detected_by_both_algorithms() {
        let graph = graph_with(&["a", "b", "c", "x"], &[("a", "b"), ("b", "c"), ("c", "a")]);
        assert!(graph.has_cycle());

        let err = graph.topological_sort().unwrap_err();
        match err {
            crate::error::PlanningError::Cycle { unordered, total } => {
                assert_eq!(unordered, vec!["a", "b", "c"]);
                assert_eq!(total, 4);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_independent_nodes_keep_insertion_order() {
        let graph = graph_with(&["c", "a", "b"], &[]);
        assert_eq!(graph.topological_sort().unwrap(), vec!["c", "a", "b"]);
        assert!(!graph.has_cycle());
    }

    #[test]
    fn test_empty_graph() {
        let graph = DependencyGraph::new();
        assert!(!graph.has_cycle());
        assert!(graph.topological_sort().unwrap().is_empty());
    }
}
