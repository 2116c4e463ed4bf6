//! Dependency graph over activities.
//!
//! Nodes live in an arena indexed by `NodeId`; edges are kept as the list of
//! `Dependency` values plus per-node incoming/outgoing edge positions. The
//! graph is built once per planning request and annotated in place by the
//! critical path stages.

mod builder;
mod inference;
mod topology;

pub use builder::{DependencyGraph, DependencyNode};
pub use inference::{infer_implicit_dependencies, CeremonySequence, CEREMONY_SEQUENCES};
