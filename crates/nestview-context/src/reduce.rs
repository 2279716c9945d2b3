//! Transitive reduction of the cross-edges of a compound graph.
//!
//! An edge `u -> v` is redundant when `v` is also reachable from `u` through
//! another of its direct successors. Dropping every redundant edge leaves the
//! smallest edge set with the same reachability. Nodes, parent links and all
//! attributes pass through untouched.
//!
//! # Algorithm
//!
//! One pass in reverse topological order (sinks first). For each node the
//! nodes reachable through its successors are the union of their reach sets;
//! a direct successor found in that union is implied and its edge is dropped.
//! On an acyclic graph no node reaches itself, so this is exactly the set of
//! edges with an alternative path.

use std::collections::{HashMap, HashSet};

use nestview_core::{CompoundGraph, GraphError};
use tracing::{debug, instrument};

/// Return a copy of `graph` without transitively implied edges.
///
/// # Errors
///
/// Returns [`GraphError::CycleDetected`] if the edges contain a cycle; a
/// reduction is only defined for acyclic graphs.
#[instrument(skip(graph), fields(nodes = graph.node_count(), edges = graph.edge_count()))]
pub fn reduce(graph: &CompoundGraph) -> Result<CompoundGraph, GraphError> {
    let order = graph.topological_order()?;

    let mut reduced = graph.clone();
    let mut removed = 0usize;
    let mut reach: HashMap<&str, HashSet<&str>> = HashMap::with_capacity(order.len());

    for node in order.iter().rev() {
        let mut beyond: HashSet<&str> = HashSet::new();
        for next in graph.successors(node) {
            if let Some(further) = reach.get(next) {
                beyond.extend(further);
            }
        }

        let mut own: HashSet<&str> = beyond.clone();
        for next in graph.successors(node) {
            if beyond.contains(next) {
                reduced.remove_edge(node, next);
                removed += 1;
            }
            own.insert(next);
        }
        reach.insert(node.as_str(), own);
    }

    debug!(removed, kept = reduced.edge_count(), "reduced edges");
    Ok(reduced)
}
