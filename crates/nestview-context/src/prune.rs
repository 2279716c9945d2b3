//! Removing top-level wrappers that hold a single child.

use std::collections::BTreeSet;

use nestview_core::CompoundGraph;

/// Splice out every unprotected root that has exactly one child.
///
/// Candidates are collected before anything is removed, so a child promoted
/// to root by this pass is not examined again. Returns the removed ids in
/// ascending order.
pub fn prune_single_child_roots(
    graph: &mut CompoundGraph,
    protected_ids: &BTreeSet<String>,
) -> Vec<String> {
    let wrappers: Vec<String> = graph
        .roots()
        .filter(|id| !protected_ids.contains(*id) && graph.child_count(id) == 1)
        .map(String::from)
        .collect();

    for id in &wrappers {
        graph.remove_node(id);
    }
    wrappers
}

/// Repeat [`prune_single_child_roots`] until a pass removes nothing.
pub fn prune_single_child_roots_fixpoint(
    graph: &mut CompoundGraph,
    protected_ids: &BTreeSet<String>,
) -> Vec<String> {
    let mut pruned = Vec::new();
    loop {
        let pass = prune_single_child_roots(graph, protected_ids);
        if pass.is_empty() {
            return pruned;
        }
        pruned.extend(pass);
    }
}
