//! Choosing which nodes stay visible after collapse.
//!
//! Two groups of anchors are combined:
//!
//! - **context anchors**: the context nodes and their descendants down to
//!   `context_collapse_level` levels;
//! - **outside anchors**: nodes at depth `min_depth + outside_collapse_level`
//!   counted from the roots, where `min_depth` is the depth of the shallowest
//!   context node. Nodes inside a context subtree are not outside anchors.

use std::collections::BTreeSet;

use nestview_core::CompoundGraph;

use crate::traverse::{Depth, Relation, Traversal};

/// Anchor set for collapsing `graph` around `context_ids`.
///
/// Context ids missing from `graph` are ignored. When none are present the
/// outside sweep runs from depth 0.
#[must_use]
pub fn select_anchors(
    graph: &CompoundGraph,
    context_ids: &BTreeSet<String>,
    context_collapse_level: usize,
    outside_collapse_level: usize,
) -> BTreeSet<String> {
    let present: Vec<&str> = context_ids
        .iter()
        .map(String::as_str)
        .filter(|id| graph.has_node(id))
        .collect();
    let min_depth = present.iter().map(|id| graph.depth(id)).min().unwrap_or(0);

    let down = Traversal::new(graph).along(Relation::Children);
    let context_anchors = down.clone().depth(context_collapse_level).run(&present);
    let context_scope = down.run(&present);

    let outside_anchors = down
        .depth(Depth::Limited(min_depth.saturating_add(outside_collapse_level)))
        .exact(true)
        .run(graph.roots());

    outside_anchors
        .into_iter()
        .filter(|id| !context_scope.contains(id))
        .chain(context_anchors)
        .collect()
}
