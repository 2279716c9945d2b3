//! Hierarchy collapse: fold every node into its nearest anchor ancestor.
//!
//! Anchors are the boundaries of what stays visible. A node below an anchor
//! is merged into the closest anchor on its parent chain and its edges are
//! rewired to that anchor. Anchors themselves never merge, so with nested
//! anchors the inner one survives as its own node.

use std::collections::BTreeSet;

use nestview_core::{CompoundGraph, DisjointSet, ROOT_ID};
use tracing::warn;

/// Collapse `graph` onto `anchor_ids`.
///
/// The result keeps every anchor present in `graph` and every representative
/// that still touches an edge after rewiring. Self-loops created by merging
/// are dropped; parallel edges are merged, keeping the first attributes seen
/// in edge order. With `include_parents`, each kept node is nested under the
/// representative of its original parent. A parent that is not kept on its
/// own is added without a parent of its own. The `ROOT` sentinel never
/// survives.
#[must_use]
pub fn collapse(
    graph: &CompoundGraph,
    anchor_ids: &BTreeSet<String>,
    include_parents: bool,
) -> CompoundGraph {
    let mut sets = DisjointSet::new(graph.node_ids());
    for id in graph.node_ids() {
        if anchor_ids.contains(id) {
            continue;
        }
        if let Some(anchor) = graph
            .ancestors(id)
            .into_iter()
            .find(|p| anchor_ids.contains(*p))
        {
            sets.union(id, anchor);
        }
    }

    let mut out = CompoundGraph::with_attrs(graph.attrs().clone());
    for edge in graph.edges() {
        let source = sets.find(edge.source);
        let target = sets.find(edge.target);
        if source == target {
            continue;
        }
        retain(&mut out, graph, &source);
        retain(&mut out, graph, &target);
        if !out.has_edge(&source, &target) {
            out.set_edge(&source, &target, edge.attrs.clone());
        }
    }

    for anchor in anchor_ids {
        if graph.has_node(anchor) {
            retain(&mut out, graph, anchor);
        }
    }

    if include_parents {
        attach_parents(&mut out, graph, &mut sets);
    }

    out.remove_node(ROOT_ID);
    out
}

fn retain(out: &mut CompoundGraph, graph: &CompoundGraph, id: &str) {
    if !out.has_node(id) {
        out.set_node(id, graph.node(id).cloned().unwrap_or_default());
    }
}

/// Nest kept nodes under their mapped parents.
///
/// A mapped parent missing from `out` is added as a parentless wrapper; its
/// own ancestors are not pulled in.
fn attach_parents(out: &mut CompoundGraph, graph: &CompoundGraph, sets: &mut DisjointSet) {
    let kept: Vec<String> = out.node_ids().map(String::from).collect();
    for id in &kept {
        let Some(parent) = graph.parent(id) else {
            continue;
        };
        let mapped = sets.find(parent);
        if mapped == ROOT_ID || mapped == *id || !graph.has_node(&mapped) {
            continue;
        }
        retain(out, graph, &mapped);
        // `mapped` is a strict source ancestor of `id`.
        if let Err(err) = out.set_parent(id, &mapped) {
            warn!(%err, "skipping parent link during collapse");
        }
    }
}
