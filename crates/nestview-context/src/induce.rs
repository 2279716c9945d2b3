//! Induced compound subgraph for an arbitrary node selection.
//!
//! The result holds the selected nodes that exist, every edge between two
//! selected nodes, and every parent link whose parent is also selected.
//! Nodes whose parent falls outside the selection become roots, which is how
//! a selection cuts the hierarchy.

use std::collections::{BTreeSet, HashSet};

use nestview_core::CompoundGraph;

/// Build the subgraph of `graph` induced by `node_ids`.
///
/// Ids absent from `graph` are ignored. Graph-level attributes are copied.
#[must_use]
pub fn induce(graph: &CompoundGraph, node_ids: &BTreeSet<String>) -> CompoundGraph {
    let mut sub = CompoundGraph::with_attrs(graph.attrs().clone());

    for id in node_ids {
        if let Some(attrs) = graph.node(id) {
            sub.set_node(id.as_str(), attrs.clone());
        }
    }

    // Each edge is found from both endpoints; copy it once.
    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    for id in node_ids {
        for edge in graph.node_edges(id) {
            if !node_ids.contains(edge.other(id)) {
                continue;
            }
            if seen.insert((edge.source, edge.target)) {
                sub.set_edge(edge.source, edge.target, edge.attrs.clone());
            }
        }
    }

    for id in node_ids {
        if let Some(parent) = graph.parent(id)
            && node_ids.contains(parent)
        {
            // The source graph is a forest, so its restriction is too.
            if let Err(err) = sub.set_parent(id, parent) {
                tracing::warn!(%err, "skipping parent link while inducing subgraph");
            }
        }
    }

    sub
}

#[cfg(test)]
mod tests {
    use super::*;
    use nestview_core::Attrs;
    use serde_json::json;

    fn ids(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(ToString::to_string).collect()
    }

    fn labelled(label: &str) -> Attrs {
        json!({ "label": label }).as_object().cloned().unwrap_or_default()
    }

    fn sample() -> CompoundGraph {
        let mut g = CompoundGraph::with_attrs(labelled("whole"));
        for id in ["A", "B", "C", "D"] {
            g.set_node(id, labelled(id));
        }
        g.set_edge("A", "B", labelled("ab"));
        g.set_edge("B", "C", Attrs::new());
        g.set_edge("C", "A", Attrs::new());
        g.set_edge("C", "D", Attrs::new());
        g.set_parent("B", "A").expect("nest");
        g.set_parent("C", "B").expect("nest");
        g
    }

    #[test]
    fn keeps_only_selected_existing_nodes() {
        let sub = induce(&sample(), &ids(&["A", "B", "ghost"]));
        assert_eq!(sub.node_ids().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(sub.node("A"), Some(&labelled("A")));
        assert_eq!(sub.attrs(), &labelled("whole"));
    }

    #[test]
    fn copies_internal_edges_once_with_attributes() {
        let sub = induce(&sample(), &ids(&["A", "B", "C"]));
        assert_eq!(sub.edge_count(), 3);
        assert_eq!(sub.edge("A", "B"), Some(&labelled("ab")));
        assert!(sub.has_edge("C", "A"));
        assert!(!sub.has_node("D"));
    }

    #[test]
    fn parent_outside_selection_is_cut() {
        let sub = induce(&sample(), &ids(&["B", "C"]));
        assert_eq!(sub.parent("B"), None, "A not selected");
        assert_eq!(sub.parent("C"), Some("B"));
    }

    #[test]
    fn empty_selection_gives_empty_graph() {
        let sub = induce(&sample(), &BTreeSet::new());
        assert!(sub.is_empty());
        assert_eq!(sub.edge_count(), 0);
    }

    #[test]
    fn source_graph_is_untouched() {
        let g = sample();
        let before = g.clone();
        let mut sub = induce(&g, &ids(&["A", "B"]));
        sub.remove_node("A");
        assert_eq!(g, before);
    }
}
