//! The context-view pipeline.
//!
//! Starting from a set of focus ids the pipeline:
//!
//! 1. expands the focus to every descendant;
//! 2. adds predecessors and successors within the configured radii;
//! 3. adds every ancestor of the result;
//! 4. induces the subgraph on that closure;
//! 5. collapses it onto the selected anchors;
//! 6. optionally reduces edges and prunes single-child wrappers.
//!
//! The input graph is never modified.

use std::collections::BTreeSet;

use nestview_core::timing::timed;
use nestview_core::{CompoundGraph, ContextOptions, GraphError};
use tracing::{debug, instrument};

use crate::anchors::select_anchors;
use crate::collapse::collapse;
use crate::induce::induce;
use crate::prune::{prune_single_child_roots, prune_single_child_roots_fixpoint};
use crate::reduce::reduce;
use crate::traverse::{Relation, Traversal};

/// Build the context view of `graph` around `context_ids`.
///
/// An empty `context_ids` yields an empty graph that keeps the graph-level
/// attributes.
///
/// # Errors
///
/// Returns [`GraphError::CycleDetected`] when edge reduction is enabled and
/// the collapsed view contains a cycle.
#[instrument(skip(graph, options), fields(context = context_ids.len()))]
pub fn build_context_graph(
    graph: &CompoundGraph,
    context_ids: &BTreeSet<String>,
    options: &ContextOptions,
) -> Result<CompoundGraph, GraphError> {
    if context_ids.is_empty() {
        return Ok(CompoundGraph::with_attrs(graph.attrs().clone()));
    }

    let seeds = timed("context.seeds", || {
        Traversal::new(graph).along(Relation::Children).run(context_ids)
    });
    debug!(seeds = seeds.len(), "expanded context to descendants");

    let neighborhood = timed("context.neighborhood", || {
        let mut found = Traversal::new(graph)
            .along(Relation::Predecessors)
            .depth(options.predecessor_radius)
            .run(&seeds);
        found.extend(
            Traversal::new(graph)
                .along(Relation::Successors)
                .depth(options.successor_radius)
                .run(&seeds),
        );
        found
    });
    debug!(nodes = neighborhood.len(), "collected neighborhood");

    let closure = timed("context.ancestors", || {
        Traversal::new(graph).along(Relation::Parent).run(&neighborhood)
    });
    debug!(nodes = closure.len(), "closed over ancestors");

    let sub = timed("context.induce", || induce(graph, &closure));
    debug!(nodes = sub.node_count(), edges = sub.edge_count(), "induced subgraph");

    let mut view = timed("context.collapse", || {
        let anchors = select_anchors(
            &sub,
            context_ids,
            options.context_collapse_level,
            options.outside_collapse_level,
        );
        debug!(anchors = anchors.len(), "selected anchors");
        collapse(&sub, &anchors, options.include_parents)
    });
    debug!(nodes = view.node_count(), edges = view.edge_count(), "collapsed");

    if options.reduce_edges {
        view = timed("context.reduce", || reduce(&view))?;
        debug!(edges = view.edge_count(), "reduced edges");
    }

    if options.prune_single_child_parents {
        let pruned = timed("context.prune", || {
            if options.prune_to_fixpoint {
                prune_single_child_roots_fixpoint(&mut view, context_ids)
            } else {
                prune_single_child_roots(&mut view, context_ids)
            }
        });
        debug!(pruned = pruned.len(), "pruned single-child roots");
    }

    Ok(view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nestview_core::{Attrs, ROOT_ID};
    use serde_json::json;

    fn ids(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(ToString::to_string).collect()
    }

    fn flat_chain() -> CompoundGraph {
        let mut g = CompoundGraph::with_attrs(
            json!({"name": "chain"}).as_object().cloned().unwrap_or_default(),
        );
        for (s, t) in [("A", "B"), ("B", "C"), ("C", "D"), ("D", "E")] {
            g.set_edge(s, t, Attrs::new());
        }
        g
    }

    #[test]
    fn empty_context_keeps_graph_attributes_only() {
        let g = flat_chain();
        let view = build_context_graph(&g, &BTreeSet::new(), &ContextOptions::default())
            .expect("view");
        assert!(view.is_empty());
        assert_eq!(view.attrs(), g.attrs());
    }

    #[test]
    fn default_radius_includes_direct_neighbors() {
        let view = build_context_graph(&flat_chain(), &ids(&["C"]), &ContextOptions::default())
            .expect("view");
        assert_eq!(view.node_ids().collect::<Vec<_>>(), vec!["B", "C", "D"]);
        assert!(view.has_edge("B", "C"));
        assert!(view.has_edge("C", "D"));
    }

    #[test]
    fn predecessors_only() {
        let opts = ContextOptions {
            predecessor_radius: 2,
            successor_radius: 0,
            ..ContextOptions::default()
        };
        let view = build_context_graph(&flat_chain(), &ids(&["C"]), &opts).expect("view");
        assert_eq!(view.node_ids().collect::<Vec<_>>(), vec!["A", "B", "C"]);
    }

    #[test]
    fn input_is_not_mutated() {
        let g = flat_chain();
        let before = g.clone();
        let _ = build_context_graph(&g, &ids(&["B"]), &ContextOptions::default());
        assert_eq!(g, before);
    }

    #[test]
    fn cycle_surfaces_when_reducing() {
        let mut g = flat_chain();
        g.set_edge("D", "C", Attrs::new());
        let err = build_context_graph(&g, &ids(&["C"]), &ContextOptions::default())
            .expect_err("cycle");
        assert!(matches!(err, GraphError::CycleDetected { .. }));

        let opts = ContextOptions {
            reduce_edges: false,
            ..ContextOptions::default()
        };
        let view = build_context_graph(&g, &ids(&["C"]), &opts).expect("no reduction");
        assert!(view.has_edge("D", "C"));
    }

    #[test]
    fn sentinel_root_never_appears() {
        let mut g = flat_chain();
        for id in ["A", "B", "C", "D", "E"] {
            g.set_parent(id, ROOT_ID).expect("nest");
        }
        let view = build_context_graph(&g, &ids(&["C"]), &ContextOptions::default())
            .expect("view");
        assert!(!view.has_node(ROOT_ID));
        assert_eq!(view.node_count(), 3);
    }
}
