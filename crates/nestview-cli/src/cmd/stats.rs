//! `nv stats`: size and shape of a graph.

use clap::Args;
use nestview_core::{CompoundGraph, ROOT_ID};
use serde::Serialize;

use crate::input::InputArgs;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `nv stats`.
#[derive(Args, Debug)]
pub struct StatsArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

/// Report payload for `nv stats`.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
    pub roots: usize,
    pub leaves: usize,
    pub max_depth: usize,
    pub acyclic: bool,
    pub has_root_sentinel: bool,
}

impl GraphStats {
    #[must_use]
    pub fn of(graph: &CompoundGraph) -> Self {
        Self {
            nodes: graph.node_count(),
            edges: graph.edge_count(),
            roots: graph.roots().count(),
            leaves: graph.node_ids().filter(|id| graph.child_count(id) == 0).count(),
            max_depth: graph.node_ids().map(|id| graph.depth(id)).max().unwrap_or(0),
            acyclic: graph.topological_order().is_ok(),
            has_root_sentinel: graph.has_node(ROOT_ID),
        }
    }
}

/// Execute `nv stats`.
pub fn run_stats(args: &StatsArgs, output: OutputMode) -> anyhow::Result<()> {
    let graph = args.input.load()?;
    let stats = GraphStats::of(&graph);

    render_mode(
        output,
        &stats,
        |s, w| {
            writeln!(
                w,
                "nodes={} edges={} roots={} leaves={} max_depth={} acyclic={}",
                s.nodes, s.edges, s.roots, s.leaves, s.max_depth, s.acyclic
            )
        },
        |s, w| {
            pretty_section(w, "Graph")?;
            pretty_kv(w, "nodes", s.nodes.to_string())?;
            pretty_kv(w, "edges", s.edges.to_string())?;
            pretty_kv(w, "roots", s.roots.to_string())?;
            pretty_kv(w, "leaves", s.leaves.to_string())?;
            pretty_kv(w, "max depth", s.max_depth.to_string())?;
            pretty_kv(w, "acyclic", if s.acyclic { "yes" } else { "no" })
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use nestview_core::Attrs;

    #[test]
    fn counts_shape_of_hierarchy() {
        let mut g = CompoundGraph::new();
        g.set_parent("a", ROOT_ID).expect("nest");
        g.set_parent("b", "a").expect("nest");
        g.set_parent("c", "a").expect("nest");
        g.set_edge("b", "c", Attrs::new());

        assert_eq!(
            GraphStats::of(&g),
            GraphStats {
                nodes: 4,
                edges: 1,
                roots: 1,
                leaves: 2,
                max_depth: 2,
                acyclic: true,
                has_root_sentinel: true,
            }
        );
    }

    #[test]
    fn cycles_and_empty_graphs() {
        let mut g = CompoundGraph::new();
        assert_eq!(GraphStats::of(&g).max_depth, 0);

        g.set_edge("x", "y", Attrs::new());
        g.set_edge("y", "x", Attrs::new());
        let stats = GraphStats::of(&g);
        assert!(!stats.acyclic);
        assert!(!stats.has_root_sentinel);
    }
}
