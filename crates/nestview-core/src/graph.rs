//! Compound directed graph: cross-edges plus a parent/child forest.
//!
//! # Overview
//!
//! [`CompoundGraph`] stores nodes by string id. Each node carries an opaque
//! attribute map and at most one parent. Directed cross-edges connect any two
//! nodes, with at most one edge per ordered pair.
//!
//! ## Side maps
//!
//! Parent-of and children-of are kept as two maps that every mutating
//! operation updates together, so `children(p)` contains `c` iff
//! `parent(c) == Some(p)`. The same holds for the outgoing/incoming edge maps.
//!
//! ## Ordering
//!
//! All enumerations (nodes, edges, children, neighbors) are lexicographic by
//! id. Downstream stages depend on this for deterministic output.
//!
//! ## Permissive endpoints
//!
//! [`CompoundGraph::set_edge`] and [`CompoundGraph::set_parent`] create any
//! missing endpoint with empty attributes, matching how callers assemble a
//! graph from loosely-referenced records.

#![allow(clippy::module_name_repetitions)]

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};

use crate::error::GraphError;

/// Opaque attribute map attached to nodes, edges and the graph itself.
pub type Attrs = serde_json::Map<String, serde_json::Value>;

/// Id of the synthetic top-level parent used by record-built graphs.
pub const ROOT_ID: &str = "ROOT";

// ---------------------------------------------------------------------------
// Edge views
// ---------------------------------------------------------------------------

/// Borrowed view of one cross-edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeRef<'a> {
    pub source: &'a str,
    pub target: &'a str,
    pub attrs: &'a Attrs,
}

impl EdgeRef<'_> {
    /// The endpoint opposite to `id`.
    #[must_use]
    pub fn other(&self, id: &str) -> &str {
        if self.source == id {
            self.target
        } else {
            self.source
        }
    }
}

// ---------------------------------------------------------------------------
// CompoundGraph
// ---------------------------------------------------------------------------

/// A directed graph with a parent/child forest over the same node set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "GraphDocument", try_from = "GraphDocument")]
pub struct CompoundGraph {
    attrs: Attrs,
    nodes: BTreeMap<String, Attrs>,
    out_edges: BTreeMap<String, BTreeMap<String, Attrs>>,
    in_edges: BTreeMap<String, BTreeSet<String>>,
    parent: BTreeMap<String, String>,
    children: BTreeMap<String, BTreeSet<String>>,
}

impl CompoundGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty graph carrying the given graph-level attributes.
    #[must_use]
    pub fn with_attrs(attrs: Attrs) -> Self {
        Self {
            attrs,
            ..Self::default()
        }
    }

    /// Graph-level attributes.
    #[must_use]
    pub const fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    pub fn set_attrs(&mut self, attrs: Attrs) {
        self.attrs = attrs;
    }

    // -- nodes --------------------------------------------------------------

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All node ids in lexicographic order.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    #[must_use]
    pub fn has_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Attributes of `id`, if present.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Attrs> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Attrs> {
        self.nodes.get_mut(id)
    }

    /// Insert `id` or replace its attributes. Edges and parent links are kept.
    pub fn set_node(&mut self, id: impl Into<String>, attrs: Attrs) {
        self.nodes.insert(id.into(), attrs);
    }

    /// Insert `id` with empty attributes unless it already exists.
    ///
    /// Returns `true` when the node was created.
    pub fn ensure_node(&mut self, id: &str) -> bool {
        if self.nodes.contains_key(id) {
            return false;
        }
        self.nodes.insert(id.to_string(), Attrs::new());
        true
    }

    /// Remove `id` with its incident edges.
    ///
    /// Children of the removed node become roots; the node is unlinked from
    /// its own parent. Returns the removed attributes.
    pub fn remove_node(&mut self, id: &str) -> Option<Attrs> {
        let attrs = self.nodes.remove(id)?;

        if let Some(targets) = self.out_edges.remove(id) {
            for target in targets.keys() {
                self.unlink_source(target, id);
            }
        }
        if let Some(sources) = self.in_edges.remove(id) {
            for source in &sources {
                self.unlink_target(source, id);
            }
        }

        if let Some(kids) = self.children.remove(id) {
            for kid in &kids {
                self.parent.remove(kid);
            }
        }
        self.clear_parent(id);

        Some(attrs)
    }

    // -- edges --------------------------------------------------------------

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.out_edges.values().map(BTreeMap::len).sum()
    }

    /// All edges ordered by (source, target).
    pub fn edges(&self) -> impl Iterator<Item = EdgeRef<'_>> {
        self.out_edges.iter().flat_map(|(source, targets)| {
            targets.iter().map(move |(target, attrs)| EdgeRef {
                source,
                target,
                attrs,
            })
        })
    }

    #[must_use]
    pub fn has_edge(&self, source: &str, target: &str) -> bool {
        self.edge(source, target).is_some()
    }

    #[must_use]
    pub fn edge(&self, source: &str, target: &str) -> Option<&Attrs> {
        self.out_edges.get(source).and_then(|t| t.get(target))
    }

    /// Insert `source -> target`, replacing the attributes of an existing edge.
    ///
    /// Missing endpoints are created with empty attributes.
    pub fn set_edge(&mut self, source: &str, target: &str, attrs: Attrs) {
        self.ensure_node(source);
        self.ensure_node(target);
        self.out_edges
            .entry(source.to_string())
            .or_default()
            .insert(target.to_string(), attrs);
        self.in_edges
            .entry(target.to_string())
            .or_default()
            .insert(source.to_string());
    }

    /// Remove `source -> target`, returning its attributes.
    pub fn remove_edge(&mut self, source: &str, target: &str) -> Option<Attrs> {
        let attrs = self.unlink_target(source, target)?;
        self.unlink_source(target, source);
        Some(attrs)
    }

    // Empty adjacency entries are dropped so that equal edge sets compare equal.
    fn unlink_target(&mut self, source: &str, target: &str) -> Option<Attrs> {
        let targets = self.out_edges.get_mut(source)?;
        let attrs = targets.remove(target);
        if targets.is_empty() {
            self.out_edges.remove(source);
        }
        attrs
    }

    fn unlink_source(&mut self, target: &str, source: &str) {
        if let Some(sources) = self.in_edges.get_mut(target) {
            sources.remove(source);
            if sources.is_empty() {
                self.in_edges.remove(target);
            }
        }
    }

    /// Direct cross-edge sources into `id`.
    pub fn predecessors<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a str> + use<'a> {
        self.in_edges
            .get(id)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// Direct cross-edge targets from `id`.
    pub fn successors<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a str> + use<'a> {
        self.out_edges
            .get(id)
            .into_iter()
            .flat_map(BTreeMap::keys)
            .map(String::as_str)
    }

    /// Every edge with `id` as an endpoint: outgoing first, then incoming.
    ///
    /// A self-loop is reported once.
    #[must_use]
    pub fn node_edges(&self, id: &str) -> Vec<EdgeRef<'_>> {
        let mut edges = Vec::new();
        let Some((source, _)) = self.nodes.get_key_value(id) else {
            return edges;
        };

        if let Some(targets) = self.out_edges.get(id) {
            edges.extend(targets.iter().map(|(target, attrs)| EdgeRef {
                source,
                target,
                attrs,
            }));
        }
        for pred in self.in_edges.get(id).into_iter().flatten() {
            if pred == id {
                continue;
            }
            if let Some(attrs) = self.edge(pred, id) {
                edges.push(EdgeRef {
                    source: pred,
                    target: source,
                    attrs,
                });
            }
        }
        edges
    }

    // -- hierarchy ----------------------------------------------------------

    #[must_use]
    pub fn parent(&self, id: &str) -> Option<&str> {
        self.parent.get(id).map(String::as_str)
    }

    /// Nest `child` under `parent`, replacing any previous parent.
    ///
    /// Missing endpoints are created with empty attributes.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::HierarchyCycle`] if `parent` is `child` or one of
    /// its descendants. The graph is left unchanged in that case.
    pub fn set_parent(&mut self, child: &str, parent: &str) -> Result<(), GraphError> {
        if child == parent || self.is_ancestor(child, parent) {
            return Err(GraphError::HierarchyCycle {
                child: child.to_string(),
                parent: parent.to_string(),
            });
        }

        self.ensure_node(child);
        self.ensure_node(parent);
        self.clear_parent(child);
        self.parent.insert(child.to_string(), parent.to_string());
        self.children
            .entry(parent.to_string())
            .or_default()
            .insert(child.to_string());
        Ok(())
    }

    /// Make `child` a root. Returns the former parent.
    pub fn clear_parent(&mut self, child: &str) -> Option<String> {
        let old = self.parent.remove(child)?;
        if let Some(siblings) = self.children.get_mut(&old) {
            siblings.remove(child);
            if siblings.is_empty() {
                self.children.remove(&old);
            }
        }
        Some(old)
    }

    /// Direct children of `id`.
    pub fn children<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a str> + use<'a> {
        self.children
            .get(id)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    #[must_use]
    pub fn child_count(&self, id: &str) -> usize {
        self.children.get(id).map_or(0, BTreeSet::len)
    }

    /// Nodes without a parent.
    pub fn roots(&self) -> impl Iterator<Item = &str> {
        self.nodes
            .keys()
            .filter(|id| !self.parent.contains_key(*id))
            .map(String::as_str)
    }

    /// Ancestor chain of `id`, from its immediate parent up to its root.
    #[must_use]
    pub fn ancestors(&self, id: &str) -> Vec<&str> {
        let mut chain = Vec::new();
        let mut seen: HashSet<&str> = HashSet::from([id]);
        let mut cursor = self.parent(id);
        while let Some(p) = cursor {
            if !seen.insert(p) {
                break;
            }
            chain.push(p);
            cursor = self.parent(p);
        }
        chain
    }

    /// Distance from `id` to its parentless ancestor (roots have depth 0).
    #[must_use]
    pub fn depth(&self, id: &str) -> usize {
        self.ancestors(id).len()
    }

    /// `true` if `ancestor` appears on the parent chain of `id`.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: &str, id: &str) -> bool {
        self.ancestors(id).into_iter().any(|p| p == ancestor)
    }

    // -- algorithms ---------------------------------------------------------

    /// Topological order of all nodes with respect to cross-edges.
    ///
    /// Parent links do not constrain the order.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::CycleDetected`] naming a node on a cycle when the
    /// edges are not acyclic.
    pub fn topological_order(&self) -> Result<Vec<String>, GraphError> {
        let mut dag = DiGraph::<&str, ()>::with_capacity(self.node_count(), self.edge_count());
        let mut index: HashMap<&str, NodeIndex> = HashMap::with_capacity(self.node_count());
        for id in self.node_ids() {
            index.insert(id, dag.add_node(id));
        }
        for edge in self.edges() {
            if let (Some(&s), Some(&t)) = (index.get(edge.source), index.get(edge.target)) {
                dag.add_edge(s, t, ());
            }
        }

        let order = toposort(&dag, None).map_err(|cycle| GraphError::CycleDetected {
            node: dag[cycle.node_id()].to_string(),
        })?;
        Ok(order.into_iter().map(|idx| dag[idx].to_string()).collect())
    }
}

// ---------------------------------------------------------------------------
// Serialized form
// ---------------------------------------------------------------------------

/// One node entry in a [`GraphDocument`].
///
/// Attributes live under `attrs`, so any attribute name round-trips. Other
/// keys are rejected rather than dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeEntry {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Attrs::is_empty")]
    pub attrs: Attrs,
}

/// One edge entry in a [`GraphDocument`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EdgeEntry {
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Attrs::is_empty")]
    pub attrs: Attrs,
}

/// Flat, JSON-friendly form of a [`CompoundGraph`].
///
/// ```json
/// {
///   "graph": { "label": "book" },
///   "nodes": [
///     { "id": "ch1", "attrs": { "label": "Chapter 1" } },
///     { "id": "thm1", "parent": "ch1" }
///   ],
///   "edges": [{ "source": "def1", "target": "thm1", "attrs": { "kind": "uses" } }]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default, skip_serializing_if = "Attrs::is_empty")]
    pub graph: Attrs,
    #[serde(default)]
    pub nodes: Vec<NodeEntry>,
    #[serde(default)]
    pub edges: Vec<EdgeEntry>,
}

impl From<&CompoundGraph> for GraphDocument {
    fn from(graph: &CompoundGraph) -> Self {
        let nodes = graph
            .nodes
            .iter()
            .map(|(id, attrs)| NodeEntry {
                id: id.clone(),
                parent: graph.parent.get(id).cloned(),
                attrs: attrs.clone(),
            })
            .collect();
        let edges = graph
            .edges()
            .map(|e| EdgeEntry {
                source: e.source.to_string(),
                target: e.target.to_string(),
                attrs: e.attrs.clone(),
            })
            .collect();
        Self {
            graph: graph.attrs.clone(),
            nodes,
            edges,
        }
    }
}

impl From<CompoundGraph> for GraphDocument {
    fn from(graph: CompoundGraph) -> Self {
        Self::from(&graph)
    }
}

impl TryFrom<GraphDocument> for CompoundGraph {
    type Error = GraphError;

    fn try_from(doc: GraphDocument) -> Result<Self, Self::Error> {
        let mut graph = Self::with_attrs(doc.graph);
        let mut links = Vec::new();
        for entry in doc.nodes {
            if let Some(parent) = entry.parent.filter(|p| !p.is_empty()) {
                links.push((entry.id.clone(), parent));
            }
            graph.set_node(entry.id, entry.attrs);
        }
        for (child, parent) in links {
            graph.set_parent(&child, &parent)?;
        }
        for edge in doc.edges {
            graph.set_edge(&edge.source, &edge.target, edge.attrs);
        }
        Ok(graph)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(value: serde_json::Value) -> Attrs {
        value.as_object().cloned().unwrap_or_default()
    }

    fn chain() -> CompoundGraph {
        let mut g = CompoundGraph::new();
        g.set_edge("A", "B", Attrs::new());
        g.set_edge("B", "C", Attrs::new());
        g
    }

    #[test]
    fn set_edge_creates_missing_endpoints() {
        let g = chain();
        assert_eq!(g.node_ids().collect::<Vec<_>>(), vec!["A", "B", "C"]);
        assert_eq!(g.edge_count(), 2);
        assert!(g.has_edge("A", "B"));
        assert!(!g.has_edge("B", "A"));
    }

    #[test]
    fn set_edge_replaces_attributes() {
        let mut g = chain();
        g.set_edge("A", "B", attrs(json!({"label": "x"})));
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.edge("A", "B"), Some(&attrs(json!({"label": "x"}))));
    }

    #[test]
    fn neighbors_follow_edge_direction() {
        let g = chain();
        assert_eq!(g.successors("B").collect::<Vec<_>>(), vec!["C"]);
        assert_eq!(g.predecessors("B").collect::<Vec<_>>(), vec!["A"]);
        assert_eq!(g.successors("missing").count(), 0);
    }

    #[test]
    fn node_edges_reports_both_directions() {
        let g = chain();
        let edges: Vec<_> = g
            .node_edges("B")
            .into_iter()
            .map(|e| (e.source, e.target))
            .collect();
        assert_eq!(edges, vec![("B", "C"), ("A", "B")]);
        assert!(g.node_edges("missing").is_empty());
    }

    #[test]
    fn removing_every_edge_matches_an_edgeless_graph() {
        let mut g = chain();
        g.remove_edge("A", "B");
        g.remove_edge("B", "C");

        let mut fresh = CompoundGraph::new();
        for id in ["A", "B", "C"] {
            fresh.ensure_node(id);
        }
        assert_eq!(g, fresh);
        assert_eq!(g.remove_edge("A", "B"), None);
    }

    #[test]
    fn removing_a_node_leaves_no_trace_in_its_neighbors() {
        let mut g = chain();
        g.set_edge("C", "C", Attrs::new());
        g.remove_node("B");

        let mut fresh = CompoundGraph::new();
        fresh.ensure_node("A");
        fresh.set_edge("C", "C", Attrs::new());
        assert_eq!(g, fresh);

        g.remove_node("C");
        fresh.remove_node("C");
        assert_eq!(g, fresh);
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn self_loop_reported_once() {
        let mut g = CompoundGraph::new();
        g.set_edge("A", "A", Attrs::new());
        assert_eq!(g.node_edges("A").len(), 1);
    }

    #[test]
    fn parent_and_children_stay_consistent() {
        let mut g = CompoundGraph::new();
        g.set_parent("B", "A").expect("nest B");
        g.set_parent("C", "A").expect("nest C");
        assert_eq!(g.children("A").collect::<Vec<_>>(), vec!["B", "C"]);

        g.set_parent("C", "B").expect("move C");
        assert_eq!(g.children("A").collect::<Vec<_>>(), vec!["B"]);
        assert_eq!(g.children("B").collect::<Vec<_>>(), vec!["C"]);
        assert_eq!(g.parent("C"), Some("B"));

        assert_eq!(g.clear_parent("C"), Some("B".to_string()));
        assert_eq!(g.child_count("B"), 0);
        assert_eq!(g.roots().collect::<Vec<_>>(), vec!["A", "C"]);
    }

    #[test]
    fn set_parent_rejects_cycles() {
        let mut g = CompoundGraph::new();
        g.set_parent("B", "A").expect("nest B");
        g.set_parent("C", "B").expect("nest C");

        let err = g.set_parent("A", "C").expect_err("cycle must be rejected");
        assert_eq!(
            err,
            GraphError::HierarchyCycle {
                child: "A".into(),
                parent: "C".into()
            }
        );
        assert!(g.set_parent("A", "A").is_err());
        assert_eq!(g.parent("A"), None, "graph unchanged after rejection");
    }

    #[test]
    fn remove_node_detaches_everything() {
        let mut g = chain();
        g.set_parent("B", "P").expect("nest B");
        g.set_parent("C", "B").expect("nest C");

        let removed = g.remove_node("B");
        assert_eq!(removed, Some(Attrs::new()));
        assert!(!g.has_node("B"));
        assert_eq!(g.edge_count(), 0);
        assert_eq!(g.successors("A").count(), 0);
        assert_eq!(g.predecessors("C").count(), 0);
        assert_eq!(g.parent("C"), None);
        assert_eq!(g.child_count("P"), 0);
        assert!(g.remove_node("B").is_none());
    }

    #[test]
    fn depth_and_ancestors() {
        let mut g = CompoundGraph::new();
        g.set_parent("A", ROOT_ID).expect("nest A");
        g.set_parent("B", "A").expect("nest B");
        assert_eq!(g.depth(ROOT_ID), 0);
        assert_eq!(g.depth("B"), 2);
        assert_eq!(g.ancestors("B"), vec!["A", ROOT_ID]);
        assert!(g.is_ancestor(ROOT_ID, "B"));
        assert!(!g.is_ancestor("B", "A"));
    }

    #[test]
    fn topological_order_respects_edges() {
        let mut g = chain();
        g.set_edge("A", "C", Attrs::new());
        g.ensure_node("Z");
        let order = g.topological_order().expect("acyclic");
        let pos = |id: &str| order.iter().position(|n| n == id).expect("present");
        assert_eq!(order.len(), 4);
        assert!(pos("A") < pos("B"));
        assert!(pos("B") < pos("C"));
    }

    #[test]
    fn topological_order_reports_cycle() {
        let mut g = chain();
        g.set_edge("C", "A", Attrs::new());
        let err = g.topological_order().expect_err("cycle");
        assert!(matches!(err, GraphError::CycleDetected { .. }));
    }

    #[test]
    fn document_round_trip_preserves_structure() {
        let mut g = CompoundGraph::with_attrs(attrs(json!({"label": "book"})));
        g.set_node("thm", attrs(json!({"kind": "theorem"})));
        g.set_parent("thm", "ch1").expect("nest");
        g.set_edge("def", "thm", attrs(json!({"label": ""})));

        let text = serde_json::to_string(&g).expect("serialize");
        let back: CompoundGraph = serde_json::from_str(&text).expect("deserialize");
        assert_eq!(back, g);
    }

    #[test]
    fn document_node_attributes_are_nested() {
        let doc = json!({
            "nodes": [{"id": "a", "attrs": {"label": "x", "id": "kept", "parent": "also kept"}}]
        });
        let g: CompoundGraph = serde_json::from_value(doc).expect("valid document");
        assert_eq!(g.node("a").and_then(|a| a.get("label")), Some(&json!("x")));
        assert_eq!(g.node("a").and_then(|a| a.get("id")), Some(&json!("kept")));
        assert_eq!(g.parent("a"), None);

        let back: CompoundGraph =
            serde_json::from_str(&serde_json::to_string(&g).expect("serialize")).expect("reparse");
        assert_eq!(back, g);
    }

    #[test]
    fn document_rejects_stray_node_and_edge_keys() {
        let node: Result<CompoundGraph, _> =
            serde_json::from_value(json!({"nodes": [{"id": "a", "label": "x"}]}));
        assert!(node.is_err(), "a top-level label would otherwise be lost");

        let edge: Result<CompoundGraph, _> = serde_json::from_value(
            json!({"edges": [{"source": "a", "target": "b", "weight": 2}]}),
        );
        assert!(edge.is_err());
    }

    #[test]
    fn document_with_parent_cycle_is_rejected() {
        let doc = json!({
            "nodes": [
                {"id": "A", "parent": "B"},
                {"id": "B", "parent": "A"}
            ]
        });
        let result: Result<CompoundGraph, _> = serde_json::from_value(doc);
        assert!(result.is_err());
    }
}
