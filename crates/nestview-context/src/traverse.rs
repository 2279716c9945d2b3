//! Bounded, multi-relation breadth-first traversal.
//!
//! Expansion happens in discrete depth steps. At each step every relation is
//! queried for every frontier node; new nodes (never seen before at any
//! depth) form the next frontier.
//!
//! # Result
//!
//! - non-exact: every node visited, seeds included;
//! - exact: only the frontier discovered at exactly the requested depth,
//!   empty if the search ran dry first.
//!
//! Depth 0 returns the seeds unchanged in both modes.

use std::collections::BTreeSet;

use nestview_core::CompoundGraph;

/// A way of moving from one node to its neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// The node's parent (zero or one neighbor).
    Parent,
    /// The node's direct children.
    Children,
    /// Sources of edges into the node.
    Predecessors,
    /// Targets of edges out of the node.
    Successors,
}

/// How far to expand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Depth {
    /// Until the frontier is empty.
    #[default]
    Unbounded,
    /// At most this many steps.
    Limited(usize),
}

impl From<usize> for Depth {
    fn from(steps: usize) -> Self {
        Self::Limited(steps)
    }
}

impl Depth {
    const fn allows(self, step: usize) -> bool {
        match self {
            Self::Unbounded => true,
            Self::Limited(max) => step <= max,
        }
    }
}

fn push_neighbors<'g>(
    graph: &'g CompoundGraph,
    id: &str,
    relation: Relation,
    out: &mut Vec<&'g str>,
) {
    match relation {
        Relation::Parent => out.extend(graph.parent(id)),
        Relation::Children => out.extend(graph.children(id)),
        Relation::Predecessors => out.extend(graph.predecessors(id)),
        Relation::Successors => out.extend(graph.successors(id)),
    }
}

/// Nodes reachable from `seeds` through `relations` within `depth` steps.
///
/// Seeds that are not in the graph are returned as visited but never expand.
pub fn traverse<I, S>(
    graph: &CompoundGraph,
    seeds: I,
    relations: &[Relation],
    depth: Depth,
    exact: bool,
) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut visited: BTreeSet<String> = BTreeSet::new();
    let mut frontier: Vec<String> = Vec::new();
    for seed in seeds {
        let seed = seed.as_ref();
        if visited.insert(seed.to_string()) {
            frontier.push(seed.to_string());
        }
    }

    if frontier.is_empty() || depth == Depth::Limited(0) {
        return visited;
    }

    let mut neighbors: Vec<&str> = Vec::new();
    let mut step = 1;
    while depth.allows(step) && !frontier.is_empty() {
        let mut next = Vec::new();
        for node in &frontier {
            for &relation in relations {
                neighbors.clear();
                push_neighbors(graph, node, relation, &mut neighbors);
                for &n in &neighbors {
                    if !visited.contains(n) {
                        visited.insert(n.to_string());
                        next.push(n.to_string());
                    }
                }
            }
        }
        frontier = next;
        if exact && depth == Depth::Limited(step) {
            return frontier.into_iter().collect();
        }
        step += 1;
    }

    if exact {
        frontier.into_iter().collect()
    } else {
        visited
    }
}

/// Builder over [`traverse`] with unbounded, non-exact defaults.
#[derive(Debug, Clone)]
pub struct Traversal<'g> {
    graph: &'g CompoundGraph,
    relations: Vec<Relation>,
    depth: Depth,
    exact: bool,
}

impl<'g> Traversal<'g> {
    #[must_use]
    pub const fn new(graph: &'g CompoundGraph) -> Self {
        Self {
            graph,
            relations: Vec::new(),
            depth: Depth::Unbounded,
            exact: false,
        }
    }

    #[must_use]
    pub fn along(mut self, relation: Relation) -> Self {
        self.relations.push(relation);
        self
    }

    #[must_use]
    pub fn depth(mut self, depth: impl Into<Depth>) -> Self {
        self.depth = depth.into();
        self
    }

    #[must_use]
    pub const fn exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }

    pub fn run<I, S>(&self, seeds: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        traverse(self.graph, seeds, &self.relations, self.depth, self.exact)
    }
}
