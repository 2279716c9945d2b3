use serde::{Deserialize, Serialize};

/// Tuning knobs for building a context view.
///
/// Every field has a default, so a partial `[context]` table in
/// `nestview.toml` only overrides what it names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct ContextOptions {
    /// Drop edges implied by another path.
    pub reduce_edges: bool,
    /// Hierarchy levels below each context node that stay expanded.
    pub context_collapse_level: usize,
    /// Extra levels, relative to the shallowest context node, at which
    /// branches outside the context collapse.
    pub outside_collapse_level: usize,
    /// How many predecessor hops to include.
    pub predecessor_radius: usize,
    /// How many successor hops to include.
    pub successor_radius: usize,
    /// Keep (remapped) parent links in the collapsed view.
    pub include_parents: bool,
    /// Splice out parentless wrappers that have exactly one child.
    pub prune_single_child_parents: bool,
    /// Repeat wrapper pruning until nothing changes.
    pub prune_to_fixpoint: bool,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            reduce_edges: true,
            context_collapse_level: 1,
            outside_collapse_level: 0,
            predecessor_radius: 1,
            successor_radius: 1,
            include_parents: true,
            prune_single_child_parents: true,
            prune_to_fixpoint: false,
        }
    }
}
