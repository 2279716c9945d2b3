#![forbid(unsafe_code)]
//! nestview-context library.
//!
//! Builds a focused, readable view of a [`CompoundGraph`] around a set of
//! context ids. The pipeline entry point is [`build_context_graph`]; each stage
//! is also public for callers that want to compose their own.
//!
//! | module | stage |
//! |---|---|
//! | [`traverse`] | bounded breadth-first expansion over hierarchy and edges |
//! | [`induce`] | subgraph on a node selection |
//! | [`anchors`] | which nodes stay visible |
//! | [`collapse`] | merge nodes into their nearest anchor |
//! | [`reduce`] | transitive reduction |
//! | [`prune`] | drop single-child top-level wrappers |
//!
//! [`CompoundGraph`]: nestview_core::CompoundGraph

pub mod anchors;
pub mod collapse;
pub mod context;
pub mod induce;
pub mod prune;
pub mod reduce;
pub mod traverse;

pub use anchors::select_anchors;
pub use collapse::collapse;
pub use context::build_context_graph;
pub use induce::induce;
pub use prune::{prune_single_child_roots, prune_single_child_roots_fixpoint};
pub use reduce::reduce;
pub use traverse::{Depth, Relation, Traversal, traverse};
