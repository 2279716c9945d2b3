//! `nv context`: focused view around a set of nodes.

use std::collections::BTreeSet;

use clap::Args;
use nestview_context::build_context_graph;
use nestview_core::ContextOptions;
use tracing::info;

use crate::input::InputArgs;
use crate::output::{OutputMode, render_graph};

/// Arguments for `nv context`.
#[derive(Args, Debug)]
pub struct ContextArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Node ids to focus on.
    #[arg(required = true, value_name = "ID")]
    pub ids: Vec<String>,

    /// Predecessor hops to include.
    #[arg(long = "pred", value_name = "N")]
    pub predecessor_radius: Option<usize>,

    /// Successor hops to include.
    #[arg(long = "succ", value_name = "N")]
    pub successor_radius: Option<usize>,

    /// Hierarchy levels kept expanded below each context node.
    #[arg(long, value_name = "N")]
    pub context_level: Option<usize>,

    /// Extra levels at which branches outside the context collapse.
    #[arg(long, value_name = "N")]
    pub outside_level: Option<usize>,

    /// Keep edges implied by other paths.
    #[arg(long)]
    pub no_reduce: bool,

    /// Drop parent links from the view.
    #[arg(long)]
    pub no_parents: bool,

    /// Keep top-level wrappers with a single child.
    #[arg(long)]
    pub no_prune: bool,

    /// Prune single-child wrappers repeatedly until none remain.
    #[arg(long, conflicts_with = "no_prune")]
    pub prune_fixpoint: bool,
}

impl ContextArgs {
    /// Apply command-line overrides on top of the configured options.
    pub fn options(&self, base: ContextOptions) -> ContextOptions {
        let mut opts = base;
        if let Some(n) = self.predecessor_radius {
            opts.predecessor_radius = n;
        }
        if let Some(n) = self.successor_radius {
            opts.successor_radius = n;
        }
        if let Some(n) = self.context_level {
            opts.context_collapse_level = n;
        }
        if let Some(n) = self.outside_level {
            opts.outside_collapse_level = n;
        }
        if self.no_reduce {
            opts.reduce_edges = false;
        }
        if self.no_parents {
            opts.include_parents = false;
        }
        if self.no_prune {
            opts.prune_single_child_parents = false;
        }
        if self.prune_fixpoint {
            opts.prune_to_fixpoint = true;
        }
        opts
    }
}

/// Execute `nv context`.
pub fn run_context(
    args: &ContextArgs,
    base: ContextOptions,
    output: OutputMode,
) -> anyhow::Result<()> {
    let graph = args.input.load()?;
    let context: BTreeSet<String> = args.ids.iter().cloned().collect();
    let options = args.options(base);

    let missing: Vec<&str> = context
        .iter()
        .map(String::as_str)
        .filter(|id| !graph.has_node(id))
        .collect();
    if !missing.is_empty() {
        info!(?missing, "ignoring context ids not in the graph");
    }

    let view = build_context_graph(&graph, &context, &options)?;
    render_graph(output, &view)
}
