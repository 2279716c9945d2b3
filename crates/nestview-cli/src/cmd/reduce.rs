//! `nv reduce`: transitive reduction of a whole graph.

use clap::Args;
use nestview_context::reduce;
use tracing::info;

use crate::input::InputArgs;
use crate::output::{OutputMode, render_graph};

/// Arguments for `nv reduce`.
#[derive(Args, Debug)]
pub struct ReduceArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

/// Execute `nv reduce`.
pub fn run_reduce(args: &ReduceArgs, output: OutputMode) -> anyhow::Result<()> {
    let graph = args.input.load()?;
    let reduced = reduce(&graph)?;
    info!(
        before = graph.edge_count(),
        after = reduced.edge_count(),
        "reduced edges"
    );
    render_graph(output, &reduced)
}
