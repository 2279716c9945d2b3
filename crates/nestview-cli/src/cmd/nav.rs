//! `nv nav`: reading-order navigation between siblings.

use clap::Args;
use nestview_core::navigate::{next_node, prev_node};
use serde::Serialize;

use crate::input::InputArgs;
use crate::output::{OutputMode, display_label, pretty_kv, render_mode};

/// Arguments for `nv nav`.
#[derive(Args, Debug)]
pub struct NavArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Node to move from.
    #[arg(value_name = "ID")]
    pub id: String,

    /// Move to the following node.
    #[arg(long, conflicts_with = "prev", required_unless_present = "prev")]
    pub next: bool,

    /// Move to the preceding node.
    #[arg(long)]
    pub prev: bool,

    /// Node attribute used to order siblings (defaults to the configured key).
    #[arg(long, value_name = "ATTR")]
    pub key: Option<String>,
}

/// Payload for `nv nav`.
#[derive(Debug, Serialize)]
pub struct NavResult {
    pub from: String,
    pub direction: &'static str,
    pub to: String,
}

/// Execute `nv nav`.
pub fn run_nav(args: &NavArgs, default_key: &str, output: OutputMode) -> anyhow::Result<()> {
    let graph = args.input.load()?;
    let key = args.key.as_deref().unwrap_or(default_key);

    let (direction, to) = if args.prev {
        ("prev", prev_node(&graph, &args.id, key)?)
    } else {
        ("next", next_node(&graph, &args.id, key)?)
    };
    let result = NavResult {
        from: args.id.clone(),
        direction,
        to,
    };

    render_mode(
        output,
        &result,
        |r, w| writeln!(w, "{}", r.to),
        |r, w| {
            pretty_kv(w, "from", display_label(&graph, &r.from))?;
            pretty_kv(w, r.direction, display_label(&graph, &r.to))
        },
    )
}
