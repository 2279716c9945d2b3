//! `nv tree`: the hierarchy below a node, or the whole forest.

use std::io::{self, Write};

use clap::Args;
use nestview_core::navigate::{TreeNode, forest, subtree};
use nestview_core::{CompoundGraph, GraphError};
use serde::Serialize;

use crate::input::InputArgs;
use crate::output::{OutputMode, display_label, render_mode};

/// Arguments for `nv tree`.
#[derive(Args, Debug)]
pub struct TreeArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Show only the subtree below this node.
    #[arg(value_name = "ID")]
    pub id: Option<String>,
}

/// Payload for `nv tree`.
#[derive(Debug, Serialize)]
pub struct TreeView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
    pub nodes: Vec<TreeNode>,
}

/// Build the tree payload for `id`, or for every root when `id` is `None`.
///
/// # Errors
///
/// Returns [`GraphError::NodeNotFound`] if `id` is not in the graph.
pub fn tree_view(graph: &CompoundGraph, id: Option<&str>) -> Result<TreeView, GraphError> {
    match id {
        Some(id) if !graph.has_node(id) => Err(GraphError::NodeNotFound(id.to_string())),
        Some(id) => Ok(TreeView {
            root: Some(id.to_string()),
            nodes: subtree(graph, id),
        }),
        None => Ok(TreeView {
            root: None,
            nodes: forest(graph),
        }),
    }
}

/// Execute `nv tree`.
pub fn run_tree(args: &TreeArgs, output: OutputMode) -> anyhow::Result<()> {
    let graph = args.input.load()?;
    let view = tree_view(&graph, args.id.as_deref())?;

    render_mode(
        output,
        &view,
        |view, w| write_tree(view, w, |id| id.to_string()),
        |view, w| {
            if let Some(root) = &view.root {
                writeln!(w, "{}", display_label(&graph, root))?;
            }
            write_tree(view, w, |id| display_label(&graph, id))
        },
    )
}

/// Indented listing, two spaces per level (one extra under an explicit root).
fn write_tree(
    view: &TreeView,
    w: &mut dyn Write,
    label: impl Fn(&str) -> String,
) -> io::Result<()> {
    let base = usize::from(view.root.is_some());
    let mut stack: Vec<(&TreeNode, usize)> = view.nodes.iter().rev().map(|n| (n, base)).collect();
    while let Some((node, depth)) = stack.pop() {
        writeln!(w, "{:indent$}{}", "", label(&node.id), indent = depth * 2)?;
        stack.extend(node.children.iter().rev().map(|c| (c, depth + 1)));
    }
    Ok(())
}
