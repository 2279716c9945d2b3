//! Shared output layer for pretty/text/JSON parity across all CLI commands.
//!
//! Every command handler receives an [`OutputMode`] and formats its output
//! accordingly: pretty output for humans, compact line-oriented text for
//! scripts, or stable JSON.
//!
//! # Output mode resolution
//!
//! Precedence (highest wins):
//! 1. `--format` / hidden `--json` flag
//! 2. `FORMAT` env var → `"pretty"` | `"text"` | `"json"`
//! 3. `output` in the user config
//! 4. Default: [`OutputMode::Pretty`] if stdout is a TTY; [`OutputMode::Text`] if piped.

use std::fmt;
use std::io::{self, IsTerminal, Write};

use clap::ValueEnum;
use nestview_core::{CompoundGraph, ErrorCode, GraphDocument, GraphError};
use serde::Serialize;

/// Shared width for human pretty separators.
pub const PRETTY_RULE_WIDTH: usize = 72;

/// Write a horizontal separator used by pretty human output.
pub fn pretty_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = PRETTY_RULE_WIDTH)
}

/// Write a section heading followed by a separator.
pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    pretty_rule(w)
}

/// Render a left-aligned key/value line in human output.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<12} {}", format!("{key}:"), value.as_ref())
}

/// The three output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Human-optimized output (trees, sections, labels).
    Pretty,
    /// One record per line, for scripts and pipes.
    Text,
    /// Machine-readable JSON.
    Json,
}

impl OutputMode {
    /// Parse a resolved mode name as produced by the config layer.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::from_str(name, true).ok()
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Pretty => "pretty",
            Self::Text => "text",
            Self::Json => "json",
        }
    }
}

/// The mode requested on the command line, if any, as a config-layer name.
///
/// `--format` wins over the hidden `--json` alias.
pub fn flag_output_name(format_flag: Option<OutputMode>, json_flag: bool) -> Option<&'static str> {
    format_flag
        .or(json_flag.then_some(OutputMode::Json))
        .map(OutputMode::name)
}

/// Core resolution logic, separated from I/O for testability.
fn resolve_output_mode_inner(
    format_flag: Option<OutputMode>,
    json_flag: bool,
    format_env: Option<&str>,
    is_tty: bool,
) -> OutputMode {
    if let Some(name) = flag_output_name(format_flag, json_flag) {
        return OutputMode::from_name(name).unwrap_or(OutputMode::Text);
    }

    if let Some(mode) = format_env.and_then(OutputMode::from_name) {
        return mode;
    }

    if is_tty {
        OutputMode::Pretty
    } else {
        OutputMode::Text
    }
}

/// Resolve the output mode from CLI flags, environment and TTY defaults,
/// without reading any config file.
///
/// Used for reporting errors that happen before the config is loaded.
pub fn resolve_output_mode(format_flag: Option<OutputMode>, json_flag: bool) -> OutputMode {
    let env_val = std::env::var("FORMAT").ok();
    let is_tty = io::stdout().is_terminal();
    resolve_output_mode_inner(format_flag, json_flag, env_val.as_deref(), is_tty)
}

/// Render a serializable value with explicit pretty/text renderers.
pub fn render_mode<T: Serialize>(
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Text => text_fn(value, &mut out)?,
        OutputMode::Pretty => pretty_fn(value, &mut out)?,
    }
    Ok(())
}

/// Render a whole graph: a [`GraphDocument`] in JSON, a node/edge listing
/// in text, and an indented hierarchy in pretty mode.
pub fn render_graph(mode: OutputMode, graph: &CompoundGraph) -> anyhow::Result<()> {
    let doc = GraphDocument::from(graph);
    render_mode(
        mode,
        &doc,
        |doc, w| {
            for node in &doc.nodes {
                match &node.parent {
                    Some(parent) => writeln!(w, "node {} parent={parent}", node.id)?,
                    None => writeln!(w, "node {}", node.id)?,
                }
            }
            for edge in &doc.edges {
                writeln!(w, "edge {} -> {}", edge.source, edge.target)?;
            }
            Ok(())
        },
        |_, w| render_graph_pretty(graph, w),
    )
}

fn render_graph_pretty(graph: &CompoundGraph, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, &format!("Nodes ({})", graph.node_count()))?;
    let mut stack: Vec<(&str, usize)> = graph.roots().map(|id| (id, 0)).collect();
    stack.reverse();
    while let Some((id, depth)) = stack.pop() {
        writeln!(w, "{:indent$}{}", "", display_label(graph, id), indent = depth * 2)?;
        let kids: Vec<&str> = graph.children(id).collect();
        stack.extend(kids.into_iter().rev().map(|kid| (kid, depth + 1)));
    }

    writeln!(w)?;
    pretty_section(w, &format!("Edges ({})", graph.edge_count()))?;
    for edge in graph.edges() {
        writeln!(w, "{} → {}", edge.source, edge.target)?;
    }
    Ok(())
}

/// `id` followed by its `label` attribute when that differs from the id.
pub fn display_label(graph: &CompoundGraph, id: &str) -> String {
    match graph
        .node(id)
        .and_then(|attrs| attrs.get("label"))
        .and_then(serde_json::Value::as_str)
    {
        Some(label) if label != id => format!("{id}  {label}"),
        _ => id.to_string(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

/// Context marker attaching an [`ErrorCode`] to an `anyhow` error.
#[derive(Debug, Clone, Copy)]
pub struct Coded(pub ErrorCode);

impl fmt::Display for Coded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.message())
    }
}

/// Attach an [`ErrorCode`] to any error on its way into `anyhow`.
pub trait WithCode<T> {
    fn with_code(self, code: ErrorCode) -> anyhow::Result<T>;
}

impl<T, E> WithCode<T> for Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn with_code(self, code: ErrorCode) -> anyhow::Result<T> {
        self.map_err(|err| err.into().context(Coded(code)))
    }
}

/// A structured error with code and optional hint.
#[derive(Debug, Serialize)]
pub struct CliError {
    /// Stable `E####` code.
    pub code: &'static str,
    /// Human-readable error message.
    pub message: String,
    /// Optional suggestion for how to fix the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<&'static str>,
}

impl From<&anyhow::Error> for CliError {
    fn from(err: &anyhow::Error) -> Self {
        let code = err
            .chain()
            .find_map(|cause| cause.downcast_ref::<GraphError>())
            .map(GraphError::code)
            .or_else(|| err.downcast_ref::<Coded>().map(|c| c.0))
            .unwrap_or(ErrorCode::InternalUnexpected);
        Self {
            code: code.code(),
            message: format!("{err:#}"),
            hint: code.hint(),
        }
    }
}

/// Render an error to stderr in the requested format.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({ "error": error });
            serde_json::to_writer_pretty(&mut out, &wrapper)?;
            writeln!(out)?;
        }
        OutputMode::Pretty | OutputMode::Text => {
            writeln!(out, "error[{}]: {}", error.code, error.message)?;
            if let Some(hint) = error.hint {
                writeln!(out, "  hint: {hint}")?;
            }
        }
    }
    Ok(())
}
