//! Reading the graph a command operates on.

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use nestview_core::records::{RecordSet, build_graph};
use nestview_core::{CompoundGraph, ErrorCode};
use tracing::debug;

use crate::output::WithCode;

/// Input file shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Graph document to read (`-` for stdin).
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Read FILE as a record set and build the graph from it.
    #[arg(long)]
    pub records: bool,
}

impl InputArgs {
    /// Load and parse the input into a graph.
    ///
    /// # Errors
    ///
    /// Unreadable or malformed input is reported as
    /// [`ErrorCode::InputParseError`]; a parent cycle among records keeps its
    /// [`nestview_core::GraphError`].
    pub fn load(&self) -> anyhow::Result<CompoundGraph> {
        let text = self.read_text().with_code(ErrorCode::InputParseError)?;
        let name = self.file.display();

        let graph = if self.records {
            let records = RecordSet::from_json_str(&text)
                .with_context(|| format!("Failed to parse {name}"))
                .with_code(ErrorCode::InputParseError)?;
            build_graph(&records).with_context(|| format!("Failed to build graph from {name}"))?
        } else {
            serde_json::from_str::<CompoundGraph>(&text)
                .with_context(|| format!("Failed to parse {name}"))
                .with_code(ErrorCode::InputParseError)?
        };

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            records = self.records,
            "loaded input graph"
        );
        Ok(graph)
    }

    fn read_text(&self) -> anyhow::Result<String> {
        if self.file.as_os_str() == "-" {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            return Ok(text);
        }
        std::fs::read_to_string(&self.file)
            .with_context(|| format!("Failed to read {}", self.file.display()))
    }
}
