//! Whole-graph construction from domain records.
//!
//! A [`RecordSet`] is the on-disk form of a document: a map of records, each
//! naming its containing record (`parent`, also accepted as `chapter`) and the
//! records it builds on (`references`). [`build_graph`] turns it into a
//! [`CompoundGraph`]:
//!
//! - a `ROOT` sentinel node is added and every record without a parent is
//!   nested under it;
//! - a reference `r` on record `n` becomes the edge `r -> n`, so edges point
//!   from prerequisite to dependent;
//! - references or parents naming unknown records create placeholder nodes.

#![allow(clippy::module_name_repetitions)]

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::GraphError;
use crate::graph::{Attrs, CompoundGraph, ROOT_ID};

/// One domain record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Record id. May be omitted inside a [`RecordSet`], where the map key wins.
    #[serde(default)]
    pub id: String,
    /// Containing record, if any. Empty strings mean "top level".
    #[serde(default, alias = "chapter", skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Records this one depends on.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,
    /// Everything else, carried onto the node unchanged.
    #[serde(flatten)]
    pub attrs: Attrs,
}

impl Record {
    /// Parent id, treating an empty string as no parent.
    #[must_use]
    pub fn parent_id(&self) -> Option<&str> {
        self.parent.as_deref().filter(|p| !p.is_empty())
    }

    /// Distinct references in first-seen order, excluding self-references.
    #[must_use]
    pub fn distinct_references(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.references
            .iter()
            .map(String::as_str)
            .filter(|r| !r.is_empty() && *r != self.id && seen.insert(*r))
            .collect()
    }
}

/// A document: metadata plus its records keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordSet {
    #[serde(default)]
    pub nodes: BTreeMap<String, Record>,
    /// Document-level fields (title, author, ...), used as graph attributes.
    #[serde(flatten)]
    pub meta: Attrs,
}

impl RecordSet {
    /// Parse a record set from JSON, filling record ids from map keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid record set.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let mut set: Self = serde_json::from_str(text).context("parse record set")?;
        for (key, record) in &mut set.nodes {
            if record.id.is_empty() {
                record.id.clone_from(key);
            }
        }
        Ok(set)
    }

    /// Read and parse a record set file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Insert or replace a record under its own id.
    pub fn upsert(&mut self, record: Record) {
        self.nodes.insert(record.id.clone(), record);
    }
}

/// Build the compound graph for a record set.
///
/// Node attributes are the record's extra fields plus `id` and, when the
/// record has none, a `label` equal to the id.
///
/// # Errors
///
/// Returns [`GraphError::HierarchyCycle`] if parent links among the records
/// form a cycle.
#[instrument(skip(records), fields(records = records.nodes.len()))]
pub fn build_graph(records: &RecordSet) -> Result<CompoundGraph, GraphError> {
    let mut graph = CompoundGraph::with_attrs(records.meta.clone());
    graph.set_node(ROOT_ID, label_attrs(ROOT_ID));

    for (key, record) in &records.nodes {
        let id = if record.id.is_empty() { key } else { &record.id };
        let mut attrs = record.attrs.clone();
        attrs.insert("id".to_string(), Value::String(id.clone()));
        attrs
            .entry("label")
            .or_insert_with(|| Value::String(id.clone()));
        graph.set_node(id.as_str(), attrs);
    }

    for (key, record) in &records.nodes {
        let id = if record.id.is_empty() { key } else { &record.id };
        graph.set_parent(id, record.parent_id().unwrap_or(ROOT_ID))?;
        for reference in record.distinct_references() {
            graph.set_edge(reference, id, Attrs::new());
        }
    }

    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "built graph from records"
    );
    Ok(graph)
}

fn label_attrs(label: &str) -> Attrs {
    let mut attrs = Attrs::new();
    attrs.insert("label".to_string(), Value::String(label.to_string()));
    attrs
}
