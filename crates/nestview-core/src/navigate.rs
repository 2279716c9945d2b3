//! Sibling ordering and reading-order navigation over the hierarchy.
//!
//! Siblings are ordered by a caller-chosen attribute (typically a
//! section reference such as `"2.10"`) using natural comparison, so `2.9`
//! sorts before `2.10`. Moving past the last sibling continues at the
//! parent level; reaching the top returns the `ROOT` sentinel.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::GraphError;
use crate::graph::{CompoundGraph, ROOT_ID};

/// A node and its nested children, for tree rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub id: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

/// Compare two strings treating digit runs as numbers and letters
/// case-insensitively.
#[must_use]
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = Chunks::new(a);
    let mut right = Chunks::new(b);
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ord = compare_chunk(x, y);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

fn compare_chunk(x: &str, y: &str) -> Ordering {
    let x_digits = x.bytes().all(|c| c.is_ascii_digit());
    let y_digits = y.bytes().all(|c| c.is_ascii_digit());
    match (x_digits, y_digits) {
        (true, true) => {
            let xs = x.trim_start_matches('0');
            let ys = y.trim_start_matches('0');
            xs.len().cmp(&ys.len()).then_with(|| xs.cmp(ys))
        }
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => x.to_lowercase().cmp(&y.to_lowercase()),
    }
}

/// Splits a string into maximal digit and non-digit runs.
struct Chunks<'a> {
    rest: &'a str,
}

impl<'a> Chunks<'a> {
    const fn new(s: &'a str) -> Self {
        Self { rest: s }
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let first = self.rest.chars().next()?;
        let digit = first.is_ascii_digit();
        let end = self
            .rest
            .char_indices()
            .find(|(_, c)| c.is_ascii_digit() != digit)
            .map_or(self.rest.len(), |(i, _)| i);
        let (chunk, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(chunk)
    }
}

fn sort_value(graph: &CompoundGraph, id: &str, key: &str) -> String {
    match graph.node(id).and_then(|attrs| attrs.get(key)) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Siblings of `id` (including `id`) ordered by the `key` attribute.
///
/// Siblings are the children of `id`'s parent. A parentless node's siblings
/// are the other parentless nodes, excluding the `ROOT` sentinel.
///
/// # Errors
///
/// Returns [`GraphError::NodeNotFound`] if `id` is not in the graph.
pub fn sorted_siblings(
    graph: &CompoundGraph,
    id: &str,
    key: &str,
) -> Result<Vec<String>, GraphError> {
    if !graph.has_node(id) {
        return Err(GraphError::NodeNotFound(id.to_string()));
    }
    let ids: Vec<&str> = match graph.parent(id) {
        Some(parent) => graph.children(parent).collect(),
        None => graph.roots().filter(|r| *r != ROOT_ID).collect(),
    };
    Ok(sort_by_key(graph, ids, key))
}

fn sort_by_key(graph: &CompoundGraph, ids: Vec<&str>, key: &str) -> Vec<String> {
    let mut keyed: Vec<(String, &str)> = ids
        .into_iter()
        .map(|id| (sort_value(graph, id, key), id))
        .collect();
    keyed.sort_by(|(ka, ia), (kb, ib)| natural_cmp(ka, kb).then_with(|| ia.cmp(ib)));
    keyed.into_iter().map(|(_, id)| id.to_string()).collect()
}

#[derive(Clone, Copy)]
enum Step {
    Next,
    Prev,
}

fn step(graph: &CompoundGraph, id: &str, key: &str, dir: Step) -> Result<String, GraphError> {
    if id == ROOT_ID {
        return Ok(ROOT_ID.to_string());
    }
    if !graph.has_node(id) {
        return Err(GraphError::NodeNotFound(id.to_string()));
    }

    let mut current = id.to_string();
    loop {
        if current == ROOT_ID {
            return Ok(current);
        }
        let siblings = sorted_siblings(graph, &current, key)?;
        let pos = siblings.iter().position(|s| *s == current);
        let target = match (dir, pos) {
            (Step::Next, Some(p)) => siblings.get(p + 1),
            (Step::Prev, Some(p)) => p.checked_sub(1).and_then(|q| siblings.get(q)),
            (_, None) => None,
        };
        if let Some(found) = target {
            return Ok(found.clone());
        }
        current = graph.parent(&current).unwrap_or(ROOT_ID).to_string();
        if !graph.has_node(&current) {
            return Ok(ROOT_ID.to_string());
        }
    }
}

/// The sibling after `id`, or the parent's next sibling when `id` is last.
///
/// # Errors
///
/// Returns [`GraphError::NodeNotFound`] if `id` is not in the graph.
pub fn next_node(graph: &CompoundGraph, id: &str, key: &str) -> Result<String, GraphError> {
    step(graph, id, key, Step::Next)
}

/// The sibling before `id`, or the parent's previous sibling when `id` is first.
///
/// # Errors
///
/// Returns [`GraphError::NodeNotFound`] if `id` is not in the graph.
pub fn prev_node(graph: &CompoundGraph, id: &str, key: &str) -> Result<String, GraphError> {
    step(graph, id, key, Step::Prev)
}

/// All descendants of `id` in preorder (children in id order).
#[must_use]
pub fn descendants(graph: &CompoundGraph, id: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut stack: Vec<&str> = graph.children(id).collect();
    stack.reverse();
    while let Some(node) = stack.pop() {
        out.push(node.to_string());
        let mut kids: Vec<&str> = graph.children(node).collect();
        kids.reverse();
        stack.extend(kids);
    }
    out
}

/// Nested child tree below `id`.
#[must_use]
pub fn subtree(graph: &CompoundGraph, id: &str) -> Vec<TreeNode> {
    build_forest(graph, graph.children(id).collect())
}

/// Nested tree of the whole graph, one entry per root.
#[must_use]
pub fn forest(graph: &CompoundGraph) -> Vec<TreeNode> {
    build_forest(graph, graph.roots().collect())
}

fn build_forest(graph: &CompoundGraph, tops: Vec<&str>) -> Vec<TreeNode> {
    // Post-order: a node is assembled once all of its children are.
    let mut built: HashMap<&str, TreeNode> = HashMap::new();
    let mut stack: Vec<(&str, bool)> = tops.iter().map(|t| (*t, false)).collect();
    while let Some((node, expanded)) = stack.pop() {
        if expanded {
            let children = graph
                .children(node)
                .filter_map(|c| built.remove(c))
                .collect();
            built.insert(
                node,
                TreeNode {
                    id: node.to_string(),
                    children,
                },
            );
        } else {
            stack.push((node, true));
            stack.extend(graph.children(node).map(|c| (c, false)));
        }
    }
    tops.into_iter().filter_map(|t| built.remove(t)).collect()
}
