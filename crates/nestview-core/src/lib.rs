#![forbid(unsafe_code)]
//! nestview-core library.
//!
//! The compound graph model ([`graph::CompoundGraph`]) and everything that
//! builds or walks it without computing a context view: record loading,
//! sibling navigation, the union-find used by collapse, configuration and
//! stage timing.
//!
//! # Conventions
//!
//! - **Errors**: graph operations return [`error::GraphError`]; file and
//!   config loading return `anyhow::Result`.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod config;
pub mod error;
pub mod graph;
pub mod navigate;
pub mod options;
pub mod records;
pub mod timing;
pub mod union_find;

pub use error::{ErrorCode, GraphError};
pub use graph::{Attrs, CompoundGraph, EdgeRef, GraphDocument, ROOT_ID};
pub use options::ContextOptions;
pub use union_find::DisjointSet;
