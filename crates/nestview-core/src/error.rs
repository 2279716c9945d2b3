use std::fmt;

/// Machine-readable error codes surfaced by the CLI and library callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    InputParseError,
    NodeNotFound,
    CycleDetected,
    HierarchyCycle,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1002",
            Self::InputParseError => "E1003",
            Self::NodeNotFound => "E2001",
            Self::CycleDetected => "E2003",
            Self::HierarchyCycle => "E2004",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::InputParseError => "Graph input parse error",
            Self::NodeNotFound => "Node not found",
            Self::CycleDetected => "Cycle in cross-edges",
            Self::HierarchyCycle => "Cycle in parent links",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in nestview.toml and retry."),
            Self::InputParseError => {
                Some("Input must be a graph document or, with --records, a record set.")
            }
            Self::NodeNotFound => None,
            Self::CycleDetected => {
                Some("Edge reduction needs acyclic edges; rerun with --no-reduce.")
            }
            Self::HierarchyCycle => Some("A node cannot be nested under its own descendant."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors raised by graph operations.
///
/// Dangling ids are never an error outside of navigation: traversal, induction
/// and collapse drop them silently.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// Topological sort found a cycle among cross-edges.
    #[error("cycle detected in edges at node '{node}'")]
    CycleDetected { node: String },

    /// A parent link would make a node its own ancestor.
    #[error("nesting '{child}' under '{parent}' would create a hierarchy cycle")]
    HierarchyCycle { child: String, parent: String },

    /// The requested node does not exist.
    #[error("node not found: '{0}'")]
    NodeNotFound(String),
}

impl GraphError {
    /// The [`ErrorCode`] reported for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::CycleDetected { .. } => ErrorCode::CycleDetected,
            Self::HierarchyCycle { .. } => ErrorCode::HierarchyCycle,
            Self::NodeNotFound(_) => ErrorCode::NodeNotFound,
        }
    }
}
