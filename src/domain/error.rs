//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent knowledge-base violations and invalid traversal requests.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Structural corruption found while loading; fatal for startup.
    #[error("malformed knowledge base at {location}: {reason}")]
    MalformedTree { location: String, reason: String },

    #[error("unknown tree: {0}")]
    UnknownTree(String),

    #[error("unknown node '{node}' in tree '{tree}'")]
    UnknownNode { tree: String, node: String },

    #[error("invalid option '{option}' at node '{node}'")]
    InvalidOption { node: String, option: String },

    #[error("maintenance topic not found: {0}")]
    NotFound(String),

    #[error("no troubleshooting topic matches query: {0}")]
    NoMatchingTopic(String),
}

impl DomainError {
    /// Create a load-time structural error.
    pub fn malformed(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedTree {
            location: location.into(),
            reason: reason.into(),
        }
    }
}
