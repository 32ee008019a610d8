//! Domain layer: decision trees, traversal and topic routing
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod builder;
pub mod entities;
pub mod error;
pub mod render;
pub mod session;
pub mod topic;

pub use builder::{KnowledgeBaseBuilder, DEFAULT_DOMAIN, MAINTENANCE_SECTION};
pub use entities::*;
pub use error::DomainError;
pub use render::TreeRender;
pub use session::{Prompt, Session};
pub use topic::{default_topic_rules, route_topic, TopicRule};

/// Expand environment variables in a path string.
///
/// Supports `$VAR`, `${VAR}` and `~` for the home directory.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}
