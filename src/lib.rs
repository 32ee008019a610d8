//! diagtree: validated decision-tree troubleshooting over a static knowledge base.
//!
//! Load once with [`domain::KnowledgeBaseBuilder`], then walk trees through
//! [`domain::Session`] or the [`application::services::TroubleshootService`].

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
