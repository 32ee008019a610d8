//! Knowledge-base loading service
//!
//! Reads the knowledge-base document through the filesystem boundary and
//! hands it to the domain builder for validation.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{KnowledgeBase, KnowledgeBaseBuilder};
use crate::infrastructure::traits::FileSystem;

/// Service for loading and validating knowledge-base files.
pub struct KnowledgeService {
    fs: Arc<dyn FileSystem>,
    builder: KnowledgeBaseBuilder,
}

impl KnowledgeService {
    /// Create a new knowledge service reading trees from the `domain` section.
    pub fn new(fs: Arc<dyn FileSystem>, domain: &str) -> Self {
        Self {
            fs,
            builder: KnowledgeBaseBuilder::new(domain),
        }
    }

    /// Load a knowledge base from a file. All-or-nothing.
    #[instrument(skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<KnowledgeBase> {
        if !self.fs.is_file(path) {
            return Err(ApplicationError::OperationFailed {
                context: format!("knowledge base not found: {}", path.display()),
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "file does not exist",
                )),
            });
        }

        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read knowledge base", path)?;
        let kb = self.builder.load(&content)?;
        debug!(
            "loaded {} trees from {} (domain '{}')",
            kb.registry.len(),
            path.display(),
            self.builder.domain()
        );
        Ok(kb)
    }
}
