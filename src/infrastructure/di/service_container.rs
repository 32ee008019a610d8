//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::application::services::{KnowledgeService, TroubleshootService};
use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Directory relative knowledge-base paths resolve against
    pub project_dir: PathBuf,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings, project_dir: &Path) -> Self {
        Self::with_deps(settings, project_dir, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, project_dir: &Path, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            settings: Arc::new(settings),
            fs,
            project_dir: project_dir.to_path_buf(),
        }
    }

    /// Effective knowledge-base path.
    pub fn knowledge_base_path(&self) -> PathBuf {
        self.settings.knowledge_base_path(&self.project_dir)
    }

    pub fn knowledge_service(&self) -> KnowledgeService {
        KnowledgeService::new(Arc::clone(&self.fs), &self.settings.domain)
    }

    /// Load the knowledge base once and wire the troubleshooting service on top.
    pub fn troubleshoot_service(&self) -> ApplicationResult<TroubleshootService> {
        let kb = self.knowledge_service().load(&self.knowledge_base_path())?;
        Ok(TroubleshootService::new(
            Arc::new(kb),
            self.settings.topics.clone(),
        ))
    }
}
