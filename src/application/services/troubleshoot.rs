//! Troubleshooting service
//!
//! Exposes traversal of a loaded knowledge base to front ends: stateless
//! steps (the caller carries tree name and node id between calls),
//! free-text topic routing, and an interactive walk driven by a `Prompter`.

use std::sync::Arc;

use serde::Serialize;
use termtree::Tree as TermTree;
use tracing::{debug, info, instrument};

use crate::application::{ApplicationResult, IoResultExt};
use crate::domain::{route_topic, DomainError, KnowledgeBase, Prompt, Session, TopicRule, TreeRender};
use crate::infrastructure::traits::Prompter;

/// Where a step left the traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    DiagnosticStart,
    DiagnosticContinue,
    DiagnosticEnd,
}

/// Serializable record of one traversal step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub status: StepStatus,
    pub topic: String,
    pub node_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,
}

impl StepReport {
    fn from_session(session: &Session<'_>, fresh: bool) -> Self {
        let (topic, node_id) = session.position();
        let mut report = Self {
            status: StepStatus::DiagnosticEnd,
            topic: topic.to_string(),
            node_id: node_id.to_string(),
            question: None,
            options: Vec::new(),
            diagnosis: None,
        };
        match session.current_prompt() {
            Prompt::Question { question, options } => {
                report.status = if fresh {
                    StepStatus::DiagnosticStart
                } else {
                    StepStatus::DiagnosticContinue
                };
                report.question = Some(question.to_string());
                report.options = options.to_vec();
            }
            Prompt::Diagnosis { diagnosis } => {
                report.diagnosis = Some(diagnosis.to_string());
            }
        }
        report
    }
}

/// Result of an interactive walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkOutcome {
    /// Reached a diagnosis; `path` lists visited node ids in order.
    Diagnosed { path: Vec<String>, diagnosis: String },
    /// Input ended before a diagnosis was reached.
    Cancelled { path: Vec<String> },
}

/// Service for walking troubleshooting trees of one knowledge base.
pub struct TroubleshootService {
    kb: Arc<KnowledgeBase>,
    topics: Vec<TopicRule>,
}

impl TroubleshootService {
    pub fn new(kb: Arc<KnowledgeBase>, topics: Vec<TopicRule>) -> Self {
        Self { kb, topics }
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.kb
    }

    pub fn list_trees(&self) -> Vec<&str> {
        self.kb.registry.list_trees()
    }

    /// Report the start prompt of a tree.
    #[instrument(skip(self))]
    pub fn start(&self, tree: &str) -> ApplicationResult<StepReport> {
        let session = self.kb.registry.start(tree)?;
        Ok(StepReport::from_session(&session, true))
    }

    /// Route a free-text query to a tree and report its start prompt.
    #[instrument(skip(self))]
    pub fn ask(&self, query: &str) -> ApplicationResult<StepReport> {
        let tree = route_topic(&self.topics, query)?;
        debug!("ask: routed to '{}'", tree);
        self.start(tree)
    }

    /// Resume at `node_id`, follow `answer`, report where it leads.
    #[instrument(skip(self))]
    pub fn step(&self, tree: &str, node_id: &str, answer: &str) -> ApplicationResult<StepReport> {
        let mut session = self.kb.registry.resume(tree, node_id)?;
        session.answer(answer)?;
        Ok(StepReport::from_session(&session, false))
    }

    pub fn maintenance(&self, key: &str) -> ApplicationResult<&str> {
        Ok(self.kb.maintenance.lookup(key)?)
    }

    pub fn maintenance_keys(&self) -> Vec<&str> {
        self.kb.maintenance.keys()
    }

    pub fn render(&self, tree: &str) -> ApplicationResult<TermTree<String>> {
        Ok(self.kb.registry.tree(tree)?.to_tree_string(tree))
    }

    /// Walk a tree interactively until a diagnosis or end of input.
    ///
    /// Invalid choices are reported through the prompter and asked again.
    #[instrument(skip(self, prompter))]
    pub fn walk(&self, tree: &str, prompter: &mut dyn Prompter) -> ApplicationResult<WalkOutcome> {
        let mut session = self.kb.registry.start(tree)?;
        let mut path = vec![session.node_id().to_string()];

        loop {
            let (question, options) = match session.current_prompt() {
                Prompt::Diagnosis { diagnosis } => {
                    info!("walk: '{}' diagnosed at '{}'", tree, session.node_id());
                    return Ok(WalkOutcome::Diagnosed {
                        path,
                        diagnosis: diagnosis.to_string(),
                    });
                }
                Prompt::Question { question, options } => (question, options),
            };

            let Some(choice) = prompter.choose(question, options).with_context("read answer")? else {
                debug!("walk: input closed at '{}'", session.node_id());
                return Ok(WalkOutcome::Cancelled { path });
            };

            match session.answer(&choice) {
                Ok(_) => path.push(session.node_id().to_string()),
                Err(e @ DomainError::InvalidOption { .. }) => {
                    prompter.notify(&e.to_string()).with_context("write prompt")?
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
