//! Traversal cursor over one tree of a registry

use crate::domain::entities::{Node, Tree};
use crate::domain::error::DomainError;

/// What the caller should present at the current node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt<'a> {
    Question {
        question: &'a str,
        options: &'a [String],
    },
    Diagnosis {
        diagnosis: &'a str,
    },
}

impl Prompt<'_> {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Prompt::Diagnosis { .. })
    }
}

/// Caller-owned cursor: which tree, which node.
///
/// Borrows everything from the registry; it never copies node content.
#[derive(Debug, Clone, Copy)]
pub struct Session<'a> {
    tree_name: &'a str,
    tree: &'a Tree,
    node_id: &'a str,
    node: &'a Node,
}

impl<'a> Session<'a> {
    pub(crate) fn at(tree_name: &'a str, tree: &'a Tree, node_id: &str) -> Result<Self, DomainError> {
        let (node_id, node) = tree.entry(node_id).ok_or_else(|| DomainError::UnknownNode {
            tree: tree_name.to_string(),
            node: node_id.to_string(),
        })?;
        Ok(Self {
            tree_name,
            tree,
            node_id,
            node,
        })
    }

    pub fn tree_name(&self) -> &'a str {
        self.tree_name
    }

    pub fn node_id(&self) -> &'a str {
        self.node_id
    }

    /// `(tree name, node id)`, enough to `resume` later.
    pub fn position(&self) -> (&'a str, &'a str) {
        (self.tree_name, self.node_id)
    }

    /// Once terminal, every further `answer` fails.
    pub fn is_terminal(&self) -> bool {
        self.node.is_terminal()
    }

    pub fn current_prompt(&self) -> Prompt<'a> {
        match self.node {
            Node::Question(q) => Prompt::Question {
                question: &q.question,
                options: &q.options,
            },
            Node::Diagnosis(diagnosis) => Prompt::Diagnosis { diagnosis },
        }
    }

    /// Follow `option` (exact match) and return the new prompt.
    ///
    /// On error the session stays where it was.
    pub fn answer(&mut self, option: &str) -> Result<Prompt<'a>, DomainError> {
        let invalid = || DomainError::InvalidOption {
            node: self.node_id.to_string(),
            option: option.to_string(),
        };
        let target = match self.node {
            Node::Question(q) => q.next(option).ok_or_else(invalid)?,
            Node::Diagnosis(_) => return Err(invalid()),
        };
        *self = Session::at(self.tree_name, self.tree, target)?;
        Ok(self.current_prompt())
    }
}
