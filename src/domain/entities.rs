//! Domain entities: decision trees, nodes and maintenance advisories

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::error::DomainError;
use crate::domain::session::Session;

/// A node of a decision tree, validated at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Non-terminal node presenting a question with enumerated options.
    Question(QuestionNode),
    /// Terminal node carrying the final advisory.
    Diagnosis(String),
}

impl Node {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Node::Diagnosis(_))
    }

    /// Outgoing edges in option order (empty for a diagnosis).
    pub fn edges(&self) -> Vec<(&str, &str)> {
        match self {
            Node::Question(q) => q
                .options
                .iter()
                .filter_map(|opt| q.next(opt).map(|target| (opt.as_str(), target)))
                .collect(),
            Node::Diagnosis(_) => Vec::new(),
        }
    }
}

/// Question with its ordered options and the node each option leads to.
///
/// Every option has exactly one entry in `answers` and vice versa.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionNode {
    pub question: String,
    pub options: Vec<String>,
    pub answers: BTreeMap<String, String>,
}

impl QuestionNode {
    /// Follow an option by exact string match.
    pub fn next(&self, option: &str) -> Option<&str> {
        self.answers.get(option).map(String::as_str)
    }
}

/// A named decision graph: one start node plus the node mapping.
///
/// Only constructed through [`crate::domain::KnowledgeBaseBuilder`], so the
/// start node and every answer target are known to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    start_node: String,
    nodes: BTreeMap<String, Node>,
}

impl Tree {
    pub(crate) fn new(start_node: String, nodes: BTreeMap<String, Node>) -> Self {
        Self { start_node, nodes }
    }

    pub fn start_node(&self) -> &str {
        &self.start_node
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Lookup returning the registry-owned id alongside the node.
    pub(crate) fn entry(&self, id: &str) -> Option<(&str, &Node)> {
        self.nodes
            .get_key_value(id)
            .map(|(key, node)| (key.as_str(), node))
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.nodes.iter().map(|(id, node)| (id.as_str(), node))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node ids reachable from the start node (cycle-safe).
    pub fn reachable_nodes(&self) -> BTreeSet<&str> {
        let mut seen = BTreeSet::new();
        let mut stack = vec![self.start_node.as_str()];

        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            if let Some(node) = self.nodes.get(id) {
                for (_, target) in node.edges() {
                    stack.push(target);
                }
            }
        }
        seen
    }

    /// Node ids that no sequence of answers can reach.
    pub fn unreachable_nodes(&self) -> Vec<&str> {
        let reachable = self.reachable_nodes();
        self.nodes
            .keys()
            .map(String::as_str)
            .filter(|id| !reachable.contains(id))
            .collect()
    }
}

/// All decision trees of a knowledge base, keyed by tree name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeRegistry {
    trees: BTreeMap<String, Tree>,
}

impl TreeRegistry {
    pub(crate) fn new(trees: BTreeMap<String, Tree>) -> Self {
        Self { trees }
    }

    /// Tree names in lexicographic order.
    pub fn list_trees(&self) -> Vec<&str> {
        self.trees.keys().map(String::as_str).collect()
    }

    pub fn tree(&self, name: &str) -> Result<&Tree, DomainError> {
        self.trees
            .get(name)
            .ok_or_else(|| DomainError::UnknownTree(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Tree)> {
        self.trees.iter().map(|(name, tree)| (name.as_str(), tree))
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Begin a traversal at the tree's start node.
    pub fn start(&self, name: &str) -> Result<Session<'_>, DomainError> {
        let (tree_name, tree) = self.entry(name)?;
        Session::at(tree_name, tree, tree.start_node())
    }

    /// Reopen a traversal at a previously reported node.
    ///
    /// Callers that keep no state between steps persist `Session::position()`
    /// and come back through here.
    pub fn resume(&self, name: &str, node_id: &str) -> Result<Session<'_>, DomainError> {
        let (tree_name, tree) = self.entry(name)?;
        Session::at(tree_name, tree, node_id)
    }

    fn entry(&self, name: &str) -> Result<(&str, &Tree), DomainError> {
        self.trees
            .get_key_value(name)
            .map(|(key, tree)| (key.as_str(), tree))
            .ok_or_else(|| DomainError::UnknownTree(name.to_string()))
    }
}

/// Flat topic key to advisory text lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaintenanceInfo {
    entries: BTreeMap<String, String>,
}

impl MaintenanceInfo {
    pub(crate) fn new(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }

    pub fn lookup(&self, key: &str) -> Result<&str, DomainError> {
        self.entries
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| DomainError::NotFound(key.to_string()))
    }

    /// Sorted topic keys.
    pub fn keys(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Loaded, validated knowledge base. Immutable for its whole lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnowledgeBase {
    pub registry: TreeRegistry,
    pub maintenance: MaintenanceInfo,
}
