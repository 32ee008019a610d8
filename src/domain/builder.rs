//! Knowledge-base builder: parses raw JSON and validates every tree eagerly.

use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::domain::entities::{KnowledgeBase, MaintenanceInfo, Node, QuestionNode, Tree, TreeRegistry};
use crate::domain::error::DomainError;

/// Default top-level section holding the trees.
pub const DEFAULT_DOMAIN: &str = "troubleshooting";

/// Top-level section holding the flat advisories.
pub const MAINTENANCE_SECTION: &str = "maintenance_info";

/// Result type for knowledge-base construction.
pub type BuildResult<T> = Result<T, DomainError>;

/// Raw tree as found in the document; fields are optional to report what is missing.
#[derive(Debug, Deserialize)]
struct RawTree {
    start_node: Option<String>,
    nodes: Option<BTreeMap<String, RawNode>>,
}

/// Raw node: the shape decides which variant it is. A JSON `null` field counts as absent.
#[derive(Debug, Deserialize)]
struct RawNode {
    question: Option<String>,
    options: Option<Vec<String>>,
    answers: Option<BTreeMap<String, String>>,
    diagnosis: Option<String>,
}

/// Turns a knowledge-base document into a validated [`KnowledgeBase`].
///
/// Loading is all-or-nothing: the first structural problem aborts and no
/// partial registry is returned.
#[derive(Debug, Clone)]
pub struct KnowledgeBaseBuilder {
    domain: String,
}

impl Default for KnowledgeBaseBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_DOMAIN)
    }
}

impl KnowledgeBaseBuilder {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Parse and validate a JSON document.
    pub fn load(&self, source: &str) -> BuildResult<KnowledgeBase> {
        let value: Value = serde_json::from_str(source)
            .map_err(|e| DomainError::malformed("<document>", format!("invalid JSON: {e}")))?;
        self.load_value(value)
    }

    /// Validate an already parsed document.
    pub fn load_value(&self, value: Value) -> BuildResult<KnowledgeBase> {
        let Value::Object(mut document) = value else {
            return Err(DomainError::malformed(
                "<document>",
                "top level must be an object",
            ));
        };

        let section = match document.remove(&self.domain) {
            Some(Value::Object(section)) => section,
            Some(_) => {
                return Err(DomainError::malformed(
                    &self.domain,
                    "tree section must be an object",
                ))
            }
            None => {
                return Err(DomainError::malformed(
                    &self.domain,
                    "missing tree section",
                ))
            }
        };

        let registry = self.build_registry(section)?;
        let maintenance = build_maintenance(document.remove(MAINTENANCE_SECTION))?;
        debug!(
            "load: {} trees, {} maintenance topics",
            registry.len(),
            maintenance.len()
        );

        Ok(KnowledgeBase {
            registry,
            maintenance,
        })
    }

    fn build_registry(&self, section: Map<String, Value>) -> BuildResult<TreeRegistry> {
        let mut trees = BTreeMap::new();
        for (name, raw) in section {
            let raw: RawTree = serde_json::from_value(raw)
                .map_err(|e| DomainError::malformed(&name, e.to_string()))?;
            let tree = build_tree(&name, raw)?;
            for id in tree.unreachable_nodes() {
                warn!("tree '{}': node '{}' is unreachable from the start node", name, id);
            }
            trees.insert(name, tree);
        }
        Ok(TreeRegistry::new(trees))
    }
}

fn build_tree(name: &str, raw: RawTree) -> BuildResult<Tree> {
    let start_node = raw
        .start_node
        .ok_or_else(|| DomainError::malformed(name, "missing 'start_node'"))?;
    let raw_nodes = raw
        .nodes
        .ok_or_else(|| DomainError::malformed(name, "missing 'nodes'"))?;

    let mut nodes = BTreeMap::new();
    for (id, raw_node) in raw_nodes {
        let node = build_node(&format!("{name}/{id}"), raw_node)?;
        nodes.insert(id, node);
    }

    if !nodes.contains_key(&start_node) {
        return Err(DomainError::malformed(
            name,
            format!("start_node '{start_node}' does not exist"),
        ));
    }
    for (id, node) in &nodes {
        for (option, target) in node.edges() {
            if !nodes.contains_key(target) {
                return Err(DomainError::malformed(
                    format!("{name}/{id}"),
                    format!("answer '{option}' points to missing node '{target}'"),
                ));
            }
        }
    }

    Ok(Tree::new(start_node, nodes))
}

fn build_node(location: &str, raw: RawNode) -> BuildResult<Node> {
    let has_question_part = raw.question.is_some() || raw.options.is_some() || raw.answers.is_some();

    match (raw.diagnosis, has_question_part) {
        (Some(_), true) => Err(DomainError::malformed(
            location,
            "node has both a diagnosis and question fields",
        )),
        (None, false) => Err(DomainError::malformed(
            location,
            "node has neither a diagnosis nor a question",
        )),
        (Some(diagnosis), false) => Ok(Node::Diagnosis(diagnosis)),
        (None, true) => {
            let missing = |field: &str| DomainError::malformed(location, format!("question node is missing '{field}'"));
            let question = raw.question.ok_or_else(|| missing("question"))?;
            let options = raw.options.ok_or_else(|| missing("options"))?;
            let answers = raw.answers.ok_or_else(|| missing("answers"))?;
            check_options(location, &options, &answers)?;
            Ok(Node::Question(QuestionNode {
                question,
                options,
                answers,
            }))
        }
    }
}

/// Options and answer keys must correspond one to one; a gap would dead-end traversal.
fn check_options(
    location: &str,
    options: &[String],
    answers: &BTreeMap<String, String>,
) -> BuildResult<()> {
    if options.is_empty() {
        return Err(DomainError::malformed(location, "question node has no options"));
    }

    let mut seen = HashSet::new();
    for option in options {
        if !seen.insert(option.as_str()) {
            return Err(DomainError::malformed(
                location,
                format!("duplicate option '{option}'"),
            ));
        }
        if !answers.contains_key(option) {
            return Err(DomainError::malformed(
                location,
                format!("option '{option}' has no answer"),
            ));
        }
    }
    if let Some(extra) = answers.keys().find(|key| !seen.contains(key.as_str())) {
        return Err(DomainError::malformed(
            location,
            format!("answer '{extra}' is not a listed option"),
        ));
    }
    Ok(())
}

fn build_maintenance(section: Option<Value>) -> BuildResult<MaintenanceInfo> {
    let Some(section) = section else {
        return Ok(MaintenanceInfo::default());
    };
    let entries: BTreeMap<String, String> = serde_json::from_value(section)
        .map_err(|e| DomainError::malformed(MAINTENANCE_SECTION, e.to_string()))?;
    Ok(MaintenanceInfo::new(entries))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_doc(nodes: &str) -> String {
        format!(r#"{{"troubleshooting": {{"t": {{"start_node": "q", "nodes": {nodes}}}}}}}"#)
    }

    fn assert_malformed(source: &str, needle: &str) {
        match KnowledgeBaseBuilder::default().load(source) {
            Err(DomainError::MalformedTree { reason, .. }) => {
                assert!(reason.contains(needle), "reason '{}' lacks '{}'", reason, needle)
            }
            other => panic!("expected MalformedTree, got {:?}", other),
        }
    }

    #[test]
    fn given_valid_tree_when_loading_then_builds_question_and_diagnosis() {
        let source = tree_doc(
            r#"{"q": {"question": "Q?", "options": ["Yes"], "answers": {"Yes": "d"}}, "d": {"diagnosis": "D"}}"#,
        );

        let kb = KnowledgeBaseBuilder::default().load(&source).unwrap();
        let tree = kb.registry.tree("t").unwrap();

        assert_eq!(tree.start_node(), "q");
        assert_eq!(tree.len(), 2);
        assert!(matches!(tree.node("q"), Some(Node::Question(_))));
        assert_eq!(tree.node("d"), Some(&Node::Diagnosis("D".into())));
        assert!(kb.maintenance.is_empty());
    }

    #[test]
    fn given_missing_start_node_when_loading_then_malformed() {
        assert_malformed(
            r#"{"troubleshooting": {"t": {"nodes": {"d": {"diagnosis": "D"}}}}}"#,
            "start_node",
        );
    }

    #[test]
    fn given_dangling_start_node_when_loading_then_malformed() {
        assert_malformed(&tree_doc(r#"{"d": {"diagnosis": "D"}}"#), "does not exist");
    }

    #[test]
    fn given_dangling_answer_when_loading_then_malformed() {
        assert_malformed(
            &tree_doc(r#"{"q": {"question": "Q?", "options": ["Yes"], "answers": {"Yes": "gone"}}}"#),
            "missing node 'gone'",
        );
    }

    #[test]
    fn given_option_without_answer_when_loading_then_malformed() {
        assert_malformed(
            &tree_doc(
                r#"{"q": {"question": "Q?", "options": ["Yes", "No"], "answers": {"Yes": "d"}}, "d": {"diagnosis": "D"}}"#,
            ),
            "option 'No' has no answer",
        );
    }

    #[test]
    fn given_answer_without_option_when_loading_then_malformed() {
        assert_malformed(
            &tree_doc(
                r#"{"q": {"question": "Q?", "options": ["Yes"], "answers": {"Yes": "d", "No": "d"}}, "d": {"diagnosis": "D"}}"#,
            ),
            "answer 'No' is not a listed option",
        );
    }

    #[test]
    fn given_duplicate_option_when_loading_then_malformed() {
        assert_malformed(
            &tree_doc(
                r#"{"q": {"question": "Q?", "options": ["Yes", "Yes"], "answers": {"Yes": "d"}}, "d": {"diagnosis": "D"}}"#,
            ),
            "duplicate option",
        );
    }

    #[test]
    fn given_question_without_options_field_when_loading_then_malformed() {
        assert_malformed(
            &tree_doc(r#"{"q": {"question": "Q?", "answers": {}}}"#),
            "missing 'options'",
        );
    }

    #[test]
    fn given_null_question_fields_beside_diagnosis_when_loading_then_treated_as_absent() {
        let source = r#"{"troubleshooting": {"t": {"start_node": "d", "nodes": {"d": {"diagnosis": "D", "question": null, "options": null}}}}}"#;

        let kb = KnowledgeBaseBuilder::default().load(source).unwrap();

        assert_eq!(
            kb.registry.tree("t").unwrap().node("d"),
            Some(&Node::Diagnosis("D".into()))
        );
    }

    #[test]
    fn given_null_diagnosis_beside_question_when_loading_then_builds_question() {
        let source = tree_doc(
            r#"{"q": {"question": "Q?", "options": ["Yes"], "answers": {"Yes": "d"}, "diagnosis": null}, "d": {"diagnosis": "D"}}"#,
        );

        let kb = KnowledgeBaseBuilder::default().load(&source).unwrap();

        assert!(matches!(kb.registry.tree("t").unwrap().node("q"), Some(Node::Question(_))));
    }

    #[test]
    fn given_missing_tree_section_when_loading_then_malformed() {
        assert_malformed(r#"{"maintenance_info": {}}"#, "missing tree section");
    }

    #[test]
    fn given_invalid_json_when_loading_then_malformed() {
        assert_malformed("{not json", "invalid JSON");
    }

    #[test]
    fn given_custom_domain_when_loading_then_reads_that_section() {
        let source = r#"{"faults": {"t": {"start_node": "d", "nodes": {"d": {"diagnosis": "D"}}}}}"#;

        let kb = KnowledgeBaseBuilder::new("faults").load(source).unwrap();

        assert_eq!(kb.registry.list_trees(), vec!["t"]);
    }

    #[test]
    fn given_non_string_advisory_when_loading_then_malformed() {
        let source = r#"{"troubleshooting": {}, "maintenance_info": {"mlc": 6}}"#;
        match KnowledgeBaseBuilder::default().load(source) {
            Err(DomainError::MalformedTree { location, .. }) => {
                assert_eq!(location, MAINTENANCE_SECTION)
            }
            other => panic!("expected MalformedTree, got {:?}", other),
        }
    }

    #[test]
    fn given_unreachable_node_when_loading_then_loads_and_reports_it() {
        let source = tree_doc(
            r#"{"q": {"question": "Q?", "options": ["Yes"], "answers": {"Yes": "d"}}, "d": {"diagnosis": "D"}, "orphan": {"diagnosis": "O"}}"#,
        );

        let kb = KnowledgeBaseBuilder::default().load(&source).unwrap();

        assert_eq!(kb.registry.tree("t").unwrap().unreachable_nodes(), vec!["orphan"]);
    }
}
