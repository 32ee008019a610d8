//! Traversal tests against the bundled troubleshooting knowledge base

use std::fs;

use rstest::{fixture, rstest};

use diagtree::domain::{DomainError, KnowledgeBase, KnowledgeBaseBuilder, Prompt, Session};
use diagtree::util::testing::init_test_setup;

const KB_PATH: &str = "tests/resources/knowledge_base.json";

#[fixture]
fn kb() -> KnowledgeBase {
    init_test_setup();
    let source = fs::read_to_string(KB_PATH).expect("read fixture");
    KnowledgeBaseBuilder::default()
        .load(&source)
        .expect("fixture is well formed")
}

// ============================================================
// Scenarios
// ============================================================

#[rstest]
fn given_output_drift_when_answering_yes_then_post_service_diagnosis(kb: KnowledgeBase) {
    let mut session = kb.registry.start("output_drift").unwrap();

    match session.current_prompt() {
        Prompt::Question { question, options } => {
            assert_eq!(
                question,
                "I see the output is trending high. Was there a recent machine service?"
            );
            assert_eq!(options, ["Yes", "No"]);
        }
        other => panic!("expected question, got {:?}", other),
    }

    match session.answer("Yes").unwrap() {
        Prompt::Diagnosis { diagnosis } => {
            assert!(diagnosis.starts_with("Post-service drift is common."))
        }
        other => panic!("expected diagnosis, got {:?}", other),
    }
    assert!(session.is_terminal());

    assert!(matches!(
        session.answer("Yes"),
        Err(DomainError::InvalidOption { .. })
    ));
}

#[rstest]
fn given_flatness_warning_when_answering_both_then_energy_diagnosis(kb: KnowledgeBase) {
    let mut session = kb.registry.start("flatness_warning").unwrap();

    let prompt = session.answer("Both").unwrap();

    match prompt {
        Prompt::Diagnosis { diagnosis } => {
            assert!(diagnosis.starts_with("If both axes are affected"))
        }
        other => panic!("expected diagnosis, got {:?}", other),
    }
}

#[rstest]
fn given_unknown_tree_when_starting_then_unknown_tree_error(kb: KnowledgeBase) {
    let err = kb.registry.start("nonexistent_tree").unwrap_err();
    assert_eq!(err, DomainError::UnknownTree("nonexistent_tree".into()));
}

#[rstest]
fn given_maintenance_keys_when_looking_up_then_returns_advisory_or_not_found(kb: KnowledgeBase) {
    assert_eq!(
        kb.maintenance.lookup("mlc_service").unwrap(),
        "Regular Multi-leaf Collimator (MLC) service is recommended every 6 months. This includes cleaning the leaves and performing a positional accuracy test."
    );
    assert_eq!(
        kb.maintenance.lookup("unknown_key"),
        Err(DomainError::NotFound("unknown_key".into()))
    );
}

#[rstest]
fn given_registry_when_listing_trees_then_sorted_names(kb: KnowledgeBase) {
    assert_eq!(kb.registry.list_trees(), vec!["flatness_warning", "output_drift"]);
}

// ============================================================
// Exact matching and terminal immutability
// ============================================================

#[rstest]
#[case("yes")]
#[case("YES")]
#[case(" Yes")]
#[case("")]
fn given_near_miss_option_when_answering_then_invalid_option(
    kb: KnowledgeBase,
    #[case] option: &str,
) {
    let mut session = kb.registry.start("output_drift").unwrap();

    assert_eq!(
        session.answer(option),
        Err(DomainError::InvalidOption {
            node: "q_recent_service".into(),
            option: option.into(),
        })
    );
    assert_eq!(session.node_id(), "q_recent_service");
}

#[rstest]
#[case("output_drift", &["No", "Yes", "No"])]
#[case("output_drift", &["No", "Not sure"])]
#[case("flatness_warning", &["Inline"])]
fn given_terminal_session_when_answering_any_option_then_invalid_option(
    kb: KnowledgeBase,
    #[case] tree: &str,
    #[case] answers: &[&str],
) {
    let mut session = kb.registry.start(tree).unwrap();
    for answer in answers {
        session.answer(answer).unwrap();
    }
    assert!(session.is_terminal());

    for option in ["Yes", "No", "Both", "Inline"] {
        assert!(matches!(
            session.answer(option),
            Err(DomainError::InvalidOption { .. })
        ));
    }
}

// ============================================================
// Structural properties
// ============================================================

#[rstest]
fn given_loaded_registry_when_checking_references_then_all_resolve(kb: KnowledgeBase) {
    for (name, tree) in kb.registry.iter() {
        assert!(
            tree.node(tree.start_node()).is_some(),
            "{name}: start node must resolve"
        );
        for (id, node) in tree.nodes() {
            for (option, target) in node.edges() {
                assert!(
                    tree.node(target).is_some(),
                    "{name}/{id}: '{option}' -> '{target}' must resolve"
                );
            }
        }
    }
}

fn assert_reaches_diagnosis(session: Session<'_>, budget: usize) {
    match session.current_prompt() {
        Prompt::Diagnosis { .. } => {}
        Prompt::Question { options, .. } => {
            assert!(
                budget > 0,
                "no diagnosis within bound at {:?}",
                session.position()
            );
            for option in options {
                let mut next = session;
                next.answer(option).unwrap();
                assert_reaches_diagnosis(next, budget - 1);
            }
        }
    }
}

#[rstest]
fn given_every_answer_path_when_walking_then_reaches_diagnosis(kb: KnowledgeBase) {
    for name in kb.registry.list_trees() {
        let tree = kb.registry.tree(name).unwrap();
        let session = kb.registry.start(name).unwrap();
        assert_reaches_diagnosis(session, tree.len());
    }
}

#[rstest]
fn given_position_when_resuming_then_continues_from_same_node(kb: KnowledgeBase) {
    let mut session = kb.registry.start("output_drift").unwrap();
    session.answer("No").unwrap();
    let (tree, node) = session.position();

    let mut resumed = kb.registry.resume(tree, node).unwrap();

    assert_eq!(resumed.current_prompt(), session.current_prompt());
    assert!(resumed.answer("Not sure").unwrap().is_terminal());
}

#[rstest]
fn given_unknown_node_when_resuming_then_unknown_node_error(kb: KnowledgeBase) {
    assert_eq!(
        kb.registry.resume("output_drift", "q_nowhere").unwrap_err(),
        DomainError::UnknownNode {
            tree: "output_drift".into(),
            node: "q_nowhere".into(),
        }
    );
}

// ============================================================
// Malformed data
// ============================================================

#[rstest]
#[case::both_variants(r#"{"diagnosis": "D", "question": "Q?", "options": ["Yes"], "answers": {"Yes": "q"}}"#)]
#[case::neither_variant(r#"{"note": "nothing useful"}"#)]
#[case::empty_node(r#"{}"#)]
fn given_ill_shaped_node_when_loading_then_malformed_and_no_registry(#[case] node: &str) {
    let source = format!(
        r#"{{"troubleshooting": {{
            "good": {{"start_node": "d", "nodes": {{"d": {{"diagnosis": "fine"}}}}}},
            "bad": {{"start_node": "q", "nodes": {{"q": {node}}}}}
        }}, "maintenance_info": {{"k": "v"}}}}"#
    );

    let result = KnowledgeBaseBuilder::default().load(&source);

    match result {
        Err(DomainError::MalformedTree { location, .. }) => assert_eq!(location, "bad/q"),
        other => panic!("expected MalformedTree, got {:?}", other),
    }
}
