//! Free-text query routing to a troubleshooting tree

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Keywords that select a tree for a free-text query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TopicRule {
    pub tree: String,
    pub keywords: Vec<String>,
}

impl TopicRule {
    pub fn new(tree: impl Into<String>, keywords: &[&str]) -> Self {
        Self {
            tree: tree.into(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// Case-insensitive substring match on any keyword.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.keywords
            .iter()
            .any(|keyword| !keyword.is_empty() && query.contains(&keyword.to_lowercase()))
    }
}

/// Rules shipped with the crate.
pub fn default_topic_rules() -> Vec<TopicRule> {
    vec![
        TopicRule::new("output_drift", &["drift", "output"]),
        TopicRule::new("flatness_warning", &["flatness", "symmetry"]),
    ]
}

/// First rule (in order) that matches `query` wins.
pub fn route_topic<'r>(rules: &'r [TopicRule], query: &str) -> Result<&'r str, DomainError> {
    rules
        .iter()
        .find(|rule| rule.matches(query))
        .map(|rule| rule.tree.as_str())
        .ok_or_else(|| DomainError::NoMatchingTopic(query.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_drift_query_when_routing_then_selects_output_drift() {
        let rules = default_topic_rules();
        assert_eq!(
            route_topic(&rules, "Why is my OUTPUT drifting?").unwrap(),
            "output_drift"
        );
    }

    #[test]
    fn given_symmetry_query_when_routing_then_selects_flatness_warning() {
        let rules = default_topic_rules();
        assert_eq!(
            route_topic(&rules, "symmetry warning on 6MV").unwrap(),
            "flatness_warning"
        );
    }

    #[test]
    fn given_query_matching_two_rules_when_routing_then_first_rule_wins() {
        let rules = default_topic_rules();
        assert_eq!(
            route_topic(&rules, "output flatness").unwrap(),
            "output_drift"
        );
    }

    #[test]
    fn given_unrelated_query_when_routing_then_no_matching_topic() {
        let rules = default_topic_rules();
        assert_eq!(
            route_topic(&rules, "couch sag"),
            Err(DomainError::NoMatchingTopic("couch sag".into()))
        );
    }
}
