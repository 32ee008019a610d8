//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/diagtree/diagtree.toml`
//! 3. Local config: `<project_dir>/.diagtree.toml`
//! 4. Environment variables: `DIAGTREE_*` prefix

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{default_topic_rules, expand_env_vars, TopicRule, DEFAULT_DOMAIN};

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "DIAGTREE";

/// Unified configuration for diagtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Knowledge-base JSON file (default: knowledge_base.json in the project dir)
    pub knowledge_base: PathBuf,
    /// Top-level section holding the trees (default: troubleshooting)
    pub domain: String,
    /// Free-text routing rules, checked in order
    pub topics: Vec<TopicRule>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            knowledge_base: PathBuf::from("knowledge_base.json"),
            domain: DEFAULT_DOMAIN.to_string(),
            topics: default_topic_rules(),
        }
    }
}

/// Raw settings for intermediate parsing (Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub knowledge_base: Option<PathBuf>,
    pub domain: Option<String>,
    pub topics: Option<Vec<TopicRule>>,
}

/// Get the XDG config directory for diagtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "diagtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("diagtree.toml"))
}

/// Get the path to the local config file in a project directory.
pub fn local_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(".diagtree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Resolve the knowledge-base path against `project_dir` when relative.
    pub fn knowledge_base_path(&self, project_dir: &Path) -> PathBuf {
        if self.knowledge_base.is_absolute() {
            self.knowledge_base.clone()
        } else {
            project_dir.join(&self.knowledge_base)
        }
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.knowledge_base.to_string_lossy().as_ref());
        self.knowledge_base = PathBuf::from(expanded);
    }

    /// Overlay wins field by field; a specified topic list replaces the
    /// previous one entirely.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            knowledge_base: overlay
                .knowledge_base
                .clone()
                .unwrap_or_else(|| self.knowledge_base.clone()),
            domain: overlay.domain.clone().unwrap_or_else(|| self.domain.clone()),
            topics: overlay.topics.clone().unwrap_or_else(|| self.topics.clone()),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_dir` - Optional project directory for local config
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let global = global_config_path().filter(|p| p.exists());
        Self::load_from(global.as_deref(), project_dir, None)
    }

    /// Layered load with explicit sources.
    ///
    /// `env` replaces the process environment when given (tests pass a map
    /// of `DIAGTREE_*` variables).
    pub fn load_from(
        global_path: Option<&Path>,
        project_dir: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(path) = global_path {
            let raw = load_raw_settings(path)?;
            current = current.merge_with(&raw);
        }

        if let Some(dir) = project_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current, env)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply DIAGTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(
        mut settings: Self,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .source(env),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("knowledge_base") {
            settings.knowledge_base = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("domain") {
            settings.domain = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# diagtree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/diagtree/diagtree.toml
#   Local:  <project_dir>/.diagtree.toml
#   Env:    DIAGTREE_KNOWLEDGE_BASE, DIAGTREE_DOMAIN

# Knowledge-base JSON file (relative paths resolve against the project dir)
# knowledge_base = "knowledge_base.json"

# Top-level section of the knowledge base holding the trees
# domain = "troubleshooting"

# Free-text routing, checked in order; first match wins.
# Specifying topics replaces the inherited list.
# [[topics]]
# tree = "output_drift"
# keywords = ["drift", "output"]
#
# [[topics]]
# tree = "flatness_warning"
# keywords = ["flatness", "symmetry"]
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> Option<HashMap<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn given_no_config_when_loading_then_uses_defaults() {
        let settings = Settings::load_from(None, None, env(&[])).expect("load defaults");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.topics.len(), 2);
    }

    #[test]
    fn given_env_overrides_when_loading_then_env_wins() {
        let settings = Settings::load_from(
            None,
            None,
            env(&[
                ("DIAGTREE_DOMAIN", "faults"),
                ("DIAGTREE_KNOWLEDGE_BASE", "/srv/kb.json"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.domain, "faults");
        assert_eq!(settings.knowledge_base, PathBuf::from("/srv/kb.json"));
    }

    #[test]
    fn given_tilde_in_knowledge_base_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            knowledge_base: PathBuf::from("~/kb.json"),
            ..Settings::default()
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        assert!(settings.knowledge_base.to_string_lossy().starts_with(&home));
    }

    #[test]
    fn given_relative_knowledge_base_when_resolving_then_joins_project_dir() {
        let settings = Settings::default();
        assert_eq!(
            settings.knowledge_base_path(Path::new("/proj")),
            PathBuf::from("/proj/knowledge_base.json")
        );
    }

    #[test]
    fn given_overlay_topics_when_merging_then_replaces_list() {
        let overlay = RawSettings {
            topics: Some(vec![TopicRule::new("couch", &["couch"])]),
            ..RawSettings::default()
        };

        let merged = Settings::default().merge_with(&overlay);

        assert_eq!(merged.topics, vec![TopicRule::new("couch", &["couch"])]);
        assert_eq!(merged.domain, DEFAULT_DOMAIN);
    }

    #[test]
    fn given_settings_when_to_toml_then_round_trips_through_raw() {
        let toml = Settings::default().to_toml().unwrap();
        let raw: RawSettings = toml::from_str(&toml).unwrap();
        assert_eq!(Settings::default().merge_with(&raw), Settings::default());
    }
}
