//! CLI configuration file

use std::path::PathBuf;

use pathwarden_rule_center::LoadOptions;
use pathwarden_rule_index::UnknownScopePolicy;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Rule files, read in order
    pub rule_paths: Vec<PathBuf>,
    /// Overrides the policy set by rule files
    pub unknown_scope: Option<UnknownScopePolicy>,
    /// Read `PATHWARDEN_RULES_JSON` / `PATHWARDEN_UNKNOWN_SCOPE`
    pub include_env: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rule_paths: Vec::new(),
            unknown_scope: None,
            include_env: true,
        }
    }
}

impl Config {
    /// Rule files given on the command line replace the configured ones.
    pub fn load_options(&self, rule_overrides: &[PathBuf]) -> LoadOptions {
        let paths = if rule_overrides.is_empty() {
            self.rule_paths.clone()
        } else {
            rule_overrides.to_vec()
        };
        LoadOptions {
            paths,
            include_env: self.include_env,
            unknown_scope: self.unknown_scope,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config: Config = serde_yaml::from_str("unknown_scope: deny\n").unwrap();
        assert!(config.rule_paths.is_empty());
        assert!(config.include_env);
        assert_eq!(config.unknown_scope, Some(UnknownScopePolicy::Deny));
    }

    #[test]
    fn command_line_rules_replace_configured_paths() {
        let config = Config {
            rule_paths: vec![PathBuf::from("a.yaml")],
            ..Config::default()
        };
        assert_eq!(config.load_options(&[]).paths, vec![PathBuf::from("a.yaml")]);
        let options = config.load_options(&[PathBuf::from("b.yaml")]);
        assert_eq!(options.paths, vec![PathBuf::from("b.yaml")]);
        assert!(options.include_env);
    }
}
