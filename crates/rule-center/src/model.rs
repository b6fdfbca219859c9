use std::collections::BTreeMap;
use std::sync::Arc;

use pathwarden_rule_index::{Rule, RuleIndex, UnknownScopePolicy};
use serde::{Deserialize, Serialize};

use crate::errors::CenterError;

/// On-disk rule file, accepted as JSON or YAML.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RuleFile {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unknown_scope: Option<UnknownScopePolicy>,
    #[serde(default)]
    pub rules: Vec<RuleEntry>,
    /// Grouped form: scope -> method -> path patterns.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub grants: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

fn default_version() -> u32 {
    1
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RuleEntry {
    pub scope: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<String>,
    pub path: String,
}

impl RuleEntry {
    pub fn all_methods(&self) -> impl Iterator<Item = &str> {
        self.method
            .iter()
            .chain(self.methods.iter())
            .map(String::as_str)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum RuleSource {
    File,
    Env,
    Runtime,
}

/// One flattened (scope, method, path) triple plus where it came from.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleSpec {
    pub scope: String,
    pub method: String,
    pub path: String,
    pub source: RuleSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

impl RuleSpec {
    pub fn new(
        scope: impl Into<String>,
        method: impl Into<String>,
        path: impl Into<String>,
        source: RuleSource,
    ) -> Self {
        Self {
            scope: scope.into(),
            method: method.into(),
            path: path.into(),
            source,
            origin: None,
        }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }
}

/// Uncompiled rules as produced by the loader.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RuleSet {
    pub unknown_scope: UnknownScopePolicy,
    pub rules: Vec<RuleSpec>,
}

impl RuleSet {
    /// Compiles every pattern. The first bad pattern fails the whole set.
    pub fn compile(&self) -> Result<RuleIndex, CenterError> {
        let rules = self
            .rules
            .iter()
            .map(|spec| Rule::new(spec.scope.as_str(), spec.method.as_str(), &spec.path))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RuleIndex::build_with_policy(rules, self.unknown_scope))
    }
}

/// A compiled, published revision of the rule set.
#[derive(Clone, Debug)]
pub struct RuleSnapshot {
    pub rev: u64,
    pub rules: RuleSet,
    pub index: Arc<RuleIndex>,
}

impl RuleSnapshot {
    pub fn compile(rev: u64, rules: RuleSet) -> Result<Self, CenterError> {
        let index = Arc::new(rules.compile()?);
        Ok(Self { rev, rules, index })
    }

    pub fn view(&self) -> RuleView {
        RuleView {
            rev: self.rev,
            unknown_scope: self.rules.unknown_scope,
            scopes: self.index.scope_count(),
            rules: self.rules.rules.clone(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct RuleView {
    pub rev: u64,
    pub unknown_scope: UnknownScopePolicy,
    pub scopes: usize,
    pub rules: Vec<RuleSpec>,
}
