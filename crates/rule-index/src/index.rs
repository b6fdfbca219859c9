use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::rule::Rule;

/// Answers whether a request identity may use `method` on `path`.
pub trait Authorizer: Send + Sync {
    fn authorize(&self, user: &str, roles: &[String], path: &str, method: &str) -> bool;
}

impl<T: Authorizer + ?Sized> Authorizer for Arc<T> {
    fn authorize(&self, user: &str, roles: &[String], path: &str, method: &str) -> bool {
        (**self).authorize(user, roles, path, method)
    }
}

/// Decision for a user that does not appear as a scope in any rule.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownScopePolicy {
    /// Grant without consulting roles.
    #[default]
    Allow,
    Deny,
}

type MethodPatterns = HashMap<String, Vec<Regex>>;

/// Rules grouped scope -> method -> patterns so that a request is narrowed by
/// identity and method before any regex runs.
///
/// Immutable once built. Rebuild and swap the whole index to change rules.
#[derive(Clone, Debug, Default)]
pub struct RuleIndex {
    scopes: HashMap<String, MethodPatterns>,
    unknown_scope: UnknownScopePolicy,
    rule_count: usize,
}

impl RuleIndex {
    pub fn build<I>(rules: I) -> Self
    where
        I: IntoIterator<Item = Rule>,
    {
        Self::build_with_policy(rules, UnknownScopePolicy::default())
    }

    pub fn build_with_policy<I>(rules: I, unknown_scope: UnknownScopePolicy) -> Self
    where
        I: IntoIterator<Item = Rule>,
    {
        let mut scopes: HashMap<String, MethodPatterns> = HashMap::new();
        let mut rule_count = 0usize;
        for rule in rules {
            let (scope, method, pattern) = rule.into_parts();
            scopes
                .entry(scope)
                .or_default()
                .entry(method)
                .or_default()
                .push(pattern);
            rule_count += 1;
        }
        debug!(
            scopes = scopes.len(),
            rules = rule_count,
            ?unknown_scope,
            "built rule index"
        );
        Self {
            scopes,
            unknown_scope,
            rule_count,
        }
    }

    /// Scope lookup for `user` only decides between the unknown-scope policy
    /// and the role scan; the user's own rules count only when the user is
    /// also listed in `roles`.
    pub fn is_authorized<R: AsRef<str>>(
        &self,
        user: &str,
        roles: &[R],
        path: &str,
        method: &str,
    ) -> bool {
        if !self.scopes.contains_key(user) {
            let granted = self.unknown_scope == UnknownScopePolicy::Allow;
            trace!(user, method, path, granted, "user has no rules");
            return granted;
        }

        for role in roles {
            let role = role.as_ref();
            let Some(patterns) = self.patterns(role, method) else {
                continue;
            };
            if let Some(pattern) = patterns.iter().find(|pattern| pattern.is_match(path)) {
                trace!(user, role, method, path, pattern = pattern.as_str(), "granted");
                return true;
            }
        }

        trace!(user, method, path, "denied");
        false
    }

    pub fn contains_scope(&self, scope: &str) -> bool {
        self.scopes.contains_key(scope)
    }

    pub fn patterns(&self, scope: &str, method: &str) -> Option<&[Regex]> {
        self.scopes
            .get(scope)
            .and_then(|methods| methods.get(method))
            .map(Vec::as_slice)
    }

    pub fn unknown_scope_policy(&self) -> UnknownScopePolicy {
        self.unknown_scope
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    pub fn rule_count(&self) -> usize {
        self.rule_count
    }

    pub fn is_empty(&self) -> bool {
        self.rule_count == 0
    }

    /// Flattened `(scope, method, patterns)` entries, sorted by scope then method.
    pub fn entries(&self) -> Vec<(&str, &str, &[Regex])> {
        let mut entries: Vec<_> = self
            .scopes
            .iter()
            .flat_map(|(scope, methods)| {
                methods.iter().map(move |(method, patterns)| {
                    (scope.as_str(), method.as_str(), patterns.as_slice())
                })
            })
            .collect();
        entries.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
        entries
    }
}

impl FromIterator<Rule> for RuleIndex {
    fn from_iter<T: IntoIterator<Item = Rule>>(iter: T) -> Self {
        Self::build(iter)
    }
}

impl Authorizer for RuleIndex {
    fn authorize(&self, user: &str, roles: &[String], path: &str, method: &str) -> bool {
        self.is_authorized(user, roles, path, method)
    }
}
