use pathwarden_rule_index::UnknownScopePolicy;

use crate::model::RuleSet;

/// Empty rule set. With no scopes known every user falls under the
/// unknown-scope policy, which defaults to allow.
pub fn default_rule_set() -> RuleSet {
    RuleSet {
        unknown_scope: UnknownScopePolicy::Allow,
        rules: Vec::new(),
    }
}
