use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use pathwarden_rule_index::UnknownScopePolicy;
use tracing::debug;

use crate::defaults::default_rule_set;
use crate::errors::CenterError;
use crate::model::{RuleFile, RuleSet, RuleSource, RuleSpec};

pub const ENV_RULES_JSON: &str = "PATHWARDEN_RULES_JSON";
pub const ENV_UNKNOWN_SCOPE: &str = "PATHWARDEN_UNKNOWN_SCOPE";

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub paths: Vec<PathBuf>,
    pub include_env: bool,
    /// Applied after the files and before the environment.
    pub unknown_scope: Option<UnknownScopePolicy>,
}

/// Builtin defaults, then each file in order, then the explicit option, then
/// the environment. Rules accumulate; the unknown-scope policy is taken from
/// the last layer that sets one. Every listed file must exist.
pub fn load_rule_set_with_options(options: &LoadOptions) -> Result<RuleSet, CenterError> {
    let mut set = default_rule_set();

    for path in &options.paths {
        if !path.exists() {
            return Err(CenterError::Io(format!("{}: rule file not found", path.display())));
        }
        let file = rule_file_from_path(path)?;
        let origin = path.display().to_string();
        apply_rule_file(&mut set, file, RuleSource::File, &origin)?;
    }

    if let Some(policy) = options.unknown_scope {
        set.unknown_scope = policy;
    }

    if options.include_env {
        apply_env(&mut set)?;
    }

    debug!(rules = set.rules.len(), unknown_scope = ?set.unknown_scope, "loaded rule set");
    Ok(set)
}

pub fn parse_rule_file_str(raw: &str) -> Result<RuleFile, CenterError> {
    match serde_json::from_str(raw) {
        Ok(file) => Ok(file),
        Err(json_err) => serde_yaml::from_str(raw).map_err(|yaml_err| {
            CenterError::Invalid(format!(
                "json error: {}; yaml error: {}",
                json_err, yaml_err
            ))
        }),
    }
}

fn rule_file_from_path(path: &Path) -> Result<RuleFile, CenterError> {
    let content = fs::read_to_string(path)
        .map_err(|err| CenterError::Io(format!("{}: {}", path.display(), err)))?;
    parse_rule_file_str(&content)
        .map_err(|err| CenterError::Invalid(format!("{}: {}", path.display(), err)))
}

fn apply_rule_file(
    set: &mut RuleSet,
    file: RuleFile,
    source: RuleSource,
    origin: &str,
) -> Result<(), CenterError> {
    if file.version != 1 {
        return Err(CenterError::Invalid(format!(
            "{origin}: unsupported rule file version {}",
            file.version
        )));
    }
    if let Some(policy) = file.unknown_scope {
        set.unknown_scope = policy;
    }
    set.rules.extend(specs_from_file(&file, source, origin)?);
    Ok(())
}

fn specs_from_file(
    file: &RuleFile,
    source: RuleSource,
    origin: &str,
) -> Result<Vec<RuleSpec>, CenterError> {
    let mut specs = Vec::new();
    for entry in &file.rules {
        let methods: Vec<&str> = entry.all_methods().collect();
        let problem = if methods.is_empty() {
            Some("has no method")
        } else if entry.method.is_some() && !entry.methods.is_empty() {
            Some("sets both `method` and `methods`")
        } else if methods.iter().enumerate().any(|(i, m)| methods[..i].contains(m)) {
            Some("repeats a method")
        } else {
            None
        };
        if let Some(problem) = problem {
            return Err(CenterError::Invalid(format!(
                "{origin}: rule for scope `{}` on `{}` {problem}",
                entry.scope, entry.path
            )));
        }
        for method in methods {
            specs.push(
                RuleSpec::new(entry.scope.as_str(), method, entry.path.as_str(), source)
                    .with_origin(origin),
            );
        }
    }
    for (scope, methods) in &file.grants {
        for (method, paths) in methods {
            for path in paths {
                specs.push(
                    RuleSpec::new(scope.as_str(), method.as_str(), path.as_str(), source)
                        .with_origin(origin),
                );
            }
        }
    }
    Ok(specs)
}

fn apply_env(set: &mut RuleSet) -> Result<(), CenterError> {
    if let Ok(raw_json) = env::var(ENV_RULES_JSON) {
        if !raw_json.trim().is_empty() {
            let file: RuleFile = serde_json::from_str(&raw_json)
                .map_err(|err| CenterError::Invalid(format!("{ENV_RULES_JSON}: {err}")))?;
            apply_rule_file(set, file, RuleSource::Env, ENV_RULES_JSON)?;
        }
    }

    if let Ok(raw) = env::var(ENV_UNKNOWN_SCOPE) {
        set.unknown_scope = parse_unknown_scope(&raw)?;
    }
    Ok(())
}

fn parse_unknown_scope(raw: &str) -> Result<UnknownScopePolicy, CenterError> {
    match raw.trim() {
        "allow" => Ok(UnknownScopePolicy::Allow),
        "deny" => Ok(UnknownScopePolicy::Deny),
        other => Err(CenterError::Invalid(format!(
            "{ENV_UNKNOWN_SCOPE}: expected `allow` or `deny`, got `{other}`"
        ))),
    }
}
