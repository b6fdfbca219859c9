use regex::Regex;

use crate::errors::AuthzError;

/// A single configured grant: requests from `scope` using `method` on a path
/// matched by `pattern` are allowed.
///
/// `scope` is either a user name or a role name; the two are not told apart.
/// The pattern is compiled on construction so a bad rule never reaches an index.
#[derive(Clone, Debug)]
pub struct Rule {
    scope: String,
    method: String,
    pattern: Regex,
}

impl Rule {
    pub fn new(
        scope: impl Into<String>,
        method: impl Into<String>,
        pattern: &str,
    ) -> Result<Self, AuthzError> {
        let scope = scope.into();
        let method = method.into();
        let pattern = Regex::new(pattern).map_err(|source| AuthzError::InvalidPattern {
            scope: scope.clone(),
            method: method.clone(),
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            scope,
            method,
            pattern,
        })
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    pub(crate) fn into_parts(self) -> (String, String, Regex) {
        (self.scope, self.method, self.pattern)
    }
}
