use pathwarden_rule_index::AuthzError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CenterError {
    #[error("io error: {0}")]
    Io(String),
    #[error("invalid rule file: {0}")]
    Invalid(String),
    #[error(transparent)]
    Rule(#[from] AuthzError),
    #[error("rule center has no rule sources to reload from")]
    NoSource,
    #[error("internal error: {0}")]
    Internal(String),
}
