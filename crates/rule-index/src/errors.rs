use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthzError {
    #[error("invalid path pattern `{pattern}` for {scope} {method}: {source}")]
    InvalidPattern {
        scope: String,
        method: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
