pub mod errors;
pub mod index;
pub mod rule;

pub use errors::AuthzError;
pub use index::{Authorizer, RuleIndex, UnknownScopePolicy};
pub use rule::Rule;
