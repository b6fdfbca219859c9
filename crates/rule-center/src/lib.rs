pub mod api;
pub mod defaults;
pub mod errors;
pub mod loader;
pub mod model;

pub use api::{InMemoryRuleCenter, RuleCenter, RuleGuard};
pub use defaults::default_rule_set;
pub use errors::CenterError;
pub use loader::{load_rule_set_with_options, parse_rule_file_str, LoadOptions};
pub use model::{RuleEntry, RuleFile, RuleSet, RuleSnapshot, RuleSource, RuleSpec, RuleView};
