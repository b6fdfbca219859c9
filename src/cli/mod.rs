pub mod app;
pub mod check;
pub mod commands;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod env;
pub mod output;
pub mod rules;
pub mod runtime;

pub use check::{cmd_check, CheckArgs};
pub use config::{cmd_config, ConfigArgs};
pub use rules::{cmd_rules, RulesArgs};
