use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::OnceCell;

use pathwarden_rule_center::{InMemoryRuleCenter, LoadOptions};

use crate::config::Config;

pub struct CliContext {
    config: Arc<Config>,
    config_path: PathBuf,
    rule_overrides: Vec<PathBuf>,
    rule_center: OnceCell<Arc<InMemoryRuleCenter>>,
}

impl CliContext {
    pub fn new(config: Config, config_path: PathBuf, rule_overrides: Vec<PathBuf>) -> Self {
        Self {
            config: Arc::new(config),
            config_path,
            rule_overrides,
            rule_center: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &Config {
        self.config.as_ref()
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn load_options(&self) -> LoadOptions {
        self.config.load_options(&self.rule_overrides)
    }

    /// Loads and compiles the rules once per invocation.
    pub async fn rule_center(&self) -> Result<Arc<InMemoryRuleCenter>> {
        self.rule_center
            .get_or_try_init(|| async {
                let options = self.load_options();
                let center = tokio::task::spawn_blocking(move || {
                    InMemoryRuleCenter::from_options(options)
                })
                .await
                .context("rule loader task failed")?
                .context("Failed to load rules")?;
                Ok::<_, anyhow::Error>(Arc::new(center))
            })
            .await
            .map(Arc::clone)
    }
}
