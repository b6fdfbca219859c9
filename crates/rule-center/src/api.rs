use std::sync::Arc;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use pathwarden_rule_index::Authorizer;
use tokio::sync::{watch, Mutex};
use tracing::{info, warn};

use crate::errors::CenterError;
use crate::loader::{load_rule_set_with_options, LoadOptions};
use crate::model::{RuleSet, RuleSnapshot};

#[async_trait]
pub trait RuleCenter: Authorizer {
    fn snapshot(&self) -> Arc<RuleSnapshot>;
    /// Re-reads the configured sources and publishes a new revision.
    async fn reload(&self) -> Result<u64, CenterError>;
    /// Publishes `rules` as a new revision without touching the sources.
    async fn replace(&self, rules: RuleSet) -> Result<u64, CenterError>;
    fn subscribe(&self) -> watch::Receiver<Arc<RuleSnapshot>>;
    fn guard(&self) -> RuleGuard;
}

/// Serves decisions from an atomically swapped snapshot. Readers never take
/// a lock; writers build the next index off to the side and swap it in.
pub struct InMemoryRuleCenter {
    current: ArcSwap<RuleSnapshot>,
    options: Option<LoadOptions>,
    publish: Mutex<()>,
    watch_tx: watch::Sender<Arc<RuleSnapshot>>,
}

impl InMemoryRuleCenter {
    pub fn new(rules: RuleSet) -> Result<Self, CenterError> {
        let snapshot = RuleSnapshot::compile(1, rules)?;
        Ok(Self::from_snapshot(snapshot, None))
    }

    pub fn from_options(options: LoadOptions) -> Result<Self, CenterError> {
        let rules = load_rule_set_with_options(&options)?;
        let snapshot = RuleSnapshot::compile(1, rules)?;
        Ok(Self::from_snapshot(snapshot, Some(options)))
    }

    fn from_snapshot(snapshot: RuleSnapshot, options: Option<LoadOptions>) -> Self {
        let snapshot = Arc::new(snapshot);
        let (watch_tx, _watch_rx) = watch::channel(Arc::clone(&snapshot));
        Self {
            current: ArcSwap::new(snapshot),
            options,
            publish: Mutex::new(()),
            watch_tx,
        }
    }

    async fn publish(&self, rules: RuleSet) -> Result<u64, CenterError> {
        let _guard = self.publish.lock().await;
        let rev = self.current.load().rev.saturating_add(1);
        let snapshot = match RuleSnapshot::compile(rev, rules) {
            Ok(snapshot) => Arc::new(snapshot),
            Err(err) => {
                warn!(
                    rev = self.current.load().rev,
                    "rule set rejected; keeping current revision: {err}"
                );
                return Err(err);
            }
        };
        self.current.store(Arc::clone(&snapshot));
        info!(
            rev,
            rules = snapshot.index.rule_count(),
            scopes = snapshot.index.scope_count(),
            "published rule index"
        );
        // send_replace keeps the value current even with no subscribers
        self.watch_tx.send_replace(snapshot);
        Ok(rev)
    }
}

#[async_trait]
impl RuleCenter for InMemoryRuleCenter {
    fn snapshot(&self) -> Arc<RuleSnapshot> {
        self.current.load_full()
    }

    async fn reload(&self) -> Result<u64, CenterError> {
        let options = self.options.clone().ok_or(CenterError::NoSource)?;
        let rules = tokio::task::spawn_blocking(move || load_rule_set_with_options(&options))
            .await
            .map_err(|err| CenterError::Internal(format!("rule loader task failed: {err}")))?
            .map_err(|err| {
                warn!("rule reload failed; keeping current revision: {err}");
                err
            })?;
        self.publish(rules).await
    }

    async fn replace(&self, rules: RuleSet) -> Result<u64, CenterError> {
        self.publish(rules).await
    }

    fn subscribe(&self) -> watch::Receiver<Arc<RuleSnapshot>> {
        self.watch_tx.subscribe()
    }

    fn guard(&self) -> RuleGuard {
        RuleGuard {
            snapshot: self.snapshot(),
        }
    }
}

impl Authorizer for InMemoryRuleCenter {
    fn authorize(&self, user: &str, roles: &[String], path: &str, method: &str) -> bool {
        self.current
            .load()
            .index
            .is_authorized(user, roles, path, method)
    }
}

/// Pins one revision so a caller sees consistent answers across several
/// checks even if a reload lands in between.
#[derive(Clone, Debug)]
pub struct RuleGuard {
    snapshot: Arc<RuleSnapshot>,
}

impl RuleGuard {
    pub fn revision(&self) -> u64 {
        self.snapshot.rev
    }

    pub fn snapshot(&self) -> Arc<RuleSnapshot> {
        Arc::clone(&self.snapshot)
    }

    pub fn is_authorized<R: AsRef<str>>(
        &self,
        user: &str,
        roles: &[R],
        path: &str,
        method: &str,
    ) -> bool {
        self.snapshot.index.is_authorized(user, roles, path, method)
    }
}
