//! Rule store trait

use async_trait::async_trait;
use tokio::sync::watch;
use veil_core::{Rule, RuleKind};

use crate::error::{Result, StoreError};

/// Persistent, ordered rule collection with change notifications.
///
/// The store is the only mutator of rules; every consumer works off
/// immutable snapshots and learns about changes through `subscribe`.
#[async_trait]
pub trait RuleStore: Send + Sync {
    async fn list_rules(&self) -> Result<Vec<Rule>>;

    async fn get_rule(&self, id: &str) -> Result<Rule>;

    async fn create_rule(&self, rule: &Rule) -> Result<()>;

    async fn update_rule(&self, rule: &Rule) -> Result<()>;

    async fn delete_rule(&self, id: &str) -> Result<()>;

    async fn set_rule_enabled(&self, id: &str, enabled: bool) -> Result<()>;

    /// Next free priority within the kind group.
    async fn next_priority(&self, kind: RuleKind) -> Result<i64>;

    /// Whether the feature is on for `host`. Per-host overrides win over
    /// the global flag; with neither set the feature defaults to on.
    async fn is_feature_enabled(&self, host: &str) -> Result<bool>;

    /// `host: None` sets the global flag.
    async fn set_feature_enabled(&self, host: Option<&str>, enabled: bool) -> Result<()>;

    /// Change notifications: the receiver observes the full rule list
    /// after every mutation.
    fn subscribe(&self) -> watch::Receiver<Vec<Rule>>;
}

/// Validation shared by every store implementation.
pub(crate) fn validate(rule: &Rule) -> Result<()> {
    if rule.match_text.is_empty() {
        return Err(StoreError::EmptyMatch);
    }
    Ok(())
}

pub(crate) const GLOBAL_FEATURE_KEY: &str = "feature.enabled";

pub(crate) fn host_feature_key(host: &str) -> String {
    format!("feature.enabled.{host}")
}
