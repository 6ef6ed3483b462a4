//! In-memory rule store

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tokio::sync::watch;
use veil_core::{Rule, RuleKind};

use crate::error::{Result, StoreError};
use crate::store::{GLOBAL_FEATURE_KEY, RuleStore, host_feature_key, validate};

/// Volatile store with the same contract as `SqliteStore`, for tests and
/// embedders that manage persistence themselves.
pub struct MemoryStore {
    rules: RwLock<Vec<Rule>>,
    settings: RwLock<HashMap<String, bool>>,
    rules_tx: watch::Sender<Vec<Rule>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (rules_tx, _) = watch::channel(Vec::new());
        Self {
            rules: RwLock::new(Vec::new()),
            settings: RwLock::new(HashMap::new()),
            rules_tx,
        }
    }

    pub fn with_rules(rules: Vec<Rule>) -> Self {
        let (rules_tx, _) = watch::channel(rules.clone());
        Self {
            rules: RwLock::new(rules),
            settings: RwLock::new(HashMap::new()),
            rules_tx,
        }
    }

    fn publish(&self) {
        let rules = self.rules.read().expect("rules lock").clone();
        self.rules_tx.send_replace(rules);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RuleStore for MemoryStore {
    async fn list_rules(&self) -> Result<Vec<Rule>> {
        Ok(self.rules.read().expect("rules lock").clone())
    }

    async fn get_rule(&self, id: &str) -> Result<Rule> {
        self.rules
            .read()
            .expect("rules lock")
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| StoreError::RuleNotFound(id.to_string()))
    }

    async fn create_rule(&self, rule: &Rule) -> Result<()> {
        validate(rule)?;
        {
            let mut rules = self.rules.write().expect("rules lock");
            if rules
                .iter()
                .any(|r| r.kind == rule.kind && r.priority == rule.priority)
            {
                return Err(StoreError::DuplicatePriority {
                    kind: rule.kind,
                    priority: rule.priority,
                });
            }
            rules.push(rule.clone());
            rules.sort_by_key(|r| (r.kind.as_str(), r.priority));
        }
        self.publish();
        Ok(())
    }

    async fn update_rule(&self, rule: &Rule) -> Result<()> {
        validate(rule)?;
        {
            let mut rules = self.rules.write().expect("rules lock");
            if rules
                .iter()
                .any(|r| r.id != rule.id && r.kind == rule.kind && r.priority == rule.priority)
            {
                return Err(StoreError::DuplicatePriority {
                    kind: rule.kind,
                    priority: rule.priority,
                });
            }
            let slot = rules
                .iter_mut()
                .find(|r| r.id == rule.id)
                .ok_or_else(|| StoreError::RuleNotFound(rule.id.clone()))?;
            *slot = rule.clone();
            slot.touch();
        }
        self.publish();
        Ok(())
    }

    async fn delete_rule(&self, id: &str) -> Result<()> {
        {
            let mut rules = self.rules.write().expect("rules lock");
            let before = rules.len();
            rules.retain(|r| r.id != id);
            if rules.len() == before {
                return Err(StoreError::RuleNotFound(id.to_string()));
            }
        }
        self.publish();
        Ok(())
    }

    async fn set_rule_enabled(&self, id: &str, enabled: bool) -> Result<()> {
        {
            let mut rules = self.rules.write().expect("rules lock");
            let rule = rules
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or_else(|| StoreError::RuleNotFound(id.to_string()))?;
            rule.enabled = enabled;
            rule.touch();
        }
        self.publish();
        Ok(())
    }

    async fn next_priority(&self, kind: RuleKind) -> Result<i64> {
        Ok(self
            .rules
            .read()
            .expect("rules lock")
            .iter()
            .filter(|r| r.kind == kind)
            .map(|r| r.priority)
            .max()
            .map_or(0, |max| max + 1))
    }

    async fn is_feature_enabled(&self, host: &str) -> Result<bool> {
        let settings = self.settings.read().expect("settings lock");
        if let Some(&enabled) = settings.get(&host_feature_key(host)) {
            return Ok(enabled);
        }
        Ok(settings.get(GLOBAL_FEATURE_KEY).copied().unwrap_or(true))
    }

    async fn set_feature_enabled(&self, host: Option<&str>, enabled: bool) -> Result<()> {
        let key = match host {
            Some(host) => host_feature_key(host),
            None => GLOBAL_FEATURE_KEY.to_string(),
        };
        self.settings.write().expect("settings lock").insert(key, enabled);
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Vec<Rule>> {
        self.rules_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lifecycle_and_notifications() {
        let store = MemoryStore::new();
        let mut rx = store.subscribe();

        let rule = Rule::literal("Sam", "{name}");
        store.create_rule(&rule).await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().len(), 1);

        store.delete_rule(&rule.id).await.unwrap();
        assert!(store.list_rules().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_priority_rejected() {
        let store = MemoryStore::new();
        store
            .create_rule(&Rule::literal("a", "[A]").with_priority(2))
            .await
            .unwrap();

        let clash = store.create_rule(&Rule::literal("b", "[B]").with_priority(2)).await;
        assert!(matches!(clash, Err(StoreError::DuplicatePriority { .. })));
    }

    #[tokio::test]
    async fn test_feature_flag_override() {
        let store = MemoryStore::new();
        assert!(store.is_feature_enabled("any.host").await.unwrap());

        store.set_feature_enabled(None, false).await.unwrap();
        store.set_feature_enabled(Some("chat.example.com"), true).await.unwrap();

        assert!(store.is_feature_enabled("chat.example.com").await.unwrap());
        assert!(!store.is_feature_enabled("any.host").await.unwrap());
    }
}
