//! SQLite-backed rule store

use std::path::PathBuf;

use async_trait::async_trait;
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqliteRow};
use time::OffsetDateTime;
use tokio::sync::watch;
use tracing::debug;
use veil_core::{Rule, RuleKind};

use crate::error::{Result, StoreError};
use crate::store::{GLOBAL_FEATURE_KEY, RuleStore, host_feature_key, validate};

/// Rule store persisted in a single SQLite database.
pub struct SqliteStore {
    pool: SqlitePool,
    rules_tx: watch::Sender<Vec<Rule>>,
}

impl SqliteStore {
    /// Open (or create) the store. `None` uses the platform data
    /// directory.
    pub async fn new(db_path: Option<PathBuf>) -> Result<Self> {
        let path = match db_path {
            Some(path) => path,
            None => default_db_path(),
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;
        migrate(&pool).await?;

        let initial = load_rules(&pool).await?;
        let (rules_tx, _) = watch::channel(initial);

        debug!(path = %path.display(), "opened rule store");
        Ok(Self { pool, rules_tx })
    }

    /// Reload the rule list and hand it to every subscriber.
    async fn publish(&self) -> Result<()> {
        let rules = load_rules(&self.pool).await?;
        self.rules_tx.send_replace(rules);
        Ok(())
    }

    async fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get::<String, _>("value")))
    }
}

#[async_trait]
impl RuleStore for SqliteStore {
    async fn list_rules(&self) -> Result<Vec<Rule>> {
        load_rules(&self.pool).await
    }

    async fn get_rule(&self, id: &str) -> Result<Rule> {
        let row = sqlx::query("SELECT * FROM rules WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => row_to_rule(&row),
            None => Err(StoreError::RuleNotFound(id.to_string())),
        }
    }

    async fn create_rule(&self, rule: &Rule) -> Result<()> {
        validate(rule)?;
        sqlx::query(
            "INSERT INTO rules \
             (id, match_text, replacement, kind, enabled, case_sensitive, priority, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&rule.id)
        .bind(&rule.match_text)
        .bind(&rule.replacement)
        .bind(rule.kind.as_str())
        .bind(rule.enabled)
        .bind(rule.case_sensitive)
        .bind(rule.priority)
        .bind(rule.created_at.unix_timestamp())
        .bind(rule.updated_at.unix_timestamp())
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, rule))?;

        self.publish().await
    }

    async fn update_rule(&self, rule: &Rule) -> Result<()> {
        validate(rule)?;
        let result = sqlx::query(
            "UPDATE rules SET match_text = ?, replacement = ?, kind = ?, enabled = ?, \
             case_sensitive = ?, priority = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&rule.match_text)
        .bind(&rule.replacement)
        .bind(rule.kind.as_str())
        .bind(rule.enabled)
        .bind(rule.case_sensitive)
        .bind(rule.priority)
        .bind(OffsetDateTime::now_utc().unix_timestamp())
        .bind(&rule.id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, rule))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::RuleNotFound(rule.id.clone()));
        }
        self.publish().await
    }

    async fn delete_rule(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM rules WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::RuleNotFound(id.to_string()));
        }
        self.publish().await
    }

    async fn set_rule_enabled(&self, id: &str, enabled: bool) -> Result<()> {
        let result = sqlx::query("UPDATE rules SET enabled = ?, updated_at = ? WHERE id = ?")
            .bind(enabled)
            .bind(OffsetDateTime::now_utc().unix_timestamp())
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::RuleNotFound(id.to_string()));
        }
        self.publish().await
    }

    async fn next_priority(&self, kind: RuleKind) -> Result<i64> {
        let next: i64 =
            sqlx::query_scalar("SELECT COALESCE(MAX(priority), -1) + 1 FROM rules WHERE kind = ?")
                .bind(kind.as_str())
                .fetch_one(&self.pool)
                .await?;
        Ok(next)
    }

    async fn is_feature_enabled(&self, host: &str) -> Result<bool> {
        if let Some(value) = self.get_setting(&host_feature_key(host)).await? {
            return Ok(value == "true");
        }
        Ok(self
            .get_setting(GLOBAL_FEATURE_KEY)
            .await?
            .map(|value| value == "true")
            .unwrap_or(true))
    }

    async fn set_feature_enabled(&self, host: Option<&str>, enabled: bool) -> Result<()> {
        let key = match host {
            Some(host) => host_feature_key(host),
            None => GLOBAL_FEATURE_KEY.to_string(),
        };
        sqlx::query("INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(if enabled { "true" } else { "false" })
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Vec<Rule>> {
        self.rules_tx.subscribe()
    }
}

async fn migrate(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS rules (
            id TEXT PRIMARY KEY,
            match_text TEXT NOT NULL,
            replacement TEXT NOT NULL,
            kind TEXT NOT NULL,
            enabled INTEGER NOT NULL DEFAULT 1,
            case_sensitive INTEGER NOT NULL DEFAULT 0,
            priority INTEGER NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            UNIQUE(kind, priority)
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn load_rules(pool: &SqlitePool) -> Result<Vec<Rule>> {
    let rows = sqlx::query("SELECT * FROM rules ORDER BY kind, priority")
        .fetch_all(pool)
        .await?;
    rows.iter().map(row_to_rule).collect()
}

fn row_to_rule(row: &SqliteRow) -> Result<Rule> {
    let kind: String = row.try_get("kind")?;
    let kind: RuleKind = kind
        .parse()
        .map_err(|e| StoreError::Corrupt(format!("{e}")))?;

    let created_at: i64 = row.try_get("created_at")?;
    let updated_at: i64 = row.try_get("updated_at")?;

    Ok(Rule {
        id: row.try_get("id")?,
        match_text: row.try_get("match_text")?,
        replacement: row.try_get("replacement")?,
        kind,
        enabled: row.try_get("enabled")?,
        case_sensitive: row.try_get("case_sensitive")?,
        priority: row.try_get("priority")?,
        created_at: OffsetDateTime::from_unix_timestamp(created_at)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?,
        updated_at: OffsetDateTime::from_unix_timestamp(updated_at)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?,
    })
}

fn map_unique_violation(err: sqlx::Error, rule: &Rule) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return StoreError::DuplicatePriority {
                kind: rule.kind,
                priority: rule.priority,
            };
        }
    }
    StoreError::Database(err)
}

fn default_db_path() -> PathBuf {
    if let Some(dirs) = directories::ProjectDirs::from("com", "veil", "veil") {
        dirs.data_dir().join("veil.db")
    } else {
        PathBuf::from(".veil/veil.db")
    }
}
