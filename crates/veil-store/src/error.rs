//! Error types for veil-store

use thiserror::Error;
use veil_core::RuleKind;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Rule not found: {0}")]
    RuleNotFound(String),

    #[error("Rule match text cannot be empty")]
    EmptyMatch,

    #[error("Priority {priority} already used by another {kind} rule")]
    DuplicatePriority { kind: RuleKind, priority: i64 },

    #[error("Corrupt rule row: {0}")]
    Corrupt(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
