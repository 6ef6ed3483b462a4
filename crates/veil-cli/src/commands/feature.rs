use anyhow::Result;
use veil_store::{RuleStore, SqliteStore};

pub async fn set(store: &SqliteStore, host: Option<&str>, enabled: bool) -> Result<()> {
    store.set_feature_enabled(host, enabled).await?;

    let scope = host.unwrap_or("all hosts");
    println!(
        "✓ Redaction {} for {}",
        if enabled { "enabled" } else { "disabled" },
        scope
    );

    Ok(())
}
