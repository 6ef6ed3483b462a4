use anyhow::Result;
use veil_store::SqliteStore;

pub async fn handle(store: SqliteStore) -> Result<()> {
    veil_tui::run(store).await
}
