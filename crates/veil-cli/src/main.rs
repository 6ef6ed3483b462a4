mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use veil_store::SqliteStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = cli::Cli::parse();

    // Open the rule store once (creates the database and runs migrations)
    let store = SqliteStore::new(None).await?;

    match cli.command {
        cli::Commands::Rule(rule_cmd) => commands::rule::handle(rule_cmd, &store).await,
        cli::Commands::Redact { text, file } => {
            commands::rewrite::redact(&store, text, file).await
        }
        cli::Commands::Restore { text, file, copy } => {
            commands::rewrite::restore(&store, text, file, copy).await
        }
        cli::Commands::Sites => commands::site::list(),
        cli::Commands::Enable { host } => {
            commands::feature::set(&store, host.as_deref(), true).await
        }
        cli::Commands::Disable { host } => {
            commands::feature::set(&store, host.as_deref(), false).await
        }
        cli::Commands::Ui => commands::ui::handle(store).await,
    }
}
