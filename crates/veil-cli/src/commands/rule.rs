use std::path::PathBuf;

use anyhow::Result;
use veil_core::{Rule, RuleKind, builtin};
use veil_store::{RuleStore, SqliteStore, StoreError};

use crate::cli::RuleCommands;

pub async fn handle(cmd: RuleCommands, store: &SqliteStore) -> Result<()> {
    match cmd {
        RuleCommands::Add {
            match_text,
            replacement,
            pattern,
            case_sensitive,
            priority,
            disabled,
        } => {
            add(
                store,
                match_text,
                replacement,
                pattern,
                case_sensitive,
                priority,
                disabled,
            )
            .await
        }
        RuleCommands::List => list(store).await,
        RuleCommands::Remove { id } => remove(store, id).await,
        RuleCommands::Enable { id } => set_enabled(store, id, true).await,
        RuleCommands::Disable { id } => set_enabled(store, id, false).await,
        RuleCommands::Export { output } => export(store, output).await,
        RuleCommands::Import { file, replace } => import(store, file, replace).await,
        RuleCommands::Seed => seed(store).await,
    }
}

async fn add(
    store: &SqliteStore,
    match_text: String,
    replacement: String,
    pattern: bool,
    case_sensitive: bool,
    priority: Option<i64>,
    disabled: bool,
) -> Result<()> {
    let kind = if pattern {
        RuleKind::Pattern
    } else {
        RuleKind::Literal
    };
    let priority = match priority {
        Some(p) => p,
        None => store.next_priority(kind).await?,
    };

    let rule = Rule::new(match_text, replacement, kind)
        .with_priority(priority)
        .with_case_sensitive(case_sensitive)
        .with_enabled(!disabled);
    store.create_rule(&rule).await?;

    println!("✓ Added {} rule: {}", rule.kind, rule.match_text);
    println!("  ID: {}", rule.id);
    println!("  Priority: {}", rule.priority);

    Ok(())
}

async fn list(store: &SqliteStore) -> Result<()> {
    let rules = store.list_rules().await?;

    if rules.is_empty() {
        println!("No rules found.");
        return Ok(());
    }

    println!("Rules:");
    for rule in rules {
        let state = if rule.enabled { "" } else { " (disabled)" };
        println!(
            "  [{}] {:?} -> {:?}{}",
            rule.id, rule.match_text, rule.replacement, state
        );
        println!(
            "    kind: {}, priority: {}, case_sensitive: {}",
            rule.kind, rule.priority, rule.case_sensitive
        );
    }

    Ok(())
}

async fn remove(store: &SqliteStore, id: String) -> Result<()> {
    store.delete_rule(&id).await?;
    println!("✓ Removed rule: {}", id);
    Ok(())
}

async fn set_enabled(store: &SqliteStore, id: String, enabled: bool) -> Result<()> {
    store.set_rule_enabled(&id, enabled).await?;
    println!(
        "✓ {} rule: {}",
        if enabled { "Enabled" } else { "Disabled" },
        id
    );
    Ok(())
}

async fn export(store: &SqliteStore, output: Option<PathBuf>) -> Result<()> {
    let rules = store.list_rules().await?;
    let json = serde_json::to_string_pretty(&rules)?;

    match output {
        Some(path) => {
            std::fs::write(&path, json)?;
            println!("✓ Exported {} rule(s) to {}", rules.len(), path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}

async fn import(store: &SqliteStore, file: PathBuf, replace: bool) -> Result<()> {
    let content = std::fs::read_to_string(&file)?;
    let rules: Vec<Rule> = serde_json::from_str(&content)?;

    if replace {
        for existing in store.list_rules().await? {
            store.delete_rule(&existing.id).await?;
        }
    }

    let mut imported = 0usize;
    let mut reassigned = 0usize;
    for mut rule in rules {
        match store.create_rule(&rule).await {
            Ok(()) => imported += 1,
            Err(StoreError::DuplicatePriority { kind, .. }) => {
                // Keep the backup's rule, take the next free slot.
                rule.priority = store.next_priority(kind).await?;
                store.create_rule(&rule).await?;
                imported += 1;
                reassigned += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    println!("✓ Imported {} rule(s) from {}", imported, file.display());
    if reassigned > 0 {
        println!("  {} rule(s) got a new priority to avoid clashes", reassigned);
    }

    Ok(())
}

async fn seed(store: &SqliteStore) -> Result<()> {
    let base = store.next_priority(RuleKind::Pattern).await?;
    let rules = builtin::seed_rules(base);
    let count = rules.len();

    for rule in &rules {
        store.create_rule(rule).await?;
    }

    println!("✓ Seeded {} template rule(s)", count);
    for (template, rule) in builtin::templates().iter().zip(&rules) {
        println!("  {} -> {} [{}]", template.name, template.placeholder, rule.id);
    }

    Ok(())
}
