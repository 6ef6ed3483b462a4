use std::io::Read;
use std::path::PathBuf;

use anyhow::Result;
use veil_clipboard::{ClipboardPayload, SystemClipboard};
use veil_store::{RuleStore, SqliteStore};

pub async fn redact(
    store: &SqliteStore,
    text: Option<String>,
    file: Option<PathBuf>,
) -> Result<()> {
    let input = read_input(text, file)?;
    let rules = store.list_rules().await?;

    let result = veil_core::redact(&input, &rules);
    println!("{}", result.text);
    if result.changed() {
        eprintln!("✓ {} rule(s) applied", result.applied.len());
    }

    Ok(())
}

pub async fn restore(
    store: &SqliteStore,
    text: Option<String>,
    file: Option<PathBuf>,
    copy: bool,
) -> Result<()> {
    let input = read_input(text, file)?;
    let rules = store.list_rules().await?;

    let restored = veil_core::unredact(&input, &rules);
    println!("{}", restored);

    if copy {
        let mut clipboard = SystemClipboard::new()?;
        clipboard.write(&ClipboardPayload {
            text: restored,
            html: None,
        })?;
        eprintln!("✓ Copied to clipboard");
    }

    Ok(())
}

fn read_input(text: Option<String>, file: Option<PathBuf>) -> Result<String> {
    match (text, file) {
        (Some(text), _) => Ok(text),
        (None, Some(path)) => Ok(std::fs::read_to_string(path)?),
        (None, None) => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}
