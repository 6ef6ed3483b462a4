use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "veil")]
#[command(about = "Redact sensitive text before it reaches AI chats", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage rewrite rules
    #[command(subcommand)]
    Rule(RuleCommands),

    /// Rewrite text, original -> placeholder
    Redact {
        /// Text to redact; stdin when omitted
        text: Option<String>,

        /// Read input from a file instead
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Rewrite text, placeholder -> original
    Restore {
        /// Text to restore; stdin when omitted
        text: Option<String>,

        /// Read input from a file instead
        #[arg(long)]
        file: Option<PathBuf>,

        /// Also write the restored text to the system clipboard
        #[arg(long)]
        copy: bool,
    },

    /// Show configured site profiles
    Sites,

    /// Turn redaction on, globally or for one host
    Enable {
        #[arg(long)]
        host: Option<String>,
    },

    /// Turn redaction off, globally or for one host
    Disable {
        #[arg(long)]
        host: Option<String>,
    },

    /// Launch the interactive UI
    Ui,
}

#[derive(Subcommand)]
pub enum RuleCommands {
    /// Add a rule
    Add {
        /// Text to find
        match_text: String,

        /// Placeholder to substitute (may be empty)
        replacement: String,

        /// Treat the match as a regular expression
        #[arg(long)]
        pattern: bool,

        /// Match case-sensitively
        #[arg(long)]
        case_sensitive: bool,

        /// Ordering within the kind group (default: next free)
        #[arg(long)]
        priority: Option<i64>,

        /// Create the rule disabled
        #[arg(long)]
        disabled: bool,
    },

    /// List all rules
    List,

    /// Remove a rule
    Remove {
        /// Rule id
        id: String,
    },

    /// Enable a rule
    Enable {
        /// Rule id
        id: String,
    },

    /// Disable a rule
    Disable {
        /// Rule id
        id: String,
    },

    /// Export all rules as JSON
    Export {
        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Import rules from a JSON backup
    Import {
        /// Backup file produced by `rule export`
        file: PathBuf,

        /// Delete existing rules first
        #[arg(long)]
        replace: bool,
    },

    /// Insert the built-in template rules
    Seed,
}
