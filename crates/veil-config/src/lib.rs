//! Configuration for veil
//!
//! A TOML file holding the global enable flag and the per-site selector
//! profiles: which hosts a profile covers, what a message container and an
//! editable surface look like there, and the optional save/cancel
//! triggers. Selector strings are passed through to the host page
//! unchanged.

use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_sites")]
    pub sites: Vec<SiteProfile>,
}

/// Selector table for one site family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteProfile {
    pub name: String,

    /// Host glob patterns this profile covers.
    pub hosts: Vec<String>,

    /// Message container selector; `"*"` means the whole page.
    #[serde(default = "default_container")]
    pub container: String,

    /// Editable surface selector.
    pub surface: String,

    #[serde(default)]
    pub save: Option<String>,

    #[serde(default)]
    pub cancel: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            sites: default_sites(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_container() -> String {
    "*".to_string()
}

fn default_sites() -> Vec<SiteProfile> {
    vec![
        SiteProfile {
            name: "chatgpt".to_string(),
            hosts: vec!["chatgpt.com".to_string(), "*.chatgpt.com".to_string()],
            container: "*".to_string(),
            surface: "div#prompt-textarea[contenteditable]".to_string(),
            save: None,
            cancel: None,
        },
        SiteProfile {
            name: "claude".to_string(),
            hosts: vec!["claude.ai".to_string()],
            container: "div[data-testid=chat-input-container]".to_string(),
            surface: "div.ProseMirror[contenteditable]".to_string(),
            save: None,
            cancel: None,
        },
        SiteProfile {
            name: "gemini".to_string(),
            hosts: vec!["gemini.google.com".to_string()],
            container: "*".to_string(),
            surface: "div.ql-editor[contenteditable]".to_string(),
            save: None,
            cancel: None,
        },
    ]
}

impl Config {
    /// Load config from the default location or create it with defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path();

        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = Config::default();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let content = toml::to_string_pretty(&config)?;
            std::fs::write(&path, content)?;
            Ok(config)
        }
    }

    /// Get config file path
    pub fn config_path() -> PathBuf {
        if let Some(dirs) = directories::ProjectDirs::from("com", "veil", "veil") {
            dirs.config_dir().join("config.toml")
        } else {
            PathBuf::from("~/.veil/config.toml")
        }
    }

    /// The profile covering `host`, if any.
    pub fn profile_for(&self, host: &str) -> Option<&SiteProfile> {
        self.sites.iter().find(|site| {
            site.hosts
                .iter()
                .filter_map(|h| Pattern::new(h).ok())
                .any(|pattern| pattern.matches(host))
        })
    }
}
