//! Copy interceptor

use std::sync::Arc;

use tracing::warn;
use veil_core::{Rule, unredact};
use veil_page::{Fragment, NodeId, Page};

/// The selection at the moment of a copy event: its plain text, and the
/// markup fragment when the host can provide one.
#[derive(Debug, Clone)]
pub struct Selection {
    pub text: String,
    pub html: Option<Fragment>,
}

impl Selection {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            html: None,
        }
    }

    pub fn with_html(text: impl Into<String>, html: Fragment) -> Self {
        Self {
            text: text.into(),
            html: Some(html),
        }
    }
}

/// Replacement clipboard content for an intercepted copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardPayload {
    pub text: String,
    pub html: Option<String>,
}

/// Restores redacted selections on copy.
#[derive(Debug)]
pub struct CopyInterceptor {
    rules: Arc<Vec<Rule>>,
    scope: Option<String>,
    enabled: bool,
}

impl CopyInterceptor {
    /// Page-wide interceptor.
    pub fn new(rules: Arc<Vec<Rule>>) -> Self {
        Self {
            rules,
            scope: None,
            enabled: true,
        }
    }

    /// Interceptor limited to copies inside elements matching `scope`.
    pub fn scoped(rules: Arc<Vec<Rule>>, scope: impl Into<String>) -> Self {
        Self {
            rules,
            scope: Some(scope.into()),
            enabled: true,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Swap in a new rule snapshot. Copy events handled after this call
    /// returns only ever see the new snapshot.
    pub fn update_rules(&mut self, rules: Arc<Vec<Rule>>) {
        self.rules = rules;
    }

    /// Handle a copy event on `target`. `None` means the default copy
    /// proceeds untouched.
    pub fn handle_copy(
        &self,
        page: &impl Page,
        target: NodeId,
        selection: &Selection,
    ) -> Option<ClipboardPayload> {
        if let Some(scope) = &self.scope {
            page.closest(target, scope)?;
        }
        self.restore_selection(selection)
    }

    /// Scope-free restoration of a selection, for hosts without a page
    /// tree.
    pub fn restore_selection(&self, selection: &Selection) -> Option<ClipboardPayload> {
        if !self.enabled || self.rules.is_empty() || selection.text.is_empty() {
            return None;
        }

        let restored = unredact(&selection.text, &self.rules);
        if restored == selection.text {
            return None;
        }

        let html = selection.html.as_ref().and_then(|fragment| {
            let mapped = fragment.map_text(&|leaf| unredact(leaf, &self.rules));
            match mapped.to_html() {
                Ok(html) => Some(html),
                Err(err) => {
                    warn!(error = %err, "dropping html clipboard payload");
                    None
                }
            }
        });

        Some(ClipboardPayload {
            text: restored,
            html,
        })
    }
}
