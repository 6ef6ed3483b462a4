use std::sync::Arc;

use anyhow::Result;
use veil_binder::{PasteAction, SurfaceBinder};
use veil_clipboard::{CopyInterceptor, Selection, SystemClipboard};
use veil_core::{Rule, RuleKind, unredact};
use veil_page::flat::splice_chars;
use veil_page::{EditableSurface, FlatSurface};
use veil_store::{RuleStore, SqliteStore};

#[derive(PartialEq)]
pub enum InputMode {
    Normal,
    Composing,
    AddingRule,
    ConfirmDelete,
}

pub struct App {
    pub store: SqliteStore,
    pub rules: Vec<Rule>,
    snapshot: Arc<Vec<Rule>>,
    pub selected_rule: usize,
    pub input_mode: InputMode,
    pub input_buffer: String,
    pub compose: FlatSurface,
    binder: SurfaceBinder,
    interceptor: CopyInterceptor,
    pub status_message: Option<String>,
}

impl App {
    pub async fn new(store: SqliteStore) -> Result<Self> {
        let rules = store.list_rules().await?;
        let snapshot = Arc::new(rules.clone());
        Ok(Self {
            store,
            rules,
            snapshot: snapshot.clone(),
            selected_rule: 0,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            compose: FlatSurface::new(),
            binder: SurfaceBinder::new(snapshot.clone()),
            interceptor: CopyInterceptor::new(snapshot),
            status_message: None,
        })
    }

    /// Reload rules and re-snapshot the binder and interceptor.
    pub async fn refresh(&mut self) -> Result<()> {
        self.rules = self.store.list_rules().await?;
        if self.selected_rule >= self.rules.len() && !self.rules.is_empty() {
            self.selected_rule = self.rules.len() - 1;
        }
        self.snapshot = Arc::new(self.rules.clone());
        self.binder.update_rules(self.snapshot.clone());
        self.interceptor.update_rules(self.snapshot.clone());
        Ok(())
    }

    pub fn next(&mut self) {
        if !self.rules.is_empty() {
            self.selected_rule = (self.selected_rule + 1) % self.rules.len();
        }
    }

    pub fn previous(&mut self) {
        if self.rules.is_empty() {
            return;
        }
        self.selected_rule = if self.selected_rule == 0 {
            self.rules.len() - 1
        } else {
            self.selected_rule - 1
        };
    }

    pub async fn toggle_selected(&mut self) -> Result<()> {
        if let Some(rule) = self.rules.get(self.selected_rule) {
            let id = rule.id.clone();
            let enabled = !rule.enabled;
            match self.store.set_rule_enabled(&id, enabled).await {
                Ok(()) => self.refresh().await?,
                Err(e) => self.status_message = Some(format!("Failed to toggle: {}", e)),
            }
        }
        Ok(())
    }

    pub fn start_add_rule(&mut self) {
        self.input_mode = InputMode::AddingRule;
        self.input_buffer.clear();
    }

    pub fn start_delete(&mut self) {
        if !self.rules.is_empty() {
            self.input_mode = InputMode::ConfirmDelete;
        }
    }

    pub fn start_compose(&mut self) {
        self.input_mode = InputMode::Composing;
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
    }

    pub fn input_char(&mut self, c: char) {
        self.input_buffer.push(c);
    }

    pub fn input_backspace(&mut self) {
        self.input_buffer.pop();
    }

    pub async fn confirm_add_rule(&mut self) -> Result<()> {
        let entry = self.input_buffer.trim().to_string();
        let Some((match_part, replacement)) = entry.split_once("=>") else {
            self.status_message =
                Some("Format: match => replacement (prefix re: for patterns)".to_string());
            self.cancel_input();
            return Ok(());
        };

        let match_part = match_part.trim();
        let replacement = replacement.trim().to_string();
        let (kind, match_text) = match match_part.strip_prefix("re:") {
            Some(rest) => (RuleKind::Pattern, rest.trim().to_string()),
            None => (RuleKind::Literal, match_part.to_string()),
        };
        if match_text.is_empty() {
            self.status_message = Some("Match text cannot be empty".to_string());
            self.cancel_input();
            return Ok(());
        }

        let priority = self.store.next_priority(kind).await?;
        let rule = Rule::new(match_text.clone(), replacement, kind).with_priority(priority);
        match self.store.create_rule(&rule).await {
            Ok(()) => {
                self.status_message = Some(format!("Added: {}", match_text));
                self.refresh().await?;
            }
            Err(e) => self.status_message = Some(format!("Failed to add: {}", e)),
        }

        self.cancel_input();
        Ok(())
    }

    pub async fn confirm_delete(&mut self) -> Result<()> {
        if let Some(rule) = self.rules.get(self.selected_rule) {
            let id = rule.id.clone();
            match self.store.delete_rule(&id).await {
                Ok(()) => {
                    self.status_message = Some("Rule deleted".to_string());
                    self.refresh().await?;
                }
                Err(e) => self.status_message = Some(format!("Failed to delete: {}", e)),
            }
        }
        self.cancel_input();
        Ok(())
    }

    pub fn compose_char(&mut self, c: char) {
        self.compose.insert_char(c);
        self.route_change();
    }

    pub fn compose_backspace(&mut self) {
        self.compose.backspace();
        self.route_change();
    }

    pub fn compose_caret_left(&mut self) {
        let (start, _) = self.compose.selection();
        self.compose.set_caret(start.saturating_sub(1));
    }

    pub fn compose_caret_right(&mut self) {
        let (_, end) = self.compose.selection();
        self.compose.set_caret(end + 1);
    }

    pub fn compose_paste(&mut self, text: &str) {
        match self.binder.handle_paste(&mut self.compose, text) {
            PasteAction::Handled => {
                // Echo of the binder's own write.
                self.binder.handle_input(&mut self.compose);
            }
            PasteAction::PassThrough => {
                // Default insertion, then the resulting input event.
                let (start, end) = self.compose.selection();
                let value = self.compose.logical_text();
                self.compose.set_text(&splice_chars(&value, start, end, text));
                self.compose.set_caret(start + text.chars().count());
                self.route_change();
            }
        }
    }

    /// Route an edit through the binder; when the binder rewrote the
    /// surface, feed its synthetic notification back in the way a host
    /// input event would arrive.
    fn route_change(&mut self) {
        let before = self.compose.change_notifications();
        self.binder.handle_input(&mut self.compose);
        if self.compose.change_notifications() > before {
            self.binder.handle_input(&mut self.compose);
        }
    }

    /// Restored preview of the composed text.
    pub fn restored(&self) -> String {
        unredact(self.compose.value(), &self.snapshot)
    }

    pub fn copy_restored(&mut self) {
        let selection = Selection::plain(self.compose.value());
        match self.interceptor.restore_selection(&selection) {
            Some(payload) => {
                match SystemClipboard::new().and_then(|mut clipboard| clipboard.write(&payload)) {
                    Ok(()) => self.status_message = Some("Copied restored text".to_string()),
                    Err(e) => self.status_message = Some(format!("Clipboard error: {}", e)),
                }
            }
            None => self.status_message = Some("Nothing to restore".to_string()),
        }
    }
}
