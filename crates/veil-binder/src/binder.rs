//! Surface binder

use std::sync::Arc;

use tracing::debug;
use veil_core::{Rule, redact};
use veil_page::EditableSurface;
use veil_page::flat::splice_chars;

use crate::guard::EchoGuard;

/// What the host should do with the physical paste event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum PasteAction {
    /// No rule applied; let the default insertion proceed.
    PassThrough,
    /// The binder inserted the redacted payload; suppress the default.
    Handled,
}

/// Live synchronization between one editable surface and the rewrite
/// engine.
///
/// The binder never owns the surface; the host routes each physical event
/// here together with mutable access to the surface it fired on. With the
/// feature disabled, an empty rule snapshot, or after detach, every hook is
/// a pass-through that alters nothing.
#[derive(Debug)]
pub struct SurfaceBinder {
    rules: Arc<Vec<Rule>>,
    enabled: bool,
    guard: EchoGuard,
    detached: bool,
}

impl SurfaceBinder {
    pub fn new(rules: Arc<Vec<Rule>>) -> Self {
        Self {
            rules,
            enabled: true,
            guard: EchoGuard::default(),
            detached: false,
        }
    }

    fn active(&self) -> bool {
        !self.detached && self.enabled && !self.rules.is_empty()
    }

    /// Handle a user-initiated modification of the surface.
    ///
    /// The caret lands at `old_offset + length_diff`, clamped into the new
    /// text — an approximation that assumes the length change happened at
    /// or before the caret. When several non-adjacent spans change in one
    /// pass the placement can be off; this is accepted, not corrected.
    pub fn handle_input(&mut self, surface: &mut dyn EditableSurface) {
        if self.guard.absorb() {
            return;
        }
        if !self.active() {
            return;
        }

        let old = surface.logical_text();
        let result = redact(&old, &self.rules);
        if !result.changed() {
            return;
        }

        let (caret, _) = surface.selection();
        let old_len = old.chars().count() as i64;
        let new_len = result.text.chars().count() as i64;
        let target = (caret as i64 + (new_len - old_len)).clamp(0, new_len) as usize;

        debug!(rules = result.applied.len(), "rewrote surface content");
        surface.set_text(&result.text);
        surface.set_caret(target);
        self.guard.arm();
        surface.notify_changed();
    }

    /// Handle a paste targeting the surface.
    ///
    /// Only the pasted payload is redacted, not the whole surface. When a
    /// rule applies, the redacted payload replaces the current selection
    /// and the caret moves to just after it.
    pub fn handle_paste(&mut self, surface: &mut dyn EditableSurface, pasted: &str) -> PasteAction {
        if !self.active() {
            return PasteAction::PassThrough;
        }

        let result = redact(pasted, &self.rules);
        if !result.changed() {
            return PasteAction::PassThrough;
        }

        let text = surface.logical_text();
        let (start, end) = surface.selection();
        let spliced = splice_chars(&text, start, end, &result.text);

        surface.set_text(&spliced);
        surface.set_caret(start + result.text.chars().count());
        self.guard.arm();
        surface.notify_changed();
        PasteAction::Handled
    }

    /// Swap in a new rule snapshot; takes effect on the next event, no
    /// re-scan of existing content.
    pub fn update_rules(&mut self, rules: Arc<Vec<Rule>>) {
        self.rules = rules;
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Drop all behavior. Idempotent.
    pub fn detach(&mut self) {
        self.detached = true;
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veil_core::Rule;
    use veil_page::{BlockSurface, FlatSurface};

    fn snapshot(rules: Vec<Rule>) -> Arc<Vec<Rule>> {
        Arc::new(rules)
    }

    #[test]
    fn test_input_redacts_and_moves_caret() {
        let mut binder = SurfaceBinder::new(snapshot(vec![Rule::literal("Sam", "{name}")]));
        let mut surface = FlatSurface::with_text("My name is Sam");

        binder.handle_input(&mut surface);

        assert_eq!(surface.value(), "My name is {name}");
        // 14 + (17 - 14)
        assert_eq!(surface.selection(), (17, 17));
        assert_eq!(surface.change_notifications(), 1);
    }

    #[test]
    fn test_caret_clamped_at_zero() {
        let mut binder = SurfaceBinder::new(snapshot(vec![Rule::literal("XXXX", "")]));
        let mut surface = FlatSurface::with_text("XXXXab");
        surface.set_caret(1);

        binder.handle_input(&mut surface);

        assert_eq!(surface.value(), "ab");
        assert_eq!(surface.selection(), (0, 0));
    }

    #[test]
    fn test_no_rule_applied_leaves_surface_alone() {
        let mut binder = SurfaceBinder::new(snapshot(vec![Rule::literal("absent", "[X]")]));
        let mut surface = FlatSurface::with_text("plain text");

        binder.handle_input(&mut surface);

        assert_eq!(surface.value(), "plain text");
        assert_eq!(surface.change_notifications(), 0);
    }

    #[test]
    fn test_guard_absorbs_single_echo() {
        // A growing rule makes re-entry observable: each genuine pass
        // doubles the run of a's.
        let mut binder = SurfaceBinder::new(snapshot(vec![Rule::pattern("a", "aa")]));
        let mut surface = FlatSurface::with_text("a");

        binder.handle_input(&mut surface);
        assert_eq!(surface.value(), "aa");
        assert_eq!(surface.change_notifications(), 1);

        // The synthetic notification echoes back; the guard eats it.
        binder.handle_input(&mut surface);
        assert_eq!(surface.value(), "aa");
        assert_eq!(surface.change_notifications(), 1);

        // The next genuine edit is processed again.
        binder.handle_input(&mut surface);
        assert_eq!(surface.value(), "aaaa");
        assert_eq!(surface.change_notifications(), 2);
    }

    #[test]
    fn test_paste_intercepts_and_positions_caret() {
        let mut binder = SurfaceBinder::new(snapshot(vec![Rule::literal("555-1234", "[PHONE]")]));
        let mut surface = FlatSurface::with_text("call ");

        let action = binder.handle_paste(&mut surface, "555-1234");

        assert_eq!(action, PasteAction::Handled);
        assert_eq!(surface.value(), "call [PHONE]");
        assert_eq!(surface.selection(), (12, 12));
        assert_eq!(surface.change_notifications(), 1);
    }

    #[test]
    fn test_paste_replaces_selection() {
        let mut binder = SurfaceBinder::new(snapshot(vec![Rule::literal("555-1234", "[PHONE]")]));
        let mut surface = FlatSurface::with_text("call NUM now");
        surface.select(5, 8);

        let action = binder.handle_paste(&mut surface, "555-1234");

        assert_eq!(action, PasteAction::Handled);
        assert_eq!(surface.value(), "call [PHONE] now");
        assert_eq!(surface.selection(), (12, 12));
    }

    #[test]
    fn test_paste_passes_through_when_clean() {
        let mut binder = SurfaceBinder::new(snapshot(vec![Rule::literal("secret", "[S]")]));
        let mut surface = FlatSurface::with_text("note: ");

        let action = binder.handle_paste(&mut surface, "hello");

        assert_eq!(action, PasteAction::PassThrough);
        assert_eq!(surface.value(), "note: ");
        assert_eq!(surface.change_notifications(), 0);
    }

    #[test]
    fn test_disabled_and_empty_rules_are_noops() {
        let mut surface = FlatSurface::with_text("my secret");

        let mut empty = SurfaceBinder::new(snapshot(vec![]));
        empty.handle_input(&mut surface);
        assert_eq!(surface.value(), "my secret");

        let mut disabled = SurfaceBinder::new(snapshot(vec![Rule::literal("secret", "[S]")]));
        disabled.set_enabled(false);
        disabled.handle_input(&mut surface);
        assert_eq!(
            disabled.handle_paste(&mut surface, "secret"),
            PasteAction::PassThrough
        );
        assert_eq!(surface.value(), "my secret");
    }

    #[test]
    fn test_detach_is_idempotent_and_final() {
        let mut binder = SurfaceBinder::new(snapshot(vec![Rule::literal("secret", "[S]")]));
        let mut surface = FlatSurface::with_text("secret");

        binder.detach();
        binder.detach();
        binder.handle_input(&mut surface);

        assert!(binder.is_detached());
        assert_eq!(surface.value(), "secret");
    }

    #[test]
    fn test_rule_update_applies_on_next_event() {
        let mut binder = SurfaceBinder::new(snapshot(vec![]));
        let mut surface = FlatSurface::with_text("my secret");

        binder.handle_input(&mut surface);
        assert_eq!(surface.value(), "my secret");

        binder.update_rules(snapshot(vec![Rule::literal("secret", "[S]")]));
        binder.handle_input(&mut surface);
        assert_eq!(surface.value(), "my [S]");
    }

    #[test]
    fn test_block_surface_rewrite() {
        let mut binder = SurfaceBinder::new(snapshot(vec![Rule::literal("Sam", "{name}")]));
        let mut surface =
            BlockSurface::with_blocks(vec!["hello Sam".to_string(), "bye Sam".to_string()]);

        binder.handle_input(&mut surface);

        assert_eq!(surface.blocks(), &["hello {name}".to_string(), "bye {name}".to_string()]);
        assert_eq!(surface.change_notifications(), 1);
    }
}
