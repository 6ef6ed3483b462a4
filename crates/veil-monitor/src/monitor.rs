//! Discovery monitor

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;
use veil_binder::{PasteAction, SurfaceBinder};
use veil_core::Rule;
use veil_page::{NodeId, Page, PageEvent, Scope};

/// Selector descriptions for one site.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Message containers a surface must sit inside; `Scope::Page` binds
    /// every match unconditionally.
    pub container: Scope,
    /// The editable surface description.
    pub surface: String,
    /// Optional completion triggers, scoped to the surface's container.
    pub save: Option<String>,
    pub cancel: Option<String>,
}

impl MonitorConfig {
    pub fn page_wide(surface: impl Into<String>) -> Self {
        Self {
            container: Scope::Page,
            surface: surface.into(),
            save: None,
            cancel: None,
        }
    }
}

/// What the host should do with the physical event's default behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum EventDisposition {
    Allow,
    Suppress,
}

/// Watches the page and manages one binder per qualifying editable
/// surface.
pub struct DiscoveryMonitor {
    config: MonitorConfig,
    rules: Arc<Vec<Rule>>,
    enabled: bool,
    active: HashMap<NodeId, SurfaceBinder>,
    shut_down: bool,
}

impl DiscoveryMonitor {
    pub fn new(config: MonitorConfig, rules: Arc<Vec<Rule>>) -> Self {
        Self {
            config,
            rules,
            enabled: true,
            active: HashMap::new(),
            shut_down: false,
        }
    }

    /// Construct and immediately bind everything already on the page.
    pub fn attach(config: MonitorConfig, rules: Arc<Vec<Rule>>, page: &impl Page) -> Self {
        let mut monitor = Self::new(config, rules);
        monitor.scan(page);
        monitor
    }

    /// Bind every surface already present on the page.
    pub fn scan(&mut self, page: &impl Page) {
        let matches = page.query(&self.config.surface);
        for node in matches {
            self.try_bind(page, node);
        }
    }

    /// Feed one page event through the monitor.
    pub fn handle_event(&mut self, page: &mut impl Page, event: PageEvent) -> EventDisposition {
        if self.shut_down {
            return EventDisposition::Allow;
        }

        match event {
            PageEvent::NodeAdded(node) => {
                self.try_bind(&*page, node);
                let descendants = page.query_within(node, &self.config.surface);
                for descendant in descendants {
                    self.try_bind(&*page, descendant);
                }
            }
            PageEvent::AttributeChanged(node) => {
                self.try_bind(&*page, node);
            }
            PageEvent::NodeRemoved(_) => {
                // The event names the removed root; anything bound that is
                // no longer attached went with it.
                let gone: Vec<NodeId> = self
                    .active
                    .keys()
                    .copied()
                    .filter(|&n| !page.is_attached(n))
                    .collect();
                for node in gone {
                    self.complete(node);
                }
            }
            PageEvent::Clicked(node) => {
                self.handle_click(&*page, node);
            }
            PageEvent::Input(node) => {
                if let Some(binder) = self.active.get_mut(&node) {
                    if let Some(surface) = page.surface_mut(node) {
                        binder.handle_input(surface);
                    }
                }
            }
            PageEvent::Pasted { node, text } => {
                if let Some(binder) = self.active.get_mut(&node) {
                    if let Some(surface) = page.surface_mut(node) {
                        if binder.handle_paste(surface, &text) == PasteAction::Handled {
                            return EventDisposition::Suppress;
                        }
                    }
                }
            }
        }
        EventDisposition::Allow
    }

    /// Bootstrap helper: scan now, then drain events until the first
    /// surface binds or the deadline passes. Never blocks past `wait`.
    pub async fn wait_for_surface(
        &mut self,
        page: &mut impl Page,
        events: &mut mpsc::Receiver<PageEvent>,
        wait: Duration,
    ) -> bool {
        self.scan(&*page);
        if !self.active.is_empty() {
            return true;
        }

        let _ = tokio::time::timeout(wait, async {
            while let Some(event) = events.recv().await {
                let _ = self.handle_event(page, event);
                if !self.active.is_empty() {
                    break;
                }
            }
        })
        .await;

        !self.active.is_empty()
    }

    /// Push a new rule snapshot to every active binder.
    pub fn update_rules(&mut self, rules: Arc<Vec<Rule>>) {
        self.rules = rules.clone();
        for binder in self.active.values_mut() {
            binder.update_rules(rules.clone());
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        for binder in self.active.values_mut() {
            binder.set_enabled(enabled);
        }
    }

    /// Destroy every binder and ignore all further events. Idempotent.
    pub fn shutdown(&mut self) {
        for (_, mut binder) in self.active.drain() {
            binder.detach();
        }
        self.shut_down = true;
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn is_bound(&self, node: NodeId) -> bool {
        self.active.contains_key(&node)
    }

    fn qualifies(&self, page: &impl Page, node: NodeId) -> bool {
        if !page.is_attached(node) || !page.is_editable(node) {
            return false;
        }
        if !page.matches(node, &self.config.surface) {
            return false;
        }
        match &self.config.container {
            Scope::Page => true,
            Scope::Selector(selector) => page.closest(node, selector).is_some(),
        }
    }

    fn try_bind(&mut self, page: &impl Page, node: NodeId) {
        if self.active.contains_key(&node) || !self.qualifies(page, node) {
            return;
        }
        let mut binder = SurfaceBinder::new(self.rules.clone());
        binder.set_enabled(self.enabled);
        self.active.insert(node, binder);
        debug!(%node, "bound editable surface");
    }

    fn handle_click(&mut self, page: &impl Page, node: NodeId) {
        let on_trigger = [&self.config.save, &self.config.cancel]
            .into_iter()
            .flatten()
            .any(|selector| page.closest(node, selector).is_some());
        if !on_trigger {
            return;
        }

        let scope = self.config.container.clone();
        match &scope {
            // Page-wide scope has no container to narrow by; the trigger
            // ends every active session.
            Scope::Page => {
                let all: Vec<NodeId> = self.active.keys().copied().collect();
                for n in all {
                    self.complete(n);
                }
            }
            Scope::Selector(selector) => {
                if let Some(container) = page.closest(node, selector) {
                    let same_container: Vec<NodeId> = self
                        .active
                        .keys()
                        .copied()
                        .filter(|&n| page.closest(n, selector) == Some(container))
                        .collect();
                    for n in same_container {
                        self.complete(n);
                    }
                }
            }
        }
    }

    /// Tear down one element's binder. Removal from the active set makes
    /// every completion path one-shot.
    fn complete(&mut self, node: NodeId) {
        if let Some(mut binder) = self.active.remove(&node) {
            binder.detach();
            debug!(%node, "unbound editable surface");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veil_page::MemoryPage;

    fn rules() -> Arc<Vec<Rule>> {
        Arc::new(vec![Rule::literal("secret", "[S]")])
    }

    fn config() -> MonitorConfig {
        MonitorConfig {
            container: Scope::Selector("message".to_string()),
            surface: "editor".to_string(),
            save: Some("save".to_string()),
            cancel: Some("cancel".to_string()),
        }
    }

    #[test]
    fn test_scan_binds_qualifying_surfaces_only() {
        let mut page = MemoryPage::new();
        let container = page.add_node(None, &["message"]);
        let inside = page.add_editable(Some(container), &["editor"], "");
        let outside = page.add_editable(None, &["editor"], "");
        let not_editable = page.add_node(Some(container), &["editor"]);

        let mut monitor = DiscoveryMonitor::new(config(), rules());
        monitor.scan(&page);

        assert!(monitor.is_bound(inside));
        assert!(!monitor.is_bound(outside));
        assert!(!monitor.is_bound(not_editable));
        assert_eq!(monitor.active_count(), 1);
    }

    #[test]
    fn test_page_scope_binds_unconditionally() {
        let mut page = MemoryPage::new();
        let loose = page.add_editable(None, &["editor"], "");

        let mut monitor = DiscoveryMonitor::new(MonitorConfig::page_wide("editor"), rules());
        monitor.scan(&page);

        assert!(monitor.is_bound(loose));
    }

    #[test]
    fn test_node_added_binds_subtree() {
        let mut page = MemoryPage::new();
        let mut monitor = DiscoveryMonitor::new(config(), rules());
        monitor.scan(&page);
        assert_eq!(monitor.active_count(), 0);

        let container = page.add_node(None, &["message"]);
        let editor = page.add_editable(Some(container), &["editor"], "");
        let _ = monitor.handle_event(&mut page, PageEvent::NodeAdded(container));

        assert!(monitor.is_bound(editor));
    }

    #[test]
    fn test_attribute_toggle_binds_and_rebind_is_noop() {
        let mut page = MemoryPage::new();
        let container = page.add_node(None, &["message"]);
        let editor = page.add_node(Some(container), &["editor"]);

        let mut monitor = DiscoveryMonitor::new(config(), rules());
        monitor.scan(&page);
        assert_eq!(monitor.active_count(), 0);

        page.set_editable(editor, true);
        let _ = monitor.handle_event(&mut page, PageEvent::AttributeChanged(editor));
        assert!(monitor.is_bound(editor));

        let _ = monitor.handle_event(&mut page, PageEvent::AttributeChanged(editor));
        assert_eq!(monitor.active_count(), 1);
    }

    #[test]
    fn test_input_routed_to_binder() {
        let mut page = MemoryPage::new();
        let container = page.add_node(None, &["message"]);
        let editor = page.add_editable(Some(container), &["editor"], "my secret");

        let mut monitor = DiscoveryMonitor::new(config(), rules());
        monitor.scan(&page);

        let _ = monitor.handle_event(&mut page, PageEvent::Input(editor));
        assert_eq!(page.flat(editor).unwrap().value(), "my [S]");
    }

    #[test]
    fn test_paste_suppresses_default_when_handled() {
        let mut page = MemoryPage::new();
        let container = page.add_node(None, &["message"]);
        let editor = page.add_editable(Some(container), &["editor"], "");

        let mut monitor = DiscoveryMonitor::new(config(), rules());
        monitor.scan(&page);

        let handled = monitor.handle_event(
            &mut page,
            PageEvent::Pasted {
                node: editor,
                text: "a secret".to_string(),
            },
        );
        assert_eq!(handled, EventDisposition::Suppress);
        assert_eq!(page.flat(editor).unwrap().value(), "a [S]");

        let clean = monitor.handle_event(
            &mut page,
            PageEvent::Pasted {
                node: editor,
                text: "hello".to_string(),
            },
        );
        assert_eq!(clean, EventDisposition::Allow);
    }

    #[test]
    fn test_save_click_completes_same_container_only() {
        let mut page = MemoryPage::new();
        let container_a = page.add_node(None, &["message"]);
        let editor_a = page.add_editable(Some(container_a), &["editor"], "");
        let save_a = page.add_node(Some(container_a), &["save"]);
        let container_b = page.add_node(None, &["message"]);
        let editor_b = page.add_editable(Some(container_b), &["editor"], "");

        let mut monitor = DiscoveryMonitor::new(config(), rules());
        monitor.scan(&page);
        assert_eq!(monitor.active_count(), 2);

        let _ = monitor.handle_event(&mut page, PageEvent::Clicked(save_a));

        assert!(!monitor.is_bound(editor_a));
        assert!(monitor.is_bound(editor_b));
    }

    #[test]
    fn test_unrelated_click_keeps_binding() {
        let mut page = MemoryPage::new();
        let container = page.add_node(None, &["message"]);
        let editor = page.add_editable(Some(container), &["editor"], "");
        let elsewhere = page.add_node(Some(container), &["avatar"]);

        let mut monitor = DiscoveryMonitor::new(config(), rules());
        monitor.scan(&page);

        let _ = monitor.handle_event(&mut page, PageEvent::Clicked(elsewhere));
        assert!(monitor.is_bound(editor));
    }

    #[test]
    fn test_removal_completes_via_ancestor() {
        let mut page = MemoryPage::new();
        let container = page.add_node(None, &["message"]);
        let editor = page.add_editable(Some(container), &["editor"], "");

        let mut monitor = DiscoveryMonitor::new(config(), rules());
        monitor.scan(&page);
        assert!(monitor.is_bound(editor));

        page.remove(container);
        let _ = monitor.handle_event(&mut page, PageEvent::NodeRemoved(container));
        assert_eq!(monitor.active_count(), 0);
    }

    #[test]
    fn test_rebind_after_completion() {
        let mut page = MemoryPage::new();
        let container = page.add_node(None, &["message"]);
        let editor = page.add_editable(Some(container), &["editor"], "");
        let cancel = page.add_node(Some(container), &["cancel"]);

        let mut monitor = DiscoveryMonitor::new(config(), rules());
        monitor.scan(&page);
        let _ = monitor.handle_event(&mut page, PageEvent::Clicked(cancel));
        assert_eq!(monitor.active_count(), 0);

        // A new edit session on the same element binds again.
        let _ = monitor.handle_event(&mut page, PageEvent::AttributeChanged(editor));
        assert!(monitor.is_bound(editor));
    }

    #[test]
    fn test_rule_update_broadcast() {
        let mut page = MemoryPage::new();
        let container = page.add_node(None, &["message"]);
        let editor = page.add_editable(Some(container), &["editor"], "my token");

        let mut monitor = DiscoveryMonitor::new(config(), rules());
        monitor.scan(&page);

        monitor.update_rules(Arc::new(vec![Rule::literal("token", "[T]")]));
        let _ = monitor.handle_event(&mut page, PageEvent::Input(editor));
        assert_eq!(page.flat(editor).unwrap().value(), "my [T]");
    }

    #[test]
    fn test_shutdown_clears_and_ignores() {
        let mut page = MemoryPage::new();
        let container = page.add_node(None, &["message"]);
        let editor = page.add_editable(Some(container), &["editor"], "");

        let mut monitor = DiscoveryMonitor::new(config(), rules());
        monitor.scan(&page);
        monitor.shutdown();
        assert_eq!(monitor.active_count(), 0);

        let _ = monitor.handle_event(&mut page, PageEvent::AttributeChanged(editor));
        assert_eq!(monitor.active_count(), 0);
    }

    #[tokio::test]
    async fn test_wait_for_surface_resolves_on_event() {
        let mut page = MemoryPage::new();
        let mut monitor = DiscoveryMonitor::new(config(), rules());
        let (tx, mut rx) = mpsc::channel(8);

        let container = page.add_node(None, &["message"]);
        let editor = page.add_editable(Some(container), &["editor"], "");
        tx.send(PageEvent::NodeAdded(container)).await.unwrap();

        let bound = monitor
            .wait_for_surface(&mut page, &mut rx, Duration::from_secs(1))
            .await;
        assert!(bound);
        assert!(monitor.is_bound(editor));
    }

    #[tokio::test]
    async fn test_wait_for_surface_gives_up_after_timeout() {
        let mut page = MemoryPage::new();
        let mut monitor = DiscoveryMonitor::new(config(), rules());
        let (_tx, mut rx) = mpsc::channel::<PageEvent>(8);

        let bound = monitor
            .wait_for_surface(&mut page, &mut rx, Duration::from_millis(50))
            .await;
        assert!(!bound);
    }
}
