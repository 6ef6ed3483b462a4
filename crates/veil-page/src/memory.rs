//! In-memory page
//!
//! A self-contained `Page` implementation: nodes carry marker labels that
//! stand in for selector matches, a parent link, an editability flag, and
//! an optional flat surface. Used by the test suites and by embedders that
//! drive the core without a real host runtime.

use std::collections::BTreeMap;

use crate::flat::FlatSurface;
use crate::page::{NodeId, Page};
use crate::surface::EditableSurface;

#[derive(Debug, Clone)]
struct MemoryNode {
    parent: Option<NodeId>,
    markers: Vec<String>,
    editable: bool,
    attached: bool,
    surface: Option<FlatSurface>,
}

#[derive(Debug, Default)]
pub struct MemoryPage {
    nodes: BTreeMap<NodeId, MemoryNode>,
    next_id: u64,
}

impl MemoryPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a plain node. Markers are the selector labels the node
    /// matches.
    pub fn add_node(&mut self, parent: Option<NodeId>, markers: &[&str]) -> NodeId {
        self.next_id += 1;
        let id = NodeId(self.next_id);
        self.nodes.insert(
            id,
            MemoryNode {
                parent,
                markers: markers.iter().map(|m| m.to_string()).collect(),
                editable: false,
                attached: true,
                surface: None,
            },
        );
        id
    }

    /// Insert an editable node with a flat surface holding `text`.
    pub fn add_editable(&mut self, parent: Option<NodeId>, markers: &[&str], text: &str) -> NodeId {
        let id = self.add_node(parent, markers);
        if let Some(node) = self.nodes.get_mut(&id) {
            node.editable = true;
            node.surface = Some(FlatSurface::with_text(text));
        }
        id
    }

    /// Toggle the node's editable marker, creating an empty surface on
    /// first enable.
    pub fn set_editable(&mut self, id: NodeId, editable: bool) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.editable = editable;
            if editable && node.surface.is_none() {
                node.surface = Some(FlatSurface::new());
            }
        }
    }

    /// Detach the node and its whole subtree.
    pub fn remove(&mut self, id: NodeId) {
        let doomed: Vec<NodeId> = self
            .nodes
            .keys()
            .copied()
            .filter(|&n| n == id || self.has_ancestor(n, id))
            .collect();
        for n in doomed {
            if let Some(node) = self.nodes.get_mut(&n) {
                node.attached = false;
            }
        }
    }

    /// Inspect a node's flat surface (tests).
    pub fn flat(&self, id: NodeId) -> Option<&FlatSurface> {
        self.nodes.get(&id).and_then(|n| n.surface.as_ref())
    }

    pub fn flat_mut(&mut self, id: NodeId) -> Option<&mut FlatSurface> {
        self.nodes.get_mut(&id).and_then(|n| n.surface.as_mut())
    }

    fn has_ancestor(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = self.nodes.get(&node).and_then(|n| n.parent);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.nodes.get(&p).and_then(|n| n.parent);
        }
        false
    }

    fn node_matches(&self, id: NodeId, selector: &str) -> bool {
        self.nodes
            .get(&id)
            .is_some_and(|n| n.markers.iter().any(|m| m == selector))
    }
}

impl Page for MemoryPage {
    fn query(&self, selector: &str) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|(_, n)| n.attached)
            .filter(|(id, _)| self.node_matches(**id, selector))
            .map(|(id, _)| *id)
            .collect()
    }

    fn query_within(&self, root: NodeId, selector: &str) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|(_, n)| n.attached)
            .filter(|(id, _)| self.has_ancestor(**id, root))
            .filter(|(id, _)| self.node_matches(**id, selector))
            .map(|(id, _)| *id)
            .collect()
    }

    fn matches(&self, node: NodeId, selector: &str) -> bool {
        self.node_matches(node, selector)
    }

    fn closest(&self, node: NodeId, selector: &str) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(id) = current {
            if self.node_matches(id, selector) {
                return Some(id);
            }
            current = self.nodes.get(&id).and_then(|n| n.parent);
        }
        None
    }

    fn is_editable(&self, node: NodeId) -> bool {
        self.nodes.get(&node).is_some_and(|n| n.editable)
    }

    fn is_attached(&self, node: NodeId) -> bool {
        self.nodes.get(&node).is_some_and(|n| n.attached)
    }

    fn surface_mut(&mut self, node: NodeId) -> Option<&mut dyn EditableSurface> {
        self.nodes
            .get_mut(&node)
            .and_then(|n| n.surface.as_mut())
            .map(|s| s as &mut dyn EditableSurface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_and_matches() {
        let mut page = MemoryPage::new();
        let container = page.add_node(None, &["message"]);
        let input = page.add_editable(Some(container), &["editor"], "hi");
        let other = page.add_node(None, &["sidebar"]);

        assert_eq!(page.query("editor"), vec![input]);
        assert!(page.matches(container, "message"));
        assert!(!page.matches(other, "message"));
        assert_eq!(page.query_within(container, "editor"), vec![input]);
        assert!(page.query_within(other, "editor").is_empty());
    }

    #[test]
    fn test_closest_walks_ancestors() {
        let mut page = MemoryPage::new();
        let outer = page.add_node(None, &["message"]);
        let inner = page.add_node(Some(outer), &["bubble"]);
        let leaf = page.add_editable(Some(inner), &["editor"], "");

        assert_eq!(page.closest(leaf, "message"), Some(outer));
        assert_eq!(page.closest(leaf, "editor"), Some(leaf));
        assert_eq!(page.closest(leaf, "missing"), None);
    }

    #[test]
    fn test_remove_detaches_subtree() {
        let mut page = MemoryPage::new();
        let outer = page.add_node(None, &["message"]);
        let leaf = page.add_editable(Some(outer), &["editor"], "");

        page.remove(outer);
        assert!(!page.is_attached(outer));
        assert!(!page.is_attached(leaf));
        assert!(page.query("editor").is_empty());
    }

    #[test]
    fn test_surface_access() {
        let mut page = MemoryPage::new();
        let leaf = page.add_editable(None, &["editor"], "hello");

        let surface = page.surface_mut(leaf).unwrap();
        assert_eq!(surface.logical_text(), "hello");
        surface.set_text("changed");
        assert_eq!(page.flat(leaf).unwrap().value(), "changed");
    }
}
