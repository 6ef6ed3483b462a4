//! Page event source

use crate::page::NodeId;

/// Structural and interaction notifications from the host page. A browser
/// host feeds these from mutation observers and DOM event listeners; the
/// in-memory page synthesizes them directly.
#[derive(Debug, Clone)]
pub enum PageEvent {
    /// An element (and its subtree) was inserted.
    NodeAdded(NodeId),
    /// An attribute changed; editability may have toggled.
    AttributeChanged(NodeId),
    /// An element (and its subtree) left the page.
    NodeRemoved(NodeId),
    Clicked(NodeId),
    /// A user-initiated modification of an editable surface.
    Input(NodeId),
    /// A paste targeting an editable surface, with the clipboard's
    /// plain-text payload.
    Pasted { node: NodeId, text: String },
}
