//! # Selection Tracker
//!
//! Bridges the host's notion of a selection (two container/offset boundary
//! pairs) and the engine's: a transient descriptor with an ancestor path for
//! plugin activation tests, and a pair of integer offsets for persistence
//! into history.
//!
//! The host side is abstracted behind [`SelectionPort`] so the engine is
//! testable without a rendering surface; [`HostSelection`] is the in-memory
//! implementation used in tests and headless embedding.

use serde::{Deserialize, Serialize};

use scriven_dom::{Dom, NodeId};

use crate::offsets;

/// One range boundary: a container node and an intra-node offset. For text
/// nodes the offset counts characters; for elements it is a child index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub node: NodeId,
    pub offset: usize,
}

/// A host range as reported by the selection API: start and end boundaries,
/// in the host's order. End may precede start for backwards selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSelection {
    pub start: Position,
    pub end: Position,
}

impl RawSelection {
    pub fn collapsed(at: Position) -> Self {
        Self { start: at, end: at }
    }
}

/// Persisted form of a selection: both boundaries as document offsets.
/// Start and end are derived independently from the range boundaries and
/// never swapped, so a backwards selection keeps its host order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionOffsets {
    pub start: usize,
    pub end: usize,
}

/// Live view of the current selection, recomputed on every change and read
/// by plugins to decide activation state. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionDescriptor {
    pub start: Position,
    pub end: Position,
    pub collapsed: bool,
    pub common_ancestor: NodeId,
    /// Nodes from the common ancestor up to, but not including, the editable
    /// root. Empty when the common ancestor is the root itself.
    pub ancestor_path: Vec<NodeId>,
}

/// Injected host dependency holding the current selection and focus state.
pub trait SelectionPort {
    fn current(&self) -> Option<RawSelection>;
    fn set(&mut self, selection: RawSelection);
    fn clear(&mut self);
    fn is_focused(&self) -> bool;
    fn set_focused(&mut self, focused: bool);
}

/// In-memory [`SelectionPort`].
#[derive(Debug, Default)]
pub struct HostSelection {
    selection: Option<RawSelection>,
    focused: bool,
}

impl SelectionPort for HostSelection {
    fn current(&self) -> Option<RawSelection> {
        self.selection
    }

    fn set(&mut self, selection: RawSelection) {
        self.selection = Some(selection);
    }

    fn clear(&mut self) {
        self.selection = None;
    }

    fn is_focused(&self) -> bool {
        self.focused
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}

/// Build a descriptor for `raw`, or `None` when the selection does not
/// intersect `root`.
///
/// A selection collapsed at the root's own start boundary (a reporting
/// artifact of host selection APIs) is normalized to the start of the
/// root's first child.
pub fn capture(dom: &Dom, root: NodeId, raw: RawSelection) -> Option<SelectionDescriptor> {
    if !dom.contains(root, raw.start.node) || !dom.contains(root, raw.end.node) {
        return None;
    }

    let mut raw = raw;
    if raw.start.node == root && raw.end.node == root && raw.start.offset == 0 && raw.end.offset == 0
    {
        if let Some(first) = dom.first_child(root) {
            raw = RawSelection::collapsed(Position {
                node: first,
                offset: 0,
            });
        }
    }

    let common_ancestor = common_ancestor(dom, raw.start.node, raw.end.node)?;
    let mut ancestor_path = Vec::new();
    let mut current = Some(common_ancestor);
    while let Some(node) = current {
        if node == root {
            break;
        }
        ancestor_path.push(node);
        current = dom.parent(node);
    }

    Some(SelectionDescriptor {
        start: raw.start,
        end: raw.end,
        collapsed: raw.start == raw.end,
        common_ancestor,
        ancestor_path,
    })
}

fn common_ancestor(dom: &Dom, a: NodeId, b: NodeId) -> Option<NodeId> {
    let mut current = Some(a);
    while let Some(node) = current {
        if dom.contains(node, b) {
            return Some(node);
        }
        current = dom.parent(node);
    }
    None
}

/// Serialize a descriptor into document offsets for the history entry.
pub fn to_offsets(dom: &Dom, root: NodeId, descriptor: &SelectionDescriptor) -> SelectionOffsets {
    SelectionOffsets {
        start: offsets::offset_of_position(dom, root, descriptor.start),
        end: offsets::offset_of_position(dom, root, descriptor.end),
    }
}

/// Resolve persisted offsets back into a host range against the current
/// tree. Both boundaries clamp to the nearest valid position.
pub fn restore(dom: &Dom, root: NodeId, saved: SelectionOffsets) -> RawSelection {
    let (start_node, start_offset) = offsets::node_at_offset(dom, root, saved.start);
    let (end_node, end_offset) = offsets::node_at_offset(dom, root, saved.end);
    RawSelection {
        start: Position {
            node: start_node,
            offset: start_offset,
        },
        end: Position {
            node: end_node,
            offset: end_offset,
        },
    }
}
