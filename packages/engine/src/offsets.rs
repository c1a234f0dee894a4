//! # Offset Mapper
//!
//! Converts between tree positions and integer document offsets.
//!
//! Positions are totally ordered by a pre-order walk in which a text node
//! contributes its character length plus one unit, an element contributes one
//! unit plus its descendants, and the root contributes zero (only its
//! children count). Because the rule depends only on tag/text shape, an
//! offset computed before a sanitize rewrite re-locates the nearest
//! equivalent position afterwards, as long as the text content survived.
//! That is what lets a selection live through undo/redo as two integers.

use scriven_dom::{Dom, NodeData, NodeId};

use crate::selection::Position;

/// Unit cost of `node` and its whole subtree.
pub fn node_units(dom: &Dom, node: NodeId) -> usize {
    let mut units = 0;
    for id in dom.subtree(node) {
        units += leaf_units(dom, id);
    }
    units
}

fn leaf_units(dom: &Dom, node: NodeId) -> usize {
    match dom.data(node) {
        NodeData::Text(text) => text.chars().count() + 1,
        NodeData::Element { .. } => 1,
    }
}

/// Total unit extent of the document. The root contributes no unit of its
/// own; only its children count.
pub fn document_extent(dom: &Dom, root: NodeId) -> usize {
    dom.children(root)
        .iter()
        .map(|&child| node_units(dom, child))
        .sum()
}

/// Document offset at which `dest` begins. If `dest` is not under `root`
/// the walk runs off the end and returns the total document extent, which
/// downstream resolution clamps.
pub fn offset_of_node(dom: &Dom, root: NodeId, dest: NodeId) -> usize {
    let mut offset = 0;
    let mut node = root;
    let mut stack: Vec<NodeId> = Vec::new();

    loop {
        if node == dest {
            return offset;
        }

        if let Some(first) = dom.first_child(node) {
            if node != root {
                offset += 1;
            }
            stack.push(node);
            node = first;
            continue;
        }

        if node != root {
            offset += leaf_units(dom, node);
        }
        if !stack.is_empty() {
            if let Some(sibling) = dom.next_sibling(node) {
                node = sibling;
                continue;
            }
        }
        loop {
            if stack.len() <= 1 {
                return offset;
            }
            let Some(parent) = stack.pop() else {
                return offset;
            };
            if let Some(sibling) = dom.next_sibling(parent) {
                node = sibling;
                break;
            }
        }
    }
}

/// Inverse of [`offset_of_node`]: resolve a document offset to a node and an
/// intra-node offset. Text offsets clamp to the node's length; offsets past
/// the end of the document resolve to the last valid position.
pub fn node_at_offset(dom: &Dom, root: NodeId, offset: usize) -> (NodeId, usize) {
    let mut offset = offset as i64;
    let mut node = root;
    let mut stack: Vec<NodeId> = Vec::new();

    loop {
        if offset <= 0 {
            return (node, 0);
        }

        if let Some(len) = dom.text_len(node) {
            if offset <= len as i64 {
                return (node, offset as usize);
            }
        }

        if let Some(first) = dom.first_child(node) {
            if node != root {
                offset -= 1;
            }
            stack.push(node);
            node = first;
            continue;
        }

        if !stack.is_empty() {
            if let Some(sibling) = dom.next_sibling(node) {
                offset -= leaf_units(dom, node) as i64;
                node = sibling;
                continue;
            }
        }
        loop {
            if stack.len() <= 1 {
                return match dom.text_len(node) {
                    Some(len) => (node, (offset.max(0) as usize).min(len)),
                    None => (node, 0),
                };
            }
            let Some(parent) = stack.pop() else {
                return (node, 0);
            };
            if let Some(sibling) = dom.next_sibling(parent) {
                offset -= leaf_units(dom, node) as i64;
                node = sibling;
                break;
            }
        }
    }
}

/// Units contributed by the first `child_index` children of `container`.
/// Converts a range boundary expressed as an element container plus a child
/// index into the same units as a text boundary.
pub fn units_before_child(dom: &Dom, container: NodeId, child_index: usize) -> usize {
    match dom.data(container) {
        NodeData::Text(_) => child_index,
        NodeData::Element { .. } => dom
            .children(container)
            .iter()
            .take(child_index)
            .map(|&child| node_units(dom, child))
            .sum(),
    }
}

/// Document offset of a range boundary (container node + intra-node offset).
pub fn offset_of_position(dom: &Dom, root: NodeId, position: Position) -> usize {
    offset_of_node(dom, root, position.node) + units_before_child(dom, position.node, position.offset)
}

/// The unit span `(node, start, end)` of every node under `root`, children
/// before parents. Spans are computed in one walk so callers can classify a
/// whole range before mutating anything.
pub fn subtree_spans(dom: &Dom, root: NodeId) -> Vec<(NodeId, usize, usize)> {
    fn walk(
        dom: &Dom,
        node: NodeId,
        root: NodeId,
        start: usize,
        out: &mut Vec<(NodeId, usize, usize)>,
    ) -> usize {
        let mut cursor = start;
        if node != root {
            cursor += 1;
        }
        if let Some(len) = dom.text_len(node) {
            cursor += len;
        }
        for &child in dom.children(node) {
            cursor = walk(dom, child, root, cursor, out);
        }
        if node != root {
            out.push((node, start, cursor));
        }
        cursor
    }

    let mut out = Vec::new();
    walk(dom, root, root, 0, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `<div><p>abc</p><p>d</p></div>`
    fn sample() -> (Dom, NodeId, [NodeId; 4]) {
        let mut dom = Dom::new("div");
        let root = dom.root();
        dom.set_inner_html(root, "<p>abc</p><p>d</p>");
        let p1 = dom.children(root)[0];
        let t1 = dom.children(p1)[0];
        let p2 = dom.children(root)[1];
        let t2 = dom.children(p2)[0];
        (dom, root, [p1, t1, p2, t2])
    }

    #[test]
    fn test_node_units() {
        let (dom, root, [p1, t1, ..]) = sample();
        assert_eq!(node_units(&dom, t1), 4);
        assert_eq!(node_units(&dom, p1), 5);
        // node_units counts the called node itself; the root's own unit is
        // excluded only by document_extent.
        assert_eq!(node_units(&dom, root), 1 + 5 + 3);
        assert_eq!(document_extent(&dom, root), 5 + 3);
    }

    #[test]
    fn test_offset_of_node() {
        let (dom, root, [p1, t1, p2, t2]) = sample();
        assert_eq!(offset_of_node(&dom, root, p1), 0);
        assert_eq!(offset_of_node(&dom, root, t1), 1);
        assert_eq!(offset_of_node(&dom, root, p2), 5);
        assert_eq!(offset_of_node(&dom, root, t2), 6);
    }

    #[test]
    fn test_node_at_offset_inverse() {
        let (dom, root, [_, t1, _, t2]) = sample();
        assert_eq!(node_at_offset(&dom, root, 1), (t1, 0));
        assert_eq!(node_at_offset(&dom, root, 3), (t1, 2));
        assert_eq!(node_at_offset(&dom, root, 6), (t2, 0));
        assert_eq!(node_at_offset(&dom, root, 7), (t2, 1));
    }

    #[test]
    fn test_offset_past_end_clamps() {
        let (dom, root, [.., t2]) = sample();
        let (node, offset) = node_at_offset(&dom, root, 999);
        assert_eq!(node, t2);
        assert_eq!(offset, 1);
    }

    #[test]
    fn test_empty_container_resolves_to_offset_zero() {
        let dom = Dom::new("div");
        let root = dom.root();
        assert_eq!(node_at_offset(&dom, root, 0), (root, 0));
        assert_eq!(node_at_offset(&dom, root, 5), (root, 0));
    }

    #[test]
    fn test_missing_dest_under_empty_root_is_extent() {
        let mut dom = Dom::new("div");
        let root = dom.root();
        let stray = dom.create_text("elsewhere");
        // The walk runs off the end without counting the root's own unit.
        assert_eq!(offset_of_node(&dom, root, stray), 0);
        assert_eq!(offset_of_node(&dom, root, stray), document_extent(&dom, root));
    }

    #[test]
    fn test_round_trip_all_text_positions() {
        let (dom, root, _) = sample();
        for offset in 0..document_extent(&dom, root) {
            let (node, intra) = node_at_offset(&dom, root, offset);
            let position = Position { node, offset: intra };
            if dom.is_text(node) {
                assert_eq!(offset_of_position(&dom, root, position), offset);
            }
        }
    }

    #[test]
    fn test_subtree_spans_match_node_walks() {
        let (dom, root, _) = sample();
        for (node, start, end) in subtree_spans(&dom, root) {
            assert_eq!(start, offset_of_node(&dom, root, node));
            assert_eq!(end - start, node_units(&dom, node));
        }
    }

    #[test]
    fn test_units_before_child() {
        let (dom, root, [_, t1, ..]) = sample();
        assert_eq!(units_before_child(&dom, root, 1), 5);
        assert_eq!(units_before_child(&dom, root, 2), 8);
        assert_eq!(units_before_child(&dom, t1, 2), 2);
    }
}
