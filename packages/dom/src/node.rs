//! # Arena Tree
//!
//! Node store for an editable HTML fragment. Nodes live in a flat arena and
//! are addressed by copyable [`NodeId`]s; detaching a subtree leaves its
//! nodes in the arena so that ids held elsewhere (selection boundaries,
//! pending mutation records) stay valid to query.
//!
//! Structural operations record [`MutationRecord`]s while the log is
//! connected. Attempts to create a cycle (inserting a node into its own
//! subtree) are ignored with a warning rather than panicking; the editing
//! engine has no fatal error path.

use crate::mutation::{MutationLog, MutationRecord};
use crate::{parser, serializer};
use serde::{Deserialize, Serialize};

/// Stable handle to a node in a [`Dom`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Payload of a node: an element with ordered attributes, or a text run.
///
/// Tags and attribute names are stored lowercase. Attribute order is
/// preserved so serialization is deterministic.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

/// An editable HTML fragment: arena of nodes, a designated editable root,
/// and the mutation log observing structural changes.
#[derive(Debug)]
pub struct Dom {
    nodes: Vec<Node>,
    root: NodeId,
    log: MutationLog,
}

impl Dom {
    /// Create a tree whose editable root is an empty element with the given
    /// tag (conventionally `div`, the contenteditable container).
    pub fn new(root_tag: &str) -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            log: MutationLog::new(),
        };
        dom.root = dom.alloc(NodeData::Element {
            tag: root_tag.to_ascii_lowercase(),
            attributes: Vec::new(),
        });
        dom
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            data,
        });
        id
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    // ------------------------------------------------------------------
    // Creation
    // ------------------------------------------------------------------

    /// Allocate a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeData::Element {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
        })
    }

    /// Allocate a detached element with attributes already set.
    pub fn create_element_with_attrs(
        &mut self,
        tag: &str,
        attributes: Vec<(String, String)>,
    ) -> NodeId {
        self.alloc(NodeData::Element {
            tag: tag.to_ascii_lowercase(),
            attributes,
        })
    }

    /// Allocate a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(NodeData::Text(text.to_string()))
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.node(id).data
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.node(id).data, NodeData::Element { .. })
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.node(id).data, NodeData::Text(_))
    }

    /// Lowercase tag name, or `None` for text nodes.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).data {
            NodeData::Element { tag, .. } => Some(tag),
            NodeData::Text(_) => None,
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).data {
            NodeData::Text(text) => Some(text),
            NodeData::Element { .. } => None,
        }
    }

    /// Character length of a text node, `None` for elements.
    pub fn text_len(&self, id: NodeId) -> Option<usize> {
        self.text(id).map(|t| t.chars().count())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).children.first().copied()
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.node(id).parent?;
        let siblings = &self.node(parent).children;
        let index = siblings.iter().position(|&c| c == id)?;
        siblings.get(index + 1).copied()
    }

    /// Index of `child` in `parent`'s child list.
    pub fn child_index(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.node(parent).children.iter().position(|&c| c == child)
    }

    /// Whether `ancestor` contains `node` (inclusive: a node contains itself).
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.node(id).parent;
        }
        false
    }

    pub fn is_attached(&self, id: NodeId) -> bool {
        self.contains(self.root, id)
    }

    /// Pre-order listing of `id` and all of its descendants.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            out.push(node);
            for &child in self.node(node).children.iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    /// Concatenated text of the subtree rooted at `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for node in self.subtree(id) {
            if let NodeData::Text(text) = &self.node(node).data {
                out.push_str(text);
            }
        }
        out
    }

    pub fn element_child_count(&self, id: NodeId) -> usize {
        self.node(id)
            .children
            .iter()
            .filter(|&&c| self.is_element(c))
            .count()
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.node(id).data {
            NodeData::Element { attributes, .. } => attributes
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str()),
            NodeData::Text(_) => None,
        }
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.attribute(id, name).is_some()
    }

    pub fn attributes(&self, id: NodeId) -> &[(String, String)] {
        match &self.node(id).data {
            NodeData::Element { attributes, .. } => attributes,
            NodeData::Text(_) => &[],
        }
    }

    // ------------------------------------------------------------------
    // Structural mutation
    // ------------------------------------------------------------------

    /// Append `child` as the last child of `parent`, detaching it from any
    /// previous parent first. Inserting a node into its own subtree is
    /// ignored.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.insert_before(parent, child, None);
    }

    /// Insert `child` into `parent` before `reference`. `None` or a
    /// reference that is not a child of `parent` appends instead.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        if self.contains(child, parent) {
            tracing::warn!(?parent, ?child, "ignoring insert that would create a cycle");
            return;
        }
        self.unlink(child);
        let index = reference
            .and_then(|r| self.child_index(parent, r))
            .unwrap_or_else(|| self.node(parent).children.len());
        self.link(parent, child, index);
        self.log.push(MutationRecord::with_added(parent, vec![child]));
    }

    /// Remove `id` from its parent. The subtree stays in the arena.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.node(id).parent {
            self.unlink(id);
            self.log.push(MutationRecord::target_only(parent));
        }
    }

    /// Replace `id` with its own children, dropping the wrapping element.
    pub fn unwrap(&mut self, id: NodeId) {
        let Some(parent) = self.node(id).parent else {
            return;
        };
        let children = std::mem::take(&mut self.node_mut(id).children);
        let Some(mut index) = self.child_index(parent, id) else {
            return;
        };
        self.unlink(id);
        for &child in &children {
            self.node_mut(child).parent = Some(parent);
            self.node_mut(parent).children.insert(index, child);
            index += 1;
        }
        self.log.push(MutationRecord::with_added(parent, children));
    }

    /// Replace the element `id` with a fresh element of `new_tag` holding the
    /// same children. Attributes are not carried over, matching the
    /// `outerHTML`-style rewrite the sanitizer performs for tag replacement.
    /// Returns the replacement node (or `id` unchanged for text nodes).
    pub fn replace_tag(&mut self, id: NodeId, new_tag: &str) -> NodeId {
        if !self.is_element(id) {
            return id;
        }
        let replacement = self.create_element(new_tag);
        let children = std::mem::take(&mut self.node_mut(id).children);
        for &child in &children {
            self.node_mut(child).parent = Some(replacement);
        }
        self.node_mut(replacement).children = children;
        if let Some(parent) = self.node(id).parent {
            if let Some(index) = self.child_index(parent, id) {
                self.unlink(id);
                self.link(parent, replacement, index);
                self.log
                    .push(MutationRecord::with_added(parent, vec![replacement]));
            }
        }
        replacement
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        if let NodeData::Element { attributes, .. } = &mut self.node_mut(id).data {
            match attributes.iter_mut().find(|(n, _)| *n == name) {
                Some((_, v)) => *v = value.to_string(),
                None => attributes.push((name, value.to_string())),
            }
            self.log.push(MutationRecord::target_only(id));
        }
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) {
        if let NodeData::Element { attributes, .. } = &mut self.node_mut(id).data {
            let before = attributes.len();
            attributes.retain(|(n, _)| n != name);
            if attributes.len() != before {
                self.log.push(MutationRecord::target_only(id));
            }
        }
    }

    pub fn set_text(&mut self, id: NodeId, text: &str) {
        if let NodeData::Text(current) = &mut self.node_mut(id).data {
            if current != text {
                *current = text.to_string();
                self.log.push(MutationRecord::target_only(id));
            }
        }
    }

    /// Split the text node `id` at character offset `at`, keeping the head in
    /// place and inserting the tail as a new sibling right after it.
    /// Returns the tail node.
    pub fn split_text(&mut self, id: NodeId, at: usize) -> NodeId {
        let (head, tail) = match self.text(id) {
            Some(text) => {
                let boundary = text
                    .char_indices()
                    .nth(at)
                    .map(|(i, _)| i)
                    .unwrap_or(text.len());
                (text[..boundary].to_string(), text[boundary..].to_string())
            }
            None => return id,
        };
        let tail_node = self.create_text(&tail);
        self.node_mut(id).data = NodeData::Text(head);
        if let Some(parent) = self.node(id).parent {
            let reference = self.next_sibling(id);
            let index = reference
                .and_then(|r| self.child_index(parent, r))
                .unwrap_or_else(|| self.node(parent).children.len());
            self.link(parent, tail_node, index);
            self.log
                .push(MutationRecord::with_added(parent, vec![tail_node]));
        }
        tail_node
    }

    // ------------------------------------------------------------------
    // HTML in / HTML out
    // ------------------------------------------------------------------

    /// Replace the children of `id` with the parse of `html`. Produces a
    /// single mutation record covering the new top-level children.
    pub fn set_inner_html(&mut self, id: NodeId, html: &str) {
        let old = std::mem::take(&mut self.node_mut(id).children);
        for child in old {
            self.node_mut(child).parent = None;
        }
        parser::parse_into(self, id, html);
        let added = self.node(id).children.clone();
        self.log.push(MutationRecord::with_added(id, added));
    }

    /// Parse `html` and insert the resulting nodes into `parent` before
    /// `reference` (append when `None`). Returns the inserted top-level
    /// nodes, in document order.
    pub fn insert_html_before(
        &mut self,
        parent: NodeId,
        html: &str,
        reference: Option<NodeId>,
    ) -> Vec<NodeId> {
        let holder = self.create_element("div");
        parser::parse_into(self, holder, html);
        let fragment = std::mem::take(&mut self.node_mut(holder).children);
        let mut index = reference
            .and_then(|r| self.child_index(parent, r))
            .unwrap_or_else(|| self.node(parent).children.len());
        for &node in &fragment {
            self.node_mut(node).parent = Some(parent);
            self.node_mut(parent).children.insert(index, node);
            index += 1;
        }
        if !fragment.is_empty() {
            self.log
                .push(MutationRecord::with_added(parent, fragment.clone()));
        }
        fragment
    }

    pub fn inner_html(&self, id: NodeId) -> String {
        serializer::inner_html(self, id)
    }

    pub fn outer_html(&self, id: NodeId) -> String {
        serializer::outer_html(self, id)
    }

    // ------------------------------------------------------------------
    // Mutation log
    // ------------------------------------------------------------------

    /// Drain pending mutation records in arrival order.
    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        self.log.take()
    }

    pub fn has_records(&self) -> bool {
        !self.log.is_empty()
    }

    /// Connect or disconnect the mutation log. Disconnecting drops any
    /// pending records; edits made while disconnected are unobserved.
    pub fn set_recording(&mut self, recording: bool) {
        self.log.set_connected(recording);
    }

    pub fn is_recording(&self) -> bool {
        self.log.is_connected()
    }

    // ------------------------------------------------------------------
    // Unlogged plumbing (parser + internal moves)
    // ------------------------------------------------------------------

    pub(crate) fn link(&mut self, parent: NodeId, child: NodeId, index: usize) {
        let index = index.min(self.node(parent).children.len());
        self.node_mut(parent).children.insert(index, child);
        self.node_mut(child).parent = Some(parent);
    }

    pub(crate) fn append_unlogged(&mut self, parent: NodeId, child: NodeId) {
        let index = self.node(parent).children.len();
        self.link(parent, child, index);
    }

    fn unlink(&mut self, id: NodeId) {
        if let Some(parent) = self.node(id).parent {
            self.node_mut(parent).children.retain(|&c| c != id);
            self.node_mut(id).parent = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Dom, NodeId, NodeId) {
        let mut dom = Dom::new("div");
        let p = dom.create_element("p");
        let text = dom.create_text("hello");
        dom.append(p, text);
        let root = dom.root();
        dom.append(root, p);
        (dom, p, text)
    }

    #[test]
    fn test_append_records_added_node() {
        let (mut dom, p, _) = sample();
        let records = dom.take_records();
        assert!(records.iter().any(|r| r.added.contains(&p)));
    }

    #[test]
    fn test_detach_keeps_node_queryable() {
        let (mut dom, p, text) = sample();
        dom.detach(p);
        assert!(!dom.is_attached(p));
        assert_eq!(dom.text(text), Some("hello"));
        assert!(dom.contains(p, text));
    }

    #[test]
    fn test_unwrap_hoists_children_in_place() {
        let mut dom = Dom::new("div");
        let root = dom.root();
        let before = dom.create_element("p");
        dom.append(root, before);
        let span = dom.create_element("span");
        let inner = dom.create_text("x");
        dom.append(span, inner);
        dom.append(root, span);
        dom.unwrap(span);
        assert_eq!(dom.children(root), &[before, inner]);
        assert_eq!(dom.parent(inner), Some(root));
        assert!(!dom.is_attached(span));
    }

    #[test]
    fn test_replace_tag_drops_attributes_keeps_children() {
        let (mut dom, p, text) = sample();
        dom.set_attribute(p, "class", "loud");
        let strong = dom.replace_tag(p, "strong");
        assert_eq!(dom.tag(strong), Some("strong"));
        assert!(dom.attributes(strong).is_empty());
        assert_eq!(dom.children(strong), &[text]);
        assert!(!dom.is_attached(p));
    }

    #[test]
    fn test_cycle_insert_is_ignored() {
        let (mut dom, p, text) = sample();
        dom.take_records();
        dom.append(text, p);
        assert_eq!(dom.parent(p), Some(dom.root()));
        assert!(dom.take_records().is_empty());
    }

    #[test]
    fn test_split_text_at_char_boundary() {
        let (mut dom, p, text) = sample();
        let tail = dom.split_text(text, 2);
        assert_eq!(dom.text(text), Some("he"));
        assert_eq!(dom.text(tail), Some("llo"));
        assert_eq!(dom.children(p), &[text, tail]);
    }

    #[test]
    fn test_recording_disconnect_drops_records() {
        let (mut dom, p, _) = sample();
        dom.set_recording(false);
        dom.detach(p);
        dom.set_recording(true);
        assert!(dom.take_records().is_empty());
    }

    #[test]
    fn test_set_inner_html_single_record() {
        let mut dom = Dom::new("div");
        let root = dom.root();
        dom.take_records();
        dom.set_inner_html(root, "<p>a</p><p>b</p>");
        let records = dom.take_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].target, root);
        assert_eq!(records[0].added.len(), 2);
    }
}
