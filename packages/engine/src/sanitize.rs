//! # Sanitizer
//!
//! Repairs a mutation batch against the effective policy. Every repair is
//! applied locally; nothing is ever rejected or raised. The return value
//! reports whether the batch was already clean, which is what the editor
//! uses to decide if the document diverged.
//!
//! The per-node rule order is fixed because later rules act on what earlier
//! ones produce: attribute stripping first, structural wrapping, tag
//! replacement, plugin hooks, and the allowlist unwrap last.

use std::collections::HashSet;

use scriven_dom::{Dom, MutationRecord, NodeId};

use crate::policy::{Plugin, Policy};

/// Bound on repair-induced re-sanitize cycles per drain. Repairs normally
/// converge in two passes; a plugin hook that keeps reporting dirty without
/// reaching a fixed point is cut off here.
pub const MAX_SANITIZE_PASSES: usize = 8;

/// Sanitize the nodes affected by `records`. Returns `true` when the
/// document required no changes.
pub fn sanitize(
    dom: &mut Dom,
    root: NodeId,
    policy: &Policy,
    plugins: &[Box<dyn Plugin>],
    records: &[MutationRecord],
) -> bool {
    let affected = affected_nodes(dom, records);
    let mut clean = true;

    for node in affected {
        // A repair earlier in the pass may have detached this node.
        if node == root || !dom.contains(root, node) {
            continue;
        }
        if !sanitize_node(dom, root, policy, plugins, node) {
            clean = false;
        }
    }

    // The document must never be truly empty: keep one paragraph with a
    // line-break placeholder for the caret to land in.
    if dom.element_child_count(root) == 0 {
        let paragraph = dom.create_element("p");
        let br = dom.create_element("br");
        dom.append(paragraph, br);
        dom.append(root, paragraph);
        clean = false;
    }

    if !clean {
        tracing::debug!("sanitize pass applied repairs");
    }
    clean
}

/// Deduplicated visit set: each record's target, each added node, and the
/// full subtree of each, in arrival order.
fn affected_nodes(dom: &Dom, records: &[MutationRecord]) -> Vec<NodeId> {
    let mut seen: HashSet<NodeId> = HashSet::new();
    let mut nodes = Vec::new();
    for record in records {
        for &top in std::iter::once(&record.target).chain(record.added.iter()) {
            for node in dom.subtree(top) {
                if seen.insert(node) {
                    nodes.push(node);
                }
            }
        }
    }
    nodes
}

fn sanitize_node(
    dom: &mut Dom,
    root: NodeId,
    policy: &Policy,
    plugins: &[Box<dyn Plugin>],
    node: NodeId,
) -> bool {
    let mut clean = true;

    if dom.is_element(node) {
        if dom.has_attribute(node, "id") {
            dom.remove_attribute(node, "id");
            clean = false;
        }
        if !filter_style(dom, policy, node) {
            clean = false;
        }
        if dom.has_attribute(node, "class") {
            dom.remove_attribute(node, "class");
            clean = false;
        }
    }

    // The root only ever directly contains block children; orphan text and
    // line breaks get a paragraph around them. Whitespace-only text is left
    // alone.
    let orphan = dom.parent(node) == Some(root)
        && match dom.text(node) {
            Some(text) => !text.trim().is_empty(),
            None => dom.tag(node) == Some("br"),
        };
    if orphan {
        let paragraph = dom.create_element("p");
        dom.insert_before(root, paragraph, Some(node));
        dom.append(paragraph, node);
        clean = false;
    }

    let Some(tag) = dom.tag(node).map(str::to_string) else {
        return clean;
    };

    if let Some(replacement) = policy.replacement_for(&tag) {
        let replacement = replacement.to_string();
        tracing::debug!(from = %tag, to = %replacement, "replacing tag");
        dom.replace_tag(node, &replacement);
        // The replacement node arrives through its own mutation record and
        // is sanitized on the next pass.
        return false;
    }

    for plugin in plugins {
        if plugin.allowed_tags().contains(&tag.as_str()) && !plugin.sanitize(dom, node) {
            clean = false;
        }
    }

    // A hook may have detached or unwrapped the node.
    if !dom.contains(root, node) || dom.parent(node).is_none() {
        return clean;
    }

    if !policy.allows_tag(&tag) {
        tracing::debug!(%tag, "unwrapping disallowed element");
        dom.unwrap(node);
        clean = false;
    }

    clean
}

/// Filter a `style` attribute property by property, keeping only allowed
/// names. Returns `true` when nothing had to change.
fn filter_style(dom: &mut Dom, policy: &Policy, node: NodeId) -> bool {
    let Some(style) = dom.attribute(node, "style") else {
        return true;
    };

    let mut kept: Vec<String> = Vec::new();
    let mut changed = false;
    for declaration in style.split(';') {
        let declaration = declaration.trim();
        if declaration.is_empty() {
            continue;
        }
        let property = declaration
            .split(':')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();
        if policy.allows_style(&property) {
            kept.push(declaration.to_string());
        } else {
            changed = true;
        }
    }
    if !changed {
        return true;
    }
    if kept.is_empty() {
        dom.remove_attribute(node, "style");
    } else {
        dom.set_attribute(node, "style", &kept.join("; "));
    }
    false
}
