//! # Markup Policy
//!
//! The sanitizer works against one effective [`Policy`]: the engine's own
//! baseline merged with the contribution of every registered [`Plugin`].
//! The merge is recomputed fresh on every sanitize pass since plugins may
//! change what they allow at runtime; policy is never cached across passes.

use std::collections::HashMap;

use scriven_dom::{Dom, NodeId};

use crate::selection::SelectionDescriptor;

/// Aggregated markup rules for one sanitize pass.
#[derive(Debug, Clone, Default)]
pub struct Policy {
    /// Lowercase tag names allowed to remain in the document.
    pub allowed_tags: Vec<String>,
    /// Style property names allowed to survive `style` attribute filtering.
    pub allowed_styles: Vec<String>,
    /// Tag rewrites applied before the allowlist check.
    pub replacements: HashMap<String, String>,
}

impl Policy {
    /// The engine's own contribution: paragraphs and line breaks, with host
    /// `div` wrappers rewritten to paragraphs.
    pub fn baseline() -> Self {
        Self {
            allowed_tags: vec!["br".to_string(), "p".to_string()],
            allowed_styles: Vec::new(),
            replacements: HashMap::from([("div".to_string(), "p".to_string())]),
        }
    }

    pub fn allows_tag(&self, tag: &str) -> bool {
        self.allowed_tags.iter().any(|t| t == tag)
    }

    pub fn allows_style(&self, property: &str) -> bool {
        self.allowed_styles.iter().any(|p| p == property)
    }

    pub fn replacement_for(&self, tag: &str) -> Option<&str> {
        self.replacements.get(tag).map(String::as_str)
    }

    /// Merge `base` with every plugin's contribution, in registration order.
    /// Allowlists concatenate (duplicates are harmless); replacement
    /// conflicts resolve last writer wins.
    pub fn effective(base: &Policy, plugins: &[Box<dyn Plugin>]) -> Policy {
        let mut policy = base.clone();
        for plugin in plugins {
            for tag in plugin.allowed_tags() {
                policy.allowed_tags.push(tag.to_string());
            }
            for property in plugin.allowed_styles() {
                policy.allowed_styles.push(property.to_string());
            }
            for (old, new) in plugin.replacements() {
                policy
                    .replacements
                    .insert(old.to_string(), new.to_string());
            }
        }
        policy
    }
}

/// State pushed to every plugin after an edit settles.
pub struct ToolContext<'a> {
    pub dom: &'a Dom,
    pub root: NodeId,
    pub selection: Option<&'a SelectionDescriptor>,
    pub value: &'a str,
    pub can_undo: bool,
    pub can_redo: bool,
}

impl ToolContext<'_> {
    /// Whether the selection's ancestor path crosses an element with `tag`.
    pub fn path_has_tag(&self, tag: &str) -> bool {
        self.path_has(|dom, node| dom.tag(node) == Some(tag))
    }

    /// Ancestor path test with an arbitrary predicate, for plugins that need
    /// more than a tag match (marker attributes, style checks).
    pub fn path_has(&self, predicate: impl Fn(&Dom, NodeId) -> bool) -> bool {
        match self.selection {
            Some(descriptor) => descriptor
                .ancestor_path
                .iter()
                .any(|&node| predicate(self.dom, node)),
            None => false,
        }
    }
}

/// A tool's engine-facing surface: markup policy contributions, an optional
/// per-tag repair hook, and activation state derived on refresh.
pub trait Plugin {
    fn name(&self) -> &str;

    /// Tags this plugin allows. The sanitizer also dispatches the
    /// [`Plugin::sanitize`] hook to nodes carrying one of these tags.
    fn allowed_tags(&self) -> &[&'static str] {
        &[]
    }

    fn allowed_styles(&self) -> &[&'static str] {
        &[]
    }

    fn replacements(&self) -> &[(&'static str, &'static str)] {
        &[]
    }

    /// Repair hook invoked for nodes whose tag this plugin allows. Returns
    /// whether the node was already valid; a `false` return marks the pass
    /// dirty.
    fn sanitize(&self, dom: &mut Dom, node: NodeId) -> bool {
        let _ = (dom, node);
        true
    }

    /// Called after each settling edit with the current engine state.
    fn refresh(&mut self, context: &ToolContext<'_>) {
        let _ = context;
    }

    /// Whether the tool should render as active for the current selection.
    fn is_active(&self) -> bool {
        false
    }

    /// Whether the tool is unusable right now (typically: no selection).
    fn is_disabled(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Contributor;

    impl Plugin for Contributor {
        fn name(&self) -> &str {
            "contributor"
        }
        fn allowed_tags(&self) -> &[&'static str] {
            &["b"]
        }
        fn allowed_styles(&self) -> &[&'static str] {
            &["color"]
        }
        fn replacements(&self) -> &[(&'static str, &'static str)] {
            &[("strong", "b"), ("div", "blockquote")]
        }
    }

    #[test]
    fn test_effective_merges_contributions() {
        let plugins: Vec<Box<dyn Plugin>> = vec![Box::new(Contributor)];
        let policy = Policy::effective(&Policy::baseline(), &plugins);
        assert!(policy.allows_tag("p"));
        assert!(policy.allows_tag("b"));
        assert!(policy.allows_style("color"));
        assert_eq!(policy.replacement_for("strong"), Some("b"));
    }

    #[test]
    fn test_later_plugin_wins_replacement_conflicts() {
        let plugins: Vec<Box<dyn Plugin>> = vec![Box::new(Contributor)];
        let policy = Policy::effective(&Policy::baseline(), &plugins);
        // Baseline maps div→p; the plugin registered after it overrides.
        assert_eq!(policy.replacement_for("div"), Some("blockquote"));
    }
}
