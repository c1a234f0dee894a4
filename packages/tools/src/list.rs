use scriven_dom::{Dom, NodeId};
use scriven_engine::{Plugin, ToolContext};

/// Ordered and unordered lists. Repairs the two structures editing leaves
/// behind: a list emptied of its items, and an item orphaned outside any
/// list.
#[derive(Debug, Default)]
pub struct Lists {
    ordered_active: bool,
    unordered_active: bool,
    disabled: bool,
}

impl Lists {
    pub fn ordered_active(&self) -> bool {
        self.ordered_active
    }

    pub fn unordered_active(&self) -> bool {
        self.unordered_active
    }
}

impl Plugin for Lists {
    fn name(&self) -> &str {
        "lists"
    }

    fn allowed_tags(&self) -> &[&'static str] {
        &["ol", "ul", "li"]
    }

    fn sanitize(&self, dom: &mut Dom, node: NodeId) -> bool {
        match dom.tag(node) {
            Some("ol" | "ul") => {
                if dom.children(node).is_empty() {
                    dom.detach(node);
                    return false;
                }
            }
            Some("li") => {
                let parent_tag = dom.parent(node).and_then(|parent| dom.tag(parent));
                if !matches!(parent_tag, Some("ol" | "ul")) {
                    dom.unwrap(node);
                    return false;
                }
            }
            _ => {}
        }
        true
    }

    fn refresh(&mut self, context: &ToolContext<'_>) {
        self.ordered_active = context.path_has_tag("ol");
        self.unordered_active = context.path_has_tag("ul");
        self.disabled = context.selection.is_none();
    }

    fn is_active(&self) -> bool {
        self.ordered_active || self.unordered_active
    }

    fn is_disabled(&self) -> bool {
        self.disabled
    }
}
