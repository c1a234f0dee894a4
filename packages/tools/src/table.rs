use scriven_dom::{Dom, NodeId};
use scriven_engine::{Plugin, ToolContext};

const TABLE_TAGS: &[&str] = &[
    "table", "thead", "tbody", "tfoot", "caption", "col", "colgroup", "tr", "th", "td",
];

/// Tables. The repair hook enforces the containment rules row markup needs
/// to stay renderable: sections only inside tables, rows only inside
/// tables or sections, cells only inside rows. A table holding anything
/// else is unwrapped rather than patched.
#[derive(Debug, Default)]
pub struct Table {
    active: bool,
    disabled: bool,
}

fn parent_tag<'a>(dom: &'a Dom, node: NodeId) -> Option<&'a str> {
    dom.parent(node).and_then(|parent| dom.tag(parent))
}

impl Plugin for Table {
    fn name(&self) -> &str {
        "table"
    }

    fn allowed_tags(&self) -> &[&'static str] {
        TABLE_TAGS
    }

    fn sanitize(&self, dom: &mut Dom, node: NodeId) -> bool {
        match dom.tag(node) {
            Some("table") => {
                if dom.children(node).is_empty() {
                    dom.detach(node);
                    return false;
                }
                let invalid_child = dom.children(node).iter().any(|&child| {
                    dom.is_element(child)
                        && !matches!(
                            dom.tag(child),
                            Some("caption" | "colgroup" | "thead" | "tbody" | "tfoot" | "tr")
                        )
                });
                if invalid_child {
                    tracing::debug!("unwrapping table with invalid children");
                    dom.unwrap(node);
                    return false;
                }
            }
            Some("thead" | "tbody" | "tfoot") => {
                if dom.children(node).is_empty() {
                    dom.detach(node);
                    return false;
                }
                if parent_tag(dom, node) != Some("table") {
                    dom.unwrap(node);
                    return false;
                }
            }
            Some("tr") => {
                if !matches!(parent_tag(dom, node), Some("table" | "thead" | "tbody" | "tfoot")) {
                    dom.unwrap(node);
                    return false;
                }
            }
            Some("td" | "th") => {
                if parent_tag(dom, node) != Some("tr") {
                    dom.unwrap(node);
                    return false;
                }
            }
            Some("caption" | "colgroup") => {
                if parent_tag(dom, node) != Some("table") {
                    dom.unwrap(node);
                    return false;
                }
            }
            Some("col") => {
                if parent_tag(dom, node) != Some("colgroup") {
                    dom.detach(node);
                    return false;
                }
            }
            _ => {}
        }
        true
    }

    fn refresh(&mut self, context: &ToolContext<'_>) {
        self.active = context.path_has_tag("table");
        self.disabled = context.selection.is_none();
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn is_disabled(&self) -> bool {
        self.disabled
    }
}
