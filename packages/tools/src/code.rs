use scriven_dom::{Dom, NodeId};
use scriven_engine::{Plugin, ToolContext};

/// Inline code spans. The repair hook unwraps a `<code>` that ended up
/// containing paragraphs, which happens when a block selection is wrapped
/// wholesale.
#[derive(Debug, Default)]
pub struct Code {
    active: bool,
    disabled: bool,
}

impl Plugin for Code {
    fn name(&self) -> &str {
        "code"
    }

    fn allowed_tags(&self) -> &[&'static str] {
        &["code"]
    }

    fn sanitize(&self, dom: &mut Dom, node: NodeId) -> bool {
        let wraps_block = dom
            .children(node)
            .iter()
            .any(|&child| dom.tag(child) == Some("p"));
        if wraps_block {
            dom.unwrap(node);
            return false;
        }
        true
    }

    fn refresh(&mut self, context: &ToolContext<'_>) {
        self.active = context.path_has_tag("code");
        self.disabled = context.selection.is_none();
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn is_disabled(&self) -> bool {
        self.disabled
    }
}
