use scriven_dom::{Dom, NodeId};
use scriven_engine::{Plugin, ToolContext};

/// Inline images. An `<img>` without a `src` renders as nothing and can
/// never regain one through editing, so the hook drops it.
#[derive(Debug, Default)]
pub struct Image {
    active: bool,
    disabled: bool,
}

impl Plugin for Image {
    fn name(&self) -> &str {
        "image"
    }

    fn allowed_tags(&self) -> &[&'static str] {
        &["img"]
    }

    fn sanitize(&self, dom: &mut Dom, node: NodeId) -> bool {
        if !dom.has_attribute(node, "src") {
            dom.detach(node);
            return false;
        }
        true
    }

    fn refresh(&mut self, context: &ToolContext<'_>) {
        self.active = context.path_has_tag("img");
        self.disabled = context.selection.is_none();
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn is_disabled(&self) -> bool {
        self.disabled
    }
}
