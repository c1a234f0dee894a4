use scriven_engine::{Plugin, ToolContext};

/// Text alignment, carried as a `text-align` style on block elements. Adds
/// no tags of its own; it only widens the style allowlist.
#[derive(Debug, Default)]
pub struct Justify {
    active: bool,
    disabled: bool,
}

impl Plugin for Justify {
    fn name(&self) -> &str {
        "justify"
    }

    fn allowed_styles(&self) -> &[&'static str] {
        &["text-align"]
    }

    fn refresh(&mut self, context: &ToolContext<'_>) {
        self.active = context.path_has(|dom, node| {
            dom.attribute(node, "style")
                .is_some_and(|style| style.contains("text-align"))
        });
        self.disabled = context.selection.is_none();
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn is_disabled(&self) -> bool {
        self.disabled
    }
}
