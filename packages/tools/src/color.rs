use scriven_engine::{Plugin, ToolContext};

/// Text color, carried as `color` in a `<span>`'s style. Legacy `<font>`
/// wrappers are rewritten to spans (losing their attributes, the same as
/// any tag replacement).
#[derive(Debug, Default)]
pub struct Color {
    active: bool,
    disabled: bool,
}

impl Plugin for Color {
    fn name(&self) -> &str {
        "color"
    }

    fn allowed_tags(&self) -> &[&'static str] {
        &["span"]
    }

    fn allowed_styles(&self) -> &[&'static str] {
        &["color"]
    }

    fn replacements(&self) -> &[(&'static str, &'static str)] {
        &[("font", "span")]
    }

    fn refresh(&mut self, context: &ToolContext<'_>) {
        self.active = context.path_has(|dom, node| {
            dom.tag(node) == Some("span")
                && dom
                    .attribute(node, "style")
                    .is_some_and(|style| style.contains("color"))
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
