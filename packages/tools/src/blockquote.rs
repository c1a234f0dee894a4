use scriven_dom::Dom;
use scriven_engine::{Plugin, ToolContext};

/// Marker attribute distinguishing a semantic quote from an indent wrapper.
/// Both render as `<blockquote>`; only quotes carry the attribute.
const QUOTE_MARKER: &str = "blockquote";

fn path_has_blockquote(context: &ToolContext<'_>, with_marker: bool) -> bool {
    context.path_has(|dom: &Dom, node| {
        dom.tag(node) == Some("blockquote") && dom.has_attribute(node, QUOTE_MARKER) == with_marker
    })
}

/// Semantic quotation: `<blockquote blockquote>`.
#[derive(Debug, Default)]
pub struct Blockquote {
    active: bool,
    disabled: bool,
}

impl Plugin for Blockquote {
    fn name(&self) -> &str {
        "blockquote"
    }

    fn allowed_tags(&self) -> &[&'static str] {
        &["blockquote"]
    }

    fn refresh(&mut self, context: &ToolContext<'_>) {
        self.active = path_has_blockquote(context, true);
        self.disabled = context.selection.is_none();
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn is_disabled(&self) -> bool {
        self.disabled
    }
}

/// Indentation, expressed as a plain `<blockquote>` wrapper.
#[derive(Debug, Default)]
pub struct Indent {
    active: bool,
    disabled: bool,
}

impl Plugin for Indent {
    fn name(&self) -> &str {
        "indent"
    }

    fn allowed_tags(&self) -> &[&'static str] {
        &["blockquote"]
    }

    fn refresh(&mut self, context: &ToolContext<'_>) {
        self.active = path_has_blockquote(context, false);
        self.disabled = context.selection.is_none();
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn is_disabled(&self) -> bool {
        self.disabled
    }
}
