use scriven_engine::{Plugin, ToolContext};

const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// Heading levels one through six. Active when the selection sits inside
/// any heading; the level of the innermost one is exposed for the toolbar.
#[derive(Debug, Default)]
pub struct Heading {
    active_level: Option<u8>,
    disabled: bool,
}

impl Heading {
    pub fn active_level(&self) -> Option<u8> {
        self.active_level
    }
}

impl Plugin for Heading {
    fn name(&self) -> &str {
        "heading"
    }

    fn allowed_tags(&self) -> &[&'static str] {
        HEADING_TAGS
    }

    fn refresh(&mut self, context: &ToolContext<'_>) {
        self.disabled = context.selection.is_none();
        self.active_level = context.selection.and_then(|descriptor| {
            descriptor.ancestor_path.iter().find_map(|&node| {
                let tag = context.dom.tag(node)?;
                HEADING_TAGS
                    .iter()
                    .position(|&h| h == tag)
                    .map(|index| index as u8 + 1)
            })
        });
    }

    fn is_active(&self) -> bool {
        self.active_level.is_some()
    }

    fn is_disabled(&self) -> bool {
        self.disabled
    }
}
