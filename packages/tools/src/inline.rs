//! Inline formatting tools: bold, italic, underline, strikethrough.
//!
//! These contribute a single tag each, plus replacements that canonicalize
//! the semantic variants (`strong`, `em`, `strike`, `del`) pasted content
//! tends to carry.

use scriven_engine::{Plugin, ToolContext};

macro_rules! inline_tool {
    ($name:ident, $label:literal, $tag:literal, $replacements:expr) => {
        #[derive(Debug, Default)]
        pub struct $name {
            active: bool,
            disabled: bool,
        }

        impl Plugin for $name {
            fn name(&self) -> &str {
                $label
            }

            fn allowed_tags(&self) -> &[&'static str] {
                &[$tag]
            }

            fn replacements(&self) -> &[(&'static str, &'static str)] {
                $replacements
            }

            fn refresh(&mut self, context: &ToolContext<'_>) {
                self.active = context.path_has_tag($tag);
                self.disabled = context.selection.is_none();
            }

            fn is_active(&self) -> bool {
                self.active
            }

            fn is_disabled(&self) -> bool {
                self.disabled
            }
        }
    };
}

inline_tool!(Bold, "bold", "b", &[("strong", "b")]);
inline_tool!(Italic, "italic", "i", &[("em", "i")]);
inline_tool!(Underline, "underline", "u", &[]);
inline_tool!(Strike, "strike", "s", &[("strike", "s"), ("del", "s")]);
