//! # Scriven Tools
//!
//! The standard plugin set: each tool contributes its markup policy
//! (allowed tags, allowed style properties, tag replacements), an optional
//! repair hook for its own tags, and derives activation state from the
//! selection descriptor the engine pushes on refresh.
//!
//! Tools carry no UI. A host toolbar reads `is_active`/`is_disabled` off
//! the registered plugins and issues commands through the editor facade.

mod blockquote;
mod code;
mod color;
mod heading;
mod image;
mod inline;
mod justify;
mod link;
mod list;
mod table;

pub use blockquote::{Blockquote, Indent};
pub use code::Code;
pub use color::Color;
pub use heading::Heading;
pub use image::Image;
pub use inline::{Bold, Italic, Strike, Underline};
pub use justify::Justify;
pub use link::Link;
pub use list::Lists;
pub use table::Table;

use scriven_engine::Plugin;

/// Every standard tool, in the conventional toolbar order.
pub fn standard_plugins() -> Vec<Box<dyn Plugin>> {
    vec![
        Box::new(Bold::default()),
        Box::new(Italic::default()),
        Box::new(Underline::default()),
        Box::new(Strike::default()),
        Box::new(Color::default()),
        Box::new(Link::default()),
        Box::new(Heading::default()),
        Box::new(Blockquote::default()),
        Box::new(Indent::default()),
        Box::new(Lists::default()),
        Box::new(Table::default()),
        Box::new(Code::default()),
        Box::new(Justify::default()),
        Box::new(Image::default()),
    ]
}
