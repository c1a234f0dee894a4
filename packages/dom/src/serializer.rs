//! Canonical serializer.
//!
//! Emits deterministic markup: lowercase tags, attributes in stored order,
//! bare attributes for empty values, void elements without closing tags.
//! The engine compares serialized values to detect whether an edit pass
//! changed anything, so byte-for-byte stability matters here.

use crate::node::{Dom, NodeData, NodeId};

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Whether `tag` is a void element (no children, no closing tag).
pub fn is_void_tag(tag: &str) -> bool {
    VOID_TAGS.contains(&tag)
}

/// Escape a text run for element content. Non-breaking spaces are written as
/// `&nbsp;` so they survive a trip through host markup untouched.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape an attribute value for double-quoted serialization.
pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
    out
}

/// Markup for the children of `id`.
pub(crate) fn inner_html(dom: &Dom, id: NodeId) -> String {
    let mut out = String::new();
    for &child in dom.children(id) {
        write_node(dom, child, &mut out);
    }
    out
}

/// Markup for `id` itself, children included.
pub(crate) fn outer_html(dom: &Dom, id: NodeId) -> String {
    let mut out = String::new();
    write_node(dom, id, &mut out);
    out
}

fn write_node(dom: &Dom, id: NodeId, out: &mut String) {
    match dom.data(id) {
        NodeData::Text(text) => out.push_str(&escape_text(text)),
        NodeData::Element { tag, attributes } => {
            out.push('<');
            out.push_str(tag);
            for (name, value) in attributes {
                out.push(' ');
                out.push_str(name);
                if !value.is_empty() {
                    out.push_str("=\"");
                    out.push_str(&escape_attr(value));
                    out.push('"');
                }
            }
            out.push('>');
            if is_void_tag(tag) {
                return;
            }
            for &child in dom.children(id) {
                write_node(dom, child, out);
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inner_html_round_trip() {
        let mut dom = Dom::new("div");
        let root = dom.root();
        dom.set_inner_html(root, "<p>a <b>b</b></p><p><br></p>");
        assert_eq!(dom.inner_html(root), "<p>a <b>b</b></p><p><br></p>");
    }

    #[test]
    fn test_text_escaped() {
        let mut dom = Dom::new("div");
        let root = dom.root();
        let text = dom.create_text("1 < 2 & 3\u{a0}4");
        dom.append(root, text);
        assert_eq!(dom.inner_html(root), "1 &lt; 2 &amp; 3&nbsp;4");
    }

    #[test]
    fn test_bare_attribute_for_empty_value() {
        let mut dom = Dom::new("div");
        let root = dom.root();
        let a = dom.create_element("a");
        dom.set_attribute(a, "download", "");
        dom.set_attribute(a, "href", "x?a=1&b=2");
        dom.append(root, a);
        assert_eq!(dom.inner_html(root), r#"<a download href="x?a=1&amp;b=2"></a>"#);
    }

    #[test]
    fn test_void_element_has_no_close_tag() {
        let mut dom = Dom::new("div");
        let root = dom.root();
        let img = dom.create_element("img");
        dom.set_attribute(img, "src", "p.png");
        dom.append(root, img);
        assert_eq!(dom.outer_html(img), r#"<img src="p.png">"#);
    }
}
