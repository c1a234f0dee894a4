//! Lenient fragment parser.
//!
//! Builds nodes under an existing parent using an open-element stack. There
//! is no error path: unmatched closing tags are ignored, unclosed elements
//! are closed at end of input, and comments and doctypes are dropped. The
//! attachment happens through the unlogged plumbing so callers control what
//! single mutation record the parse amounts to.

use crate::node::{Dom, NodeId};
use crate::serializer::is_void_tag;
use crate::tokenizer::{self, Token};

/// Parse `html` and append the resulting nodes as children of `parent`.
/// No mutation records are produced.
pub(crate) fn parse_into(dom: &mut Dom, parent: NodeId, html: &str) {
    let mut stack = vec![parent];
    for token in tokenizer::tokenize(html) {
        match token {
            Token::Text(raw) => {
                let top = stack[stack.len() - 1];
                let text = dom.create_text(&decode_entities(raw));
                dom.append_unlogged(top, text);
            }
            Token::Stray => {
                let top = stack[stack.len() - 1];
                let text = dom.create_text("<");
                dom.append_unlogged(top, text);
            }
            Token::OpenTag(slice) => {
                let (tag, attributes, self_closing) = scan_tag(slice);
                let top = stack[stack.len() - 1];
                let element = dom.create_element_with_attrs(&tag, attributes);
                dom.append_unlogged(top, element);
                if !self_closing && !is_void_tag(&tag) {
                    stack.push(element);
                }
            }
            Token::CloseTag(slice) => {
                let tag = close_tag_name(slice);
                // Pop to the nearest matching open element; never pop the
                // parent the fragment is being built under.
                if let Some(depth) = stack[1..]
                    .iter()
                    .rposition(|&id| dom.tag(id) == Some(tag.as_str()))
                {
                    stack.truncate(depth + 1);
                }
            }
            Token::Comment | Token::Doctype => {}
        }
    }
}

/// Pick an opening tag apart into name, attributes, and whether it ends in
/// `/>`. Names are lowercased; values are entity-decoded. A bare attribute
/// gets an empty value.
fn scan_tag(slice: &str) -> (String, Vec<(String, String)>, bool) {
    let body = slice.trim_start_matches('<').trim_end_matches('>');
    let (body, self_closing) = match body.strip_suffix('/') {
        Some(stripped) => (stripped, true),
        None => (body, false),
    };
    let mut chars = body.char_indices().peekable();

    let mut tag = String::new();
    for (_, c) in chars.by_ref() {
        if c.is_whitespace() {
            break;
        }
        tag.push(c.to_ascii_lowercase());
    }

    let mut attributes: Vec<(String, String)> = Vec::new();
    loop {
        while matches!(chars.peek(), Some((_, c)) if c.is_whitespace() || *c == '/') {
            chars.next();
        }
        let mut name = String::new();
        while let Some(&(_, c)) = chars.peek() {
            if c.is_whitespace() || c == '=' || c == '/' {
                break;
            }
            name.push(c.to_ascii_lowercase());
            chars.next();
        }
        if name.is_empty() {
            break;
        }
        while matches!(chars.peek(), Some((_, c)) if c.is_whitespace()) {
            chars.next();
        }
        let mut value = String::new();
        if matches!(chars.peek(), Some((_, '='))) {
            chars.next();
            while matches!(chars.peek(), Some((_, c)) if c.is_whitespace()) {
                chars.next();
            }
            match chars.peek().copied() {
                Some((_, quote @ ('"' | '\''))) => {
                    chars.next();
                    for (_, c) in chars.by_ref() {
                        if c == quote {
                            break;
                        }
                        value.push(c);
                    }
                }
                _ => {
                    while let Some(&(_, c)) = chars.peek() {
                        if c.is_whitespace() {
                            break;
                        }
                        value.push(c);
                        chars.next();
                    }
                }
            }
        }
        if !attributes.iter().any(|(n, _)| *n == name) {
            attributes.push((name, decode_entities(&value)));
        }
    }
    (tag, attributes, self_closing)
}

fn close_tag_name(slice: &str) -> String {
    slice
        .trim_start_matches("</")
        .trim_end_matches('>')
        .trim()
        .to_ascii_lowercase()
}

/// Decode the character references the serializer emits, plus decimal and
/// hex numeric references. Unrecognized sequences are kept literally.
pub fn decode_entities(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let candidate = &rest[start..];
        match decode_one(candidate) {
            Some((decoded, consumed)) => {
                out.push(decoded);
                rest = &candidate[consumed..];
            }
            None => {
                out.push('&');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_one(input: &str) -> Option<(char, usize)> {
    let end = input.find(';')?;
    if end > 12 {
        return None;
    }
    let name = &input[1..end];
    let decoded = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else if let Some(dec) = name.strip_prefix('#') {
                dec.parse::<u32>().ok()?
            } else {
                return None;
            };
            char::from_u32(code)?
        }
    };
    Some((decoded, end + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(html: &str) -> Dom {
        let mut dom = Dom::new("div");
        let root = dom.root();
        parse_into(&mut dom, root, html);
        dom
    }

    #[test]
    fn test_nested_elements() {
        let dom = parse("<p><b>bold</b> tail</p>");
        let root = dom.root();
        let p = dom.children(root)[0];
        assert_eq!(dom.tag(p), Some("p"));
        let b = dom.children(p)[0];
        assert_eq!(dom.tag(b), Some("b"));
        assert_eq!(dom.text_content(p), "bold tail");
    }

    #[test]
    fn test_unclosed_element_closed_at_end() {
        let dom = parse("<p>open");
        let p = dom.children(dom.root())[0];
        assert_eq!(dom.text_content(p), "open");
    }

    #[test]
    fn test_unmatched_close_tag_ignored() {
        let dom = parse("a</span>b");
        let root = dom.root();
        assert_eq!(dom.children(root).len(), 2);
        assert_eq!(dom.text_content(root), "ab");
    }

    #[test]
    fn test_void_element_takes_no_children() {
        let dom = parse("<p><br>after</p>");
        let p = dom.children(dom.root())[0];
        let children = dom.children(p);
        assert_eq!(dom.tag(children[0]), Some("br"));
        assert_eq!(dom.text(children[1]), Some("after"));
    }

    #[test]
    fn test_attributes_scanned() {
        let dom = parse(r#"<a href="https://x.test/?a=1&amp;b=2" target=_blank download>x</a>"#);
        let a = dom.children(dom.root())[0];
        assert_eq!(dom.attribute(a, "href"), Some("https://x.test/?a=1&b=2"));
        assert_eq!(dom.attribute(a, "target"), Some("_blank"));
        assert_eq!(dom.attribute(a, "download"), Some(""));
    }

    #[test]
    fn test_close_tag_pops_past_unclosed_inline() {
        let dom = parse("<p><b>x</p>after");
        let root = dom.root();
        // </p> closes both b and p; "after" lands at the top level.
        assert_eq!(dom.children(root).len(), 2);
        assert_eq!(dom.text(dom.children(root)[1]), Some("after"));
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("a &amp; b"), "a & b");
        assert_eq!(decode_entities("&lt;p&gt;"), "<p>");
        assert_eq!(decode_entities("&#169;&#x2014;"), "\u{a9}\u{2014}");
        assert_eq!(decode_entities("&nbsp;"), "\u{a0}");
        assert_eq!(decode_entities("&bogus; &"), "&bogus; &");
    }
}
