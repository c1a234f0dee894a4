use scriven_dom::{Dom, NodeId};
use scriven_engine::{Plugin, ToolContext};

/// Anchors. The repair hook reduces an `<a>` to its safe surface: only
/// `href` and `target` survive, and `href` must be an http(s) URL.
#[derive(Debug, Default)]
pub struct Link {
    active: bool,
    disabled: bool,
}

fn href_allowed(href: &str) -> bool {
    let href = href.trim().to_ascii_lowercase();
    href.starts_with("http://") || href.starts_with("https://")
}

impl Plugin for Link {
    fn name(&self) -> &str {
        "link"
    }

    fn allowed_tags(&self) -> &[&'static str] {
        &["a"]
    }

    fn sanitize(&self, dom: &mut Dom, node: NodeId) -> bool {
        let mut valid = true;
        let names: Vec<String> = dom
            .attributes(node)
            .iter()
            .map(|(name, _)| name.clone())
            .collect();
        for name in names {
            if name != "href" && name != "target" {
                dom.remove_attribute(node, &name);
                valid = false;
            }
        }
        if let Some(href) = dom.attribute(node, "href") {
            if !href_allowed(href) {
                tracing::debug!(%href, "stripping disallowed link target");
                dom.remove_attribute(node, "href");
                valid = false;
            }
        }
        valid
    }

    fn refresh(&mut self, context: &ToolContext<'_>) {
        self.active = context.path_has_tag("a");
        self.disabled = context.selection.is_none();
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn is_disabled(&self) -> bool {
        self.disabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_href_allowed() {
        assert!(href_allowed("https://example.test/page"));
        assert!(href_allowed("  HTTP://EXAMPLE.TEST  "));
        assert!(!href_allowed("javascript:alert(1)"));
        assert!(!href_allowed("ftp://example.test"));
        assert!(!href_allowed("/relative"));
    }
}
