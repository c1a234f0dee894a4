use std::cell::Cell;

use scriven_dom::{Dom, NodeId};
use scriven_engine::{
    Editor, EngineError, Plugin, Position, RawSelection, SelectionOffsets, EMPTY_DOCUMENT,
    MAX_SANITIZE_PASSES,
};

fn first_text(editor: &Editor) -> NodeId {
    let root = editor.root();
    let p = editor.dom().children(root)[0];
    editor.dom().children(p)[0]
}

#[test]
fn test_set_value_sanitizes_and_records() {
    let mut editor = Editor::new();
    editor.set_value("<div id=\"x\" class=\"y\">hi</div>");
    assert_eq!(editor.value(), "<p>hi</p>");
    assert!(editor.can_undo());
    assert_eq!(editor.history().len(), 2);
}

#[test]
fn test_noop_rewrite_records_nothing() {
    let mut editor = Editor::new();
    editor.set_value(EMPTY_DOCUMENT);
    assert_eq!(editor.history().len(), 1);
    assert!(!editor.can_undo());
}

#[test]
fn test_undo_redo_restores_value_and_selection() {
    let mut editor = Editor::new();
    editor.set_value("<p>hello world</p>");
    editor.settle();

    let text = first_text(&editor);
    editor.select(RawSelection::collapsed(Position {
        node: text,
        offset: 4,
    }));
    editor.settle();
    assert_eq!(
        editor.history().active().selection,
        Some(SelectionOffsets { start: 5, end: 5 })
    );

    editor.set_value("<p>goodbye</p>");
    editor.settle();
    assert!(editor.undo());
    assert_eq!(editor.value(), "<p>hello world</p>");
    editor.settle();

    let descriptor = editor.selection().expect("selection restored after undo");
    assert!(descriptor.collapsed);
    assert_eq!(descriptor.start.offset, 4);
    assert_eq!(editor.dom().text(descriptor.start.node), Some("hello world"));

    assert!(editor.can_redo());
    assert!(editor.redo());
    assert_eq!(editor.value(), "<p>goodbye</p>");
    assert!(!editor.redo());
}

#[test]
fn test_divergent_edit_discards_redo_tail() {
    let mut editor = Editor::new();
    editor.set_value("<p>one</p>");
    editor.set_value("<p>two</p>");
    editor.set_value("<p>three</p>");
    assert_eq!(editor.history().len(), 4);

    editor.undo();
    editor.undo();
    editor.settle();
    assert_eq!(editor.value(), "<p>one</p>");

    editor.set_value("<p>fork</p>");
    assert_eq!(editor.history().len(), 3);
    assert!(!editor.can_redo());
}

#[test]
fn test_mutations_while_suspended_are_unobserved() {
    let mut editor = Editor::new();
    editor.set_value("<p>a</p>");
    editor.set_value("<p>b</p>");
    let entries = editor.history().len();

    // Undo leaves the editor suspended until the scheduler resumes
    // observation; an edit landing in that window is not recorded.
    assert!(editor.undo());
    let root = editor.root();
    let p = editor.dom().children(root)[0];
    editor.edit(|dom| {
        let text = dom.create_text("ghost");
        dom.append(p, text);
    });
    assert_eq!(editor.history().len(), entries);
    assert_eq!(editor.value(), "<p>a</p>");

    // Once observation resumes, edits flow through the pipeline again.
    editor.settle();
    editor.edit(|dom| {
        let text = dom.create_text("!");
        dom.append(p, text);
    });
    assert!(editor.value().contains('!'));
}

#[test]
fn test_style_filtering_via_plugin_policy() {
    struct ColorOnly;
    impl Plugin for ColorOnly {
        fn name(&self) -> &str {
            "color-only"
        }
        fn allowed_tags(&self) -> &[&'static str] {
            &["span"]
        }
        fn allowed_styles(&self) -> &[&'static str] {
            &["color"]
        }
    }

    let mut editor = Editor::new();
    editor.register_plugin(Box::new(ColorOnly));
    editor.set_value("<p><span style=\"color:red;text-decoration:underline\">x</span></p>");
    assert_eq!(
        editor.value(),
        "<p><span style=\"color:red\">x</span></p>"
    );
}

#[test]
fn test_non_converging_hook_hits_pass_bound() {
    struct Restless {
        calls: Cell<usize>,
    }
    impl Plugin for Restless {
        fn name(&self) -> &str {
            "restless"
        }
        fn allowed_tags(&self) -> &[&'static str] {
            &["b"]
        }
        fn sanitize(&self, dom: &mut Dom, node: NodeId) -> bool {
            self.calls.set(self.calls.get() + 1);
            dom.set_attribute(node, "data-restless", &self.calls.get().to_string());
            false
        }
    }

    let mut editor = Editor::new();
    editor.register_plugin(Box::new(Restless {
        calls: Cell::new(0),
    }));
    editor.set_value("<p><b>x</b></p>");

    // The drain stops at the pass bound instead of spinning; the editor
    // stays usable afterwards.
    editor.set_value("<p>recovered</p>");
    assert_eq!(editor.value(), "<p>recovered</p>");
}

#[test]
fn test_pass_bound_call_count() {
    struct Restless {
        calls: std::rc::Rc<Cell<usize>>,
    }
    impl Plugin for Restless {
        fn name(&self) -> &str {
            "restless"
        }
        fn allowed_tags(&self) -> &[&'static str] {
            &["b"]
        }
        fn sanitize(&self, dom: &mut Dom, node: NodeId) -> bool {
            self.calls.set(self.calls.get() + 1);
            dom.set_attribute(node, "data-restless", &self.calls.get().to_string());
            false
        }
    }

    let calls = std::rc::Rc::new(Cell::new(0));
    let mut editor = Editor::new();
    editor.register_plugin(Box::new(Restless {
        calls: calls.clone(),
    }));
    editor.set_value("<p><b>x</b></p>");
    assert_eq!(calls.get(), MAX_SANITIZE_PASSES);
}

#[test]
fn test_selection_persistence_is_coalesced() {
    let mut editor = Editor::new();
    editor.set_value("<p>hello</p>");
    editor.settle();
    let text = first_text(&editor);

    editor.select(RawSelection::collapsed(Position {
        node: text,
        offset: 1,
    }));
    editor.tick(10);
    editor.select(RawSelection::collapsed(Position {
        node: text,
        offset: 3,
    }));
    editor.tick(10);
    // The first persist deadline passes without firing; only the second
    // selection lands in the history entry.
    editor.tick(50);
    assert_eq!(
        editor.history().active().selection,
        Some(SelectionOffsets { start: 4, end: 4 })
    );
}

#[test]
fn test_replace_selection_with_markup() -> anyhow::Result<()> {
    let mut editor = Editor::new();
    editor.set_value("<p>hello world</p>");
    editor.settle();
    let text = first_text(&editor);

    editor.select(RawSelection {
        start: Position {
            node: text,
            offset: 6,
        },
        end: Position {
            node: text,
            offset: 11,
        },
    });
    editor.settle();

    editor.replace_selection("<b>rust</b>")?;
    // Baseline policy does not allow <b>, so the wrapper is unwrapped and
    // the text survives.
    assert_eq!(editor.value(), "<p>hello rust</p>");
    Ok(())
}

#[test]
fn test_replace_selection_without_selection_fails() {
    let mut editor = Editor::new();
    editor.set_value("<p>x</p>");
    assert_eq!(
        editor.replace_selection("<p>y</p>"),
        Err(EngineError::NoSelection)
    );
}

#[test]
fn test_select_node_requires_attachment() {
    let mut editor = Editor::new();
    editor.set_value("<p>x</p>");
    let mut stray = None;
    editor.edit(|dom| {
        stray = Some(dom.create_element("p"));
    });
    let stray = stray.expect("created");
    assert_eq!(editor.select_node(stray), Err(EngineError::NodeDetached));

    let root = editor.root();
    let p = editor.dom().children(root)[0];
    assert!(editor.select_node(p).is_ok());
    editor.settle();
    let descriptor = editor.selection().expect("node selected");
    assert!(!descriptor.collapsed);
    assert_eq!(descriptor.start.node, root);
}

#[test]
fn test_empty_value_repaired_to_placeholder() {
    let mut editor = Editor::new();
    editor.set_value("<p>content</p>");
    editor.set_value("");
    assert_eq!(editor.value(), EMPTY_DOCUMENT);
    assert!(editor.placeholder_visible());
}
