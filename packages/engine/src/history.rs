//! # History Stack
//!
//! Linear undo/redo over document snapshots. A snapshot is the serialized
//! document plus, filled in shortly after the fact, the selection offsets
//! that were live in that state. Recording while not at the tail discards
//! the redo states; undo and redo only move the index.

use serde::{Deserialize, Serialize};

use crate::selection::SelectionOffsets;

/// One entry in the history: an HTML snapshot and the selection that was
/// active in it. The selection arrives asynchronously (debounced) and may
/// stay `None` for states the user never placed a caret in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentState {
    pub html: String,
    pub selection: Option<SelectionOffsets>,
}

#[derive(Debug)]
pub struct History {
    states: Vec<DocumentState>,
    active: usize,
}

impl History {
    /// A history is never empty: it starts with the given document as its
    /// single state.
    pub fn new(seed_html: &str) -> Self {
        Self {
            states: vec![DocumentState {
                html: seed_html.to_string(),
                selection: None,
            }],
            active: 0,
        }
    }

    pub fn active(&self) -> &DocumentState {
        &self.states[self.active]
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Push a new state if `html` differs from the active snapshot,
    /// truncating any redo tail first. Returns whether a state was recorded.
    pub fn record_if_changed(&mut self, html: &str) -> bool {
        if self.states[self.active].html == html {
            return false;
        }
        self.states.truncate(self.active + 1);
        self.states.push(DocumentState {
            html: html.to_string(),
            selection: None,
        });
        self.active = self.states.len() - 1;
        tracing::debug!(index = self.active, "recorded history state");
        true
    }

    /// Store selection offsets on the active entry. Never creates an entry.
    pub fn set_active_selection(&mut self, selection: Option<SelectionOffsets>) {
        self.states[self.active].selection = selection;
    }

    pub fn can_undo(&self) -> bool {
        self.active > 0
    }

    pub fn can_redo(&self) -> bool {
        self.active < self.states.len() - 1
    }

    /// Step back one state. Returns the new active state for the caller to
    /// apply to the live tree, or `None` at the oldest state.
    pub fn undo(&mut self) -> Option<&DocumentState> {
        if !self.can_undo() {
            return None;
        }
        self.active -= 1;
        Some(&self.states[self.active])
    }

    /// Step forward one state, or `None` at the tail.
    pub fn redo(&mut self) -> Option<&DocumentState> {
        if !self.can_redo() {
            return None;
        }
        self.active += 1;
        Some(&self.states[self.active])
    }
}
