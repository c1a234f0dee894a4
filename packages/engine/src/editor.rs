//! # Editor
//!
//! The edit loop controller and the engine's public facade.
//!
//! ## Design
//!
//! The controller has two states. While **observing**, the mutation log is
//! connected and every edit flows through the pipeline: records are queued
//! as a batch, batches drain strictly one at a time through the sanitizer,
//! and a drain that changed the document records a history entry. While
//! **suspended**, the log is disconnected so programmatic rewrites
//! (undo/redo application) do not feed back into the pipeline; observation
//! resumes on the next scheduler tick.
//!
//! Sanitize repairs mutate the tree and therefore produce fresh records;
//! those loop back as follow-up batches until the tree reaches a fixed
//! point or the pass bound cuts the drain off.

use std::collections::VecDeque;

use scriven_dom::{Dom, MutationRecord, NodeId};

use crate::errors::EngineError;
use crate::history::History;
use crate::offsets;
use crate::policy::{Plugin, Policy, ToolContext};
use crate::sanitize::{self, MAX_SANITIZE_PASSES};
use crate::scheduler::{Scheduler, Task};
use crate::selection::{
    self, HostSelection, Position, RawSelection, SelectionDescriptor, SelectionOffsets,
    SelectionPort,
};

/// The canonical empty document: one paragraph holding a line break for the
/// caret to land in.
pub const EMPTY_DOCUMENT: &str = "<p><br></p>";

const SELECTION_UPDATE_DELAY_MS: u64 = 10;
const SELECTION_PERSIST_DELAY_MS: u64 = 50;
const RESUME_OBSERVATION_DELAY_MS: u64 = 10;
const TOOL_REFRESH_DELAY_MS: u64 = 250;

pub struct Editor {
    dom: Dom,
    root: NodeId,
    history: History,
    plugins: Vec<Box<dyn Plugin>>,
    port: Box<dyn SelectionPort>,
    scheduler: Scheduler,
    base_policy: Policy,
    batches: VecDeque<Vec<MutationRecord>>,
    draining: bool,
    selection: Option<SelectionDescriptor>,
    value: String,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    pub fn new() -> Self {
        Self::with_port(Box::<HostSelection>::default())
    }

    /// Build an editor over a custom selection host.
    pub fn with_port(port: Box<dyn SelectionPort>) -> Self {
        let mut dom = Dom::new("div");
        let root = dom.root();
        dom.set_recording(false);
        dom.set_inner_html(root, EMPTY_DOCUMENT);
        dom.set_recording(true);
        Self {
            dom,
            root,
            history: History::new(EMPTY_DOCUMENT),
            plugins: Vec::new(),
            port,
            scheduler: Scheduler::new(),
            base_policy: Policy::baseline(),
            batches: VecDeque::new(),
            draining: false,
            selection: None,
            value: EMPTY_DOCUMENT.to_string(),
        }
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// The document's canonical external representation.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn selection(&self) -> Option<&SelectionDescriptor> {
        self.selection.as_ref()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn placeholder_visible(&self) -> bool {
        self.value.is_empty() || self.value == EMPTY_DOCUMENT
    }

    pub fn plugin(&self, name: &str) -> Option<&dyn Plugin> {
        self.plugins
            .iter()
            .find(|plugin| plugin.name() == name)
            .map(|plugin| plugin.as_ref())
    }

    // ------------------------------------------------------------------
    // Edits
    // ------------------------------------------------------------------

    /// Apply an arbitrary tree edit and run the resulting mutation batch
    /// through the pipeline.
    pub fn edit(&mut self, edit: impl FnOnce(&mut Dom)) {
        edit(&mut self.dom);
        self.on_mutations();
    }

    /// Replace the whole document. The write happens while observing, so
    /// the new content is sanitized and recorded like any other edit.
    pub fn set_value(&mut self, html: &str) {
        self.dom.set_inner_html(self.root, html);
        self.on_mutations();
    }

    pub fn register_plugin(&mut self, plugin: Box<dyn Plugin>) {
        tracing::debug!(name = plugin.name(), "registering plugin");
        self.plugins.push(plugin);
        self.scheduler.debounce(Task::RefreshTools, TOOL_REFRESH_DELAY_MS);
    }

    /// Host event entry point: the selection changed.
    pub fn select(&mut self, raw: RawSelection) {
        self.port.set_focused(true);
        self.port.set(raw);
        self.scheduler
            .debounce(Task::UpdateSelection, SELECTION_UPDATE_DELAY_MS);
    }

    /// Select a whole node (used by tools to re-target an operation, e.g.
    /// before deleting an image).
    pub fn select_node(&mut self, node: NodeId) -> Result<(), EngineError> {
        if !self.dom.is_attached(node) {
            return Err(EngineError::NodeDetached);
        }
        let parent = self.dom.parent(node).ok_or(EngineError::NodeDetached)?;
        let index = self
            .dom
            .child_index(parent, node)
            .ok_or(EngineError::NodeDetached)?;
        self.port.set_focused(true);
        self.port.set(RawSelection {
            start: Position {
                node: parent,
                offset: index,
            },
            end: Position {
                node: parent,
                offset: index + 1,
            },
        });
        self.scheduler
            .debounce(Task::UpdateSelection, SELECTION_UPDATE_DELAY_MS);
        Ok(())
    }

    /// Replace the current selection with parsed markup and collapse the
    /// caret after it.
    pub fn replace_selection(&mut self, html: &str) -> Result<(), EngineError> {
        let raw = self.port.current().ok_or(EngineError::NoSelection)?;
        let descriptor =
            selection::capture(&self.dom, self.root, raw).ok_or(EngineError::NoSelection)?;
        let start = offsets::offset_of_position(&self.dom, self.root, descriptor.start);
        let end = offsets::offset_of_position(&self.dom, self.root, descriptor.end);
        let (from, to) = if start <= end { (start, end) } else { (end, start) };
        if from != to {
            self.delete_range(from, to);
        }
        let caret = self.insert_at(from, html);
        self.port.set_focused(true);
        self.port.set(RawSelection::collapsed(caret));
        self.on_mutations();
        Ok(())
    }

    pub fn focus(&mut self) {
        self.port.set_focused(true);
        self.scheduler
            .debounce(Task::UpdateSelection, SELECTION_UPDATE_DELAY_MS);
    }

    pub fn blur(&mut self) {
        self.port.set_focused(false);
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    pub fn undo(&mut self) -> bool {
        let (html, saved) = match self.history.undo() {
            Some(state) => (state.html.clone(), state.selection),
            None => return false,
        };
        self.apply_snapshot(&html, saved);
        true
    }

    pub fn redo(&mut self) -> bool {
        let (html, saved) = match self.history.redo() {
            Some(state) => (state.html.clone(), state.selection),
            None => return false,
        };
        self.apply_snapshot(&html, saved);
        true
    }

    /// Rewrite the live tree from a history snapshot. Runs suspended:
    /// observation is disconnected for the rewrite and reconnected on the
    /// next tick.
    fn apply_snapshot(&mut self, html: &str, saved: Option<SelectionOffsets>) {
        self.dom.set_recording(false);
        self.dom.set_inner_html(self.root, html);
        self.value = html.to_string();
        match saved {
            Some(saved) => {
                let raw = selection::restore(&self.dom, self.root, saved);
                self.port.set_focused(true);
                self.port.set(raw);
            }
            None => self.port.clear(),
        }
        self.scheduler
            .debounce(Task::ResumeObservation, RESUME_OBSERVATION_DELAY_MS);
        self.scheduler
            .debounce(Task::UpdateSelection, SELECTION_UPDATE_DELAY_MS);
    }

    // ------------------------------------------------------------------
    // Scheduler
    // ------------------------------------------------------------------

    /// Advance the clock by `delta_ms`, running tasks that come due.
    pub fn tick(&mut self, delta_ms: u64) {
        for task in self.scheduler.advance(delta_ms) {
            self.run_task(task);
        }
    }

    /// Drive the scheduler until no task is pending.
    pub fn settle(&mut self) {
        while let Some(deadline) = self.scheduler.next_deadline() {
            for task in self.scheduler.advance_to(deadline) {
                self.run_task(task);
            }
        }
    }

    fn run_task(&mut self, task: Task) {
        match task {
            Task::UpdateSelection => self.update_selection(),
            Task::PersistSelection => self.persist_selection(),
            Task::ResumeObservation => self.dom.set_recording(true),
            Task::RefreshTools => self.refresh_tools(),
        }
    }

    // ------------------------------------------------------------------
    // Pipeline
    // ------------------------------------------------------------------

    fn on_mutations(&mut self) {
        let records = self.dom.take_records();
        if records.is_empty() {
            return;
        }
        self.batches.push_back(records);
        if self.draining {
            return;
        }
        self.drain();
    }

    /// Drain queued batches strictly one at a time. Repairs requeue their
    /// own records; the pass bound keeps a non-converging repair cycle from
    /// spinning forever.
    fn drain(&mut self) {
        self.draining = true;
        let mut passes = 0;
        while let Some(batch) = self.batches.pop_front() {
            if passes >= MAX_SANITIZE_PASSES {
                tracing::warn!(passes, "sanitize did not converge; dropping remaining batches");
                self.batches.clear();
                self.dom.take_records();
                break;
            }
            passes += 1;
            let policy = Policy::effective(&self.base_policy, &self.plugins);
            sanitize::sanitize(&mut self.dom, self.root, &policy, &self.plugins, &batch);
            let repairs = self.dom.take_records();
            if !repairs.is_empty() {
                self.batches.push_back(repairs);
            }
        }
        self.draining = false;

        let html = self.dom.inner_html(self.root);
        self.history.record_if_changed(&html);
        self.value = html;
        self.scheduler
            .debounce(Task::UpdateSelection, SELECTION_UPDATE_DELAY_MS);
    }

    fn update_selection(&mut self) {
        let captured = self
            .port
            .current()
            .and_then(|raw| selection::capture(&self.dom, self.root, raw));
        if let Some(descriptor) = &captured {
            // Write the normalized boundaries back to the host.
            let normalized = RawSelection {
                start: descriptor.start,
                end: descriptor.end,
            };
            if self.port.current() != Some(normalized) {
                self.port.set(normalized);
            }
            if self.port.is_focused() {
                self.scheduler
                    .debounce(Task::PersistSelection, SELECTION_PERSIST_DELAY_MS);
            }
        }
        self.selection = captured;
        self.scheduler
            .debounce(Task::RefreshTools, TOOL_REFRESH_DELAY_MS);
    }

    fn persist_selection(&mut self) {
        if let Some(descriptor) = &self.selection {
            let saved = selection::to_offsets(&self.dom, self.root, descriptor);
            self.history.set_active_selection(Some(saved));
        }
    }

    fn refresh_tools(&mut self) {
        let context = ToolContext {
            dom: &self.dom,
            root: self.root,
            selection: self.selection.as_ref(),
            value: &self.value,
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        };
        for plugin in self.plugins.iter_mut() {
            plugin.refresh(&context);
        }
    }

    // ------------------------------------------------------------------
    // Range editing
    // ------------------------------------------------------------------

    /// Delete the content between two document offsets: trim the boundary
    /// text nodes and detach every node whose span lies fully inside the
    /// range. Spans are classified up front, before any structural change.
    fn delete_range(&mut self, from: usize, to: usize) {
        let (start_node, start_offset) = offsets::node_at_offset(&self.dom, self.root, from);
        let (end_node, end_offset) = offsets::node_at_offset(&self.dom, self.root, to);

        if start_node == end_node {
            if let Some(text) = self.dom.text(start_node) {
                let kept: String = text
                    .chars()
                    .take(start_offset)
                    .chain(text.chars().skip(end_offset))
                    .collect();
                self.dom.set_text(start_node, &kept);
                return;
            }
        }

        let spans = offsets::subtree_spans(&self.dom, self.root);
        let mut removed: Vec<NodeId> = Vec::new();
        for (node, span_start, span_end) in spans {
            if span_start >= from
                && span_end <= to
                && !self.dom.contains(node, start_node)
                && !self.dom.contains(node, end_node)
                && !removed.iter().any(|&kept| self.dom.contains(kept, node))
            {
                // Children come before parents in span order; keep only the
                // topmost node of each removed subtree.
                removed.retain(|&earlier| !self.dom.contains(node, earlier));
                removed.push(node);
            }
        }

        if let Some(text) = self.dom.text(start_node) {
            let kept: String = text.chars().take(start_offset).collect();
            self.dom.set_text(start_node, &kept);
        }
        if let Some(text) = self.dom.text(end_node) {
            let kept: String = text.chars().skip(end_offset).collect();
            self.dom.set_text(end_node, &kept);
        }
        for node in removed {
            self.dom.detach(node);
        }
    }

    /// Insert parsed markup at a document offset, splitting a text node when
    /// the offset falls inside one. Returns the caret position after the
    /// inserted content.
    fn insert_at(&mut self, offset: usize, html: &str) -> Position {
        let (node, intra) = offsets::node_at_offset(&self.dom, self.root, offset);

        if let Some(len) = self.dom.text_len(node) {
            let container = self.dom.parent(node).unwrap_or(self.root);
            let reference = if intra == 0 {
                Some(node)
            } else if intra >= len {
                self.dom.next_sibling(node)
            } else {
                Some(self.dom.split_text(node, intra))
            };
            let inserted = self.dom.insert_html_before(container, html, reference);
            return self.caret_after(container, &inserted);
        }

        let reference = self.dom.children(node).get(intra).copied();
        let inserted = self.dom.insert_html_before(node, html, reference);
        self.caret_after(node, &inserted)
    }

    fn caret_after(&self, container: NodeId, inserted: &[NodeId]) -> Position {
        if let Some(&last) = inserted.last() {
            if let Some(len) = self.dom.text_len(last) {
                return Position {
                    node: last,
                    offset: len,
                };
            }
            if let Some(index) = self.dom.child_index(container, last) {
                return Position {
                    node: container,
                    offset: index + 1,
                };
            }
        }
        Position {
            node: container,
            offset: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_editor_is_empty_document() {
        let editor = Editor::new();
        assert_eq!(editor.value(), EMPTY_DOCUMENT);
        assert!(editor.placeholder_visible());
        assert!(!editor.can_undo());
        assert!(!editor.can_redo());
        assert_eq!(editor.history().len(), 1);
    }

    #[test]
    fn test_set_value_leaves_placeholder_state() {
        let mut editor = Editor::new();
        editor.set_value("<p>content</p>");
        assert!(!editor.placeholder_visible());
        assert_eq!(editor.value(), "<p>content</p>");
        assert!(editor.can_undo());
    }
}
