//! # Mutation Log
//!
//! Plays the observer role for the editing engine: every mutating `Dom`
//! operation appends a record while the log is connected, and the engine
//! drains records in arrival order to drive its sanitize passes.
//!
//! Disconnecting the log is how the engine brackets programmatic rewrites
//! (undo/redo, bulk value replacement) so they do not feed back into the
//! sanitize pipeline.

use crate::node::NodeId;
use serde::{Deserialize, Serialize};

/// One observed tree change: the node whose content or attributes changed,
/// plus any nodes the change introduced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationRecord {
    /// The node the mutation happened on (the parent for child-list changes,
    /// the node itself for attribute and text changes).
    pub target: NodeId,

    /// Nodes added to the tree by this mutation, if any.
    pub added: Vec<NodeId>,
}

impl MutationRecord {
    pub fn target_only(target: NodeId) -> Self {
        Self {
            target,
            added: Vec::new(),
        }
    }

    pub fn with_added(target: NodeId, added: Vec<NodeId>) -> Self {
        Self { target, added }
    }
}

/// FIFO of pending records. Records produced while disconnected are dropped.
#[derive(Debug, Default)]
pub(crate) struct MutationLog {
    records: Vec<MutationRecord>,
    connected: bool,
}

impl MutationLog {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            connected: true,
        }
    }

    pub fn push(&mut self, record: MutationRecord) {
        if self.connected {
            self.records.push(record);
        }
    }

    pub fn take(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.records)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
        if !connected {
            self.records.clear();
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }
}
