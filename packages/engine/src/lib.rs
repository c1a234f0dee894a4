//! # Scriven Engine
//!
//! The editing state engine behind a contenteditable surface: it keeps the
//! document sanitized against a pluggable markup policy, maps selections to
//! integer offsets that survive structural rewrites, and maintains a linear
//! undo/redo history.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │ Editor (edit loop controller)                    │
//! │                                                  │
//! │  mutation batch ─→ sanitize ─→ history ─→ tools  │
//! │        ↑              │            │             │
//! │        └── repairs ───┘       selection offsets  │
//! └──────────────────────────────────────────────────┘
//!          │                 │                │
//!       offsets           policy          scheduler
//!   (position ⇄ int)  (plugin merge)  (debounced tasks)
//! ```
//!
//! ## Design
//!
//! Everything runs single threaded and cooperatively. The `Dom` is the one
//! shared resource; the editor is its sole writer during sanitize passes and
//! undo/redo, and it disconnects the mutation log around programmatic
//! rewrites so they never feed back into the pipeline. Timer behavior
//! (selection settling, persistence debounce, tool refresh) is modeled by an
//! explicit [`scheduler::Scheduler`] driven from tests or the host loop.

pub mod editor;
pub mod errors;
pub mod history;
pub mod offsets;
pub mod policy;
pub mod sanitize;
pub mod scheduler;
pub mod selection;

pub use editor::{Editor, EMPTY_DOCUMENT};
pub use errors::EngineError;
pub use history::{DocumentState, History};
pub use policy::{Plugin, Policy, ToolContext};
pub use sanitize::MAX_SANITIZE_PASSES;
pub use scheduler::{Scheduler, Task};
pub use selection::{
    HostSelection, Position, RawSelection, SelectionDescriptor, SelectionOffsets, SelectionPort,
};
