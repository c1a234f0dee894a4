//! # Scriven DOM
//!
//! The mutable HTML tree that the Scriven editing engine operates on.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ dom: HTML text ⇄ arena tree                 │
//! │  - Arena node store addressed by NodeId     │
//! │  - Lenient fragment parser (never fails)    │
//! │  - Canonical serializer                     │
//! │  - Mutation log (observer role)             │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ engine: sanitize + history + selection      │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Ids are stable**: a `NodeId` stays valid for the lifetime of the
//!    `Dom`, even after the node is detached. Attachment is a query, not a
//!    property of the id.
//! 2. **Parsing repairs**: malformed markup is absorbed, never rejected.
//!    There is no error path out of `set_inner_html`.
//! 3. **Every structural edit is observable**: mutating operations append
//!    `MutationRecord`s to the log while it is connected, so the engine can
//!    replay exactly what changed.

mod mutation;
mod node;
mod parser;
mod serializer;
mod tokenizer;

pub use mutation::MutationRecord;
pub use node::{Dom, NodeData, NodeId};
pub use parser::decode_entities;
pub use serializer::{escape_attr, escape_text, is_void_tag};
