use thiserror::Error;

/// Errors surfaced by the editor's command API. The sanitize, history, and
/// selection internals have no failure path of their own; these cover
/// commands that need a precondition the caller can observe.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("no active selection inside the editable root")]
    NoSelection,

    #[error("node is not attached to the editable root")]
    NodeDetached,
}
