use thiserror::Error;

/// Everything here is locally recoverable; nothing terminates the session.
/// Operations report a status plus a diagnostic, never panic across the
/// core boundary.
#[derive(Debug, Error)]
pub enum EditError {
    #[error("no active map; create or import one first")]
    EmptyState,

    #[error("nothing to undo")]
    NothingToUndo,

    #[error("nothing to redo")]
    NothingToRedo,

    #[error("invalid frequency offset {0:?}; falling back to a random offset")]
    ParseOffset(String),

    #[error("import failed: {0}")]
    Import(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
