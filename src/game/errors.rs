use thiserror::Error;

/// Errors surfaced by the turn engine and its score-keeping boundary.
///
/// None of these are fatal: the session is left untouched and the caller
/// may retry with corrected input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// The requested action is not legal in the current session state.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// The score store could not be read or written.
    #[error("persistence unavailable: {0}")]
    PersistenceUnavailable(String),
}

impl GameError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        GameError::InvalidOperation(msg.into())
    }
}
