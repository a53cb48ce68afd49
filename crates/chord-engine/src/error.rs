//! Error types for the chord engine.

use thiserror::Error;

/// Failure reported by an invoked hotkey action.
///
/// Caught and logged inside the matching engine; never aborts event
/// processing.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ActionError(pub String);

impl ActionError {
    /// Build an error from anything displayable.
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}
