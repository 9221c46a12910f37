//! Error types shared by the whole engine.
//!
//! Two categories: `Rule` errors are raised by state mutators when an action
//! is illegal on the current state and are recoverable by the caller.
//! `Invariant` errors indicate a bug (size mismatch, search-stack overflow,
//! out-of-bounds access) and are not expected in normal operation.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A move or action violates the game rules on the current state.
    #[error("rule violation: {0}")]
    Rule(String),
    /// An internal invariant does not hold.
    #[error("invariant violation: {0}")]
    Invariant(String),
}

impl Error {
    pub fn rule(message: impl Into<String>) -> Error {
        Error::Rule(message.into())
    }

    pub fn invariant(message: impl Into<String>) -> Error {
        Error::Invariant(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
