//! Error types for the mailbox engine.

use thiserror::Error;

/// Errors that can occur in mailbox operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Storage operation failed.
    #[error("Storage error: {0}")]
    Store(#[from] mailfold_store::Error),

    /// Entity does not exist in the record store.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Entity kind ("message", "thread", ...).
        kind: &'static str,
        /// Entity id that was looked up.
        id: String,
    },

    /// Request rejected before any write took place.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An index update kept failing past the retry budget.
    ///
    /// The message record itself is intact; a later
    /// [`reconcile`](crate::MailboxService::reconcile) pass restores the
    /// affected indexes.
    #[error("Index inconsistency: {0}")]
    IndexInconsistency(String),
}

impl Error {
    /// Shorthand for a `NotFound` error.
    #[must_use]
    pub fn not_found(kind: &'static str, id: &str) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
