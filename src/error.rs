//! Error taxonomy for the tree core.
//!
//! Nothing here is fatal to the process: validation errors are rejected
//! before any mutation, store failures degrade to a stale-but-consistent
//! local view that reconciles on the next full reload.

use uuid::Uuid;

/// Errors surfaced by the tree core.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// Malformed input, rejected before any mutation is attempted.
    #[error("validation failed: {message}")]
    Validation { message: String },

    /// An operation referenced a member that does not exist locally.
    #[error("unknown member: {id}")]
    UnknownMember { id: Uuid },

    /// A persistence operation failed. Non-fatal: the optimistic local
    /// state is kept and reconciled on the next reload.
    #[error("store operation failed: {0}")]
    Store(#[from] anyhow::Error),
}

impl TreeError {
    pub fn validation(message: impl Into<String>) -> Self {
        TreeError::Validation {
            message: message.into(),
        }
    }
}
