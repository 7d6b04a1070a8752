//! Queue error kinds.

use thiserror::Error;

/// Expected, recoverable failures of a queue operation.
///
/// None of these are fatal; the dispatcher turns each one into a reply.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("A queue already exists")]
    AlreadyOpen,

    #[error("A queue does not currently exist")]
    QueueNotOpen,

    #[error("Member is already in the queue")]
    DuplicateMember,

    #[error("Member is not in the queue")]
    NotQueued,

    #[error("An admin role is required")]
    NotAuthorized,

    #[error("Usage: {usage}")]
    MalformedArgs { usage: String },

    #[error("{0} is not implemented")]
    NotImplemented(&'static str),

    #[error("Unknown user: {0}")]
    UnknownUser(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

impl QueueError {
    pub fn transport(e: impl std::fmt::Display) -> Self {
        QueueError::Transport(e.to_string())
    }

    pub fn malformed(usage: impl Into<String>) -> Self {
        QueueError::MalformedArgs {
            usage: usage.into(),
        }
    }
}
