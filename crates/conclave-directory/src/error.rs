//! Error types for the `conclave-directory` crate.

use conclave_types::UserId;

/// Errors raised by [`UserDirectory`](crate::UserDirectory) mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectoryError {
    /// A user with this id is already registered.
    #[error("duplicate user id: {0}")]
    DuplicateUser(UserId),

    /// No further user ids can be issued.
    #[error("user id space exhausted")]
    IdSpaceExhausted,
}
