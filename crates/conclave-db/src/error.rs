//! Error types for the room and event document store.

/// Errors raised while reading or writing schedule documents.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `Dragonfly`/Redis command failed.
    #[error("Dragonfly error: {0}")]
    Dragonfly(#[from] fred::error::Error),

    /// A room or event document could not be encoded or decoded.
    #[error("Document encoding error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No document is stored under the key.
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// The connection URL was rejected by the client.
    #[error("Invalid Dragonfly URL: {0}")]
    InvalidUrl(String),

    /// A room or event index holds a member that is not a valid number.
    #[error("Corrupt index {index}: member {member:?}")]
    CorruptIndex {
        /// Index key that was scanned.
        index: String,
        /// Offending member.
        member: String,
        /// Why the member did not parse.
        #[source]
        source: std::num::ParseIntError,
    },
}
