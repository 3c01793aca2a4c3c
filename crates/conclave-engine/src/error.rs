//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during startup.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading or validation failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: conclave_core::ConfigError,
    },

    /// Building the user directory from config failed.
    #[error("directory error: {source}")]
    Directory {
        /// The underlying directory error.
        #[from]
        source: conclave_directory::DirectoryError,
    },

    /// Connecting to Dragonfly failed.
    #[error("database error: {source}")]
    Db {
        /// The underlying database error.
        #[from]
        source: conclave_db::DbError,
    },

    /// Opening the conference (loading stored state) failed.
    #[error("conference error: {source}")]
    Conference {
        /// The underlying service error.
        #[from]
        source: conclave_core::ConferenceError,
    },
}
