//! Data layer for the Conclave conference scheduler.
//!
//! The schedule is persisted to `Dragonfly` as one JSON document per room
//! and per event, with index sets listing which documents exist. Document
//! shapes are owned by the caller; this crate only knows keys.
//!
//! # Modules
//!
//! - [`dragonfly`] -- `Dragonfly` (Redis-compatible) document operations
//! - [`error`] -- Shared error types

pub mod dragonfly;
pub mod error;

pub use dragonfly::DragonflyPool;
pub use error::DbError;
