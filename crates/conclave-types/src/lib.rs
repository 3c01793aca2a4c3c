//! Shared type definitions for the Conclave conference scheduler.
//!
//! This crate is the single source of truth for the entities that flow
//! between the scheduling engine, the directory, the persistence layer,
//! and the engine binary.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe integer wrappers for rooms, events, and users
//! - [`enums`] -- User roles, room amenities, and room listing filters
//! - [`structs`] -- Rooms, time slots, event proposals, and events

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{Amenity, RoomFilter, UserRole};
pub use ids::{EventId, RoomNumber, UserId};
pub use structs::{Event, EventProposal, Room, TimeSlot};
