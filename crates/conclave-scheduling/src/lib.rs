//! The Conclave scheduling engine.
//!
//! Places events into shared, finite resources (rooms, hours, hosts,
//! attendee seats) one operation at a time. Every mutation re-validates
//! the proposed state against the full schedule and either commits it
//! whole or rejects it with a [`ScheduleError`], leaving nothing behind.
//!
//! The engine is synchronous and performs no I/O. Persistence and
//! notifications are the caller's concern.
//!
//! # Modules
//!
//! - [`room`] -- [`RoomRegistry`]: rooms, their capacity and amenities,
//!   and filtered listings.
//! - [`store`] -- [`EventStore`]: committed events, placement-validated
//!   mutations, and derived queries.
//! - [`registration`] -- attendee registration gates on [`EventStore`].
//! - [`identity`] -- [`IdentityOracle`], the seam to the user directory.
//! - [`schedule`] -- [`Schedule`], rooms and events behind one owner.
//! - [`error`] -- [`ScheduleError`], every rejection reason.

pub mod error;
pub mod identity;
mod placement;
pub mod registration;
pub mod room;
pub mod schedule;
pub mod store;

pub use error::ScheduleError;
pub use identity::IdentityOracle;
pub use room::RoomRegistry;
pub use schedule::Schedule;
pub use store::{EventInfo, EventStore};
