//! Enumeration types shared across the scheduler.

use serde::{Deserialize, Serialize};

/// The role a user plays at the conference.
///
/// Only attendees carry a VIP flag; see `conclave-directory` for the
/// tagged user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Registers for events.
    Attendee,
    /// Creates rooms and events.
    Organizer,
    /// Hosts events.
    Speaker,
}

impl core::fmt::Display for UserRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let label = match self {
            Self::Attendee => "attendee",
            Self::Organizer => "organizer",
            Self::Speaker => "speaker",
        };
        f.write_str(label)
    }
}

/// A physical room amenity an event may require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Amenity {
    /// A ceiling or portable projector.
    Projector,
    /// Tables for workshop-style seating.
    Tables,
}

impl core::fmt::Display for Amenity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Projector => f.write_str("projector"),
            Self::Tables => f.write_str("tables"),
        }
    }
}

/// Filter applied when listing rooms to help a caller pick an eligible one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomFilter {
    /// Every registered room.
    #[default]
    All,
    /// Rooms with a projector.
    WithProjector,
    /// Rooms with tables.
    WithTables,
    /// Rooms with both a projector and tables.
    WithProjectorAndTables,
    /// Rooms seating at least this many people.
    MinCapacity(u32),
}
