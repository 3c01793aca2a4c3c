//! Core entity structs: rooms, time slots, and scheduled events.

use serde::{Deserialize, Serialize};

use crate::enums::{Amenity, RoomFilter};
use crate::ids::{EventId, RoomNumber, UserId};

// ---------------------------------------------------------------------------
// Room
// ---------------------------------------------------------------------------

/// A physical room with static capabilities.
///
/// `number` is immutable once registered; the remaining fields may be
/// changed through the room registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Unique room number.
    pub number: RoomNumber,
    /// Maximum number of seats.
    pub capacity: u32,
    /// Whether the room has a projector.
    pub has_projector: bool,
    /// Whether the room has tables.
    pub has_tables: bool,
}

impl Room {
    /// Create a new room definition.
    pub const fn new(number: RoomNumber, capacity: u32, has_projector: bool, has_tables: bool) -> Self {
        Self {
            number,
            capacity,
            has_projector,
            has_tables,
        }
    }

    /// Whether the room provides the given amenity.
    pub const fn has(&self, amenity: Amenity) -> bool {
        match amenity {
            Amenity::Projector => self.has_projector,
            Amenity::Tables => self.has_tables,
        }
    }

    /// Whether the room passes a listing filter.
    pub const fn matches(&self, filter: RoomFilter) -> bool {
        match filter {
            RoomFilter::All => true,
            RoomFilter::WithProjector => self.has_projector,
            RoomFilter::WithTables => self.has_tables,
            RoomFilter::WithProjectorAndTables => self.has_projector && self.has_tables,
            RoomFilter::MinCapacity(min) => self.capacity >= min,
        }
    }

    /// Short listing summary, e.g. `capacity: 40`.
    pub fn summary(&self) -> String {
        format!("capacity: {}", self.capacity)
    }

    /// Human-readable amenity description.
    pub const fn describe(&self) -> &'static str {
        match (self.has_projector, self.has_tables) {
            (true, true) => "has projector and tables",
            (true, false) => "has projector but no tables",
            (false, true) => "has tables but no projector",
            (false, false) => "has no projector or tables",
        }
    }
}

impl core::fmt::Display for Room {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "room {} ({}), {}",
            self.number,
            self.summary(),
            self.describe()
        )
    }
}

// ---------------------------------------------------------------------------
// TimeSlot
// ---------------------------------------------------------------------------

/// Half-open interval `[start, start + duration)` in hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    /// First hour of the slot.
    pub start: u32,
    /// Length of the slot in hours.
    pub duration: u32,
}

impl TimeSlot {
    /// Create a new slot.
    pub const fn new(start: u32, duration: u32) -> Self {
        Self { start, duration }
    }

    /// Exclusive end hour, or `None` if it does not fit in a `u32`.
    pub const fn end(self) -> Option<u32> {
        self.start.checked_add(self.duration)
    }

    /// Whether two half-open slots intersect.
    ///
    /// `[a, a+d)` and `[b, b+e)` overlap iff `a < b+e` and `b < a+d`.
    /// Computed in `u64` so the end bound never wraps.
    pub fn overlaps(self, other: Self) -> bool {
        let self_end = u64::from(self.start).saturating_add(u64::from(self.duration));
        let other_end = u64::from(other.start).saturating_add(u64::from(other.duration));
        u64::from(self.start) < other_end && u64::from(other.start) < self_end
    }
}

// ---------------------------------------------------------------------------
// EventProposal
// ---------------------------------------------------------------------------

/// Everything needed to propose a new event placement.
///
/// Packs the many placement arguments into one struct so call sites stay
/// readable and config files can describe seed events directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventProposal {
    /// Display name.
    pub name: String,
    /// Room the event should be held in.
    pub room: RoomNumber,
    /// Start hour.
    pub start_time: u32,
    /// Length in hours; must be positive.
    pub duration: u32,
    /// Maximum number of attendees.
    pub capacity: u32,
    /// Restrict registration to VIP attendees.
    #[serde(default)]
    pub vip: bool,
    /// Speakers hosting the event.
    #[serde(default)]
    pub hosts: Vec<UserId>,
    /// The room must have a projector.
    #[serde(default)]
    pub needs_projector: bool,
    /// The room must have tables.
    #[serde(default)]
    pub needs_tables: bool,
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// A committed event in the schedule.
///
/// Two events are equal iff their ids match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Store-assigned identifier.
    pub id: EventId,
    /// Display name.
    pub name: String,
    /// Assigned room.
    pub room: RoomNumber,
    /// Start hour.
    pub start_time: u32,
    /// Length in hours.
    pub duration: u32,
    /// Maximum number of attendees.
    pub capacity: u32,
    /// Hosting speakers, in insertion order.
    pub hosts: Vec<UserId>,
    /// Registered attendees, in registration order.
    pub attendees: Vec<UserId>,
    /// Only VIP attendees may register.
    pub vip: bool,
    /// Requires a projector in the room.
    pub needs_projector: bool,
    /// Requires tables in the room.
    pub needs_tables: bool,
}

impl Event {
    /// Build an event with no attendees from a proposal.
    pub fn from_proposal(id: EventId, proposal: EventProposal) -> Self {
        Self {
            id,
            name: proposal.name,
            room: proposal.room,
            start_time: proposal.start_time,
            duration: proposal.duration,
            capacity: proposal.capacity,
            hosts: proposal.hosts,
            attendees: Vec::new(),
            vip: proposal.vip,
            needs_projector: proposal.needs_projector,
            needs_tables: proposal.needs_tables,
        }
    }

    /// The event's temporal footprint.
    pub const fn slot(&self) -> TimeSlot {
        TimeSlot::new(self.start_time, self.duration)
    }

    /// Whether the event requires the given amenity.
    pub const fn needs(&self, amenity: Amenity) -> bool {
        match amenity {
            Amenity::Projector => self.needs_projector,
            Amenity::Tables => self.needs_tables,
        }
    }

    /// Number of registered attendees.
    pub fn attendee_count(&self) -> u32 {
        u32::try_from(self.attendees.len()).unwrap_or(u32::MAX)
    }

    /// Seats left before the event is full.
    pub fn available_seats(&self) -> u32 {
        self.capacity.saturating_sub(self.attendee_count())
    }

    /// Whether no seat is left.
    pub fn is_full(&self) -> bool {
        self.attendee_count() >= self.capacity
    }

    /// Whether the user is registered as an attendee.
    pub fn has_attendee(&self, user: UserId) -> bool {
        self.attendees.contains(&user)
    }

    /// Whether the user hosts this event.
    pub fn has_host(&self, user: UserId) -> bool {
        self.hosts.contains(&user)
    }

    /// Whether the two events share at least one host.
    pub fn shares_host_with(&self, other: &Self) -> bool {
        self.hosts.iter().any(|h| other.has_host(*h))
    }

    /// Host ids joined by `;`.
    pub fn hosts_joined(&self) -> String {
        join_ids(&self.hosts)
    }

    /// Attendee ids joined by `;`.
    pub fn attendees_joined(&self) -> String {
        join_ids(&self.attendees)
    }

    /// Listing summary including remaining seats, or `FULL`.
    pub fn availability_summary(&self) -> String {
        let seats = self.available_seats();
        if seats == 0 {
            format!("{self}. Capacity: FULL")
        } else {
            format!("{self}. Capacity: {seats}")
        }
    }
}

fn join_ids(ids: &[UserId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(";")
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Event {}

impl core::fmt::Display for Event {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let end = u64::from(self.start_time).saturating_add(u64::from(self.duration));
        write!(
            f,
            "{}: {}:00 - {}:00 [{} hour(s)], (vip): {}, (uses projector): {}, (uses tables): {}",
            self.name,
            self.start_time,
            end,
            self.duration,
            self.vip,
            self.needs_projector,
            self.needs_tables
        )
    }
}
