//! Error types for the `conclave-scheduling` crate.
//!
//! Every business-rule rejection is an ordinary [`ScheduleError`] value.
//! A rejected operation never leaves partial state behind, so any of
//! these can be retried with corrected input.

use conclave_types::{Amenity, EventId, RoomNumber, UserId};

/// Reasons a scheduling operation was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    /// The room is not registered.
    #[error("room not found: {0}")]
    RoomNotFound(RoomNumber),

    /// A room with this number is already registered.
    #[error("duplicate room number: {0}")]
    DuplicateRoom(RoomNumber),

    /// The event does not exist.
    #[error("event not found: {0}")]
    EventNotFound(EventId),

    /// Events must last at least one hour.
    #[error("event duration must be positive")]
    InvalidDuration,

    /// `start + duration` does not fit the time axis.
    #[error("time slot starting at {start} with duration {duration} overflows")]
    TimeSlotOverflow {
        /// Requested start hour.
        start: u32,
        /// Requested duration.
        duration: u32,
    },

    /// The event would seat more people than its room holds.
    #[error("capacity {capacity} exceeds room {room} capacity {room_capacity}")]
    CapacityExceedsRoom {
        /// Requested event capacity.
        capacity: u32,
        /// The assigned room.
        room: RoomNumber,
        /// Seats in the room.
        room_capacity: u32,
    },

    /// The room lacks an amenity the event requires.
    #[error("room {room} has no {amenity}")]
    MissingAmenity {
        /// The assigned room.
        room: RoomNumber,
        /// The missing amenity.
        amenity: Amenity,
    },

    /// Another event already occupies the room during an overlapping slot.
    #[error("room {room} is already booked by event {conflicting}")]
    RoomConflict {
        /// The contested room.
        room: RoomNumber,
        /// The event holding the room.
        conflicting: EventId,
    },

    /// A host is already busy with an overlapping event.
    #[error("host {host} is already hosting event {conflicting}")]
    HostConflict {
        /// The double-booked host.
        host: UserId,
        /// The event the host is busy with.
        conflicting: EventId,
    },

    /// The new capacity is smaller than the current attendance.
    #[error("capacity {capacity} is below current attendance {attendees}")]
    CapacityBelowAttendance {
        /// Requested capacity.
        capacity: u32,
        /// Attendees already registered.
        attendees: u32,
    },

    /// The user already hosts the event.
    #[error("user {host} already hosts event {event}")]
    DuplicateHost {
        /// The event.
        event: EventId,
        /// The host.
        host: UserId,
    },

    /// The attendee is already registered for this event.
    #[error("attendee {attendee} is already registered for event {event}")]
    AlreadyRegistered {
        /// The attendee.
        attendee: UserId,
        /// The event.
        event: EventId,
    },

    /// The attendee is registered for an event with an overlapping slot.
    #[error("attendee {attendee} is busy with event {conflicting}")]
    AttendeeBusy {
        /// The attendee.
        attendee: UserId,
        /// The overlapping registration.
        conflicting: EventId,
    },

    /// Every seat is taken.
    #[error("event {event} is full ({capacity} seats)")]
    EventFull {
        /// The event.
        event: EventId,
        /// Its capacity.
        capacity: u32,
    },

    /// A non-VIP attendee tried to join a VIP event.
    #[error("event {event} is VIP-only and attendee {attendee} is not VIP")]
    VipOnly {
        /// The attendee.
        attendee: UserId,
        /// The event.
        event: EventId,
    },

    /// The event id counter cannot advance any further.
    #[error("event id space exhausted")]
    IdSpaceExhausted,
}
