//! Change notifications for collaborators outside the engine.
//!
//! The conference service calls the installed [`ScheduleListener`] after
//! every committed mutation, once the write-through has been attempted.
//! Replay at startup never notifies.

use conclave_types::{Event, EventId, RoomNumber, UserId};

/// A committed change to the schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleChange {
    /// A new event was placed.
    EventScheduled {
        /// The new event's id.
        event: EventId,
    },
    /// An event was removed. Carries the removed event so its attendees
    /// and hosts can be told.
    EventCancelled {
        /// The event as it was just before removal.
        event: Event,
    },
    /// An event moved to a new start hour.
    EventRescheduled {
        /// The moved event.
        event: EventId,
        /// Its previous start hour.
        from: u32,
        /// Its new start hour.
        to: u32,
    },
    /// Some other property of an event changed (room, length, capacity,
    /// amenities, or hosts).
    EventUpdated {
        /// The changed event.
        event: EventId,
    },
    /// An attendee took a seat.
    AttendeeRegistered {
        /// The event.
        event: EventId,
        /// The attendee.
        attendee: UserId,
    },
    /// An attendee gave up a seat.
    AttendeeCancelled {
        /// The event.
        event: EventId,
        /// The attendee.
        attendee: UserId,
    },
    /// A room was added or changed.
    RoomUpdated {
        /// The room.
        room: RoomNumber,
        /// Events in this room that no longer fit it.
        stranded: Vec<EventId>,
    },
}

/// Receives committed schedule changes.
pub trait ScheduleListener: Send + Sync {
    /// Called once per committed mutation.
    fn on_change(&self, change: &ScheduleChange);
}

/// A listener that ignores everything.
pub struct NoOpListener;

impl ScheduleListener for NoOpListener {
    fn on_change(&self, _change: &ScheduleChange) {}
}
