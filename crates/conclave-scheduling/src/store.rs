//! The event store: committed events and every validated mutation on them.
//!
//! Each mutation follows the same shape: clone the target into a
//! candidate, apply the change to the candidate, validate it against the
//! room registry and every other committed event, and only then replace
//! the committed entry. A rejected mutation leaves the store untouched.
//!
//! Derived queries (events by attendee or host, hosts reachable through an
//! attendee, ...) are linear scans; nothing is cached.

use std::collections::{BTreeMap, BTreeSet};

use conclave_types::{Event, EventId, EventProposal, RoomNumber, UserId};
use tracing::debug;

use crate::error::ScheduleError;
use crate::placement;
use crate::room::RoomRegistry;

/// Flattened, display-ready view of a single event.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EventInfo {
    /// Event name.
    pub name: String,
    /// Assigned room.
    pub room: RoomNumber,
    /// Start hour.
    pub start_time: u32,
    /// Length in hours.
    pub duration: u32,
    /// Maximum attendance.
    pub capacity: u32,
    /// VIP-only flag.
    pub vip: bool,
    /// Needs a projector.
    pub needs_projector: bool,
    /// Needs tables.
    pub needs_tables: bool,
    /// Host ids joined by `;`.
    pub hosts: String,
    /// Attendee ids joined by `;`.
    pub attendees: String,
}

/// All committed events, keyed by id, plus the id counter.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct EventStore {
    pub(crate) events: BTreeMap<EventId, Event>,
    next_id: u64,
}

impl EventStore {
    /// Create an empty store whose first id is `0`.
    pub const fn new() -> Self {
        Self {
            events: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Id the next successful [`add`](Self::add) will receive.
    pub const fn next_id(&self) -> EventId {
        EventId::new(self.next_id)
    }

    /// Number of committed events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no event is committed.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Look up an event.
    pub fn get(&self, id: EventId) -> Option<&Event> {
        self.events.get(&id)
    }

    /// Iterate events in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.values()
    }

    pub(crate) fn require(&self, id: EventId) -> Result<&Event, ScheduleError> {
        self.events.get(&id).ok_or(ScheduleError::EventNotFound(id))
    }

    /// Every event the attendee is not already registered for, with its
    /// availability summary. `None` lists every event.
    pub fn list_available(&self, excluding: Option<UserId>) -> Vec<(EventId, String)> {
        self.events
            .values()
            .filter(|event| excluding.is_none_or(|user| !event.has_attendee(user)))
            .map(|event| (event.id, event.availability_summary()))
            .collect()
    }

    // -------------------------------------------------------------------
    // Placement
    // -------------------------------------------------------------------

    /// Validate and commit a new event.
    ///
    /// The candidate tentatively receives [`next_id`](Self::next_id); the
    /// counter advances only when the event is committed, so ids are dense
    /// among successful creations.
    ///
    /// # Errors
    ///
    /// Returns the first placement violation found, or
    /// [`ScheduleError::IdSpaceExhausted`] if the counter cannot advance.
    pub fn add(&mut self, rooms: &RoomRegistry, proposal: EventProposal) -> Result<EventId, ScheduleError> {
        let id = self.next_id();
        let following = self
            .next_id
            .checked_add(1)
            .ok_or(ScheduleError::IdSpaceExhausted)?;
        let candidate = Event::from_proposal(id, proposal);

        if let Err(e) = placement::validate(rooms, self.events.values(), &candidate) {
            debug!(name = %candidate.name, room = %candidate.room, error = %e, "event rejected");
            return Err(e);
        }

        debug!(event_id = %id, name = %candidate.name, room = %candidate.room, "event scheduled");
        self.events.insert(id, candidate);
        self.next_id = following;
        Ok(id)
    }

    /// Delete an event and return it.
    ///
    /// Removal only shrinks state, so it never needs validation.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::EventNotFound`] if the id is unknown.
    pub fn remove(&mut self, id: EventId) -> Result<Event, ScheduleError> {
        let removed = self
            .events
            .remove(&id)
            .ok_or(ScheduleError::EventNotFound(id))?;
        debug!(event_id = %id, "event removed");
        Ok(removed)
    }

    /// Move an event to a new start hour, keeping its room and hosts.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::EventNotFound`] or the first placement
    /// violation against the other events.
    pub fn reschedule(&mut self, rooms: &RoomRegistry, id: EventId, start_time: u32) -> Result<(), ScheduleError> {
        self.revise(rooms, id, |candidate| candidate.start_time = start_time)
    }

    /// Change how long an event lasts.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::EventNotFound`] or the first placement
    /// violation against the other events.
    pub fn change_duration(&mut self, rooms: &RoomRegistry, id: EventId, duration: u32) -> Result<(), ScheduleError> {
        self.revise(rooms, id, |candidate| candidate.duration = duration)
    }

    /// Move an event to another room at the same time.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::EventNotFound`] or the first placement
    /// violation in the new room.
    pub fn move_to_room(&mut self, rooms: &RoomRegistry, id: EventId, room: RoomNumber) -> Result<(), ScheduleError> {
        self.revise(rooms, id, |candidate| candidate.room = room)
    }

    /// Require or release the projector.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::MissingAmenity`] if the room has none.
    pub fn set_needs_projector(&mut self, rooms: &RoomRegistry, id: EventId, needs: bool) -> Result<(), ScheduleError> {
        self.revise(rooms, id, |candidate| candidate.needs_projector = needs)
    }

    /// Require or release tables.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::MissingAmenity`] if the room has none.
    pub fn set_needs_tables(&mut self, rooms: &RoomRegistry, id: EventId, needs: bool) -> Result<(), ScheduleError> {
        self.revise(rooms, id, |candidate| candidate.needs_tables = needs)
    }

    /// Add a host, checking that they are free for the event's slot.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::DuplicateHost`] if the user already hosts
    /// the event, or [`ScheduleError::HostConflict`] if they are busy.
    pub fn add_host(&mut self, rooms: &RoomRegistry, id: EventId, host: UserId) -> Result<(), ScheduleError> {
        if self.require(id)?.has_host(host) {
            return Err(ScheduleError::DuplicateHost { event: id, host });
        }
        self.revise(rooms, id, |candidate| candidate.hosts.push(host))
    }

    /// Remove a host from the event's host list. Attendees are untouched.
    ///
    /// Returns whether the user was a host.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::EventNotFound`] if the id is unknown.
    pub fn remove_host(&mut self, id: EventId, host: UserId) -> Result<bool, ScheduleError> {
        let event = self
            .events
            .get_mut(&id)
            .ok_or(ScheduleError::EventNotFound(id))?;
        let before = event.hosts.len();
        event.hosts.retain(|h| *h != host);
        Ok(event.hosts.len() != before)
    }

    /// Change the event's capacity.
    ///
    /// The new capacity must hold everyone already registered and fit in
    /// the room.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::CapacityBelowAttendance`] or
    /// [`ScheduleError::CapacityExceedsRoom`].
    pub fn change_capacity(&mut self, rooms: &RoomRegistry, id: EventId, capacity: u32) -> Result<(), ScheduleError> {
        let event = self.require(id)?;
        let attendees = event.attendee_count();
        if capacity < attendees {
            return Err(ScheduleError::CapacityBelowAttendance { capacity, attendees });
        }
        let room = rooms.require(event.room)?;
        if capacity > room.capacity {
            return Err(ScheduleError::CapacityExceedsRoom {
                capacity,
                room: room.number,
                room_capacity: room.capacity,
            });
        }
        if let Some(event) = self.events.get_mut(&id) {
            event.capacity = capacity;
        }
        debug!(event_id = %id, capacity, "capacity changed");
        Ok(())
    }

    /// Apply `change` to a copy of the event, validate the copy against
    /// everything else, and commit it on success.
    fn revise(
        &mut self,
        rooms: &RoomRegistry,
        id: EventId,
        change: impl FnOnce(&mut Event),
    ) -> Result<(), ScheduleError> {
        let mut candidate = self.require(id)?.clone();
        change(&mut candidate);
        if let Err(e) = placement::validate(rooms, self.events.values(), &candidate) {
            debug!(event_id = %id, error = %e, "revision rejected");
            return Err(e);
        }
        debug!(event_id = %id, "event revised");
        self.events.insert(id, candidate);
        Ok(())
    }

    // -------------------------------------------------------------------
    // Derived queries
    // -------------------------------------------------------------------

    /// Seats left in the event.
    pub fn available_seats(&self, id: EventId) -> Option<u32> {
        self.get(id).map(Event::available_seats)
    }

    /// Attendees of the event, in registration order.
    pub fn attendees_of(&self, id: EventId) -> Option<&[UserId]> {
        self.get(id).map(|event| event.attendees.as_slice())
    }

    /// Flattened view of the event for display or export.
    pub fn event_info(&self, id: EventId) -> Option<EventInfo> {
        self.get(id).map(|event| EventInfo {
            name: event.name.clone(),
            room: event.room,
            start_time: event.start_time,
            duration: event.duration,
            capacity: event.capacity,
            vip: event.vip,
            needs_projector: event.needs_projector,
            needs_tables: event.needs_tables,
            hosts: event.hosts_joined(),
            attendees: event.attendees_joined(),
        })
    }

    /// Events the user is registered for.
    pub fn events_of_attendee(&self, attendee: UserId) -> Vec<&Event> {
        self.iter().filter(|e| e.has_attendee(attendee)).collect()
    }

    /// Events the user hosts.
    pub fn events_of_host(&self, host: UserId) -> Vec<&Event> {
        self.iter().filter(|e| e.has_host(host)).collect()
    }

    /// Hosts of every event the attendee is registered for.
    pub fn hosts_for_attendee(&self, attendee: UserId) -> BTreeSet<UserId> {
        self.iter()
            .filter(|e| e.has_attendee(attendee))
            .flat_map(|e| e.hosts.iter().copied())
            .collect()
    }

    /// Attendees of every event the host runs.
    pub fn attendees_for_host(&self, host: UserId) -> BTreeSet<UserId> {
        self.iter()
            .filter(|e| e.has_host(host))
            .flat_map(|e| e.attendees.iter().copied())
            .collect()
    }
}
