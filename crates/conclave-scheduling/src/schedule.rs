//! The combined schedule: rooms and events behind one owner.
//!
//! [`Schedule`] pairs the [`RoomRegistry`] with the [`EventStore`] so that
//! callers holding a single lock can run any validate-then-commit sequence
//! without threading the registry through by hand.

use conclave_types::{Event, EventId, EventProposal, Room, RoomNumber, UserId};

use crate::error::ScheduleError;
use crate::identity::IdentityOracle;
use crate::placement;
use crate::room::RoomRegistry;
use crate::store::EventStore;

/// Rooms plus the events placed in them.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Schedule {
    rooms: RoomRegistry,
    events: EventStore,
}

impl Schedule {
    /// Create an empty schedule.
    pub const fn new() -> Self {
        Self {
            rooms: RoomRegistry::new(),
            events: EventStore::new(),
        }
    }

    /// The room registry.
    pub const fn rooms(&self) -> &RoomRegistry {
        &self.rooms
    }

    /// The event store.
    pub const fn events(&self) -> &EventStore {
        &self.events
    }

    /// Look up a room.
    pub fn room(&self, number: RoomNumber) -> Option<&Room> {
        self.rooms.get(number)
    }

    /// Look up an event.
    pub fn event(&self, id: EventId) -> Option<&Event> {
        self.events.get(id)
    }

    /// Events whose room no longer satisfies them.
    ///
    /// Room mutation is permissive: shrinking a room or removing an
    /// amenity never fails, even when events already use the room. This
    /// audit reports every event left with a capacity above its room's or
    /// an amenity its room lacks, paired with the violation found.
    pub fn stranded_events(&self) -> Vec<(EventId, ScheduleError)> {
        self.events
            .iter()
            .filter_map(|event| {
                placement::check_room_fit(&self.rooms, event)
                    .err()
                    .map(|e| (event.id, e))
            })
            .collect()
    }

    /// Events placed in `number`, in id order.
    pub fn events_in_room(&self, number: RoomNumber) -> Vec<&Event> {
        self.events.iter().filter(|e| e.room == number).collect()
    }

    // -------------------------------------------------------------------
    // Rooms
    // -------------------------------------------------------------------

    /// See [`RoomRegistry::add`].
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::DuplicateRoom`] if the number is taken.
    pub fn add_room(&mut self, room: Room) -> Result<(), ScheduleError> {
        self.rooms.add(room)
    }

    /// See [`RoomRegistry::set_capacity`].
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::RoomNotFound`] if the room is unknown.
    pub fn set_room_capacity(&mut self, number: RoomNumber, capacity: u32) -> Result<(), ScheduleError> {
        self.rooms.set_capacity(number, capacity)
    }

    /// See [`RoomRegistry::set_projector`].
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::RoomNotFound`] if the room is unknown.
    pub fn set_room_projector(&mut self, number: RoomNumber, has_projector: bool) -> Result<(), ScheduleError> {
        self.rooms.set_projector(number, has_projector)
    }

    /// See [`RoomRegistry::set_tables`].
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::RoomNotFound`] if the room is unknown.
    pub fn set_room_tables(&mut self, number: RoomNumber, has_tables: bool) -> Result<(), ScheduleError> {
        self.rooms.set_tables(number, has_tables)
    }

    // -------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------

    /// See [`EventStore::add`].
    ///
    /// # Errors
    ///
    /// Returns the first placement violation.
    pub fn add_event(&mut self, proposal: EventProposal) -> Result<EventId, ScheduleError> {
        self.events.add(&self.rooms, proposal)
    }

    /// See [`EventStore::remove`].
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::EventNotFound`] if the id is unknown.
    pub fn remove_event(&mut self, id: EventId) -> Result<Event, ScheduleError> {
        self.events.remove(id)
    }

    /// See [`EventStore::reschedule`].
    ///
    /// # Errors
    ///
    /// Returns the first placement violation.
    pub fn reschedule(&mut self, id: EventId, start_time: u32) -> Result<(), ScheduleError> {
        self.events.reschedule(&self.rooms, id, start_time)
    }

    /// See [`EventStore::change_duration`].
    ///
    /// # Errors
    ///
    /// Returns the first placement violation.
    pub fn change_duration(&mut self, id: EventId, duration: u32) -> Result<(), ScheduleError> {
        self.events.change_duration(&self.rooms, id, duration)
    }

    /// See [`EventStore::move_to_room`].
    ///
    /// # Errors
    ///
    /// Returns the first placement violation.
    pub fn move_to_room(&mut self, id: EventId, room: RoomNumber) -> Result<(), ScheduleError> {
        self.events.move_to_room(&self.rooms, id, room)
    }

    /// See [`EventStore::change_capacity`].
    ///
    /// # Errors
    ///
    /// Returns the capacity violation.
    pub fn change_capacity(&mut self, id: EventId, capacity: u32) -> Result<(), ScheduleError> {
        self.events.change_capacity(&self.rooms, id, capacity)
    }

    /// See [`EventStore::set_needs_projector`].
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::MissingAmenity`] if the room has none.
    pub fn set_needs_projector(&mut self, id: EventId, needs: bool) -> Result<(), ScheduleError> {
        self.events.set_needs_projector(&self.rooms, id, needs)
    }

    /// See [`EventStore::set_needs_tables`].
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::MissingAmenity`] if the room has none.
    pub fn set_needs_tables(&mut self, id: EventId, needs: bool) -> Result<(), ScheduleError> {
        self.events.set_needs_tables(&self.rooms, id, needs)
    }

    /// See [`EventStore::add_host`].
    ///
    /// # Errors
    ///
    /// Returns the duplicate or conflict found.
    pub fn add_host(&mut self, id: EventId, host: UserId) -> Result<(), ScheduleError> {
        self.events.add_host(&self.rooms, id, host)
    }

    /// See [`EventStore::remove_host`].
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::EventNotFound`] if the id is unknown.
    pub fn remove_host(&mut self, id: EventId, host: UserId) -> Result<bool, ScheduleError> {
        self.events.remove_host(id, host)
    }

    /// See [`EventStore::add_attendee`].
    ///
    /// # Errors
    ///
    /// Returns the first registration gate that failed.
    pub fn add_attendee(
        &mut self,
        attendee: UserId,
        event_id: EventId,
        identity: &dyn IdentityOracle,
    ) -> Result<(), ScheduleError> {
        self.events.add_attendee(attendee, event_id, identity)
    }

    /// See [`EventStore::remove_attendee`].
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::EventNotFound`] if the id is unknown.
    pub fn remove_attendee(&mut self, attendee: UserId, event_id: EventId) -> Result<bool, ScheduleError> {
        self.events.remove_attendee(attendee, event_id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use conclave_types::Amenity;

    use super::*;

    fn keynote() -> EventProposal {
        EventProposal {
            name: "Keynote".to_owned(),
            room: RoomNumber::new(1),
            start_time: 9,
            duration: 2,
            capacity: 5,
            vip: false,
            hosts: vec![UserId::new(5)],
            needs_projector: true,
            needs_tables: false,
        }
    }

    #[test]
    fn shrinking_a_room_strands_its_events() {
        let mut schedule = Schedule::new();
        let _ = schedule.add_room(Room::new(RoomNumber::new(1), 10, true, false));
        let id = schedule.add_event(keynote()).unwrap();
        assert!(schedule.stranded_events().is_empty());

        assert!(schedule.set_room_capacity(RoomNumber::new(1), 3).is_ok());
        assert!(schedule.set_room_projector(RoomNumber::new(1), false).is_ok());

        let stranded = schedule.stranded_events();
        assert_eq!(stranded.len(), 1);
        assert_eq!(
            stranded.first(),
            Some(&(
                id,
                ScheduleError::MissingAmenity {
                    room: RoomNumber::new(1),
                    amenity: Amenity::Projector,
                }
            ))
        );
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let mut schedule = Schedule::new();
        let _ = schedule.add_room(Room::new(RoomNumber::new(1), 10, true, false));
        let id = schedule.add_event(keynote()).unwrap();

        let json = serde_json::to_string(&schedule).unwrap();
        let restored: Schedule = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.event(id).map(|e| e.name.as_str()), Some("Keynote"));
        assert_eq!(restored.events().next_id(), EventId::new(1));
        assert_eq!(restored.events_in_room(RoomNumber::new(1)).len(), 1);
    }
}
