//! The room registry: the fixed set of physical rooms and their capabilities.
//!
//! Room numbers are unique and never reused. Capacity and amenities may be
//! changed after registration; the registry does not re-check events that
//! already use a room. See [`Schedule::stranded_events`] for the audit that
//! reports events left in violation by such a change.
//!
//! [`Schedule::stranded_events`]: crate::Schedule::stranded_events

use std::collections::BTreeMap;

use conclave_types::{Room, RoomFilter, RoomNumber};
use tracing::debug;

use crate::error::ScheduleError;

/// Owns every registered [`Room`], indexed by number.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct RoomRegistry {
    rooms: BTreeMap<RoomNumber, Room>,
}

impl RoomRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            rooms: BTreeMap::new(),
        }
    }

    /// Register a new room.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::DuplicateRoom`] if the number is taken.
    pub fn add(&mut self, room: Room) -> Result<(), ScheduleError> {
        if self.rooms.contains_key(&room.number) {
            return Err(ScheduleError::DuplicateRoom(room.number));
        }
        debug!(room = %room.number, capacity = room.capacity, "room registered");
        self.rooms.insert(room.number, room);
        Ok(())
    }

    /// Look up a room.
    pub fn get(&self, number: RoomNumber) -> Option<&Room> {
        self.rooms.get(&number)
    }

    /// Look up a room, failing with [`ScheduleError::RoomNotFound`].
    pub(crate) fn require(&self, number: RoomNumber) -> Result<&Room, ScheduleError> {
        self.rooms
            .get(&number)
            .ok_or(ScheduleError::RoomNotFound(number))
    }

    /// Whether the number is registered.
    pub fn contains(&self, number: RoomNumber) -> bool {
        self.rooms.contains_key(&number)
    }

    /// Number of registered rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Whether no room is registered.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Iterate rooms in ascending number order.
    pub fn iter(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    // -------------------------------------------------------------------
    // Mutation (permissive: existing events are not re-validated)
    // -------------------------------------------------------------------

    /// Change the seat count of a room.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::RoomNotFound`] if the room is not registered.
    pub fn set_capacity(&mut self, number: RoomNumber, capacity: u32) -> Result<(), ScheduleError> {
        let room = self.get_mut(number)?;
        room.capacity = capacity;
        Ok(())
    }

    /// Install or remove the projector.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::RoomNotFound`] if the room is not registered.
    pub fn set_projector(&mut self, number: RoomNumber, has_projector: bool) -> Result<(), ScheduleError> {
        let room = self.get_mut(number)?;
        room.has_projector = has_projector;
        Ok(())
    }

    /// Install or remove the tables.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::RoomNotFound`] if the room is not registered.
    pub fn set_tables(&mut self, number: RoomNumber, has_tables: bool) -> Result<(), ScheduleError> {
        let room = self.get_mut(number)?;
        room.has_tables = has_tables;
        Ok(())
    }

    fn get_mut(&mut self, number: RoomNumber) -> Result<&mut Room, ScheduleError> {
        self.rooms
            .get_mut(&number)
            .ok_or(ScheduleError::RoomNotFound(number))
    }

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    /// Rooms passing the filter, mapped to their listing summary.
    pub fn list(&self, filter: RoomFilter) -> BTreeMap<RoomNumber, String> {
        self.rooms
            .values()
            .filter(|room| room.matches(filter))
            .map(|room| (room.number, room.summary()))
            .collect()
    }

    /// Every room.
    pub fn rooms(&self) -> BTreeMap<RoomNumber, String> {
        self.list(RoomFilter::All)
    }

    /// Rooms with a projector.
    pub fn with_projector(&self) -> BTreeMap<RoomNumber, String> {
        self.list(RoomFilter::WithProjector)
    }

    /// Rooms with tables.
    pub fn with_tables(&self) -> BTreeMap<RoomNumber, String> {
        self.list(RoomFilter::WithTables)
    }

    /// Rooms with both a projector and tables.
    pub fn with_projector_and_tables(&self) -> BTreeMap<RoomNumber, String> {
        self.list(RoomFilter::WithProjectorAndTables)
    }

    /// Rooms seating at least `capacity` people.
    pub fn with_capacity(&self, capacity: u32) -> BTreeMap<RoomNumber, String> {
        self.list(RoomFilter::MinCapacity(capacity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> RoomRegistry {
        let mut rooms = RoomRegistry::new();
        let _ = rooms.add(Room::new(RoomNumber::new(1), 10, true, false));
        let _ = rooms.add(Room::new(RoomNumber::new(2), 40, true, true));
        let _ = rooms.add(Room::new(RoomNumber::new(3), 25, false, true));
        rooms
    }

    #[test]
    fn duplicate_number_rejected() {
        let mut rooms = registry();
        let result = rooms.add(Room::new(RoomNumber::new(1), 99, false, false));
        assert_eq!(result, Err(ScheduleError::DuplicateRoom(RoomNumber::new(1))));
        assert_eq!(rooms.get(RoomNumber::new(1)).map(|r| r.capacity), Some(10));
    }

    #[test]
    fn zero_capacity_room_is_allowed() {
        let mut rooms = RoomRegistry::new();
        assert!(rooms.add(Room::new(RoomNumber::new(7), 0, false, false)).is_ok());
    }

    #[test]
    fn setters_require_existing_room() {
        let mut rooms = registry();
        assert!(rooms.set_capacity(RoomNumber::new(2), 5).is_ok());
        assert_eq!(rooms.get(RoomNumber::new(2)).map(|r| r.capacity), Some(5));
        assert_eq!(
            rooms.set_projector(RoomNumber::new(9), true),
            Err(ScheduleError::RoomNotFound(RoomNumber::new(9)))
        );
        assert!(rooms.set_tables(RoomNumber::new(1), true).is_ok());
        assert!(rooms.get(RoomNumber::new(1)).is_some_and(|r| r.has_tables));
    }

    #[test]
    fn filtered_listings() {
        let rooms = registry();
        let projector: Vec<_> = rooms.with_projector().into_keys().collect();
        assert_eq!(projector, vec![RoomNumber::new(1), RoomNumber::new(2)]);

        let both: Vec<_> = rooms.with_projector_and_tables().into_keys().collect();
        assert_eq!(both, vec![RoomNumber::new(2)]);

        let tables: Vec<_> = rooms.with_tables().into_keys().collect();
        assert_eq!(tables, vec![RoomNumber::new(2), RoomNumber::new(3)]);

        let big = rooms.with_capacity(25);
        assert_eq!(big.len(), 2);
        assert_eq!(big.get(&RoomNumber::new(3)).map(String::as_str), Some("capacity: 25"));

        assert_eq!(rooms.rooms().len(), 3);
    }
}
