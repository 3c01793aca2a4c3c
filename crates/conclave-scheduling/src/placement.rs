//! Placement validation shared by every operation that places or moves an
//! event.
//!
//! A candidate is checked in two phases:
//!
//! 1. **Room fit** -- the room exists, holds the requested capacity, and
//!    provides every amenity the event needs.
//! 2. **Conflict scan** -- a linear pass over every *other* committed event.
//!    Any event whose slot overlaps the candidate's is a conflict if it uses
//!    the same room, shares a host, or seats one of the candidate's
//!    attendees. The first violation wins.
//!
//! The scan deliberately has no interval index; the schedule is small and
//! the predicate must stay exactly `a < b+e && b < a+d`.

use conclave_types::{Amenity, Event};

use crate::error::ScheduleError;
use crate::room::RoomRegistry;

/// Check that the candidate's slot is well formed.
pub(crate) const fn check_slot(candidate: &Event) -> Result<(), ScheduleError> {
    if candidate.duration == 0 {
        return Err(ScheduleError::InvalidDuration);
    }
    if candidate.slot().end().is_none() {
        return Err(ScheduleError::TimeSlotOverflow {
            start: candidate.start_time,
            duration: candidate.duration,
        });
    }
    Ok(())
}

/// Check that the candidate fits its room (capacity and amenities).
pub(crate) fn check_room_fit(rooms: &RoomRegistry, candidate: &Event) -> Result<(), ScheduleError> {
    let room = rooms.require(candidate.room)?;
    for amenity in [Amenity::Projector, Amenity::Tables] {
        if candidate.needs(amenity) && !room.has(amenity) {
            return Err(ScheduleError::MissingAmenity {
                room: room.number,
                amenity,
            });
        }
    }
    if candidate.capacity > room.capacity {
        return Err(ScheduleError::CapacityExceedsRoom {
            capacity: candidate.capacity,
            room: room.number,
            room_capacity: room.capacity,
        });
    }
    Ok(())
}

/// Scan the committed events for a room, host, or attendee conflict with
/// the candidate.
///
/// The candidate's own id is skipped so an event never conflicts with its
/// previous placement.
pub(crate) fn check_conflicts<'a>(
    events: impl IntoIterator<Item = &'a Event>,
    candidate: &Event,
) -> Result<(), ScheduleError> {
    let slot = candidate.slot();
    for other in events {
        if other.id == candidate.id || !other.slot().overlaps(slot) {
            continue;
        }
        if other.room == candidate.room {
            return Err(ScheduleError::RoomConflict {
                room: candidate.room,
                conflicting: other.id,
            });
        }
        if let Some(host) = other.hosts.iter().find(|h| candidate.has_host(**h)) {
            return Err(ScheduleError::HostConflict {
                host: *host,
                conflicting: other.id,
            });
        }
        if let Some(attendee) = candidate.attendees.iter().find(|a| other.has_attendee(**a)) {
            return Err(ScheduleError::AttendeeBusy {
                attendee: *attendee,
                conflicting: other.id,
            });
        }
    }
    Ok(())
}

/// Run every placement check in order: slot, room fit, conflicts.
pub(crate) fn validate<'a>(
    rooms: &RoomRegistry,
    events: impl IntoIterator<Item = &'a Event>,
    candidate: &Event,
) -> Result<(), ScheduleError> {
    check_slot(candidate)?;
    check_room_fit(rooms, candidate)?;
    check_conflicts(events, candidate)
}

#[cfg(test)]
mod tests {
    use conclave_types::{EventId, EventProposal, Room, RoomNumber, UserId};

    use super::*;

    fn event(id: u64, room: u32, start: u32, duration: u32, hosts: &[u32]) -> Event {
        Event::from_proposal(
            EventId::new(id),
            EventProposal {
                name: format!("event-{id}"),
                room: RoomNumber::new(room),
                start_time: start,
                duration,
                capacity: 1,
                vip: false,
                hosts: hosts.iter().copied().map(UserId::new).collect(),
                needs_projector: false,
                needs_tables: false,
            },
        )
    }

    #[test]
    fn zero_duration_rejected() {
        assert_eq!(check_slot(&event(0, 1, 9, 0, &[])), Err(ScheduleError::InvalidDuration));
    }

    #[test]
    fn overflowing_slot_rejected() {
        let result = check_slot(&event(0, 1, u32::MAX, 2, &[]));
        assert!(matches!(result, Err(ScheduleError::TimeSlotOverflow { .. })));
    }

    #[test]
    fn missing_projector_rejected_before_capacity() {
        let mut rooms = RoomRegistry::new();
        let _ = rooms.add(Room::new(RoomNumber::new(1), 0, false, false));
        let mut candidate = event(0, 1, 9, 1, &[]);
        candidate.needs_projector = true;
        candidate.capacity = 5;
        assert_eq!(
            check_room_fit(&rooms, &candidate),
            Err(ScheduleError::MissingAmenity {
                room: RoomNumber::new(1),
                amenity: Amenity::Projector,
            })
        );
    }

    #[test]
    fn same_event_never_conflicts_with_itself() {
        let existing = vec![event(3, 1, 9, 2, &[5])];
        let moved = event(3, 1, 10, 2, &[5]);
        assert!(check_conflicts(&existing, &moved).is_ok());
    }

    #[test]
    fn host_conflict_ignores_room() {
        let existing = vec![event(0, 1, 9, 2, &[5, 6])];
        let candidate = event(1, 2, 10, 1, &[7, 6]);
        assert_eq!(
            check_conflicts(&existing, &candidate),
            Err(ScheduleError::HostConflict {
                host: UserId::new(6),
                conflicting: EventId::new(0),
            })
        );
    }

    #[test]
    fn shared_attendee_conflicts_across_rooms() {
        let mut existing = event(0, 1, 9, 2, &[5]);
        existing.attendees.push(UserId::new(8));
        let mut candidate = event(1, 2, 10, 1, &[6]);
        candidate.attendees.push(UserId::new(8));
        assert_eq!(
            check_conflicts(&[existing], &candidate),
            Err(ScheduleError::AttendeeBusy {
                attendee: UserId::new(8),
                conflicting: EventId::new(0),
            })
        );
    }

    #[test]
    fn back_to_back_in_same_room_allowed() {
        let existing = vec![event(0, 1, 9, 2, &[5])];
        assert!(check_conflicts(&existing, &event(1, 1, 11, 1, &[5])).is_ok());
        assert!(check_conflicts(&existing, &event(1, 1, 8, 1, &[5])).is_ok());
    }
}
