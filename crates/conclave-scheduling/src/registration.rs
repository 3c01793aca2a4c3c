//! Registration flow: seating attendees in events.
//!
//! A registration runs four gates in a fixed order and stops at the
//! first failure:
//!
//! 1. the attendee does not already hold a seat in the event,
//! 2. the attendee is free for the event's whole slot,
//! 3. the event has a seat left,
//! 4. VIP-only events admit only VIP attendees.
//!
//! Nothing is written unless every gate passes.

use conclave_types::{EventId, UserId};
use tracing::debug;

use crate::error::ScheduleError;
use crate::identity::IdentityOracle;
use crate::store::EventStore;

impl EventStore {
    /// Register `attendee` for an event.
    ///
    /// # Errors
    ///
    /// - [`ScheduleError::EventNotFound`] if the event does not exist.
    /// - [`ScheduleError::AlreadyRegistered`] if the attendee already
    ///   holds a seat in this event.
    /// - [`ScheduleError::AttendeeBusy`] if they are registered in an
    ///   overlapping event.
    /// - [`ScheduleError::EventFull`] if every seat is taken.
    /// - [`ScheduleError::VipOnly`] if the event is VIP-only and the
    ///   attendee is not VIP.
    pub fn add_attendee(
        &mut self,
        attendee: UserId,
        event_id: EventId,
        identity: &dyn IdentityOracle,
    ) -> Result<(), ScheduleError> {
        let event = self.require(event_id)?;
        if event.has_attendee(attendee) {
            return Err(ScheduleError::AlreadyRegistered {
                attendee,
                event: event_id,
            });
        }

        let slot = event.slot();
        if let Some(other) = self
            .iter()
            .find(|other| other.id != event_id && other.has_attendee(attendee) && other.slot().overlaps(slot))
        {
            debug!(attendee = %attendee, event_id = %event_id, conflicting = %other.id, "attendee busy");
            return Err(ScheduleError::AttendeeBusy {
                attendee,
                conflicting: other.id,
            });
        }

        if event.is_full() {
            return Err(ScheduleError::EventFull {
                event: event_id,
                capacity: event.capacity,
            });
        }

        if event.vip && !identity.is_vip(attendee) {
            return Err(ScheduleError::VipOnly {
                attendee,
                event: event_id,
            });
        }

        if let Some(event) = self.events.get_mut(&event_id) {
            event.attendees.push(attendee);
        }
        debug!(attendee = %attendee, event_id = %event_id, "attendee registered");
        Ok(())
    }

    /// Release the attendee's seat.
    ///
    /// Returns `Ok(false)` without touching anything if the attendee was
    /// not registered.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::EventNotFound`] if the event does not exist.
    pub fn remove_attendee(&mut self, attendee: UserId, event_id: EventId) -> Result<bool, ScheduleError> {
        let event = self
            .events
            .get_mut(&event_id)
            .ok_or(ScheduleError::EventNotFound(event_id))?;
        let Some(position) = event.attendees.iter().position(|a| *a == attendee) else {
            return Ok(false);
        };
        event.attendees.remove(position);
        debug!(attendee = %attendee, event_id = %event_id, "attendee unregistered");
        Ok(true)
    }
}
