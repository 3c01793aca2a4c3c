//! The concurrent conference service.
//!
//! [`Conference`] serializes every validate-then-commit sequence behind a
//! single [`RwLock`] around the [`Schedule`]. A mutation takes the write
//! lock, runs the engine operation, issues one [`WriteOp`] to the gateway,
//! notifies the listener, and only then releases the lock, so persistence
//! and notification order always match commit order. Reads share the lock
//! and return owned values.
//!
//! A gateway failure after a successful commit does not undo the commit.
//! It is logged and returned as [`ConferenceError::Persistence`], and the
//! in-memory schedule and the store stay diverged until the next restart.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::Utc;
use conclave_scheduling::{EventInfo, IdentityOracle, Schedule, ScheduleError};
use conclave_types::{Event, EventId, EventProposal, Room, RoomFilter, RoomNumber, UserId};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::gateway::{EventRecord, GatewayError, RoomRecord, ScheduleGateway, WriteOp};
use crate::listener::{ScheduleChange, ScheduleListener};

/// Errors returned by [`Conference`] operations.
#[derive(Debug, thiserror::Error)]
pub enum ConferenceError {
    /// The engine rejected the operation. Nothing was committed.
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    /// The operation was committed in memory but could not be persisted.
    #[error("write-through failed: {0}")]
    Persistence(#[from] GatewayError),
}

/// Outcome of an engine mutation, before write-through.
struct Committed<T> {
    value: T,
    write: Option<WriteOp>,
    change: Option<ScheduleChange>,
}

impl<T> Committed<T> {
    const fn new(value: T, write: WriteOp, change: ScheduleChange) -> Self {
        Self {
            value,
            write: Some(write),
            change: Some(change),
        }
    }

    /// A successful call that changed nothing.
    const fn unchanged(value: T) -> Self {
        Self {
            value,
            write: None,
            change: None,
        }
    }
}

/// A running conference: the schedule, its identity source, its store, and
/// an optional change listener.
pub struct Conference<G> {
    pub(crate) schedule: RwLock<Schedule>,
    pub(crate) identity: Arc<dyn IdentityOracle + Send + Sync>,
    pub(crate) gateway: G,
    listener: Option<Arc<dyn ScheduleListener>>,
}

impl<G: ScheduleGateway> Conference<G> {
    /// Create a conference with an empty schedule.
    pub fn new(gateway: G, identity: Arc<dyn IdentityOracle + Send + Sync>) -> Self {
        Self {
            schedule: RwLock::new(Schedule::new()),
            identity,
            gateway,
            listener: None,
        }
    }

    /// Install a change listener.
    #[must_use]
    pub fn with_listener(mut self, listener: Arc<dyn ScheduleListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// The persistence gateway.
    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Run `mutate` under the write lock, then write through and notify.
    async fn commit<T>(
        &self,
        mutate: impl FnOnce(&mut Schedule, &dyn IdentityOracle) -> Result<Committed<T>, ScheduleError>,
    ) -> Result<T, ConferenceError> {
        let mut schedule = self.schedule.write().await;
        let committed = mutate(&mut schedule, self.identity.as_ref())?;

        let persisted = match &committed.write {
            Some(op) => self.write_through(op).await,
            None => Ok(()),
        };
        if let (Some(listener), Some(change)) = (&self.listener, &committed.change) {
            listener.on_change(change);
        }
        drop(schedule);

        persisted.map(|()| committed.value)
    }

    async fn write_through(&self, op: &WriteOp) -> Result<(), ConferenceError> {
        self.gateway.apply(op).await.map_err(|e| {
            warn!(error = %e, ?op, "write-through failed, in-memory commit stands");
            ConferenceError::Persistence(e)
        })
    }

    // -------------------------------------------------------------------
    // Rooms
    // -------------------------------------------------------------------

    /// Register a room.
    ///
    /// # Errors
    ///
    /// [`ScheduleError::DuplicateRoom`] if the number is taken, or
    /// [`ConferenceError::Persistence`] if the write-through failed.
    pub async fn add_room(&self, room: Room) -> Result<(), ConferenceError> {
        self.commit(|schedule, _| {
            let record = RoomRecord::from_room(&room, Utc::now());
            let number = room.number;
            schedule.add_room(room)?;
            Ok(Committed::new(
                (),
                WriteOp::PutRoom(record),
                ScheduleChange::RoomUpdated {
                    room: number,
                    stranded: Vec::new(),
                },
            ))
        })
        .await
    }

    /// Change a room's seat capacity.
    ///
    /// Never rejected because of events already in the room; returns the
    /// events the change left over capacity.
    ///
    /// # Errors
    ///
    /// [`ScheduleError::RoomNotFound`] or [`ConferenceError::Persistence`].
    pub async fn set_room_capacity(&self, number: RoomNumber, capacity: u32) -> Result<Vec<EventId>, ConferenceError> {
        self.commit(|schedule, _| {
            schedule.set_room_capacity(number, capacity)?;
            room_changed(schedule, number)
        })
        .await
    }

    /// Add or remove a room's projector. Returns events left without one.
    ///
    /// # Errors
    ///
    /// [`ScheduleError::RoomNotFound`] or [`ConferenceError::Persistence`].
    pub async fn set_room_projector(&self, number: RoomNumber, has_projector: bool) -> Result<Vec<EventId>, ConferenceError> {
        self.commit(|schedule, _| {
            schedule.set_room_projector(number, has_projector)?;
            room_changed(schedule, number)
        })
        .await
    }

    /// Add or remove a room's tables. Returns events left without them.
    ///
    /// # Errors
    ///
    /// [`ScheduleError::RoomNotFound`] or [`ConferenceError::Persistence`].
    pub async fn set_room_tables(&self, number: RoomNumber, has_tables: bool) -> Result<Vec<EventId>, ConferenceError> {
        self.commit(|schedule, _| {
            schedule.set_room_tables(number, has_tables)?;
            room_changed(schedule, number)
        })
        .await
    }

    // -------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------

    /// Place a new event.
    ///
    /// # Errors
    ///
    /// The first placement violation, or [`ConferenceError::Persistence`].
    pub async fn schedule_event(&self, proposal: EventProposal) -> Result<EventId, ConferenceError> {
        self.commit(|schedule, _| {
            let id = schedule.add_event(proposal)?;
            let record = schedule
                .event(id)
                .map(|event| EventRecord::from_event(event, Utc::now()))
                .ok_or(ScheduleError::EventNotFound(id))?;
            Ok(Committed::new(
                id,
                WriteOp::InsertEvent(record),
                ScheduleChange::EventScheduled { event: id },
            ))
        })
        .await
    }

    /// Remove an event and return it, roster included.
    ///
    /// # Errors
    ///
    /// [`ScheduleError::EventNotFound`] or [`ConferenceError::Persistence`].
    pub async fn cancel_event(&self, id: EventId) -> Result<Event, ConferenceError> {
        self.commit(|schedule, _| {
            let removed = schedule.remove_event(id)?;
            let change = ScheduleChange::EventCancelled {
                event: removed.clone(),
            };
            Ok(Committed::new(removed, WriteOp::RemoveEvent { event: id }, change))
        })
        .await
    }

    /// Move an event to a new start hour.
    ///
    /// # Errors
    ///
    /// The first placement violation, or [`ConferenceError::Persistence`].
    pub async fn reschedule_event(&self, id: EventId, start_time: u32) -> Result<(), ConferenceError> {
        self.commit(|schedule, _| {
            let from = schedule
                .event(id)
                .map(|e| e.start_time)
                .ok_or(ScheduleError::EventNotFound(id))?;
            schedule.reschedule(id, start_time)?;
            Ok(Committed::new(
                (),
                WriteOp::UpdateStartTime { event: id, start_time },
                ScheduleChange::EventRescheduled {
                    event: id,
                    from,
                    to: start_time,
                },
            ))
        })
        .await
    }

    /// Change an event's length.
    ///
    /// # Errors
    ///
    /// The first placement violation, or [`ConferenceError::Persistence`].
    pub async fn change_duration(&self, id: EventId, duration: u32) -> Result<(), ConferenceError> {
        self.commit(|schedule, _| {
            schedule.change_duration(id, duration)?;
            Ok(updated(id, WriteOp::UpdateDuration { event: id, duration }))
        })
        .await
    }

    /// Move an event to another room at the same time.
    ///
    /// # Errors
    ///
    /// The first placement violation, or [`ConferenceError::Persistence`].
    pub async fn move_event(&self, id: EventId, room: RoomNumber) -> Result<(), ConferenceError> {
        self.commit(|schedule, _| {
            schedule.move_to_room(id, room)?;
            Ok(updated(id, WriteOp::UpdateRoom { event: id, room }))
        })
        .await
    }

    /// Change an event's capacity.
    ///
    /// # Errors
    ///
    /// [`ScheduleError::CapacityBelowAttendance`],
    /// [`ScheduleError::CapacityExceedsRoom`], or
    /// [`ConferenceError::Persistence`].
    pub async fn change_capacity(&self, id: EventId, capacity: u32) -> Result<(), ConferenceError> {
        self.commit(|schedule, _| {
            schedule.change_capacity(id, capacity)?;
            Ok(updated(id, WriteOp::UpdateCapacity { event: id, capacity }))
        })
        .await
    }

    /// Require or release a projector for an event.
    ///
    /// # Errors
    ///
    /// [`ScheduleError::MissingAmenity`] or [`ConferenceError::Persistence`].
    pub async fn set_event_needs_projector(&self, id: EventId, needs: bool) -> Result<(), ConferenceError> {
        self.commit(|schedule, _| {
            schedule.set_needs_projector(id, needs)?;
            amenities_changed(schedule, id)
        })
        .await
    }

    /// Require or release tables for an event.
    ///
    /// # Errors
    ///
    /// [`ScheduleError::MissingAmenity`] or [`ConferenceError::Persistence`].
    pub async fn set_event_needs_tables(&self, id: EventId, needs: bool) -> Result<(), ConferenceError> {
        self.commit(|schedule, _| {
            schedule.set_needs_tables(id, needs)?;
            amenities_changed(schedule, id)
        })
        .await
    }

    /// Add a host to an event.
    ///
    /// # Errors
    ///
    /// [`ScheduleError::DuplicateHost`], [`ScheduleError::HostConflict`], or
    /// [`ConferenceError::Persistence`].
    pub async fn add_host(&self, id: EventId, host: UserId) -> Result<(), ConferenceError> {
        self.commit(|schedule, _| {
            schedule.add_host(id, host)?;
            Ok(updated(
                id,
                WriteOp::UpdateHost {
                    event: id,
                    host,
                    remove: false,
                },
            ))
        })
        .await
    }

    /// Remove a host from an event. Returns whether they were a host.
    ///
    /// # Errors
    ///
    /// [`ScheduleError::EventNotFound`] or [`ConferenceError::Persistence`].
    pub async fn remove_host(&self, id: EventId, host: UserId) -> Result<bool, ConferenceError> {
        self.commit(|schedule, _| {
            if !schedule.remove_host(id, host)? {
                return Ok(Committed::unchanged(false));
            }
            Ok(Committed::new(
                true,
                WriteOp::UpdateHost {
                    event: id,
                    host,
                    remove: true,
                },
                ScheduleChange::EventUpdated { event: id },
            ))
        })
        .await
    }

    // -------------------------------------------------------------------
    // Registration
    // -------------------------------------------------------------------

    /// Register an attendee for an event.
    ///
    /// # Errors
    ///
    /// The first registration gate that failed, or
    /// [`ConferenceError::Persistence`].
    pub async fn register(&self, attendee: UserId, event: EventId) -> Result<(), ConferenceError> {
        self.commit(|schedule, identity| {
            schedule.add_attendee(attendee, event, identity)?;
            Ok(Committed::new(
                (),
                WriteOp::UpdateAttendee {
                    event,
                    attendee,
                    remove: false,
                },
                ScheduleChange::AttendeeRegistered { event, attendee },
            ))
        })
        .await
    }

    /// Release an attendee's seat. Returns whether they were registered.
    ///
    /// # Errors
    ///
    /// [`ScheduleError::EventNotFound`] or [`ConferenceError::Persistence`].
    pub async fn unregister(&self, attendee: UserId, event: EventId) -> Result<bool, ConferenceError> {
        self.commit(|schedule, _| {
            if !schedule.remove_attendee(attendee, event)? {
                return Ok(Committed::unchanged(false));
            }
            Ok(Committed::new(
                true,
                WriteOp::UpdateAttendee {
                    event,
                    attendee,
                    remove: true,
                },
                ScheduleChange::AttendeeCancelled { event, attendee },
            ))
        })
        .await
    }

    // -------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------

    /// A copy of an event.
    pub async fn event(&self, id: EventId) -> Option<Event> {
        self.schedule.read().await.event(id).cloned()
    }

    /// A copy of a room.
    pub async fn room(&self, number: RoomNumber) -> Option<Room> {
        self.schedule.read().await.room(number).cloned()
    }

    /// Flattened view of an event.
    pub async fn event_info(&self, id: EventId) -> Option<EventInfo> {
        self.schedule.read().await.events().event_info(id)
    }

    /// Availability summaries of every event `attendee` has not joined,
    /// or of every event when `None`.
    pub async fn available_events(&self, attendee: Option<UserId>) -> Vec<(EventId, String)> {
        self.schedule.read().await.events().list_available(attendee)
    }

    /// Room summaries matching `filter`.
    pub async fn rooms(&self, filter: RoomFilter) -> BTreeMap<RoomNumber, String> {
        self.schedule.read().await.rooms().list(filter)
    }

    /// Events the user is registered for.
    pub async fn events_of_attendee(&self, attendee: UserId) -> Vec<Event> {
        let schedule = self.schedule.read().await;
        schedule
            .events()
            .events_of_attendee(attendee)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Events the user hosts.
    pub async fn events_of_host(&self, host: UserId) -> Vec<Event> {
        let schedule = self.schedule.read().await;
        schedule
            .events()
            .events_of_host(host)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Hosts of every event the attendee is registered for.
    pub async fn hosts_for_attendee(&self, attendee: UserId) -> BTreeSet<UserId> {
        self.schedule.read().await.events().hosts_for_attendee(attendee)
    }

    /// Attendees of every event the host runs.
    pub async fn attendees_for_host(&self, host: UserId) -> BTreeSet<UserId> {
        self.schedule.read().await.events().attendees_for_host(host)
    }

    /// Attendees of an event with their display names, in registration
    /// order. Users the directory does not know are shown by id.
    pub async fn roster(&self, id: EventId) -> Option<Vec<(UserId, String)>> {
        let schedule = self.schedule.read().await;
        let event = schedule.event(id)?;
        Some(
            event
                .attendees
                .iter()
                .map(|a| {
                    let name = self
                        .identity
                        .display_name(*a)
                        .unwrap_or_else(|| format!("user {a}"));
                    (*a, name)
                })
                .collect(),
        )
    }

    /// Events whose room no longer fits them.
    pub async fn stranded_events(&self) -> Vec<(EventId, ScheduleError)> {
        self.schedule.read().await.stranded_events()
    }

    /// Id the next successfully scheduled event will receive.
    pub async fn next_event_id(&self) -> EventId {
        self.schedule.read().await.events().next_id()
    }

    /// A consistent copy of the whole schedule.
    pub async fn snapshot(&self) -> Schedule {
        self.schedule.read().await.clone()
    }
}

/// Write-through and notification for a changed room.
fn room_changed(schedule: &Schedule, number: RoomNumber) -> Result<Committed<Vec<EventId>>, ScheduleError> {
    let room = schedule
        .room(number)
        .ok_or(ScheduleError::RoomNotFound(number))?;
    let record = RoomRecord::from_room(room, Utc::now());

    let stranded: Vec<EventId> = schedule
        .stranded_events()
        .into_iter()
        .filter(|(id, _)| schedule.event(*id).is_some_and(|e| e.room == number))
        .map(|(id, reason)| {
            warn!(room = %number, event_id = %id, %reason, "room change stranded event");
            id
        })
        .collect();
    debug!(room = %number, stranded = stranded.len(), "room updated");

    Ok(Committed::new(
        stranded.clone(),
        WriteOp::PutRoom(record),
        ScheduleChange::RoomUpdated {
            room: number,
            stranded,
        },
    ))
}

/// Write-through carrying both amenity flags after a change.
fn amenities_changed(schedule: &Schedule, id: EventId) -> Result<Committed<()>, ScheduleError> {
    let event = schedule.event(id).ok_or(ScheduleError::EventNotFound(id))?;
    Ok(updated(
        id,
        WriteOp::UpdateAmenities {
            event: id,
            needs_projector: event.needs_projector,
            needs_tables: event.needs_tables,
        },
    ))
}

const fn updated(id: EventId, write: WriteOp) -> Committed<()> {
    Committed::new((), write, ScheduleChange::EventUpdated { event: id })
}
