//! The persistence seam.
//!
//! The conference service issues exactly one [`WriteOp`] after every
//! committed mutation and reads a [`StoredSchedule`] once at startup. A
//! [`ScheduleGateway`] turns those into whatever the backing store needs.
//! Writes are not transactional with the in-memory commit.

use std::collections::BTreeMap;
use std::future::Future;

use chrono::{DateTime, Utc};
use conclave_types::{Event, EventId, EventProposal, Room, RoomNumber, UserId};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

/// Errors surfaced by a gateway.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The update targets an event document that does not exist.
    #[error("no stored event with id {0}")]
    MissingEvent(EventId),

    /// The backing store failed.
    #[error("storage backend error: {0}")]
    Backend(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Stored form of a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomRecord {
    /// Room number.
    pub number: RoomNumber,
    /// Seat capacity.
    pub capacity: u32,
    /// Has a projector.
    pub has_projector: bool,
    /// Has tables.
    pub has_tables: bool,
    /// Last write time.
    pub updated_at: DateTime<Utc>,
}

impl RoomRecord {
    /// Snapshot a room as of `now`.
    pub const fn from_room(room: &Room, now: DateTime<Utc>) -> Self {
        Self {
            number: room.number,
            capacity: room.capacity,
            has_projector: room.has_projector,
            has_tables: room.has_tables,
            updated_at: now,
        }
    }

    /// Rebuild the room.
    pub const fn to_room(&self) -> Room {
        Room::new(self.number, self.capacity, self.has_projector, self.has_tables)
    }
}

/// Stored form of an event, including its roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Event id at the time it was written.
    pub id: EventId,
    /// Display name.
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
    /// Hosts, in insertion order.
    pub hosts: Vec<UserId>,
    /// Attendees, in registration order.
    pub attendees: Vec<UserId>,
    /// Last write time.
    pub updated_at: DateTime<Utc>,
}

impl EventRecord {
    /// Snapshot an event as of `now`.
    pub fn from_event(event: &Event, now: DateTime<Utc>) -> Self {
        Self {
            id: event.id,
            name: event.name.clone(),
            room: event.room,
            start_time: event.start_time,
            duration: event.duration,
            capacity: event.capacity,
            vip: event.vip,
            needs_projector: event.needs_projector,
            needs_tables: event.needs_tables,
            hosts: event.hosts.clone(),
            attendees: event.attendees.clone(),
            updated_at: now,
        }
    }

    /// The placement part of the record, without its roster.
    pub fn to_proposal(&self) -> EventProposal {
        EventProposal {
            name: self.name.clone(),
            room: self.room,
            start_time: self.start_time,
            duration: self.duration,
            capacity: self.capacity,
            vip: self.vip,
            hosts: self.hosts.clone(),
            needs_projector: self.needs_projector,
            needs_tables: self.needs_tables,
        }
    }

    /// Apply an in-place `Update*` operation to this document.
    ///
    /// Other operations are ignored; see [`WriteOp::updated_event`].
    pub fn apply_update(&mut self, op: &WriteOp, now: DateTime<Utc>) {
        match op {
            WriteOp::UpdateStartTime { start_time, .. } => self.start_time = *start_time,
            WriteOp::UpdateDuration { duration, .. } => self.duration = *duration,
            WriteOp::UpdateRoom { room, .. } => self.room = *room,
            WriteOp::UpdateCapacity { capacity, .. } => self.capacity = *capacity,
            WriteOp::UpdateAmenities {
                needs_projector,
                needs_tables,
                ..
            } => {
                self.needs_projector = *needs_projector;
                self.needs_tables = *needs_tables;
            }
            WriteOp::UpdateHost { host, remove, .. } => {
                if *remove {
                    self.hosts.retain(|h| h != host);
                } else {
                    self.hosts.push(*host);
                }
            }
            WriteOp::UpdateAttendee { attendee, remove, .. } => {
                if *remove {
                    self.attendees.retain(|a| a != attendee);
                } else {
                    self.attendees.push(*attendee);
                }
            }
            WriteOp::PutRoom(_)
            | WriteOp::InsertEvent(_)
            | WriteOp::RemoveEvent { .. }
            | WriteOp::ReassignEventId { .. } => return,
        }
        self.updated_at = now;
    }
}

/// Everything the store holds, as read at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSchedule {
    /// Stored rooms, in no particular order.
    pub rooms: Vec<RoomRecord>,
    /// Stored events, in no particular order.
    pub events: Vec<EventRecord>,
}

/// One write-through operation, issued after a committed mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum WriteOp {
    /// Insert or overwrite a room.
    PutRoom(RoomRecord),
    /// Insert a new event document.
    InsertEvent(EventRecord),
    /// Delete an event document.
    RemoveEvent {
        /// Event to delete.
        event: EventId,
    },
    /// Change an event's start hour.
    UpdateStartTime {
        /// Target event.
        event: EventId,
        /// New start hour.
        start_time: u32,
    },
    /// Change an event's length.
    UpdateDuration {
        /// Target event.
        event: EventId,
        /// New length in hours.
        duration: u32,
    },
    /// Move an event to another room.
    UpdateRoom {
        /// Target event.
        event: EventId,
        /// New room.
        room: RoomNumber,
    },
    /// Change an event's capacity.
    UpdateCapacity {
        /// Target event.
        event: EventId,
        /// New capacity.
        capacity: u32,
    },
    /// Change an event's amenity requirements.
    UpdateAmenities {
        /// Target event.
        event: EventId,
        /// Needs a projector.
        needs_projector: bool,
        /// Needs tables.
        needs_tables: bool,
    },
    /// Add or remove a host.
    UpdateHost {
        /// Target event.
        event: EventId,
        /// Host affected.
        host: UserId,
        /// `true` to remove, `false` to add.
        remove: bool,
    },
    /// Add or remove an attendee.
    UpdateAttendee {
        /// Target event.
        event: EventId,
        /// Attendee affected.
        attendee: UserId,
        /// `true` to remove, `false` to add.
        remove: bool,
    },
    /// Move a stored event document to a new id after replay renumbered it.
    ReassignEventId {
        /// Id the document is stored under.
        from: EventId,
        /// Id the engine assigned on replay.
        to: EventId,
    },
}

impl WriteOp {
    /// The event an in-place update targets, for the `Update*` variants.
    ///
    /// Inserts, removals, reassignments, and room writes return `None`.
    pub const fn updated_event(&self) -> Option<EventId> {
        match self {
            Self::UpdateStartTime { event, .. }
            | Self::UpdateDuration { event, .. }
            | Self::UpdateRoom { event, .. }
            | Self::UpdateCapacity { event, .. }
            | Self::UpdateAmenities { event, .. }
            | Self::UpdateHost { event, .. }
            | Self::UpdateAttendee { event, .. } => Some(*event),
            Self::PutRoom(_)
            | Self::InsertEvent(_)
            | Self::RemoveEvent { .. }
            | Self::ReassignEventId { .. } => None,
        }
    }
}

/// Backing store for the schedule.
///
/// Both methods are called with the conference's write lock held, so an
/// implementation sees operations in commit order and never concurrently.
pub trait ScheduleGateway: Send + Sync {
    /// Read every stored room and event.
    fn load(&self) -> impl Future<Output = Result<StoredSchedule, GatewayError>> + Send;

    /// Apply one write-through operation.
    fn apply(&self, op: &WriteOp) -> impl Future<Output = Result<(), GatewayError>> + Send;
}

/// Room and event documents keyed by id.
#[derive(Debug, Default)]
struct Documents {
    rooms: BTreeMap<RoomNumber, RoomRecord>,
    events: BTreeMap<EventId, EventRecord>,
}

impl Documents {
    fn event_mut(&mut self, id: EventId) -> Result<&mut EventRecord, GatewayError> {
        self.events.get_mut(&id).ok_or(GatewayError::MissingEvent(id))
    }

    fn apply(&mut self, op: &WriteOp, now: DateTime<Utc>) -> Result<(), GatewayError> {
        match op {
            WriteOp::PutRoom(record) => {
                self.rooms.insert(record.number, record.clone());
            }
            WriteOp::InsertEvent(record) => {
                self.events.insert(record.id, record.clone());
            }
            WriteOp::RemoveEvent { event } => {
                self.events.remove(event);
            }
            WriteOp::ReassignEventId { from, to } => {
                let mut doc = self
                    .events
                    .remove(from)
                    .ok_or(GatewayError::MissingEvent(*from))?;
                doc.id = *to;
                doc.updated_at = now;
                self.events.insert(*to, doc);
            }
            update => {
                if let Some(id) = update.updated_event() {
                    self.event_mut(id)?.apply_update(update, now);
                }
            }
        }
        Ok(())
    }
}

/// In-process gateway holding documents behind a mutex.
///
/// Used by tests and by the `memory` storage backend.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    docs: Mutex<Documents>,
}

impl MemoryGateway {
    /// Create an empty gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a gateway pre-populated with stored state.
    pub fn with_contents(stored: StoredSchedule) -> Self {
        let docs = Documents {
            rooms: stored.rooms.into_iter().map(|r| (r.number, r)).collect(),
            events: stored.events.into_iter().map(|e| (e.id, e)).collect(),
        };
        Self {
            docs: Mutex::new(docs),
        }
    }

    /// Current documents, rooms by number and events by id.
    pub async fn contents(&self) -> StoredSchedule {
        let docs = self.docs.lock().await;
        StoredSchedule {
            rooms: docs.rooms.values().cloned().collect(),
            events: docs.events.values().cloned().collect(),
        }
    }
}

impl ScheduleGateway for MemoryGateway {
    async fn load(&self) -> Result<StoredSchedule, GatewayError> {
        Ok(self.contents().await)
    }

    async fn apply(&self, op: &WriteOp) -> Result<(), GatewayError> {
        let mut docs = self.docs.lock().await;
        docs.apply(op, Utc::now())?;
        debug!(?op, "memory gateway applied write");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn record(id: u64) -> EventRecord {
        EventRecord {
            id: EventId::new(id),
            name: format!("event {id}"),
            room: RoomNumber::new(1),
            start_time: 9,
            duration: 1,
            capacity: 4,
            vip: false,
            needs_projector: false,
            needs_tables: false,
            hosts: vec![UserId::new(5)],
            attendees: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn updates_target_existing_documents() {
        let gateway = MemoryGateway::new();
        gateway.apply(&WriteOp::InsertEvent(record(0))).await.unwrap();
        gateway
            .apply(&WriteOp::UpdateAttendee {
                event: EventId::new(0),
                attendee: UserId::new(9),
                remove: false,
            })
            .await
            .unwrap();
        gateway
            .apply(&WriteOp::UpdateHost {
                event: EventId::new(0),
                host: UserId::new(5),
                remove: true,
            })
            .await
            .unwrap();

        let stored = gateway.load().await.unwrap();
        let event = stored.events.first().unwrap();
        assert_eq!(event.attendees, vec![UserId::new(9)]);
        assert!(event.hosts.is_empty());

        let missing = gateway
            .apply(&WriteOp::UpdateCapacity {
                event: EventId::new(7),
                capacity: 1,
            })
            .await;
        assert!(matches!(missing, Err(GatewayError::MissingEvent(id)) if id == EventId::new(7)));
    }

    #[tokio::test]
    async fn reassign_moves_the_document() {
        let gateway = MemoryGateway::with_contents(StoredSchedule {
            rooms: Vec::new(),
            events: vec![record(4)],
        });
        gateway
            .apply(&WriteOp::ReassignEventId {
                from: EventId::new(4),
                to: EventId::new(0),
            })
            .await
            .unwrap();
        let stored = gateway.contents().await;
        assert_eq!(stored.events.len(), 1);
        assert_eq!(stored.events.first().map(|e| e.id), Some(EventId::new(0)));
    }

    #[test]
    fn write_ops_are_tagged() {
        let op = WriteOp::RemoveEvent {
            event: EventId::new(3),
        };
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["op"], "remove_event");
        assert_eq!(json["event"], 3);
    }
}
