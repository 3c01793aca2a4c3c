//! [`ScheduleGateway`] backed by `Dragonfly`.
//!
//! Rooms and events map one-to-one onto `conclave-db` documents. In-place
//! updates are read-modify-write on the event document; the conference
//! holds its write lock for the whole call, so no other update can
//! interleave.

use chrono::Utc;
use conclave_core::{EventRecord, GatewayError, RoomRecord, ScheduleGateway, StoredSchedule, WriteOp};
use conclave_db::{DbError, DragonflyPool};
use conclave_types::EventId;
use tracing::debug;

/// Gateway writing schedule documents to `Dragonfly`.
pub struct DragonflyGateway {
    pool: DragonflyPool,
}

impl DragonflyGateway {
    /// Wrap a connected pool.
    pub const fn new(pool: DragonflyPool) -> Self {
        Self { pool }
    }

    async fn event(&self, id: EventId) -> Result<EventRecord, GatewayError> {
        self.pool.get_event(id).await.map_err(|e| match e {
            DbError::KeyNotFound(_) => GatewayError::MissingEvent(id),
            other => backend(other),
        })
    }
}

fn backend(e: DbError) -> GatewayError {
    GatewayError::Backend(Box::new(e))
}

impl ScheduleGateway for DragonflyGateway {
    async fn load(&self) -> Result<StoredSchedule, GatewayError> {
        let rooms: Vec<RoomRecord> = self.pool.load_rooms().await.map_err(backend)?;
        let events: Vec<EventRecord> = self.pool.load_events().await.map_err(backend)?;
        debug!(rooms = rooms.len(), events = events.len(), "loaded schedule from Dragonfly");
        Ok(StoredSchedule { rooms, events })
    }

    async fn apply(&self, op: &WriteOp) -> Result<(), GatewayError> {
        match op {
            WriteOp::PutRoom(record) => self.pool.put_room(record.number, record).await.map_err(backend),
            WriteOp::InsertEvent(record) => self.pool.put_event(record.id, record).await.map_err(backend),
            WriteOp::RemoveEvent { event } => self.pool.delete_event(*event).await.map_err(backend),
            WriteOp::ReassignEventId { from, to } => {
                let mut doc = self.event(*from).await?;
                doc.id = *to;
                doc.updated_at = Utc::now();
                self.pool.put_event(*to, &doc).await.map_err(backend)?;
                self.pool.delete_event(*from).await.map_err(backend)
            }
            update => {
                let Some(id) = update.updated_event() else {
                    return Ok(());
                };
                let mut doc = self.event(id).await?;
                doc.apply_update(update, Utc::now());
                self.pool.put_event(id, &doc).await.map_err(backend)
            }
        }
    }
}
