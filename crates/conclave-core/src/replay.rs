//! Startup replay: rebuilding the schedule from the store.
//!
//! Replay is a pure state reconstruction. Stored rooms go through the
//! registry's `add`, stored events through the store's `add`, and each
//! event's attendees through registration, so every invariant is checked
//! again on the way in. Nothing is announced to the listener.
//!
//! Events are replayed in ascending stored id. The engine hands out dense
//! ids, so an event may come back under a smaller id than the one it was
//! stored with; the store is told with [`WriteOp::ReassignEventId`]. A
//! replayed id never exceeds its stored id, so a reassignment can only
//! land on an id that was already processed and freed.

use std::sync::Arc;

use chrono::Utc;
use conclave_scheduling::IdentityOracle;
use tracing::{info, warn};

use crate::conference::{Conference, ConferenceError};
use crate::gateway::{EventRecord, ScheduleGateway, StoredSchedule, WriteOp};

/// Counts from one replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayReport {
    /// Rooms registered.
    pub rooms_restored: usize,
    /// Stored rooms the registry refused.
    pub rooms_rejected: usize,
    /// Events placed.
    pub events_restored: usize,
    /// Stored events that failed placement and were dropped from the store.
    pub events_rejected: usize,
    /// Registrations replayed.
    pub attendees_restored: usize,
    /// Stored registrations that failed a gate.
    pub attendees_rejected: usize,
    /// Events that came back under a different id.
    pub ids_reassigned: usize,
    /// Corrective writes the store failed to apply.
    pub write_failures: usize,
}

impl<G: ScheduleGateway> Conference<G> {
    /// Load the stored schedule and replay it into a new conference.
    ///
    /// # Errors
    ///
    /// Returns [`ConferenceError::Persistence`] if the store cannot be read.
    pub async fn open(
        gateway: G,
        identity: Arc<dyn IdentityOracle + Send + Sync>,
    ) -> Result<(Self, ReplayReport), ConferenceError> {
        let stored = gateway.load().await?;
        let conference = Self::new(gateway, identity);
        let report = conference.restore(stored).await;
        Ok((conference, report))
    }

    /// Replay stored state into the schedule.
    ///
    /// Intended for a freshly created conference. Items the engine rejects
    /// are skipped with a warning, and the store is corrected so it
    /// matches what was restored.
    pub async fn restore(&self, stored: StoredSchedule) -> ReplayReport {
        let mut schedule = self.schedule.write().await;
        let mut report = ReplayReport::default();

        let mut rooms = stored.rooms;
        rooms.sort_by_key(|r| r.number);
        for record in &rooms {
            match schedule.add_room(record.to_room()) {
                Ok(()) => report.rooms_restored = report.rooms_restored.saturating_add(1),
                Err(e) => {
                    warn!(room = %record.number, error = %e, "stored room rejected on replay");
                    report.rooms_rejected = report.rooms_rejected.saturating_add(1);
                }
            }
        }

        let mut events = stored.events;
        events.sort_by_key(|e| e.id);
        for record in &events {
            let id = match schedule.add_event(record.to_proposal()) {
                Ok(id) => id,
                Err(e) => {
                    warn!(event_id = %record.id, name = %record.name, error = %e, "stored event rejected on replay");
                    report.events_rejected = report.events_rejected.saturating_add(1);
                    self.corrective_write(&WriteOp::RemoveEvent { event: record.id }, &mut report)
                        .await;
                    continue;
                }
            };
            report.events_restored = report.events_restored.saturating_add(1);

            let mut roster_changed = false;
            for attendee in &record.attendees {
                match schedule.add_attendee(*attendee, id, self.identity.as_ref()) {
                    Ok(()) => report.attendees_restored = report.attendees_restored.saturating_add(1),
                    Err(e) => {
                        warn!(event_id = %id, attendee = %attendee, error = %e, "stored registration rejected on replay");
                        report.attendees_rejected = report.attendees_rejected.saturating_add(1);
                        roster_changed = true;
                    }
                }
            }

            if id != record.id {
                report.ids_reassigned = report.ids_reassigned.saturating_add(1);
            }
            if roster_changed {
                // Rewrite the whole document rather than patching the roster.
                self.corrective_write(&WriteOp::RemoveEvent { event: record.id }, &mut report)
                    .await;
                if let Some(event) = schedule.event(id) {
                    let fresh = EventRecord::from_event(event, Utc::now());
                    self.corrective_write(&WriteOp::InsertEvent(fresh), &mut report)
                        .await;
                }
            } else if id != record.id {
                self.corrective_write(
                    &WriteOp::ReassignEventId {
                        from: record.id,
                        to: id,
                    },
                    &mut report,
                )
                .await;
            }
        }
        drop(schedule);

        info!(
            rooms = report.rooms_restored,
            events = report.events_restored,
            attendees = report.attendees_restored,
            rejected_events = report.events_rejected,
            rejected_attendees = report.attendees_rejected,
            reassigned = report.ids_reassigned,
            "schedule restored"
        );
        report
    }

    async fn corrective_write(&self, op: &WriteOp, report: &mut ReplayReport) {
        if let Err(e) = self.gateway.apply(op).await {
            warn!(error = %e, ?op, "corrective write failed during replay");
            report.write_failures = report.write_failures.saturating_add(1);
        }
    }
}
