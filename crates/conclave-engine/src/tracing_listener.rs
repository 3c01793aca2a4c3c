//! Schedule listener that logs every committed change.

use conclave_core::{ScheduleChange, ScheduleListener};
use tracing::{info, warn};

/// Logs each [`ScheduleChange`] at `info`, and stranded events at `warn`.
pub struct TracingListener;

impl ScheduleListener for TracingListener {
    fn on_change(&self, change: &ScheduleChange) {
        match change {
            ScheduleChange::EventScheduled { event } => info!(event_id = %event, "event scheduled"),
            ScheduleChange::EventCancelled { event } => info!(
                event_id = %event.id,
                name = %event.name,
                attendees = event.attendees.len(),
                "event cancelled"
            ),
            ScheduleChange::EventRescheduled { event, from, to } => {
                info!(event_id = %event, from, to, "event rescheduled");
            }
            ScheduleChange::EventUpdated { event } => info!(event_id = %event, "event updated"),
            ScheduleChange::AttendeeRegistered { event, attendee } => {
                info!(event_id = %event, attendee = %attendee, "attendee registered");
            }
            ScheduleChange::AttendeeCancelled { event, attendee } => {
                info!(event_id = %event, attendee = %attendee, "attendee cancelled");
            }
            ScheduleChange::RoomUpdated { room, stranded } => {
                if stranded.is_empty() {
                    info!(room = %room, "room updated");
                } else {
                    warn!(room = %room, stranded = ?stranded, "room updated, events no longer fit");
                }
            }
        }
    }
}
