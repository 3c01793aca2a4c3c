//! First-start seeding of rooms and events from configuration.
//!
//! Seeding goes through the live conference API, so every seed is
//! validated, written through, and announced like any other mutation.
//! A seed the engine rejects is logged and skipped; it never aborts
//! startup.

use conclave_core::{Conference, ConferenceConfig, ConferenceError, ScheduleGateway};
use tracing::{info, warn};

/// Counts from one seeding pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    /// Rooms registered.
    pub rooms: usize,
    /// Events placed.
    pub events: usize,
    /// Registrations made.
    pub registrations: usize,
    /// Seeds rejected by the engine.
    pub rejected: usize,
}

/// Record the outcome of one seed operation.
///
/// Persistence failures still count as seeded: the commit stands.
fn tally<T>(result: &Result<T, ConferenceError>, counter: &mut usize, rejected: &mut usize, what: &str) {
    match result {
        Ok(_) | Err(ConferenceError::Persistence(_)) => *counter = counter.saturating_add(1),
        Err(e @ ConferenceError::Schedule(_)) => {
            warn!(seed = what, error = %e, "seed rejected");
            *rejected = rejected.saturating_add(1);
        }
    }
}

/// Seed `conference` from `config`.
pub async fn seed<G: ScheduleGateway>(conference: &Conference<G>, config: &ConferenceConfig) -> SeedSummary {
    let mut summary = SeedSummary::default();

    for room in &config.rooms {
        let result = conference.add_room(room.to_room()).await;
        tally(&result, &mut summary.rooms, &mut summary.rejected, "room");
    }

    for seed in &config.events {
        // Seeding is the only writer at startup, so the next id is the one
        // the event takes even if its write-through fails.
        let expected = conference.next_event_id().await;
        let result = conference.schedule_event(seed.proposal.clone()).await;
        tally(&result, &mut summary.events, &mut summary.rejected, "event");
        let id = match result {
            Ok(id) => id,
            Err(ConferenceError::Persistence(_)) => expected,
            Err(ConferenceError::Schedule(_)) => continue,
        };

        for attendee in &seed.attendees {
            let result = conference.register(*attendee, id).await;
            tally(&result, &mut summary.registrations, &mut summary.rejected, "registration");
        }
    }

    info!(
        rooms = summary.rooms,
        events = summary.events,
        registrations = summary.registrations,
        rejected = summary.rejected,
        "seeded from config"
    );
    summary
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use conclave_core::{GatewayError, MemoryGateway, StoredSchedule, WriteOp};
    use conclave_directory::{UserDirectory, UserKind};
    use conclave_types::{EventId, UserId};

    use super::*;

    const CONFIG: &str = r"
rooms:
  - number: 1
    capacity: 10
    has_projector: true
  - number: 2
    capacity: 4

events:
  - name: Keynote
    room: 1
    start_time: 9
    duration: 2
    capacity: 5
    hosts: [5]
    needs_projector: true
    attendees: [0, 1]
  - name: Clash
    room: 1
    start_time: 10
    duration: 1
    capacity: 3
  - name: Gala
    room: 2
    start_time: 15
    duration: 2
    capacity: 4
    vip: true
    attendees: [0, 1]
";

    #[tokio::test]
    async fn seeds_valid_entries_and_skips_the_rest() {
        let config = ConferenceConfig::parse(CONFIG).unwrap();
        let mut dir = UserDirectory::new();
        dir.add_user(UserKind::Attendee { vip: true }, "Vera").unwrap();
        dir.add_user(UserKind::Attendee { vip: false }, "Ann").unwrap();
        let conference = Conference::new(MemoryGateway::new(), Arc::new(dir));

        let summary = seed(&conference, &config).await;
        assert_eq!(summary.rooms, 2);
        assert_eq!(summary.events, 2);
        assert_eq!(summary.registrations, 3);
        // The clashing event and Ann's VIP registration.
        assert_eq!(summary.rejected, 2);

        let stored = conference.gateway().contents().await;
        assert_eq!(stored.events.len(), 2);
    }

    struct Unreachable;

    impl ScheduleGateway for Unreachable {
        async fn load(&self) -> Result<StoredSchedule, GatewayError> {
            Ok(StoredSchedule::default())
        }

        async fn apply(&self, _op: &WriteOp) -> Result<(), GatewayError> {
            Err(GatewayError::Backend("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn registrations_seeded_when_store_is_down() {
        let config = ConferenceConfig::parse(CONFIG).unwrap();
        let mut dir = UserDirectory::new();
        dir.add_user(UserKind::Attendee { vip: true }, "Vera").unwrap();
        dir.add_user(UserKind::Attendee { vip: false }, "Ann").unwrap();
        let conference = Conference::new(Unreachable, Arc::new(dir));

        let summary = seed(&conference, &config).await;
        assert_eq!(summary.events, 2);
        assert_eq!(summary.registrations, 3);
        assert_eq!(summary.rejected, 2);

        let keynote = conference.event(EventId::new(0)).await.unwrap();
        assert_eq!(keynote.attendees, vec![UserId::new(0), UserId::new(1)]);
        let gala = conference.event(EventId::new(1)).await.unwrap();
        assert_eq!(gala.attendees, vec![UserId::new(0)]);
    }
}
