//! End-to-end scenarios and schedule-wide properties for the engine.
//!
//! The scenario tests walk the canonical keynote/workshop/panel sequence.
//! The property tests drive a long pseudo-random stream of operations
//! through a [`Schedule`] and check every invariant after each step.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
    clippy::missing_panics_doc,
    clippy::too_many_lines
)]

use std::collections::BTreeSet;

use conclave_scheduling::{IdentityOracle, Schedule, ScheduleError};
use conclave_types::{EventId, EventProposal, Room, RoomNumber, UserId, UserRole};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Identity oracle backed by a fixed VIP set.
struct Vips(BTreeSet<UserId>);

impl IdentityOracle for Vips {
    fn is_vip(&self, user: UserId) -> bool {
        self.0.contains(&user)
    }

    fn display_name(&self, user: UserId) -> Option<String> {
        Some(format!("user {user}"))
    }

    fn role(&self, _user: UserId) -> Option<UserRole> {
        Some(UserRole::Attendee)
    }
}

#[allow(clippy::too_many_arguments, clippy::fn_params_excessive_bools)]
fn proposal(
    name: &str,
    room: u32,
    start: u32,
    duration: u32,
    capacity: u32,
    vip: bool,
    hosts: &[u32],
    needs_projector: bool,
) -> EventProposal {
    EventProposal {
        name: name.to_owned(),
        room: RoomNumber::new(room),
        start_time: start,
        duration,
        capacity,
        vip,
        hosts: hosts.iter().copied().map(UserId::new).collect(),
        needs_projector,
        needs_tables: false,
    }
}

/// Rooms 1 and 2 from the scenarios plus the keynote in event slot 0.
fn conference() -> (Schedule, EventId) {
    let mut schedule = Schedule::new();
    schedule
        .add_room(Room::new(RoomNumber::new(1), 10, true, false))
        .unwrap();
    schedule
        .add_room(Room::new(RoomNumber::new(2), 10, true, false))
        .unwrap();
    let keynote = schedule
        .add_event(proposal("Keynote", 1, 9, 2, 5, false, &[5], true))
        .unwrap();
    (schedule, keynote)
}

// =========================================================================
// Scenarios
// =========================================================================

#[test]
fn keynote_receives_first_id() {
    let (schedule, keynote) = conference();
    assert_eq!(keynote, EventId::new(0));
    assert_eq!(schedule.events().len(), 1);
}

#[test]
fn overlapping_workshop_in_same_room_rejected() {
    let (mut schedule, keynote) = conference();
    let result = schedule.add_event(proposal("Workshop", 1, 10, 1, 3, false, &[6], false));
    assert_eq!(
        result,
        Err(ScheduleError::RoomConflict {
            room: RoomNumber::new(1),
            conflicting: keynote,
        })
    );
    assert_eq!(schedule.events().len(), 1);
    assert_eq!(schedule.events().next_id(), EventId::new(1));
}

#[test]
fn busy_host_rejected_across_rooms() {
    let (mut schedule, keynote) = conference();
    let result = schedule.add_event(proposal("Panel", 2, 10, 1, 2, false, &[5], true));
    assert_eq!(
        result,
        Err(ScheduleError::HostConflict {
            host: UserId::new(5),
            conflicting: keynote,
        })
    );
}

#[test]
fn non_vip_cannot_join_vip_event() {
    let (mut schedule, _) = conference();
    let vips = Vips(BTreeSet::from([UserId::new(50)]));
    let gala = schedule
        .add_event(proposal("Gala", 2, 18, 3, 10, true, &[7], false))
        .unwrap();

    let result = schedule.add_attendee(UserId::new(1), gala, &vips);
    assert!(matches!(result, Err(ScheduleError::VipOnly { .. })));
    assert!(schedule.event(gala).unwrap().attendees.is_empty());
}

#[test]
fn attendee_cannot_double_book() {
    let (mut schedule, keynote) = conference();
    let vips = Vips(BTreeSet::new());
    let later = schedule
        .add_event(proposal("Breakout", 2, 10, 2, 10, false, &[8], false))
        .unwrap();
    let x = UserId::new(1);

    schedule.add_attendee(x, keynote, &vips).unwrap();
    assert_eq!(
        schedule.add_attendee(x, later, &vips),
        Err(ScheduleError::AttendeeBusy {
            attendee: x,
            conflicting: keynote,
        })
    );
    assert_eq!(schedule.event(later).unwrap().available_seats(), 10);
}

#[test]
fn capacity_cannot_drop_below_attendance() {
    let (mut schedule, keynote) = conference();
    let vips = Vips(BTreeSet::new());
    for attendee in 1..=3 {
        schedule
            .add_attendee(UserId::new(attendee), keynote, &vips)
            .unwrap();
    }
    assert_eq!(
        schedule.change_capacity(keynote, 2),
        Err(ScheduleError::CapacityBelowAttendance {
            capacity: 2,
            attendees: 3,
        })
    );
    assert_eq!(schedule.event(keynote).unwrap().capacity, 5);
}

#[test]
fn unregistering_frees_the_slot_for_another_event() {
    let (mut schedule, keynote) = conference();
    let vips = Vips(BTreeSet::new());
    let later = schedule
        .add_event(proposal("Breakout", 2, 10, 2, 10, false, &[8], false))
        .unwrap();
    let x = UserId::new(1);
    schedule.add_attendee(x, keynote, &vips).unwrap();
    assert_eq!(schedule.remove_attendee(x, keynote), Ok(true));
    assert!(schedule.add_attendee(x, later, &vips).is_ok());
}

#[test]
fn cancelled_event_returns_its_roster() {
    let (mut schedule, keynote) = conference();
    let vips = Vips(BTreeSet::new());
    schedule.add_attendee(UserId::new(1), keynote, &vips).unwrap();
    let removed = schedule.remove_event(keynote).unwrap();
    assert_eq!(removed.attendees, vec![UserId::new(1)]);
    assert!(schedule.event(keynote).is_none());

    // The room is free again, but the old id is never handed out.
    let workshop = schedule
        .add_event(proposal("Workshop", 1, 10, 1, 3, false, &[6], false))
        .unwrap();
    assert_eq!(workshop, EventId::new(1));
}

#[test]
fn listing_excludes_attendee_registrations() {
    let (mut schedule, keynote) = conference();
    let vips = Vips(BTreeSet::new());
    schedule
        .add_event(proposal("Breakout", 2, 12, 1, 1, false, &[8], false))
        .unwrap();
    schedule.add_attendee(UserId::new(1), keynote, &vips).unwrap();

    let for_attendee = schedule.events().list_available(Some(UserId::new(1)));
    assert_eq!(for_attendee.len(), 1);
    assert!(for_attendee[0].1.starts_with("Breakout: 12:00 - 13:00"));

    let everyone = schedule.events().list_available(None);
    assert_eq!(everyone.len(), 2);
}

// =========================================================================
// Properties
// =========================================================================

fn overlaps(a: &conclave_types::Event, b: &conclave_types::Event) -> bool {
    a.slot().overlaps(b.slot())
}

fn assert_invariants(schedule: &Schedule, vips: &Vips) {
    let events: Vec<_> = schedule.events().iter().collect();
    for (i, a) in events.iter().enumerate() {
        let room = schedule.room(a.room).expect("event room must exist");
        // seats within event, event within room
        assert!(a.attendee_count() <= a.capacity);
        assert!(a.capacity <= room.capacity);
        // amenities
        assert!(!a.needs_projector || room.has_projector);
        assert!(!a.needs_tables || room.has_tables);
        // vip gating
        if a.vip {
            assert!(a.attendees.iter().all(|u| vips.is_vip(*u)));
        }
        for b in &events[i + 1..] {
            if !overlaps(a, b) {
                continue;
            }
            assert_ne!(a.room, b.room, "{a} and {b} share a room");
            assert!(!a.shares_host_with(b), "{a} and {b} share a host");
            assert!(
                a.attendees.iter().all(|u| !b.has_attendee(*u)),
                "{a} and {b} share an attendee"
            );
        }
    }
}

#[test]
fn invariants_hold_under_random_operations() {
    let vips = Vips((0..4).map(UserId::new).collect());
    let mut rng = SmallRng::seed_from_u64(42);
    let mut schedule = Schedule::new();
    for number in 1..=4 {
        schedule
            .add_room(Room::new(
                RoomNumber::new(number),
                number * 3,
                number % 2 == 0,
                number > 2,
            ))
            .unwrap();
    }

    let mut last_id: Option<EventId> = None;
    let mut issued = BTreeSet::new();

    for step in 0..2_000 {
        let ids: Vec<EventId> = schedule.events().iter().map(|e| e.id).collect();
        let pick = |rng: &mut SmallRng| -> EventId {
            if ids.is_empty() {
                EventId::new(0)
            } else {
                ids[rng.random_range(0..ids.len())]
            }
        };

        match rng.random_range(0..10) {
            0..=2 => {
                let host_count = rng.random_range(0..3);
                let hosts: Vec<u32> = (0..host_count).map(|_| 100 + rng.random_range(0..6)).collect();
                let p = proposal(
                    &format!("event-{step}"),
                    1 + rng.random_range(0..5),
                    8 + rng.random_range(0..10),
                    rng.random_range(0..4),
                    rng.random_range(0..13),
                    rng.random_bool(0.5) && rng.random_bool(0.5),
                    &hosts,
                    rng.random_bool(0.5),
                );
                let before = schedule.events().next_id();
                match schedule.add_event(p) {
                    Ok(id) => {
                        // ids strictly increase and are never reused
                        assert_eq!(id, before);
                        if let Some(prev) = last_id {
                            assert!(id > prev);
                        }
                        assert!(issued.insert(id));
                        last_id = Some(id);
                    }
                    Err(_) => assert_eq!(schedule.events().next_id(), before),
                }
            }
            3..=5 => {
                let id = pick(&mut rng);
                let _ = schedule.add_attendee(UserId::new(rng.random_range(0..12)), id, &vips);
            }
            6 => {
                let id = pick(&mut rng);
                let _ = schedule.remove_attendee(UserId::new(rng.random_range(0..12)), id);
            }
            7 => {
                let id = pick(&mut rng);
                let _ = schedule.reschedule(id, 8 + rng.random_range(0..10));
            }
            8 => {
                let id = pick(&mut rng);
                let _ = schedule.change_capacity(id, rng.random_range(0..13));
            }
            _ => {
                let id = pick(&mut rng);
                let snapshot = schedule.clone();
                // removal never introduces a violation
                let _ = schedule.remove_event(id);
                assert!(schedule.events().len() <= snapshot.events().len());
            }
        }

        assert_invariants(&schedule, &vips);
    }

    assert!(!issued.is_empty());
}

#[test]
fn rejected_mutations_leave_schedule_unchanged() {
    let (mut schedule, keynote) = conference();
    let before = serde_json::to_value(&schedule).unwrap();

    assert!(schedule.reschedule(keynote, u32::MAX).is_err());
    assert!(schedule.change_duration(keynote, 0).is_err());
    assert!(schedule.move_to_room(keynote, RoomNumber::new(9)).is_err());
    assert!(schedule.change_capacity(keynote, 11).is_err());
    assert!(schedule.set_needs_tables(keynote, true).is_err());
    assert!(schedule.add_host(keynote, UserId::new(5)).is_err());

    assert_eq!(serde_json::to_value(&schedule).unwrap(), before);
}
