//! Integration tests for the `conclave-db` data layer.
//!
//! These tests require a live Dragonfly instance. Run with:
//!
//! ```bash
//! docker run -d -p 6379:6379 docker.dragonflydb.io/dragonflydb/dragonfly
//! cargo test -p conclave-db -- --ignored
//! ```
//!
//! All tests are marked `#[ignore]` so they are skipped during normal
//! `cargo test` runs.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::missing_panics_doc)]

use conclave_db::{DbError, DragonflyPool};
use conclave_types::{EventId, RoomNumber};
use serde::{Deserialize, Serialize};

/// Dragonfly connection URL for the local Docker instance.
const DRAGONFLY_URL: &str = "redis://localhost:6379";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Doc {
    name: String,
    seats: u32,
}

async fn pool(prefix: &str) -> DragonflyPool {
    let pool = DragonflyPool::connect(DRAGONFLY_URL, prefix)
        .await
        .expect("Failed to connect to Dragonfly");
    pool.flush_all().await.expect("Failed to flush Dragonfly");
    pool
}

#[tokio::test]
#[ignore = "requires live Dragonfly instance"]
async fn room_documents_are_indexed() {
    let pool = pool("test-rooms").await;
    let doc = Doc {
        name: "Hall A".to_owned(),
        seats: 40,
    };
    pool.put_room(RoomNumber::new(1), &doc).await.unwrap();
    pool.put_room(RoomNumber::new(1), &doc).await.unwrap();

    assert_eq!(pool.room_numbers().await.unwrap(), vec![RoomNumber::new(1)]);
    let loaded: Vec<Doc> = pool.load_rooms().await.unwrap();
    assert_eq!(loaded, vec![doc]);
}

#[tokio::test]
#[ignore = "requires live Dragonfly instance"]
async fn deleted_events_leave_the_index() {
    let pool = pool("test-events").await;
    for id in 0..3 {
        let doc = Doc {
            name: format!("talk {id}"),
            seats: 5,
        };
        pool.put_event(EventId::new(id), &doc).await.unwrap();
    }
    pool.delete_event(EventId::new(1)).await.unwrap();

    let mut ids = pool.event_ids().await.unwrap();
    ids.sort();
    assert_eq!(ids, vec![EventId::new(0), EventId::new(2)]);

    let missing = pool.get_event::<Doc>(EventId::new(1)).await;
    assert!(matches!(missing, Err(DbError::KeyNotFound(_))));
}

#[tokio::test]
#[ignore = "requires live Dragonfly instance"]
async fn prefixes_keep_keys_apart() {
    let pool = pool("conf-a").await;
    pool.put_event(EventId::new(0), &Doc { name: "a".to_owned(), seats: 1 })
        .await
        .unwrap();
    assert!(pool.prefix() == "conf-a");

    let other = DragonflyPool::connect(DRAGONFLY_URL, "conf-b").await.unwrap();
    assert!(other.event_ids().await.unwrap().is_empty());
}
