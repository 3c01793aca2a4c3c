//! `Dragonfly` (Redis-compatible) document storage for the schedule.
//!
//! Rooms and events are stored as JSON documents, one key each, with a
//! set per entity kind indexing which documents exist. Every key carries
//! a configurable prefix so several conferences can share an instance.
//!
//! # Key Patterns
//!
//! | Pattern | Type | Description |
//! |---------|------|-------------|
//! | `{prefix}:room:{number}` | JSON | Room document |
//! | `{prefix}:rooms` | Set | Stored room numbers |
//! | `{prefix}:event:{id}` | JSON | Event document with roster |
//! | `{prefix}:events` | Set | Stored event ids |

use conclave_types::{EventId, RoomNumber};
use fred::prelude::*;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::DbError;

/// Connection handle to a `Dragonfly` (Redis-compatible) instance.
///
/// Wraps a [`fred::prelude::Client`] and provides typed operations for the
/// schedule's key patterns.
#[derive(Clone)]
pub struct DragonflyPool {
    client: Client,
    prefix: String,
}

impl DragonflyPool {
    /// Connect to `Dragonfly` at the given URL, namespacing keys under
    /// `prefix`.
    ///
    /// The URL should follow the Redis URL scheme:
    /// `redis://host:port` or `redis://host:port/db`
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidUrl`] if the URL cannot be parsed.
    /// Returns [`DbError::Dragonfly`] if the connection fails.
    pub async fn connect(url: &str, prefix: &str) -> Result<Self, DbError> {
        let config = Config::from_url(url)
            .map_err(|e| DbError::InvalidUrl(e.to_string()))?;

        let client = Builder::from_config(config).build()?;
        client.init().await?;

        tracing::info!(prefix, "Connected to Dragonfly");
        Ok(Self {
            client,
            prefix: prefix.to_owned(),
        })
    }

    /// The key prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    // =========================================================================
    // Generic JSON get/set/delete
    // =========================================================================

    /// Serialize `value` as JSON and store it at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Serialization`] if serialization fails.
    /// Returns [`DbError::Dragonfly`] if the write fails.
    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), DbError> {
        let json = serde_json::to_string(value)?;
        let _: () = self.client.set(key, json.as_str(), None, None, false).await?;
        Ok(())
    }

    /// Read the value at `key` and deserialize from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::KeyNotFound`] if the key does not exist.
    /// Returns [`DbError::Serialization`] if deserialization fails.
    /// Returns [`DbError::Dragonfly`] if the read fails.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<T, DbError> {
        let value: Option<String> = self.client.get(key).await?;
        value.map_or_else(
            || Err(DbError::KeyNotFound(key.to_owned())),
            |s| Ok(serde_json::from_str(&s)?),
        )
    }

    /// Delete a key from `Dragonfly`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Dragonfly`] if the delete fails.
    pub async fn delete(&self, key: &str) -> Result<(), DbError> {
        let _: u32 = self.client.del(key).await?;
        Ok(())
    }

    // =========================================================================
    // Rooms -- {prefix}:room:{number}, {prefix}:rooms
    // =========================================================================

    fn room_key(&self, number: RoomNumber) -> String {
        format!("{}:room:{number}", self.prefix)
    }

    fn rooms_index(&self) -> String {
        format!("{}:rooms", self.prefix)
    }

    /// Store a room document and index it.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if serialization or write fails.
    pub async fn put_room<T: Serialize>(&self, number: RoomNumber, room: &T) -> Result<(), DbError> {
        self.set_json(&self.room_key(number), room).await?;
        let _: u32 = self
            .client
            .sadd(self.rooms_index().as_str(), number.to_string().as_str())
            .await?;
        Ok(())
    }

    /// Read a room document.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if not found, deserialization, or read fails.
    pub async fn get_room<T: DeserializeOwned>(&self, number: RoomNumber) -> Result<T, DbError> {
        self.get_json(&self.room_key(number)).await
    }

    /// Every indexed room number.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::CorruptIndex`] if an index member is not a number.
    /// Returns [`DbError::Dragonfly`] if the read fails.
    pub async fn room_numbers(&self) -> Result<Vec<RoomNumber>, DbError> {
        let index = self.rooms_index();
        let members: Vec<String> = self.client.smembers(index.as_str()).await?;
        let mut numbers = Vec::with_capacity(members.len());
        for m in &members {
            let n = m
                .parse::<u32>()
                .map_err(|source| DbError::CorruptIndex {
                    index: index.clone(),
                    member: m.clone(),
                    source,
                })?;
            numbers.push(RoomNumber::new(n));
        }
        Ok(numbers)
    }

    /// Every stored room document.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if any read or deserialization fails.
    pub async fn load_rooms<T: DeserializeOwned>(&self) -> Result<Vec<T>, DbError> {
        let mut rooms = Vec::new();
        for number in self.room_numbers().await? {
            rooms.push(self.get_room(number).await?);
        }
        Ok(rooms)
    }

    // =========================================================================
    // Events -- {prefix}:event:{id}, {prefix}:events
    // =========================================================================

    fn event_key(&self, id: EventId) -> String {
        format!("{}:event:{id}", self.prefix)
    }

    fn events_index(&self) -> String {
        format!("{}:events", self.prefix)
    }

    /// Store an event document and index it.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if serialization or write fails.
    pub async fn put_event<T: Serialize>(&self, id: EventId, event: &T) -> Result<(), DbError> {
        self.set_json(&self.event_key(id), event).await?;
        let _: u32 = self
            .client
            .sadd(self.events_index().as_str(), id.to_string().as_str())
            .await?;
        Ok(())
    }

    /// Read an event document.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if not found, deserialization, or read fails.
    pub async fn get_event<T: DeserializeOwned>(&self, id: EventId) -> Result<T, DbError> {
        self.get_json(&self.event_key(id)).await
    }

    /// Delete an event document and drop it from the index.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Dragonfly`] if the delete fails.
    pub async fn delete_event(&self, id: EventId) -> Result<(), DbError> {
        self.delete(&self.event_key(id)).await?;
        let _: u32 = self
            .client
            .srem(self.events_index().as_str(), id.to_string().as_str())
            .await?;
        Ok(())
    }

    /// Every indexed event id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::CorruptIndex`] if an index member is not a number.
    /// Returns [`DbError::Dragonfly`] if the read fails.
    pub async fn event_ids(&self) -> Result<Vec<EventId>, DbError> {
        let index = self.events_index();
        let members: Vec<String> = self.client.smembers(index.as_str()).await?;
        let mut ids = Vec::with_capacity(members.len());
        for m in &members {
            let id = m
                .parse::<u64>()
                .map_err(|source| DbError::CorruptIndex {
                    index: index.clone(),
                    member: m.clone(),
                    source,
                })?;
            ids.push(EventId::new(id));
        }
        Ok(ids)
    }

    /// Every stored event document.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if any read or deserialization fails.
    pub async fn load_events<T: DeserializeOwned>(&self) -> Result<Vec<T>, DbError> {
        let mut events = Vec::new();
        for id in self.event_ids().await? {
            events.push(self.get_event(id).await?);
        }
        Ok(events)
    }

    /// Flush all keys from the `Dragonfly` instance.
    ///
    /// **WARNING:** This deletes all data, not only this prefix. Only use
    /// for testing.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Dragonfly`] if the flush fails.
    pub async fn flush_all(&self) -> Result<(), DbError> {
        let _: () = self.client.flushall(false).await?;
        Ok(())
    }
}
