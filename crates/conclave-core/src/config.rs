//! Configuration loading and typed config structures for Conclave.
//!
//! The canonical configuration lives in `conclave-config.yaml` in the
//! working directory. Every field has a default, so an empty file (or no
//! file at all) yields a usable in-memory conference with no seed data.

use std::collections::BTreeSet;
use std::path::Path;

use conclave_directory::User;
use conclave_types::{EventProposal, Room, RoomNumber, UserId};
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// Two seed rooms share a number.
    #[error("duplicate seed room number: {0}")]
    DuplicateRoom(RoomNumber),

    /// Two seed users share an id.
    #[error("duplicate seed user id: {0}")]
    DuplicateUser(UserId),

    /// The conference day window is empty.
    #[error("day_start_hour ({start}) must be before day_end_hour ({end})")]
    InvalidDayWindow {
        /// Configured first hour.
        start: u32,
        /// Configured closing hour.
        end: u32,
    },

    /// A seed event falls outside the conference day.
    #[error("seed event {name:?} does not fit within the conference day")]
    EventOutsideDay {
        /// Name of the offending event.
        name: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level Conclave configuration.
///
/// Mirrors the structure of `conclave-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConferenceConfig {
    /// Conference name and day window.
    #[serde(default)]
    pub conference: ConferenceSection,

    /// Rooms registered at first start.
    #[serde(default)]
    pub rooms: Vec<SeedRoom>,

    /// Users loaded into the directory.
    #[serde(default)]
    pub users: Vec<User>,

    /// Events proposed at first start, with their initial attendees.
    #[serde(default)]
    pub events: Vec<SeedEvent>,

    /// Persistence backend selection.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ConferenceConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `DRAGONFLY_URL` overrides `storage.dragonfly_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    ///
    /// # Errors
    ///
    /// Same as [`from_file`](Self::from_file) when the file exists.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            return Self::from_file(path);
        }
        let mut config = Self::default();
        config.storage.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes as unit, not as an empty map.
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.storage.apply_env_overrides();
        Ok(config)
    }

    /// Check cross-field constraints serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns the first problem found: an empty day window, a duplicate
    /// seed room or user, or a seed event outside the day window.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let day = &self.conference;
        if day.day_start_hour >= day.day_end_hour {
            return Err(ConfigError::InvalidDayWindow {
                start: day.day_start_hour,
                end: day.day_end_hour,
            });
        }

        let mut rooms = BTreeSet::new();
        for room in &self.rooms {
            if !rooms.insert(room.number) {
                return Err(ConfigError::DuplicateRoom(room.number));
            }
        }

        let mut users = BTreeSet::new();
        for user in &self.users {
            if !users.insert(user.id) {
                return Err(ConfigError::DuplicateUser(user.id));
            }
        }

        for seed in &self.events {
            if !day.contains(seed.proposal.start_time, seed.proposal.duration) {
                return Err(ConfigError::EventOutsideDay {
                    name: seed.proposal.name.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Conference identity and the hours events may be seeded in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConferenceSection {
    /// Display name.
    #[serde(default = "default_conference_name")]
    pub name: String,

    /// First hour of the day.
    #[serde(default = "default_day_start_hour")]
    pub day_start_hour: u32,

    /// Hour the day closes (exclusive).
    #[serde(default = "default_day_end_hour")]
    pub day_end_hour: u32,
}

impl ConferenceSection {
    /// Whether `[start, start + duration)` lies inside the day window.
    pub fn contains(&self, start: u32, duration: u32) -> bool {
        start >= self.day_start_hour
            && start
                .checked_add(duration)
                .is_some_and(|end| end <= self.day_end_hour)
    }
}

impl Default for ConferenceSection {
    fn default() -> Self {
        Self {
            name: default_conference_name(),
            day_start_hour: default_day_start_hour(),
            day_end_hour: default_day_end_hour(),
        }
    }
}

/// A room to register at first start.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeedRoom {
    /// Room number.
    pub number: RoomNumber,
    /// Seat capacity.
    pub capacity: u32,
    /// Whether the room has a projector.
    #[serde(default)]
    pub has_projector: bool,
    /// Whether the room has tables.
    #[serde(default)]
    pub has_tables: bool,
}

impl SeedRoom {
    /// Convert into a [`Room`].
    pub const fn to_room(&self) -> Room {
        Room::new(self.number, self.capacity, self.has_projector, self.has_tables)
    }
}

/// An event to propose at first start.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeedEvent {
    /// Placement of the event.
    #[serde(flatten)]
    pub proposal: EventProposal,

    /// Attendees to register once the event is placed.
    #[serde(default)]
    pub attendees: Vec<UserId>,
}

/// Which backend persists the schedule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Process memory only; nothing survives a restart.
    #[default]
    Memory,
    /// Dragonfly (Redis-compatible) document store.
    Dragonfly,
}

/// Persistence settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageConfig {
    /// Selected backend.
    #[serde(default)]
    pub backend: StorageBackend,

    /// Dragonfly connection URL.
    #[serde(default = "default_dragonfly_url")]
    pub dragonfly_url: String,

    /// Prefix for every key written to Dragonfly.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl StorageConfig {
    /// Apply environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from `lookup`, which maps a variable name to its
    /// value.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("DRAGONFLY_URL") {
            self.dragonfly_url = val;
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            dragonfly_url: default_dragonfly_url(),
            key_prefix: default_key_prefix(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default `tracing` filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

fn default_conference_name() -> String {
    "Conclave".to_owned()
}

const fn default_day_start_hour() -> u32 {
    9
}

const fn default_day_end_hour() -> u32 {
    17
}

fn default_dragonfly_url() -> String {
    "redis://localhost:6379".to_owned()
}

fn default_key_prefix() -> String {
    "conclave".to_owned()
}

fn default_log_level() -> String {
    "info".to_owned()
}
