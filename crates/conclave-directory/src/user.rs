//! User records as a tagged union over role.

use conclave_types::{UserId, UserRole};
use serde::{Deserialize, Serialize};

/// Role-specific data attached to a user.
///
/// Only attendees carry a VIP flag; organizers and speakers have no
/// role-specific fields the scheduler cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum UserKind {
    /// Registers for events.
    Attendee {
        /// Admitted to VIP-only events.
        #[serde(default)]
        vip: bool,
    },
    /// Manages rooms and events.
    Organizer,
    /// Hosts events.
    Speaker,
}

impl UserKind {
    /// The role this variant represents.
    pub const fn role(self) -> UserRole {
        match self {
            Self::Attendee { .. } => UserRole::Attendee,
            Self::Organizer => UserRole::Organizer,
            Self::Speaker => UserRole::Speaker,
        }
    }

    /// Whether this is a VIP attendee.
    pub const fn is_vip(self) -> bool {
        matches!(self, Self::Attendee { vip: true })
    }
}

/// A registered conference user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique id.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Role and role-specific fields.
    #[serde(flatten)]
    pub kind: UserKind,
}

impl User {
    /// Create a user record.
    pub const fn new(id: UserId, name: String, kind: UserKind) -> Self {
        Self { id, name, kind }
    }

    /// The user's role.
    pub const fn role(&self) -> UserRole {
        self.kind.role()
    }
}
