//! Type-safe integer identifier wrappers.
//!
//! Rooms, events, and users are all addressed by small integers in the
//! scheduler. Wrapping each in its own newtype prevents a room number
//! from being passed where an event id is expected.

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around an unsigned integer with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident($inner:ty)
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub $inner);

        impl $name {
            /// Wrap a raw integer value.
            pub const fn new(value: $inner) -> Self {
                Self(value)
            }

            /// Return the inner integer value.
            pub const fn into_inner(self) -> $inner {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$inner> for $name {
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }

        impl From<$name> for $inner {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique, immutable number of a physical room. Never reused.
    RoomNumber(u32)
}

define_id! {
    /// Identifier of a scheduled event, assigned by the event store.
    ///
    /// Ids are handed out in strictly increasing order and only on a
    /// successful placement.
    EventId(u64)
}

define_id! {
    /// Identifier of a user (attendee, speaker, or organizer).
    UserId(u32)
}
