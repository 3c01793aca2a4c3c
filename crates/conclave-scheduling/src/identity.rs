//! The identity seam between the engine and the user directory.
//!
//! The engine never owns user data. Registration asks an
//! [`IdentityOracle`] whether an attendee is VIP; the directory crate
//! provides the production implementation.

use conclave_types::{UserId, UserRole};

/// Role-independent user lookups consumed by the engine.
pub trait IdentityOracle {
    /// Whether the user is a VIP attendee. Unknown users are not VIP.
    fn is_vip(&self, user: UserId) -> bool;

    /// Display name of the user, if known.
    fn display_name(&self, user: UserId) -> Option<String>;

    /// Role of the user, if known.
    fn role(&self, user: UserId) -> Option<UserRole>;
}
