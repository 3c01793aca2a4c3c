//! User directory for the Conclave conference scheduler.
//!
//! Users are a tagged union over role: attendees carry a VIP flag,
//! organizers and speakers carry nothing extra. [`UserDirectory`]
//! implements [`IdentityOracle`](conclave_scheduling::IdentityOracle) so
//! the engine can gate VIP events without ever branching on role.

pub mod directory;
pub mod error;
pub mod user;

pub use directory::UserDirectory;
pub use error::DirectoryError;
pub use user::{User, UserKind};

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn user_parses_from_yaml() {
        let yaml = "id: 3\nname: Ada\nrole: attendee\nvip: true\n";
        let user: User = serde_yml::from_str(yaml).unwrap();
        assert_eq!(user.kind, UserKind::Attendee { vip: true });

        let speaker: User = serde_yml::from_str("id: 4\nname: Sam\nrole: speaker\n").unwrap();
        assert_eq!(speaker.kind, UserKind::Speaker);
    }
}
