//! The user directory and its [`IdentityOracle`] implementation.

use std::collections::BTreeMap;

use conclave_scheduling::IdentityOracle;
use conclave_types::{UserId, UserRole};
use tracing::debug;

use crate::error::DirectoryError;
use crate::user::{User, UserKind};

/// Every known user, keyed by id.
///
/// Ids handed out by [`add_user`](Self::add_user) are dense from `0` and
/// always above any id seen so far, including seeded ones.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: BTreeMap<UserId, User>,
    next_id: u32,
}

impl UserDirectory {
    /// Create an empty directory.
    pub const fn new() -> Self {
        Self {
            users: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Number of registered users.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Register a new user under the next free id.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::IdSpaceExhausted`] once `u32::MAX` ids are
    /// in use.
    pub fn add_user(&mut self, kind: UserKind, name: impl Into<String>) -> Result<UserId, DirectoryError> {
        let id = UserId::new(self.next_id);
        self.insert(User::new(id, name.into(), kind))?;
        Ok(id)
    }

    /// Register a user with an explicit id, as loaded from config or storage.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::DuplicateUser`] if the id is taken.
    pub fn insert(&mut self, user: User) -> Result<(), DirectoryError> {
        if self.users.contains_key(&user.id) {
            return Err(DirectoryError::DuplicateUser(user.id));
        }
        let following = user
            .id
            .into_inner()
            .checked_add(1)
            .ok_or(DirectoryError::IdSpaceExhausted)?;
        self.next_id = self.next_id.max(following);
        debug!(user_id = %user.id, role = %user.role(), "user registered");
        self.users.insert(user.id, user);
        Ok(())
    }

    /// Look up a user.
    pub fn get(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    /// Display name of a user.
    pub fn name_of(&self, id: UserId) -> Option<&str> {
        self.get(id).map(|u| u.name.as_str())
    }

    /// Role of a user.
    pub fn role_of(&self, id: UserId) -> Option<UserRole> {
        self.get(id).map(User::role)
    }

    /// Names of every user with the given role.
    pub fn with_role(&self, role: UserRole) -> BTreeMap<UserId, String> {
        self.users
            .values()
            .filter(|u| u.role() == role)
            .map(|u| (u.id, u.name.clone()))
            .collect()
    }

    /// Names of every attendee.
    pub fn attendees(&self) -> BTreeMap<UserId, String> {
        self.with_role(UserRole::Attendee)
    }

    /// Names of every speaker.
    pub fn speakers(&self) -> BTreeMap<UserId, String> {
        self.with_role(UserRole::Speaker)
    }

    /// Names of every organizer.
    pub fn organizers(&self) -> BTreeMap<UserId, String> {
        self.with_role(UserRole::Organizer)
    }

    /// Names for the given ids. Unknown ids are skipped.
    pub fn names_for<'a>(&self, ids: impl IntoIterator<Item = &'a UserId>) -> BTreeMap<UserId, String> {
        ids.into_iter()
            .filter_map(|id| self.get(*id).map(|u| (u.id, u.name.clone())))
            .collect()
    }

    /// Iterate users in id order.
    pub fn iter(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }
}

impl IdentityOracle for UserDirectory {
    fn is_vip(&self, user: UserId) -> bool {
        self.get(user).is_some_and(|u| u.kind.is_vip())
    }

    fn display_name(&self, user: UserId) -> Option<String> {
        self.name_of(user).map(str::to_owned)
    }

    fn role(&self, user: UserId) -> Option<UserRole> {
        self.role_of(user)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_dense_from_zero() {
        let mut dir = UserDirectory::new();
        assert_eq!(dir.add_user(UserKind::Organizer, "Grace"), Ok(UserId::new(0)));
        assert_eq!(dir.add_user(UserKind::Speaker, "Alan"), Ok(UserId::new(1)));
        assert_eq!(dir.len(), 2);
    }

    #[test]
    fn add_user_skips_seeded_ids() {
        let mut dir = UserDirectory::new();
        dir.insert(User::new(UserId::new(7), "Ada".to_owned(), UserKind::Attendee { vip: true }))
            .unwrap();
        assert_eq!(dir.add_user(UserKind::Speaker, "Alan"), Ok(UserId::new(8)));
        assert_eq!(
            dir.insert(User::new(UserId::new(7), "Other".to_owned(), UserKind::Organizer)),
            Err(DirectoryError::DuplicateUser(UserId::new(7)))
        );
    }

    #[test]
    fn only_vip_attendees_are_vip() {
        let mut dir = UserDirectory::new();
        let vip = dir.add_user(UserKind::Attendee { vip: true }, "Ada").unwrap();
        let regular = dir.add_user(UserKind::Attendee { vip: false }, "Bob").unwrap();
        let speaker = dir.add_user(UserKind::Speaker, "Carol").unwrap();

        assert!(dir.is_vip(vip));
        assert!(!dir.is_vip(regular));
        assert!(!dir.is_vip(speaker));
        assert!(!dir.is_vip(UserId::new(99)));
        assert_eq!(IdentityOracle::role(&dir, speaker), Some(UserRole::Speaker));
        assert_eq!(dir.display_name(vip).as_deref(), Some("Ada"));
    }

    #[test]
    fn role_listings() {
        let mut dir = UserDirectory::new();
        let a = dir.add_user(UserKind::Attendee { vip: false }, "Ada").unwrap();
        let s = dir.add_user(UserKind::Speaker, "Sam").unwrap();
        let _ = dir.add_user(UserKind::Organizer, "Olga").unwrap();

        assert_eq!(dir.attendees().get(&a).map(String::as_str), Some("Ada"));
        assert_eq!(dir.speakers().len(), 1);
        assert_eq!(dir.organizers().len(), 1);

        let names = dir.names_for(&[a, s, UserId::new(42)]);
        assert_eq!(names.len(), 2);
    }
}
