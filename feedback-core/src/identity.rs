//! Identity directory.
//!
//! The tracker never embeds user records. It asks an [`IdentityDirectory`]
//! who a caller is, who reports to whom and where to send mail, so a real
//! identity provider can replace [`StaticDirectory`] without touching the
//! services.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::models::{Role, User, UserId};

pub trait IdentityDirectory: Send + Sync {
    /// Resolve a caller id to a user, `None` when unknown.
    fn resolve(&self, id: UserId) -> Option<User>;

    fn find_by_email(&self, email: &str) -> Option<User>;

    /// Users whose `manager_id` is `manager_id`, ordered by id.
    fn direct_reports(&self, manager_id: UserId) -> Vec<User>;

    fn managers(&self) -> Vec<User>;

    /// Every user, ordered by id.
    fn users(&self) -> Vec<User>;
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("failed to read user directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse user directory: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate user id {0}")]
    DuplicateId(UserId),

    #[error("duplicate email {0}")]
    DuplicateEmail(String),

    #[error("user {user} references unknown manager {manager}")]
    UnknownManager { user: UserId, manager: UserId },

    #[error("user {user} reports to {manager}, who is not a manager")]
    NotAManager { user: UserId, manager: UserId },

    #[error("manager {0} must not report to anyone")]
    ManagerWithManager(UserId),
}

/// An immutable, in-memory directory loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    users: BTreeMap<UserId, User>,
}

impl StaticDirectory {
    /// Build a directory, checking that ids and emails are unique, managers
    /// report to nobody and every employee's manager exists and is a manager.
    pub fn new(users: Vec<User>) -> Result<Self, DirectoryError> {
        let mut by_id = BTreeMap::new();
        let mut emails = HashSet::new();
        for user in users {
            if !emails.insert(user.email.to_lowercase()) {
                return Err(DirectoryError::DuplicateEmail(user.email));
            }
            if let Some(existing) = by_id.insert(user.id, user) {
                return Err(DirectoryError::DuplicateId(existing.id));
            }
        }

        for user in by_id.values() {
            match (user.role, user.manager_id) {
                (Role::Manager, Some(_)) => return Err(DirectoryError::ManagerWithManager(user.id)),
                (Role::Employee, Some(manager)) => match by_id.get(&manager) {
                    None => {
                        return Err(DirectoryError::UnknownManager {
                            user: user.id,
                            manager,
                        })
                    }
                    Some(found) if !found.is_manager() => {
                        return Err(DirectoryError::NotAManager {
                            user: user.id,
                            manager,
                        })
                    }
                    Some(_) => {}
                },
                _ => {}
            }
        }

        Ok(Self { users: by_id })
    }

    pub fn from_json(json: &str) -> Result<Self, DirectoryError> {
        Self::new(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DirectoryError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl IdentityDirectory for StaticDirectory {
    fn resolve(&self, id: UserId) -> Option<User> {
        self.users.get(&id).cloned()
    }

    fn find_by_email(&self, email: &str) -> Option<User> {
        self.users
            .values()
            .find(|user| user.email.eq_ignore_ascii_case(email.trim()))
            .cloned()
    }

    fn direct_reports(&self, manager_id: UserId) -> Vec<User> {
        self.users
            .values()
            .filter(|user| user.manager_id == Some(manager_id))
            .cloned()
            .collect()
    }

    fn managers(&self) -> Vec<User> {
        self.users
            .values()
            .filter(|user| user.is_manager())
            .cloned()
            .collect()
    }

    fn users(&self) -> Vec<User> {
        self.users.values().cloned().collect()
    }
}
