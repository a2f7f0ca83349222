//! User accounts.
//!
//! Only the identity part of an account lives here. Password checks and
//! token signing belong to an external identity provider; this registry just
//! gives each user a stable ID for ownership.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::BreathworkError;
use crate::Result;

static COUNTER: AtomicU64 = AtomicU64::new(1);

const MAX_USERNAME_LEN: usize = 150;

/// Unique identifier for a user, displayed as `usr-XXXXXXXX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(u64);

impl UserId {
    /// Create a new unique user ID.
    pub fn new() -> Self {
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "usr-{:08x}", self.0)
    }
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub date_joined: DateTime<Utc>,
}

/// Registration details.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl NewUser {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if self.username.is_empty() {
            return Err(BreathworkError::MissingRequiredField("username"));
        }
        if self.username.chars().count() > MAX_USERNAME_LEN {
            return Err(BreathworkError::invalid_field(
                "username",
                format!("at most {} characters", MAX_USERNAME_LEN),
            ));
        }
        let allowed = |c: char| c.is_alphanumeric() || "@.+-_".contains(c);
        if !self.username.chars().all(allowed) {
            return Err(BreathworkError::invalid_field(
                "username",
                "letters, digits and @/./+/-/_ only",
            ));
        }
        Ok(())
    }
}

/// Thread-safe registry of users.
pub struct AccountStore {
    users: RwLock<HashMap<UserId, User>>,
}

impl AccountStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }

    /// Register a user. Usernames are unique.
    pub fn register(&self, new: NewUser) -> Result<User> {
        new.validate()?;

        let mut users = self
            .users
            .write()
            .map_err(|_| BreathworkError::LockPoisoned)?;

        if users.values().any(|u| u.username == new.username) {
            return Err(BreathworkError::UsernameTaken(new.username));
        }

        let user = User {
            id: UserId::new(),
            username: new.username,
            email: new.email,
            first_name: new.first_name,
            last_name: new.last_name,
            date_joined: Utc::now(),
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    pub fn get(&self, id: UserId) -> Result<Option<User>> {
        let users = self
            .users
            .read()
            .map_err(|_| BreathworkError::LockPoisoned)?;
        Ok(users.get(&id).cloned())
    }

    pub fn count(&self) -> usize {
        self.users.read().map(|u| u.len()).unwrap_or(0)
    }
}

impl Default for AccountStore {
    fn default() -> Self {
        Self::new()
    }
}
