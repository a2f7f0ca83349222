//! User profiles and practice totals.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::account::UserId;
use crate::error::BreathworkError;
use crate::session::{format, CompletionHandler, SessionCompleted};
use crate::Result;

const MAX_BIO_LEN: usize = 500;

/// Per-user profile.
///
/// `total_sessions` and `total_breathing_time` are only ever changed by
/// completion events.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub owner: UserId,
    pub bio: String,
    pub avatar: Option<String>,
    pub total_sessions: u64,
    pub total_breathing_time: Duration,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    fn new(owner: UserId) -> Self {
        let now = Utc::now();
        Self {
            owner,
            bio: String::new(),
            avatar: None,
            total_sessions: 0,
            total_breathing_time: Duration::ZERO,
            created_at: now,
            updated_at: now,
        }
    }

    /// `"<h>h <m>m <s>s"`.
    pub fn total_breathing_time_formatted(&self) -> String {
        format::hours_minutes_seconds(self.total_breathing_time.as_secs())
    }
}

/// Owner-editable profile fields.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub bio: Option<String>,
    pub avatar: Option<String>,
}

/// Thread-safe profile storage, keyed by owner.
pub struct ProfileStore {
    profiles: RwLock<HashMap<UserId, UserProfile>>,
}

impl ProfileStore {
    pub fn new() -> Self {
        Self {
            profiles: RwLock::new(HashMap::new()),
        }
    }

    /// Get `owner`'s profile, creating an empty one on first access.
    pub fn get_or_create(&self, owner: UserId) -> Result<UserProfile> {
        let mut profiles = self
            .profiles
            .write()
            .map_err(|_| BreathworkError::LockPoisoned)?;
        Ok(profiles
            .entry(owner)
            .or_insert_with(|| UserProfile::new(owner))
            .clone())
    }

    pub fn update(&self, owner: UserId, update: ProfileUpdate) -> Result<UserProfile> {
        if let Some(ref bio) = update.bio {
            if bio.chars().count() > MAX_BIO_LEN {
                return Err(BreathworkError::invalid_field(
                    "bio",
                    format!("at most {} characters", MAX_BIO_LEN),
                ));
            }
        }

        let mut profiles = self
            .profiles
            .write()
            .map_err(|_| BreathworkError::LockPoisoned)?;
        let profile = profiles
            .entry(owner)
            .or_insert_with(|| UserProfile::new(owner));

        if let Some(bio) = update.bio {
            profile.bio = bio;
        }
        if let Some(avatar) = update.avatar {
            profile.avatar = if avatar.is_empty() { None } else { Some(avatar) };
        }
        profile.updated_at = Utc::now();
        Ok(profile.clone())
    }

    pub fn count(&self) -> usize {
        self.profiles.read().map(|p| p.len()).unwrap_or(0)
    }
}

impl Default for ProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionHandler for ProfileStore {
    fn on_session_completed(&self, event: &SessionCompleted) -> Result<()> {
        let mut profiles = self
            .profiles
            .write()
            .map_err(|_| BreathworkError::LockPoisoned)?;
        let profile = profiles
            .entry(event.owner)
            .or_insert_with(|| UserProfile::new(event.owner));

        profile.total_sessions += 1;
        profile.total_breathing_time += event.duration;
        profile.updated_at = Utc::now();

        debug!(
            owner = %event.owner,
            total_sessions = profile.total_sessions,
            "Profile totals updated"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionId;

    const OWNER: UserId = UserId::from_raw(3);

    fn completed(seconds: u64) -> SessionCompleted {
        SessionCompleted {
            session_id: SessionId::new(),
            owner: OWNER,
            duration: Duration::from_secs(seconds),
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn test_get_or_create_is_empty() {
        let store = ProfileStore::new();
        let profile = store.get_or_create(OWNER).unwrap();
        assert_eq!(profile.total_sessions, 0);
        assert_eq!(profile.total_breathing_time, Duration::ZERO);
        assert_eq!(profile.total_breathing_time_formatted(), "0h 0m 0s");
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_completion_accumulates() {
        let store = ProfileStore::new();
        store.on_session_completed(&completed(600)).unwrap();
        store.on_session_completed(&completed(3125)).unwrap();

        let profile = store.get_or_create(OWNER).unwrap();
        assert_eq!(profile.total_sessions, 2);
        assert_eq!(profile.total_breathing_time, Duration::from_secs(3725));
        assert_eq!(profile.total_breathing_time_formatted(), "1h 2m 5s");
    }

    #[test]
    fn test_update_bio_and_avatar() {
        let store = ProfileStore::new();
        let profile = store
            .update(
                OWNER,
                ProfileUpdate {
                    bio: Some("Cold showers".into()),
                    avatar: Some("https://example.com/me.png".into()),
                },
            )
            .unwrap();
        assert_eq!(profile.bio, "Cold showers");
        assert_eq!(profile.avatar.as_deref(), Some("https://example.com/me.png"));

        let cleared = store
            .update(
                OWNER,
                ProfileUpdate {
                    avatar: Some(String::new()),
                    ..ProfileUpdate::default()
                },
            )
            .unwrap();
        assert_eq!(cleared.avatar, None);
        assert_eq!(cleared.bio, "Cold showers");
    }

    #[test]
    fn test_bio_too_long() {
        let store = ProfileStore::new();
        let result = store.update(
            OWNER,
            ProfileUpdate {
                bio: Some("a".repeat(501)),
                ..ProfileUpdate::default()
            },
        );
        assert!(matches!(result, Err(BreathworkError::InvalidField { .. })));
    }
}
