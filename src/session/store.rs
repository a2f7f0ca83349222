//! Session ledger storage.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use super::{BreathingSession, SessionId, SessionPhase, SessionSettings, SessionStats};
use crate::account::UserId;
use crate::error::BreathworkError;
use crate::Result;

/// Everything needed to open a new session.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub settings: SessionSettings,
    pub notes: String,
    pub stats: Option<SessionStats>,
}

impl NewSession {
    pub fn new(settings: SessionSettings) -> Self {
        Self {
            settings,
            notes: String::new(),
            stats: None,
        }
    }
}

/// Thread-safe storage for breathing sessions.
///
/// Lookups are always scoped to an owner: a session owned by someone else is
/// reported exactly like a missing one. Sessions are never removed.
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, BreathingSession>>,
}

impl SessionStore {
    /// Create a new empty session store.
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Open a session for `owner`, started now.
    pub fn create(&self, owner: UserId, new: NewSession) -> Result<BreathingSession> {
        self.create_at(owner, new, Utc::now())
    }

    /// Open a session for `owner` with an explicit start time.
    pub fn create_at(
        &self,
        owner: UserId,
        new: NewSession,
        started_at: DateTime<Utc>,
    ) -> Result<BreathingSession> {
        new.settings.validate()?;
        if let Some(ref stats) = new.stats {
            stats.validate()?;
        }

        let mut session = BreathingSession::started_at(SessionId::new(), owner, new.settings, started_at)
            .with_notes(new.notes);
        if let Some(stats) = new.stats {
            session = session.with_stats(stats);
        }

        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| BreathworkError::LockPoisoned)?;
        sessions.insert(session.id, session.clone());
        Ok(session)
    }

    /// Get a copy of `owner`'s session with the given ID.
    pub fn get(&self, owner: UserId, id: &SessionId) -> Result<Option<BreathingSession>> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| BreathworkError::LockPoisoned)?;
        Ok(sessions.get(id).filter(|s| s.owner == owner).cloned())
    }

    /// Like [`SessionStore::get`] but a missing session is an error.
    pub fn fetch(&self, owner: UserId, id: &SessionId) -> Result<BreathingSession> {
        self.get(owner, id)?
            .ok_or_else(|| BreathworkError::SessionNotFound(id.to_string()))
    }

    /// All of `owner`'s sessions, newest first.
    pub fn list(&self, owner: UserId) -> Result<Vec<BreathingSession>> {
        self.list_matching(owner, |_| true)
    }

    /// `owner`'s sessions currently in `phase`, newest first.
    pub fn list_in_phase(&self, owner: UserId, phase: SessionPhase) -> Result<Vec<BreathingSession>> {
        self.list_matching(owner, |s| s.phase == phase)
    }

    /// `owner`'s sessions matching a predicate, newest first.
    pub fn list_matching<F>(&self, owner: UserId, predicate: F) -> Result<Vec<BreathingSession>>
    where
        F: Fn(&BreathingSession) -> bool,
    {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| BreathworkError::LockPoisoned)?;

        let mut found: Vec<BreathingSession> = sessions
            .values()
            .filter(|s| s.owner == owner && predicate(s))
            .cloned()
            .collect();
        // IDs break ties between sessions started within the same instant.
        found.sort_by(|a, b| {
            b.started_at
                .cmp(&a.started_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(found)
    }

    /// Read-modify-write one session under the store's write lock.
    ///
    /// The closure works on a copy; the copy replaces the stored session only
    /// if the closure succeeds, so a rejected change leaves the ledger as it
    /// was.
    pub fn update<F, T>(&self, owner: UserId, id: &SessionId, f: F) -> Result<T>
    where
        F: FnOnce(&mut BreathingSession) -> Result<T>,
    {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| BreathworkError::LockPoisoned)?;

        let stored = sessions
            .get_mut(id)
            .filter(|s| s.owner == owner)
            .ok_or_else(|| BreathworkError::SessionNotFound(id.to_string()))?;

        let mut draft = stored.clone();
        let value = f(&mut draft)?;
        *stored = draft;
        Ok(value)
    }

    /// Get the number of sessions in the store.
    pub fn count(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    const ALICE: UserId = UserId::from_raw(1);
    const BOB: UserId = UserId::from_raw(2);

    fn new_session() -> NewSession {
        NewSession::new(SessionSettings::new(3))
    }

    #[test]
    fn test_create_and_get() {
        let store = SessionStore::new();
        let created = store.create(ALICE, new_session()).unwrap();

        let fetched = store.get(ALICE, &created.id()).unwrap().unwrap();
        assert_eq!(fetched.id(), created.id());
        assert_eq!(fetched.phase(), SessionPhase::InProgress);
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_create_rejects_bad_settings() {
        let store = SessionStore::new();
        let result = store.create(ALICE, NewSession::new(SessionSettings::new(0)));
        assert!(matches!(result, Err(BreathworkError::InvalidField { .. })));
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_sessions_invisible_to_other_owners() {
        let store = SessionStore::new();
        let created = store.create(ALICE, new_session()).unwrap();

        assert!(store.get(BOB, &created.id()).unwrap().is_none());
        assert!(matches!(
            store.fetch(BOB, &created.id()),
            Err(BreathworkError::SessionNotFound(_))
        ));
        assert!(store.list(BOB).unwrap().is_empty());

        let result = store.update(BOB, &created.id(), |s| s.cancel());
        assert!(matches!(result, Err(BreathworkError::SessionNotFound(_))));
        assert_eq!(
            store.fetch(ALICE, &created.id()).unwrap().phase(),
            SessionPhase::InProgress
        );
    }

    #[test]
    fn test_list_newest_first() {
        let store = SessionStore::new();
        let now = Utc::now();
        let old = store
            .create_at(ALICE, new_session(), now - TimeDelta::hours(2))
            .unwrap();
        let newest = store.create_at(ALICE, new_session(), now).unwrap();
        let middle = store
            .create_at(ALICE, new_session(), now - TimeDelta::hours(1))
            .unwrap();
        store.create(BOB, new_session()).unwrap();

        let ids: Vec<SessionId> = store.list(ALICE).unwrap().iter().map(|s| s.id()).collect();
        assert_eq!(ids, vec![newest.id(), middle.id(), old.id()]);
    }

    #[test]
    fn test_list_in_phase() {
        let store = SessionStore::new();
        let a = store.create(ALICE, new_session()).unwrap();
        let b = store.create(ALICE, new_session()).unwrap();
        store.update(ALICE, &b.id(), |s| s.cancel()).unwrap();

        let active = store.list_in_phase(ALICE, SessionPhase::InProgress).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id(), a.id());

        let cancelled = store.list_in_phase(ALICE, SessionPhase::Cancelled).unwrap();
        assert_eq!(cancelled.len(), 1);
        assert_eq!(cancelled[0].id(), b.id());
    }

    #[test]
    fn test_failed_update_is_not_committed() {
        let store = SessionStore::new();
        let created = store.create(ALICE, new_session()).unwrap();

        let result = store.update(ALICE, &created.id(), |s| {
            s.notes = "scribbled".into();
            s.end_hold(1, 30.0)
        });
        assert!(result.is_err());

        let stored = store.fetch(ALICE, &created.id()).unwrap();
        assert_eq!(stored.notes(), "");
        assert_eq!(stored.phase(), SessionPhase::InProgress);
    }

    #[test]
    fn test_update_returns_closure_value() {
        let store = SessionStore::new();
        let created = store.create(ALICE, new_session()).unwrap();

        let phase = store
            .update(ALICE, &created.id(), |s| {
                s.start_hold()?;
                Ok(s.phase())
            })
            .unwrap();
        assert_eq!(phase, SessionPhase::Holding);
    }

    #[test]
    fn test_concurrent_updates_serialize() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(SessionStore::new());
        let id = store.create(ALICE, new_session()).unwrap().id();

        let handles: Vec<_> = (1..=20u32)
            .map(|round| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    store
                        .update(ALICE, &id, |s| {
                            s.phase = SessionPhase::Holding;
                            s.end_hold(round, f64::from(round))
                        })
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let stored = store.fetch(ALICE, &id).unwrap();
        assert_eq!(stored.hold_times().len(), 20);
        assert!(stored.hold_times().iter().all(|t| t.hold > 0.0));
    }
}
