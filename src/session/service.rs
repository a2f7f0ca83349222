//! Session lifecycle controller.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::{
    BreathingSession, CompletionHandler, LifecycleCommand, NewSession, PracticeStats, SessionId,
    SessionPhase, SessionStore, SessionUpdate,
};
use crate::account::UserId;
use crate::error::BreathworkError;
use crate::Result;

/// Applies lifecycle operations to stored sessions and forwards completion
/// events.
///
/// The session write and the completion handler are not one transaction:
/// the session is committed first, and a failing handler is logged without
/// undoing the completion.
#[derive(Clone)]
pub struct SessionService {
    store: Arc<SessionStore>,
    completions: Arc<dyn CompletionHandler>,
}

impl SessionService {
    pub fn new(store: Arc<SessionStore>, completions: Arc<dyn CompletionHandler>) -> Self {
        Self { store, completions }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn create(&self, owner: UserId, new: NewSession) -> Result<BreathingSession> {
        let session = self.store.create(owner, new)?;
        info!(
            session = %session.id(),
            owner = %owner,
            rounds = session.settings().rounds,
            "Breathing session started"
        );
        Ok(session)
    }

    pub fn get(&self, owner: UserId, id: &SessionId) -> Result<BreathingSession> {
        self.store.fetch(owner, id)
    }

    pub fn list(&self, owner: UserId) -> Result<Vec<BreathingSession>> {
        self.store.list(owner)
    }

    /// Newest session of `owner` that is still `in_progress`.
    pub fn active(&self, owner: UserId) -> Result<BreathingSession> {
        self.store
            .list_in_phase(owner, SessionPhase::InProgress)?
            .into_iter()
            .next()
            .ok_or_else(|| BreathworkError::SessionNotFound("active".into()))
    }

    /// At most `limit` of `owner`'s newest sessions.
    pub fn recent(&self, owner: UserId, limit: usize) -> Result<Vec<BreathingSession>> {
        let mut sessions = self.store.list(owner)?;
        sessions.truncate(limit);
        Ok(sessions)
    }

    pub fn update(
        &self,
        owner: UserId,
        id: &SessionId,
        update: SessionUpdate,
    ) -> Result<BreathingSession> {
        self.store.update(owner, id, |s| {
            s.apply_update(update)?;
            Ok(s.clone())
        })
    }

    /// Run one lifecycle command against `owner`'s session.
    pub fn apply(
        &self,
        owner: UserId,
        id: &SessionId,
        command: LifecycleCommand,
    ) -> Result<BreathingSession> {
        let operation = command.operation();
        let result = self.store.update(owner, id, |s| {
            let from = s.phase();
            let event = s.apply(command, Utc::now())?;
            debug!(session = %id, %operation, %from, to = %s.phase(), "Phase transition");
            Ok((s.clone(), event))
        });

        let (session, event) = match result {
            Ok(applied) => applied,
            Err(e) => {
                debug!(session = %id, %operation, error = %e, "Lifecycle operation rejected");
                return Err(e);
            }
        };

        if let Some(event) = event {
            info!(
                session = %id,
                owner = %owner,
                seconds = event.duration.as_secs_f64(),
                "Breathing session completed"
            );
            if let Err(e) = self.completions.on_session_completed(&event) {
                warn!(session = %id, error = %e, "Failed to record completed session in profile");
            }
        }

        Ok(session)
    }

    pub fn practice_stats(&self, owner: UserId) -> Result<PracticeStats> {
        let sessions = self.store.list(owner)?;
        Ok(PracticeStats::from_sessions(&sessions, Utc::now()))
    }
}
