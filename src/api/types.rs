//! API request and response types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::account::User;
use crate::error::BreathworkError;
use crate::profile::{ProfileUpdate, UserProfile};
use crate::session::{
    format, BreathingSession, FormattedRound, LifecycleCommand, NewSession, Operation,
    RoundTimes, SessionPhase, SessionSettings, SessionStats, SessionUpdate,
};
use crate::Result;

use super::handlers::SessionDefaults;

/// Response for registration.
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub user: User,
    /// Bearer token for the `Authorization` header.
    pub token: String,
}

/// Profile view.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    pub bio: String,
    pub avatar: Option<String>,
    pub total_sessions: u64,
    /// Total breathing time in seconds.
    pub total_breathing_time: f64,
    pub total_breathing_time_formatted: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProfileResponse {
    pub fn from_profile(profile: &UserProfile, user: Option<User>) -> Self {
        Self {
            user,
            bio: profile.bio.clone(),
            avatar: profile.avatar.clone(),
            total_sessions: profile.total_sessions,
            total_breathing_time: profile.total_breathing_time.as_secs_f64(),
            total_breathing_time_formatted: profile.total_breathing_time_formatted(),
            created_at: profile.created_at,
            updated_at: profile.updated_at,
        }
    }
}

/// Request to edit the caller's profile.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub bio: Option<String>,
    /// Empty string clears the avatar.
    #[serde(default)]
    pub avatar: Option<String>,
}

impl From<UpdateProfileRequest> for ProfileUpdate {
    fn from(req: UpdateProfileRequest) -> Self {
        Self {
            bio: req.bio,
            avatar: req.avatar,
        }
    }
}

/// Request to start a new breathing session.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub rounds: Option<u32>,
    #[serde(default)]
    pub breaths_per_round: Option<u32>,
    /// Seconds per breath.
    #[serde(default)]
    pub breath_duration: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub stats: Option<SessionStats>,
}

impl CreateSessionRequest {
    /// Fill unset pacing from `defaults`. `rounds` has no default.
    pub fn into_new_session(self, defaults: &SessionDefaults) -> Result<NewSession> {
        let rounds = self
            .rounds
            .ok_or(BreathworkError::MissingRequiredField("rounds"))?;
        let settings = SessionSettings::new(rounds)
            .with_breaths_per_round(
                self.breaths_per_round
                    .unwrap_or(defaults.breaths_per_round),
            )
            .with_breath_duration(self.breath_duration.unwrap_or(defaults.breath_duration));

        Ok(NewSession {
            settings,
            notes: self.notes.unwrap_or_default(),
            stats: self.stats,
        })
    }
}

/// Request to edit a session's fields.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateSessionRequest {
    #[serde(default)]
    pub rounds: Option<u32>,
    #[serde(default)]
    pub breaths_per_round: Option<u32>,
    #[serde(default)]
    pub breath_duration: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub stats: Option<SessionStats>,
}

impl From<UpdateSessionRequest> for SessionUpdate {
    fn from(req: UpdateSessionRequest) -> Self {
        Self {
            rounds: req.rounds,
            breaths_per_round: req.breaths_per_round,
            breath_duration: req.breath_duration,
            notes: req.notes,
            stats: req.stats,
        }
    }
}

/// Body of `end_hold` and `end_recovery`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RoundSampleRequest {
    /// 1-based round number.
    #[serde(default)]
    pub round_number: Option<u32>,
    #[serde(default)]
    pub hold_seconds: Option<f64>,
    #[serde(default)]
    pub recovery_seconds: Option<f64>,
}

impl RoundSampleRequest {
    fn round(&self) -> Result<u32> {
        // Round 0 is treated like an absent round.
        self.round_number
            .filter(|round| *round > 0)
            .ok_or(BreathworkError::MissingRequiredField("round_number"))
    }

    pub fn end_hold(&self) -> Result<LifecycleCommand> {
        let round = self.round()?;
        let hold_seconds = self
            .hold_seconds
            .ok_or(BreathworkError::MissingRequiredField("hold_seconds"))?;
        Ok(LifecycleCommand::EndHold {
            round,
            hold_seconds,
        })
    }

    pub fn end_recovery(&self) -> Result<LifecycleCommand> {
        let round = self.round()?;
        let recovery_seconds = self
            .recovery_seconds
            .ok_or(BreathworkError::MissingRequiredField("recovery_seconds"))?;
        Ok(LifecycleCommand::EndRecovery {
            round,
            recovery_seconds,
        })
    }
}

/// Full session view, including derived values.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub id: u64,
    /// Human-readable session ID string.
    pub id_str: String,
    pub owner_id: u64,
    pub rounds: u32,
    pub breaths_per_round: u32,
    pub breath_duration: f64,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Seconds.
    pub planned_duration: f64,
    /// Seconds, once completed.
    pub actual_duration: Option<f64>,
    pub duration_formatted: String,
    pub planned_duration_formatted: String,
    pub actual_duration_formatted: Option<String>,
    pub status: SessionPhase,
    pub notes: String,
    pub stats: Option<SessionStats>,
    pub hold_times: Vec<RoundTimes>,
    pub hold_times_formatted: Vec<FormattedRound>,
    pub total_hold_time: f64,
    pub total_hold_time_formatted: String,
    pub average_hold_time: f64,
    pub average_hold_time_formatted: String,
}

impl SessionResponse {
    pub fn from_session(session: &BreathingSession) -> Self {
        let settings = session.settings();
        let total_hold = session.total_hold_time();
        let average_hold = session.average_hold_time();

        Self {
            id: session.id().as_u64(),
            id_str: session.id().to_string(),
            owner_id: session.owner().as_u64(),
            rounds: settings.rounds,
            breaths_per_round: settings.breaths_per_round,
            breath_duration: settings.breath_duration,
            started_at: session.started(),
            completed_at: session.completed_at(),
            planned_duration: session.planned_duration().as_secs_f64(),
            actual_duration: session.actual_duration().map(|d| d.as_secs_f64()),
            duration_formatted: session.duration_formatted(),
            planned_duration_formatted: format::minutes_seconds(
                session.planned_duration().as_secs(),
            ),
            actual_duration_formatted: session
                .actual_duration()
                .map(|d| format::minutes_seconds(d.as_secs())),
            status: session.phase(),
            notes: session.notes().to_string(),
            stats: session.stats().cloned(),
            hold_times: session.hold_times().to_vec(),
            hold_times_formatted: format::rounds(session.hold_times()),
            total_hold_time: total_hold,
            total_hold_time_formatted: format::hold(total_hold),
            average_hold_time: average_hold,
            average_hold_time_formatted: format::hold(average_hold),
        }
    }
}

/// List sessions response.
#[derive(Debug, Clone, Serialize)]
pub struct ListSessionsResponse {
    /// Total number of sessions returned.
    pub count: usize,
    pub sessions: Vec<SessionResponse>,
}

impl ListSessionsResponse {
    pub fn from_sessions(sessions: &[BreathingSession]) -> Self {
        Self {
            count: sessions.len(),
            sessions: sessions.iter().map(SessionResponse::from_session).collect(),
        }
    }
}

/// Generic API error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "SESSION_NOT_FOUND").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn session_not_found(id: &str) -> Self {
        Self::new("SESSION_NOT_FOUND", format!("Session '{}' not found", id))
    }

    /// Rejection of `operation` from `phase`, listing the phases it needs.
    pub fn invalid_transition(operation: Operation, phase: SessionPhase) -> Self {
        let allowed: Vec<&str> = operation
            .allowed_from()
            .iter()
            .map(|p| p.as_str())
            .collect();
        Self::new(
            "INVALID_PHASE_TRANSITION",
            format!("Cannot {} while the session is {}", operation, phase),
        )
        .with_details(format!("{} requires phase: {}", operation, allowed.join(", ")))
    }

    pub fn missing_field(field: &str) -> Self {
        Self::new("MISSING_FIELD", format!("'{}' is required", field))
    }

    pub fn invalid_field(field: &str, reason: &str) -> Self {
        Self::new("INVALID_FIELD", format!("Invalid '{}': {}", field, reason))
    }

    pub fn username_taken(name: &str) -> Self {
        Self::new("USERNAME_TAKEN", format!("Username '{}' is already taken", name))
    }

    pub fn unauthorized() -> Self {
        Self::new("UNAUTHORIZED", "A valid bearer token is required")
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}
