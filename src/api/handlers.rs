//! REST API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use super::types::{
    CreateSessionRequest, ErrorResponse, ListSessionsResponse, ProfileResponse,
    RoundSampleRequest, SessionResponse, TokenResponse, UpdateProfileRequest,
    UpdateSessionRequest,
};
use crate::account::{AccountStore, NewUser, UserId};
use crate::error::BreathworkError;
use crate::profile::ProfileStore;
use crate::security::TokenStore;
use crate::session::{
    LifecycleCommand, PracticeStats, SessionId, SessionService, SessionStore,
    DEFAULT_BREATHS_PER_ROUND, DEFAULT_BREATH_DURATION,
};

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = Result<T, ApiError>;

/// Values applied when a request leaves them out.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionDefaults {
    pub breaths_per_round: u32,
    pub breath_duration: f64,
    /// Number of sessions returned by `/sessions/recent`.
    pub recent_limit: usize,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            breaths_per_round: DEFAULT_BREATHS_PER_ROUND,
            breath_duration: DEFAULT_BREATH_DURATION,
            recent_limit: 10,
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountStore>,
    pub tokens: Arc<TokenStore>,
    pub profiles: Arc<ProfileStore>,
    pub sessions: SessionService,
    pub defaults: SessionDefaults,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_defaults(SessionDefaults::default())
    }

    pub fn with_defaults(defaults: SessionDefaults) -> Self {
        let profiles = Arc::new(ProfileStore::new());
        let sessions = SessionService::new(Arc::new(SessionStore::new()), profiles.clone());
        Self {
            accounts: Arc::new(AccountStore::new()),
            tokens: Arc::new(TokenStore::default()),
            profiles,
            sessions,
            defaults,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a domain error to its HTTP status and body.
pub fn reject(err: BreathworkError) -> ApiError {
    let (status, body) = match &err {
        BreathworkError::SessionNotFound(id) => {
            (StatusCode::NOT_FOUND, ErrorResponse::session_not_found(id))
        }
        BreathworkError::InvalidPhaseTransition { operation, phase } => (
            StatusCode::CONFLICT,
            ErrorResponse::invalid_transition(*operation, *phase),
        ),
        BreathworkError::MissingRequiredField(field) => {
            (StatusCode::BAD_REQUEST, ErrorResponse::missing_field(field))
        }
        BreathworkError::InvalidField { field, reason } => (
            StatusCode::BAD_REQUEST,
            ErrorResponse::invalid_field(field, reason),
        ),
        BreathworkError::UsernameTaken(name) => {
            (StatusCode::CONFLICT, ErrorResponse::username_taken(name))
        }
        BreathworkError::Unauthorized => (StatusCode::UNAUTHORIZED, ErrorResponse::unauthorized()),
        BreathworkError::Io(_) | BreathworkError::LockPoisoned => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorResponse::internal_error(err.to_string()),
        ),
    };
    (status, Json(body))
}

/// Health check endpoint.
pub async fn health() -> &'static str {
    "OK"
}

/// API information endpoint.
pub async fn api_info() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "breathwork",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

fn issue_token(state: &AppState, user: UserId) -> ApiResult<String> {
    state.tokens.issue(user).ok_or_else(|| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::internal_error("failed to issue token")),
        )
    })
}

/// Register a user and return its first token.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<NewUser>,
) -> ApiResult<(StatusCode, Json<TokenResponse>)> {
    let user = state.accounts.register(req).map_err(reject)?;
    state.profiles.get_or_create(user.id).map_err(reject)?;
    let token = issue_token(&state, user.id)?;

    tracing::info!(user = %user.id, username = %user.username, "User registered");

    Ok((StatusCode::CREATED, Json(TokenResponse { user, token })))
}

/// Get the caller's profile.
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(owner): Extension<UserId>,
) -> ApiResult<Json<ProfileResponse>> {
    let profile = state.profiles.get_or_create(owner).map_err(reject)?;
    let user = state.accounts.get(owner).map_err(reject)?;
    Ok(Json(ProfileResponse::from_profile(&profile, user)))
}

/// Edit the caller's bio and avatar.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(owner): Extension<UserId>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    let profile = state.profiles.update(owner, req.into()).map_err(reject)?;
    let user = state.accounts.get(owner).map_err(reject)?;
    Ok(Json(ProfileResponse::from_profile(&profile, user)))
}

/// List the caller's sessions, newest first.
pub async fn list_sessions(
    State(state): State<AppState>,
    Extension(owner): Extension<UserId>,
) -> ApiResult<Json<ListSessionsResponse>> {
    let sessions = state.sessions.list(owner).map_err(reject)?;
    Ok(Json(ListSessionsResponse::from_sessions(&sessions)))
}

/// Start a new session.
pub async fn create_session(
    State(state): State<AppState>,
    Extension(owner): Extension<UserId>,
    Json(req): Json<CreateSessionRequest>,
) -> ApiResult<(StatusCode, Json<SessionResponse>)> {
    let new = req.into_new_session(&state.defaults).map_err(reject)?;
    let session = state.sessions.create(owner, new).map_err(reject)?;
    Ok((
        StatusCode::CREATED,
        Json(SessionResponse::from_session(&session)),
    ))
}

/// Get one session.
pub async fn get_session(
    State(state): State<AppState>,
    Extension(owner): Extension<UserId>,
    Path(session_id): Path<u64>,
) -> ApiResult<Json<SessionResponse>> {
    let id = SessionId::from_raw(session_id);
    let session = state.sessions.get(owner, &id).map_err(reject)?;
    Ok(Json(SessionResponse::from_session(&session)))
}

/// Edit a session's configuration, notes or stats.
pub async fn update_session(
    State(state): State<AppState>,
    Extension(owner): Extension<UserId>,
    Path(session_id): Path<u64>,
    Json(req): Json<UpdateSessionRequest>,
) -> ApiResult<Json<SessionResponse>> {
    let id = SessionId::from_raw(session_id);
    let session = state
        .sessions
        .update(owner, &id, req.into())
        .map_err(reject)?;
    Ok(Json(SessionResponse::from_session(&session)))
}

/// The caller's newest `in_progress` session.
pub async fn active_session(
    State(state): State<AppState>,
    Extension(owner): Extension<UserId>,
) -> ApiResult<Json<SessionResponse>> {
    let session = state.sessions.active(owner).map_err(|e| match e {
        BreathworkError::SessionNotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("NO_ACTIVE_SESSION", "No active session")),
        ),
        other => reject(other),
    })?;
    Ok(Json(SessionResponse::from_session(&session)))
}

/// The caller's newest sessions.
pub async fn recent_sessions(
    State(state): State<AppState>,
    Extension(owner): Extension<UserId>,
) -> ApiResult<Json<ListSessionsResponse>> {
    let sessions = state
        .sessions
        .recent(owner, state.defaults.recent_limit)
        .map_err(reject)?;
    Ok(Json(ListSessionsResponse::from_sessions(&sessions)))
}

/// Totals over the caller's completed sessions.
pub async fn session_stats(
    State(state): State<AppState>,
    Extension(owner): Extension<UserId>,
) -> ApiResult<Json<PracticeStats>> {
    let stats = state.sessions.practice_stats(owner).map_err(reject)?;
    Ok(Json(stats))
}

fn run(
    state: &AppState,
    owner: UserId,
    session_id: u64,
    command: LifecycleCommand,
) -> ApiResult<Json<SessionResponse>> {
    let id = SessionId::from_raw(session_id);
    let session = state.sessions.apply(owner, &id, command).map_err(reject)?;
    Ok(Json(SessionResponse::from_session(&session)))
}

pub async fn start_hold(
    State(state): State<AppState>,
    Extension(owner): Extension<UserId>,
    Path(session_id): Path<u64>,
) -> ApiResult<Json<SessionResponse>> {
    run(&state, owner, session_id, LifecycleCommand::StartHold)
}

/// Body: `round_number`, `hold_seconds`.
pub async fn end_hold(
    State(state): State<AppState>,
    Extension(owner): Extension<UserId>,
    Path(session_id): Path<u64>,
    Json(req): Json<RoundSampleRequest>,
) -> ApiResult<Json<SessionResponse>> {
    let command = req.end_hold().map_err(reject)?;
    run(&state, owner, session_id, command)
}

pub async fn start_recovery(
    State(state): State<AppState>,
    Extension(owner): Extension<UserId>,
    Path(session_id): Path<u64>,
) -> ApiResult<Json<SessionResponse>> {
    run(&state, owner, session_id, LifecycleCommand::StartRecovery)
}

/// Body: `round_number`, `recovery_seconds`.
pub async fn end_recovery(
    State(state): State<AppState>,
    Extension(owner): Extension<UserId>,
    Path(session_id): Path<u64>,
    Json(req): Json<RoundSampleRequest>,
) -> ApiResult<Json<SessionResponse>> {
    let command = req.end_recovery().map_err(reject)?;
    run(&state, owner, session_id, command)
}

pub async fn next_round(
    State(state): State<AppState>,
    Extension(owner): Extension<UserId>,
    Path(session_id): Path<u64>,
) -> ApiResult<Json<SessionResponse>> {
    run(&state, owner, session_id, LifecycleCommand::NextRound)
}

pub async fn complete_session(
    State(state): State<AppState>,
    Extension(owner): Extension<UserId>,
    Path(session_id): Path<u64>,
) -> ApiResult<Json<SessionResponse>> {
    run(&state, owner, session_id, LifecycleCommand::Complete)
}

pub async fn cancel_session(
    State(state): State<AppState>,
    Extension(owner): Extension<UserId>,
    Path(session_id): Path<u64>,
) -> ApiResult<Json<SessionResponse>> {
    run(&state, owner, session_id, LifecycleCommand::Cancel)
}
