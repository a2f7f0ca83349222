//! # breathwork
//!
//! Backend for tracking guided breathing practice.
//!
//! A session runs a fixed number of rounds. Each round is a breathing phase,
//! a breath hold and a short recovery hold. The crate records what the
//! practitioner planned, what actually happened in each round, and rolls
//! completed sessions up into a per-user practice profile.
//!
//! ## Features
//!
//! - **Phase state machine**: Every lifecycle operation is checked against a
//!   single transition table
//! - **Session ledger**: Per-round hold and recovery times, notes and
//!   self-reported stats
//! - **Profile aggregation**: Completed sessions feed lifetime totals
//! - **REST API**: Owner-scoped JSON endpoints behind bearer tokens
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use breathwork::{
//!     AccountStore, LifecycleCommand, NewSession, NewUser, ProfileStore, SessionPhase,
//!     SessionService, SessionSettings, SessionStore,
//! };
//!
//! # fn main() -> breathwork::Result<()> {
//! let accounts = AccountStore::new();
//! let user = accounts.register(NewUser::new("ada"))?;
//!
//! let profiles = Arc::new(ProfileStore::new());
//! let sessions = SessionService::new(Arc::new(SessionStore::new()), profiles.clone());
//!
//! let id = sessions
//!     .create(user.id, NewSession::new(SessionSettings::new(3)))?
//!     .id();
//! sessions.apply(user.id, &id, LifecycleCommand::StartHold)?;
//! sessions.apply(
//!     user.id,
//!     &id,
//!     LifecycleCommand::EndHold { round: 1, hold_seconds: 90.0 },
//! )?;
//! let done = sessions.apply(user.id, &id, LifecycleCommand::Complete)?;
//!
//! assert_eq!(done.phase(), SessionPhase::Completed);
//! assert_eq!(profiles.get_or_create(user.id)?.total_sessions, 1);
//! # Ok(())
//! # }
//! ```

pub mod account;
pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod profile;
pub mod security;
pub mod session;

// Re-export commonly used types
pub use account::{AccountStore, NewUser, User, UserId};
pub use error::{BreathworkError, Result};
pub use profile::{ProfileStore, ProfileUpdate, UserProfile};
pub use session::{
    BreathingSession, CompletionHandler, LifecycleCommand, NewSession, Operation, PracticeStats,
    RoundTimes, SessionCompleted, SessionId, SessionPhase, SessionService, SessionSettings,
    SessionStats, SessionStore, SessionUpdate,
};
