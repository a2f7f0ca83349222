//! Breathing session ledger and lifecycle.
//!
//! This module holds the session record, the phase state machine that
//! governs it, the owner-scoped store, and the controller that applies
//! lifecycle operations and reports completions.

pub mod format;
mod id;
mod ledger;
mod lifecycle;
mod phase;
mod service;
mod store;
mod summary;

pub use format::FormattedRound;
pub use id::SessionId;
pub use ledger::{
    BreathingSession, RoundTimes, SessionSettings, SessionStats, SessionUpdate,
    DEFAULT_BREATHS_PER_ROUND, DEFAULT_BREATH_DURATION,
};
pub use lifecycle::{CompletionHandler, LifecycleCommand, SessionCompleted};
pub use phase::{next_phase, Operation, SessionPhase, TRANSITIONS};
pub use service::SessionService;
pub use store::{NewSession, SessionStore};
pub use summary::PracticeStats;
