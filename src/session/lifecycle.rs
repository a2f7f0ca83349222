//! Lifecycle operations on a breathing session.
//!
//! Every operation looks up its edge in the phase table before touching the
//! record, so a rejected operation leaves the session exactly as it was.

use std::time::Duration;

use chrono::{DateTime, Utc};

use super::phase::next_phase;
use super::{BreathingSession, Operation, RoundTimes, SessionId, SessionPhase};
use crate::account::UserId;
use crate::error::BreathworkError;
use crate::Result;

/// Emitted once when a session first reaches `completed`.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionCompleted {
    pub session_id: SessionId,
    pub owner: UserId,
    pub duration: Duration,
    pub completed_at: DateTime<Utc>,
}

/// Consumer of completion events (e.g. per-user practice totals).
pub trait CompletionHandler: Send + Sync {
    fn on_session_completed(&self, event: &SessionCompleted) -> Result<()>;
}

/// A lifecycle operation together with its arguments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LifecycleCommand {
    StartHold,
    EndHold { round: u32, hold_seconds: f64 },
    StartRecovery,
    EndRecovery { round: u32, recovery_seconds: f64 },
    NextRound,
    Complete,
    Cancel,
}

impl LifecycleCommand {
    pub fn operation(&self) -> Operation {
        match self {
            LifecycleCommand::StartHold => Operation::StartHold,
            LifecycleCommand::EndHold { .. } => Operation::EndHold,
            LifecycleCommand::StartRecovery => Operation::StartRecovery,
            LifecycleCommand::EndRecovery { .. } => Operation::EndRecovery,
            LifecycleCommand::NextRound => Operation::NextRound,
            LifecycleCommand::Complete => Operation::Complete,
            LifecycleCommand::Cancel => Operation::Cancel,
        }
    }
}

fn check_round(round: u32) -> Result<usize> {
    if round == 0 {
        return Err(BreathworkError::invalid_field("round_number", "rounds start at 1"));
    }
    Ok(round as usize - 1)
}

fn check_seconds(field: &'static str, seconds: f64) -> Result<()> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(BreathworkError::invalid_field(
            field,
            "must be a non-negative number of seconds",
        ));
    }
    Ok(())
}

impl BreathingSession {
    /// Dispatch a command. `now` is used only by `Complete`.
    pub fn apply(
        &mut self,
        command: LifecycleCommand,
        now: DateTime<Utc>,
    ) -> Result<Option<SessionCompleted>> {
        match command {
            LifecycleCommand::StartHold => self.start_hold().map(|_| None),
            LifecycleCommand::EndHold {
                round,
                hold_seconds,
            } => self.end_hold(round, hold_seconds).map(|_| None),
            LifecycleCommand::StartRecovery => self.start_recovery().map(|_| None),
            LifecycleCommand::EndRecovery {
                round,
                recovery_seconds,
            } => self.end_recovery(round, recovery_seconds).map(|_| None),
            LifecycleCommand::NextRound => self.next_round().map(|_| None),
            LifecycleCommand::Complete => self.complete_at(now),
            LifecycleCommand::Cancel => self.cancel().map(|_| None),
        }
    }

    /// Begin the breath hold.
    pub fn start_hold(&mut self) -> Result<()> {
        self.phase = next_phase(self.phase, Operation::StartHold)?;
        Ok(())
    }

    /// Finish the hold and record its length for `round` (1-based).
    ///
    /// Rounds skipped so far are backfilled with zero entries.
    pub fn end_hold(&mut self, round: u32, hold_seconds: f64) -> Result<()> {
        let next = next_phase(self.phase, Operation::EndHold)?;
        let index = check_round(round)?;
        check_seconds("hold_seconds", hold_seconds)?;

        if self.hold_times.len() <= index {
            self.hold_times.resize(index + 1, RoundTimes::default());
        }
        self.hold_times[index].hold = hold_seconds;
        self.phase = next;
        Ok(())
    }

    /// Enter recovery without recording a hold.
    pub fn start_recovery(&mut self) -> Result<()> {
        self.phase = next_phase(self.phase, Operation::StartRecovery)?;
        Ok(())
    }

    /// Finish recovery for `round`.
    ///
    /// The recovery time is only written when that round already has an
    /// entry; the phase changes either way.
    pub fn end_recovery(&mut self, round: u32, recovery_seconds: f64) -> Result<()> {
        let next = next_phase(self.phase, Operation::EndRecovery)?;
        let index = check_round(round)?;
        check_seconds("recovery_seconds", recovery_seconds)?;

        if let Some(entry) = self.hold_times.get_mut(index) {
            entry.recovery = recovery_seconds;
        }
        self.phase = next;
        Ok(())
    }

    /// Start breathing for the next round.
    pub fn next_round(&mut self) -> Result<()> {
        self.phase = next_phase(self.phase, Operation::NextRound)?;
        Ok(())
    }

    /// Complete now. See [`BreathingSession::complete_at`].
    pub fn complete(&mut self) -> Result<Option<SessionCompleted>> {
        self.complete_at(Utc::now())
    }

    /// Mark the session completed at `now`.
    ///
    /// Returns the completion event the first time. Completing an already
    /// completed session changes nothing and returns `None`.
    pub fn complete_at(&mut self, now: DateTime<Utc>) -> Result<Option<SessionCompleted>> {
        let from = self.phase;
        let next = next_phase(from, Operation::Complete)?;
        if from == SessionPhase::Completed {
            return Ok(None);
        }

        let duration = (now - self.started_at).to_std().unwrap_or_default();
        self.completed_at = Some(now);
        self.actual_duration = Some(duration);
        self.phase = next;

        Ok(Some(SessionCompleted {
            session_id: self.id,
            owner: self.owner,
            duration,
            completed_at: now,
        }))
    }

    /// Abandon a session that is between rounds.
    pub fn cancel(&mut self) -> Result<()> {
        self.phase = next_phase(self.phase, Operation::Cancel)?;
        Ok(())
    }
}
