//! Session phase state machine.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle phase of a breathing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Created, or between rounds.
    #[default]
    InProgress,
    /// Power-breathing part of a round.
    Breathing,
    /// Breath hold after exhaling.
    Holding,
    /// Recovery breath after the hold.
    Recovery,
    /// Finished; durations are recorded.
    Completed,
    /// Abandoned before any round started.
    Cancelled,
}

impl SessionPhase {
    /// Every phase, in declaration order.
    pub const ALL: [SessionPhase; 6] = [
        SessionPhase::InProgress,
        SessionPhase::Breathing,
        SessionPhase::Holding,
        SessionPhase::Recovery,
        SessionPhase::Completed,
        SessionPhase::Cancelled,
    ];

    /// Check if this is a terminal phase.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionPhase::Completed | SessionPhase::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::InProgress => "in_progress",
            SessionPhase::Breathing => "breathing",
            SessionPhase::Holding => "holding",
            SessionPhase::Recovery => "recovery",
            SessionPhase::Completed => "completed",
            SessionPhase::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle operations that may move a session between phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    StartHold,
    EndHold,
    StartRecovery,
    EndRecovery,
    NextRound,
    Complete,
    Cancel,
}

impl Operation {
    /// Every operation, in declaration order.
    pub const ALL: [Operation; 7] = [
        Operation::StartHold,
        Operation::EndHold,
        Operation::StartRecovery,
        Operation::EndRecovery,
        Operation::NextRound,
        Operation::Complete,
        Operation::Cancel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::StartHold => "start_hold",
            Operation::EndHold => "end_hold",
            Operation::StartRecovery => "start_recovery",
            Operation::EndRecovery => "end_recovery",
            Operation::NextRound => "next_round",
            Operation::Complete => "complete",
            Operation::Cancel => "cancel",
        }
    }

    /// Phases from which this operation is accepted.
    pub fn allowed_from(&self) -> Vec<SessionPhase> {
        TRANSITIONS
            .iter()
            .filter(|(op, _, _)| op == self)
            .map(|(_, from, _)| *from)
            .collect()
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every accepted (operation, from, to) edge. Pairs not listed are rejected.
///
/// `Complete` from `Completed` is the idempotent self-edge.
pub const TRANSITIONS: &[(Operation, SessionPhase, SessionPhase)] = &[
    (Operation::StartHold, SessionPhase::InProgress, SessionPhase::Holding),
    (Operation::StartHold, SessionPhase::Breathing, SessionPhase::Holding),
    (Operation::EndHold, SessionPhase::Holding, SessionPhase::Recovery),
    (Operation::StartRecovery, SessionPhase::Holding, SessionPhase::Recovery),
    (Operation::EndRecovery, SessionPhase::Recovery, SessionPhase::InProgress),
    (Operation::NextRound, SessionPhase::Recovery, SessionPhase::Breathing),
    (Operation::NextRound, SessionPhase::InProgress, SessionPhase::Breathing),
    (Operation::Complete, SessionPhase::InProgress, SessionPhase::Completed),
    (Operation::Complete, SessionPhase::Breathing, SessionPhase::Completed),
    (Operation::Complete, SessionPhase::Holding, SessionPhase::Completed),
    (Operation::Complete, SessionPhase::Recovery, SessionPhase::Completed),
    (Operation::Complete, SessionPhase::Completed, SessionPhase::Completed),
    (Operation::Cancel, SessionPhase::InProgress, SessionPhase::Cancelled),
];

/// Look up the phase `operation` leads to from `from`.
pub fn next_phase(from: SessionPhase, operation: Operation) -> crate::Result<SessionPhase> {
    TRANSITIONS
        .iter()
        .find(|(op, src, _)| *op == operation && *src == from)
        .map(|(_, _, to)| *to)
        .ok_or(crate::error::BreathworkError::InvalidPhaseTransition {
            operation,
            phase: from,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_cycle() {
        use Operation::*;
        let mut phase = SessionPhase::InProgress;
        for op in [NextRound, StartHold, EndHold, EndRecovery, NextRound] {
            phase = next_phase(phase, op).unwrap();
        }
        assert_eq!(phase, SessionPhase::Breathing);
    }

    #[test]
    fn test_terminal_phases_reject_everything_but_repeat_complete() {
        for op in Operation::ALL {
            assert!(next_phase(SessionPhase::Cancelled, op).is_err());
        }
        for op in Operation::ALL {
            let result = next_phase(SessionPhase::Completed, op);
            if op == Operation::Complete {
                assert_eq!(result.unwrap(), SessionPhase::Completed);
            } else {
                assert!(result.is_err());
            }
        }
    }

    #[test]
    fn test_cancel_only_from_in_progress() {
        assert_eq!(Operation::Cancel.allowed_from(), vec![SessionPhase::InProgress]);
    }

    #[test]
    fn test_table_counts() {
        let count = |op: Operation| op.allowed_from().len();
        assert_eq!(count(Operation::StartHold), 2);
        assert_eq!(count(Operation::EndHold), 1);
        assert_eq!(count(Operation::StartRecovery), 1);
        assert_eq!(count(Operation::EndRecovery), 1);
        assert_eq!(count(Operation::NextRound), 2);
        assert_eq!(count(Operation::Complete), 5);
        assert_eq!(count(Operation::Cancel), 1);
    }

    #[test]
    fn test_rejection_carries_operation_and_phase() {
        let err = next_phase(SessionPhase::Breathing, Operation::EndHold).unwrap_err();
        match err {
            crate::error::BreathworkError::InvalidPhaseTransition { operation, phase } => {
                assert_eq!(operation, Operation::EndHold);
                assert_eq!(phase, SessionPhase::Breathing);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_phase_serde_names() {
        let json = serde_json::to_string(&SessionPhase::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        for phase in SessionPhase::ALL {
            let json = serde_json::to_string(&phase).unwrap();
            assert_eq!(json, format!("\"{}\"", phase));
        }
    }
}
