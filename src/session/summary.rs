//! Practice statistics over a user's completed sessions.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use super::{format, BreathingSession, SessionPhase};

/// Totals over completed sessions, as shown on a user's dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PracticeStats {
    pub total_sessions: usize,
    /// `"<h>h <m>m"`.
    pub total_time: String,
    /// `"<m>m <s>s"`.
    pub average_session_duration: String,
    pub sessions_this_week: usize,
    pub sessions_this_month: usize,
}

impl PracticeStats {
    pub fn from_sessions(sessions: &[BreathingSession], now: DateTime<Utc>) -> Self {
        let completed: Vec<&BreathingSession> = sessions
            .iter()
            .filter(|s| s.phase() == SessionPhase::Completed)
            .collect();

        let timed: Vec<Duration> = completed.iter().filter_map(|s| s.actual_duration()).collect();
        let total: Duration = timed.iter().sum();
        let average = if timed.is_empty() {
            Duration::ZERO
        } else {
            total / timed.len() as u32
        };

        let completed_since = |cutoff: DateTime<Utc>| {
            completed
                .iter()
                .filter(|s| s.completed_at().is_some_and(|at| at >= cutoff))
                .count()
        };

        Self {
            total_sessions: completed.len(),
            total_time: format::hours_minutes(total.as_secs()),
            average_session_duration: format::minutes_seconds(average.as_secs()),
            sessions_this_week: completed_since(now - TimeDelta::days(7)),
            sessions_this_month: completed_since(now - TimeDelta::days(30)),
        }
    }
}
