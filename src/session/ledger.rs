//! Breathing session records.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{SessionId, SessionPhase};
use crate::account::UserId;
use crate::error::BreathworkError;
use crate::Result;

/// Breaths per round when the client does not choose.
pub const DEFAULT_BREATHS_PER_ROUND: u32 = 30;

/// Seconds per breath when the client does not choose.
pub const DEFAULT_BREATH_DURATION: f64 = 3.55;

/// Planned shape of a breathing session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSettings {
    /// Number of rounds planned.
    pub rounds: u32,
    /// Breaths in each round.
    pub breaths_per_round: u32,
    /// Seconds per breath.
    pub breath_duration: f64,
}

impl SessionSettings {
    /// Settings for `rounds` rounds with default pacing.
    pub fn new(rounds: u32) -> Self {
        Self {
            rounds,
            breaths_per_round: DEFAULT_BREATHS_PER_ROUND,
            breath_duration: DEFAULT_BREATH_DURATION,
        }
    }

    pub fn with_breaths_per_round(mut self, breaths: u32) -> Self {
        self.breaths_per_round = breaths;
        self
    }

    pub fn with_breath_duration(mut self, seconds: f64) -> Self {
        self.breath_duration = seconds;
        self
    }

    /// Reject zero counts, non-positive breath durations and plans too long
    /// to represent as a [`Duration`].
    pub fn validate(&self) -> Result<()> {
        validate_rounds(self.rounds)?;
        validate_breaths_per_round(self.breaths_per_round)?;
        validate_breath_duration(self.breath_duration)?;
        Duration::try_from_secs_f64(self.planned_seconds()).map_err(|_| {
            BreathworkError::invalid_field("breath_duration", "planned session is too long")
        })?;
        Ok(())
    }

    /// `rounds * breaths_per_round * breath_duration` seconds.
    ///
    /// Saturates at [`Duration::MAX`] for settings that fail [`Self::validate`].
    pub fn planned_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.planned_seconds()).unwrap_or(Duration::MAX)
    }

    fn planned_seconds(&self) -> f64 {
        f64::from(self.rounds) * f64::from(self.breaths_per_round) * self.breath_duration
    }
}

fn validate_rounds(rounds: u32) -> Result<()> {
    if rounds == 0 {
        return Err(BreathworkError::invalid_field("rounds", "must be at least 1"));
    }
    Ok(())
}

fn validate_breaths_per_round(breaths: u32) -> Result<()> {
    if breaths == 0 {
        return Err(BreathworkError::invalid_field(
            "breaths_per_round",
            "must be at least 1",
        ));
    }
    Ok(())
}

fn validate_breath_duration(seconds: f64) -> Result<()> {
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(BreathworkError::invalid_field(
            "breath_duration",
            "must be a positive number of seconds",
        ));
    }
    Ok(())
}

/// Hold and recovery seconds recorded for one round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundTimes {
    #[serde(default)]
    pub hold: f64,
    #[serde(default)]
    pub recovery: f64,
}

/// Optional physiological notes attached to a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionStats {
    pub avg_heart_rate: Option<u32>,
    pub max_heart_rate: Option<u32>,
    pub min_heart_rate: Option<u32>,
    /// Self-reported stress before the session (1-10).
    pub stress_level_before: Option<u32>,
    /// Self-reported stress after the session (1-10).
    pub stress_level_after: Option<u32>,
    pub mood_before: Option<String>,
    pub mood_after: Option<String>,
}

impl SessionStats {
    pub fn validate(&self) -> Result<()> {
        for (field, level) in [
            ("stress_level_before", self.stress_level_before),
            ("stress_level_after", self.stress_level_after),
        ] {
            if let Some(level) = level {
                if !(1..=10).contains(&level) {
                    return Err(BreathworkError::invalid_field(field, "must be between 1 and 10"));
                }
            }
        }
        Ok(())
    }

    /// Overwrite every field that `other` sets.
    pub fn merge(&mut self, other: SessionStats) {
        if other.avg_heart_rate.is_some() {
            self.avg_heart_rate = other.avg_heart_rate;
        }
        if other.max_heart_rate.is_some() {
            self.max_heart_rate = other.max_heart_rate;
        }
        if other.min_heart_rate.is_some() {
            self.min_heart_rate = other.min_heart_rate;
        }
        if other.stress_level_before.is_some() {
            self.stress_level_before = other.stress_level_before;
        }
        if other.stress_level_after.is_some() {
            self.stress_level_after = other.stress_level_after;
        }
        if other.mood_before.is_some() {
            self.mood_before = other.mood_before;
        }
        if other.mood_after.is_some() {
            self.mood_after = other.mood_after;
        }
    }
}

/// Field edits accepted after creation.
///
/// The phase is absent: it only moves through lifecycle operations.
#[derive(Debug, Clone, Default)]
pub struct SessionUpdate {
    pub rounds: Option<u32>,
    pub breaths_per_round: Option<u32>,
    pub breath_duration: Option<f64>,
    pub notes: Option<String>,
    pub stats: Option<SessionStats>,
}

/// A breathing session as held in the ledger.
#[derive(Debug, Clone)]
pub struct BreathingSession {
    pub(super) id: SessionId,
    pub(super) owner: UserId,
    pub(super) settings: SessionSettings,
    pub(super) started_at: DateTime<Utc>,
    pub(super) completed_at: Option<DateTime<Utc>>,
    pub(super) planned_duration: Duration,
    pub(super) actual_duration: Option<Duration>,
    pub(super) hold_times: Vec<RoundTimes>,
    pub(super) phase: SessionPhase,
    pub(super) notes: String,
    pub(super) stats: Option<SessionStats>,
}

impl BreathingSession {
    /// Start a session now. The planned duration is fixed here.
    pub fn new(id: SessionId, owner: UserId, settings: SessionSettings) -> Self {
        Self::started_at(id, owner, settings, Utc::now())
    }

    /// Start a session at an explicit instant.
    pub fn started_at(
        id: SessionId,
        owner: UserId,
        settings: SessionSettings,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner,
            planned_duration: settings.planned_duration(),
            settings,
            started_at,
            completed_at: None,
            actual_duration: None,
            hold_times: Vec::new(),
            phase: SessionPhase::InProgress,
            notes: String::new(),
            stats: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_stats(mut self, stats: SessionStats) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn owner(&self) -> UserId {
        self.owner
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn started(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn planned_duration(&self) -> Duration {
        self.planned_duration
    }

    pub fn actual_duration(&self) -> Option<Duration> {
        self.actual_duration
    }

    pub fn hold_times(&self) -> &[RoundTimes] {
        &self.hold_times
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn stats(&self) -> Option<&SessionStats> {
        self.stats.as_ref()
    }

    /// Apply field edits. Everything is validated before anything changes.
    ///
    /// The planned duration stays as computed at creation.
    pub fn apply_update(&mut self, update: SessionUpdate) -> Result<()> {
        let mut settings = self.settings;
        if let Some(rounds) = update.rounds {
            settings.rounds = rounds;
        }
        if let Some(breaths) = update.breaths_per_round {
            settings.breaths_per_round = breaths;
        }
        if let Some(seconds) = update.breath_duration {
            settings.breath_duration = seconds;
        }
        settings.validate()?;
        if let Some(ref stats) = update.stats {
            stats.validate()?;
        }

        self.settings = settings;
        if let Some(notes) = update.notes {
            self.notes = notes;
        }
        if let Some(stats) = update.stats {
            match self.stats {
                Some(ref mut existing) => existing.merge(stats),
                None => self.stats = Some(stats),
            }
        }
        Ok(())
    }

    /// Actual duration once completed, otherwise the planned one.
    pub fn effective_duration(&self) -> Duration {
        self.actual_duration.unwrap_or(self.planned_duration)
    }

    /// Effective duration as `"<minutes>m <seconds>s"`.
    pub fn duration_formatted(&self) -> String {
        super::format::minutes_seconds(self.effective_duration().as_secs())
    }

    /// Sum of all recorded holds, in seconds.
    pub fn total_hold_time(&self) -> f64 {
        self.hold_times.iter().map(|t| t.hold).sum()
    }

    /// Mean of the strictly positive holds, or 0.
    ///
    /// A genuine zero-second hold cannot be told apart from an unset round,
    /// so zeros are left out of the mean.
    pub fn average_hold_time(&self) -> f64 {
        let positive: Vec<f64> = self
            .hold_times
            .iter()
            .map(|t| t.hold)
            .filter(|hold| *hold > 0.0)
            .collect();

        if positive.is_empty() {
            0.0
        } else {
            positive.iter().sum::<f64>() / positive.len() as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(settings: SessionSettings) -> BreathingSession {
        BreathingSession::new(SessionId::new(), UserId::from_raw(1), settings)
    }

    fn with_holds(holds: &[f64]) -> BreathingSession {
        let mut s = session(SessionSettings::new(holds.len() as u32));
        s.hold_times = holds
            .iter()
            .map(|&hold| RoundTimes { hold, recovery: 0.0 })
            .collect();
        s
    }

    #[test]
    fn test_defaults() {
        let settings = SessionSettings::new(3);
        assert_eq!(settings.breaths_per_round, 30);
        assert_eq!(settings.breath_duration, 3.55);
    }

    #[test]
    fn test_planned_duration() {
        let s = session(SessionSettings::new(3));
        assert!((s.planned_duration().as_secs_f64() - 319.5).abs() < 1e-6);
        assert_eq!(s.phase(), SessionPhase::InProgress);
        assert!(s.completed_at().is_none());
        assert!(s.actual_duration().is_none());
    }

    #[test]
    fn test_planned_duration_custom_pacing() {
        let settings = SessionSettings::new(4)
            .with_breaths_per_round(40)
            .with_breath_duration(2.0);
        assert_eq!(settings.planned_duration(), Duration::from_secs(320));
    }

    #[test]
    fn test_oversized_plan_rejected() {
        let huge = SessionSettings::new(1).with_breath_duration(1e300);
        assert!(matches!(
            huge.validate(),
            Err(BreathworkError::InvalidField { field: "breath_duration", .. })
        ));
        assert_eq!(huge.planned_duration(), Duration::MAX);

        let widest = SessionSettings::new(u32::MAX).with_breaths_per_round(u32::MAX);
        assert!(widest.validate().is_err());

        let mut s = session(SessionSettings::new(3));
        assert!(s
            .apply_update(SessionUpdate {
                breath_duration: Some(1e300),
                ..SessionUpdate::default()
            })
            .is_err());
        assert_eq!(s.settings().breath_duration, 3.55);
    }

    #[test]
    fn test_planned_duration_survives_edits() {
        let mut s = session(SessionSettings::new(3));
        let planned = s.planned_duration();

        s.apply_update(SessionUpdate {
            rounds: Some(10),
            breaths_per_round: Some(50),
            breath_duration: Some(5.0),
            ..SessionUpdate::default()
        })
        .unwrap();

        assert_eq!(s.settings().rounds, 10);
        assert_eq!(s.settings().breaths_per_round, 50);
        assert_eq!(s.planned_duration(), planned);
    }

    #[test]
    fn test_invalid_settings() {
        assert!(SessionSettings::new(0).validate().is_err());
        assert!(SessionSettings::new(1).with_breaths_per_round(0).validate().is_err());
        assert!(SessionSettings::new(1).with_breath_duration(0.0).validate().is_err());
        assert!(SessionSettings::new(1)
            .with_breath_duration(f64::NAN)
            .validate()
            .is_err());
        assert!(SessionSettings::new(1).validate().is_ok());
    }

    #[test]
    fn test_rejected_update_changes_nothing() {
        let mut s = session(SessionSettings::new(3));
        let result = s.apply_update(SessionUpdate {
            rounds: Some(5),
            breath_duration: Some(-1.0),
            notes: Some("changed".into()),
            ..SessionUpdate::default()
        });

        assert!(result.is_err());
        assert_eq!(s.settings().rounds, 3);
        assert_eq!(s.notes(), "");
    }

    #[test]
    fn test_stats_merge() {
        let mut s = session(SessionSettings::new(1)).with_stats(SessionStats {
            stress_level_before: Some(7),
            mood_before: Some("tense".into()),
            ..SessionStats::default()
        });

        s.apply_update(SessionUpdate {
            stats: Some(SessionStats {
                stress_level_after: Some(3),
                mood_after: Some("calm".into()),
                ..SessionStats::default()
            }),
            ..SessionUpdate::default()
        })
        .unwrap();

        let stats = s.stats().unwrap();
        assert_eq!(stats.stress_level_before, Some(7));
        assert_eq!(stats.stress_level_after, Some(3));
        assert_eq!(stats.mood_before.as_deref(), Some("tense"));
        assert_eq!(stats.mood_after.as_deref(), Some("calm"));
    }

    #[test]
    fn test_stress_level_range() {
        let stats = SessionStats {
            stress_level_after: Some(11),
            ..SessionStats::default()
        };
        assert!(stats.validate().is_err());
        assert!(SessionStats::default().validate().is_ok());
    }

    #[test]
    fn test_average_hold_time_skips_zeros() {
        let s = with_holds(&[0.0, 60.0, 0.0, 120.0]);
        assert_eq!(s.average_hold_time(), 90.0);
        assert_eq!(s.total_hold_time(), 180.0);
    }

    #[test]
    fn test_hold_aggregates_empty() {
        let s = with_holds(&[]);
        assert_eq!(s.average_hold_time(), 0.0);
        assert_eq!(s.total_hold_time(), 0.0);
    }

    #[test]
    fn test_duration_formatted_uses_planned_until_completed() {
        let mut s = session(SessionSettings::new(3));
        assert_eq!(s.duration_formatted(), "5m 19s");

        s.actual_duration = Some(Duration::from_secs(125));
        assert_eq!(s.duration_formatted(), "2m 5s");
    }
}
