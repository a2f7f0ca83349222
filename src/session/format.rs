//! Human-readable duration strings.

use serde::Serialize;

use super::RoundTimes;

/// `"<minutes>m <seconds>s"`.
pub fn minutes_seconds(total_seconds: u64) -> String {
    format!("{}m {}s", total_seconds / 60, total_seconds % 60)
}

/// `"<hours>h <minutes>m <seconds>s"`.
pub fn hours_minutes_seconds(total_seconds: u64) -> String {
    format!(
        "{}h {}m {}s",
        total_seconds / 3600,
        (total_seconds % 3600) / 60,
        total_seconds % 60
    )
}

/// `"<hours>h <minutes>m"`.
pub fn hours_minutes(total_seconds: u64) -> String {
    format!("{}h {}m", total_seconds / 3600, (total_seconds % 3600) / 60)
}

/// Like [`minutes_seconds`] but `"0s"` when nothing was held.
pub fn hold(seconds: f64) -> String {
    let whole = whole_seconds(seconds);
    if whole > 0 {
        minutes_seconds(whole)
    } else {
        "0s".to_string()
    }
}

/// Like [`minutes_seconds`] but empty when no recovery was recorded.
pub fn recovery(seconds: f64) -> String {
    let whole = whole_seconds(seconds);
    if whole > 0 {
        minutes_seconds(whole)
    } else {
        String::new()
    }
}

/// Truncate fractional seconds; negatives and NaN count as zero.
pub fn whole_seconds(seconds: f64) -> u64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    }
}

/// One round of hold telemetry ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedRound {
    /// 1-based round number.
    pub round: usize,
    pub hold: String,
    pub recovery: String,
    pub hold_seconds: f64,
    pub recovery_seconds: f64,
}

pub fn rounds(hold_times: &[RoundTimes]) -> Vec<FormattedRound> {
    hold_times
        .iter()
        .enumerate()
        .map(|(i, t)| FormattedRound {
            round: i + 1,
            hold: hold(t.hold),
            recovery: recovery(t.recovery),
            hold_seconds: t.hold,
            recovery_seconds: t.recovery,
        })
        .collect()
}
