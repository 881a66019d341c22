//! Human-readable unlock times for locked token milestones.

use crate::accounts::models::NetworkStats;
use chrono::{DateTime, TimeDelta, Utc};

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 60 * SECONDS_PER_MINUTE;
const SECONDS_PER_DAY: i64 = 24 * SECONDS_PER_HOUR;

/// When a milestone unlocks, relative to `now` and as a calendar date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnlockDate {
    /// `"Unlockable"` or `"in N days|hours|minutes"`.
    pub text: String,
    /// `"(Mon DD, YYYY)"`, empty once unlockable.
    pub date: String,
}

impl UnlockDate {
    /// Text and date joined for display.
    #[must_use]
    pub fn display(&self) -> String {
        format!("{} {}", self.text, self.date).trim().to_string()
    }
}

/// Epochs left before `milestone_epoch`, zero when it has passed or is unset.
#[must_use]
pub fn remaining_epochs(milestone_epoch: u64, current_epoch: u64) -> u64 {
    if milestone_epoch == 0 {
        return 0;
    }
    milestone_epoch.saturating_sub(current_epoch)
}

/// Converts a remaining-epoch count into an unlock time.
///
/// The time left is the remaining epochs' rounds minus the rounds already passed in the
/// current epoch, at the network's round duration.
#[must_use]
pub fn calc_unlock_date(remaining_epochs: u64, stats: &NetworkStats, now: DateTime<Utc>) -> UnlockDate {
    if remaining_epochs == 0 {
        return UnlockDate { text: "Unlockable".to_string(), date: String::new() };
    }

    let total_rounds = remaining_epochs.saturating_mul(stats.rounds_per_epoch);
    let rounds_left = total_rounds.saturating_sub(stats.rounds_passed);
    let millis_left = rounds_left.saturating_mul(stats.refresh_rate);
    let seconds_left = i64::try_from(millis_left / 1_000).unwrap_or(i64::MAX);

    let unlocks_at = TimeDelta::try_seconds(seconds_left)
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);

    UnlockDate { text: relative_text(seconds_left), date: unlocks_at.format("(%b %d, %Y)").to_string() }
}

fn relative_text(seconds: i64) -> String {
    let (count, unit) = if seconds >= SECONDS_PER_DAY {
        (seconds / SECONDS_PER_DAY, "day")
    } else if seconds >= SECONDS_PER_HOUR {
        (seconds / SECONDS_PER_HOUR, "hour")
    } else {
        ((seconds / SECONDS_PER_MINUTE).max(1), "minute")
    };
    let plural = if count == 1 { "" } else { "s" };
    format!("in {count} {unit}{plural}")
}
