use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::{error::UnknownStreakRule, habit::Completion};

/// How a completion history is turned into a streak length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StreakRule {
    /// Consecutive completed calendar days ending today, or ending yesterday
    /// while today is still open.
    #[default]
    TrailingRun,
    /// Newest-first scan with a day cursor that moves back one day per
    /// counted completion. A completion landing on the cursor right after the
    /// first counted day is skipped rather than ending the scan. Kept for
    /// parity with streak values written by earlier releases.
    CursorScan,
}

impl StreakRule {
    pub fn compute<Tz: TimeZone>(self, completions: &[Completion], reference: &DateTime<Tz>) -> u32 {
        match self {
            StreakRule::TrailingRun => trailing_run(completions, reference),
            StreakRule::CursorScan => cursor_scan(completions, reference),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StreakRule::TrailingRun => "trailing",
            StreakRule::CursorScan => "cursor-scan",
        }
    }
}

impl fmt::Display for StreakRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StreakRule {
    type Err = UnknownStreakRule;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "trailing" | "trailing-run" => Ok(StreakRule::TrailingRun),
            "cursor-scan" | "cursor" | "legacy" => Ok(StreakRule::CursorScan),
            other => Err(UnknownStreakRule(other.to_string())),
        }
    }
}

/// Streak under the default [`StreakRule`].
pub fn compute_streak<Tz: TimeZone>(completions: &[Completion], reference: &DateTime<Tz>) -> u32 {
    StreakRule::default().compute(completions, reference)
}

fn trailing_run<Tz: TimeZone>(completions: &[Completion], reference: &DateTime<Tz>) -> u32 {
    let zone = reference.timezone();
    let today = reference.date_naive();
    let days: BTreeSet<NaiveDate> = completions
        .iter()
        .map(|completion| completion.day_in(&zone))
        .collect();

    let mut cursor = if days.contains(&today) {
        today
    } else {
        match today.pred_opt() {
            Some(yesterday) => yesterday,
            None => return 0,
        }
    };

    let mut streak = 0;
    while days.contains(&cursor) {
        streak += 1;
        match cursor.pred_opt() {
            Some(previous) => cursor = previous,
            None => break,
        }
    }
    streak
}

fn cursor_scan<Tz: TimeZone>(completions: &[Completion], reference: &DateTime<Tz>) -> u32 {
    let zone = reference.timezone();
    let mut newest_first: Vec<&Completion> = completions.iter().collect();
    newest_first.sort_by(|a, b| b.date.cmp(&a.date));

    let mut cursor = reference.date_naive();
    let mut streak: i64 = 0;
    for completion in newest_first {
        let difference = cursor
            .signed_duration_since(completion.day_in(&zone))
            .num_days();
        if difference == streak {
            streak += 1;
            match cursor.pred_opt() {
                Some(previous) => cursor = previous,
                None => break,
            }
        } else if difference == streak - 1 && streak == 1 {
            continue;
        } else {
            break;
        }
    }
    u32::try_from(streak).unwrap_or(u32::MAX)
}
