use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::habit::Habit;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Longest history strip rendered; larger requests are cut to this.
pub const MAX_HISTORY_DAYS: usize = 3660;

pub fn is_completed_today<Tz: TimeZone>(habit: &Habit, reference: &DateTime<Tz>) -> bool {
    habit.completed_on(reference.date_naive(), &reference.timezone())
}

/// `total_completions` over the days elapsed since creation (rounded up,
/// at least one), as a whole percentage. Not clamped at 100.
pub fn completion_rate<Tz: TimeZone>(habit: &Habit, reference: &DateTime<Tz>) -> u32 {
    let elapsed = (reference.with_timezone(&Utc) - habit.created_at).num_milliseconds();
    let days = ceil_div(elapsed, MILLIS_PER_DAY).max(1);
    percentage(u64::from(habit.total_completions), days.unsigned_abs())
}

/// Share of the owner's habits completed on the reference day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_habits: usize,
    pub completed_today: usize,
    pub completion_rate: u32,
}

impl DashboardStats {
    pub fn from_habits<Tz: TimeZone>(habits: &[Habit], reference: &DateTime<Tz>) -> Self {
        let total_habits = habits.len();
        let completed_today = habits
            .iter()
            .filter(|habit| is_completed_today(habit, reference))
            .count();
        let completion_rate = if total_habits == 0 {
            0
        } else {
            percentage(completed_today as u64, total_habits as u64)
        };
        Self {
            total_habits,
            completed_today,
            completion_rate,
        }
    }
}

/// Everything a renderer needs to draw one habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitCard {
    pub id: String,
    pub name: String,
    pub streak: u32,
    pub total_completions: u32,
    pub completion_rate: u32,
    pub completed_today: bool,
}

impl HabitCard {
    pub fn from_habit<Tz: TimeZone>(habit: &Habit, reference: &DateTime<Tz>) -> Self {
        Self {
            id: habit.id.clone(),
            name: habit.name.clone(),
            streak: habit.streak,
            total_completions: habit.total_completions,
            completion_rate: completion_rate(habit, reference),
            completed_today: is_completed_today(habit, reference),
        }
    }
}

/// One character per day for the `days` days ending on the reference day,
/// oldest first: `X` completed, `.` missed, `_` before the habit existed.
/// At most [`MAX_HISTORY_DAYS`] cells are produced.
pub fn history_strip<Tz: TimeZone>(habit: &Habit, days: usize, reference: &DateTime<Tz>) -> String {
    let days = days.min(MAX_HISTORY_DAYS);
    let zone = reference.timezone();
    let today = reference.date_naive();
    let created = habit.created_at.with_timezone(&zone).date_naive();

    let mut strip = String::with_capacity(days);
    for offset in (0..days).rev() {
        let Some(day) = today.checked_sub_signed(Duration::days(offset as i64)) else {
            strip.push('_');
            continue;
        };
        let cell = if habit.completed_on(day, &zone) {
            'X'
        } else if day >= created {
            '.'
        } else {
            '_'
        };
        strip.push(cell);
    }
    strip
}

fn ceil_div(numerator: i64, denominator: i64) -> i64 {
    let quotient = numerator / denominator;
    if numerator % denominator > 0 {
        quotient + 1
    } else {
        quotient
    }
}

/// `round(part / whole * 100)` with halves rounded up.
fn percentage(part: u64, whole: u64) -> u32 {
    let ratio = part as f64 / whole as f64 * 100.0;
    let rounded = (ratio + 0.5).floor();
    if rounded >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        rounded as u32
    }
}
