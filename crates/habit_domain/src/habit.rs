use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::{error::ValidationError, streak::StreakRule};

pub const MAX_NAME_CHARS: usize = 50;

/// One tracked behaviour. `streak` and `total_completions` are derived from
/// `completions` and are only ever written by [`Habit::refresh`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completions: Vec<Completion>,
    #[serde(default)]
    pub streak: u32,
    #[serde(default)]
    pub total_completions: u32,
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Completion {
    pub date: DateTime<Utc>,
    #[serde(default = "completed_default")]
    pub completed: bool,
}

fn completed_default() -> bool {
    true
}

impl Completion {
    pub fn at<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
        Self {
            date: instant.with_timezone(&Utc),
            completed: true,
        }
    }

    /// Calendar day of this completion as seen from `zone`.
    pub fn day_in<Tz: TimeZone>(&self, zone: &Tz) -> NaiveDate {
        self.date.with_timezone(zone).date_naive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToggleOutcome {
    Completed,
    Uncompleted,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: None,
            avatar: None,
        }
    }
}

impl Habit {
    pub(crate) fn new(
        id: String,
        name: String,
        created_at: DateTime<Utc>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name,
            created_at,
            completions: Vec::new(),
            streak: 0,
            total_completions: 0,
            user_id: user_id.into(),
        }
    }

    pub fn completed_on<Tz: TimeZone>(&self, day: NaiveDate, zone: &Tz) -> bool {
        self.completion_index_on(day, zone).is_some()
    }

    fn completion_index_on<Tz: TimeZone>(&self, day: NaiveDate, zone: &Tz) -> Option<usize> {
        self.completions
            .iter()
            .position(|completion| completion.day_in(zone) == day)
    }

    /// Adds a completion for the reference day, or removes the existing one.
    pub fn toggle_completion<Tz: TimeZone>(
        &mut self,
        reference: &DateTime<Tz>,
        rule: StreakRule,
    ) -> ToggleOutcome {
        let zone = reference.timezone();
        let today = reference.date_naive();
        let outcome = match self.completion_index_on(today, &zone) {
            Some(index) => {
                self.completions.remove(index);
                ToggleOutcome::Uncompleted
            }
            None => {
                self.completions.push(Completion::at(reference));
                ToggleOutcome::Completed
            }
        };
        self.refresh(reference, rule);
        outcome
    }

    /// Recomputes every derived field from `completions`.
    pub fn refresh<Tz: TimeZone>(&mut self, reference: &DateTime<Tz>, rule: StreakRule) {
        self.total_completions = u32::try_from(self.completions.len()).unwrap_or(u32::MAX);
        self.streak = rule.compute(&self.completions, reference);
    }
}

/// Trims `name` and checks it against the naming rules for `owner_id`.
pub fn validate_name(
    name: &str,
    owner_id: &str,
    existing: &[Habit],
) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    // Measured in UTF-16 code units, as browser string length is.
    let length = name.encode_utf16().count();
    if length > MAX_NAME_CHARS {
        return Err(ValidationError::NameTooLong {
            length,
            max: MAX_NAME_CHARS,
        });
    }
    let lowered = name.to_lowercase();
    if existing
        .iter()
        .filter(|habit| habit.user_id == owner_id)
        .any(|habit| habit.name.to_lowercase() == lowered)
    {
        return Err(ValidationError::DuplicateName(name.to_string()));
    }
    Ok(name.to_string())
}
