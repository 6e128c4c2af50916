use thiserror::Error;

/// Rejections surfaced to the user when a habit cannot be created. The
/// display text is the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a habit name")]
    EmptyName,
    #[error("Habit name is too long (max {max} characters)")]
    NameTooLong { length: usize, max: usize },
    #[error("This habit already exists")]
    DuplicateName(String),
}

#[derive(Debug, Error)]
pub enum HabitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("no user is signed in")]
    NotSignedIn,
    #[error("unknown habit `{0}`")]
    UnknownHabit(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown streak rule `{0}` (expected `trailing` or `cursor-scan`)")]
pub struct UnknownStreakRule(pub String);
