pub mod clock;
pub mod error;
pub mod export;
pub mod habit;
pub mod ledger;
pub mod notifications;
pub mod service;
pub mod stats;
pub mod streak;

pub use crate::clock::{Clock, FixedClock, IdGenerator, SystemClock, UuidGenerator};
pub use crate::error::{HabitError, UnknownStreakRule, ValidationError};
pub use crate::habit::{Completion, Habit, ToggleOutcome, User, MAX_NAME_CHARS};
pub use crate::ledger::HabitLedger;
pub use crate::service::{HabitService, HabitServiceBuilder};
pub use crate::streak::{compute_streak, StreakRule};
