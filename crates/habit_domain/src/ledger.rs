use std::sync::Arc;

use chrono::{DateTime, FixedOffset, TimeZone, Utc};

use crate::{
    clock::{Clock, IdGenerator, SystemClock, UuidGenerator},
    error::ValidationError,
    habit::{self, Completion, Habit},
    stats,
    streak::StreakRule,
};

/// Pure habit lifecycle and statistics. Holds no habits itself; callers own
/// the collection and persist it.
#[derive(Clone)]
pub struct HabitLedger {
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    streak_rule: StreakRule,
}

impl Default for HabitLedger {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock), Arc::new(UuidGenerator))
    }
}

impl HabitLedger {
    pub fn new(clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            clock,
            ids,
            streak_rule: StreakRule::default(),
        }
    }

    pub fn with_streak_rule(mut self, rule: StreakRule) -> Self {
        self.streak_rule = rule;
        self
    }

    pub fn streak_rule(&self) -> StreakRule {
        self.streak_rule
    }

    pub fn now(&self) -> DateTime<FixedOffset> {
        self.clock.now()
    }

    pub fn create(
        &self,
        name: &str,
        owner_id: &str,
        existing: &[Habit],
    ) -> Result<Habit, ValidationError> {
        let name = habit::validate_name(name, owner_id, existing)?;
        let created_at = self.clock.now().with_timezone(&Utc);
        Ok(Habit::new(self.ids.generate(), name, created_at, owner_id))
    }

    pub fn toggle_completion<Tz: TimeZone>(&self, habit: &Habit, reference: &DateTime<Tz>) -> Habit {
        let mut updated = habit.clone();
        updated.toggle_completion(reference, self.streak_rule);
        updated
    }

    pub fn compute_streak<Tz: TimeZone>(
        &self,
        completions: &[Completion],
        reference: &DateTime<Tz>,
    ) -> u32 {
        self.streak_rule.compute(completions, reference)
    }

    pub fn is_completed_today<Tz: TimeZone>(&self, habit: &Habit, reference: &DateTime<Tz>) -> bool {
        stats::is_completed_today(habit, reference)
    }

    pub fn completion_rate<Tz: TimeZone>(&self, habit: &Habit, reference: &DateTime<Tz>) -> u32 {
        stats::completion_rate(habit, reference)
    }

    pub fn delete(&self, habit_id: &str, habits: &[Habit]) -> Vec<Habit> {
        remove_habit(habit_id, habits)
    }
}

pub fn remove_habit(habit_id: &str, habits: &[Habit]) -> Vec<Habit> {
    habits
        .iter()
        .filter(|habit| habit.id != habit_id)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::Duration;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Sequence(AtomicUsize);

    impl IdGenerator for Sequence {
        fn generate(&self) -> String {
            format!("habit-{}", self.0.fetch_add(1, Ordering::SeqCst))
        }
    }

    fn start() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(9 * 3600)
            .unwrap()
            .with_ymd_and_hms(2025, 10, 20, 7, 30, 0)
            .unwrap()
    }

    fn ledger() -> (HabitLedger, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::new(start()));
        let ledger = HabitLedger::new(clock.clone(), Arc::new(Sequence(AtomicUsize::new(1))));
        (ledger, clock)
    }

    #[test]
    fn create_returns_a_fresh_habit() {
        let (ledger, _) = ledger();
        let habit = ledger.create("Meditate", "u1", &[]).unwrap();
        assert_eq!(habit.id, "habit-1");
        assert_eq!(habit.name, "Meditate");
        assert_eq!(habit.user_id, "u1");
        assert_eq!(habit.created_at, start().with_timezone(&Utc));
        assert!(habit.completions.is_empty());
        assert_eq!(habit.streak, 0);
        assert_eq!(habit.total_completions, 0);

        let second = ledger.create("Run", "u1", &[habit]).unwrap();
        assert_eq!(second.id, "habit-2");
    }

    #[test]
    fn create_rejects_invalid_names() {
        let (ledger, _) = ledger();
        let existing = vec![ledger.create("Meditate", "u1", &[]).unwrap()];
        assert_eq!(
            ledger.create("", "u1", &existing),
            Err(ValidationError::EmptyName)
        );
        assert!(matches!(
            ledger.create(&"a".repeat(51), "u1", &existing),
            Err(ValidationError::NameTooLong { .. })
        ));
        assert!(matches!(
            ledger.create("MEDITATE", "u1", &existing),
            Err(ValidationError::DuplicateName(_))
        ));
    }

    #[test]
    fn toggling_twice_on_the_same_day_restores_the_habit() {
        let (ledger, clock) = ledger();
        let original = ledger.create("Read", "u1", &[]).unwrap();
        let now = clock.now();

        let once = ledger.toggle_completion(&original, &now);
        assert_eq!(once.total_completions, 1);
        assert_eq!(once.streak, 1);
        assert!(ledger.is_completed_today(&once, &now));

        let later_same_day = now + Duration::hours(10);
        let twice = ledger.toggle_completion(&once, &later_same_day);
        assert_eq!(twice.completions, original.completions);
        assert_eq!(twice.total_completions, original.total_completions);
        assert_eq!(twice.streak, 0);
        assert!(!ledger.is_completed_today(&twice, &now));
    }

    #[test]
    fn toggling_keeps_other_days_untouched() {
        let (ledger, clock) = ledger();
        let mut habit = ledger.create("Read", "u1", &[]).unwrap();
        for _ in 0..3 {
            habit = ledger.toggle_completion(&habit, &clock.now());
            clock.advance(Duration::days(1));
        }
        assert_eq!(habit.total_completions, 3);

        let today = clock.now();
        let toggled = ledger.toggle_completion(&habit, &today);
        assert_eq!(toggled.total_completions, 4);
        assert_eq!(toggled.streak, 4);
        let untoggled = ledger.toggle_completion(&toggled, &today);
        assert_eq!(untoggled.completions, habit.completions);
        assert_eq!(untoggled.streak, 3);
    }

    #[test]
    fn streak_rule_is_applied_on_toggle() {
        let (ledger, clock) = ledger();
        let ledger = ledger.with_streak_rule(StreakRule::CursorScan);
        let mut habit = ledger.create("Read", "u1", &[]).unwrap();
        habit = ledger.toggle_completion(&habit, &clock.now());
        clock.advance(Duration::days(1));
        habit = ledger.toggle_completion(&habit, &clock.now());
        assert_eq!(habit.streak, 1);
        assert_eq!(ledger.compute_streak(&habit.completions, &clock.now()), 1);
        assert_eq!(
            StreakRule::TrailingRun.compute(&habit.completions, &clock.now()),
            2
        );
    }

    #[test]
    fn delete_removes_only_the_matching_id() {
        let (ledger, _) = ledger();
        let first = ledger.create("One", "u1", &[]).unwrap();
        let second = ledger.create("Two", "u1", &[first.clone()]).unwrap();
        let habits = vec![first.clone(), second.clone()];

        assert_eq!(ledger.delete("missing", &habits), habits);
        assert_eq!(ledger.delete(&first.id, &habits), vec![second]);
    }

    #[test]
    fn completion_rate_uses_creation_time() {
        let (ledger, clock) = ledger();
        let mut habit = ledger.create("Read", "u1", &[]).unwrap();
        habit = ledger.toggle_completion(&habit, &clock.now());
        clock.advance(Duration::days(1));
        habit = ledger.toggle_completion(&habit, &clock.now());
        clock.advance(Duration::days(2));
        assert_eq!(ledger.completion_rate(&habit, &clock.now()), 67);
    }
}
