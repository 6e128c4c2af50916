use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use habit_store::{KeyValueStore, Storage, CURRENT_USER_KEY, HABITS_KEY};
use parking_lot::RwLock;

use crate::{
    clock::{Clock, IdGenerator, SystemClock, UuidGenerator},
    error::HabitError,
    export::ExportBundle,
    habit::{Habit, ToggleOutcome, User},
    ledger::{remove_habit, HabitLedger},
    notifications::{Notice, Notifier},
    stats::{self, DashboardStats, HabitCard},
    streak::StreakRule,
};

/// Session object for one signed-in user: owns the loaded habit collection
/// and writes it back to storage after every change.
pub struct HabitService {
    storage: Storage,
    ledger: HabitLedger,
    habits: RwLock<Vec<Habit>>,
    current_user: RwLock<Option<User>>,
    notification_sink: Option<Box<dyn Notifier>>,
}

pub struct HabitServiceBuilder {
    storage: Option<Storage>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    streak_rule: StreakRule,
    user: Option<User>,
    notification_sink: Option<Box<dyn Notifier>>,
}

impl Default for HabitServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HabitServiceBuilder {
    pub fn new() -> Self {
        Self {
            storage: None,
            clock: Arc::new(SystemClock),
            ids: Arc::new(UuidGenerator),
            streak_rule: StreakRule::default(),
            user: None,
            notification_sink: None,
        }
    }

    pub fn with_store(self, store: Arc<dyn KeyValueStore>) -> Self {
        self.with_storage(Storage::new(store))
    }

    pub fn with_storage(mut self, storage: Storage) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_streak_rule(mut self, rule: StreakRule) -> Self {
        self.streak_rule = rule;
        self
    }

    /// Signs `user` in when the service is built, replacing any stored user.
    pub fn with_user(mut self, user: User) -> Self {
        self.user = Some(user);
        self
    }

    pub fn with_notification_sink(mut self, sink: Box<dyn Notifier>) -> Self {
        self.notification_sink = Some(sink);
        self
    }

    pub fn build(self) -> Result<HabitService> {
        let storage = self.storage.unwrap_or_else(Storage::in_memory);
        let ledger = HabitLedger::new(self.clock, self.ids).with_streak_rule(self.streak_rule);

        let now = ledger.now();
        let mut habits: Vec<Habit> = storage.get(HABITS_KEY, Vec::new());
        for habit in &mut habits {
            habit.refresh(&now, ledger.streak_rule());
        }
        tracing::debug!(count = habits.len(), rule = %ledger.streak_rule(), "loaded habits");

        let current_user = match self.user {
            Some(user) => {
                if !storage.set(CURRENT_USER_KEY, &user) {
                    tracing::warn!(user = %user.id, "signed-in user was not persisted");
                }
                Some(user)
            }
            None => storage.get(CURRENT_USER_KEY, None),
        };

        Ok(HabitService {
            storage,
            ledger,
            habits: RwLock::new(habits),
            current_user: RwLock::new(current_user),
            notification_sink: self.notification_sink,
        })
    }
}

impl HabitService {
    pub fn builder() -> HabitServiceBuilder {
        HabitServiceBuilder::new()
    }

    pub fn ledger(&self) -> &HabitLedger {
        &self.ledger
    }

    pub fn current_user(&self) -> Option<User> {
        self.current_user.read().clone()
    }

    pub fn sign_in(&self, user: User) -> bool {
        let saved = self.storage.set(CURRENT_USER_KEY, &user);
        *self.current_user.write() = Some(user);
        saved
    }

    pub fn sign_out(&self) -> bool {
        let removed = self.storage.remove(CURRENT_USER_KEY);
        *self.current_user.write() = None;
        if removed {
            self.notify(Notice::success("Logged out successfully"));
        }
        removed
    }

    pub fn add_habit(&self, name: &str) -> Result<Habit, HabitError> {
        let owner = self.require_user()?;
        let mut habits = self.habits.write();
        let habit = match self.ledger.create(name, &owner.id, &habits) {
            Ok(habit) => habit,
            Err(err) => {
                tracing::debug!(%err, "habit rejected");
                self.notify(Notice::error(err.to_string()));
                return Err(err.into());
            }
        };
        habits.push(habit.clone());
        tracing::info!(id = %habit.id, name = %habit.name, "habit added");
        self.save(&habits);
        self.notify(Notice::success("Habit added successfully!"));
        Ok(habit)
    }

    pub fn toggle_habit(&self, habit_id: &str) -> Result<ToggleOutcome, HabitError> {
        let owner = self.require_user()?;
        let now = self.ledger.now();
        let mut habits = self.habits.write();
        let habit = habits
            .iter_mut()
            .find(|habit| habit.id == habit_id && habit.user_id == owner.id)
            .ok_or_else(|| HabitError::UnknownHabit(habit_id.to_string()))?;

        let outcome = habit.toggle_completion(&now, self.ledger.streak_rule());
        tracing::info!(id = %habit.id, ?outcome, streak = habit.streak, "habit toggled");
        self.save(&habits);
        self.notify(match outcome {
            ToggleOutcome::Completed => Notice::success("Great job! Habit completed!"),
            ToggleOutcome::Uncompleted => Notice::warning("Habit marked as incomplete"),
        });
        Ok(outcome)
    }

    /// Removes the habit if the signed-in user owns it. Returns whether
    /// anything was removed.
    pub fn delete_habit(&self, habit_id: &str) -> Result<bool, HabitError> {
        let owner = self.require_user()?;
        let mut habits = self.habits.write();
        if !habits
            .iter()
            .any(|habit| habit.id == habit_id && habit.user_id == owner.id)
        {
            tracing::debug!(id = habit_id, "nothing to delete");
            return Ok(false);
        }
        *habits = remove_habit(habit_id, &habits);
        tracing::info!(id = habit_id, "habit deleted");
        self.save(&habits);
        self.notify(Notice::success("Habit deleted successfully"));
        Ok(true)
    }

    /// Habits owned by the signed-in user, in insertion order.
    pub fn habits(&self) -> Vec<Habit> {
        let Some(owner) = self.current_user() else {
            return Vec::new();
        };
        self.habits
            .read()
            .iter()
            .filter(|habit| habit.user_id == owner.id)
            .cloned()
            .collect()
    }

    pub fn habit(&self, habit_id: &str) -> Option<Habit> {
        self.habits().into_iter().find(|habit| habit.id == habit_id)
    }

    pub fn cards(&self) -> Vec<HabitCard> {
        let now = self.ledger.now();
        self.habits()
            .iter()
            .map(|habit| HabitCard::from_habit(habit, &now))
            .collect()
    }

    pub fn stats(&self) -> DashboardStats {
        DashboardStats::from_habits(&self.habits(), &self.ledger.now())
    }

    pub fn history(&self, habit_id: &str, days: usize) -> Result<String, HabitError> {
        let habit = self
            .habit(habit_id)
            .ok_or_else(|| HabitError::UnknownHabit(habit_id.to_string()))?;
        Ok(stats::history_strip(&habit, days, &self.ledger.now()))
    }

    pub fn export_bundle(&self) -> ExportBundle {
        ExportBundle::new(
            self.habits(),
            self.current_user(),
            self.ledger.now().with_timezone(&Utc),
        )
    }

    pub fn export_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let path = self.export_bundle().write_to(dir)?;
        self.notify(Notice::success("Data exported successfully!"));
        Ok(path)
    }
}

impl HabitService {
    fn require_user(&self) -> Result<User, HabitError> {
        self.current_user().ok_or(HabitError::NotSignedIn)
    }

    /// A failed save leaves the in-memory change in place.
    fn save(&self, habits: &[Habit]) -> bool {
        let saved = self.storage.set(HABITS_KEY, habits);
        if !saved {
            tracing::warn!(count = habits.len(), "habit changes were not persisted");
            self.notify(Notice::warning(
                "Changes could not be saved and will be lost on restart",
            ));
        }
        saved
    }

    fn notify(&self, notice: Notice) {
        if let Some(sink) = &self.notification_sink {
            sink.notify(notice);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{clock::FixedClock, notifications::NoticeLevel};
    use chrono::{DateTime, Duration, FixedOffset, TimeZone};
    use habit_store::MemoryStore;
    use parking_lot::Mutex;

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<Notice>>>);

    impl Notifier for Recorder {
        fn notify(&self, notice: Notice) {
            self.0.lock().push(notice);
        }
    }

    impl Recorder {
        fn last(&self) -> Option<Notice> {
            self.0.lock().last().cloned()
        }
    }

    fn start() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2025, 5, 5, 12, 0, 0)
            .unwrap()
    }

    fn service_with(store: Arc<MemoryStore>) -> (HabitService, Arc<FixedClock>, Recorder) {
        let clock = Arc::new(FixedClock::new(start()));
        let recorder = Recorder::default();
        let service = HabitService::builder()
            .with_store(store)
            .with_clock(clock.clone())
            .with_user(User::new("u1", "Ada"))
            .with_notification_sink(Box::new(recorder.clone()))
            .build()
            .unwrap();
        (service, clock, recorder)
    }

    #[test]
    fn add_habit_requires_a_user() {
        let service = HabitService::builder().build().unwrap();
        assert!(matches!(
            service.add_habit("Walk"),
            Err(HabitError::NotSignedIn)
        ));
        assert!(service.habits().is_empty());
    }

    #[test]
    fn rejected_names_notify_and_leave_collection_alone() {
        let (service, _, recorder) = service_with(Arc::new(MemoryStore::new()));
        service.add_habit("Walk").unwrap();
        let err = service.add_habit("walk").unwrap_err();
        assert_eq!(err.to_string(), "This habit already exists");
        assert_eq!(
            recorder.last(),
            Some(Notice::error("This habit already exists"))
        );
        assert_eq!(service.habits().len(), 1);
    }

    #[test]
    fn toggle_updates_stats_and_persists() {
        let store = Arc::new(MemoryStore::new());
        let (service, _, recorder) = service_with(store.clone());
        let walk = service.add_habit("Walk").unwrap();
        service.add_habit("Read").unwrap();

        assert_eq!(
            service.toggle_habit(&walk.id).unwrap(),
            ToggleOutcome::Completed
        );
        assert_eq!(recorder.last().map(|n| n.level), Some(NoticeLevel::Success));
        let stats = service.stats();
        assert_eq!(stats.total_habits, 2);
        assert_eq!(stats.completed_today, 1);
        assert_eq!(stats.completion_rate, 50);

        let stored: Vec<Habit> = Storage::new(store).get(HABITS_KEY, Vec::new());
        assert_eq!(stored[0].total_completions, 1);
        assert_eq!(stored[0].streak, 1);

        assert_eq!(
            service.toggle_habit(&walk.id).unwrap(),
            ToggleOutcome::Uncompleted
        );
        assert_eq!(recorder.last().map(|n| n.level), Some(NoticeLevel::Warning));
        assert_eq!(service.stats().completed_today, 0);
    }

    #[test]
    fn unknown_ids_are_reported() {
        let (service, _, _) = service_with(Arc::new(MemoryStore::new()));
        assert!(matches!(
            service.toggle_habit("nope"),
            Err(HabitError::UnknownHabit(_))
        ));
        assert!(!service.delete_habit("nope").unwrap());
        assert!(service.history("nope", 7).is_err());
    }

    #[test]
    fn failed_save_keeps_the_in_memory_change() {
        let (service, _, recorder) = service_with(Arc::new(MemoryStore::with_quota(64)));
        let habit = service
            .add_habit("A habit whose serialized form will not fit")
            .unwrap();
        assert_eq!(
            recorder.0.lock().iter().filter(|n| n.level == NoticeLevel::Warning).count(),
            1
        );
        assert_eq!(service.habit(&habit.id), Some(habit));
    }

    #[test]
    fn reload_recomputes_streaks_as_days_pass() {
        let store = Arc::new(MemoryStore::new());
        let (service, clock, _) = service_with(store.clone());
        let habit = service.add_habit("Walk").unwrap();
        service.toggle_habit(&habit.id).unwrap();
        clock.advance(Duration::days(1));
        service.toggle_habit(&habit.id).unwrap();
        assert_eq!(service.habit(&habit.id).unwrap().streak, 2);

        let later = Arc::new(FixedClock::new(start() + Duration::days(4)));
        let reloaded = HabitService::builder()
            .with_store(store)
            .with_clock(later)
            .build()
            .unwrap();
        assert_eq!(reloaded.current_user().map(|u| u.id), Some("u1".into()));
        let stored = reloaded.habit(&habit.id).unwrap();
        assert_eq!(stored.total_completions, 2);
        assert_eq!(stored.streak, 0);
    }

    #[test]
    fn habits_are_scoped_to_the_signed_in_user() {
        let store = Arc::new(MemoryStore::new());
        let (service, _, _) = service_with(store);
        let walk = service.add_habit("Walk").unwrap();

        assert!(service.sign_in(User::new("u2", "Grace")));
        assert!(service.habits().is_empty());
        assert!(service.add_habit("Walk").is_ok(), "names are unique per user");
        assert!(matches!(
            service.toggle_habit(&walk.id),
            Err(HabitError::UnknownHabit(_))
        ));
        assert!(!service.delete_habit(&walk.id).unwrap());

        assert!(service.sign_out());
        assert!(service.current_user().is_none());
        assert!(matches!(
            service.delete_habit(&walk.id),
            Err(HabitError::NotSignedIn)
        ));
    }

    #[test]
    fn delete_then_export() {
        let (service, _, _) = service_with(Arc::new(MemoryStore::new()));
        let walk = service.add_habit("Walk").unwrap();
        let read = service.add_habit("Read").unwrap();
        assert!(service.delete_habit(&walk.id).unwrap());

        let bundle = service.export_bundle();
        assert_eq!(bundle.habits, vec![read]);
        assert_eq!(bundle.user.map(|u| u.name), Some("Ada".into()));
        assert_eq!(bundle.version, "1.0");
        assert_eq!(bundle.export_date, start().with_timezone(&Utc));
    }
}
