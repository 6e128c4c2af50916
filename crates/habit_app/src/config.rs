use std::path::PathBuf;

use anyhow::Result;
use habit_domain::{stats::MAX_HISTORY_DAYS, StreakRule, User};
use tracing::{info, warn};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub(crate) data_dir: PathBuf,
    pub(crate) user: Option<User>,
    pub(crate) streak_rule: StreakRule,
    pub(crate) history_days: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(dir) = std::env::var("HABITS_DATA_DIR") {
            if !dir.trim().is_empty() {
                config.data_dir = PathBuf::from(dir);
            }
        }
        let user_id = std::env::var("HABITS_USER_ID").ok();
        let user_name = std::env::var("HABITS_USER_NAME")
            .ok()
            .filter(|name| !name.trim().is_empty());
        if let Some(id) = user_id.filter(|id| !id.trim().is_empty()) {
            let name = user_name.unwrap_or_else(|| id.clone());
            info!(user = %id, "signing in from environment");
            config.user = Some(User::new(id.trim(), name.trim()));
        }
        if let Ok(rule) = std::env::var("HABITS_STREAK_RULE") {
            match rule.parse::<StreakRule>() {
                Ok(rule) => config.streak_rule = rule,
                Err(err) => warn!(%err, "ignoring HABITS_STREAK_RULE"),
            }
        }
        if let Ok(days) = std::env::var("HABITS_HISTORY_DAYS") {
            if let Ok(value) = days.trim().parse::<usize>() {
                if value > 0 {
                    config.history_days = value.min(MAX_HISTORY_DAYS);
                }
            }
        }
        Ok(config)
    }

    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.user = Some(user);
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".habits"),
            user: None,
            streak_rule: StreakRule::default(),
            history_days: 14,
        }
    }
}
