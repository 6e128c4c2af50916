use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::habit::{Habit, User};

pub const EXPORT_VERSION: &str = "1.0";

/// Backup document written by the export action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub habits: Vec<Habit>,
    pub user: Option<User>,
    pub export_date: DateTime<Utc>,
    pub version: String,
}

impl ExportBundle {
    pub fn new(habits: Vec<Habit>, user: Option<User>, export_date: DateTime<Utc>) -> Self {
        Self {
            habits,
            user,
            export_date,
            version: EXPORT_VERSION.to_string(),
        }
    }

    pub fn file_name(&self) -> String {
        format!(
            "smart-habits-backup-{}.json",
            self.export_date.format("%Y-%m-%d")
        )
    }

    pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("unable to create export directory {}", dir.display()))?;
        let path = dir.join(self.file_name());
        let payload = serde_json::to_string_pretty(self)?;
        fs::write(&path, payload)
            .with_context(|| format!("unable to write export {}", path.display()))?;
        tracing::info!(path = %path.display(), habits = self.habits.len(), "exported habits");
        Ok(path)
    }
}
