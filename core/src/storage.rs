use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::models::{Meal, Metric, User, Workout};
use crate::store::Collection;

pub const USERS_FILE: &str = "users.json";
pub const WORKOUTS_FILE: &str = "workouts.json";
pub const NUTRITION_FILE: &str = "nutrition.json";
pub const METRICS_FILE: &str = "metrics.json";

const DATA_FILES: [&str; 4] = [USERS_FILE, WORKOUTS_FILE, NUTRITION_FILE, METRICS_FILE];

/// Everything persisted between sessions.
#[derive(Debug, Clone, Default)]
pub struct State {
    pub users: Vec<User>,
    pub workouts: Collection<Workout>,
    pub meals: Collection<Meal>,
    pub metrics: Collection<Metric>,
}

/// Flat JSON files under `<base>/data`, with timestamped copies under `<base>/backups`.
#[derive(Debug, Clone)]
pub struct Storage {
    data_dir: PathBuf,
    backup_dir: PathBuf,
}

impl Storage {
    #[must_use]
    pub fn new(base_dir: &Path) -> Self {
        Storage {
            data_dir: base_dir.join("data"),
            backup_dir: base_dir.join("backups"),
        }
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    #[must_use]
    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    fn ensure_dirs(&self) -> Result<()> {
        for dir in [&self.data_dir, &self.backup_dir] {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
        Ok(())
    }

    /// Read all four collections. Missing files load as empty.
    pub fn load(&self) -> Result<State> {
        self.ensure_dirs()?;
        let state = State {
            users: self.read_records(USERS_FILE)?,
            workouts: Collection::from_vec(self.read_records(WORKOUTS_FILE)?),
            meals: Collection::from_vec(self.read_records(NUTRITION_FILE)?),
            metrics: Collection::from_vec(self.read_records(METRICS_FILE)?),
        };
        tracing::debug!(
            users = state.users.len(),
            workouts = state.workouts.len(),
            meals = state.meals.len(),
            metrics = state.metrics.len(),
            "Loaded state"
        );
        Ok(state)
    }

    /// Back up the current files, then overwrite them with `state`.
    pub fn save(&self, state: &State) -> Result<()> {
        self.backup()?;
        self.write_records(USERS_FILE, &state.users)?;
        self.write_records(WORKOUTS_FILE, state.workouts.as_slice())?;
        self.write_records(NUTRITION_FILE, state.meals.as_slice())?;
        self.write_records(METRICS_FILE, state.metrics.as_slice())?;
        tracing::info!(dir = %self.data_dir.display(), "Saved state");
        Ok(())
    }

    /// Copy each existing data file to `<backups>/<file>.<YYYYmmdd_HHMMSS>.bak`.
    pub fn backup(&self) -> Result<Vec<PathBuf>> {
        self.ensure_dirs()?;
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let mut created = Vec::new();

        for name in DATA_FILES {
            let src = self.data_dir.join(name);
            if !src.exists() {
                continue;
            }
            let dst = self.backup_dir.join(format!("{name}.{stamp}.bak"));
            fs::copy(&src, &dst).with_context(|| {
                format!("Failed to back up {} to {}", src.display(), dst.display())
            })?;
            created.push(dst);
        }

        tracing::info!(files = created.len(), "Created backup");
        Ok(created)
    }

    /// Copy the newest backup of each data file over the live file.
    /// Returns false when there was nothing to restore.
    pub fn restore_latest(&self) -> Result<bool> {
        self.ensure_dirs()?;
        let backups: Vec<String> = fs::read_dir(&self.backup_dir)
            .with_context(|| format!("Failed to read {}", self.backup_dir.display()))?
            .filter_map(|entry| entry.ok()?.file_name().into_string().ok())
            .collect();

        let mut restored = false;
        for name in DATA_FILES {
            let prefix = format!("{name}.");
            let Some(newest) = backups
                .iter()
                .filter(|f| f.starts_with(&prefix) && f.ends_with(".bak"))
                .max()
            else {
                continue;
            };
            let src = self.backup_dir.join(newest);
            let dst = self.data_dir.join(name);
            fs::copy(&src, &dst)
                .with_context(|| format!("Failed to restore {}", src.display()))?;
            tracing::info!(file = name, backup = %newest, "Restored from backup");
            restored = true;
        }
        Ok(restored)
    }

    fn read_records<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>> {
        let path = self.data_dir.join(name);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let items = match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(serde_json::Value::Array(items)) => items,
            Ok(_) => {
                tracing::warn!(file = %path.display(), "Expected a JSON array, ignoring file");
                return Ok(Vec::new());
            }
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "Malformed JSON, ignoring file");
                return Ok(Vec::new());
            }
        };

        let mut records = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            match serde_json::from_value(item) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(file = name, index, error = %e, "Skipping invalid record");
                }
            }
        }
        Ok(records)
    }

    fn write_records<T: Serialize>(&self, name: &str, records: &[T]) -> Result<()> {
        let path = self.data_dir.join(name);
        let json = serde_json::to_string_pretty(records)?;
        fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))
    }
}
