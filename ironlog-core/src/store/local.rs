//! Local persistence: three fixed keys in a SQLite key-value table, each
//! holding one whole collection as a JSON blob. Collections are always
//! decoded, edited in memory and written back as a unit, never row by row.

use chrono::{NaiveDate, Utc};
use log::{error, warn};
use sqlx::SqlitePool;

use crate::error::{DataError, Result};
use crate::model::{
    ExerciseTemplate, ExportBundle, UserSettings, WorkoutSession, default_exercise_templates,
};

pub const KEY_WORKOUT_SESSIONS: &str = "ironlog_workout_sessions";
pub const KEY_EXERCISE_TEMPLATES: &str = "ironlog_exercise_templates";
pub const KEY_USER_SETTINGS: &str = "ironlog_user_settings";

const STORAGE_KEYS: [&str; 3] = [
    KEY_WORKOUT_SESSIONS,
    KEY_EXERCISE_TEMPLATES,
    KEY_USER_SETTINGS,
];

/// Assumed capacity of the local area, advisory only.
pub const STORAGE_CAPACITY_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageInfo {
    pub used: u64,
    pub total: u64,
}

#[derive(Clone)]
pub struct LocalStore {
    pool: SqlitePool,
}

fn map_storage_err(e: sqlx::Error) -> DataError {
    if let Some(db) = e.as_database_error() {
        // SQLITE_FULL (13): the quota case callers surface specifically.
        let full = db.code().as_deref() == Some("13")
            || db.message().contains("database or disk is full");
        if full {
            return DataError::QuotaExceeded;
        }
    }
    DataError::Storage(e)
}

impl LocalStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn get_raw(&self, key: &str) -> Result<Option<String>> {
        sqlx::query_scalar::<_, String>("SELECT value FROM kv_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(DataError::Storage)
    }

    async fn set_raw(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, CAST(strftime('%s','now') AS INTEGER))
             ON CONFLICT(key) DO UPDATE SET
                 value = excluded.value,
                 updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(map_storage_err)?;
        Ok(())
    }

    async fn remove_raw(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM kv_store WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(DataError::Storage)?;
        Ok(())
    }

    // ---- workout sessions ----

    pub async fn get_workout_sessions(&self) -> Result<Vec<WorkoutSession>> {
        match self.get_raw(KEY_WORKOUT_SESSIONS).await? {
            Some(blob) => match serde_json::from_str(&blob) {
                Ok(sessions) => Ok(sessions),
                Err(e) => {
                    error!("Failed to decode stored workout sessions: {}", e);
                    Err(DataError::Serialization(e))
                }
            },
            None => Ok(Vec::new()),
        }
    }

    pub async fn get_workout_session(&self, session_id: &str) -> Result<Option<WorkoutSession>> {
        let sessions = self.get_workout_sessions().await?;
        Ok(sessions.into_iter().find(|s| s.id == session_id))
    }

    /// Upsert by id. An existing record gets its `updated_at` stamped to
    /// now; the stored copy is returned.
    pub async fn save_workout_session(&self, session: &WorkoutSession) -> Result<WorkoutSession> {
        let mut sessions = self.get_workout_sessions().await?;
        let stored = match sessions.iter_mut().find(|s| s.id == session.id) {
            Some(existing) => {
                *existing = session.clone();
                existing.updated_at = Utc::now();
                existing.clone()
            }
            None => {
                sessions.push(session.clone());
                session.clone()
            }
        };
        self.replace_sessions(&sessions).await?;
        Ok(stored)
    }

    pub async fn delete_workout_session(&self, session_id: &str) -> Result<()> {
        let sessions = self.get_workout_sessions().await?;
        let remaining: Vec<WorkoutSession> = sessions
            .into_iter()
            .filter(|s| s.id != session_id)
            .collect();
        self.replace_sessions(&remaining).await
    }

    pub async fn get_sessions_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<WorkoutSession>> {
        let sessions = self.get_workout_sessions().await?;
        Ok(sessions
            .into_iter()
            .filter(|s| s.date >= start && s.date <= end)
            .collect())
    }

    pub async fn get_sessions_by_exercise(
        &self,
        exercise_name: &str,
    ) -> Result<Vec<WorkoutSession>> {
        let sessions = self.get_workout_sessions().await?;
        Ok(sessions
            .into_iter()
            .filter(|s| s.exercises.iter().any(|e| e.name == exercise_name))
            .collect())
    }

    /// Overwrite the whole sessions collection. Also the hybrid read
    /// path's cache-mirror entry point: replacement, not a merge.
    pub async fn replace_sessions(&self, sessions: &[WorkoutSession]) -> Result<()> {
        let blob = serde_json::to_string(sessions)?;
        self.set_raw(KEY_WORKOUT_SESSIONS, &blob).await
    }

    // ---- exercise templates ----

    /// Absent key returns the baked-in catalog, persisted so later reads
    /// never reseed.
    pub async fn get_exercise_templates(&self) -> Result<Vec<ExerciseTemplate>> {
        match self.get_raw(KEY_EXERCISE_TEMPLATES).await? {
            Some(blob) => match serde_json::from_str(&blob) {
                Ok(templates) => Ok(templates),
                Err(e) => {
                    warn!(
                        "Failed to decode stored templates, reseeding defaults: {}",
                        e
                    );
                    self.seed_default_templates().await
                }
            },
            None => self.seed_default_templates().await,
        }
    }

    async fn seed_default_templates(&self) -> Result<Vec<ExerciseTemplate>> {
        let templates = default_exercise_templates();
        self.replace_templates(&templates).await?;
        Ok(templates)
    }

    pub async fn save_exercise_template(&self, template: &ExerciseTemplate) -> Result<()> {
        let mut templates = self.get_exercise_templates().await?;
        match templates.iter_mut().find(|t| t.id == template.id) {
            Some(existing) => *existing = template.clone(),
            None => templates.push(template.clone()),
        }
        self.replace_templates(&templates).await
    }

    pub async fn replace_templates(&self, templates: &[ExerciseTemplate]) -> Result<()> {
        let blob = serde_json::to_string(templates)?;
        self.set_raw(KEY_EXERCISE_TEMPLATES, &blob).await
    }

    // ---- user settings ----

    /// Absent key returns defaults without persisting them; only an
    /// explicit save writes the settings blob.
    pub async fn get_user_settings(&self) -> Result<UserSettings> {
        match self.get_raw(KEY_USER_SETTINGS).await? {
            Some(blob) => Ok(serde_json::from_str(&blob)?),
            None => Ok(UserSettings::default()),
        }
    }

    pub async fn save_user_settings(&self, settings: &UserSettings) -> Result<()> {
        let blob = serde_json::to_string(settings)?;
        self.set_raw(KEY_USER_SETTINGS, &blob).await
    }

    // ---- bulk operations ----

    pub async fn export_data(&self) -> Result<ExportBundle> {
        Ok(ExportBundle {
            workout_sessions: self.get_workout_sessions().await?,
            exercise_templates: self.get_exercise_templates().await?,
            user_settings: self.get_user_settings().await?,
            export_date: Utc::now(),
        })
    }

    pub async fn import_data(&self, bundle: &ExportBundle) -> Result<()> {
        self.replace_sessions(&bundle.workout_sessions).await?;
        self.replace_templates(&bundle.exercise_templates).await?;
        self.save_user_settings(&bundle.user_settings).await?;
        Ok(())
    }

    pub async fn clear_all_data(&self) -> Result<()> {
        for key in STORAGE_KEYS {
            self.remove_raw(key).await?;
        }
        Ok(())
    }

    /// Bytes used across all stored keys and values against the assumed
    /// capacity. Advisory only, nothing enforces it.
    pub async fn storage_info(&self) -> Result<StorageInfo> {
        let rows: Vec<(String, String)> = sqlx::query_as("SELECT key, value FROM kv_store")
            .fetch_all(&self.pool)
            .await
            .map_err(DataError::Storage)?;
        let used = rows
            .iter()
            .map(|(k, v)| (k.len() + v.len()) as u64)
            .sum();
        Ok(StorageInfo {
            used,
            total: STORAGE_CAPACITY_BYTES,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Exercise, WorkoutSet};
    use crate::store::db::open_memory_pool;

    async fn store() -> LocalStore {
        LocalStore::new(open_memory_pool().await.unwrap())
    }

    fn session_on(date: &str) -> WorkoutSession {
        let mut session =
            WorkoutSession::start(date.parse().expect("test date must be YYYY-MM-DD"));
        let mut squat = Exercise::new("Squat", "Legs");
        squat.sets.push(WorkoutSet::new(5, 100.0).unwrap());
        session.exercises.push(squat);
        session
    }

    #[tokio::test]
    async fn absent_sessions_key_reads_as_empty() {
        let store = store().await;
        assert!(store.get_workout_sessions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_then_read_round_trips() {
        let store = store().await;
        let session = session_on("2026-08-20");
        store.save_workout_session(&session).await.unwrap();

        let loaded = store
            .get_workout_session(&session.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.exercises, session.exercises);
        assert_eq!(loaded.date, session.date);
    }

    #[tokio::test]
    async fn updating_existing_session_bumps_updated_at_only() {
        let store = store().await;
        let session = session_on("2026-08-20");
        store.save_workout_session(&session).await.unwrap();

        // Re-save with unchanged fields.
        let stored = store.save_workout_session(&session).await.unwrap();
        assert_eq!(stored.id, session.id);
        assert_eq!(stored.exercises, session.exercises);
        assert!(stored.updated_at > session.updated_at);

        // Still exactly one record.
        assert_eq!(store.get_workout_sessions().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_removes_only_the_target() {
        let store = store().await;
        let a = session_on("2026-08-19");
        let b = session_on("2026-08-20");
        store.save_workout_session(&a).await.unwrap();
        store.save_workout_session(&b).await.unwrap();

        store.delete_workout_session(&a.id).await.unwrap();
        let remaining = store.get_workout_sessions().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, b.id);
    }

    #[tokio::test]
    async fn date_range_filter_is_inclusive() {
        let store = store().await;
        for date in ["2026-08-10", "2026-08-15", "2026-08-20"] {
            store.save_workout_session(&session_on(date)).await.unwrap();
        }
        let hits = store
            .get_sessions_by_date_range("2026-08-10".parse().unwrap(), "2026-08-15".parse().unwrap())
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn templates_seed_once_and_persist() {
        let store = store().await;
        let first = store.get_exercise_templates().await.unwrap();
        assert_eq!(first.len(), 13);

        // Second read must return the persisted catalog, same ids, no
        // fresh reseed.
        let second = store.get_exercise_templates().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn settings_defaults_are_not_persisted_until_saved() {
        let store = store().await;
        let defaults = store.get_user_settings().await.unwrap();
        assert_eq!(defaults, UserSettings::default());

        // Nothing was written by the read.
        let info = store.storage_info().await.unwrap();
        assert_eq!(info.used, 0);

        store.save_user_settings(&defaults).await.unwrap();
        assert!(store.storage_info().await.unwrap().used > 0);
    }

    #[tokio::test]
    async fn export_import_round_trip_preserves_ids_and_dates() {
        let source = store().await;
        let session = session_on("2026-08-20");
        source.save_workout_session(&session).await.unwrap();
        source.get_exercise_templates().await.unwrap();

        let bundle = source.export_data().await.unwrap();
        // Serialize through JSON like a real export file would.
        let json = serde_json::to_string_pretty(&bundle).unwrap();
        let parsed: ExportBundle = serde_json::from_str(&json).unwrap();

        let other = store().await;
        other.import_data(&parsed).await.unwrap();

        assert_eq!(
            other.get_workout_sessions().await.unwrap(),
            source.get_workout_sessions().await.unwrap()
        );
        assert_eq!(
            other.get_exercise_templates().await.unwrap(),
            source.get_exercise_templates().await.unwrap()
        );
        assert_eq!(
            other.get_user_settings().await.unwrap(),
            source.get_user_settings().await.unwrap()
        );
    }

    #[tokio::test]
    async fn clear_removes_every_key() {
        let store = store().await;
        store.save_workout_session(&session_on("2026-08-20")).await.unwrap();
        store.get_exercise_templates().await.unwrap();
        store.clear_all_data().await.unwrap();
        assert_eq!(store.storage_info().await.unwrap().used, 0);
        assert!(store.get_workout_sessions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn storage_info_reports_fixed_capacity() {
        let store = store().await;
        let info = store.storage_info().await.unwrap();
        assert_eq!(info.total, 5 * 1024 * 1024);
    }
}
