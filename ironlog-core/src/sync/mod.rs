//! Deferred remote sync: a durable queue of per-record actions replayed
//! against the remote store once it is reachable again.
//!
//! The queue lives in the same SQLite database as the local store, so
//! pending work survives restarts. One row per record: enqueueing a newer
//! action for a record already queued replaces the payload in place (a
//! delete supersedes a queued save), keeping the row's original queue
//! position.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::error::{DataError, Result};
use crate::model::{ExerciseTemplate, UserSettings, WorkoutSession};
use crate::store::RemoteStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "payload", rename_all = "camelCase")]
pub enum SyncAction {
    SaveSession(WorkoutSession),
    DeleteSession(String),
    SaveTemplate(ExerciseTemplate),
    SaveSettings(UserSettings),
}

impl SyncAction {
    /// Queue key: one entry per record, so replaying never applies a
    /// stale action after a newer one.
    pub fn record_key(&self) -> String {
        match self {
            SyncAction::SaveSession(session) => format!("session:{}", session.id),
            SyncAction::DeleteSession(session_id) => format!("session:{session_id}"),
            SyncAction::SaveTemplate(template) => format!("template:{}", template.id),
            SyncAction::SaveSettings(_) => "settings:default".to_string(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            SyncAction::SaveSession(_) => "saveSession",
            SyncAction::DeleteSession(_) => "deleteSession",
            SyncAction::SaveTemplate(_) => "saveTemplate",
            SyncAction::SaveSettings(_) => "saveSettings",
        }
    }

    async fn apply(&self, remote: &RemoteStore) -> Result<()> {
        match self {
            SyncAction::SaveSession(session) => {
                remote.save_workout_session(session).await?;
            }
            SyncAction::DeleteSession(session_id) => {
                remote.delete_workout_session(session_id).await?;
            }
            SyncAction::SaveTemplate(template) => {
                remote.save_exercise_template(template).await?;
            }
            SyncAction::SaveSettings(settings) => {
                remote.save_user_settings(settings).await?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueueEntry {
    pub record_key: String,
    pub action: SyncAction,
    pub attempts: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainOutcome {
    pub replayed: usize,
    pub failed: usize,
}

#[derive(Clone)]
pub struct SyncQueue {
    pool: SqlitePool,
}

impl SyncQueue {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or replace the pending action for this record. Replacement
    /// keeps the record's existing queue position and resets attempts.
    pub async fn enqueue(&self, action: &SyncAction) -> Result<()> {
        let payload = serde_json::to_string(action)?;
        sqlx::query(
            "INSERT INTO sync_queue (record_key, action, payload)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(record_key) DO UPDATE SET
                 action = excluded.action,
                 payload = excluded.payload,
                 attempts = 0",
        )
        .bind(action.record_key())
        .bind(action.kind())
        .bind(payload)
        .execute(&self.pool)
        .await
        .map_err(DataError::Storage)?;
        Ok(())
    }

    pub async fn len(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sync_queue")
            .fetch_one(&self.pool)
            .await
            .map_err(DataError::Storage)?;
        Ok(count as u64)
    }

    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    /// Pending entries in queue order.
    pub async fn entries(&self) -> Result<Vec<QueueEntry>> {
        let rows: Vec<(String, String, i64)> = sqlx::query_as(
            "SELECT record_key, payload, attempts FROM sync_queue ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DataError::Storage)?;

        rows.into_iter()
            .map(|(record_key, payload, attempts)| {
                Ok(QueueEntry {
                    record_key,
                    action: serde_json::from_str(&payload)?,
                    attempts,
                })
            })
            .collect()
    }

    /// Drop every pending entry. Used when the data it refers to is
    /// being wiped anyway.
    pub async fn clear(&self) -> Result<()> {
        sqlx::query("DELETE FROM sync_queue")
            .execute(&self.pool)
            .await
            .map_err(DataError::Storage)?;
        Ok(())
    }

    async fn remove(&self, record_key: &str) -> Result<()> {
        sqlx::query("DELETE FROM sync_queue WHERE record_key = ?1")
            .bind(record_key)
            .execute(&self.pool)
            .await
            .map_err(DataError::Storage)?;
        Ok(())
    }

    async fn bump_attempts(&self, record_key: &str) -> Result<()> {
        sqlx::query("UPDATE sync_queue SET attempts = attempts + 1 WHERE record_key = ?1")
            .bind(record_key)
            .execute(&self.pool)
            .await
            .map_err(DataError::Storage)?;
        Ok(())
    }

    /// Replay every pending action against the remote store in queue
    /// order. Replayed entries are removed; a failed entry stays queued
    /// with its attempt count bumped and is retried on the next drain.
    pub async fn drain(&self, remote: &RemoteStore) -> Result<DrainOutcome> {
        let entries = self.entries().await?;
        if entries.is_empty() {
            return Ok(DrainOutcome::default());
        }

        info!("Replaying {} queued sync action(s)", entries.len());
        let mut outcome = DrainOutcome::default();
        for entry in entries {
            match entry.action.apply(remote).await {
                Ok(()) => {
                    self.remove(&entry.record_key).await?;
                    outcome.replayed += 1;
                }
                Err(e) => {
                    warn!(
                        "Sync of {} failed (attempt {}): {}",
                        entry.record_key,
                        entry.attempts + 1,
                        e
                    );
                    self.bump_attempts(&entry.record_key).await?;
                    outcome.failed += 1;
                }
            }
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Exercise, WorkoutSet};
    use crate::store::db::{open_memory_pool, open_pool};

    fn session_on(date: &str) -> WorkoutSession {
        let mut session = WorkoutSession::start(date.parse().unwrap());
        let mut row = Exercise::new("Dumbbell Row", "Back");
        row.sets.push(WorkoutSet::new(8, 30.0).unwrap());
        session.exercises.push(row);
        session
    }

    #[tokio::test]
    async fn newer_action_for_same_record_replaces_in_place() {
        let queue = SyncQueue::new(open_memory_pool().await.unwrap());
        let first = session_on("2026-08-19");
        let second = session_on("2026-08-20");

        queue
            .enqueue(&SyncAction::SaveSession(first.clone()))
            .await
            .unwrap();
        queue
            .enqueue(&SyncAction::SaveSession(second.clone()))
            .await
            .unwrap();
        // Delete supersedes the queued save of the first record.
        queue
            .enqueue(&SyncAction::DeleteSession(first.id.clone()))
            .await
            .unwrap();

        let entries = queue.entries().await.unwrap();
        assert_eq!(entries.len(), 2);
        // The first record kept its queue position but carries the delete.
        assert_eq!(entries[0].action, SyncAction::DeleteSession(first.id));
        assert_eq!(entries[1].action, SyncAction::SaveSession(second));
    }

    #[tokio::test]
    async fn drain_replays_in_order_and_empties_the_queue() {
        let queue = SyncQueue::new(open_memory_pool().await.unwrap());
        let (remote, handle) = RemoteStore::new_mock();

        let session = session_on("2026-08-20");
        queue
            .enqueue(&SyncAction::SaveSession(session.clone()))
            .await
            .unwrap();
        queue
            .enqueue(&SyncAction::SaveSettings(UserSettings::default()))
            .await
            .unwrap();

        let outcome = queue.drain(&remote).await.unwrap();
        assert_eq!(outcome, DrainOutcome { replayed: 2, failed: 0 });
        assert!(queue.is_empty().await.unwrap());
        assert!(handle.has_session(&session.id).await);
    }

    #[tokio::test]
    async fn failed_entries_stay_queued_with_bumped_attempts() {
        let queue = SyncQueue::new(open_memory_pool().await.unwrap());
        let (remote, handle) = RemoteStore::new_mock();
        handle.set_fail(true);

        queue
            .enqueue(&SyncAction::SaveSession(session_on("2026-08-20")))
            .await
            .unwrap();

        let outcome = queue.drain(&remote).await.unwrap();
        assert_eq!(outcome, DrainOutcome { replayed: 0, failed: 1 });

        let entries = queue.entries().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].attempts, 1);

        handle.set_fail(false);
        let outcome = queue.drain(&remote).await.unwrap();
        assert_eq!(outcome.replayed, 1);
        assert!(queue.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn queue_survives_reopening_the_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ironlog.db");
        let path = path.to_str().unwrap();

        let session = session_on("2026-08-20");
        {
            let pool = open_pool(path).await.unwrap();
            let queue = SyncQueue::new(pool.clone());
            queue
                .enqueue(&SyncAction::SaveSession(session.clone()))
                .await
                .unwrap();
            pool.close().await;
        }

        let pool = open_pool(path).await.unwrap();
        let queue = SyncQueue::new(pool);
        let entries = queue.entries().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, SyncAction::SaveSession(session));
    }
}
