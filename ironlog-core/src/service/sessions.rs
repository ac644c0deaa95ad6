//! Workout-session operations on [`DataService`].

use chrono::NaiveDate;

use super::DataService;
use crate::error::{DataError, Result};
use crate::model::{WorkoutSession, validate_session};
use crate::sync::SyncAction;

impl DataService {
    /// Every stored session, most recent date first.
    pub async fn get_workout_sessions(&self) -> Result<Vec<WorkoutSession>> {
        let mut sessions = self
            .read(
                "load workout sessions",
                async || self.local.get_workout_sessions().await,
                async || self.remote.get_workout_sessions().await,
                async |sessions: &Vec<WorkoutSession>| self.local.replace_sessions(sessions).await,
            )
            .await?;
        sessions.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(sessions)
    }

    pub async fn get_workout_session(&self, session_id: &str) -> Result<Option<WorkoutSession>> {
        self.read(
            "load workout session",
            async || self.local.get_workout_session(session_id).await,
            async || self.remote.get_workout_session(session_id).await,
            async |_: &Option<WorkoutSession>| Ok(()),
        )
        .await
    }

    /// Validate, then upsert by id. The returned copy carries whatever
    /// the store stamped (fresh `updated_at`, a server-assigned id in
    /// remote mode).
    pub async fn save_workout_session(&self, session: &WorkoutSession) -> Result<WorkoutSession> {
        validate_session(session)?;
        self.write(
            "save workout session",
            async || self.local.save_workout_session(session).await,
            async || self.remote.save_workout_session(session).await,
            || SyncAction::SaveSession(session.clone()),
        )
        .await
    }

    /// Update an existing session by id. Unlike
    /// [`save_workout_session`](DataService::save_workout_session) this
    /// never creates; an unknown id is an error.
    pub async fn update_workout_session(
        &self,
        session: &WorkoutSession,
    ) -> Result<WorkoutSession> {
        validate_session(session)?;
        if self.get_workout_session(&session.id).await?.is_none() {
            return Err(DataError::NotFound {
                kind: "workout session",
                id: session.id.clone(),
            });
        }
        self.write(
            "update workout session",
            async || self.local.save_workout_session(session).await,
            async || self.remote.update_workout_session(session).await,
            || SyncAction::SaveSession(session.clone()),
        )
        .await
    }

    pub async fn delete_workout_session(&self, session_id: &str) -> Result<()> {
        self.write(
            "delete workout session",
            async || self.local.delete_workout_session(session_id).await,
            async || self.remote.delete_workout_session(session_id).await,
            || SyncAction::DeleteSession(session_id.to_string()),
        )
        .await
    }

    /// Sessions with `start <= date <= end`, most recent first. Derived
    /// query, never mirrored into the cache.
    pub async fn get_sessions_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<WorkoutSession>> {
        let mut sessions = self
            .read(
                "load workout sessions by date range",
                async || self.local.get_sessions_by_date_range(start, end).await,
                async || self.remote.get_sessions_by_date_range(start, end).await,
                async |_: &Vec<WorkoutSession>| Ok(()),
            )
            .await?;
        sessions.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(sessions)
    }

    /// Sessions containing the named exercise, most recent first.
    pub async fn get_sessions_by_exercise(
        &self,
        exercise_name: &str,
    ) -> Result<Vec<WorkoutSession>> {
        let mut sessions = self
            .read(
                "load workout sessions by exercise",
                async || self.local.get_sessions_by_exercise(exercise_name).await,
                async || self.remote.get_sessions_by_exercise(exercise_name).await,
                async |_: &Vec<WorkoutSession>| Ok(()),
            )
            .await?;
        sessions.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(sessions)
    }
}
