//! Derived views over the training history: per-exercise stats, daily
//! suggestions and weekly totals.
//!
//! Queries run against a snapshot of sessions and templates that the
//! caller refreshes explicitly with [`AnalyticsService::update_cache`].
//! The snapshot stays valid for five minutes; after that queries see an
//! empty history until the next refresh. The service never refetches on
//! its own.

pub mod engine;

use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::Utc;
use log::debug;

use crate::error::Result;
use crate::model::{
    ExerciseStats, ExerciseSuggestion, ExerciseTemplate, WeeklyStats, WorkoutSession,
};
use crate::service::DataService;

pub const CACHE_DURATION: Duration = Duration::from_secs(5 * 60);

#[derive(Default)]
struct Snapshot {
    sessions: Vec<WorkoutSession>,
    templates: Vec<ExerciseTemplate>,
    refreshed_at: Option<Instant>,
}

impl Snapshot {
    fn is_fresh(&self) -> bool {
        self.refreshed_at
            .is_some_and(|at| at.elapsed() < CACHE_DURATION)
    }
}

#[derive(Default)]
pub struct AnalyticsService {
    cache: Mutex<Snapshot>,
}

impl AnalyticsService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refetch sessions and templates through the data service and reset
    /// the validity window.
    pub async fn update_cache(&self, data: &DataService) -> Result<()> {
        let sessions = data.get_workout_sessions().await?;
        let templates = data.get_exercise_templates().await?;
        debug!(
            "Analytics cache refreshed: {} session(s), {} template(s)",
            sessions.len(),
            templates.len()
        );
        let mut cache = self.cache.lock().expect("analytics cache poisoned");
        cache.sessions = sessions;
        cache.templates = templates;
        cache.refreshed_at = Some(Instant::now());
        Ok(())
    }

    /// Drop the snapshot; queries see an empty history until the next
    /// [`update_cache`](AnalyticsService::update_cache).
    pub fn invalidate(&self) {
        self.cache.lock().expect("analytics cache poisoned").refreshed_at = None;
    }

    fn snapshot(&self) -> (Vec<WorkoutSession>, Vec<ExerciseTemplate>) {
        let cache = self.cache.lock().expect("analytics cache poisoned");
        if cache.is_fresh() {
            (cache.sessions.clone(), cache.templates.clone())
        } else {
            (Vec::new(), Vec::new())
        }
    }

    pub fn exercise_stats(&self, exercise_name: &str) -> Option<ExerciseStats> {
        let (sessions, _) = self.snapshot();
        engine::exercise_stats(&sessions, exercise_name)
    }

    pub fn all_exercise_stats(&self) -> Vec<ExerciseStats> {
        let (sessions, _) = self.snapshot();
        engine::all_exercise_stats(&sessions)
    }

    pub fn suggest_todays_exercises(&self) -> Vec<ExerciseSuggestion> {
        let (sessions, templates) = self.snapshot();
        engine::suggest_todays_exercises(&sessions, &templates, Utc::now().date_naive())
    }

    pub fn weekly_stats(&self) -> WeeklyStats {
        let (sessions, _) = self.snapshot();
        engine::weekly_stats(&sessions, Utc::now().date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DataServiceConfig;
    use crate::model::{Exercise, WorkoutSet};
    use crate::store::db::open_memory_pool;
    use crate::store::{LocalStore, RemoteStore};

    async fn service() -> DataService {
        let local = LocalStore::new(open_memory_pool().await.unwrap());
        let (remote, _) = RemoteStore::new_mock();
        DataService::new(DataServiceConfig::default(), local, remote)
    }

    fn session_today(weight: f64) -> WorkoutSession {
        let mut session = WorkoutSession::start(Utc::now().date_naive());
        let mut bench = Exercise::new("Bench Press", "Chest");
        bench.sets.push(WorkoutSet::new(5, weight).unwrap());
        session.exercises.push(bench);
        session
    }

    #[tokio::test]
    async fn queries_are_empty_until_the_cache_is_updated() {
        let data = service().await;
        data.save_workout_session(&session_today(100.0)).await.unwrap();

        let analytics = AnalyticsService::new();
        assert_eq!(analytics.weekly_stats().total_workouts, 0);
        assert!(analytics.exercise_stats("Bench Press").is_none());

        analytics.update_cache(&data).await.unwrap();
        assert_eq!(analytics.weekly_stats().total_workouts, 1);
    }

    #[tokio::test]
    async fn snapshot_ignores_writes_until_refreshed() {
        let data = service().await;
        let analytics = AnalyticsService::new();

        data.save_workout_session(&session_today(100.0)).await.unwrap();
        analytics.update_cache(&data).await.unwrap();
        assert_eq!(analytics.weekly_stats().total_workouts, 1);

        let mut second = session_today(110.0);
        second.date = Utc::now().date_naive() - chrono::Days::new(1);
        data.save_workout_session(&second).await.unwrap();
        // Still the old snapshot.
        assert_eq!(analytics.weekly_stats().total_workouts, 1);

        analytics.update_cache(&data).await.unwrap();
        assert_eq!(analytics.weekly_stats().total_workouts, 2);
    }

    #[tokio::test]
    async fn invalidated_cache_reads_as_empty() {
        let data = service().await;
        let analytics = AnalyticsService::new();
        data.save_workout_session(&session_today(100.0)).await.unwrap();
        analytics.update_cache(&data).await.unwrap();

        analytics.invalidate();
        assert_eq!(analytics.weekly_stats().total_workouts, 0);
    }

    #[tokio::test]
    async fn exercise_stats_flow_through_the_snapshot() {
        let data = service().await;
        let analytics = AnalyticsService::new();
        data.save_workout_session(&session_today(100.0)).await.unwrap();
        analytics.update_cache(&data).await.unwrap();

        let stats = analytics.exercise_stats("Bench Press").unwrap();
        assert_eq!(stats.max_weight, 100.0);
        assert_eq!(stats.category, "Chest");
        assert!(analytics.exercise_stats("Deadlift").is_none());
    }

    #[tokio::test]
    async fn suggestions_come_from_the_template_catalog() {
        let data = service().await;
        let analytics = AnalyticsService::new();
        analytics.update_cache(&data).await.unwrap();

        let suggestions = analytics.suggest_todays_exercises();
        assert!(!suggestions.is_empty());
        assert!(suggestions.len() <= 6);
    }
}
