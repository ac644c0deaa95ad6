//! Remote document-store client for the three collections.
//!
//! Two backends behind one type: `Http` speaks JSON REST against a
//! configurable base URL, `Mock` keeps collections in memory with a
//! failure toggle so the sync paths can be exercised in tests.
//!
//! Wire shape: session documents carry `date` as a plain `YYYY-MM-DD`
//! string and both timestamps as epoch milliseconds (the store's native
//! timestamp type); translation to `DateTime<Utc>` happens here.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::error::{DataError, Result};
use crate::model::{
    Exercise, ExerciseTemplate, ExportBundle, UserSettings, WorkoutSession,
    default_exercise_templates,
};

pub const COLLECTION_WORKOUT_SESSIONS: &str = "workoutSessions";
pub const COLLECTION_EXERCISE_TEMPLATES: &str = "exerciseTemplates";
pub const COLLECTION_USER_SETTINGS: &str = "userSettings";

/// The settings collection holds a single document under this id.
const SETTINGS_DOC_ID: &str = "default";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionDoc {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    id: String,
    date: String,
    exercises: Vec<Exercise>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    duration: Option<i64>,
    created_at: i64,
    updated_at: i64,
}

impl SessionDoc {
    fn from_domain(session: &WorkoutSession) -> Self {
        Self {
            id: session.id.clone(),
            date: session.date.to_string(),
            exercises: session.exercises.clone(),
            notes: session.notes.clone(),
            duration: session.duration,
            created_at: session.created_at.timestamp_millis(),
            updated_at: session.updated_at.timestamp_millis(),
        }
    }

    fn into_domain(self, op: &'static str) -> Result<WorkoutSession> {
        let date: NaiveDate = self
            .date
            .parse()
            .map_err(|e| DataError::remote(op, anyhow::anyhow!("bad date {:?}: {}", self.date, e)))?;
        let created_at = millis_to_datetime(self.created_at, op)?;
        let updated_at = millis_to_datetime(self.updated_at, op)?;
        Ok(WorkoutSession {
            id: self.id,
            date,
            exercises: self.exercises,
            notes: self.notes,
            duration: self.duration,
            created_at,
            updated_at,
        })
    }
}

fn millis_to_datetime(millis: i64, op: &'static str) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| DataError::remote(op, anyhow::anyhow!("timestamp out of range: {millis}")))
}

#[derive(Debug, Deserialize)]
struct CreatedDoc {
    id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase", tag = "op")]
enum BatchOp {
    Set {
        collection: &'static str,
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        document: Value,
    },
    Delete {
        collection: &'static str,
        id: String,
    },
}

#[derive(Default)]
struct MockState {
    fail: AtomicBool,
    next_id: AtomicU64,
    sessions: Mutex<BTreeMap<String, SessionDoc>>,
    templates: Mutex<BTreeMap<String, ExerciseTemplate>>,
    settings: Mutex<Option<UserSettings>>,
}

impl MockState {
    fn assign_id(&self) -> String {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        format!("doc-{n}")
    }

    fn check(&self, op: &'static str) -> Result<()> {
        if self.fail.load(Ordering::Relaxed) {
            Err(DataError::remote(op, anyhow::anyhow!("mock remote offline")))
        } else {
            Ok(())
        }
    }
}

/// Test-side controls for the mock backend.
#[derive(Clone)]
pub struct MockHandle {
    state: Arc<MockState>,
}

impl MockHandle {
    /// Make every subsequent operation fail until cleared.
    pub fn set_fail(&self, fail: bool) {
        self.state.fail.store(fail, Ordering::Relaxed);
    }

    pub async fn session_count(&self) -> usize {
        self.state.sessions.lock().await.len()
    }

    pub async fn template_count(&self) -> usize {
        self.state.templates.lock().await.len()
    }

    pub async fn has_session(&self, id: &str) -> bool {
        self.state.sessions.lock().await.contains_key(id)
    }
}

#[derive(Clone)]
enum RemoteBackend {
    Http {
        client: reqwest::Client,
        base_url: String,
    },
    Mock {
        state: Arc<MockState>,
    },
}

#[derive(Clone)]
pub struct RemoteStore {
    backend: RemoteBackend,
}

impl RemoteStore {
    pub fn new_http(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        info!("RemoteStore::new_http base_url={}", base_url);
        Self {
            backend: RemoteBackend::Http {
                client: reqwest::Client::new(),
                base_url,
            },
        }
    }

    pub fn new_mock() -> (Self, MockHandle) {
        debug!("RemoteStore::new_mock creating in-memory backend");
        let state = Arc::new(MockState::default());
        (
            Self {
                backend: RemoteBackend::Mock {
                    state: state.clone(),
                },
            },
            MockHandle { state },
        )
    }

    // ---- HTTP plumbing ----

    async fn http_list<T: serde::de::DeserializeOwned>(
        client: &reqwest::Client,
        base_url: &str,
        collection: &str,
        query: &[(&str, String)],
        op: &'static str,
    ) -> Result<Vec<T>> {
        let url = format!("{base_url}/{collection}");
        let response = client
            .get(&url)
            .query(query)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| DataError::remote(op, e))?;
        response
            .json::<Vec<T>>()
            .await
            .map_err(|e| DataError::remote(op, e))
    }

    async fn http_get<T: serde::de::DeserializeOwned>(
        client: &reqwest::Client,
        base_url: &str,
        collection: &str,
        id: &str,
        op: &'static str,
    ) -> Result<Option<T>> {
        let url = format!("{base_url}/{collection}/{id}");
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| DataError::remote(op, e))?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = response
            .error_for_status()
            .map_err(|e| DataError::remote(op, e))?;
        response
            .json::<T>()
            .await
            .map(Some)
            .map_err(|e| DataError::remote(op, e))
    }

    /// POST a document without an id; the server assigns one.
    async fn http_create<T: Serialize>(
        client: &reqwest::Client,
        base_url: &str,
        collection: &str,
        document: &T,
        op: &'static str,
    ) -> Result<String> {
        let url = format!("{base_url}/{collection}");
        let response = client
            .post(&url)
            .json(document)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| DataError::remote(op, e))?;
        let created: CreatedDoc = response.json().await.map_err(|e| DataError::remote(op, e))?;
        Ok(created.id)
    }

    /// PUT upserts the document under the given id.
    async fn http_put<T: Serialize>(
        client: &reqwest::Client,
        base_url: &str,
        collection: &str,
        id: &str,
        document: &T,
        op: &'static str,
    ) -> Result<()> {
        let url = format!("{base_url}/{collection}/{id}");
        client
            .put(&url)
            .json(document)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| DataError::remote(op, e))?;
        Ok(())
    }

    async fn http_delete(
        client: &reqwest::Client,
        base_url: &str,
        collection: &str,
        id: &str,
        op: &'static str,
    ) -> Result<()> {
        let url = format!("{base_url}/{collection}/{id}");
        client
            .delete(&url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| DataError::remote(op, e))?;
        Ok(())
    }

    async fn http_batch(
        client: &reqwest::Client,
        base_url: &str,
        operations: &[BatchOp],
        op: &'static str,
    ) -> Result<()> {
        let url = format!("{base_url}/batch");
        client
            .post(&url)
            .json(&serde_json::json!({ "operations": operations }))
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| DataError::remote(op, e))?;
        Ok(())
    }

    // ---- workout sessions ----

    /// All sessions, ordered descending by date.
    pub async fn get_workout_sessions(&self) -> Result<Vec<WorkoutSession>> {
        const OP: &str = "load workout sessions";
        let mut docs: Vec<SessionDoc> = match &self.backend {
            RemoteBackend::Http { client, base_url } => {
                Self::http_list(
                    client,
                    base_url,
                    COLLECTION_WORKOUT_SESSIONS,
                    &[("order", "date.desc".to_string())],
                    OP,
                )
                .await?
            }
            RemoteBackend::Mock { state } => {
                state.check(OP)?;
                state.sessions.lock().await.values().cloned().collect()
            }
        };
        docs.sort_by(|a, b| b.date.cmp(&a.date));
        docs.into_iter().map(|d| d.into_domain(OP)).collect()
    }

    pub async fn get_workout_session(&self, session_id: &str) -> Result<Option<WorkoutSession>> {
        const OP: &str = "load workout session";
        let doc: Option<SessionDoc> = match &self.backend {
            RemoteBackend::Http { client, base_url } => {
                Self::http_get(client, base_url, COLLECTION_WORKOUT_SESSIONS, session_id, OP)
                    .await?
            }
            RemoteBackend::Mock { state } => {
                state.check(OP)?;
                state.sessions.lock().await.get(session_id).cloned()
            }
        };
        doc.map(|d| d.into_domain(OP)).transpose()
    }

    /// Empty id creates (server assigns the id, returned on the record);
    /// a present id upserts by id. `updated_at` is stamped server-write
    /// time, i.e. now.
    pub async fn save_workout_session(&self, session: &WorkoutSession) -> Result<WorkoutSession> {
        const OP: &str = "save workout session";
        let mut stored = session.clone();
        stored.updated_at = Utc::now();
        let mut doc = SessionDoc::from_domain(&stored);

        match &self.backend {
            RemoteBackend::Http { client, base_url } => {
                if doc.id.is_empty() {
                    let id = Self::http_create(
                        client,
                        base_url,
                        COLLECTION_WORKOUT_SESSIONS,
                        &doc,
                        OP,
                    )
                    .await?;
                    stored.id = id;
                } else {
                    Self::http_put(
                        client,
                        base_url,
                        COLLECTION_WORKOUT_SESSIONS,
                        &doc.id,
                        &doc,
                        OP,
                    )
                    .await?;
                }
            }
            RemoteBackend::Mock { state } => {
                state.check(OP)?;
                if doc.id.is_empty() {
                    doc.id = state.assign_id();
                    stored.id = doc.id.clone();
                }
                state.sessions.lock().await.insert(doc.id.clone(), doc);
            }
        }
        Ok(stored)
    }

    /// Update-by-id; the id must already be set.
    pub async fn update_workout_session(&self, session: &WorkoutSession) -> Result<WorkoutSession> {
        const OP: &str = "update workout session";
        if session.id.is_empty() {
            return Err(DataError::remote(
                OP,
                anyhow::anyhow!("cannot update a session without an id"),
            ));
        }
        let mut stored = session.clone();
        stored.updated_at = Utc::now();
        let doc = SessionDoc::from_domain(&stored);
        match &self.backend {
            RemoteBackend::Http { client, base_url } => {
                Self::http_put(
                    client,
                    base_url,
                    COLLECTION_WORKOUT_SESSIONS,
                    &doc.id,
                    &doc,
                    OP,
                )
                .await?;
            }
            RemoteBackend::Mock { state } => {
                state.check(OP)?;
                state.sessions.lock().await.insert(doc.id.clone(), doc);
            }
        }
        Ok(stored)
    }

    pub async fn delete_workout_session(&self, session_id: &str) -> Result<()> {
        const OP: &str = "delete workout session";
        match &self.backend {
            RemoteBackend::Http { client, base_url } => {
                Self::http_delete(client, base_url, COLLECTION_WORKOUT_SESSIONS, session_id, OP)
                    .await
            }
            RemoteBackend::Mock { state } => {
                state.check(OP)?;
                state.sessions.lock().await.remove(session_id);
                Ok(())
            }
        }
    }

    /// Sessions with `start <= date <= end`, descending by date.
    pub async fn get_sessions_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<WorkoutSession>> {
        const OP: &str = "load workout sessions by date range";
        let mut docs: Vec<SessionDoc> = match &self.backend {
            RemoteBackend::Http { client, base_url } => {
                Self::http_list(
                    client,
                    base_url,
                    COLLECTION_WORKOUT_SESSIONS,
                    &[
                        ("dateFrom", start.to_string()),
                        ("dateTo", end.to_string()),
                        ("order", "date.desc".to_string()),
                    ],
                    OP,
                )
                .await?
            }
            RemoteBackend::Mock { state } => {
                state.check(OP)?;
                let from = start.to_string();
                let to = end.to_string();
                state
                    .sessions
                    .lock()
                    .await
                    .values()
                    .filter(|d| d.date >= from && d.date <= to)
                    .cloned()
                    .collect()
            }
        };
        docs.sort_by(|a, b| b.date.cmp(&a.date));
        docs.into_iter().map(|d| d.into_domain(OP)).collect()
    }

    /// Sessions containing the named exercise. The store has no indexed
    /// array-containment query, so this scans the whole collection and
    /// filters client-side; it does not scale past small datasets.
    pub async fn get_sessions_by_exercise(
        &self,
        exercise_name: &str,
    ) -> Result<Vec<WorkoutSession>> {
        const OP: &str = "load workout sessions by exercise";
        let mut docs: Vec<SessionDoc> = match &self.backend {
            RemoteBackend::Http { client, base_url } => {
                Self::http_list(client, base_url, COLLECTION_WORKOUT_SESSIONS, &[], OP).await?
            }
            RemoteBackend::Mock { state } => {
                state.check(OP)?;
                state.sessions.lock().await.values().cloned().collect()
            }
        };
        docs.retain(|d| d.exercises.iter().any(|e| e.name == exercise_name));
        docs.sort_by(|a, b| b.date.cmp(&a.date));
        docs.into_iter().map(|d| d.into_domain(OP)).collect()
    }

    // ---- exercise templates ----

    /// An empty collection is seeded with the default catalog in one
    /// batch and the seeded set is returned.
    pub async fn get_exercise_templates(&self) -> Result<Vec<ExerciseTemplate>> {
        const OP: &str = "load exercise templates";
        let templates: Vec<ExerciseTemplate> = match &self.backend {
            RemoteBackend::Http { client, base_url } => {
                Self::http_list(client, base_url, COLLECTION_EXERCISE_TEMPLATES, &[], OP).await?
            }
            RemoteBackend::Mock { state } => {
                state.check(OP)?;
                state.templates.lock().await.values().cloned().collect()
            }
        };
        if templates.is_empty() {
            return self.seed_default_templates().await;
        }
        Ok(templates)
    }

    async fn seed_default_templates(&self) -> Result<Vec<ExerciseTemplate>> {
        const OP: &str = "seed default exercise templates";
        info!("Remote template collection empty, seeding default catalog");
        let templates = default_exercise_templates();
        match &self.backend {
            RemoteBackend::Http { client, base_url } => {
                let operations: Vec<BatchOp> = templates
                    .iter()
                    .map(|t| {
                        Ok(BatchOp::Set {
                            collection: COLLECTION_EXERCISE_TEMPLATES,
                            id: Some(t.id.clone()),
                            document: serde_json::to_value(t)?,
                        })
                    })
                    .collect::<Result<_>>()?;
                Self::http_batch(client, base_url, &operations, OP).await?;
            }
            RemoteBackend::Mock { state } => {
                state.check(OP)?;
                let mut stored = state.templates.lock().await;
                for template in &templates {
                    stored.insert(template.id.clone(), template.clone());
                }
            }
        }
        Ok(templates)
    }

    pub async fn save_exercise_template(&self, template: &ExerciseTemplate) -> Result<ExerciseTemplate> {
        const OP: &str = "save exercise template";
        let mut stored = template.clone();
        match &self.backend {
            RemoteBackend::Http { client, base_url } => {
                if stored.id.is_empty() {
                    let id = Self::http_create(
                        client,
                        base_url,
                        COLLECTION_EXERCISE_TEMPLATES,
                        &stored,
                        OP,
                    )
                    .await?;
                    stored.id = id;
                } else {
                    Self::http_put(
                        client,
                        base_url,
                        COLLECTION_EXERCISE_TEMPLATES,
                        &stored.id,
                        &stored,
                        OP,
                    )
                    .await?;
                }
            }
            RemoteBackend::Mock { state } => {
                state.check(OP)?;
                if stored.id.is_empty() {
                    stored.id = state.assign_id();
                }
                state
                    .templates
                    .lock()
                    .await
                    .insert(stored.id.clone(), stored.clone());
            }
        }
        Ok(stored)
    }

    // ---- user settings ----

    pub async fn get_user_settings(&self) -> Result<UserSettings> {
        const OP: &str = "load user settings";
        let settings: Option<UserSettings> = match &self.backend {
            RemoteBackend::Http { client, base_url } => {
                Self::http_get(client, base_url, COLLECTION_USER_SETTINGS, SETTINGS_DOC_ID, OP)
                    .await?
            }
            RemoteBackend::Mock { state } => {
                state.check(OP)?;
                state.settings.lock().await.clone()
            }
        };
        Ok(settings.unwrap_or_default())
    }

    pub async fn save_user_settings(&self, settings: &UserSettings) -> Result<()> {
        const OP: &str = "save user settings";
        match &self.backend {
            RemoteBackend::Http { client, base_url } => {
                Self::http_put(
                    client,
                    base_url,
                    COLLECTION_USER_SETTINGS,
                    SETTINGS_DOC_ID,
                    settings,
                    OP,
                )
                .await
            }
            RemoteBackend::Mock { state } => {
                state.check(OP)?;
                *state.settings.lock().await = Some(settings.clone());
                Ok(())
            }
        }
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

    /// Batched import. Ids present in the bundle are preserved so an
    /// export/import round trip is the identity.
    pub async fn import_data(&self, bundle: &ExportBundle) -> Result<()> {
        const OP: &str = "import data";
        match &self.backend {
            RemoteBackend::Http { client, base_url } => {
                let mut operations = Vec::new();
                for session in &bundle.workout_sessions {
                    let doc = SessionDoc::from_domain(session);
                    operations.push(BatchOp::Set {
                        collection: COLLECTION_WORKOUT_SESSIONS,
                        id: (!doc.id.is_empty()).then(|| doc.id.clone()),
                        document: serde_json::to_value(&doc)?,
                    });
                }
                for template in &bundle.exercise_templates {
                    operations.push(BatchOp::Set {
                        collection: COLLECTION_EXERCISE_TEMPLATES,
                        id: (!template.id.is_empty()).then(|| template.id.clone()),
                        document: serde_json::to_value(template)?,
                    });
                }
                operations.push(BatchOp::Set {
                    collection: COLLECTION_USER_SETTINGS,
                    id: Some(SETTINGS_DOC_ID.to_string()),
                    document: serde_json::to_value(&bundle.user_settings)?,
                });
                Self::http_batch(client, base_url, &operations, OP).await
            }
            RemoteBackend::Mock { state } => {
                state.check(OP)?;
                {
                    let mut sessions = state.sessions.lock().await;
                    for session in &bundle.workout_sessions {
                        let mut doc = SessionDoc::from_domain(session);
                        if doc.id.is_empty() {
                            doc.id = state.assign_id();
                        }
                        sessions.insert(doc.id.clone(), doc);
                    }
                }
                {
                    let mut templates = state.templates.lock().await;
                    for template in &bundle.exercise_templates {
                        let mut stored = template.clone();
                        if stored.id.is_empty() {
                            stored.id = state.assign_id();
                        }
                        templates.insert(stored.id.clone(), stored);
                    }
                }
                *state.settings.lock().await = Some(bundle.user_settings.clone());
                Ok(())
            }
        }
    }

    /// Delete every document across all three collections.
    pub async fn clear_all_data(&self) -> Result<()> {
        const OP: &str = "clear data";
        match &self.backend {
            RemoteBackend::Http { client, base_url } => {
                let mut operations = Vec::new();
                let sessions: Vec<SessionDoc> =
                    Self::http_list(client, base_url, COLLECTION_WORKOUT_SESSIONS, &[], OP).await?;
                for doc in sessions {
                    operations.push(BatchOp::Delete {
                        collection: COLLECTION_WORKOUT_SESSIONS,
                        id: doc.id,
                    });
                }
                let templates: Vec<ExerciseTemplate> =
                    Self::http_list(client, base_url, COLLECTION_EXERCISE_TEMPLATES, &[], OP)
                        .await?;
                for template in templates {
                    operations.push(BatchOp::Delete {
                        collection: COLLECTION_EXERCISE_TEMPLATES,
                        id: template.id,
                    });
                }
                operations.push(BatchOp::Delete {
                    collection: COLLECTION_USER_SETTINGS,
                    id: SETTINGS_DOC_ID.to_string(),
                });
                Self::http_batch(client, base_url, &operations, OP).await
            }
            RemoteBackend::Mock { state } => {
                state.check(OP)?;
                state.sessions.lock().await.clear();
                state.templates.lock().await.clear();
                *state.settings.lock().await = None;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WorkoutSet;

    fn session_on(date: &str) -> WorkoutSession {
        let mut session = WorkoutSession::start(date.parse().unwrap());
        let mut bench = Exercise::new("Bench Press", "Chest");
        bench.sets.push(WorkoutSet::new(5, 80.0).unwrap());
        session.exercises.push(bench);
        session
    }

    #[tokio::test]
    async fn create_assigns_server_id_and_writes_it_back() {
        let (remote, _handle) = RemoteStore::new_mock();
        let mut session = session_on("2026-08-20");
        session.id = String::new();
        let stored = remote.save_workout_session(&session).await.unwrap();
        assert!(!stored.id.is_empty());

        let loaded = remote
            .get_workout_session(&stored.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.exercises, session.exercises);
    }

    #[tokio::test]
    async fn present_id_upserts_by_id() {
        let (remote, handle) = RemoteStore::new_mock();
        let session = session_on("2026-08-20");
        remote.save_workout_session(&session).await.unwrap();
        remote.save_workout_session(&session).await.unwrap();
        assert_eq!(handle.session_count().await, 1);
    }

    #[tokio::test]
    async fn timestamps_survive_the_millisecond_wire_format() {
        let (remote, _handle) = RemoteStore::new_mock();
        let session = session_on("2026-08-20");
        remote.save_workout_session(&session).await.unwrap();
        let loaded = remote
            .get_workout_session(&session.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            loaded.created_at.timestamp_millis(),
            session.created_at.timestamp_millis()
        );
        assert_eq!(loaded.date, session.date);
    }

    #[tokio::test]
    async fn date_range_query_is_inclusive_and_descending() {
        let (remote, _handle) = RemoteStore::new_mock();
        for date in ["2026-08-10", "2026-08-15", "2026-08-20"] {
            remote.save_workout_session(&session_on(date)).await.unwrap();
        }
        let hits = remote
            .get_sessions_by_date_range("2026-08-10".parse().unwrap(), "2026-08-15".parse().unwrap())
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits[0].date > hits[1].date);
    }

    #[tokio::test]
    async fn by_exercise_scan_filters_and_sorts_descending() {
        let (remote, _handle) = RemoteStore::new_mock();
        remote.save_workout_session(&session_on("2026-08-10")).await.unwrap();
        remote.save_workout_session(&session_on("2026-08-20")).await.unwrap();
        let mut other = WorkoutSession::start("2026-08-15".parse().unwrap());
        other.exercises.push(Exercise::new("Squat", "Legs"));
        remote.save_workout_session(&other).await.unwrap();

        let hits = remote.get_sessions_by_exercise("Bench Press").await.unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits[0].date > hits[1].date);
    }

    #[tokio::test]
    async fn empty_template_collection_is_seeded_once() {
        let (remote, handle) = RemoteStore::new_mock();
        let first = remote.get_exercise_templates().await.unwrap();
        assert_eq!(first.len(), 13);
        assert_eq!(handle.template_count().await, 13);

        let second = remote.get_exercise_templates().await.unwrap();
        assert_eq!(second.len(), 13);
        // No reseed: still exactly the first catalog.
        assert_eq!(handle.template_count().await, 13);
    }

    #[tokio::test]
    async fn failure_toggle_wraps_errors_with_the_operation() {
        let (remote, handle) = RemoteStore::new_mock();
        handle.set_fail(true);
        let err = remote.get_workout_sessions().await.unwrap_err();
        assert!(err.is_remote());
        assert!(err.to_string().contains("load workout sessions"));
    }

    #[tokio::test]
    async fn settings_default_until_saved() {
        let (remote, _handle) = RemoteStore::new_mock();
        assert_eq!(
            remote.get_user_settings().await.unwrap(),
            UserSettings::default()
        );
        let mut settings = UserSettings::default();
        settings.weekly_goal = Some(5);
        remote.save_user_settings(&settings).await.unwrap();
        assert_eq!(remote.get_user_settings().await.unwrap(), settings);
    }

    #[tokio::test]
    async fn import_preserves_ids_and_clear_empties_everything() {
        let (remote, handle) = RemoteStore::new_mock();
        let session = session_on("2026-08-20");
        let bundle = ExportBundle {
            workout_sessions: vec![session.clone()],
            exercise_templates: default_exercise_templates(),
            user_settings: UserSettings::default(),
            export_date: Utc::now(),
        };
        remote.import_data(&bundle).await.unwrap();
        assert!(handle.has_session(&session.id).await);
        assert_eq!(handle.template_count().await, 13);

        remote.clear_all_data().await.unwrap();
        assert_eq!(handle.session_count().await, 0);
        assert_eq!(handle.template_count().await, 0);
    }
}
